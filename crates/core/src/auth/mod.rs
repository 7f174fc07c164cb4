mod accessor;
mod error;
mod functions;
mod gate;
mod session;
mod traits;
mod types;
mod validation;

pub use accessor::SessionAccessor;
pub use error::AuthError;
pub use functions::{calculate_expiry, generate_session_id, generate_state, is_token_expired};
pub use gate::{authenticate, authenticate_at};
pub use session::Session;
pub use traits::{ProviderClient, Result, SessionStore};
pub use types::{SessionId, SessionRecord, Token, NEXT_KEY, STATE_KEY, TOKEN_KEY};
pub use validation::{next_from_referer, validate_next};
