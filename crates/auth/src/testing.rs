//! Test harness: a router wired with the mock provider and an in-memory store.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, Response},
    middleware,
    routing::{self, post},
    Json, Router,
};
use http_body_util::BodyExt;
use oauthgate_core::auth::{SessionId, SessionRecord, SessionStore, Token};
use tower::ServiceExt;
use url::Url;

use crate::config::{OAuth2Config, ProviderEndpoints, SessionConfig};
use crate::error::AuthError;
use crate::extractors::{AuthContext, CurrentToken, OptionalToken};
use crate::handlers::with_oauth2;
use crate::middleware::login_required;
use crate::providers::MockProvider;
use crate::sessions::MemorySessionStore;
use crate::AuthState;

const COOKIE_NAME: &str = "oauthgate_session";

pub struct TestApp {
    router: Router,
    provider: Arc<MockProvider>,
    store: MemorySessionStore,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_provider(MockProvider::new(authorize_base()))
    }

    pub fn failing() -> Self {
        Self::with_provider(MockProvider::failing(authorize_base()))
    }

    /// Provider whose tokens are already expired when issued.
    pub fn expiring() -> Self {
        Self::with_provider(
            MockProvider::new(authorize_base()).with_token_lifetime(chrono::Duration::zero()),
        )
    }

    fn with_provider(provider: MockProvider) -> Self {
        let provider = Arc::new(provider);
        let store = MemorySessionStore::default();

        let config = OAuth2Config::new(
            "client_id",
            "client_secret",
            "http://localhost:3000/oauth2callback",
            ProviderEndpoints::google(),
        )
        .unwrap()
        .with_scopes(["x", "y"]);
        let session_config = SessionConfig {
            cookie_secure: false,
            ..SessionConfig::default()
        };

        let state = AuthState::with_provider(
            config,
            provider.clone(),
            Arc::new(store.clone()),
            session_config,
        )
        .unwrap();

        let routes = Router::new()
            .route("/whoami", routing::get(whoami))
            .route("/set-token", post(set_token))
            .route(
                "/login-required",
                routing::get(restricted).route_layer(middleware::from_fn_with_state(
                    state.clone(),
                    login_required,
                )),
            );

        Self {
            router: with_oauth2(routes, state),
            provider,
            store,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub fn exchange_calls(&self) -> usize {
        self.provider.exchange_calls()
    }

    /// Runs a full successful login and returns the session cookie issued
    /// with the renewed session ID.
    pub async fn login(&self) -> String {
        let response = self.send(get("/login")).await;
        let cookie = session_cookie(&response).unwrap();
        let state = query_param(&location(&response), "state").unwrap();

        let response = self
            .send(get_with_cookie(
                &format!("/oauth2callback?code=good-code&state={state}"),
                &cookie,
            ))
            .await;
        assert_eq!(response.status(), axum::http::StatusCode::FOUND);

        session_cookie(&response).unwrap()
    }

    pub fn set_token_request(&self, token: &Token) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/set-token")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(token).unwrap()))
            .unwrap()
    }

    pub async fn stored_record(&self, cookie: &str) -> Option<SessionRecord> {
        let id = cookie.strip_prefix(&format!("{COOKIE_NAME}="))?;
        self.store
            .load(&SessionId::new(id.to_string()))
            .await
            .unwrap()
    }

    pub async fn close_store(&self) {
        self.store.close().await.unwrap();
    }
}

fn authorize_base() -> Url {
    Url::parse("http://localhost:3001/authorize").unwrap()
}

async fn whoami(OptionalToken(token): OptionalToken) -> String {
    match token {
        Some(token) => token.access_token,
        None => "anonymous".to_string(),
    }
}

async fn set_token(ctx: AuthContext, Json(token): Json<Token>) -> Result<&'static str, AuthError> {
    ctx.set_token(&token)?;
    Ok("OK")
}

async fn restricted(CurrentToken(token): CurrentToken) -> String {
    format!("OK: {}", token.access())
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

/// The `name=value` pair of the session cookie set by `response`, if any.
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(&format!("{COOKIE_NAME}=")))
        .and_then(|v| v.split(';').next())
        .map(String::from)
}

pub fn location(response: &Response<Body>) -> String {
    response.headers()[header::LOCATION]
        .to_str()
        .unwrap()
        .to_string()
}

pub fn query_param(url: &str, name: &str) -> Option<String> {
    let url = Url::parse(url)
        .or_else(|_| Url::parse("http://localhost").unwrap().join(url))
        .ok()?;
    url.query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

pub async fn body_string(response: Response<Body>) -> String {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(body.to_vec()).unwrap()
}
