mod app;
mod handlers;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use listenfd::ListenFd;
use oauthgate_auth::{AuthState, OAuth2Config, SessionConfig};
use oauthgate_core::auth::SessionStore;
use tokio::{net::TcpListener, signal};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::create_app;

/// oauthgate - Guard routes behind an OAuth2 login
#[derive(Parser, Debug)]
#[command(name = "oauthgate")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Host address to bind the server to
    #[arg(long, short = 'H', default_value = "0.0.0.0", env = "HOST")]
    host: String,

    /// Port to listen on
    #[arg(long, short, default_value = "19300", env = "PORT")]
    port: u16,

    /// Redis URL for session storage
    #[cfg(feature = "redis")]
    #[arg(long, default_value = "redis://localhost:6379", env = "REDIS_URL")]
    redis_url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Credentials may come from a local .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "oauthgate=debug,oauthgate_auth=debug,oauthgate_core=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = OAuth2Config::from_env()?;
    let session_config = SessionConfig::from_env();
    let sessions = init_session_store(&cli, &session_config).await?;

    let state = AuthState::new(config, sessions.clone(), session_config)?;
    let app = create_app(state);

    // Auto-reload support via listenfd
    let mut listenfd = ListenFd::from_env();
    let listener = match listenfd.take_tcp_listener(0)? {
        // If we are given a tcp listener on listen fd 0, use that one
        Some(listener) => {
            listener.set_nonblocking(true)?;
            TcpListener::from_std(listener)?
        }
        // Otherwise fall back to CLI-specified host:port
        None => {
            let addr = format!("{}:{}", cli.host, cli.port);
            TcpListener::bind(&addr).await?
        }
    };

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sessions.close().await?;
    tracing::info!("Server stopped");
    Ok(())
}

#[cfg(not(feature = "redis"))]
async fn init_session_store(
    _cli: &Cli,
    session_config: &SessionConfig,
) -> Result<Arc<dyn SessionStore>> {
    Ok(Arc::new(oauthgate_auth::MemorySessionStore::new(
        session_config.ttl,
    )))
}

#[cfg(feature = "redis")]
async fn init_session_store(
    cli: &Cli,
    session_config: &SessionConfig,
) -> Result<Arc<dyn SessionStore>> {
    use fred::prelude::{Builder, ClientLike, Config};

    let config = Config::from_url(&cli.redis_url)?;
    let pool = Builder::from_config(config).build_pool(4)?;
    pool.init().await?;
    tracing::info!(url = %cli.redis_url, "Connected to Redis session store");

    Ok(Arc::new(oauthgate_auth::RedisSessionStore::new(
        pool,
        session_config.ttl,
    )))
}

/// Wait for shutdown signals (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
    }
}
