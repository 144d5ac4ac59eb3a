//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors; request-level errors are
//! `auth::AuthError` rendered as problem details.

use std::env;
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use auth::{AuthConfig, IdentityToolkitConfig, IdentityToolkitProvider, auth_router};
use axum::{
    Router,
    http::{self, Method, header},
};
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Process-level settings read from the environment
struct ServerConfig {
    addr: SocketAddr,
    frontend_origins: Vec<http::HeaderValue>,
    cookie_secure: bool,
    request_timeout: Duration,
    shutdown_timeout: Duration,
}

impl ServerConfig {
    fn from_env() -> anyhow::Result<Self> {
        let addr = env::var("AUTH_API_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:31113".to_string())
            .parse()
            .context("AUTH_API_ADDR must be a socket address")?;

        let frontend_origins = parse_origins(
            &env::var("FRONTEND_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:40922,http://127.0.0.1:40922".to_string()),
        )?;

        let cookie_secure = match env::var("COOKIE_SECURE") {
            Ok(value) => value
                .parse()
                .context("COOKIE_SECURE must be true or false")?,
            Err(_) => true,
        };

        Ok(Self {
            addr,
            frontend_origins,
            cookie_secure,
            request_timeout: secs_var("REQUEST_TIMEOUT_SECS", 30)?,
            shutdown_timeout: secs_var("SHUTDOWN_TIMEOUT_SECS", 10)?,
        })
    }
}

/// Comma-separated origins; blank entries are skipped, malformed ones are an error
fn parse_origins(raw: &str) -> anyhow::Result<Vec<http::HeaderValue>> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            origin
                .parse::<http::HeaderValue>()
                .with_context(|| format!("FRONTEND_ORIGINS has an invalid origin: {:?}", origin))
        })
        .collect()
}

fn secs_var(name: &str, default: u64) -> anyhow::Result<Duration> {
    let secs = match env::var(name) {
        Ok(value) => value
            .parse()
            .with_context(|| format!("{} must be a whole number of seconds", name))?,
        Err(_) => default,
    };
    Ok(Duration::from_secs(secs))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "auth_api=info,auth=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let server = ServerConfig::from_env()?;

    // Identity provider
    let identity_config =
        IdentityToolkitConfig::from_env().context("identity provider configuration")?;
    tracing::info!(
        base_url = %identity_config.base_url,
        project_id = %identity_config.project_id,
        "Identity provider configured"
    );
    let provider = IdentityToolkitProvider::new(identity_config)?;

    let auth_config = AuthConfig {
        cookie_secure: server.cookie_secure,
        ..AuthConfig::default()
    };
    if !auth_config.cookie_secure {
        tracing::warn!("Session cookie is issued without the Secure attribute");
    }

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(server.frontend_origins)
        .allow_methods(AllowMethods::list([Method::POST, Method::OPTIONS]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Build router
    let app = Router::new()
        .nest("/api", auth_router(provider, auth_config))
        .layer(TimeoutLayer::new(server.request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    tracing::info!("Listening on {}", server.addr);
    let listener = TcpListener::bind(server.addr).await?;

    let draining = Arc::new(Notify::new());
    let trigger = draining.clone();
    let serve = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        trigger.notify_one();
    });

    let shutdown_timeout = server.shutdown_timeout;
    tokio::select! {
        result = serve.into_future() => result?,
        _ = async {
            draining.notified().await;
            tokio::time::sleep(shutdown_timeout).await;
        } => {
            tracing::warn!(
                timeout_secs = shutdown_timeout.as_secs(),
                "Graceful shutdown timed out, dropping open connections"
            );
        }
    }

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves on SIGINT or (on Unix) SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}
