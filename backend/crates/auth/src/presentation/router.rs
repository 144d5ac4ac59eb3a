//! Auth Router

use axum::{Router, routing::post};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::port::{SignInProvider, SignUpProvider};
use crate::infra::identity_toolkit::IdentityToolkitProvider;
use crate::presentation::handlers::{self, AuthAppState};

/// Create the Auth router backed by the Identity Toolkit adapter
pub fn auth_router(provider: IdentityToolkitProvider, config: AuthConfig) -> Router {
    auth_router_generic(provider, config)
}

/// Create a generic Auth router for any provider implementation
pub fn auth_router_generic<P>(provider: P, config: AuthConfig) -> Router
where
    P: SignInProvider + SignUpProvider + Send + Sync + 'static,
{
    let state = AuthAppState {
        provider: Arc::new(provider),
        config: Arc::new(config),
    };

    Router::new()
        .route("/signup", post(handlers::sign_up::<P>))
        .route("/signin", post(handlers::sign_in::<P>))
        .with_state(state)
}
