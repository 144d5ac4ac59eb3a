//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Value objects, entities, identity-provider ports
//! - `application/` - Use cases and application configuration
//! - `infra/` - Identity Toolkit REST adapter
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Features
//! - Sign-up with email + password + display name, validated locally before
//!   the provider is called
//! - Sign-in by exchanging a recently issued identity token for a 48h
//!   session cookie
//!
//! ## Security Model
//! - Credentials are verified only by the external identity provider
//! - Tokens whose sign-in is older than 5 minutes are refused
//! - Session cookie is HttpOnly, SameSite=Lax, Secure unless disabled
//! - Passwords are zeroized on drop and never logged

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::config::AuthConfig;
pub use error::{AuthError, AuthResult, ProviderOperation};
pub use infra::identity_toolkit::{IdentityToolkitConfig, IdentityToolkitProvider};
pub use presentation::router::auth_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod router {
    pub use crate::presentation::router::*;
}
