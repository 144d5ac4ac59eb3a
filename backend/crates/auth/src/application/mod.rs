//! Application Layer
//!
//! Use cases and application services.

pub mod config;
mod deadline;
pub mod sign_in;
pub mod sign_up;

// Re-exports
pub use config::AuthConfig;
pub use sign_in::{MAX_AUTH_AGE, SESSION_DURATION, SignInUseCase};
pub use sign_up::SignUpUseCase;
