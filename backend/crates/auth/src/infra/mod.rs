//! Infrastructure Layer
//!
//! External identity provider integration.

pub mod identity_toolkit;

pub use identity_toolkit::{IdentityProviderError, IdentityToolkitConfig, IdentityToolkitProvider};
