//! Identity Provider Ports
//!
//! Capabilities the use cases need from the external identity provider.
//! Implementations live in the infrastructure layer.

use std::time::Duration;

use crate::domain::entity::{token::Token, user::User};
use crate::domain::value_object::{new_user::NewUser, session::Session};
use crate::error::AuthResult;

/// Sign-in side of the identity provider
#[trait_variant::make(SignInProvider: Send)]
pub trait LocalSignInProvider {
    /// Verify signature and payload of a raw token
    ///
    /// Fails with `AuthError::InvalidCredential` when the provider rejects it.
    async fn verify_token(&self, token: &str) -> AuthResult<Token>;

    /// Mint a session credential; the provider re-verifies `token` while doing so
    async fn session_cookie(&self, token: &str, expires_in: Duration) -> AuthResult<Session>;
}

/// Sign-up side of the identity provider
#[trait_variant::make(SignUpProvider: Send)]
pub trait LocalSignUpProvider {
    /// Create the account
    ///
    /// Fails with `AuthError::DuplicateAccount` when the identity already exists.
    /// Not idempotent: must not be retried after an ambiguous failure.
    async fn create(&self, new_user: &NewUser) -> AuthResult<User>;
}
