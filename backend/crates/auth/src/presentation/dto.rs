//! API DTOs (Data Transfer Objects)

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::entity::user::User;

// ============================================================================
// Sign Up
// ============================================================================

/// Sign up request
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
}

impl fmt::Debug for SignUpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignUpRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("display_name", &self.display_name)
            .finish()
    }
}

/// Sign up response
///
/// The provider-assigned uid stays server-side.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpResponse {
    pub email: String,
    pub display_name: String,
}

impl From<User> for SignUpResponse {
    fn from(user: User) -> Self {
        Self {
            email: user.email,
            display_name: user.display_name,
        }
    }
}

// ============================================================================
// Sign In
// ============================================================================

/// Sign in response; the credential itself travels in `Set-Cookie`
#[derive(Debug, Clone, Serialize)]
pub struct SignInResponse {
    pub status: &'static str,
}

impl SignInResponse {
    pub fn success() -> Self {
        Self { status: "Success" }
    }
}
