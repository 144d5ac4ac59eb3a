//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::time::Duration;

use platform::cookie::SessionCookie;

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Session cookie name
    pub session_cookie_name: String,
    /// Whether to require Secure cookie
    pub cookie_secure: bool,
    /// SameSite policy
    pub cookie_same_site: SameSite,
    /// Upper bound for a single identity-provider call made by a use case
    pub provider_timeout: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_cookie_name: "session".to_string(),
            cookie_secure: true,
            cookie_same_site: SameSite::Lax,
            provider_timeout: Duration::from_secs(10),
        }
    }
}

impl AuthConfig {
    /// Create config for development (insecure cookie)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            ..Default::default()
        }
    }

    /// Cookie the sign-in handler issues
    pub fn session_cookie(&self) -> SessionCookie {
        SessionCookie::new(self.session_cookie_name.as_str())
            .secure(self.cookie_secure)
            .same_site(self.cookie_same_site)
    }
}
