//! Session Cookie
//!
//! Renders `Set-Cookie` header values for a server-issued session credential.
//! Values are checked against the RFC 6265 `cookie-octet` grammar so an opaque
//! provider credential can never break out of the header.

use std::fmt::{self, Write};
use std::time::Duration;

use axum::http::HeaderValue;
use thiserror::Error;

/// SameSite policy for cookies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSite {
    Strict,
    #[default]
    Lax,
    None,
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CookieError {
    #[error("cookie value must not be empty")]
    EmptyValue,

    #[error("cookie value contains a byte outside cookie-octet at index {0}")]
    InvalidValue(usize),
}

/// `cookie-octet`: visible ASCII except DQUOTE, comma, semicolon and backslash
fn is_cookie_octet(b: u8) -> bool {
    matches!(b, 0x21 | 0x23..=0x2B | 0x2D..=0x3A | 0x3C..=0x5B | 0x5D..=0x7E)
}

/// HttpOnly session cookie; `Secure` unless turned off for local development
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookie {
    name: String,
    secure: bool,
    same_site: SameSite,
    path: String,
}

impl SessionCookie {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            secure: true,
            same_site: SameSite::default(),
            path: "/".to_string(),
        }
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = same_site;
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_secure(&self) -> bool {
        self.secure
    }

    /// `name=value; HttpOnly[; Secure]; SameSite=..; Path=..; Max-Age=<whole seconds>`
    pub fn render(&self, value: &str, max_age: Duration) -> Result<String, CookieError> {
        if value.is_empty() {
            return Err(CookieError::EmptyValue);
        }
        if let Some(index) = value.bytes().position(|b| !is_cookie_octet(b)) {
            return Err(CookieError::InvalidValue(index));
        }

        let mut cookie = format!("{}={}; HttpOnly", self.name, value);
        if self.secure {
            cookie.push_str("; Secure");
        }
        // writing into a String cannot fail
        let _ = write!(
            cookie,
            "; SameSite={}; Path={}; Max-Age={}",
            self.same_site,
            self.path,
            max_age.as_secs()
        );

        Ok(cookie)
    }

    /// [`render`](Self::render) as a header value
    pub fn set_cookie(&self, value: &str, max_age: Duration) -> Result<HeaderValue, CookieError> {
        let rendered = self.render(value, max_age)?;
        // reachable only through a name or path holding control bytes
        HeaderValue::from_str(&rendered).map_err(|_| CookieError::InvalidValue(0))
    }
}
