//! Authorization header parsing
//!
//! Extracts the credential from an `Authorization: <scheme> <credential>`
//! header. The scheme is compared case-insensitively and exactly one space
//! must separate it from the credential.

use axum::http::{HeaderMap, header};

/// Scheme used by the identity front door (`Authorization: jwt <token>`)
pub const JWT_SCHEME: &str = "jwt";

/// Error when the Authorization header cannot be used
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthorizationError {
    #[error("Missing Authorization header")]
    Missing,

    #[error("Expected authorization header format: {scheme} <token>")]
    Malformed { scheme: &'static str },
}

/// Parse a raw header value of the form `<scheme> <credential>`
///
/// ## Returns
/// * `Ok(&str)` - the credential part, borrowed from `value`
/// * `Err(AuthorizationError::Malformed)` - wrong scheme, wrong separator,
///   extra parts, or an empty credential
pub fn parse_credential<'a>(
    value: &'a str,
    scheme: &'static str,
) -> Result<&'a str, AuthorizationError> {
    let mut parts = value.split(' ');
    let (Some(found_scheme), Some(credential), None) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(AuthorizationError::Malformed { scheme });
    };

    if !found_scheme.eq_ignore_ascii_case(scheme) || credential.is_empty() {
        return Err(AuthorizationError::Malformed { scheme });
    }

    Ok(credential)
}

/// Extract the credential from request headers
pub fn extract_credential(
    headers: &HeaderMap,
    scheme: &'static str,
) -> Result<String, AuthorizationError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthorizationError::Missing)?
        .to_str()
        .map_err(|_| AuthorizationError::Malformed { scheme })?;

    parse_credential(value, scheme).map(str::to_string)
}
