//! Provider call deadline
//!
//! Every provider round-trip made by a use case is bounded by
//! `AuthConfig::provider_timeout`. Dropping the returned future (for example
//! when the client disconnects) cancels the in-flight call.

use std::future::Future;
use std::time::Duration;

use crate::error::{AuthError, AuthResult, ProviderOperation};

/// Await `call`, failing with `ProviderUnavailable` once `timeout` elapses
pub(crate) async fn with_deadline<T, F>(
    operation: ProviderOperation,
    timeout: Duration,
    call: F,
) -> AuthResult<T>
where
    F: Future<Output = AuthResult<T>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(AuthError::unavailable(
            operation,
            format!("no response within {}ms", timeout.as_millis()),
        )),
    }
}
