//! Auth Error Types
//!
//! Auth-specific error variants that integrate with the unified
//! `kernel::error::AppError` system. Every variant keeps its kind when it
//! crosses a layer; provider-related variants also name the provider
//! operation that failed.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use derive_more::Display;
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::authorization::AuthorizationError;
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// 外部 IdP に対する操作（エラーの発生箇所を示す）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ProviderOperation {
    #[display("verify_token")]
    VerifyToken,
    #[display("session_cookie")]
    SessionCookie,
    #[display("create_user")]
    CreateUser,
}

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Registration input failed local validation
    #[error("{0}")]
    Validation(String),

    /// Request body could not be decoded
    #[error("Malformed request payload: {0}")]
    MalformedPayload(String),

    /// Authorization header missing or not `jwt <token>`
    #[error("{0}")]
    MalformedAuthorization(String),

    /// The identity provider rejected the presented token
    #[error("Invalid credential ({operation}): {reason}")]
    InvalidCredential {
        operation: ProviderOperation,
        reason: String,
    },

    /// Token is valid but the original sign-in is too old
    #[error("Recent sign-in required (authenticated {age_secs}s ago)")]
    StaleAuthentication { age_secs: i64 },

    /// The identity provider already has this account
    #[error("User already exists")]
    DuplicateAccount,

    /// Network failure, timeout or cancellation talking to the provider
    #[error("Identity provider unavailable ({operation}): {reason}")]
    ProviderUnavailable {
        operation: ProviderOperation,
        reason: String,
    },

    /// Provider-side failure unrelated to the credential or account
    #[error("Identity provider error ({operation}): {reason}")]
    Provider {
        operation: ProviderOperation,
        reason: String,
    },

    /// Provider returned a value that breaks a domain invariant
    #[error("Identity provider contract violation ({operation}): {reason}")]
    ProviderContractViolation {
        operation: ProviderOperation,
        reason: String,
    },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn unavailable(operation: ProviderOperation, reason: impl Into<String>) -> Self {
        AuthError::ProviderUnavailable {
            operation,
            reason: reason.into(),
        }
    }

    pub fn provider(operation: ProviderOperation, reason: impl Into<String>) -> Self {
        AuthError::Provider {
            operation,
            reason: reason.into(),
        }
    }

    pub fn contract_violation(operation: ProviderOperation, reason: impl Into<String>) -> Self {
        AuthError::ProviderContractViolation {
            operation,
            reason: reason.into(),
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::Validation(_) | AuthError::MalformedPayload(_) => ErrorKind::BadRequest,
            AuthError::MalformedAuthorization(_)
            | AuthError::InvalidCredential { .. }
            | AuthError::StaleAuthentication { .. } => ErrorKind::Unauthorized,
            AuthError::DuplicateAccount => ErrorKind::Conflict,
            AuthError::ProviderUnavailable { .. } => ErrorKind::ServiceUnavailable,
            AuthError::Provider { .. } => ErrorKind::BadGateway,
            AuthError::ProviderContractViolation { .. } | AuthError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// 呼び出し側（アダプタ層）がバックオフ付きで再試行してよいか
    pub fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }

    /// Convert to AppError
    ///
    /// 5xx の詳細（上流の応答内容など）はクライアントへ返さない。
    pub fn to_app_error(&self) -> AppError {
        match self {
            AuthError::StaleAuthentication { .. } => {
                AppError::unauthorized("Recent sign-in required")
                    .with_action("Sign in with the identity provider again")
            }
            AuthError::InvalidCredential { .. } => {
                AppError::unauthorized("Invalid or expired credential")
            }
            AuthError::DuplicateAccount => AppError::conflict(self.to_string())
                .with_action("Sign in with the existing account"),
            AuthError::ProviderUnavailable { .. } => {
                AppError::service_unavailable("Identity provider unavailable")
                    .with_action("Please try again later")
            }
            AuthError::Provider { .. } => {
                AppError::new(ErrorKind::BadGateway, "Identity provider error")
            }
            AuthError::ProviderContractViolation { .. } | AuthError::Internal(_) => {
                AppError::internal("Internal server error")
            }
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::ProviderContractViolation { operation, reason } => {
                tracing::error!(%operation, %reason, "Identity provider contract violation");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::Provider { operation, reason } => {
                tracing::error!(%operation, %reason, "Identity provider error");
            }
            AuthError::ProviderUnavailable { operation, reason } => {
                tracing::warn!(%operation, %reason, "Identity provider unavailable");
            }
            AuthError::InvalidCredential { operation, .. } => {
                tracing::warn!(%operation, "Invalid credential presented");
            }
            AuthError::StaleAuthentication { age_secs } => {
                tracing::warn!(age_secs, "Sign-in rejected: authentication too old");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        err.to_app_error().with_source(err)
    }
}

impl From<AuthorizationError> for AuthError {
    fn from(err: AuthorizationError) -> Self {
        AuthError::MalformedAuthorization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AuthError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthError::MalformedAuthorization("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::StaleAuthentication { age_secs: 301 }.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::DuplicateAccount.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AuthError::unavailable(ProviderOperation::VerifyToken, "timeout").status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AuthError::provider(ProviderOperation::CreateUser, "500").status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AuthError::contract_violation(ProviderOperation::SessionCookie, "short")
                .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_message_names_operation() {
        let err = AuthError::unavailable(ProviderOperation::SessionCookie, "connection reset");
        assert_eq!(
            err.to_string(),
            "Identity provider unavailable (session_cookie): connection reset"
        );
    }

    #[test]
    fn test_server_error_detail_is_not_exposed() {
        let err = AuthError::provider(ProviderOperation::CreateUser, "upstream said secret");
        let app = err.to_app_error();
        assert!(!app.message().contains("secret"));
    }

    #[test]
    fn test_only_provider_failures_are_retryable() {
        assert!(AuthError::unavailable(ProviderOperation::VerifyToken, "x").is_retryable());
        assert!(AuthError::provider(ProviderOperation::VerifyToken, "x").is_retryable());
        assert!(!AuthError::DuplicateAccount.is_retryable());
        assert!(!AuthError::StaleAuthentication { age_secs: 900 }.is_retryable());
        assert!(
            !AuthError::contract_violation(ProviderOperation::SessionCookie, "x").is_retryable()
        );
    }

    #[test]
    fn test_from_authorization_error() {
        let err: AuthError = AuthorizationError::Missing.into();
        assert!(matches!(err, AuthError::MalformedAuthorization(_)));
    }
}
