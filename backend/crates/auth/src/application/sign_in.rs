//! Sign In Use Case
//!
//! Exchanges a freshly authenticated identity token for a session credential.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::application::config::AuthConfig;
use crate::application::deadline::with_deadline;
use crate::domain::port::SignInProvider;
use crate::domain::value_object::session::Session;
use crate::error::{AuthError, AuthResult, ProviderOperation};

/// 認証からこの時間を超えたトークンではサインインさせない（5 分）
pub const MAX_AUTH_AGE: Duration = Duration::from_secs(5 * 60);

/// 発行するセッションの有効期間（2 日、呼び出しごとに変更不可）
pub const SESSION_DURATION: Duration = Duration::from_secs(2 * 24 * 60 * 60);

/// Sign in use case
pub struct SignInUseCase<P>
where
    P: SignInProvider,
{
    provider: Arc<P>,
    config: Arc<AuthConfig>,
}

impl<P> SignInUseCase<P>
where
    P: SignInProvider,
{
    pub fn new(provider: Arc<P>, config: Arc<AuthConfig>) -> Self {
        Self { provider, config }
    }

    /// Verify `token`, enforce recency, and mint a session
    ///
    /// No state is kept between calls, so the same fresh token can be
    /// exchanged more than once.
    pub async fn execute(&self, token: &str) -> AuthResult<Session> {
        let timeout = self.config.provider_timeout;

        let decoded = with_deadline(
            ProviderOperation::VerifyToken,
            timeout,
            self.provider.verify_token(token),
        )
        .await?;

        let now = Utc::now().timestamp();
        if decoded.is_stale(now, MAX_AUTH_AGE) {
            return Err(AuthError::StaleAuthentication {
                age_secs: decoded.auth_age_secs(now),
            });
        }

        // The provider re-verifies the token while minting the session.
        let session = with_deadline(
            ProviderOperation::SessionCookie,
            timeout,
            self.provider.session_cookie(token, SESSION_DURATION),
        )
        .await?;

        if session.expires_in() != SESSION_DURATION {
            return Err(AuthError::contract_violation(
                ProviderOperation::SessionCookie,
                format!(
                    "requested a {}s session, provider returned {}s",
                    SESSION_DURATION.as_secs(),
                    session.expires_in().as_secs()
                ),
            ));
        }

        tracing::info!(
            uid = %decoded.uid,
            auth_age_secs = decoded.auth_age_secs(now),
            expires_in_secs = session.expires_in().as_secs(),
            "User signed in"
        );

        Ok(session)
    }
}
