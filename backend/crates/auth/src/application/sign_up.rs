//! Sign Up Use Case
//!
//! Registers a validated account with the identity provider.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::deadline::with_deadline;
use crate::domain::entity::user::User;
use crate::domain::port::SignUpProvider;
use crate::domain::value_object::new_user::NewUser;
use crate::error::{AuthResult, ProviderOperation};

/// Sign up use case
///
/// 一意性の判定は IdP のみが行う。ローカルでの事前チェックはしない。
pub struct SignUpUseCase<P>
where
    P: SignUpProvider,
{
    provider: Arc<P>,
    config: Arc<AuthConfig>,
}

impl<P> SignUpUseCase<P>
where
    P: SignUpProvider,
{
    pub fn new(provider: Arc<P>, config: Arc<AuthConfig>) -> Self {
        Self { provider, config }
    }

    pub async fn execute(&self, new_user: NewUser) -> AuthResult<User> {
        let user = with_deadline(
            ProviderOperation::CreateUser,
            self.config.provider_timeout,
            self.provider.create(&new_user),
        )
        .await?;

        tracing::info!(
            uid = %user.uid,
            email_domain = %new_user.email().domain(),
            "User signed up"
        );

        Ok(user)
    }
}
