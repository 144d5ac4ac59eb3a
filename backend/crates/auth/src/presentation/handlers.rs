//! HTTP Handlers

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use std::sync::Arc;

use platform::authorization::{JWT_SCHEME, extract_credential};

use crate::application::config::AuthConfig;
use crate::application::{SignInUseCase, SignUpUseCase};
use crate::domain::port::{SignInProvider, SignUpProvider};
use crate::domain::value_object::new_user::NewUser;
use crate::error::{AuthError, AuthResult, ProviderOperation};
use crate::presentation::dto::{SignInResponse, SignUpRequest, SignUpResponse};

/// Shared state for auth handlers
pub struct AuthAppState<P> {
    pub provider: Arc<P>,
    pub config: Arc<AuthConfig>,
}

// derive(Clone) would demand `P: Clone`
impl<P> Clone for AuthAppState<P> {
    fn clone(&self) -> Self {
        Self {
            provider: self.provider.clone(),
            config: self.config.clone(),
        }
    }
}

// ============================================================================
// Sign Up
// ============================================================================

/// POST /api/signup
pub async fn sign_up<P>(
    State(state): State<AuthAppState<P>>,
    payload: Result<Json<SignUpRequest>, JsonRejection>,
) -> AuthResult<impl IntoResponse>
where
    P: SignUpProvider + Sync + 'static,
{
    let Json(req) = payload.map_err(|e| AuthError::MalformedPayload(e.body_text()))?;

    let new_user = NewUser::new(&req.email, req.password, req.display_name)?;

    let use_case = SignUpUseCase::new(state.provider.clone(), state.config.clone());
    let user = use_case.execute(new_user).await?;

    Ok((StatusCode::CREATED, Json(SignUpResponse::from(user))))
}

// ============================================================================
// Sign In
// ============================================================================

/// POST /api/signin
///
/// Expects `Authorization: jwt <token>`. The session is returned only as an
/// HTTP-only cookie, and only when the exchange succeeded.
pub async fn sign_in<P>(
    State(state): State<AuthAppState<P>>,
    headers: HeaderMap,
) -> AuthResult<impl IntoResponse>
where
    P: SignInProvider + Sync + 'static,
{
    let token = extract_credential(&headers, JWT_SCHEME)?;

    let use_case = SignInUseCase::new(state.provider.clone(), state.config.clone());
    let session = use_case.execute(&token).await?;

    let cookie = state
        .config
        .session_cookie()
        .set_cookie(session.value(), session.expires_in())
        .map_err(|e| {
            AuthError::contract_violation(ProviderOperation::SessionCookie, e.to_string())
        })?;

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(SignInResponse::success()),
    ))
}
