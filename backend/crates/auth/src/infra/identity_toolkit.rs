//! Identity Toolkit Adapter
//!
//! Binds both provider ports to an Identity-Toolkit-style REST API.
//!
//! | Port operation | Endpoint |
//! |---|---|
//! | `verify_token` | `POST /v1/accounts:lookup?key=…` |
//! | `session_cookie` | `POST /v1/projects/{project}:createSessionCookie` (Bearer) |
//! | `create` | `POST /v1/accounts:signUp?key=…` |
//!
//! `verify_token` and `session_cookie` are idempotent and retried with
//! exponential backoff while the provider is unavailable. `create` is
//! never retried.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::entity::{token::Token, user::User};
use crate::domain::port::{SignInProvider, SignUpProvider};
use crate::domain::value_object::{new_user::NewUser, session::Session};
use crate::error::{AuthError, AuthResult, ProviderOperation};

const DEFAULT_BASE_URL: &str = "https://identitytoolkit.googleapis.com";

/// Provider error code for an already registered email
const EMAIL_EXISTS: &str = "EMAIL_EXISTS";

// ============================================================================
// Configuration
// ============================================================================

/// Error while configuring the adapter
#[derive(Debug, Error)]
pub enum IdentityProviderError {
    #[error("{0} must be set")]
    MissingVariable(&'static str),

    #[error("{name} has an invalid value: {value}")]
    InvalidVariable { name: &'static str, value: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Identity Toolkit adapter configuration
#[derive(Debug, Clone)]
pub struct IdentityToolkitConfig {
    pub base_url: String,
    pub project_id: String,
    pub api_key: String,
    /// OAuth access token for project-scoped (admin) endpoints
    pub access_token: Option<String>,
    pub http_timeout: Duration,
    /// Retries for idempotent calls only
    pub max_retries: u32,
    pub retry_backoff: Duration,
}

impl IdentityToolkitConfig {
    pub fn new(project_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            project_id: project_id.into(),
            api_key: api_key.into(),
            access_token: None,
            http_timeout: Duration::from_secs(10),
            max_retries: 2,
            retry_backoff: Duration::from_millis(200),
        }
    }

    /// Read `IDENTITY_*` environment variables
    pub fn from_env() -> Result<Self, IdentityProviderError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(
        lookup: impl Fn(&'static str) -> Option<String>,
    ) -> Result<Self, IdentityProviderError> {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.is_empty())
                .ok_or(IdentityProviderError::MissingVariable(name))
        };

        let mut config = Self::new(
            required("IDENTITY_PROJECT_ID")?,
            required("IDENTITY_API_KEY")?,
        );

        if let Some(base_url) = lookup("IDENTITY_BASE_URL") {
            config.base_url = base_url;
        }
        config.access_token = lookup("IDENTITY_ACCESS_TOKEN").filter(|v| !v.is_empty());

        if let Some(value) = lookup("IDENTITY_HTTP_TIMEOUT_SECS") {
            let secs = value
                .parse::<u64>()
                .map_err(|_| IdentityProviderError::InvalidVariable {
                    name: "IDENTITY_HTTP_TIMEOUT_SECS",
                    value,
                })?;
            config.http_timeout = Duration::from_secs(secs);
        }

        if let Some(value) = lookup("IDENTITY_MAX_RETRIES") {
            config.max_retries =
                value
                    .parse::<u32>()
                    .map_err(|_| IdentityProviderError::InvalidVariable {
                        name: "IDENTITY_MAX_RETRIES",
                        value,
                    })?;
        }

        Ok(config)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/v1/{}", self.base_url.trim_end_matches('/'), path)
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupRequest<'a> {
    id_token: &'a str,
}

#[derive(Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    local_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionCookieRequest<'a> {
    id_token: &'a str,
    valid_duration: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionCookieResponse {
    #[serde(default)]
    session_cookie: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignUpRequest<'a> {
    email: &'a str,
    password: &'a str,
    display_name: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignUpResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Claims carried in the token payload
#[derive(Debug, Deserialize)]
struct Claims {
    auth_time: i64,
    iss: String,
    aud: String,
    exp: i64,
    iat: i64,
    sub: String,
    #[serde(default)]
    user_id: Option<String>,
}

impl From<Claims> for Token {
    fn from(claims: Claims) -> Self {
        let uid = claims.user_id.unwrap_or_else(|| claims.sub.clone());
        Token {
            auth_time: claims.auth_time,
            issuer: claims.iss,
            audience: claims.aud,
            expires: claims.exp,
            issued_at: claims.iat,
            subject: claims.sub,
            uid,
        }
    }
}

/// Decode the (already provider-verified) payload segment of a JWT
fn decode_claims(token: &str) -> Result<Claims, String> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or_else(|| "token has no payload segment".to_string())?;

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| format!("payload is not base64url: {}", e))?;

    serde_json::from_slice(&bytes).map_err(|e| format!("payload claims unreadable: {}", e))
}

// ============================================================================
// Call errors
// ============================================================================

/// Outcome of a failed HTTP exchange, before it is given a domain meaning
#[derive(Debug)]
enum CallError {
    /// Connect/timeout/body errors
    Transport(reqwest::Error),
    /// Non-success status with the provider's error code (if any)
    Status { status: StatusCode, code: String },
    /// Success status but unreadable body
    Decode(reqwest::Error),
}

impl CallError {
    /// Mapping shared by every operation; callers handle their special cases first
    fn into_auth_error(self, operation: ProviderOperation) -> AuthError {
        match self {
            CallError::Transport(e) => AuthError::unavailable(operation, e.to_string()),
            CallError::Status { status, code } if status.is_server_error() => {
                AuthError::unavailable(operation, format!("{} {}", status, code))
            }
            CallError::Status { status, code } => {
                AuthError::provider(operation, format!("{} {}", status, code))
            }
            CallError::Decode(e) => AuthError::contract_violation(operation, e.to_string()),
        }
    }

    /// Token rejection: the provider answered 400 for a token operation
    fn into_token_error(self, operation: ProviderOperation) -> AuthError {
        match self {
            CallError::Status { status, code } if status == StatusCode::BAD_REQUEST => {
                AuthError::InvalidCredential {
                    operation,
                    reason: code,
                }
            }
            other => other.into_auth_error(operation),
        }
    }
}

/// `"WEAK_PASSWORD : Password should be…"` → `"WEAK_PASSWORD"`
fn error_code(message: &str) -> String {
    message
        .split([' ', ':'])
        .next()
        .unwrap_or_default()
        .to_string()
}

// ============================================================================
// Adapter
// ============================================================================

/// Identity Toolkit REST adapter
#[derive(Clone)]
pub struct IdentityToolkitProvider {
    http: reqwest::Client,
    config: Arc<IdentityToolkitConfig>,
}

impl std::fmt::Debug for IdentityToolkitProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityToolkitProvider")
            .field("base_url", &self.config.base_url)
            .field("project_id", &self.config.project_id)
            .finish()
    }
}

impl IdentityToolkitProvider {
    pub fn new(config: IdentityToolkitConfig) -> Result<Self, IdentityProviderError> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        Ok(Self {
            http,
            config: Arc::new(config),
        })
    }

    async fn post<B, R>(&self, request: reqwest::RequestBuilder, body: &B) -> Result<R, CallError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = request.json(body).send().await.map_err(CallError::Transport)?;

        let status = response.status();
        if status.is_success() {
            return response.json::<R>().await.map_err(CallError::Decode);
        }

        let code = response
            .json::<ErrorEnvelope>()
            .await
            .map(|envelope| error_code(&envelope.error.message))
            .unwrap_or_default();

        Err(CallError::Status { status, code })
    }

    /// Retry an idempotent call while the provider is unavailable
    async fn with_retry<T, F, Fut>(&self, operation: ProviderOperation, mut call: F) -> AuthResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = AuthResult<T>>,
    {
        let mut attempt: u32 = 0;
        loop {
            match call().await {
                Err(err)
                    if matches!(err, AuthError::ProviderUnavailable { .. })
                        && attempt < self.config.max_retries =>
                {
                    let delay = self.config.retry_backoff.saturating_mul(1 << attempt.min(16));
                    tracing::debug!(
                        %operation,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Retrying identity provider call"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    async fn lookup_once(&self, token: &str) -> AuthResult<Token> {
        const OP: ProviderOperation = ProviderOperation::VerifyToken;

        let request = self
            .http
            .post(self.config.endpoint("accounts:lookup"))
            .query(&[("key", self.config.api_key.as_str())]);

        let response: LookupResponse = self
            .post(request, &LookupRequest { id_token: token })
            .await
            .map_err(|e| e.into_token_error(OP))?;

        let Some(account) = response.users.first() else {
            return Err(AuthError::InvalidCredential {
                operation: OP,
                reason: "no account for token".to_string(),
            });
        };

        let token: Token = decode_claims(token)
            .map_err(|reason| AuthError::contract_violation(OP, reason))?
            .into();

        if token.uid != account.local_id {
            return Err(AuthError::contract_violation(
                OP,
                "token subject does not match the looked-up account",
            ));
        }

        Ok(token)
    }

    async fn session_cookie_once(&self, token: &str, expires_in: Duration) -> AuthResult<Session> {
        const OP: ProviderOperation = ProviderOperation::SessionCookie;

        let mut request = self.http.post(
            self.config
                .endpoint(&format!("projects/{}:createSessionCookie", self.config.project_id)),
        );
        if let Some(access_token) = &self.config.access_token {
            request = request.bearer_auth(access_token);
        }

        let body = SessionCookieRequest {
            id_token: token,
            valid_duration: expires_in.as_secs(),
        };

        let response: SessionCookieResponse = self
            .post(request, &body)
            .await
            .map_err(|e| e.into_token_error(OP))?;

        Session::new(response.session_cookie, expires_in)
            .map_err(|e| AuthError::contract_violation(OP, e.to_string()))
    }
}

impl SignInProvider for IdentityToolkitProvider {
    async fn verify_token(&self, token: &str) -> AuthResult<Token> {
        self.with_retry(ProviderOperation::VerifyToken, || self.lookup_once(token))
            .await
    }

    async fn session_cookie(&self, token: &str, expires_in: Duration) -> AuthResult<Session> {
        self.with_retry(ProviderOperation::SessionCookie, || {
            self.session_cookie_once(token, expires_in)
        })
        .await
    }
}

impl SignUpProvider for IdentityToolkitProvider {
    async fn create(&self, new_user: &NewUser) -> AuthResult<User> {
        const OP: ProviderOperation = ProviderOperation::CreateUser;

        let request = self
            .http
            .post(self.config.endpoint("accounts:signUp"))
            .query(&[("key", self.config.api_key.as_str())]);

        let body = SignUpRequest {
            email: new_user.email().as_str(),
            password: new_user.password().expose(),
            display_name: new_user.display_name().as_str(),
        };

        let response: SignUpResponse =
            self.post(request, &body).await.map_err(|e| match e {
                CallError::Status { code, .. } if code == EMAIL_EXISTS => {
                    AuthError::DuplicateAccount
                }
                other => other.into_auth_error(OP),
            })?;

        if response.local_id.is_empty() {
            return Err(AuthError::contract_violation(OP, "created account has no id"));
        }

        Ok(User::new(
            response.local_id,
            response
                .email
                .unwrap_or_else(|| new_user.email().as_str().to_string()),
            response
                .display_name
                .unwrap_or_else(|| new_user.display_name().as_str().to_string()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::extract::State;
    use axum::http::StatusCode as AxumStatus;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{Value, json};
    use tokio::net::TcpListener;

    fn jwt(claims: Value) -> String {
        format!(
            "{}.{}.signature",
            URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256"}"#),
            URL_SAFE_NO_PAD.encode(claims.to_string())
        )
    }

    fn claims(uid: &str, auth_time: i64) -> Value {
        json!({
            "auth_time": auth_time,
            "iss": "https://securetoken.google.com/project",
            "aud": "project",
            "exp": auth_time + 3600,
            "iat": auth_time,
            "sub": uid,
            "user_id": uid,
        })
    }

    #[test]
    fn test_decode_claims() {
        let claims = decode_claims(&jwt(claims("uid-1", 1_700_000_000))).unwrap();
        let token: Token = claims.into();
        assert_eq!(token.uid, "uid-1");
        assert_eq!(token.auth_time, 1_700_000_000);
        assert_eq!(token.audience, "project");
    }

    #[test]
    fn test_decode_claims_rejects_garbage() {
        assert!(decode_claims("not-a-jwt").is_err());
        assert!(decode_claims("a.!!!.c").is_err());
        assert!(decode_claims(&format!("a.{}.c", URL_SAFE_NO_PAD.encode("{}"))).is_err());
    }

    #[test]
    fn test_error_code() {
        assert_eq!(error_code("EMAIL_EXISTS"), "EMAIL_EXISTS");
        assert_eq!(
            error_code("WEAK_PASSWORD : Password should be at least 6 characters"),
            "WEAK_PASSWORD"
        );
        assert_eq!(error_code(""), "");
    }

    #[test]
    fn test_token_error_mapping() {
        let rejected = CallError::Status {
            status: StatusCode::BAD_REQUEST,
            code: "INVALID_ID_TOKEN".to_string(),
        };
        assert!(matches!(
            rejected.into_token_error(ProviderOperation::VerifyToken),
            AuthError::InvalidCredential { .. }
        ));

        let outage = CallError::Status {
            status: StatusCode::SERVICE_UNAVAILABLE,
            code: String::new(),
        };
        assert!(matches!(
            outage.into_token_error(ProviderOperation::VerifyToken),
            AuthError::ProviderUnavailable { .. }
        ));

        let forbidden = CallError::Status {
            status: StatusCode::FORBIDDEN,
            code: "PERMISSION_DENIED".to_string(),
        };
        assert!(matches!(
            forbidden.into_token_error(ProviderOperation::SessionCookie),
            AuthError::Provider { .. }
        ));
    }

    #[test]
    fn test_config_from_lookup() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("IDENTITY_PROJECT_ID", "project"),
            ("IDENTITY_API_KEY", "key"),
            ("IDENTITY_BASE_URL", "http://127.0.0.1:9099"),
            ("IDENTITY_MAX_RETRIES", "0"),
        ]);
        let config =
            IdentityToolkitConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string()))
                .unwrap();

        assert_eq!(config.project_id, "project");
        assert_eq!(config.max_retries, 0);
        assert_eq!(
            config.endpoint("accounts:lookup"),
            "http://127.0.0.1:9099/v1/accounts:lookup"
        );
        assert!(config.access_token.is_none());
    }

    #[test]
    fn test_config_requires_project_and_key() {
        let result = IdentityToolkitConfig::from_lookup(|_| None);
        assert!(matches!(
            result,
            Err(IdentityProviderError::MissingVariable("IDENTITY_PROJECT_ID"))
        ));

        let result = IdentityToolkitConfig::from_lookup(|name| {
            (name == "IDENTITY_PROJECT_ID").then(|| "project".to_string())
        });
        assert!(matches!(
            result,
            Err(IdentityProviderError::MissingVariable("IDENTITY_API_KEY"))
        ));
    }

    #[test]
    fn test_config_rejects_bad_numbers() {
        let result = IdentityToolkitConfig::from_lookup(|name| match name {
            "IDENTITY_PROJECT_ID" | "IDENTITY_API_KEY" => Some("x".to_string()),
            "IDENTITY_HTTP_TIMEOUT_SECS" => Some("soon".to_string()),
            _ => None,
        });
        assert!(matches!(
            result,
            Err(IdentityProviderError::InvalidVariable { .. })
        ));
    }

    // ------------------------------------------------------------------------
    // Against a local stand-in for the REST API
    // ------------------------------------------------------------------------

    #[derive(Clone, Default)]
    struct Stub {
        lookup_calls: Arc<AtomicUsize>,
        signup_calls: Arc<AtomicUsize>,
        /// lookup answers 503 this many times before succeeding
        lookup_failures: usize,
    }

    async fn lookup(State(stub): State<Stub>, Json(body): Json<Value>) -> (AxumStatus, Json<Value>) {
        let call = stub.lookup_calls.fetch_add(1, Ordering::SeqCst);
        if call < stub.lookup_failures {
            return (AxumStatus::SERVICE_UNAVAILABLE, Json(json!({})));
        }
        let token = body["idToken"].as_str().unwrap_or_default();
        match decode_claims(token) {
            Ok(claims) => (
                AxumStatus::OK,
                Json(json!({ "users": [{ "localId": claims.sub }] })),
            ),
            Err(_) => (
                AxumStatus::BAD_REQUEST,
                Json(json!({ "error": { "code": 400, "message": "INVALID_ID_TOKEN" } })),
            ),
        }
    }

    async fn session_cookie(Json(body): Json<Value>) -> Json<Value> {
        let cookie = if body["validDuration"] == json!(172800) {
            "minted-cookie"
        } else {
            ""
        };
        Json(json!({ "sessionCookie": cookie }))
    }

    async fn sign_up(State(stub): State<Stub>, Json(body): Json<Value>) -> (AxumStatus, Json<Value>) {
        stub.signup_calls.fetch_add(1, Ordering::SeqCst);
        match body["email"].as_str() {
            Some("taken@example.com") => (
                AxumStatus::BAD_REQUEST,
                Json(json!({ "error": { "code": 400, "message": "EMAIL_EXISTS" } })),
            ),
            Some("outage@example.com") => (AxumStatus::SERVICE_UNAVAILABLE, Json(json!({}))),
            Some(email) => (
                AxumStatus::OK,
                Json(json!({ "localId": "new-uid", "email": email })),
            ),
            None => (AxumStatus::BAD_REQUEST, Json(json!({}))),
        }
    }

    async fn spawn(stub: Stub) -> IdentityToolkitProvider {
        let app = Router::new()
            .route("/v1/accounts:lookup", post(lookup))
            .route(
                "/v1/projects/project:createSessionCookie",
                post(session_cookie),
            )
            .route("/v1/accounts:signUp", post(sign_up))
            .with_state(stub);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let mut config = IdentityToolkitConfig::new("project", "key");
        config.base_url = format!("http://{}", addr);
        config.retry_backoff = Duration::from_millis(1);
        IdentityToolkitProvider::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_verify_token_decodes_claims() {
        let provider = spawn(Stub::default()).await;
        let token = provider
            .verify_token(&jwt(claims("uid-7", 1_700_000_000)))
            .await
            .unwrap();
        assert_eq!(token.uid, "uid-7");
        assert_eq!(token.auth_time, 1_700_000_000);
    }

    #[tokio::test]
    async fn test_verify_token_rejected() {
        let provider = spawn(Stub::default()).await;
        let result = provider.verify_token("garbage").await;
        assert!(matches!(result, Err(AuthError::InvalidCredential { .. })));
    }

    #[tokio::test]
    async fn test_verify_token_retries_while_unavailable() {
        let stub = Stub {
            lookup_failures: 2,
            ..Stub::default()
        };
        let calls = stub.lookup_calls.clone();
        let provider = spawn(stub).await;

        let result = provider.verify_token(&jwt(claims("uid-1", 1))).await;
        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_verify_token_gives_up_after_max_retries() {
        let stub = Stub {
            lookup_failures: usize::MAX,
            ..Stub::default()
        };
        let calls = stub.lookup_calls.clone();
        let provider = spawn(stub).await;

        let result = provider.verify_token(&jwt(claims("uid-1", 1))).await;
        assert!(matches!(result, Err(AuthError::ProviderUnavailable { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_session_cookie() {
        let provider = spawn(Stub::default()).await;
        let two_days = Duration::from_secs(172800);

        let session = provider.session_cookie("tkn", two_days).await.unwrap();
        assert_eq!(session.value(), "minted-cookie");
        assert_eq!(session.expires_in(), two_days);
    }

    #[tokio::test]
    async fn test_empty_session_cookie_is_contract_violation() {
        let provider = spawn(Stub::default()).await;
        let result = provider
            .session_cookie("tkn", Duration::from_secs(30 * 3600))
            .await;
        assert!(matches!(
            result,
            Err(AuthError::ProviderContractViolation {
                operation: ProviderOperation::SessionCookie,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_create_user() {
        let provider = spawn(Stub::default()).await;
        let new_user = NewUser::new("a@b.com", "Abcdef1!", "Alice").unwrap();

        let user = provider.create(&new_user).await.unwrap();
        assert_eq!(user.uid, "new-uid");
        assert_eq!(user.email, "a@b.com");
        assert_eq!(user.display_name, "Alice");
    }

    #[tokio::test]
    async fn test_create_user_duplicate() {
        let provider = spawn(Stub::default()).await;
        let new_user = NewUser::new("taken@example.com", "Abcdef1!", "Alice").unwrap();

        let result = provider.create(&new_user).await;
        assert!(matches!(result, Err(AuthError::DuplicateAccount)));
    }

    #[tokio::test]
    async fn test_create_user_is_not_retried() {
        let stub = Stub::default();
        let calls = stub.signup_calls.clone();
        let provider = spawn(stub).await;
        let new_user = NewUser::new("outage@example.com", "Abcdef1!", "Alice").unwrap();

        let result = provider.create(&new_user).await;
        assert!(matches!(result, Err(AuthError::ProviderUnavailable { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
