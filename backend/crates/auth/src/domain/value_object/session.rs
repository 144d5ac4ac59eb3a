//! Session Value Object
//!
//! IdP が発行したセッション資格情報（不透明な値）と有効期間。
//! どの経路で生成されても、空の値や 24 時間未満の有効期間を持つ
//! インスタンスは存在できない。

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// セッション有効期間の下限（24 時間）
pub const MIN_SESSION_DURATION: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("session value must be a non-empty string")]
    EmptyValue,

    #[error("the session must not expire in less than 24h (got {}s)", .actual.as_secs())]
    TooShort { actual: Duration },
}

/// Application session credential
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    value: String,
    expires_in: Duration,
}

impl Session {
    pub fn new(value: impl Into<String>, expires_in: Duration) -> Result<Self, SessionError> {
        let value = value.into();

        if value.is_empty() {
            return Err(SessionError::EmptyValue);
        }
        if expires_in < MIN_SESSION_DURATION {
            return Err(SessionError::TooShort { actual: expires_in });
        }

        Ok(Self { value, expires_in })
    }

    /// クッキーに載せる不透明な値
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn expires_in(&self) -> Duration {
        self.expires_in
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("value", &"[REDACTED]")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}
