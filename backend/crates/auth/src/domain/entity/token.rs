//! Token Entity
//!
//! IdP が検証済みのクレームセット。アダプタが生の資格情報から生成し、
//! 1 回のサインイン処理でのみ使われる。

use std::time::Duration;

/// Provider-verified claims (times are Unix seconds)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub auth_time: i64,
    pub issuer: String,
    pub audience: String,
    pub expires: i64,
    pub issued_at: i64,
    pub subject: String,
    pub uid: String,
}

impl Token {
    /// Seconds elapsed since the user actually authenticated
    pub fn auth_age_secs(&self, now: i64) -> i64 {
        now - self.auth_time
    }

    /// 認証からの経過時間が `max_age` を超えているか（ちょうど `max_age` は許容）
    pub fn is_stale(&self, now: i64, max_age: Duration) -> bool {
        let max_age = i64::try_from(max_age.as_secs()).unwrap_or(i64::MAX);
        self.auth_age_secs(now) > max_age
    }
}
