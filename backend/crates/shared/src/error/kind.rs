//! Error Kind - Classification of errors
//!
//! [`ErrorKind`] は失敗の分類であり、HTTP ステータスへの対応を一箇所に集約する。

use serde::Serialize;

/// エラー種別
///
/// 認証フロントドアで発生しうる失敗の分類。
/// 各バリアントは 1 つの HTTP ステータスコードに対応する。
///
/// ## Examples
/// ```rust
/// use kernel::error::kind::ErrorKind;
///
/// assert_eq!(ErrorKind::Conflict.status_code(), 409);
/// assert!(ErrorKind::ServiceUnavailable.is_retryable());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ErrorKind {
    /// 400 - 入力が検証規則を満たさない
    BadRequest,
    /// 401 - 資格情報が無効、または再認証が必要
    Unauthorized,
    /// 409 - 既存の状態と競合（アカウント重複など）
    Conflict,
    /// 500 - サーバー内部エラー
    InternalServerError,
    /// 502 - 上流（外部 IdP）が不正な応答を返した
    BadGateway,
    /// 503 - 上流に到達できない、またはタイムアウト
    ServiceUnavailable,
}

impl ErrorKind {
    /// HTTP ステータスコード
    #[inline]
    pub const fn status_code(&self) -> u16 {
        match self {
            ErrorKind::BadRequest => 400,
            ErrorKind::Unauthorized => 401,
            ErrorKind::Conflict => 409,
            ErrorKind::InternalServerError => 500,
            ErrorKind::BadGateway => 502,
            ErrorKind::ServiceUnavailable => 503,
        }
    }

    /// 標準の理由フレーズ
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "Bad Request",
            ErrorKind::Unauthorized => "Unauthorized",
            ErrorKind::Conflict => "Conflict",
            ErrorKind::InternalServerError => "Internal Server Error",
            ErrorKind::BadGateway => "Bad Gateway",
            ErrorKind::ServiceUnavailable => "Service Unavailable",
        }
    }

    /// 5xx 系かどうか
    #[inline]
    pub const fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }

    /// 呼び出し側がバックオフ付きで再試行してよい種別かどうか
    ///
    /// 上流の一時的な障害のみが対象。検証エラーや資格情報エラーは
    /// 同じ入力で再試行しても結果が変わらないため `false`。
    #[inline]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::BadGateway | ErrorKind::ServiceUnavailable)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
