//! Display Name Value Object

use derive_more::Display;
use kernel::error::app_error::{AppError, AppResult};

/// 画面表示用の名前（空文字は不可、空白のみは可）
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub struct DisplayName(String);

impl DisplayName {
    pub fn new(name: impl Into<String>) -> AppResult<Self> {
        let name = name.into();

        if name.is_empty() {
            return Err(AppError::bad_request(
                "display name must be a non-empty string",
            ));
        }

        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name() {
        assert_eq!(DisplayName::new("Alice").unwrap().as_str(), "Alice");
        assert_eq!(DisplayName::new("山田 太郎").unwrap().to_string(), "山田 太郎");
        assert!(DisplayName::new("").is_err());
        assert_eq!(DisplayName::new("   ").unwrap().as_str(), "   ");
    }
}
