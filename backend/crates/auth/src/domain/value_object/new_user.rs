//! NewUser Value Object
//!
//! 登録リクエスト。コンストラクタを通過したインスタンスは常に
//! メール → パスワード → 表示名 の順の検証をすべて満たしている。

use crate::domain::value_object::{display_name::DisplayName, email::Email, password::Password};
use crate::error::{AuthError, AuthResult};

/// Validated registration request
#[derive(Debug)]
pub struct NewUser {
    email: Email,
    password: Password,
    display_name: DisplayName,
}

impl NewUser {
    /// Validate all fields, reporting the first failure
    pub fn new(
        email: impl AsRef<str>,
        password: impl Into<String>,
        display_name: impl Into<String>,
    ) -> AuthResult<Self> {
        let email =
            Email::new(email).map_err(|e| AuthError::Validation(e.message().to_string()))?;
        let password = Password::new(password).map_err(|e| AuthError::Validation(e.to_string()))?;
        let display_name = DisplayName::new(display_name)
            .map_err(|e| AuthError::Validation(e.message().to_string()))?;

        Ok(Self {
            email,
            password,
            display_name,
        })
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn password(&self) -> &Password {
        &self.password
    }

    pub fn display_name(&self) -> &DisplayName {
        &self.display_name
    }
}
