//! Password Value Object
//!
//! 登録用パスワード。ハッシュ化は IdP の責務なので、ここでは構成ポリシーの検証と
//! 平文の取り扱い（ゼロ化・ログ秘匿）のみを行う。
//!
//! ## 構成ポリシー
//! 文字を 1 回だけ走査し、各文字を Unicode 一般カテゴリで分類する。
//!
//! | 分類 | 効果 |
//! |---|---|
//! | 数字 (N*) | has-number |
//! | 大文字 (Lu) | has-upper、文字数 +1 |
//! | 句読点・記号 (P*, S*) | has-special |
//! | その他の文字 (L*) または半角スペース | 文字数 +1 |
//! | それ以外 | 即座に不許可文字として拒否 |
//!
//! 走査後、文字数 → 数字 → 大文字 → 記号 の順で最初に満たされない条件を報告する。

use std::fmt;

use thiserror::Error;
use unicode_properties::{GeneralCategory, GeneralCategoryGroup, UnicodeGeneralCategory};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// 必要な「文字」（英字・その他の文字・スペース）の最小数
pub const MIN_PASSWORD_LETTERS: usize = 6;

/// Password policy violation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PasswordPolicyError {
    #[error("password must be a non-empty string")]
    Empty,

    #[error("password contains a character outside the allowed set")]
    InvalidCharacter,

    #[error("password must be 6 or more characters long")]
    TooShort,

    #[error("password must contain a number")]
    MissingNumber,

    #[error("password must contain an upper letter")]
    MissingUpper,

    #[error("password must contain a special character")]
    MissingSpecial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Number,
    Upper,
    Special,
    Letter,
    Disallowed,
}

impl CharClass {
    fn of(c: char) -> Self {
        match c.general_category_group() {
            GeneralCategoryGroup::Number => CharClass::Number,
            _ if c.general_category() == GeneralCategory::UppercaseLetter => CharClass::Upper,
            GeneralCategoryGroup::Punctuation | GeneralCategoryGroup::Symbol => CharClass::Special,
            GeneralCategoryGroup::Letter => CharClass::Letter,
            _ if c == ' ' => CharClass::Letter,
            _ => CharClass::Disallowed,
        }
    }
}

/// 1 回の走査で得られる構成情報
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Composition {
    letters: usize,
    has_number: bool,
    has_upper: bool,
    has_special: bool,
}

impl Composition {
    fn scan(password: &str) -> Result<Self, PasswordPolicyError> {
        let mut composition = Self::default();

        for c in password.chars() {
            match CharClass::of(c) {
                CharClass::Number => composition.has_number = true,
                CharClass::Upper => {
                    composition.has_upper = true;
                    composition.letters += 1;
                }
                CharClass::Special => composition.has_special = true,
                CharClass::Letter => composition.letters += 1,
                CharClass::Disallowed => return Err(PasswordPolicyError::InvalidCharacter),
            }
        }

        Ok(composition)
    }

    fn check(&self) -> Result<(), PasswordPolicyError> {
        if self.letters < MIN_PASSWORD_LETTERS {
            return Err(PasswordPolicyError::TooShort);
        }
        if !self.has_number {
            return Err(PasswordPolicyError::MissingNumber);
        }
        if !self.has_upper {
            return Err(PasswordPolicyError::MissingUpper);
        }
        if !self.has_special {
            return Err(PasswordPolicyError::MissingSpecial);
        }
        Ok(())
    }
}

/// Clear text password that already satisfies the composition policy
///
/// ## Security
/// - Zeroized on drop
/// - No `Clone`
/// - Debug output is redacted
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Password(String);

impl Password {
    pub fn new(raw: impl Into<String>) -> Result<Self, PasswordPolicyError> {
        let raw = raw.into();

        if raw.is_empty() {
            return Err(PasswordPolicyError::Empty);
        }

        // 検証に失敗した平文もゼロ化してから捨てる
        let candidate = Self(raw);
        Composition::scan(&candidate.0)?.check()?;

        Ok(candidate)
    }

    /// 平文を IdP アダプタへ渡すときにだけ使う
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Password").field(&"[REDACTED]").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn err(raw: &str) -> PasswordPolicyError {
        Password::new(raw).unwrap_err()
    }

    #[test]
    fn test_valid_password() {
        let password = Password::new("Abcdef1!").unwrap();
        assert_eq!(password.expose(), "Abcdef1!");
    }

    #[test]
    fn test_reporting_order() {
        assert_eq!(err(""), PasswordPolicyError::Empty);
        assert_eq!(err("abcdef"), PasswordPolicyError::MissingNumber);
        assert_eq!(err("abcdef1"), PasswordPolicyError::MissingUpper);
        assert_eq!(err("Abcdef1"), PasswordPolicyError::MissingSpecial);
    }

    #[test]
    fn test_length_checked_before_other_conditions() {
        // only "A" counts as a letter
        assert_eq!(err("12345!A"), PasswordPolicyError::TooShort);
        assert_eq!(err("a"), PasswordPolicyError::TooShort);
    }

    #[test]
    fn test_spaces_count_as_letters() {
        assert_eq!(err("        "), PasswordPolicyError::MissingNumber);
        assert!(Password::new("A    1!x").is_ok());
    }

    #[test]
    fn test_digits_and_symbols_do_not_count_as_letters() {
        assert_eq!(err("Abcde1!!!!!!"), PasswordPolicyError::TooShort);
    }

    #[test]
    fn test_disallowed_character_rejects_whole_password() {
        assert_eq!(err("Abcdef1!\t"), PasswordPolicyError::InvalidCharacter);
        assert_eq!(err("\u{0007}"), PasswordPolicyError::InvalidCharacter);
        // combining acute accent is a mark, not a letter
        assert_eq!(err("Abcdef1!e\u{0301}"), PasswordPolicyError::InvalidCharacter);
    }

    #[test]
    fn test_unicode_letters_and_symbols() {
        assert!(Password::new("Ñandú9€x").is_ok());
        assert!(Password::new("パスワードです1!A").is_ok());
        // Arabic-Indic digit is a number
        assert!(Password::new("Abcdef\u{0663}!").is_ok());
    }

    #[test]
    fn test_debug_is_redacted() {
        let password = Password::new("Abcdef1!").unwrap();
        assert!(!format!("{:?}", password).contains("Abcdef1!"));
    }
}
