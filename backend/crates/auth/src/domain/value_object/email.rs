//! Email Value Object
//!
//! 登録時のメールアドレス。RFC 5322 の mailbox（RFC 6532 の UTF-8 を含む）として
//! 解釈できるものだけを受け付ける。
//!
//! ## 受け付ける形式
//! - `addr-spec`（`user@example.com`、`"john doe"@example.com`、`a@[127.0.0.1]`）
//! - `name-addr`（`Alice <user@example.com>`、`"Doe, J" <j@example.com>`）
//! - 前後の CFWS（`a@b.com (work)`）
//!
//! 表示名とコメントは捨て、`addr-spec` のみ保持する。
//! 実在確認は IdP 側の責務であり、ここでは構文のみ検証する。

use kernel::error::app_error::{AppError, AppResult};
use serde::Serialize;
use std::str::FromStr;

/// Email address value object
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Email(String);

impl Email {
    /// Create a new email with validation
    pub fn new(email: impl AsRef<str>) -> AppResult<Self> {
        let email = email.as_ref();

        if email.is_empty() {
            return Err(AppError::bad_request("email must be a non-empty string"));
        }

        MailboxParser::new(email)
            .mailbox()
            .map(Self)
            .ok_or_else(|| AppError::bad_request("email is not a valid mailbox address"))
    }

    /// Get the email as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the domain part of the email
    pub fn domain(&self) -> &str {
        self.0.rsplit_once('@').map(|(_, d)| d).unwrap_or("")
    }
}

impl FromStr for Email {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        Email::new(s)
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// RFC 5322 grammar
// ============================================================================

/// VCHAR, plus any non-ASCII character (RFC 6532)
fn is_vchar(c: char) -> bool {
    ('!'..='~').contains(&c) || !c.is_ascii()
}

fn is_wsp(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// `atext`; `.` only when parsing a dot-atom
fn is_atext(c: char, dot: bool) -> bool {
    match c {
        '.' => dot,
        '(' | ')' | '<' | '>' | '[' | ']' | ':' | ';' | '@' | '\\' | ',' | '"' => false,
        _ => is_vchar(c),
    }
}

fn is_qtext(c: char) -> bool {
    c != '"' && c != '\\' && is_vchar(c)
}

fn is_dtext(c: char) -> bool {
    c != '[' && c != ']' && c != '\\' && is_vchar(c)
}

/// Atoms joined by single dots
fn is_dot_atom(s: &str) -> bool {
    !s.is_empty() && !s.starts_with('.') && !s.ends_with('.') && !s.contains("..")
}

/// Local part in its canonical written form
fn quote_local_part(text: &str) -> String {
    if is_dot_atom(text) && text.chars().all(|c| is_atext(c, true)) {
        return text.to_string();
    }

    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// Recursive-descent parser over a single mailbox
#[derive(Clone, Copy)]
struct MailboxParser<'a> {
    rest: &'a str,
}

impl<'a> MailboxParser<'a> {
    fn new(input: &'a str) -> Self {
        Self { rest: input }
    }

    fn peek(&self) -> Option<char> {
        self.rest.chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.rest = &self.rest[c.len_utf8()..];
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.rest = &self.rest[expected.len_utf8()..];
            true
        } else {
            false
        }
    }

    fn skip_space(&mut self) {
        self.rest = self.rest.trim_start_matches(is_wsp);
    }

    /// Whitespace and (nested) comments; `None` on an unterminated comment
    fn skip_cfws(&mut self) -> Option<()> {
        loop {
            self.skip_space();
            if self.peek() != Some('(') {
                return Some(());
            }
            self.comment()?;
        }
    }

    fn comment(&mut self) -> Option<()> {
        self.bump();
        let mut depth = 1;
        while depth > 0 {
            match self.bump()? {
                '\\' => {
                    self.bump()?;
                }
                '(' => depth += 1,
                ')' => depth -= 1,
                _ => {}
            }
        }
        Some(())
    }

    fn atom(&mut self, dot: bool) -> Option<&'a str> {
        let end = self
            .rest
            .find(|c| !is_atext(c, dot))
            .unwrap_or(self.rest.len());
        if end == 0 {
            return None;
        }
        let (atom, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(atom)
    }

    /// Unescaped content of a quoted-string
    fn quoted_string(&mut self) -> Option<String> {
        if !self.eat('"') {
            return None;
        }
        let mut content = String::new();
        loop {
            match self.bump()? {
                '"' => return Some(content),
                '\\' => {
                    let c = self.bump()?;
                    if !is_vchar(c) && !is_wsp(c) {
                        return None;
                    }
                    content.push(c);
                }
                c if is_qtext(c) || is_wsp(c) => content.push(c),
                _ => return None,
            }
        }
    }

    fn domain_literal(&mut self) -> Option<&'a str> {
        let end = self.rest.find(']')?;
        let literal = &self.rest[..=end];
        if !literal[1..end].chars().all(|c| is_dtext(c) || is_wsp(c)) {
            return None;
        }
        self.rest = &self.rest[end + 1..];
        Some(literal)
    }

    /// `local-part "@" domain`
    fn addr_spec(&mut self) -> Option<String> {
        self.skip_space();

        let local = if self.peek() == Some('"') {
            let content = self.quoted_string()?;
            if content.is_empty() {
                return None;
            }
            quote_local_part(&content)
        } else {
            let atom = self.atom(true)?;
            if !is_dot_atom(atom) {
                return None;
            }
            atom.to_string()
        };

        if !self.eat('@') {
            return None;
        }
        self.skip_space();

        let domain = if self.peek() == Some('[') {
            self.domain_literal()?
        } else {
            let atom = self.atom(true)?;
            if !is_dot_atom(atom) {
                return None;
            }
            atom
        };

        Some(format!("{}@{}", local, domain))
    }

    /// One or more words (atoms or quoted-strings); obsolete dots allowed
    fn phrase(&mut self) -> Option<()> {
        let mut words = 0;
        loop {
            self.skip_cfws()?;
            match self.peek() {
                Some('"') => {
                    self.quoted_string()?;
                }
                Some(c) if is_atext(c, true) => {
                    self.atom(true)?;
                }
                _ => break,
            }
            words += 1;
        }
        (words > 0).then_some(())
    }

    /// `addr-spec` or `[display-name] "<" addr-spec ">"`, surrounded by CFWS
    fn mailbox(mut self) -> Option<String> {
        self.skip_cfws()?;

        let mut bare = self;
        if let Some(spec) = bare.addr_spec() {
            if bare.skip_cfws().is_some() && bare.rest.is_empty() {
                return Some(spec);
            }
        }

        if self.peek() != Some('<') {
            self.phrase()?;
        }
        self.skip_cfws()?;
        if !self.eat('<') {
            return None;
        }
        let spec = self.addr_spec()?;
        if !self.eat('>') {
            return None;
        }
        self.skip_cfws()?;

        self.rest.is_empty().then_some(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(input: &str) -> String {
        Email::new(input).unwrap().as_str().to_string()
    }

    #[test]
    fn test_email_valid() {
        assert!(Email::new("a@b.com").is_ok());
        assert!(Email::new("user.name@example.co.jp").is_ok());
        assert!(Email::new("user+tag@example.com").is_ok());
        assert!(Email::new("o'brien@example.ie").is_ok());
        assert!(Email::new("root@localhost").is_ok());
        assert!(Email::new("user@-example.com").is_ok());
    }

    #[test]
    fn test_email_invalid() {
        assert!(Email::new("").is_err());
        assert!(Email::new("not-an-email").is_err());
        assert!(Email::new("user@").is_err());
        assert!(Email::new("@example.com").is_err());
        assert!(Email::new("user@@example.com").is_err());
        assert!(Email::new("user..name@example.com").is_err());
        assert!(Email::new(".user@example.com").is_err());
        assert!(Email::new("user@example..com").is_err());
        assert!(Email::new("us er@example.com").is_err());
        assert!(Email::new("\"\"@example.com").is_err());
        assert!(Email::new("a@b.com (unterminated").is_err());
    }

    #[test]
    fn test_email_name_addr_keeps_addr_spec() {
        assert_eq!(parsed("Alice <alice@example.com>"), "alice@example.com");
        assert_eq!(parsed("<alice@example.com>"), "alice@example.com");
        assert_eq!(parsed("\"Doe, Jane\" <jane@example.com>"), "jane@example.com");
        assert!(Email::new("Alice <alice@example.com").is_err());
        assert!(Email::new("Alice <not-an-email>").is_err());
    }

    #[test]
    fn test_email_display_name_must_be_a_phrase() {
        assert!(Email::new("a@b <c@d.com>").is_err());
        assert!(Email::new("<<a@b.com>").is_err());
        assert!(Email::new("Alice, Bob <a@b.com>").is_err());
        assert!(Email::new("<a@b.com> trailing").is_err());
    }

    #[test]
    fn test_email_rfc5322_forms() {
        assert_eq!(parsed("\"john doe\"@example.com"), "\"john doe\"@example.com");
        assert_eq!(parsed("\"plain\"@example.com"), "plain@example.com");
        assert_eq!(parsed("a@b.com (work)"), "a@b.com");
        assert_eq!(parsed("(home) a@b.com"), "a@b.com");
        assert_eq!(parsed("a@[127.0.0.1]"), "a@[127.0.0.1]");
        assert_eq!(parsed("josé@example.com"), "josé@example.com");
    }

    #[test]
    fn test_email_empty_message() {
        let err = Email::new("").unwrap_err();
        assert_eq!(err.message(), "email must be a non-empty string");
    }

    #[test]
    fn test_email_domain() {
        let email = Email::new("user@example.com").unwrap();
        assert_eq!(email.domain(), "example.com");
        assert_eq!(Email::new("a@[10.0.0.1]").unwrap().domain(), "[10.0.0.1]");
    }
}
