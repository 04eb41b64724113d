// ABOUTME: Contact email address for certificate authority registration.
// ABOUTME: Light structural validation only; the CA performs the real check.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContactEmailError {
    #[error("contact email cannot be empty")]
    Empty,

    #[error("contact email is not a valid address: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactEmail(String);

impl ContactEmail {
    pub fn parse(value: &str) -> Result<Self, ContactEmailError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(ContactEmailError::Empty);
        }

        let malformed = || ContactEmailError::Malformed(value.to_string());
        let (local, host) = value.split_once('@').ok_or_else(malformed)?;
        if local.is_empty()
            || host.contains('@')
            || !host.contains('.')
            || host.starts_with('.')
            || host.ends_with('.')
            || value.chars().any(|c| c.is_whitespace() || c == '\'' || c == '"')
        {
            return Err(malformed());
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContactEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_address() {
        assert_eq!(
            ContactEmail::parse(" ops@example.com ").unwrap().as_str(),
            "ops@example.com"
        );
    }

    #[test]
    fn rejects_malformed() {
        assert_eq!(ContactEmail::parse(""), Err(ContactEmailError::Empty));
        assert!(ContactEmail::parse("ops").is_err());
        assert!(ContactEmail::parse("@example.com").is_err());
        assert!(ContactEmail::parse("ops@localhost").is_err());
        assert!(ContactEmail::parse("o ps@example.com").is_err());
    }
}
