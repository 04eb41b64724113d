// ABOUTME: Public domain name validation for edge configuration.
// ABOUTME: Enforces RFC 1123 hostname rules and normalizes to lowercase.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("domain cannot be empty")]
    Empty,

    #[error("domain exceeds maximum length of 253 characters")]
    TooLong,

    #[error("domain must contain at least one dot: {0}")]
    NotQualified(String),

    #[error("invalid domain label '{0}'")]
    InvalidLabel(String),
}

/// A fully qualified public hostname such as `n8n.example.com`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Domain(String);

impl Domain {
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        let value = value.trim().trim_end_matches('.').to_ascii_lowercase();
        if value.is_empty() {
            return Err(DomainError::Empty);
        }

        if value.len() > 253 {
            return Err(DomainError::TooLong);
        }

        if !value.contains('.') {
            return Err(DomainError::NotQualified(value));
        }

        for label in value.split('.') {
            let valid = !label.is_empty()
                && label.len() <= 63
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
            if !valid {
                return Err(DomainError::InvalidLabel(label.to_string()));
            }
        }

        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
