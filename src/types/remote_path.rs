// ABOUTME: Absolute deployment directory on the remote host.
// ABOUTME: Joins manifest-relative paths and renders shell-safe arguments.

use crate::shell;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RemotePathError {
    #[error("remote path cannot be empty")]
    Empty,

    #[error("remote path must be absolute: {0}")]
    NotAbsolute(String),

    #[error("remote path cannot be the filesystem root")]
    Root,

    #[error("remote path contains a control character")]
    ControlChar,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemotePath(String);

impl RemotePath {
    pub fn new(value: &str) -> Result<Self, RemotePathError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(RemotePathError::Empty);
        }
        if !value.starts_with('/') {
            return Err(RemotePathError::NotAbsolute(value.to_string()));
        }
        if value.chars().any(|c| c.is_control()) {
            return Err(RemotePathError::ControlChar);
        }

        let trimmed = value.trim_end_matches('/');
        if trimmed.is_empty() {
            // Mirroring with deletion into / would be catastrophic.
            return Err(RemotePathError::Root);
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path of a manifest-relative entry below this directory.
    pub fn join(&self, relative: &str) -> String {
        format!("{}/{}", self.0, relative.trim_start_matches("./"))
    }

    /// Shell-quoted form of [`RemotePath::join`].
    pub fn quoted_join(&self, relative: &str) -> String {
        shell::quote(&self.join(relative))
    }

    pub fn quoted(&self) -> String {
        shell::quote(&self.0)
    }
}

impl fmt::Display for RemotePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
