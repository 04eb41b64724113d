// ABOUTME: SSH-specific error types.
// ABOUTME: Covers connection, authentication, and remote command failures.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("connection to {host}:{port} timed out after {timeout:?}")]
    ConnectTimeout {
        host: String,
        port: u16,
        timeout: Duration,
    },

    #[error("authentication failed for user {0}: no valid credentials")]
    AuthenticationFailed(String),

    #[error("SSH agent not available: {0}")]
    AgentUnavailable(String),

    #[error("failed to load key from {path}: {reason}")]
    KeyLoadFailed { path: PathBuf, reason: String },

    #[error("command execution failed: {0}")]
    CommandFailed(String),

    #[error("`{command}` exited with code {exit_code}: {stderr}")]
    NonZeroExit {
        command: String,
        exit_code: u32,
        stderr: String,
    },

    #[error("command timed out after {0:?}")]
    CommandTimeout(Duration),

    #[error("channel closed unexpectedly without exit status")]
    ChannelClosed,

    #[error("SSH protocol error: {0}")]
    Protocol(#[from] russh::Error),

    #[error("SSH key error: {0}")]
    Key(#[from] russh::keys::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the failure happened before a session was established.
    pub fn is_connectivity(&self) -> bool {
        matches!(
            self,
            Error::Connection(_) | Error::ConnectTimeout { .. } | Error::Protocol(_)
        )
    }

    /// Whether the remote host refused our identity.
    pub fn is_authentication(&self) -> bool {
        matches!(
            self,
            Error::AuthenticationFailed(_) | Error::AgentUnavailable(_) | Error::KeyLoadFailed { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
