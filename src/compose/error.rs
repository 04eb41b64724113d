// ABOUTME: Compose error types with SNAFU pattern.
// ABOUTME: One variant per orchestrator operation so failures say which step broke.

use snafu::Snafu;

use crate::ssh;

/// Errors from the remote compose CLI.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ComposeError {
    #[snafu(display("image pull failed: {source}"))]
    Pull { source: ssh::Error },

    #[snafu(display("failed to converge services: {source}"))]
    Converge { source: ssh::Error },

    #[snafu(display("failed to recreate {services}: {source}"))]
    Recreate { services: String, source: ssh::Error },

    #[snafu(display("failed to query container status: {source}"))]
    Status { source: ssh::Error },

    #[snafu(display("unexpected container status line: {line:?}"))]
    StatusParse { line: String },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposeErrorKind {
    /// SSH transport failed while talking to compose.
    SshError,
    PullFailed,
    ConvergeFailed,
    RecreateFailed,
    StatusFailed,
}

impl ComposeErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ComposeErrorKind::SshError => "ssh",
            ComposeErrorKind::PullFailed => "pull-failed",
            ComposeErrorKind::ConvergeFailed => "converge-failed",
            ComposeErrorKind::RecreateFailed => "recreate-failed",
            ComposeErrorKind::StatusFailed => "status-failed",
        }
    }
}

impl ComposeError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> ComposeErrorKind {
        match self {
            ComposeError::Pull { source } => ssh_or(source, ComposeErrorKind::PullFailed),
            ComposeError::Converge { source } => ssh_or(source, ComposeErrorKind::ConvergeFailed),
            ComposeError::Recreate { source, .. } => {
                ssh_or(source, ComposeErrorKind::RecreateFailed)
            }
            ComposeError::Status { source } => ssh_or(source, ComposeErrorKind::StatusFailed),
            ComposeError::StatusParse { .. } => ComposeErrorKind::StatusFailed,
        }
    }
}

/// A non-zero exit is the operation failing; anything else is the transport.
fn ssh_or(source: &ssh::Error, kind: ComposeErrorKind) -> ComposeErrorKind {
    match source {
        ssh::Error::NonZeroExit { .. } => kind,
        _ => ComposeErrorKind::SshError,
    }
}
