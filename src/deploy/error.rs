// ABOUTME: Error types for the preflight and edge phases.
// ABOUTME: Edge failures carry the failed sub-phase and the command that resumes from it.

use super::edge::EdgePhase;
use crate::compose::{ComposeError, ComposeFileError, DetectionError};
use crate::manifest::ManifestError;
use crate::ssh;
use std::path::PathBuf;

/// Checks that must pass before anything on the remote host changes.
#[derive(Debug, thiserror::Error)]
pub enum PreflightError {
    #[error("SSH credential not found: {0}")]
    CredentialNotFound(PathBuf),

    #[error("{0}")]
    Manifest(#[from] ManifestError),

    #[error("composition file {path} is unusable: {source}")]
    InvalidComposition {
        path: PathBuf,
        source: ComposeFileError,
    },

    #[error("composition file {path} does not declare service '{service}'")]
    UndeclaredService { path: PathBuf, service: String },

    #[error("host unreachable: {0}")]
    Unreachable(#[source] ssh::Error),

    #[error("authentication rejected: {0}")]
    Authentication(#[source] ssh::Error),

    #[error("remote check failed: {0}")]
    RemoteCheckFailed(#[source] ssh::Error),

    #[error("{0}")]
    ComposeUnavailable(#[from] DetectionError),
}

impl PreflightError {
    /// Classify a failed connection attempt.
    pub fn from_connect(err: ssh::Error) -> Self {
        if err.is_authentication() {
            PreflightError::Authentication(err)
        } else if err.is_connectivity() {
            PreflightError::Unreachable(err)
        } else {
            PreflightError::RemoteCheckFailed(err)
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PreflightError::CredentialNotFound(_) => "credential-not-found",
            PreflightError::Manifest(ManifestError::Missing(_)) => "missing-files",
            PreflightError::Manifest(_) => "invalid-manifest",
            PreflightError::InvalidComposition { .. } | PreflightError::UndeclaredService { .. } => {
                "invalid-composition"
            }
            PreflightError::Unreachable(_) => "unreachable",
            PreflightError::Authentication(_) => "authentication",
            PreflightError::RemoteCheckFailed(_) => "remote-check-failed",
            PreflightError::ComposeUnavailable(DetectionError::NoComposeFound) => {
                "compose-not-found"
            }
            PreflightError::ComposeUnavailable(DetectionError::Ssh(_)) => "remote-check-failed",
        }
    }
}

/// What went wrong inside an edge sub-phase.
#[derive(Debug, thiserror::Error)]
pub enum EdgeFailure {
    #[error(transparent)]
    Remote(#[from] ssh::Error),

    #[error(transparent)]
    Compose(#[from] ComposeError),

    #[error("{0}")]
    Verification(String),
}

/// Edge configuration stopped at `phase`. Core services are already running.
#[derive(Debug, thiserror::Error)]
#[error(
    "edge configuration failed at {phase}: {source}\n  core services are running but public access is not configured\n  resume with: {resume_command}"
)]
pub struct EdgeError {
    pub phase: EdgePhase,
    pub source: EdgeFailure,
    pub resume_command: String,
}

impl EdgeError {
    pub fn kind(&self) -> &'static str {
        self.phase.as_str()
    }
}
