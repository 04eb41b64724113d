// ABOUTME: Application-wide error type for n8n-deploy.
// ABOUTME: Every fatal error maps to the phase it came from, a kind string, and an exit code.

use crate::compose::ComposeError;
use crate::config::ConfigError;
use crate::deploy::{EdgeError, Phase, PreflightError};
use crate::remote::TransferError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Preflight(#[from] PreflightError),

    #[error(transparent)]
    Transfer(#[from] TransferError),

    #[error(transparent)]
    Convergence(ComposeError),

    #[error(transparent)]
    Edge(#[from] EdgeError),

    #[error("health query failed: {0}")]
    HealthQuery(ComposeError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// The pipeline phase that failed, when there is one.
    pub fn phase(&self) -> Option<Phase> {
        match self {
            Error::Config(_) => Some(Phase::Configuration),
            Error::Preflight(_) => Some(Phase::Preflight),
            Error::Transfer(_) => Some(Phase::Transfer),
            Error::Convergence(_) => Some(Phase::Convergence),
            Error::Edge(_) => Some(Phase::Edge),
            Error::HealthQuery(_) => Some(Phase::Health),
            Error::Io(_) => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Error::Config(e) => e.kind(),
            Error::Preflight(e) => e.kind(),
            Error::Transfer(e) => e.kind(),
            Error::Convergence(e) | Error::HealthQuery(e) => e.kind().as_str(),
            Error::Edge(e) => e.kind(),
            Error::Io(_) => "io",
        }
    }

    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Config(_) => 2,
            Error::Preflight(_) => 3,
            Error::Transfer(_) => 4,
            Error::Convergence(_) => 5,
            Error::Edge(_) => 6,
            Error::HealthQuery(_) | Error::Io(_) => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
