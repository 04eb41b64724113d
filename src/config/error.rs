// ABOUTME: Configuration errors raised before any I/O touches the network.
// ABOUTME: Each variant maps to a stable kind string for structured output.

use crate::types::{ContactEmailError, DomainError, RemotePathError, ServiceNameError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required argument: --{0}")]
    MissingArgument(&'static str),

    #[error("TLS requested but --{0} is missing (TLS requires both --domain and --email)")]
    TlsRequires(&'static str),

    #[error("invalid host: {0}")]
    InvalidHost(String),

    #[error("invalid domain: {0}")]
    InvalidDomain(#[from] DomainError),

    #[error("invalid contact email: {0}")]
    InvalidEmail(#[from] ContactEmailError),

    #[error("invalid remote path: {0}")]
    InvalidRemotePath(#[from] RemotePathError),

    #[error("invalid service name: {0}")]
    InvalidService(#[from] ServiceNameError),

    #[error("worker replicas must be at least 1")]
    InvalidWorkers,

    #[error("cannot expand '~' in {0}: HOME is not set")]
    HomeNotSet(String),

    #[error("failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    FileParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

impl ConfigError {
    pub fn kind(&self) -> &'static str {
        match self {
            ConfigError::MissingArgument(_) => "missing-argument",
            ConfigError::TlsRequires("domain") => "tls-requires-domain",
            ConfigError::TlsRequires(_) => "tls-requires-email",
            ConfigError::InvalidHost(_)
            | ConfigError::InvalidDomain(_)
            | ConfigError::InvalidEmail(_)
            | ConfigError::InvalidRemotePath(_)
            | ConfigError::InvalidService(_)
            | ConfigError::InvalidWorkers => "invalid-value",
            ConfigError::HomeNotSet(_) => "home-not-set",
            ConfigError::FileRead { .. } | ConfigError::FileParse { .. } => "config-file",
        }
    }
}
