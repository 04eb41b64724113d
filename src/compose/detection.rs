// ABOUTME: Detects the compose CLI available on the remote host.
// ABOUTME: Prefers the docker CLI plugin, then the standalone docker-compose binary.

use super::ComposeVariant;
use crate::remote::RemoteExecutor;

/// Error during compose detection.
#[derive(Debug, thiserror::Error)]
pub enum DetectionError {
    #[error("no compose CLI found (checked `docker compose` and `docker-compose`)")]
    NoComposeFound,

    #[error("SSH error: {0}")]
    Ssh(#[from] crate::ssh::Error),
}

/// Detect the compose CLI on the remote server.
///
/// Detection order:
/// 1. `docker compose version`
/// 2. `docker-compose version`
pub async fn detect_compose<E: RemoteExecutor + ?Sized>(
    executor: &E,
) -> Result<ComposeVariant, DetectionError> {
    for variant in [ComposeVariant::Plugin, ComposeVariant::Standalone] {
        let check = format!("{} version", variant.command());
        let output = executor.exec(&check).await?;
        if output.success() {
            tracing::debug!(%variant, version = output.stdout.trim(), "compose CLI detected");
            return Ok(variant);
        }
    }
    Err(DetectionError::NoComposeFound)
}
