// ABOUTME: FileTransfer implementations: rsync delta mirroring and a tar-over-SSH full copy.
// ABOUTME: Both leave the manifested remote entries identical to the local ones.

use super::RemoteExecutor;
use crate::manifest::{EntryKind, TransferManifest};
use crate::ssh;
use crate::types::RemotePath;
use async_trait::async_trait;
use serde::Serialize;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

/// How files reach the remote host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransferMethod {
    /// rsync over ssh, only changed files are sent.
    Delta,
    /// Tar stream over the SSH channel, every entry is replaced.
    FullCopy,
}

impl TransferMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            TransferMethod::Delta => "delta",
            TransferMethod::FullCopy => "full-copy",
        }
    }
}

impl std::fmt::Display for TransferMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferStats {
    pub method: TransferMethod,
    /// Files written on the remote side. Always the entry count for a full copy.
    pub changed: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("failed to run local rsync: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("rsync exited with code {code}: {stderr}")]
    RsyncFailed { code: i32, stderr: String },

    #[error("failed to build transfer archive: {0}")]
    Archive(#[source] std::io::Error),

    #[error("remote transfer step failed: {0}")]
    Remote(#[from] ssh::Error),

    #[error("failed to encode sync record: {0}")]
    Record(#[from] serde_json::Error),
}

impl TransferError {
    pub fn kind(&self) -> &'static str {
        match self {
            TransferError::Spawn(_) => "rsync-unavailable",
            TransferError::RsyncFailed { .. } => "rsync-failed",
            TransferError::Archive(_) => "archive",
            TransferError::Remote(_) => "remote",
            TransferError::Record(_) => "sync-record",
        }
    }
}

/// Mirrors a manifest into a remote directory.
#[async_trait]
pub trait FileTransfer: Send + Sync {
    fn method(&self) -> TransferMethod;

    /// Copy every manifest entry under `root`, replacing what is there.
    async fn mirror(
        &self,
        manifest: &TransferManifest,
        root: &RemotePath,
    ) -> Result<TransferStats, TransferError>;
}

/// Whether an rsync binary can be executed locally.
pub async fn local_rsync_available() -> bool {
    Command::new("rsync")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Delta transfer through the local rsync binary.
#[derive(Debug, Clone)]
pub struct RsyncTransfer {
    destination: String,
    transport: String,
}

impl RsyncTransfer {
    /// `destination` is `user@host`; `transport` is the `-e` remote shell.
    pub fn new(destination: impl Into<String>, transport: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            transport: transport.into(),
        }
    }

    fn args(&self, manifest: &TransferManifest, root: &RemotePath) -> Vec<String> {
        let mut args = vec![
            "-az".to_string(),
            "--delete".to_string(),
            "--relative".to_string(),
            "--protect-args".to_string(),
            "--out-format=%n".to_string(),
            "-e".to_string(),
            self.transport.clone(),
        ];
        args.extend(manifest.entries().map(|e| format!("./{}", e.relative)));
        args.push(format!("{}:{}/", self.destination, root));
        args
    }
}

#[async_trait]
impl FileTransfer for RsyncTransfer {
    fn method(&self) -> TransferMethod {
        TransferMethod::Delta
    }

    async fn mirror(
        &self,
        manifest: &TransferManifest,
        root: &RemotePath,
    ) -> Result<TransferStats, TransferError> {
        let args = self.args(manifest, root);
        tracing::debug!(?args, "running rsync");

        let output = Command::new("rsync")
            .args(&args)
            .current_dir(manifest.root())
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(TransferError::Spawn)?;

        if !output.status.success() {
            return Err(TransferError::RsyncFailed {
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let changed = String::from_utf8_lossy(&output.stdout)
            .lines()
            .filter(|line| !line.trim().is_empty() && !line.ends_with('/'))
            .count();
        Ok(TransferStats {
            method: TransferMethod::Delta,
            changed,
        })
    }
}

/// Full copy: a tar archive piped into `tar -x` on the remote side.
pub struct ArchiveTransfer<'a, E: ?Sized> {
    executor: &'a E,
}

impl<'a, E: RemoteExecutor + ?Sized> ArchiveTransfer<'a, E> {
    pub fn new(executor: &'a E) -> Self {
        Self { executor }
    }
}

/// Remote command that swaps the listed entries for the archive's contents.
pub(crate) fn extract_command(root: &RemotePath, entries: &[String]) -> String {
    let quoted: Vec<String> = entries.iter().map(|e| crate::shell::quote(e)).collect();
    format!(
        "mkdir -p {root} && cd {root} && rm -rf -- {entries} && tar -xf -",
        root = root.quoted(),
        entries = quoted.join(" ")
    )
}

fn build_archive(root: PathBuf, entries: Vec<(String, EntryKind)>) -> std::io::Result<Vec<u8>> {
    let mut builder = tar::Builder::new(Vec::new());
    for (relative, kind) in entries {
        let local = root.join(&relative);
        match kind {
            EntryKind::File => builder.append_path_with_name(&local, &relative)?,
            EntryKind::Directory => builder.append_dir_all(&relative, &local)?,
        }
    }
    builder.into_inner()
}

#[async_trait]
impl<E: RemoteExecutor + ?Sized> FileTransfer for ArchiveTransfer<'_, E> {
    fn method(&self) -> TransferMethod {
        TransferMethod::FullCopy
    }

    async fn mirror(
        &self,
        manifest: &TransferManifest,
        root: &RemotePath,
    ) -> Result<TransferStats, TransferError> {
        let entries: Vec<(String, EntryKind)> = manifest
            .entries()
            .map(|e| (e.relative.clone(), e.kind))
            .collect();
        let local_root = manifest.root().to_path_buf();

        let archive = tokio::task::spawn_blocking(move || build_archive(local_root, entries))
            .await
            .map_err(|e| TransferError::Archive(std::io::Error::other(e)))?
            .map_err(TransferError::Archive)?;

        let command = extract_command(root, &manifest.relative_paths());
        tracing::debug!(bytes = archive.len(), "streaming archive");
        self.executor
            .exec_with_input(&command, &archive)
            .await?
            .checked(&command)?;

        Ok(TransferStats {
            method: TransferMethod::FullCopy,
            changed: manifest.entry_count(),
        })
    }
}
