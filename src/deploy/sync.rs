// ABOUTME: File synchronizer: mirrors the manifest and removes entries dropped since the last run.
// ABOUTME: Previously synced entries are tracked in a record stored beside the deployment.

use crate::manifest::{TransferManifest, normalize_entry};
use crate::remote::{FileTransfer, RemoteExecutor, TransferError, TransferMethod, TransferStats};
use crate::shell;
use crate::types::RemotePath;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Directory under the remote root holding run bookkeeping.
pub const STATE_DIR: &str = ".n8n-deploy";
const RECORD_FILE: &str = "sync.json";

/// What the last successful sync put on the remote host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncRecord {
    pub entries: Vec<String>,
    pub synced_at: DateTime<Utc>,
    /// Hostname of the machine that ran the sync.
    pub synced_by: String,
    pub method: String,
}

impl SyncRecord {
    pub fn new(manifest: &TransferManifest, method: TransferMethod) -> Self {
        Self {
            entries: manifest.relative_paths(),
            synced_at: Utc::now(),
            synced_by: gethostname::gethostname().to_string_lossy().into_owned(),
            method: method.to_string(),
        }
    }

    pub fn path(root: &RemotePath) -> String {
        root.join(&format!("{}/{}", STATE_DIR, RECORD_FILE))
    }
}

/// Whether `entry` is `dir` itself or lies below it, by whole path components.
fn within(entry: &str, dir: &str) -> bool {
    entry
        .strip_prefix(dir)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Result of one sync.
#[derive(Debug, Clone, Serialize)]
pub struct SyncOutcome {
    pub method: TransferMethod,
    pub changed: usize,
    /// Stale entries removed from the remote root.
    pub removed: Vec<String>,
}

pub struct Synchronizer<'a, E: ?Sized, T: ?Sized> {
    executor: &'a E,
    transfer: &'a T,
}

impl<'a, E, T> Synchronizer<'a, E, T>
where
    E: RemoteExecutor + ?Sized,
    T: FileTransfer + ?Sized,
{
    pub fn new(executor: &'a E, transfer: &'a T) -> Self {
        Self { executor, transfer }
    }

    pub async fn mirror(
        &self,
        manifest: &TransferManifest,
        root: &RemotePath,
    ) -> Result<SyncOutcome, TransferError> {
        self.executor
            .exec_checked(&format!("mkdir -p {}", root.quoted()))
            .await?;

        // Stale entries go first: one may be a directory that now only
        // partly belongs to the manifest, and the transfer refills it.
        let removed = match self.read_record(root).await {
            Some(record) => self.remove_stale(&record, manifest, root).await?,
            None => Vec::new(),
        };
        let TransferStats { method, changed } = self.transfer.mirror(manifest, root).await?;

        self.write_record(&SyncRecord::new(manifest, method), root)
            .await?;

        tracing::info!(%method, changed, removed = removed.len(), "files synchronized");
        Ok(SyncOutcome {
            method,
            changed,
            removed,
        })
    }

    async fn read_record(&self, root: &RemotePath) -> Option<SyncRecord> {
        let path = SyncRecord::path(root);
        let output = match self
            .executor
            .exec(&format!("cat {} 2>/dev/null", shell::quote(&path)))
            .await
        {
            Ok(output) if output.success() && !output.stdout.trim().is_empty() => output,
            _ => return None,
        };
        match serde_json::from_str(&output.stdout) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(%path, error = %e, "ignoring unreadable sync record");
                None
            }
        }
    }

    async fn remove_stale(
        &self,
        previous: &SyncRecord,
        manifest: &TransferManifest,
        root: &RemotePath,
    ) -> Result<Vec<String>, TransferError> {
        let mut stale = Vec::new();
        for entry in &previous.entries {
            // The record lives on the remote host; never trust it to stay inside the root.
            let Ok(entry) = normalize_entry(entry) else {
                tracing::warn!(entry = %entry, "skipping invalid entry in sync record");
                continue;
            };
            if entry == STATE_DIR || stale.contains(&entry) {
                continue;
            }
            if manifest.entries().any(|current| within(&entry, &current.relative)) {
                continue;
            }
            stale.push(entry);
        }
        if stale.is_empty() {
            return Ok(stale);
        }

        let targets: Vec<String> = stale.iter().map(|e| root.quoted_join(e)).collect();
        self.executor
            .exec_checked(&format!("rm -rf -- {}", targets.join(" ")))
            .await?;
        Ok(stale)
    }

    async fn write_record(&self, record: &SyncRecord, root: &RemotePath) -> Result<(), TransferError> {
        let json = serde_json::to_vec_pretty(record)?;
        self.executor
            .exec_checked(&format!("mkdir -p {}", root.quoted_join(STATE_DIR)))
            .await?;
        self.executor
            .write_file(&SyncRecord::path(root), &json)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn within_compares_components() {
        assert!(within("scripts", "scripts"));
        assert!(within("scripts/setup-nginx.sh", "scripts"));
        assert!(!within("scripts-old", "scripts"));
        assert!(!within("nginx", "nginx/n8n.conf"));
    }
}
