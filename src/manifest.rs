// ABOUTME: Transfer manifest: the ordered set of local paths mirrored to the remote host.
// ABOUTME: Core entries always; edge helper entries only when a domain is configured.

use crate::config::ProjectLayout;
use nonempty::NonEmpty;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// One manifested path, relative to the project directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub relative: String,
    pub kind: EntryKind,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ManifestError {
    #[error("manifest entry must be a relative path inside the project: {0}")]
    InvalidEntry(String),

    #[error("missing local files: {}", display_paths(.0))]
    Missing(Vec<PathBuf>),

    #[error("manifest is empty after omitting absent optional directories")]
    Empty,
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Local paths mirrored into the remote deployment directory, in order.
#[derive(Debug, Clone)]
pub struct TransferManifest {
    root: PathBuf,
    entries: NonEmpty<ManifestEntry>,
    omitted: Vec<String>,
}

impl TransferManifest {
    /// Compute the manifest for a project.
    ///
    /// Specs ending in `/` are optional directories and are silently omitted
    /// when absent. Any other absent spec is reported; all of them at once.
    pub fn compute(
        root: &Path,
        layout: &ProjectLayout,
        with_edge: bool,
    ) -> Result<Self, ManifestError> {
        let specs = layout
            .core
            .iter()
            .chain(layout.edge.iter().filter(|_| with_edge));

        let mut entries: Vec<ManifestEntry> = Vec::new();
        let mut missing = Vec::new();
        let mut omitted = Vec::new();

        for spec in specs {
            let optional = spec.ends_with('/');
            let relative = normalize_entry(spec)?;
            if entries.iter().any(|e| e.relative == relative) || omitted.contains(&relative) {
                continue;
            }

            let local = root.join(&relative);
            match std::fs::metadata(&local) {
                Ok(meta) if meta.is_dir() => entries.push(ManifestEntry {
                    relative,
                    kind: EntryKind::Directory,
                }),
                Ok(_) => entries.push(ManifestEntry {
                    relative,
                    kind: EntryKind::File,
                }),
                Err(_) if optional => {
                    tracing::debug!(entry = %relative, "optional directory absent, omitted from manifest");
                    omitted.push(relative);
                }
                Err(_) => missing.push(local),
            }
        }

        if !missing.is_empty() {
            return Err(ManifestError::Missing(missing));
        }

        let entries = NonEmpty::from_vec(entries).ok_or(ManifestError::Empty)?;
        Ok(Self {
            root: root.to_path_buf(),
            entries,
            omitted,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn entries(&self) -> impl Iterator<Item = &ManifestEntry> {
        self.entries.iter()
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn contains(&self, relative: &str) -> bool {
        self.entries.iter().any(|e| e.relative == relative)
    }

    /// Relative names of every entry, in manifest order.
    pub fn relative_paths(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.relative.clone()).collect()
    }

    /// Optional directories that were skipped because they do not exist locally.
    pub fn omitted(&self) -> &[String] {
        &self.omitted
    }
}

/// Normalize a manifest spec to a clean relative path with `/` separators.
///
/// Rejects absolute paths and anything that climbs out of the project with `..`.
pub fn normalize_entry(spec: &str) -> Result<String, ManifestError> {
    let trimmed = spec.trim().trim_end_matches('/');
    let invalid = || ManifestError::InvalidEntry(spec.to_string());
    if trimmed.is_empty() {
        return Err(invalid());
    }

    let mut parts = Vec::new();
    for component in Path::new(trimmed).components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str().ok_or_else(invalid)?.to_string()),
            Component::CurDir => {}
            _ => return Err(invalid()),
        }
    }

    if parts.is_empty() {
        return Err(invalid());
    }
    Ok(parts.join("/"))
}
