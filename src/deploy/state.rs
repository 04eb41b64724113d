// ABOUTME: Deployment state types for the type state pattern.
// ABOUTME: Each state carries what the phases so far produced, so later phases cannot run early.

use super::edge::EdgeOutcome;
use super::health::ServiceHealthReport;
use super::sync::SyncOutcome;
use crate::compose::ComposeFile;
use crate::manifest::TransferManifest;

/// Arguments resolved, nothing checked yet.
/// Available actions: `check_local()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Resolved;

/// Local files, credential, and composition verified.
/// Available actions: `reach_remote()`
#[derive(Debug, Clone)]
pub struct LocallyVerified {
    pub(crate) manifest: TransferManifest,
    pub(crate) compose: ComposeFile,
}

/// Remote host answered an authenticated round-trip.
/// Available actions: `sync()`
#[derive(Debug, Clone)]
pub struct Preflighted {
    pub(crate) manifest: TransferManifest,
    pub(crate) compose: ComposeFile,
}

/// Manifest mirrored to the remote directory.
/// Available actions: `converge()`
#[derive(Debug, Clone)]
pub struct Synced {
    pub(crate) compose: ComposeFile,
    pub(crate) sync: SyncOutcome,
}

/// Images pulled and containers reconciled.
/// Available actions: `report_health()`
#[derive(Debug, Clone)]
pub struct Converged {
    pub(crate) compose: ComposeFile,
    pub(crate) sync: SyncOutcome,
}

/// First health snapshot taken.
/// Available actions: `configure_edge()`
#[derive(Debug, Clone)]
pub struct HealthReported {
    pub(crate) compose: ComposeFile,
    pub(crate) sync: SyncOutcome,
    pub(crate) health: ServiceHealthReport,
}

/// Run finished; edge configured when a domain was given.
#[derive(Debug, Clone)]
pub struct Completed {
    pub(crate) sync: SyncOutcome,
    pub(crate) health: Vec<ServiceHealthReport>,
    pub(crate) edge: Option<EdgeOutcome>,
}
