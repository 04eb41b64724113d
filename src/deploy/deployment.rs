// ABOUTME: Generic deployment struct parameterized by state marker.
// ABOUTME: State types carry their own data for compile-time guarantees.

use crate::config::{DeploymentTarget, Invocation};
use crate::manifest::TransferManifest;

use super::edge::EdgeOutcome;
use super::health::ServiceHealthReport;
use super::state::{Completed, Converged, HealthReported, LocallyVerified, Preflighted, Resolved, Synced};
use super::sync::SyncOutcome;

/// A deployment in progress, parameterized by its current state.
///
/// Transitions consume the deployment and return the next state, so the
/// pipeline order (preflight, sync, converge, health, edge) is enforced by
/// the compiler rather than checked at runtime.
#[derive(Debug)]
pub struct Deployment<S> {
    pub(crate) invocation: Invocation,
    pub(crate) state: S,
}

impl Deployment<Resolved> {
    pub fn new(invocation: Invocation) -> Self {
        Deployment {
            invocation,
            state: Resolved,
        }
    }
}

impl<S> Deployment<S> {
    pub fn invocation(&self) -> &Invocation {
        &self.invocation
    }

    pub fn target(&self) -> &DeploymentTarget {
        &self.invocation.target
    }
}

impl Deployment<LocallyVerified> {
    pub fn manifest(&self) -> &TransferManifest {
        &self.state.manifest
    }
}

impl Deployment<Preflighted> {
    pub fn manifest(&self) -> &TransferManifest {
        &self.state.manifest
    }
}

impl Deployment<Synced> {
    pub fn sync_outcome(&self) -> &SyncOutcome {
        &self.state.sync
    }
}

impl Deployment<Converged> {
    pub fn sync_outcome(&self) -> &SyncOutcome {
        &self.state.sync
    }
}

impl Deployment<HealthReported> {
    pub fn health(&self) -> &ServiceHealthReport {
        &self.state.health
    }
}

impl Deployment<Completed> {
    pub fn sync_outcome(&self) -> &SyncOutcome {
        &self.state.sync
    }

    /// Snapshots in the order they were taken.
    pub fn health_reports(&self) -> &[ServiceHealthReport] {
        &self.state.health
    }

    pub fn edge_outcome(&self) -> Option<&EdgeOutcome> {
        self.state.edge.as_ref()
    }

    /// Public URL when edge configuration ran.
    pub fn public_url(&self) -> Option<String> {
        self.state
            .edge
            .as_ref()
            .and(self.invocation.edge.as_ref())
            .map(|edge| edge.public_url())
    }
}
