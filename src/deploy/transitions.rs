// ABOUTME: State transition methods for the deployment pipeline.
// ABOUTME: Each method consumes self, runs one phase inside a tagged span, and returns the next state.

use crate::compose::{ComposeFile, ContainerOrchestrator};
use crate::config::{CredentialRef, Invocation};
use crate::diagnostics::Diagnostics;
use crate::error::{Error, Result};
use crate::manifest::{ManifestError, TransferManifest};
use crate::remote::{FileTransfer, RemoteExecutor, TransferError};
use crate::types::ServiceName;
use tracing::Instrument;

use super::Deployment;
use super::edge::{EdgeConfigurator, EdgePhase, apply_public_env};
use super::error::PreflightError;
use super::health::{HealthStage, HealthVerifier};
use super::phase::Phase;
use super::state::{
    Completed, Converged, HealthReported, LocallyVerified, Preflighted, Resolved, Synced,
};
use super::sync::Synchronizer;

/// Command used for the authenticated round-trip.
pub const REACHABILITY_COMMAND: &str = "true";

fn phase_span(phase: Phase) -> tracing::Span {
    tracing::info_span!("phase", name = phase.as_str())
}

/// The key file must exist before any connection is attempted.
pub fn verify_credential(credential: &CredentialRef) -> std::result::Result<(), PreflightError> {
    match credential {
        CredentialRef::KeyFile(path) if !path.is_file() => {
            Err(PreflightError::CredentialNotFound(path.clone()))
        }
        _ => Ok(()),
    }
}

/// Parse the local composition and check the roles the run relies on.
pub fn load_composition(invocation: &Invocation) -> std::result::Result<ComposeFile, PreflightError> {
    let path = invocation
        .project_dir
        .join(&invocation.layout.compose_file);
    let yaml = std::fs::read_to_string(&path)
        .map_err(|_| PreflightError::Manifest(ManifestError::Missing(vec![path.clone()])))?;
    let compose = ComposeFile::parse(&yaml).map_err(|source| PreflightError::InvalidComposition {
        path: path.clone(),
        source,
    })?;

    let services = &invocation.services;
    let mut required = vec![&services.main];
    if invocation.workers.is_some() {
        required.push(&services.worker);
    }
    for service in required {
        if !compose.declares(service) {
            return Err(PreflightError::UndeclaredService {
                path,
                service: service.to_string(),
            });
        }
    }
    Ok(compose)
}

/// Services bounced after the public URL changes: main and, if declared, worker.
pub fn restart_targets(invocation: &Invocation, compose: &ComposeFile) -> Vec<ServiceName> {
    let roles = &invocation.services;
    [&roles.main, &roles.worker]
        .into_iter()
        .filter(|service| compose.declares(service))
        .cloned()
        .collect()
}

fn core_services(compose: &ComposeFile) -> Vec<ServiceName> {
    compose.core_services().map(|s| s.name.clone()).collect()
}

// =============================================================================
// Resolved -> LocallyVerified
// =============================================================================

impl Deployment<Resolved> {
    /// Local half of preflight: credential, manifest, composition, proxy helper.
    ///
    /// Touches only the local filesystem, so it runs identically in dry-run.
    pub fn check_local(self) -> Result<Deployment<LocallyVerified>> {
        let _span = phase_span(Phase::Preflight).entered();
        let inv = &self.invocation;

        verify_credential(&inv.target.credential)?;

        let manifest = TransferManifest::compute(&inv.project_dir, &inv.layout, inv.edge.is_some())
            .map_err(PreflightError::from)?;
        let compose = load_composition(inv)?;

        if inv.edge.is_some() {
            let script = inv.project_dir.join(&inv.layout.proxy_script);
            if !script.is_file() {
                return Err(PreflightError::from(ManifestError::Missing(vec![script])).into());
            }
        }

        tracing::debug!(
            entries = manifest.entry_count(),
            services = compose.services().len(),
            "local checks passed"
        );
        Ok(Deployment {
            invocation: self.invocation,
            state: LocallyVerified { manifest, compose },
        })
    }
}

// =============================================================================
// LocallyVerified -> Preflighted
// =============================================================================

impl Deployment<LocallyVerified> {
    /// One authenticated, non-mutating round-trip to the remote host.
    pub async fn reach_remote<E: RemoteExecutor + ?Sized>(
        self,
        executor: &E,
    ) -> Result<Deployment<Preflighted>> {
        async {
            executor
                .exec_checked(REACHABILITY_COMMAND)
                .await
                .map_err(PreflightError::from_connect)?;
            tracing::debug!("remote host answered");
            Ok::<_, Error>(())
        }
        .instrument(phase_span(Phase::Preflight))
        .await?;

        let LocallyVerified { manifest, compose } = self.state;
        Ok(Deployment {
            invocation: self.invocation,
            state: Preflighted { manifest, compose },
        })
    }
}

// =============================================================================
// Preflighted -> Synced
// =============================================================================

impl Deployment<Preflighted> {
    /// Mirror the manifest into the remote directory.
    ///
    /// With TLS the mirrored env file is pointed at the public URL right away,
    /// so converge starts n8n with it and a rerun finds nothing to change.
    pub async fn sync<E, T>(self, executor: &E, transfer: &T) -> Result<Deployment<Synced>>
    where
        E: RemoteExecutor + ?Sized,
        T: FileTransfer + ?Sized,
    {
        let inv = &self.invocation;
        let sync = async {
            let outcome = Synchronizer::new(executor, transfer)
                .mirror(&self.state.manifest, &inv.target.remote_path)
                .await?;
            if let Some(edge) = inv.edge.as_ref().filter(|e| e.tls_enabled()) {
                apply_public_env(executor, inv, edge)
                    .await
                    .map_err(TransferError::from)?;
            }
            Ok::<_, Error>(outcome)
        }
        .instrument(phase_span(Phase::Transfer))
        .await?;

        Ok(Deployment {
            invocation: self.invocation,
            state: Synced {
                compose: self.state.compose,
                sync,
            },
        })
    }
}

// =============================================================================
// Synced -> Converged
// =============================================================================

impl Deployment<Synced> {
    /// Pull images, then reconcile running containers with the composition.
    pub async fn converge<O: ContainerOrchestrator + ?Sized>(
        self,
        orchestrator: &O,
    ) -> Result<Deployment<Converged>> {
        let scale = self.invocation.worker_scale();

        async {
            orchestrator.pull().await.map_err(Error::Convergence)?;
            orchestrator
                .converge(&scale)
                .await
                .map_err(Error::Convergence)?;
            tracing::info!("services converged");
            Ok::<_, Error>(())
        }
        .instrument(phase_span(Phase::Convergence))
        .await?;

        Ok(Deployment {
            invocation: self.invocation,
            state: Converged {
                compose: self.state.compose,
                sync: self.state.sync,
            },
        })
    }
}

// =============================================================================
// Converged -> HealthReported
// =============================================================================

impl Deployment<Converged> {
    /// Settle, then take the first snapshot. Never fails; degraded health is a warning.
    pub async fn report_health<E, O>(
        self,
        executor: &E,
        orchestrator: &O,
        diag: &mut Diagnostics,
    ) -> Deployment<HealthReported>
    where
        E: RemoteExecutor + ?Sized,
        O: ContainerOrchestrator + ?Sized,
    {
        let health = HealthVerifier::new(executor, orchestrator, core_services(&self.state.compose))
            .settle(self.invocation.timing.settle_delay)
            .snapshot(HealthStage::AfterConverge, diag)
            .instrument(phase_span(Phase::Health))
            .await;

        Deployment {
            invocation: self.invocation,
            state: HealthReported {
                compose: self.state.compose,
                sync: self.state.sync,
                health,
            },
        }
    }
}

// =============================================================================
// HealthReported -> Completed
// =============================================================================

impl Deployment<HealthReported> {
    /// Configure the edge when a domain was given, then take the second snapshot.
    /// Without a domain this only finishes the run.
    pub async fn configure_edge<E, O>(
        self,
        executor: &E,
        orchestrator: &O,
        diag: &mut Diagnostics,
    ) -> Result<Deployment<Completed>>
    where
        E: RemoteExecutor + ?Sized,
        O: ContainerOrchestrator + ?Sized,
    {
        let HealthReported {
            compose,
            sync,
            health,
        } = self.state;

        let Some(edge) = self.invocation.edge.clone() else {
            return Ok(Deployment {
                invocation: self.invocation,
                state: Completed {
                    sync,
                    health: vec![health],
                    edge: None,
                },
            });
        };

        let restart = restart_targets(&self.invocation, &compose);
        let outcome = EdgeConfigurator::new(executor, orchestrator, &self.invocation, &edge, restart)
            .run(EdgePhase::ScriptsStaged)
            .instrument(phase_span(Phase::Edge))
            .await?;

        let after = HealthVerifier::new(executor, orchestrator, core_services(&compose))
            .with_proxy(self.invocation.services.proxy.clone())
            .snapshot(HealthStage::AfterEdge, diag)
            .instrument(phase_span(Phase::Health))
            .await;

        Ok(Deployment {
            invocation: self.invocation,
            state: Completed {
                sync,
                health: vec![health, after],
                edge: Some(outcome),
            },
        })
    }
}
