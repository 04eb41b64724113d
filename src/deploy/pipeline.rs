// ABOUTME: Drives a preflighted deployment through sync, converge, health, and edge.
// ABOUTME: Client-agnostic: live runs pass the SSH session, dry runs pass the recorders.

use crate::compose::ContainerOrchestrator;
use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::output::Output;
use crate::remote::{FileTransfer, RemoteExecutor};

use super::{Completed, Deployment, Phase, Preflighted};

/// Run every remote-mutating phase in order, stopping at the first failure.
pub async fn run_remote_phases<E, T, O>(
    deployment: Deployment<Preflighted>,
    executor: &E,
    transfer: &T,
    orchestrator: &O,
    output: &Output,
    diag: &mut Diagnostics,
) -> Result<Deployment<Completed>>
where
    E: RemoteExecutor + ?Sized,
    T: FileTransfer + ?Sized,
    O: ContainerOrchestrator + ?Sized,
{
    output.phase(
        Phase::Transfer,
        &format!(
            "Synchronizing {} entries to {} ({})...",
            deployment.manifest().entry_count(),
            deployment.target().remote_path,
            transfer.method()
        ),
    );
    let deployment = deployment.sync(executor, transfer).await?;
    let removed = &deployment.sync_outcome().removed;
    if !removed.is_empty() {
        output.progress(&format!("    removed stale entries: {}", removed.join(", ")));
    }

    output.phase(Phase::Convergence, "Pulling images and converging services...");
    let deployment = deployment.converge(orchestrator).await?;

    output.phase(Phase::Health, "Checking service health...");
    let deployment = deployment.report_health(executor, orchestrator, diag).await;
    output.health(deployment.health());

    if let Some(edge) = &deployment.invocation().edge {
        output.phase(Phase::Edge, &format!("Configuring public access for {}...", edge.domain));
    }
    let deployment = deployment.configure_edge(executor, orchestrator, diag).await?;
    if deployment.edge_outcome().is_some()
        && let Some(report) = deployment.health_reports().last()
    {
        output.health(report);
    }

    Ok(deployment)
}
