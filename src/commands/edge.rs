// ABOUTME: Edge command: configure or resume reverse proxy and TLS without redeploying.
// ABOUTME: Skips sync and converge; starts from the requested sub-phase.

use super::connection::{connect, detect, disconnect};
use super::resolve_invocation;
use n8n_deploy::compose::{ComposeCli, ComposeVariant, ContainerOrchestrator};
use n8n_deploy::config::{ConfigError, DeployArgs, EdgeConfig, Invocation};
use n8n_deploy::deploy::{
    EdgeConfigurator, EdgeOutcome, EdgePhase, HealthStage, HealthVerifier, Phase,
    load_composition, restart_targets, verify_credential,
};
use n8n_deploy::diagnostics::Diagnostics;
use n8n_deploy::error::Result;
use n8n_deploy::output::Output;
use n8n_deploy::remote::{DryRunExecutor, PlanLog, RemoteExecutor};
use n8n_deploy::types::ServiceName;
use tracing::Instrument;

pub async fn edge(args: DeployArgs, from: EdgePhase, output: &mut Output) -> Result<()> {
    output.start_timer();
    let mut diag = Diagnostics::default();
    let invocation = resolve_invocation(args, &mut diag)?;
    let edge = invocation
        .edge
        .clone()
        .ok_or(ConfigError::MissingArgument("domain"))?;

    output.phase(Phase::Preflight, "Checking local project files...");
    verify_credential(&invocation.target.credential)?;
    let compose = load_composition(&invocation)?;
    let restart = restart_targets(&invocation, &compose);
    let services: Vec<ServiceName> = compose.core_services().map(|s| s.name.clone()).collect();

    let outcome = if invocation.mode.is_dry_run() {
        let log = PlanLog::new();
        let executor = DryRunExecutor::new(&log);
        let orchestrator = ComposeCli::new(
            &executor,
            invocation.target.remote_path.clone(),
            ComposeVariant::default(),
            invocation.layout.compose_file.clone(),
        );
        let outcome = configure(
            &executor,
            &orchestrator,
            &invocation,
            &edge,
            restart,
            services,
            from,
            output,
            &mut diag,
        )
        .await?;
        output.plan(&log.actions());
        outcome
    } else {
        let session = connect(&invocation, output).await?;
        let result: Result<EdgeOutcome> = async {
            let variant = detect(&session, output).await?;
            let orchestrator = ComposeCli::new(
                &session,
                invocation.target.remote_path.clone(),
                variant,
                invocation.layout.compose_file.clone(),
            );
            configure(
                &session,
                &orchestrator,
                &invocation,
                &edge,
                restart,
                services,
                from,
                output,
                &mut diag,
            )
            .await
        }
        .await;
        disconnect(session, &mut diag).await;
        result?
    };

    for warning in diag.warnings() {
        output.warning(&warning.message);
    }
    let applied: Vec<&str> = outcome.applied.iter().map(|p| p.as_str()).collect();
    output.progress(&format!("    applied: {}", applied.join(", ")));
    output.success(&format!("Edge configured: {}", edge.public_url()));
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn configure<E, O>(
    executor: &E,
    orchestrator: &O,
    invocation: &Invocation,
    edge: &EdgeConfig,
    restart: Vec<ServiceName>,
    services: Vec<ServiceName>,
    from: EdgePhase,
    output: &Output,
    diag: &mut Diagnostics,
) -> Result<EdgeOutcome>
where
    E: RemoteExecutor + ?Sized,
    O: ContainerOrchestrator + ?Sized,
{
    output.phase(
        Phase::Edge,
        &format!("Configuring public access for {} from {}...", edge.domain, from),
    );
    let outcome = EdgeConfigurator::new(executor, orchestrator, invocation, edge, restart)
        .run(from)
        .instrument(tracing::info_span!("phase", name = Phase::Edge.as_str()))
        .await?;

    let report = HealthVerifier::new(executor, orchestrator, services)
        .with_proxy(invocation.services.proxy.clone())
        .snapshot(HealthStage::AfterEdge, diag)
        .await;
    output.health(&report);
    Ok(outcome)
}
