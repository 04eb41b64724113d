// ABOUTME: Status command: one health observation of the deployed stack.
// ABOUTME: Read-only; never changes anything on the remote host.

use super::connection::{connect, detect, disconnect};
use super::resolve_invocation;
use n8n_deploy::compose::ComposeCli;
use n8n_deploy::config::DeployArgs;
use n8n_deploy::deploy::{
    HealthStage, HealthVerifier, Phase, ServiceHealthReport, load_composition, verify_credential,
    warn_degraded,
};
use n8n_deploy::diagnostics::Diagnostics;
use n8n_deploy::error::{Error, Result};
use n8n_deploy::output::Output;

pub async fn status(args: DeployArgs, output: &mut Output) -> Result<()> {
    // A domain here only selects whether the proxy is reported.
    let invocation = resolve_invocation(args, &mut Diagnostics::default())?;
    let mut diag = Diagnostics::default();

    verify_credential(&invocation.target.credential)?;
    let compose = load_composition(&invocation)?;
    let services = compose.core_services().map(|s| s.name.clone()).collect();

    let session = connect(&invocation, output).await?;
    let result: Result<ServiceHealthReport> = async {
        let variant = detect(&session, output).await?;
        let orchestrator = ComposeCli::new(
            &session,
            invocation.target.remote_path.clone(),
            variant,
            invocation.layout.compose_file.clone(),
        );
        output.phase(Phase::Health, "Querying container status...");
        let mut verifier = HealthVerifier::new(&session, &orchestrator, services);
        if invocation.edge.is_some() {
            verifier = verifier.with_proxy(invocation.services.proxy.clone());
        }
        verifier
            .observe(HealthStage::OnDemand)
            .await
            .map_err(Error::HealthQuery)
    }
    .await;
    disconnect(session, &mut diag).await;
    let report = result?;

    output.health(&report);
    warn_degraded(&report, &mut diag);
    for warning in diag.warnings() {
        output.warning(&warning.message);
    }
    if report.is_healthy() {
        output.success("All services healthy");
    } else {
        output.success("Status collected with warnings");
    }
    Ok(())
}
