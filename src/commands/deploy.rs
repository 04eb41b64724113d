// ABOUTME: Deploy command implementation.
// ABOUTME: Runs the full pipeline live over SSH or against the dry-run recorders.

use super::connection::{choose_transfer, connect, detect, disconnect};
use super::resolve_invocation;
use n8n_deploy::compose::{ComposeCli, ComposeVariant};
use n8n_deploy::config::DeployArgs;
use n8n_deploy::deploy::{Completed, Deployment, Phase, run_remote_phases};
use n8n_deploy::diagnostics::Diagnostics;
use n8n_deploy::error::Result;
use n8n_deploy::output::Output;
use n8n_deploy::remote::{
    DryRunExecutor, DryRunTransfer, PlanLog, TransferMethod, local_rsync_available,
};

pub async fn deploy(args: DeployArgs, output: &mut Output) -> Result<()> {
    output.start_timer();
    let mut diag = Diagnostics::default();
    let invocation = resolve_invocation(args, &mut diag)?;

    let dry_run = invocation.mode.is_dry_run();
    output.progress(&format!(
        "{} n8n to {}:{}{}",
        if dry_run { "Planning deployment of" } else { "Deploying" },
        invocation.target.destination(),
        invocation.target.remote_path,
        if dry_run { " (dry run)" } else { "" }
    ));

    output.phase(Phase::Preflight, "Checking local project files...");
    let deployment = Deployment::new(invocation).check_local()?;

    let completed = if dry_run {
        let log = PlanLog::new();
        let executor = DryRunExecutor::new(&log);
        let method = if local_rsync_available().await {
            TransferMethod::Delta
        } else {
            TransferMethod::FullCopy
        };
        let transfer = DryRunTransfer::new(&log, method);
        let inv = deployment.invocation();
        let orchestrator = ComposeCli::new(
            &executor,
            inv.target.remote_path.clone(),
            ComposeVariant::default(),
            inv.layout.compose_file.clone(),
        );

        let deployment = deployment.reach_remote(&executor).await?;
        let completed = run_remote_phases(
            deployment,
            &executor,
            &transfer,
            &orchestrator,
            output,
            &mut diag,
        )
        .await?;
        output.plan(&log.actions());
        completed
    } else {
        let session = connect(deployment.invocation(), output).await?;
        let result: Result<Deployment<Completed>> = async {
            let deployment = deployment.reach_remote(&session).await?;
            let variant = detect(&session, output).await?;
            let transfer = choose_transfer(&session, deployment.invocation(), &mut diag).await;
            let inv = deployment.invocation();
            let orchestrator = ComposeCli::new(
                &session,
                inv.target.remote_path.clone(),
                variant,
                inv.layout.compose_file.clone(),
            );
            run_remote_phases(
                deployment,
                &session,
                transfer.as_ref(),
                &orchestrator,
                output,
                &mut diag,
            )
            .await
        }
        .await;
        disconnect(session, &mut diag).await;
        result?
    };

    finish(&completed, dry_run, output, &diag);
    Ok(())
}

fn finish(completed: &Deployment<Completed>, dry_run: bool, output: &Output, diag: &Diagnostics) {
    for warning in diag.warnings() {
        output.warning(&warning.message);
    }

    let sync = completed.sync_outcome();
    output.progress(&format!(
        "    {} transfer, {} file(s) changed",
        sync.method, sync.changed
    ));

    let message = match (dry_run, completed.public_url()) {
        (true, _) => "Dry run complete, no changes were made".to_string(),
        (false, Some(url)) => format!("Deployment complete! n8n is available at {}", url),
        (false, None) => "Deployment complete!".to_string(),
    };
    output.success(&message);
}
