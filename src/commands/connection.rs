// ABOUTME: Shared helpers for reaching the remote host over SSH.
// ABOUTME: Connection, compose detection, transfer selection, and disconnect for all commands.

use n8n_deploy::compose::{ComposeVariant, detect_compose};
use n8n_deploy::config::Invocation;
use n8n_deploy::deploy::{Phase, PreflightError};
use n8n_deploy::diagnostics::{Diagnostics, Warning};
use n8n_deploy::error::Result;
use n8n_deploy::output::Output;
use n8n_deploy::remote::{ArchiveTransfer, FileTransfer, RsyncTransfer, local_rsync_available};
use n8n_deploy::ssh::Session;

/// Open an authenticated session to the target.
pub async fn connect(invocation: &Invocation, output: &Output) -> Result<Session> {
    let target = &invocation.target;
    output.phase(
        Phase::Preflight,
        &format!("Connecting to {}:{}...", target.destination(), target.port),
    );
    let config = target.session_config(
        invocation.timing.connect_timeout,
        invocation.timing.command_timeout,
    );
    let session = Session::connect(config)
        .await
        .map_err(PreflightError::from_connect)?;
    Ok(session)
}

/// Find the compose CLI on the remote host.
pub async fn detect(session: &Session, output: &Output) -> Result<ComposeVariant> {
    let variant = detect_compose(session)
        .await
        .map_err(PreflightError::from)?;
    output.progress(&format!("    using {}", variant));
    Ok(variant)
}

/// Delta transfer when rsync exists on both ends, otherwise a full copy.
pub async fn choose_transfer<'a>(
    session: &'a Session,
    invocation: &Invocation,
    diag: &mut Diagnostics,
) -> Box<dyn FileTransfer + 'a> {
    let local = local_rsync_available().await;
    let remote = session
        .exec("command -v rsync")
        .await
        .map(|o| o.success())
        .unwrap_or(false);

    if local && remote {
        let target = &invocation.target;
        return Box::new(RsyncTransfer::new(
            target.destination(),
            target.ssh_transport(invocation.timing.connect_timeout),
        ));
    }

    let missing = match (local, remote) {
        (false, false) => "locally and on the remote host",
        (false, true) => "locally",
        _ => "on the remote host",
    };
    diag.warn(Warning::transfer_fallback(format!(
        "rsync not found {}; copying every file instead of only changes",
        missing
    )));
    Box::new(ArchiveTransfer::new(session))
}

/// Close the session; failure here only warns.
pub async fn disconnect(session: Session, diag: &mut Diagnostics) {
    let host = session.config().host.clone();
    if let Err(e) = session.disconnect().await {
        diag.warn(Warning::ssh_disconnect(format!(
            "SSH disconnect failed for {}: {}",
            host, e
        )));
    }
}
