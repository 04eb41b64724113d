// ABOUTME: Edge configuration: reverse proxy, TLS certificate, public URL, service recreation.
// ABOUTME: Sub-phases run in order without retries; a failure names where to resume.

mod env_file;
mod phase;

pub use env_file::rewrite as rewrite_env;
pub use phase::EdgePhase;

use super::error::{EdgeError, EdgeFailure};
use crate::compose::ContainerOrchestrator;
use crate::config::{CredentialRef, EdgeConfig, Invocation};
use crate::remote::RemoteExecutor;
use crate::shell;
use crate::ssh;
use crate::types::ServiceName;
use serde::Serialize;
use std::path::Path;
use tracing::Instrument;

/// Installed when neither a certbot timer nor a packaged cron job renews certificates.
pub const RENEWAL_CRON_PATH: &str = "/etc/cron.d/n8n-deploy-certbot";
const RENEWAL_CRON: &str = "0 3,15 * * * root certbot renew --quiet --deploy-hook 'systemctl reload nginx'\n";

/// What an edge run did.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EdgeOutcome {
    pub applied: Vec<EdgePhase>,
    pub skipped: Vec<EdgePhase>,
    pub environment_changed: bool,
    pub restarted: bool,
}

pub struct EdgeConfigurator<'a, E: ?Sized, O: ?Sized> {
    executor: &'a E,
    orchestrator: &'a O,
    invocation: &'a Invocation,
    edge: &'a EdgeConfig,
    restart: Vec<ServiceName>,
}

impl<'a, E, O> EdgeConfigurator<'a, E, O>
where
    E: RemoteExecutor + ?Sized,
    O: ContainerOrchestrator + ?Sized,
{
    /// `restart` lists the services bounced once the public URL changes.
    pub fn new(
        executor: &'a E,
        orchestrator: &'a O,
        invocation: &'a Invocation,
        edge: &'a EdgeConfig,
        restart: Vec<ServiceName>,
    ) -> Self {
        Self {
            executor,
            orchestrator,
            invocation,
            edge,
            restart,
        }
    }

    /// Run every applicable sub-phase starting at `from`.
    pub async fn run(&self, from: EdgePhase) -> Result<EdgeOutcome, EdgeError> {
        let mut outcome = EdgeOutcome::default();

        for phase in EdgePhase::ALL {
            if phase < from || !phase.applies(self.edge) {
                outcome.skipped.push(phase);
                continue;
            }
            if phase == EdgePhase::ServicesRestarted
                && !outcome.environment_changed
                && from != EdgePhase::ServicesRestarted
            {
                if self.edge.tls_enabled() {
                    tracing::info!("environment file already current, services not restarted");
                } else {
                    tracing::info!(
                        "TLS disabled so the environment file is left alone, services not restarted"
                    );
                }
                outcome.skipped.push(phase);
                continue;
            }

            let span = tracing::info_span!("edge", step = phase.as_str());
            self.step(phase, &mut outcome)
                .instrument(span)
                .await
                .map_err(|source| EdgeError {
                    phase,
                    source,
                    resume_command: resume_command(self.invocation, self.edge, phase),
                })?;
            outcome.applied.push(phase);
        }

        Ok(outcome)
    }

    async fn step(&self, phase: EdgePhase, outcome: &mut EdgeOutcome) -> Result<(), EdgeFailure> {
        match phase {
            EdgePhase::ScriptsStaged => self.stage_scripts().await,
            EdgePhase::ProxyConfigured => self.configure_proxy().await,
            EdgePhase::CertificateObtained => self.obtain_certificate().await,
            EdgePhase::EnvironmentUpdated => {
                outcome.environment_changed = self.update_environment().await?;
                Ok(())
            }
            EdgePhase::ServicesRestarted => {
                self.recreate_services().await?;
                outcome.restarted = true;
                Ok(())
            }
        }
    }

    /// Run with root privileges: directly as root, otherwise through non-interactive sudo.
    fn privileged(&self, command: &str) -> String {
        if self.invocation.target.is_root() {
            command.to_string()
        } else {
            format!("sudo -n {}", command)
        }
    }

    fn proxy_script(&self) -> String {
        self.invocation
            .target
            .remote_path
            .join(&self.invocation.layout.proxy_script)
    }

    async fn stage_scripts(&self) -> Result<(), EdgeFailure> {
        let layout = &self.invocation.layout;
        let script_dir = Path::new(&layout.proxy_script)
            .parent()
            .map(|p| p.to_string_lossy().into_owned())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| ".".to_string());
        let dir = self.invocation.target.remote_path.join(&script_dir);

        self.executor
            .exec_checked(&format!(
                "find {} -maxdepth 1 -type f -name '*.sh' -exec chmod +x {{}} +",
                shell::quote(&dir)
            ))
            .await?;

        let script = self.proxy_script();
        let check = self
            .executor
            .exec(&format!("test -x {}", shell::quote(&script)))
            .await?;
        if !check.success() {
            return Err(EdgeFailure::Verification(format!(
                "proxy helper {} is missing or not executable",
                script
            )));
        }
        Ok(())
    }

    async fn configure_proxy(&self) -> Result<(), EdgeFailure> {
        let install = format!(
            "{} {} {}",
            shell::quote(&self.proxy_script()),
            shell::quote(self.edge.domain.as_str()),
            self.invocation.layout.upstream_port
        );
        self.executor
            .exec_checked(&self.privileged(&install))
            .await?;

        let validate = self.privileged("nginx -t");
        let output = self.executor.exec(&validate).await?;
        if !output.success() {
            return Err(EdgeFailure::Verification(format!(
                "nginx rejected the configuration: {}",
                output.stderr.trim()
            )));
        }

        let unit = shell::quote(&self.invocation.services.proxy);
        self.executor
            .exec_checked(&self.privileged(&format!("systemctl reload {}", unit)))
            .await?;
        Ok(())
    }

    async fn obtain_certificate(&self) -> Result<(), EdgeFailure> {
        let email = self.edge.contact_email().ok_or_else(|| {
            EdgeFailure::Verification("TLS enabled without a contact email".to_string())
        })?;
        let domain = shell::quote(self.edge.domain.as_str());

        let issue = format!(
            "certbot --nginx --non-interactive --agree-tos --keep-until-expiring --redirect -d {} -m {}",
            domain,
            shell::quote(email.as_str())
        );
        self.executor.exec_checked(&self.privileged(&issue)).await?;

        if !self.executor.is_dry_run() {
            let listing = self
                .executor
                .exec_checked(&self.privileged(&format!("certbot certificates --cert-name {}", domain)))
                .await?;
            let expected = format!("Certificate Name: {}", self.edge.domain);
            if !listing.stdout.contains(&expected) {
                return Err(EdgeFailure::Verification(format!(
                    "certbot reports no certificate for {}",
                    self.edge.domain
                )));
            }
        }

        self.ensure_renewal().await
    }

    async fn ensure_renewal(&self) -> Result<(), EdgeFailure> {
        let timer = self.executor.exec("systemctl is-enabled certbot.timer").await?;
        if timer.success() {
            tracing::debug!("certbot.timer handles renewal");
            return Ok(());
        }
        let cron = self
            .executor
            .exec(&format!(
                "test -f /etc/cron.d/certbot || test -f {}",
                RENEWAL_CRON_PATH
            ))
            .await?;
        if cron.success() {
            tracing::debug!("cron handles renewal");
            return Ok(());
        }

        tracing::info!(path = RENEWAL_CRON_PATH, "installing certificate renewal job");
        let install = self.privileged(&format!("tee {} > /dev/null", RENEWAL_CRON_PATH));
        self.executor
            .exec_with_input(&install, RENEWAL_CRON.as_bytes())
            .await?
            .checked(&install)?;
        Ok(())
    }

    async fn update_environment(&self) -> Result<bool, EdgeFailure> {
        Ok(apply_public_env(self.executor, self.invocation, self.edge).await?)
    }

    async fn recreate_services(&self) -> Result<(), EdgeFailure> {
        let scale: Vec<(ServiceName, u32)> = self
            .invocation
            .worker_scale()
            .into_iter()
            .filter(|(service, _)| self.restart.contains(service))
            .collect();
        self.orchestrator.recreate(&self.restart, &scale).await?;
        if !self.executor.is_dry_run() {
            tokio::time::sleep(self.invocation.timing.restart_settle).await;
        }
        Ok(())
    }
}

/// Point `N8N_PROTOCOL` and `N8N_HOST` in the remote env file at the public URL.
/// Returns whether the file changed.
pub async fn apply_public_env<E: RemoteExecutor + ?Sized>(
    executor: &E,
    invocation: &Invocation,
    edge: &EdgeConfig,
) -> Result<bool, ssh::Error> {
    let path = invocation
        .target
        .remote_path
        .join(&invocation.layout.env_file);
    let current = executor
        .exec_checked(&format!("cat {}", shell::quote(&path)))
        .await?
        .stdout;

    let updated = rewrite_env(
        &current,
        &[
            ("N8N_PROTOCOL", edge.protocol()),
            ("N8N_HOST", edge.domain.as_str()),
        ],
    );
    if updated == current {
        tracing::debug!(%path, "environment already current");
        return Ok(false);
    }

    executor.write_file(&path, updated.as_bytes()).await?;
    tracing::info!(%path, url = %edge.public_url(), "environment points at public URL");
    Ok(true)
}

/// The command that re-runs edge configuration from `phase`.
pub fn resume_command(invocation: &Invocation, edge: &EdgeConfig, phase: EdgePhase) -> String {
    let target = &invocation.target;
    let mut parts = vec![
        "n8n-deploy edge".to_string(),
        format!("--host {}", shell::quote(&target.host)),
        format!("--user {}", shell::quote(&target.user)),
    ];
    if target.port != 22 {
        parts.push(format!("--port {}", target.port));
    }
    match &target.credential {
        CredentialRef::KeyFile(path) => {
            parts.push(format!("--key {}", shell::quote(&path.to_string_lossy())))
        }
        CredentialRef::Agent => parts.push("--key agent".to_string()),
    }
    parts.push(format!("--remote-path {}", target.remote_path.quoted()));
    parts.push(format!("--domain {}", edge.domain));
    if let Some(email) = edge.contact_email() {
        parts.push(format!("--ssl --email {}", shell::quote(email.as_str())));
    }
    if let Some(workers) = invocation.workers {
        parts.push(format!("--workers {}", workers));
    }
    parts.push(format!("--from {}", phase));
    parts.join(" ")
}
