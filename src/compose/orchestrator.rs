// ABOUTME: ContainerOrchestrator trait and the compose-CLI implementation run over SSH.
// ABOUTME: Pull, converge with orphan removal, targeted recreation, and container status rows.

use super::error::{ConvergeSnafu, PullSnafu, RecreateSnafu, StatusSnafu};
use super::{ComposeError, ComposeVariant, ContainerStatus};
use crate::remote::RemoteExecutor;
use crate::shell;
use crate::types::{RemotePath, ServiceName};
use async_trait::async_trait;
use snafu::ResultExt;

/// Reconciles the remote container set with the declared composition.
#[async_trait]
pub trait ContainerOrchestrator: Send + Sync {
    /// Pull every image the composition declares.
    async fn pull(&self) -> Result<(), ComposeError>;

    /// Start or recreate services to match the composition and remove orphans.
    /// `scale` pins replica counts for the named services.
    async fn converge(&self, scale: &[(ServiceName, u32)]) -> Result<(), ComposeError>;

    /// Recreate the named services so they pick up environment changes.
    /// `scale` must match what converge used or replicas are lost.
    async fn recreate(
        &self,
        services: &[ServiceName],
        scale: &[(ServiceName, u32)],
    ) -> Result<(), ComposeError>;

    /// One row per container belonging to the project, stopped ones included.
    async fn status(&self) -> Result<Vec<ContainerStatus>, ComposeError>;
}

/// Drives `docker compose` (or `docker-compose`) inside the deployment directory.
pub struct ComposeCli<'a, E: ?Sized> {
    executor: &'a E,
    project_dir: RemotePath,
    variant: ComposeVariant,
    compose_file: String,
}

impl<'a, E: RemoteExecutor + ?Sized> ComposeCli<'a, E> {
    pub fn new(
        executor: &'a E,
        project_dir: RemotePath,
        variant: ComposeVariant,
        compose_file: impl Into<String>,
    ) -> Self {
        Self {
            executor,
            project_dir,
            variant,
            compose_file: compose_file.into(),
        }
    }

    /// `cd <dir> && <compose> -f <file> <args>`
    fn command(&self, args: &str) -> String {
        format!(
            "cd {} && {} -f {} {}",
            self.project_dir.quoted(),
            self.variant.command(),
            shell::quote(&self.compose_file),
            args
        )
    }

    pub(crate) fn pull_command(&self) -> String {
        self.command("pull --quiet")
    }

    pub(crate) fn converge_command(&self, scale: &[(ServiceName, u32)]) -> String {
        let mut args = String::from("up -d --remove-orphans");
        push_scale(&mut args, scale);
        self.command(&args)
    }

    /// `restart` keeps the old container config, so env_file edits need `up --force-recreate`.
    pub(crate) fn recreate_command(
        &self,
        services: &[ServiceName],
        scale: &[(ServiceName, u32)],
    ) -> String {
        let names: Vec<&str> = services.iter().map(|s| s.as_str()).collect();
        let mut args = String::from("up -d --no-deps --force-recreate");
        push_scale(&mut args, scale);
        args.push(' ');
        args.push_str(&shell::join(&names));
        self.command(&args)
    }

    pub(crate) fn status_command(&self) -> String {
        let filter = format!(
            "label=com.docker.compose.project.working_dir={}",
            self.project_dir
        );
        format!(
            "docker ps -a --filter {} --format {}",
            shell::quote(&filter),
            shell::quote(r#"{{.Label "com.docker.compose.service"}}|{{.State}}|{{.Status}}"#)
        )
    }
}

fn push_scale(args: &mut String, scale: &[(ServiceName, u32)]) {
    for (service, replicas) in scale {
        args.push_str(&format!(" --scale {}={}", service, replicas));
    }
}

/// Parse `service|state|status` rows.
pub(crate) fn parse_status(stdout: &str) -> Result<Vec<ContainerStatus>, ComposeError> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let mut parts = line.splitn(3, '|');
            match (parts.next(), parts.next(), parts.next()) {
                (Some(service), Some(state), Some(status)) if !service.is_empty() => {
                    Ok(ContainerStatus {
                        service: service.to_string(),
                        state: state.to_string(),
                        status: status.to_string(),
                    })
                }
                _ => Err(ComposeError::StatusParse {
                    line: line.to_string(),
                }),
            }
        })
        .collect()
}

#[async_trait]
impl<E: RemoteExecutor + ?Sized> ContainerOrchestrator for ComposeCli<'_, E> {
    async fn pull(&self) -> Result<(), ComposeError> {
        let command = self.pull_command();
        self.executor
            .exec_checked(&command)
            .await
            .context(PullSnafu)?;
        Ok(())
    }

    async fn converge(&self, scale: &[(ServiceName, u32)]) -> Result<(), ComposeError> {
        let command = self.converge_command(scale);
        self.executor
            .exec_checked(&command)
            .await
            .context(ConvergeSnafu)?;
        Ok(())
    }

    async fn recreate(
        &self,
        services: &[ServiceName],
        scale: &[(ServiceName, u32)],
    ) -> Result<(), ComposeError> {
        let command = self.recreate_command(services, scale);
        self.executor
            .exec_checked(&command)
            .await
            .context(RecreateSnafu {
                services: services
                    .iter()
                    .map(|s| s.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            })?;
        Ok(())
    }

    async fn status(&self) -> Result<Vec<ContainerStatus>, ComposeError> {
        let command = self.status_command();
        let output = self
            .executor
            .exec_checked(&command)
            .await
            .context(StatusSnafu)?;
        parse_status(&output.stdout)
    }
}
