// ABOUTME: Test support utilities.
// ABOUTME: In-memory fakes of the remote clients plus project and invocation fixtures.

// Each test binary only uses some of these helpers.
#![allow(dead_code)]

use async_trait::async_trait;
use n8n_deploy::compose::{ComposeError, ContainerOrchestrator, ContainerStatus};
use n8n_deploy::config::{self, DeployArgs, FileConfig, Invocation, Timing};
use n8n_deploy::diagnostics::Diagnostics;
use n8n_deploy::manifest::TransferManifest;
use n8n_deploy::remote::{FileTransfer, RemoteExecutor, TransferError, TransferMethod, TransferStats};
use n8n_deploy::ssh::{self, CommandOutput};
use n8n_deploy::types::{RemotePath, ServiceName};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Once;
use std::time::Duration;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env()
            .add_directive("n8n_deploy=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub const STACK: &str = r#"
services:
  postgres:
    image: postgres:16
    healthcheck:
      test: ["CMD-SHELL", "pg_isready -U n8n"]
  redis:
    image: redis:7-alpine
  n8n:
    image: docker.n8n.io/n8nio/n8n:1.64.0
    healthcheck:
      test: ["CMD", "wget", "-qO-", "http://localhost:5678/healthz"]
  n8n-worker:
    image: docker.n8n.io/n8nio/n8n:1.64.0
    command: worker
"#;

pub fn ok(stdout: &str) -> CommandOutput {
    CommandOutput {
        exit_code: 0,
        stdout: stdout.to_string(),
        stderr: String::new(),
    }
}

pub fn failed(exit_code: u32, stderr: &str) -> CommandOutput {
    CommandOutput {
        exit_code,
        stdout: String::new(),
        stderr: stderr.to_string(),
    }
}

fn unquote(value: &str) -> String {
    let value = value.trim();
    let inner = value
        .strip_prefix('\'')
        .and_then(|v| v.strip_suffix('\''))
        .unwrap_or(value);
    inner.replace("'\\''", "'")
}

/// Records every command. Responds from scripted rules (first substring
/// match wins), then from an in-memory file table for `cat`, then succeeds.
#[derive(Default)]
pub struct FakeExecutor {
    commands: Mutex<Vec<String>>,
    rules: Mutex<Vec<(String, CommandOutput)>>,
    files: Mutex<HashMap<String, String>>,
}

impl FakeExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, pattern: &str, output: CommandOutput) -> Self {
        self.rules.lock().push((pattern.to_string(), output));
        self
    }

    pub fn with_file(self, path: &str, contents: &str) -> Self {
        self.files.lock().insert(path.to_string(), contents.to_string());
        self
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().clone()
    }

    pub fn ran(&self, fragment: &str) -> bool {
        self.commands.lock().iter().any(|c| c.contains(fragment))
    }

    pub fn count(&self, fragment: &str) -> usize {
        self.commands
            .lock()
            .iter()
            .filter(|c| c.contains(fragment))
            .count()
    }

    pub fn file(&self, path: &str) -> Option<String> {
        self.files.lock().get(path).cloned()
    }

    pub fn clear_commands(&self) {
        self.commands.lock().clear();
    }

    fn answer(&self, command: &str) -> CommandOutput {
        self.commands.lock().push(command.to_string());
        if let Some((_, output)) = self
            .rules
            .lock()
            .iter()
            .find(|(pattern, _)| command.contains(pattern.as_str()))
        {
            return output.clone();
        }
        if let Some(rest) = command.strip_prefix("cat ") {
            let path = unquote(rest.trim_end_matches(" 2>/dev/null"));
            return match self.files.lock().get(&path) {
                Some(contents) => ok(contents),
                None => failed(1, "No such file or directory"),
            };
        }
        ok("")
    }
}

#[async_trait]
impl RemoteExecutor for FakeExecutor {
    async fn exec(&self, command: &str) -> ssh::Result<CommandOutput> {
        Ok(self.answer(command))
    }

    async fn exec_with_input(&self, command: &str, _input: &[u8]) -> ssh::Result<CommandOutput> {
        Ok(self.answer(command))
    }

    async fn write_file(&self, path: &str, contents: &[u8]) -> ssh::Result<()> {
        self.commands.lock().push(format!("write {}", path));
        self.files
            .lock()
            .insert(path.to_string(), String::from_utf8_lossy(contents).into_owned());
        Ok(())
    }
}

/// Records mirrored entry lists.
pub struct FakeTransfer {
    pub method: TransferMethod,
    mirrored: Mutex<Vec<Vec<String>>>,
}

impl FakeTransfer {
    pub fn new(method: TransferMethod) -> Self {
        Self {
            method,
            mirrored: Mutex::new(Vec::new()),
        }
    }

    pub fn mirrored(&self) -> Vec<Vec<String>> {
        self.mirrored.lock().clone()
    }
}

#[async_trait]
impl FileTransfer for FakeTransfer {
    fn method(&self) -> TransferMethod {
        self.method
    }

    async fn mirror(
        &self,
        manifest: &TransferManifest,
        _root: &RemotePath,
    ) -> Result<TransferStats, TransferError> {
        self.mirrored.lock().push(manifest.relative_paths());
        Ok(TransferStats {
            method: self.method,
            changed: manifest.entry_count(),
        })
    }
}

/// Copies manifested local files into a [`FakeExecutor`]'s file table and
/// logs `transfer <entries>` among its commands, so ordering is visible.
pub struct MirroringTransfer<'a> {
    remote: &'a FakeExecutor,
}

impl<'a> MirroringTransfer<'a> {
    pub fn new(remote: &'a FakeExecutor) -> Self {
        Self { remote }
    }
}

fn copy_into(remote: &FakeExecutor, local: &Path, target: &str) {
    if local.is_dir() {
        for entry in fs::read_dir(local).unwrap() {
            let entry = entry.unwrap();
            let name = entry.file_name().to_string_lossy().into_owned();
            copy_into(remote, &entry.path(), &format!("{}/{}", target, name));
        }
    } else {
        let contents = fs::read_to_string(local).unwrap();
        remote.files.lock().insert(target.to_string(), contents);
    }
}

#[async_trait]
impl FileTransfer for MirroringTransfer<'_> {
    fn method(&self) -> TransferMethod {
        TransferMethod::Delta
    }

    async fn mirror(
        &self,
        manifest: &TransferManifest,
        root: &RemotePath,
    ) -> Result<TransferStats, TransferError> {
        let entries = manifest.relative_paths();
        self.remote
            .commands
            .lock()
            .push(format!("transfer {}", entries.join(",")));
        for entry in &entries {
            copy_into(self.remote, &manifest.root().join(entry), &root.join(entry));
        }
        Ok(TransferStats {
            method: TransferMethod::Delta,
            changed: entries.len(),
        })
    }
}

/// Records orchestrator calls as short strings.
#[derive(Default)]
pub struct FakeOrchestrator {
    calls: Mutex<Vec<String>>,
    rows: Mutex<Vec<ContainerStatus>>,
    fail_pull: bool,
    fail_status: bool,
}

impl FakeOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every core service of [`STACK`] running and healthy.
    pub fn healthy() -> Self {
        let orch = Self::default();
        *orch.rows.lock() = ["postgres", "redis", "n8n", "n8n-worker"]
            .iter()
            .map(|s| row(s, "running", "Up 1 minute (healthy)"))
            .collect();
        orch
    }

    pub fn with_rows(self, rows: Vec<ContainerStatus>) -> Self {
        *self.rows.lock() = rows;
        self
    }

    pub fn failing_pull(mut self) -> Self {
        self.fail_pull = true;
        self
    }

    pub fn failing_status(mut self) -> Self {
        self.fail_status = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

pub fn row(service: &str, state: &str, status: &str) -> ContainerStatus {
    ContainerStatus {
        service: service.to_string(),
        state: state.to_string(),
        status: status.to_string(),
    }
}

fn command_error(command: &str) -> ssh::Error {
    ssh::Error::NonZeroExit {
        command: command.to_string(),
        exit_code: 1,
        stderr: "simulated failure".to_string(),
    }
}

#[async_trait]
impl ContainerOrchestrator for FakeOrchestrator {
    async fn pull(&self) -> Result<(), ComposeError> {
        self.calls.lock().push("pull".to_string());
        if self.fail_pull {
            return Err(ComposeError::Pull {
                source: command_error("docker compose pull"),
            });
        }
        Ok(())
    }

    async fn converge(&self, scale: &[(ServiceName, u32)]) -> Result<(), ComposeError> {
        let scale: Vec<String> = scale.iter().map(|(s, n)| format!("{}={}", s, n)).collect();
        self.calls
            .lock()
            .push(format!("converge {}", scale.join(",")).trim_end().to_string());
        Ok(())
    }

    async fn recreate(
        &self,
        services: &[ServiceName],
        scale: &[(ServiceName, u32)],
    ) -> Result<(), ComposeError> {
        let names: Vec<&str> = services.iter().map(|s| s.as_str()).collect();
        let mut call = format!("recreate {}", names.join(","));
        for (service, replicas) in scale {
            call.push_str(&format!(" {}={}", service, replicas));
        }
        self.calls.lock().push(call);
        Ok(())
    }

    async fn status(&self) -> Result<Vec<ContainerStatus>, ComposeError> {
        self.calls.lock().push("status".to_string());
        if self.fail_status {
            return Err(ComposeError::Status {
                source: command_error("docker ps"),
            });
        }
        Ok(self.rows.lock().clone())
    }
}

/// A local project directory with the stack, env file, helper dirs, and a key.
pub struct Project {
    pub dir: tempfile::TempDir,
}

impl Project {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("docker-compose.yml"), STACK).unwrap();
        fs::write(dir.path().join(".env"), "POSTGRES_USER=n8n\nN8N_HOST=localhost\n").unwrap();
        fs::write(dir.path().join("id_test"), "not a real key").unwrap();
        Self { dir }
    }

    /// Adds `nginx/` and `scripts/setup-nginx.sh`.
    pub fn with_edge_helpers(self) -> Self {
        fs::create_dir_all(self.path().join("nginx")).unwrap();
        fs::write(self.path().join("nginx/n8n.conf"), "server {}\n").unwrap();
        fs::create_dir_all(self.path().join("scripts")).unwrap();
        fs::write(self.path().join("scripts/setup-nginx.sh"), "#!/bin/sh\n").unwrap();
        self
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn key(&self) -> PathBuf {
        self.path().join("id_test")
    }

    pub fn args(&self) -> DeployArgs {
        DeployArgs {
            host: Some("n8n.example.com".to_string()),
            user: Some("deploy".to_string()),
            key: Some(self.key().to_string_lossy().into_owned()),
            project_dir: self.path().to_path_buf(),
            ..Default::default()
        }
    }

    /// Resolve with zero settle delays so tests never sleep.
    pub fn invocation(&self, args: DeployArgs) -> Invocation {
        config::resolve(args, fast_file(), &mut Diagnostics::default()).unwrap()
    }
}

pub fn fast_file() -> FileConfig {
    FileConfig {
        timing: Timing {
            settle_delay: Duration::ZERO,
            restart_settle: Duration::ZERO,
            ..Default::default()
        },
        ..Default::default()
    }
}
