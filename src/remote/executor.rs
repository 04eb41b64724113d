// ABOUTME: RemoteExecutor trait: run a command on the target and collect its output.
// ABOUTME: Implemented by the SSH session, the dry-run recorder, and test fakes.

use crate::ssh::{self, CommandOutput, Session};
use async_trait::async_trait;

/// Single-command execution with exit-code propagation.
#[async_trait]
pub trait RemoteExecutor: Send + Sync {
    /// Run a shell command on the remote host.
    async fn exec(&self, command: &str) -> ssh::Result<CommandOutput>;

    /// Run a shell command with `input` on its stdin.
    async fn exec_with_input(&self, command: &str, input: &[u8]) -> ssh::Result<CommandOutput>;

    /// True when commands are only recorded, never run. Verification reads
    /// that depend on real remote state are skipped in that case.
    fn is_dry_run(&self) -> bool {
        false
    }

    /// Run a command and fail on non-zero exit.
    async fn exec_checked(&self, command: &str) -> ssh::Result<CommandOutput> {
        self.exec(command).await?.checked(command)
    }

    /// Replace `path` with `contents` atomically (write a sibling, then rename).
    async fn write_file(&self, path: &str, contents: &[u8]) -> ssh::Result<()> {
        let tmp = format!("{}.n8n-deploy.tmp", path);
        let command = format!(
            "cat > {tmp} && mv -f {tmp} {dst}",
            tmp = crate::shell::quote(&tmp),
            dst = crate::shell::quote(path)
        );
        self.exec_with_input(&command, contents)
            .await?
            .checked(&command)
            .map(|_| ())
    }
}

#[async_trait]
impl RemoteExecutor for Session {
    async fn exec(&self, command: &str) -> ssh::Result<CommandOutput> {
        tracing::debug!(command, "remote exec");
        Session::exec(self, command).await
    }

    async fn exec_with_input(&self, command: &str, input: &[u8]) -> ssh::Result<CommandOutput> {
        tracing::debug!(command, bytes = input.len(), "remote exec with stdin");
        Session::exec_with_input(self, command, input).await
    }
}
