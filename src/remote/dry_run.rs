// ABOUTME: Recording clients for dry-run mode: every would-be action is logged, none is run.
// ABOUTME: The plan log is listed at the end of a dry run.

use super::{FileTransfer, RemoteExecutor, TransferError, TransferMethod, TransferStats};
use crate::manifest::TransferManifest;
use crate::ssh::{self, CommandOutput};
use crate::types::RemotePath;
use async_trait::async_trait;
use parking_lot::Mutex;

/// One action a live run would have performed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedAction {
    Command(String),
    Upload { command: String, bytes: usize },
    Transfer {
        method: TransferMethod,
        root: String,
        entries: Vec<String>,
    },
}

impl std::fmt::Display for PlannedAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlannedAction::Command(command) => write!(f, "run: {}", command),
            PlannedAction::Upload { command, bytes } => {
                write!(f, "run: {} (with {} bytes on stdin)", command, bytes)
            }
            PlannedAction::Transfer {
                method,
                root,
                entries,
            } => write!(f, "{} transfer to {}: {}", method, root, entries.join(", ")),
        }
    }
}

/// Ordered log of planned actions, shared by the dry-run clients.
#[derive(Debug, Default)]
pub struct PlanLog {
    actions: Mutex<Vec<PlannedAction>>,
}

impl PlanLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, action: PlannedAction) {
        tracing::info!(action = %action, "dry-run");
        self.actions.lock().push(action);
    }

    pub fn actions(&self) -> Vec<PlannedAction> {
        self.actions.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.actions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.lock().is_empty()
    }
}

/// Executor that records commands and reports success with empty output.
#[derive(Debug, Clone, Copy)]
pub struct DryRunExecutor<'a> {
    log: &'a PlanLog,
}

impl<'a> DryRunExecutor<'a> {
    pub fn new(log: &'a PlanLog) -> Self {
        Self { log }
    }
}

#[async_trait]
impl RemoteExecutor for DryRunExecutor<'_> {
    fn is_dry_run(&self) -> bool {
        true
    }

    async fn exec(&self, command: &str) -> ssh::Result<CommandOutput> {
        self.log.record(PlannedAction::Command(command.to_string()));
        Ok(CommandOutput::default())
    }

    async fn exec_with_input(&self, command: &str, input: &[u8]) -> ssh::Result<CommandOutput> {
        self.log.record(PlannedAction::Upload {
            command: command.to_string(),
            bytes: input.len(),
        });
        Ok(CommandOutput::default())
    }
}

/// Transfer that records what would be mirrored.
#[derive(Debug, Clone, Copy)]
pub struct DryRunTransfer<'a> {
    log: &'a PlanLog,
    method: TransferMethod,
}

impl<'a> DryRunTransfer<'a> {
    pub fn new(log: &'a PlanLog, method: TransferMethod) -> Self {
        Self { log, method }
    }
}

#[async_trait]
impl FileTransfer for DryRunTransfer<'_> {
    fn method(&self) -> TransferMethod {
        self.method
    }

    async fn mirror(
        &self,
        manifest: &TransferManifest,
        root: &RemotePath,
    ) -> Result<TransferStats, TransferError> {
        self.log.record(PlannedAction::Transfer {
            method: self.method,
            root: root.to_string(),
            entries: manifest.relative_paths(),
        });
        Ok(TransferStats {
            method: self.method,
            changed: 0,
        })
    }
}
