// ABOUTME: Typed clients for the remote host: command execution and file mirroring.
// ABOUTME: Live implementations ride the SSH session; dry-run ones only record.

mod dry_run;
mod executor;
mod transfer;

pub use dry_run::{DryRunExecutor, DryRunTransfer, PlanLog, PlannedAction};
pub use executor::RemoteExecutor;
pub use transfer::{
    ArchiveTransfer, FileTransfer, RsyncTransfer, TransferError, TransferMethod, TransferStats,
    local_rsync_available,
};
