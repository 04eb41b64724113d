// ABOUTME: Deployment pipeline using the type state pattern.
// ABOUTME: Preflight, sync, converge, health, and edge phases as compile-time ordered transitions.

mod deployment;
mod edge;
mod error;
mod health;
mod phase;
mod pipeline;
mod state;
mod sync;
mod transitions;

pub use deployment::Deployment;
pub use edge::{
    EdgeConfigurator, EdgeOutcome, EdgePhase, RENEWAL_CRON_PATH, apply_public_env,
    resume_command, rewrite_env,
};
pub use error::{EdgeError, EdgeFailure, PreflightError};
pub use health::{
    HealthStage, HealthVerifier, ProxyHealth, ServiceHealthReport, classify, warn_degraded,
};
pub use phase::Phase;
pub use pipeline::run_remote_phases;
pub use state::{
    Completed, Converged, HealthReported, LocallyVerified, Preflighted, Resolved, Synced,
};
pub use sync::{STATE_DIR, SyncOutcome, SyncRecord, Synchronizer};
pub use transitions::{REACHABILITY_COMMAND, load_composition, restart_targets, verify_credential};
