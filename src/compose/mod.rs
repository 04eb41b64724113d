// ABOUTME: Docker Compose integration: composition parsing, CLI detection, orchestration.
// ABOUTME: Everything runs through the compose CLI on the remote host.

mod detection;
mod error;
mod file;
mod orchestrator;
mod types;

pub use detection::{DetectionError, detect_compose};
pub use error::{ComposeError, ComposeErrorKind};
pub use file::{ComposeFile, ComposeFileError, DeclaredService};
pub use orchestrator::{ComposeCli, ContainerOrchestrator};
pub use types::{ComposeVariant, ContainerStatus, ServiceHealth};
