// ABOUTME: Validated domain types shared by the resolver and the pipeline.
// ABOUTME: Service names, public domains, contact emails and remote paths.

mod domain;
mod email;
mod remote_path;
mod service_name;

pub use domain::{Domain, DomainError};
pub use email::{ContactEmail, ContactEmailError};
pub use remote_path::{RemotePath, RemotePathError};
pub use service_name::{ServiceName, ServiceNameError};
