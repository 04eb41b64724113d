// ABOUTME: Command module aggregator for the n8n-deploy CLI.
// ABOUTME: Re-exports deploy, edge, and status handlers plus shared argument resolution.

mod connection;
mod deploy;
mod edge;
mod status;

pub use deploy::deploy;
pub use edge::edge;
pub use status::status;

use n8n_deploy::config::{self, DeployArgs, FileConfig, Invocation};
use n8n_deploy::diagnostics::Diagnostics;
use n8n_deploy::error::Result;

/// Merge CLI arguments with the project's config file, if any.
fn resolve_invocation(args: DeployArgs, diag: &mut Diagnostics) -> Result<Invocation> {
    let file = match FileConfig::discover(&args.project_dir)? {
        Some((path, file)) => {
            tracing::debug!(path = %path.display(), "loaded config file");
            file
        }
        None => FileConfig::default(),
    };
    Ok(config::resolve(args, file, diag)?)
}
