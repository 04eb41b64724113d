// ABOUTME: Argument resolution: merges CLI flags over n8n-deploy.yml and applies defaults.
// ABOUTME: Pure validation; the only environment read is $HOME for '~' expansion.

use super::edge::EdgeConfig;
use super::error::ConfigError;
use super::server::HostAddress;
use super::target::{CredentialRef, DeploymentTarget};
use super::{
    AGENT_CREDENTIAL, DEFAULT_KEY_PATH, DEFAULT_REMOTE_PATH, FileConfig, ProjectLayout, RunMode,
    ServiceRoles, Timing,
};
use crate::diagnostics::{Diagnostics, Warning};
use crate::types::{ContactEmail, Domain, RemotePath, ServiceName};
use std::path::PathBuf;

/// Raw invocation parameters as collected from the command line.
#[derive(Debug, Clone, Default)]
pub struct DeployArgs {
    pub host: Option<String>,
    pub user: Option<String>,
    pub port: Option<u16>,
    pub key: Option<String>,
    pub remote_path: Option<String>,
    pub domain: Option<String>,
    pub ssl: bool,
    pub email: Option<String>,
    pub workers: Option<u32>,
    pub dry_run: bool,
    pub strict_host_key: bool,
    pub project_dir: PathBuf,
}

/// Everything a run needs, validated and defaulted. Immutable once built.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub target: DeploymentTarget,
    pub edge: Option<EdgeConfig>,
    pub mode: RunMode,
    pub workers: Option<u32>,
    pub project_dir: PathBuf,
    pub layout: ProjectLayout,
    pub services: ServiceRoles,
    pub timing: Timing,
}

impl Invocation {
    /// Replica pins passed to every compose `up`: the worker count, when one was given.
    pub fn worker_scale(&self) -> Vec<(ServiceName, u32)> {
        self.workers
            .map(|n| vec![(self.services.worker.clone(), n)])
            .unwrap_or_default()
    }
}

/// Resolve CLI arguments against the optional config file.
///
/// Flag precedence: command line, then `user@host:port` parts embedded in
/// the host argument, then `n8n-deploy.yml`, then built-in defaults.
pub fn resolve(
    args: DeployArgs,
    file: FileConfig,
    diag: &mut Diagnostics,
) -> Result<Invocation, ConfigError> {
    let edge = resolve_edge(&args, &file, diag)?;

    let raw_host = non_empty(args.host)
        .or_else(|| non_empty(file.host.clone()))
        .ok_or(ConfigError::MissingArgument("host"))?;
    let address = HostAddress::parse(&raw_host).map_err(ConfigError::InvalidHost)?;

    let user = non_empty(args.user)
        .or(address.user)
        .or_else(|| non_empty(file.user.clone()))
        .ok_or(ConfigError::MissingArgument("user"))?;

    let port = args.port.or(address.port).or(file.port).unwrap_or(22);

    let remote_path = RemotePath::new(
        &non_empty(args.remote_path)
            .or_else(|| non_empty(file.remote_path.clone()))
            .unwrap_or_else(|| DEFAULT_REMOTE_PATH.to_string()),
    )?;

    let credential = resolve_credential(
        non_empty(args.key).or_else(|| non_empty(file.key.clone())),
    )?;

    let workers = args.workers.or(file.workers);
    if workers == Some(0) {
        return Err(ConfigError::InvalidWorkers);
    }

    let mode = if args.dry_run {
        RunMode::DryRun
    } else {
        RunMode::Execute
    };

    Ok(Invocation {
        target: DeploymentTarget {
            host: address.host,
            port,
            user,
            credential,
            remote_path,
            trust_on_first_use: !(args.strict_host_key || file.strict_host_key),
        },
        edge,
        mode,
        workers,
        project_dir: args.project_dir,
        layout: file.project,
        services: file.services,
        timing: file.timing,
    })
}

/// Build the single validated edge value, or fail before any I/O.
fn resolve_edge(
    args: &DeployArgs,
    file: &FileConfig,
    diag: &mut Diagnostics,
) -> Result<Option<EdgeConfig>, ConfigError> {
    let ssl = args.ssl || file.ssl;
    let domain = non_empty(args.domain.clone()).or_else(|| non_empty(file.domain.clone()));
    let email = non_empty(args.email.clone()).or_else(|| non_empty(file.email.clone()));

    if ssl {
        let domain = domain.ok_or(ConfigError::TlsRequires("domain"))?;
        let email = email.ok_or(ConfigError::TlsRequires("email"))?;
        return Ok(Some(EdgeConfig::https(
            Domain::parse(&domain)?,
            ContactEmail::parse(&email)?,
        )));
    }

    match domain {
        Some(domain) => {
            let domain = Domain::parse(&domain)?;
            diag.warn(Warning::http_only(format!(
                "{} will be served over plain HTTP; pass --ssl --email <address> to enable TLS",
                domain
            )));
            if email.is_some() {
                tracing::debug!("contact email ignored without --ssl");
            }
            Ok(Some(EdgeConfig::http(domain)))
        }
        None => Ok(None),
    }
}

fn resolve_credential(raw: Option<String>) -> Result<CredentialRef, ConfigError> {
    match raw {
        Some(value) if value == AGENT_CREDENTIAL => Ok(CredentialRef::Agent),
        Some(value) => Ok(CredentialRef::KeyFile(expand_home(&value)?)),
        None => {
            let home = home_dir().ok_or_else(|| ConfigError::HomeNotSet("default key path".into()))?;
            Ok(CredentialRef::KeyFile(home.join(DEFAULT_KEY_PATH)))
        }
    }
}

fn expand_home(value: &str) -> Result<PathBuf, ConfigError> {
    match value.strip_prefix("~/") {
        Some(rest) => home_dir()
            .map(|home| home.join(rest))
            .ok_or_else(|| ConfigError::HomeNotSet(value.to_string())),
        None => Ok(PathBuf::from(value)),
    }
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .filter(|h| !h.is_empty())
        .map(PathBuf::from)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
