// ABOUTME: Configuration for n8n-deploy: optional n8n-deploy.yml plus CLI resolution.
// ABOUTME: Handles YAML parsing, defaults, and validation into an immutable Invocation.

mod edge;
mod error;
mod resolve;
mod server;
mod target;

pub use edge::EdgeConfig;
pub use error::ConfigError;
pub use resolve::{DeployArgs, Invocation, resolve};
pub use server::HostAddress;
pub use target::{CredentialRef, DeploymentTarget};

use crate::types::ServiceName;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "n8n-deploy.yml";
pub const CONFIG_FILENAME_HIDDEN: &str = ".n8n-deploy.yml";

/// Remote deployment directory when none is given.
pub const DEFAULT_REMOTE_PATH: &str = "/opt/n8n";
/// Conventional key location, relative to `$HOME`.
pub const DEFAULT_KEY_PATH: &str = ".ssh/id_rsa";
/// Credential handle that selects SSH agent authentication.
pub const AGENT_CREDENTIAL: &str = "agent";

/// Whether mutating actions are performed or only described.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    #[default]
    Execute,
    DryRun,
}

impl RunMode {
    pub fn is_dry_run(self) -> bool {
        self == RunMode::DryRun
    }
}

/// Contents of `n8n-deploy.yml`. Every field is optional; CLI flags win.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub host: Option<String>,
    pub user: Option<String>,
    pub port: Option<u16>,
    pub key: Option<String>,
    pub remote_path: Option<String>,
    pub domain: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub ssl: bool,
    pub workers: Option<u32>,
    #[serde(default)]
    pub strict_host_key: bool,

    #[serde(default)]
    pub project: ProjectLayout,

    #[serde(default)]
    pub services: ServiceRoles,

    #[serde(default)]
    pub timing: Timing,
}

/// Local project layout and which paths get transferred.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProjectLayout {
    pub compose_file: String,
    pub env_file: String,
    /// Helper that installs the nginx virtual host: `<script> <domain> <port>`.
    pub proxy_script: String,
    /// Port the main service listens on, passed to the proxy script.
    pub upstream_port: u16,
    /// Entries always transferred. A trailing `/` marks an optional directory.
    pub core: Vec<String>,
    /// Entries transferred only when a domain is configured.
    pub edge: Vec<String>,
}

impl Default for ProjectLayout {
    fn default() -> Self {
        Self {
            compose_file: "docker-compose.yml".to_string(),
            env_file: ".env".to_string(),
            proxy_script: "scripts/setup-nginx.sh".to_string(),
            upstream_port: 5678,
            core: vec!["docker-compose.yml".to_string(), ".env".to_string()],
            edge: vec!["nginx/".to_string(), "scripts/".to_string()],
        }
    }
}

/// Which compose services play which role during edge configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceRoles {
    pub main: ServiceName,
    pub worker: ServiceName,
    /// Host-level reverse proxy unit, reported once edge configuration ran.
    pub proxy: String,
}

impl Default for ServiceRoles {
    fn default() -> Self {
        Self {
            main: ServiceName::new("n8n").expect("static service name is valid"),
            worker: ServiceName::new("n8n-worker").expect("static service name is valid"),
            proxy: "nginx".to_string(),
        }
    }
}

/// Durations that bound the run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Timing {
    /// Pause after convergence before the health snapshot.
    #[serde(with = "humantime_serde")]
    pub settle_delay: Duration,
    /// Pause after the edge restart before the second health snapshot.
    #[serde(with = "humantime_serde")]
    pub restart_settle: Duration,
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
    #[serde(with = "humantime_serde")]
    pub command_timeout: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_secs(10),
            restart_settle: Duration::from_secs(15),
            connect_timeout: Duration::from_secs(10),
            command_timeout: Duration::from_secs(600),
        }
    }
}

impl FileConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content).map_err(|source| ConfigError::FileParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the project's config file if one exists; absence is not an error.
    pub fn discover(dir: &Path) -> Result<Option<(PathBuf, Self)>, ConfigError> {
        for name in [CONFIG_FILENAME, CONFIG_FILENAME_HIDDEN] {
            let path = dir.join(name);
            if path.is_file() {
                let config = Self::load(&path)?;
                return Ok(Some((path, config)));
            }
        }
        Ok(None)
    }
}
