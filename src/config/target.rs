// ABOUTME: The remote machine and identity a run deploys to.
// ABOUTME: Converts into SSH session settings and rsync transport arguments.

use crate::ssh::SessionConfig;
use crate::types::RemotePath;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// How the run authenticates to the remote host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialRef {
    KeyFile(PathBuf),
    Agent,
}

impl fmt::Display for CredentialRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialRef::KeyFile(path) => write!(f, "{}", path.display()),
            CredentialRef::Agent => f.write_str("ssh-agent"),
        }
    }
}

/// One remote machine and the identity used to reach it. Immutable for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentTarget {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub credential: CredentialRef,
    pub remote_path: RemotePath,
    pub trust_on_first_use: bool,
}

impl DeploymentTarget {
    /// `user@host` as understood by ssh and rsync.
    pub fn destination(&self) -> String {
        format!("{}@{}", self.user, self.host)
    }

    pub fn is_root(&self) -> bool {
        self.user == "root"
    }

    pub fn session_config(&self, connect_timeout: Duration, command_timeout: Duration) -> SessionConfig {
        let config = SessionConfig::new(&self.host, &self.user)
            .port(self.port)
            .trust_on_first_use(self.trust_on_first_use)
            .connect_timeout(connect_timeout)
            .command_timeout(command_timeout);
        match &self.credential {
            CredentialRef::KeyFile(path) => config.key_path(path),
            CredentialRef::Agent => config,
        }
    }

    /// The `ssh` command line rsync uses as its transport (`rsync -e`).
    pub fn ssh_transport(&self, connect_timeout: Duration) -> String {
        let mut parts = vec![
            "ssh".to_string(),
            "-p".to_string(),
            self.port.to_string(),
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "-o".to_string(),
            format!("ConnectTimeout={}", connect_timeout.as_secs().max(1)),
            "-o".to_string(),
            if self.trust_on_first_use {
                "StrictHostKeyChecking=accept-new".to_string()
            } else {
                "StrictHostKeyChecking=yes".to_string()
            },
        ];
        if let CredentialRef::KeyFile(path) = &self.credential {
            parts.push("-i".to_string());
            parts.push(crate::shell::quote(&path.to_string_lossy()));
        }
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(credential: CredentialRef) -> DeploymentTarget {
        DeploymentTarget {
            host: "n8n.example.com".to_string(),
            port: 2222,
            user: "deploy".to_string(),
            credential,
            remote_path: RemotePath::new("/opt/n8n").unwrap(),
            trust_on_first_use: true,
        }
    }

    #[test]
    fn transport_includes_key_and_port() {
        let t = target(CredentialRef::KeyFile(PathBuf::from("/home/me/.ssh/id_rsa")));
        let transport = t.ssh_transport(Duration::from_secs(10));
        assert!(transport.starts_with("ssh -p 2222"));
        assert!(transport.contains("ConnectTimeout=10"));
        assert!(transport.contains("StrictHostKeyChecking=accept-new"));
        assert!(transport.ends_with("-i '/home/me/.ssh/id_rsa'"));
    }

    #[test]
    fn agent_transport_has_no_identity_flag() {
        let t = target(CredentialRef::Agent);
        assert!(!t.ssh_transport(Duration::from_secs(5)).contains("-i"));
        assert!(t.session_config(Duration::from_secs(5), Duration::from_secs(60)).key_path.is_none());
    }

    #[test]
    fn destination_joins_user_and_host() {
        assert_eq!(
            target(CredentialRef::Agent).destination(),
            "deploy@n8n.example.com"
        );
    }
}
