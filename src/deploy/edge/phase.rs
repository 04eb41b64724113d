// ABOUTME: Edge configuration sub-phases, in execution order.
// ABOUTME: Parsed from `--from` to resume a partially configured edge.

use crate::config::EdgeConfig;
use serde::Serialize;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgePhase {
    ScriptsStaged,
    ProxyConfigured,
    CertificateObtained,
    EnvironmentUpdated,
    ServicesRestarted,
}

impl EdgePhase {
    pub const ALL: [EdgePhase; 5] = [
        EdgePhase::ScriptsStaged,
        EdgePhase::ProxyConfigured,
        EdgePhase::CertificateObtained,
        EdgePhase::EnvironmentUpdated,
        EdgePhase::ServicesRestarted,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EdgePhase::ScriptsStaged => "scripts-staged",
            EdgePhase::ProxyConfigured => "proxy-configured",
            EdgePhase::CertificateObtained => "certificate-obtained",
            EdgePhase::EnvironmentUpdated => "environment-updated",
            EdgePhase::ServicesRestarted => "services-restarted",
        }
    }

    /// Certificate and environment steps only run with TLS.
    pub fn applies(self, edge: &EdgeConfig) -> bool {
        match self {
            EdgePhase::CertificateObtained | EdgePhase::EnvironmentUpdated => edge.tls_enabled(),
            _ => true,
        }
    }
}

impl std::fmt::Display for EdgePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EdgePhase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EdgePhase::ALL
            .into_iter()
            .find(|phase| phase.as_str() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = EdgePhase::ALL.iter().map(|p| p.as_str()).collect();
                format!("unknown edge phase '{}' (expected one of: {})", s, names.join(", "))
            })
    }
}
