// ABOUTME: Local composition file parsing: which services are declared and which start by default.
// ABOUTME: YAML merge keys are resolved before the service table is read.

use crate::types::{ServiceName, ServiceNameError};
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, thiserror::Error)]
pub enum ComposeFileError {
    #[error("not valid compose YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("declares no services")]
    NoServices,

    #[error("invalid service name: {0}")]
    InvalidServiceName(#[from] ServiceNameError),
}

#[derive(Debug, Deserialize)]
struct RawCompose {
    #[serde(default)]
    services: BTreeMap<String, Option<RawService>>,
}

#[derive(Debug, Default, Deserialize)]
struct RawService {
    image: Option<String>,
    #[serde(default)]
    profiles: Vec<String>,
    healthcheck: Option<serde_yaml::Value>,
}

/// A service declared in the composition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredService {
    pub name: ServiceName,
    pub image: Option<String>,
    /// Services behind a profile only start when the profile is enabled.
    pub profiles: Vec<String>,
    pub has_healthcheck: bool,
}

impl DeclaredService {
    /// Started by a plain `up`.
    pub fn is_core(&self) -> bool {
        self.profiles.is_empty()
    }
}

/// The parts of a compose file the orchestrator cares about.
#[derive(Debug, Clone)]
pub struct ComposeFile {
    services: Vec<DeclaredService>,
}

impl ComposeFile {
    pub fn parse(yaml: &str) -> Result<Self, ComposeFileError> {
        let mut value: serde_yaml::Value = serde_yaml::from_str(yaml)?;
        value.apply_merge()?;
        let raw: RawCompose = serde_yaml::from_value(value)?;

        let services = raw
            .services
            .into_iter()
            .map(|(name, service)| {
                let service = service.unwrap_or_default();
                Ok(DeclaredService {
                    name: ServiceName::new(&name)?,
                    image: service.image,
                    profiles: service.profiles,
                    has_healthcheck: service.healthcheck.is_some_and(|h| !is_disabled(&h)),
                })
            })
            .collect::<Result<Vec<_>, ComposeFileError>>()?;

        if services.is_empty() {
            return Err(ComposeFileError::NoServices);
        }
        Ok(Self { services })
    }

    pub fn services(&self) -> &[DeclaredService] {
        &self.services
    }

    /// Services a plain `up` starts, in name order.
    pub fn core_services(&self) -> impl Iterator<Item = &DeclaredService> {
        self.services.iter().filter(|s| s.is_core())
    }

    pub fn declares(&self, name: &ServiceName) -> bool {
        self.services.iter().any(|s| &s.name == name)
    }
}

fn is_disabled(healthcheck: &serde_yaml::Value) -> bool {
    healthcheck
        .get("disable")
        .and_then(serde_yaml::Value::as_bool)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STACK: &str = r#"
x-shared: &shared
  restart: always
  image: docker.n8n.io/n8nio/n8n:1.64.0

services:
  postgres:
    image: postgres:16
    healthcheck:
      test: ["CMD-SHELL", "pg_isready"]
  redis:
    image: redis:7-alpine
  n8n:
    <<: *shared
    healthcheck:
      test: ["CMD", "wget", "-qO-", "http://localhost:5678/healthz"]
  n8n-worker:
    <<: *shared
    command: worker
  backup:
    image: postgres:16
    profiles: [backup]
"#;

    #[test]
    fn parses_services_and_merge_keys() {
        let file = ComposeFile::parse(STACK).unwrap();
        assert_eq!(file.services().len(), 5);

        let worker = file
            .services()
            .iter()
            .find(|s| s.name.as_str() == "n8n-worker")
            .unwrap();
        assert_eq!(worker.image.as_deref(), Some("docker.n8n.io/n8nio/n8n:1.64.0"));
        assert!(!worker.has_healthcheck);
    }

    #[test]
    fn profiled_services_are_not_core() {
        let file = ComposeFile::parse(STACK).unwrap();
        let core: Vec<&str> = file.core_services().map(|s| s.name.as_str()).collect();
        assert_eq!(core, vec!["n8n", "n8n-worker", "postgres", "redis"]);
        assert!(file.declares(&ServiceName::new("backup").unwrap()));
    }

    #[test]
    fn empty_composition_rejected() {
        assert!(matches!(
            ComposeFile::parse("services: {}\n"),
            Err(ComposeFileError::NoServices)
        ));
        assert!(matches!(
            ComposeFile::parse("version: '3'\n"),
            Err(ComposeFileError::NoServices)
        ));
        assert!(matches!(
            ComposeFile::parse("services: [\n"),
            Err(ComposeFileError::Parse(_))
        ));
    }

    #[test]
    fn bare_service_entry_is_accepted() {
        let file = ComposeFile::parse("services:\n  app:\n").unwrap();
        assert_eq!(file.services()[0].name.as_str(), "app");
    }
}
