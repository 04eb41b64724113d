// ABOUTME: Health verifier: one observation pass over declared services after a settle delay.
// ABOUTME: Degraded services become warnings; the pass never fails the run.

use crate::compose::{ComposeError, ContainerOrchestrator, ContainerStatus, ServiceHealth};
use crate::diagnostics::{Diagnostics, Warning};
use crate::remote::RemoteExecutor;
use crate::shell;
use crate::types::ServiceName;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// When in the run a snapshot was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum HealthStage {
    AfterConverge,
    AfterEdge,
    OnDemand,
}

impl HealthStage {
    pub fn as_str(self) -> &'static str {
        match self {
            HealthStage::AfterConverge => "after-converge",
            HealthStage::AfterEdge => "after-edge",
            HealthStage::OnDemand => "on-demand",
        }
    }
}

/// Host-level reverse proxy state, reported once edge configuration ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProxyHealth {
    pub unit: String,
    pub health: ServiceHealth,
}

/// One snapshot of declared services.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceHealthReport {
    pub stage: HealthStage,
    pub captured_at: DateTime<Utc>,
    /// False when nothing was actually observed (dry run or status query failure).
    pub observed: bool,
    pub services: BTreeMap<String, ServiceHealth>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<ProxyHealth>,
}

impl ServiceHealthReport {
    fn unobserved(stage: HealthStage) -> Self {
        Self {
            stage,
            captured_at: Utc::now(),
            observed: false,
            services: BTreeMap::new(),
            proxy: None,
        }
    }

    /// Entries that are not healthy, proxy included.
    pub fn degraded(&self) -> Vec<(&str, ServiceHealth)> {
        let mut degraded: Vec<(&str, ServiceHealth)> = self
            .services
            .iter()
            .filter(|(_, h)| !h.is_healthy())
            .map(|(name, h)| (name.as_str(), *h))
            .collect();
        if let Some(proxy) = &self.proxy
            && !proxy.health.is_healthy()
        {
            degraded.push((proxy.unit.as_str(), proxy.health));
        }
        degraded
    }

    pub fn is_healthy(&self) -> bool {
        self.observed && self.degraded().is_empty()
    }
}

/// Fold container rows into one class per declared service.
pub fn classify(
    declared: &[ServiceName],
    rows: &[ContainerStatus],
) -> BTreeMap<String, ServiceHealth> {
    declared
        .iter()
        .map(|service| {
            let health = rows
                .iter()
                .filter(|row| row.service == service.as_str())
                .map(ContainerStatus::health)
                .reduce(ServiceHealth::worst)
                .unwrap_or(ServiceHealth::Absent);
            (service.to_string(), health)
        })
        .collect()
}

fn proxy_health(active: &str) -> ServiceHealth {
    match active.trim() {
        "active" | "reloading" => ServiceHealth::Healthy,
        "activating" => ServiceHealth::Unknown,
        _ => ServiceHealth::Unhealthy,
    }
}

pub struct HealthVerifier<'a, E: ?Sized, O: ?Sized> {
    executor: &'a E,
    orchestrator: &'a O,
    services: Vec<ServiceName>,
    proxy_unit: Option<String>,
    settle: Duration,
}

impl<'a, E, O> HealthVerifier<'a, E, O>
where
    E: RemoteExecutor + ?Sized,
    O: ContainerOrchestrator + ?Sized,
{
    pub fn new(executor: &'a E, orchestrator: &'a O, services: Vec<ServiceName>) -> Self {
        Self {
            executor,
            orchestrator,
            services,
            proxy_unit: None,
            settle: Duration::ZERO,
        }
    }

    /// Also report the given systemd unit.
    pub fn with_proxy(mut self, unit: impl Into<String>) -> Self {
        self.proxy_unit = Some(unit.into());
        self
    }

    pub fn settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    /// Wait out the settle delay, then take a single snapshot.
    ///
    /// Failures to query become warnings and an unobserved report.
    pub async fn snapshot(&self, stage: HealthStage, diag: &mut Diagnostics) -> ServiceHealthReport {
        if self.executor.is_dry_run() {
            tracing::info!(stage = stage.as_str(), "dry run, health snapshot not taken");
            return ServiceHealthReport::unobserved(stage);
        }

        if !self.settle.is_zero() {
            tracing::debug!(settle = ?self.settle, "waiting for services to settle");
            tokio::time::sleep(self.settle).await;
        }

        match self.observe(stage).await {
            Ok(report) => {
                warn_degraded(&report, diag);
                report
            }
            Err(e) => {
                diag.warn(Warning::health_degraded(format!(
                    "could not query container status ({}): {}",
                    stage.as_str(),
                    e
                )));
                ServiceHealthReport::unobserved(stage)
            }
        }
    }

    /// One observation pass, no settle delay.
    pub async fn observe(&self, stage: HealthStage) -> Result<ServiceHealthReport, ComposeError> {
        let rows = self.orchestrator.status().await?;
        let mut report = ServiceHealthReport {
            stage,
            captured_at: Utc::now(),
            observed: true,
            services: classify(&self.services, &rows),
            proxy: None,
        };

        if let Some(unit) = &self.proxy_unit {
            let health = match self
                .executor
                .exec(&format!("systemctl is-active {}", shell::quote(unit)))
                .await
            {
                Ok(output) => proxy_health(&output.stdout),
                Err(e) => {
                    tracing::debug!(error = %e, "proxy state query failed");
                    ServiceHealth::Unknown
                }
            };
            report.proxy = Some(ProxyHealth {
                unit: unit.clone(),
                health,
            });
        }
        Ok(report)
    }
}

/// Record a warning for every entry that is not healthy.
pub fn warn_degraded(report: &ServiceHealthReport, diag: &mut Diagnostics) {
    for (name, health) in report.degraded() {
        diag.warn(Warning::health_degraded(format!(
            "{} is {} ({})",
            name,
            health,
            report.stage.as_str()
        )));
    }
}
