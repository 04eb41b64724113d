// ABOUTME: Tests for the health verifier.
// ABOUTME: Snapshots are non-fatal: degraded services and query failures become warnings.

mod support;

use n8n_deploy::compose::ServiceHealth;
use n8n_deploy::deploy::{HealthStage, HealthVerifier};
use n8n_deploy::diagnostics::{Diagnostics, WarningKind};
use n8n_deploy::remote::{DryRunExecutor, PlanLog};
use n8n_deploy::types::ServiceName;
use support::{FakeExecutor, FakeOrchestrator, ok, row};

fn stack() -> Vec<ServiceName> {
    ["postgres", "redis", "n8n", "n8n-worker"]
        .iter()
        .map(|s| ServiceName::new(s).unwrap())
        .collect()
}

#[tokio::test]
async fn healthy_stack_has_no_warnings() {
    let exec = FakeExecutor::new();
    let orch = FakeOrchestrator::healthy();
    let mut diag = Diagnostics::default();

    let report = HealthVerifier::new(&exec, &orch, stack())
        .snapshot(HealthStage::AfterConverge, &mut diag)
        .await;

    assert!(report.observed);
    assert!(report.is_healthy());
    assert_eq!(report.services.len(), 4);
    assert!(report.proxy.is_none());
    assert!(!diag.has_warnings());
}

#[tokio::test]
async fn degraded_services_become_warnings() {
    let exec = FakeExecutor::new();
    let orch = FakeOrchestrator::new().with_rows(vec![
        row("postgres", "running", "Up 2 minutes (healthy)"),
        row("redis", "running", "Up 2 minutes"),
        row("n8n", "restarting", "Restarting (1) 5 seconds ago"),
    ]);
    let mut diag = Diagnostics::default();

    let report = HealthVerifier::new(&exec, &orch, stack())
        .snapshot(HealthStage::AfterConverge, &mut diag)
        .await;

    assert!(!report.is_healthy());
    assert_eq!(report.services["postgres"], ServiceHealth::Healthy);
    assert_eq!(report.services["n8n"], ServiceHealth::Unhealthy);
    assert_eq!(report.services["n8n-worker"], ServiceHealth::Absent);
    assert!(diag.has_kind(WarningKind::HealthDegraded));
    assert!(diag.warnings().iter().any(|w| w.message.contains("n8n-worker")));
}

#[tokio::test]
async fn status_failure_is_unobserved_not_fatal() {
    let exec = FakeExecutor::new();
    let orch = FakeOrchestrator::new().failing_status();
    let mut diag = Diagnostics::default();

    let report = HealthVerifier::new(&exec, &orch, stack())
        .snapshot(HealthStage::AfterEdge, &mut diag)
        .await;

    assert!(!report.observed);
    assert!(!report.is_healthy());
    assert!(report.services.is_empty());
    assert_eq!(diag.warnings().len(), 1);
}

#[tokio::test]
async fn status_failure_surfaces_from_observe() {
    let exec = FakeExecutor::new();
    let orch = FakeOrchestrator::new().failing_status();

    let result = HealthVerifier::new(&exec, &orch, stack())
        .observe(HealthStage::OnDemand)
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn proxy_reported_only_when_requested() {
    let exec = FakeExecutor::new().respond("systemctl is-active", ok("active\n"));
    let orch = FakeOrchestrator::healthy();
    let mut diag = Diagnostics::default();

    let without = HealthVerifier::new(&exec, &orch, stack())
        .snapshot(HealthStage::AfterConverge, &mut diag)
        .await;
    assert!(without.proxy.is_none());
    assert!(!exec.ran("systemctl is-active"));

    let with = HealthVerifier::new(&exec, &orch, stack())
        .with_proxy("nginx")
        .snapshot(HealthStage::AfterEdge, &mut diag)
        .await;
    let proxy = with.proxy.unwrap();
    assert_eq!(proxy.unit, "nginx");
    assert_eq!(proxy.health, ServiceHealth::Healthy);
    assert!(exec.ran("systemctl is-active 'nginx'"));
}

#[tokio::test]
async fn inactive_proxy_is_degraded() {
    let exec = FakeExecutor::new().respond("systemctl is-active", ok("failed\n"));
    let orch = FakeOrchestrator::healthy();
    let mut diag = Diagnostics::default();

    let report = HealthVerifier::new(&exec, &orch, stack())
        .with_proxy("nginx")
        .snapshot(HealthStage::AfterEdge, &mut diag)
        .await;

    assert!(!report.is_healthy());
    assert!(diag.warnings().iter().any(|w| w.message.contains("nginx")));
}

#[tokio::test]
async fn dry_run_takes_no_snapshot() {
    let log = PlanLog::new();
    let exec = DryRunExecutor::new(&log);
    let orch = FakeOrchestrator::healthy();
    let mut diag = Diagnostics::default();

    let report = HealthVerifier::new(&exec, &orch, stack())
        .with_proxy("nginx")
        .snapshot(HealthStage::AfterConverge, &mut diag)
        .await;

    assert!(!report.observed);
    assert!(orch.calls().is_empty());
    assert!(log.is_empty());
    assert!(!diag.has_warnings());
}
