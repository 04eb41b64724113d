// ABOUTME: Tests for the convergence phase.
// ABOUTME: Pull then reconcile, worker scaling, and failure propagation.

mod support;

use n8n_deploy::config::Invocation;
use n8n_deploy::deploy::{Deployment, Synced};
use n8n_deploy::remote::TransferMethod;
use support::{FakeExecutor, FakeOrchestrator, FakeTransfer, Project};

async fn synced(inv: Invocation) -> Deployment<Synced> {
    let exec = FakeExecutor::new();
    let transfer = FakeTransfer::new(TransferMethod::Delta);
    Deployment::new(inv)
        .check_local()
        .unwrap()
        .reach_remote(&exec)
        .await
        .unwrap()
        .sync(&exec, &transfer)
        .await
        .unwrap()
}

#[tokio::test]
async fn pulls_before_converging() {
    let project = Project::new();
    let orch = FakeOrchestrator::new();

    synced(project.invocation(project.args()))
        .await
        .converge(&orch)
        .await
        .unwrap();

    assert_eq!(orch.calls(), vec!["pull", "converge"]);
}

#[tokio::test]
async fn rerun_issues_same_operations() {
    let project = Project::new();
    let orch = FakeOrchestrator::new();

    for _ in 0..2 {
        synced(project.invocation(project.args()))
            .await
            .converge(&orch)
            .await
            .unwrap();
    }

    assert_eq!(orch.calls(), vec!["pull", "converge", "pull", "converge"]);
}

#[tokio::test]
async fn workers_scaled_when_requested() {
    let project = Project::new();
    let mut args = project.args();
    args.workers = Some(2);
    let orch = FakeOrchestrator::new();

    synced(project.invocation(args))
        .await
        .converge(&orch)
        .await
        .unwrap();

    assert_eq!(orch.calls(), vec!["pull", "converge n8n-worker=2"]);
}

#[tokio::test]
async fn pull_failure_stops_before_converge() {
    let project = Project::new();
    let orch = FakeOrchestrator::new().failing_pull();

    let err = synced(project.invocation(project.args()))
        .await
        .converge(&orch)
        .await
        .unwrap_err();

    assert_eq!(err.exit_code(), 5);
    assert_eq!(err.kind(), "pull-failed");
    assert_eq!(orch.calls(), vec!["pull"]);
}
