// ABOUTME: Tests for the preflight phase: local checks and the remote reachability check.
// ABOUTME: Every failure here must happen before anything on the remote host changes.

mod support;

use n8n_deploy::deploy::{Deployment, REACHABILITY_COMMAND};
use n8n_deploy::error::Error;
use std::fs;
use support::{FakeExecutor, Project, failed};

#[test]
fn missing_credential_fails_before_any_connection() {
    let project = Project::new();
    let mut args = project.args();
    args.key = Some(project.path().join("absent_key").to_string_lossy().into_owned());
    let inv = project.invocation(args);

    let err = Deployment::new(inv).check_local().unwrap_err();
    assert!(matches!(err, Error::Preflight(_)));
    assert_eq!(err.kind(), "credential-not-found");
    assert_eq!(err.exit_code(), 3);
    assert!(err.to_string().contains("absent_key"));
}

#[test]
fn agent_credential_skips_file_check() {
    let project = Project::new();
    let mut args = project.args();
    args.key = Some("agent".to_string());
    let inv = project.invocation(args);

    assert!(Deployment::new(inv).check_local().is_ok());
}

#[test]
fn all_missing_files_reported_together() {
    let project = Project::new();
    fs::remove_file(project.path().join("docker-compose.yml")).unwrap();
    fs::remove_file(project.path().join(".env")).unwrap();
    let inv = project.invocation(project.args());

    let err = Deployment::new(inv).check_local().unwrap_err();
    assert_eq!(err.kind(), "missing-files");
    let message = err.to_string();
    assert!(message.contains("docker-compose.yml"));
    assert!(message.contains(".env"));
}

#[test]
fn absent_helper_directories_fine_without_domain() {
    let project = Project::new();
    let inv = project.invocation(project.args());

    let verified = Deployment::new(inv).check_local().unwrap();
    assert_eq!(
        verified.manifest().relative_paths(),
        vec!["docker-compose.yml", ".env"]
    );
}

#[test]
fn domain_adds_helper_entries() {
    let project = Project::new().with_edge_helpers();
    let mut args = project.args();
    args.domain = Some("n8n.example.com".to_string());
    let inv = project.invocation(args);

    let verified = Deployment::new(inv).check_local().unwrap();
    assert!(verified.manifest().contains("nginx"));
    assert!(verified.manifest().contains("scripts"));
}

#[test]
fn domain_requires_proxy_script() {
    let project = Project::new();
    let mut args = project.args();
    args.domain = Some("n8n.example.com".to_string());
    let inv = project.invocation(args);

    let err = Deployment::new(inv).check_local().unwrap_err();
    assert_eq!(err.kind(), "missing-files");
    assert!(err.to_string().contains("setup-nginx.sh"));
}

#[test]
fn unparsable_composition_rejected() {
    let project = Project::new();
    fs::write(project.path().join("docker-compose.yml"), "services: [unclosed\n").unwrap();
    let inv = project.invocation(project.args());

    let err = Deployment::new(inv).check_local().unwrap_err();
    assert_eq!(err.kind(), "invalid-composition");
}

#[test]
fn workers_require_worker_service() {
    let project = Project::new();
    fs::write(
        project.path().join("docker-compose.yml"),
        "services:\n  n8n:\n    image: n8nio/n8n\n",
    )
    .unwrap();
    let mut args = project.args();
    args.workers = Some(2);
    let inv = project.invocation(args);

    let err = Deployment::new(inv).check_local().unwrap_err();
    assert_eq!(err.kind(), "invalid-composition");
    assert!(err.to_string().contains("n8n-worker"));
}

#[tokio::test]
async fn reachability_runs_one_harmless_command() {
    let project = Project::new();
    let inv = project.invocation(project.args());
    let exec = FakeExecutor::new();

    Deployment::new(inv)
        .check_local()
        .unwrap()
        .reach_remote(&exec)
        .await
        .unwrap();
    assert_eq!(exec.commands(), vec![REACHABILITY_COMMAND.to_string()]);
}

#[tokio::test]
async fn failed_remote_check_is_preflight_error() {
    let project = Project::new();
    let inv = project.invocation(project.args());
    let exec = FakeExecutor::new().respond(REACHABILITY_COMMAND, failed(126, "permission denied"));

    let err = Deployment::new(inv)
        .check_local()
        .unwrap()
        .reach_remote(&exec)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "remote-check-failed");
    assert_eq!(err.exit_code(), 3);
}
