// ABOUTME: Tests for the file synchronizer.
// ABOUTME: Covers the sync record, stale-entry removal, and repeat runs.

mod support;

use n8n_deploy::config::ProjectLayout;
use n8n_deploy::deploy::{SyncRecord, Synchronizer};
use n8n_deploy::manifest::TransferManifest;
use n8n_deploy::remote::TransferMethod;
use n8n_deploy::types::RemotePath;
use support::{FakeExecutor, FakeTransfer, MirroringTransfer, Project};

const RECORD: &str = "/opt/n8n/.n8n-deploy/sync.json";

fn root() -> RemotePath {
    RemotePath::new("/opt/n8n").unwrap()
}

fn manifest(project: &Project, core: &[&str]) -> TransferManifest {
    let layout = ProjectLayout {
        core: core.iter().map(|s| s.to_string()).collect(),
        edge: vec![],
        ..Default::default()
    };
    TransferManifest::compute(project.path(), &layout, false).unwrap()
}

#[tokio::test]
async fn first_sync_writes_record() {
    let project = Project::new().with_edge_helpers();
    let exec = FakeExecutor::new();
    let transfer = FakeTransfer::new(TransferMethod::Delta);
    let manifest = manifest(&project, &["docker-compose.yml", ".env", "nginx/"]);

    let outcome = Synchronizer::new(&exec, &transfer)
        .mirror(&manifest, &root())
        .await
        .unwrap();

    assert!(outcome.removed.is_empty());
    assert_eq!(outcome.method, TransferMethod::Delta);
    assert!(exec.ran("mkdir -p '/opt/n8n'"));
    assert!(!exec.ran("rm -rf"));

    let record: SyncRecord = serde_json::from_str(&exec.file(RECORD).unwrap()).unwrap();
    assert_eq!(record.entries, vec!["docker-compose.yml", ".env", "nginx"]);
    assert_eq!(record.method, "delta");
    assert!(!record.synced_by.is_empty());
}

#[tokio::test]
async fn dropped_entries_removed_on_next_sync() {
    let project = Project::new().with_edge_helpers();
    let exec = FakeExecutor::new();
    let transfer = FakeTransfer::new(TransferMethod::FullCopy);
    let sync = Synchronizer::new(&exec, &transfer);

    let full = manifest(&project, &["docker-compose.yml", ".env", "nginx/"]);
    sync.mirror(&full, &root()).await.unwrap();

    let reduced = manifest(&project, &["docker-compose.yml", ".env"]);
    let outcome = sync.mirror(&reduced, &root()).await.unwrap();

    assert_eq!(outcome.removed, vec!["nginx"]);
    assert!(exec.ran("rm -rf -- '/opt/n8n/nginx'"));
}

#[tokio::test]
async fn repeat_sync_changes_nothing_extra() {
    let project = Project::new();
    let exec = FakeExecutor::new();
    let transfer = FakeTransfer::new(TransferMethod::Delta);
    let sync = Synchronizer::new(&exec, &transfer);
    let manifest = manifest(&project, &["docker-compose.yml", ".env"]);

    sync.mirror(&manifest, &root()).await.unwrap();
    let first: SyncRecord = serde_json::from_str(&exec.file(RECORD).unwrap()).unwrap();
    exec.clear_commands();

    let outcome = sync.mirror(&manifest, &root()).await.unwrap();
    let second: SyncRecord = serde_json::from_str(&exec.file(RECORD).unwrap()).unwrap();

    assert!(outcome.removed.is_empty());
    assert!(!exec.ran("rm -rf"));
    assert_eq!(first.entries, second.entries);
    assert_eq!(transfer.mirrored()[0], transfer.mirrored()[1]);
}

#[tokio::test]
async fn tampered_record_cannot_escape_root() {
    let project = Project::new();
    let record = r#"{
        "entries": ["../../etc", "/var/lib", "old-notes.txt", ".n8n-deploy"],
        "synced_at": "2024-05-01T10:00:00Z",
        "synced_by": "laptop",
        "method": "delta"
    }"#;
    let exec = FakeExecutor::new().with_file(RECORD, record);
    let transfer = FakeTransfer::new(TransferMethod::Delta);

    let outcome = Synchronizer::new(&exec, &transfer)
        .mirror(&manifest(&project, &["docker-compose.yml"]), &root())
        .await
        .unwrap();

    assert_eq!(outcome.removed, vec!["old-notes.txt"]);
    assert_eq!(exec.count("rm -rf"), 1);
    assert!(exec.ran("rm -rf -- '/opt/n8n/old-notes.txt'"));
}

#[tokio::test]
async fn unreadable_record_treated_as_first_sync() {
    let project = Project::new();
    let exec = FakeExecutor::new().with_file(RECORD, "{not json");
    let transfer = FakeTransfer::new(TransferMethod::Delta);

    let outcome = Synchronizer::new(&exec, &transfer)
        .mirror(&manifest(&project, &["docker-compose.yml"]), &root())
        .await
        .unwrap();
    assert!(outcome.removed.is_empty());
}

fn record_of(entries: &[&str]) -> String {
    serde_json::json!({
        "entries": entries,
        "synced_at": "2024-05-01T10:00:00Z",
        "synced_by": "laptop",
        "method": "delta"
    })
    .to_string()
}

#[tokio::test]
async fn file_now_covered_by_directory_is_kept() {
    let project = Project::new().with_edge_helpers();
    let exec = FakeExecutor::new().with_file(
        RECORD,
        &record_of(&["docker-compose.yml", "scripts/setup-nginx.sh"]),
    );
    let transfer = MirroringTransfer::new(&exec);

    let outcome = Synchronizer::new(&exec, &transfer)
        .mirror(&manifest(&project, &["docker-compose.yml", "scripts/"]), &root())
        .await
        .unwrap();

    assert!(outcome.removed.is_empty());
    assert!(!exec.ran("rm -rf"));
    assert!(exec.file("/opt/n8n/scripts/setup-nginx.sh").is_some());
}

#[tokio::test]
async fn directory_narrowed_to_one_file_is_cleared_before_transfer() {
    let project = Project::new().with_edge_helpers();
    let exec = FakeExecutor::new()
        .with_file(RECORD, &record_of(&["docker-compose.yml", "nginx"]));
    let transfer = MirroringTransfer::new(&exec);

    let outcome = Synchronizer::new(&exec, &transfer)
        .mirror(
            &manifest(&project, &["docker-compose.yml", "nginx/n8n.conf"]),
            &root(),
        )
        .await
        .unwrap();

    assert_eq!(outcome.removed, vec!["nginx"]);
    let commands = exec.commands();
    let removed = commands
        .iter()
        .position(|c| c == "rm -rf -- '/opt/n8n/nginx'")
        .unwrap();
    let transferred = commands
        .iter()
        .position(|c| c.starts_with("transfer "))
        .unwrap();
    assert!(removed < transferred);
    assert!(exec.file("/opt/n8n/nginx/n8n.conf").is_some());
}
