//! Directory sync against real files

mod common;

use autotag_core::{sync_directory, HeuristicAnalyzer, RuleKind, SyncOptions, TagReconciler};
use common::rule;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn write(root: &Path, name: &str, content: &str) {
    let path = root.join(name);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "standup.md", "Docker upgrade discussed at the meeting.\n");
    write(dir.path(), "journal/lunch.md", "Quiet lunch.\n\n#devops #personal\n");
    write(dir.path(), "journal/plain.md", "Nothing to see.\n");
    write(dir.path(), "readme.txt", "Docker meeting, but not a tracked file.\n");
    write(dir.path(), ".trash/old.md", "Docker meeting in a hidden folder.\n");
    dir
}

fn snapshot(root: &Path) -> Vec<(String, String)> {
    let mut files: Vec<(String, String)> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            (
                e.path().strip_prefix(root).unwrap().to_string_lossy().into_owned(),
                fs::read_to_string(e.path()).unwrap(),
            )
        })
        .collect();
    files.sort();
    files
}

#[test]
fn test_dry_run_matches_real_sync_and_writes_nothing() {
    let rules = vec![
        rule("keyword-docker", RuleKind::Keyword, "docker", &["devops"]),
        rule("keyword-meeting", RuleKind::Keyword, "meeting", &["meetings"]),
    ];
    let reconciler = TagReconciler::new(Arc::new(HeuristicAnalyzer::new()));
    let dir = fixture();
    let before = snapshot(dir.path());

    let dry = sync_directory(
        dir.path(),
        &rules,
        &reconciler,
        &SyncOptions {
            dry_run: true,
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(snapshot(dir.path()), before);

    let real = sync_directory(dir.path(), &rules, &reconciler, &SyncOptions::default()).unwrap();

    assert_eq!(dry.scanned, 3);
    assert_eq!(real.scanned, 3);
    let summary = |report: &autotag_core::SyncReport| {
        report
            .changed
            .iter()
            .map(|f| (f.path.clone(), f.result.added_tags.clone(), f.result.removed_tags.clone()))
            .collect::<Vec<_>>()
    };
    assert_eq!(summary(&dry), summary(&real));
    assert_eq!(real.changed.len(), 2);

    assert_eq!(
        fs::read_to_string(dir.path().join("standup.md")).unwrap(),
        "Docker upgrade discussed at the meeting.\n\n#devops #meetings\n"
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("journal/lunch.md")).unwrap(),
        "Quiet lunch.\n\n#personal\n"
    );
    assert_eq!(
        fs::read_to_string(dir.path().join(".trash/old.md")).unwrap(),
        "Docker meeting in a hidden folder.\n"
    );

    // A second real sync has nothing left to do
    let again = sync_directory(dir.path(), &rules, &reconciler, &SyncOptions::default()).unwrap();
    assert!(again.changed.is_empty());
}

#[test]
fn test_unreadable_file_is_reported_and_skipped() {
    let dir = fixture();
    // Invalid UTF-8 cannot be read as a document
    fs::write(dir.path().join("binary.md"), [0xff, 0xfe, 0x00, 0x80]).unwrap();

    let rules = vec![rule("keyword-docker", RuleKind::Keyword, "docker", &["devops"])];
    let reconciler = TagReconciler::new(Arc::new(HeuristicAnalyzer::new()));
    let report = sync_directory(dir.path(), &rules, &reconciler, &SyncOptions::default()).unwrap();

    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].0.ends_with("binary.md"));
    assert_eq!(report.scanned, 4);
    assert!(report.changed.iter().any(|f| f.path.ends_with("standup.md")));
}
