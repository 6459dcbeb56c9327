//! One-shot reconciliation of a directory tree

use crate::error::{AutotagError, Result};
use crate::reconcile::{ReconcileOutcome, TagReconciler};
use crate::storage::atomic_write;
use crate::types::{ReconciliationResult, Rule};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Report changes without writing
    pub dry_run: bool,
    /// Tracked extension, without the dot
    pub extension: String,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            extension: "md".to_string(),
        }
    }
}

/// Changes for one document
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReport {
    pub path: PathBuf,
    #[serde(flatten)]
    pub result: ReconciliationResult,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub dry_run: bool,
    /// Documents read
    pub scanned: usize,
    /// Documents whose tags changed (or would change)
    pub changed: Vec<FileReport>,
    /// Documents that could not be processed, with the reason
    pub failures: Vec<(PathBuf, String)>,
}

fn is_hidden_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry.file_name().to_string_lossy().starts_with('.')
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension))
}

/// Tracked documents under `root`, sorted by file name at every level
pub fn collect_documents(root: &Path, extension: &str) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_hidden_dir(e))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|e| e.file_type().is_file() && has_extension(e.path(), extension))
        .map(DirEntry::into_path)
        .collect()
}

/// Reconcile a single file, writing the result unless `dry_run`
pub fn reconcile_file(
    reconciler: &TagReconciler,
    path: &Path,
    rules: &[Rule],
    dry_run: bool,
) -> Result<ReconcileOutcome> {
    let text = fs::read_to_string(path)?;
    let outcome = reconciler.reconcile(&text, rules)?;

    if outcome.result.modified && !dry_run {
        atomic_write(path, outcome.new_text.as_bytes())?;
        debug!(
            "Updated {} (+{:?} -{:?})",
            path.display(),
            outcome.result.added_tags,
            outcome.result.removed_tags
        );
    }
    Ok(outcome)
}

/// Walk `root` and reconcile every tracked document against `rules`
pub fn sync_directory(
    root: &Path,
    rules: &[Rule],
    reconciler: &TagReconciler,
    options: &SyncOptions,
) -> Result<SyncReport> {
    if !root.is_dir() {
        return Err(AutotagError::Other(format!("Not a directory: {}", root.display())));
    }

    let mut report = SyncReport {
        dry_run: options.dry_run,
        ..Default::default()
    };

    for path in collect_documents(root, &options.extension) {
        report.scanned += 1;
        match reconcile_file(reconciler, &path, rules, options.dry_run) {
            Ok(outcome) if outcome.result.modified => report.changed.push(FileReport {
                path,
                result: outcome.result,
            }),
            Ok(_) => debug!("Unchanged: {}", path.display()),
            Err(e) => {
                warn!("Failed to process {}: {}", path.display(), e);
                report.failures.push((path, e.to_string()));
            }
        }
    }

    info!(
        "Scanned {} document(s), {} {}",
        report.scanned,
        report.changed.len(),
        if options.dry_run { "would change" } else { "changed" }
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_collect_documents_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("b")).unwrap();
        fs::create_dir_all(dir.path().join(".hidden")).unwrap();
        fs::write(dir.path().join("z.md"), "").unwrap();
        fs::write(dir.path().join("a.MD"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        fs::write(dir.path().join("b").join("c.md"), "").unwrap();
        fs::write(dir.path().join(".hidden").join("secret.md"), "").unwrap();

        let names: Vec<String> = collect_documents(dir.path(), "md")
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(names, vec!["a.MD", "b/c.md", "z.md"]);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let dir = TempDir::new().unwrap();
        let reconciler = TagReconciler::new(std::sync::Arc::new(crate::analysis::HeuristicAnalyzer::new()));
        let result = sync_directory(&dir.path().join("absent"), &[], &reconciler, &SyncOptions::default());
        assert!(result.is_err());
    }
}
