//! Continuous reconciliation of a directory
//!
//! Filesystem notifications and the startup walk both feed the [`Debouncer`].
//! When a path's timer fires, [`WatchProcessor::process`] hashes the file and
//! reconciles it only if the content differs from the last recorded hash.

pub mod debounce;
pub mod state;

pub use debounce::Debouncer;
pub use state::{content_hash, WatchState, WatchStateStore};

use crate::error::Result;
use crate::reconcile::TagReconciler;
use crate::storage::{atomic_write, RuleProvider};
use crate::sync::collect_documents;
use crate::types::ReconciliationResult;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// What processing a path did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Content hash matched the recorded one
    Unchanged,
    /// Reconciled; the result says whether the file was rewritten
    Reconciled(ReconciliationResult),
    /// File disappeared before its timer fired
    Missing,
}

/// Hash, compare, reconcile and record a single file
pub struct WatchProcessor {
    reconciler: TagReconciler,
    rules: Arc<dyn RuleProvider>,
    state: WatchStateStore,
}

impl WatchProcessor {
    pub fn new(reconciler: TagReconciler, rules: Arc<dyn RuleProvider>, state: WatchStateStore) -> Self {
        Self {
            reconciler,
            rules,
            state,
        }
    }

    pub fn state(&self) -> &WatchStateStore {
        &self.state
    }

    pub fn process(&self, path: &Path) -> Result<ProcessOutcome> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(ProcessOutcome::Missing),
            Err(e) => return Err(e.into()),
        };

        let hash = content_hash(content.as_bytes());
        if self.state.hash_for(path)?.as_deref() == Some(hash.as_str()) {
            debug!("Unchanged since last check: {}", path.display());
            return Ok(ProcessOutcome::Unchanged);
        }

        // Rules are re-read so edits apply without restarting
        let rules = self.rules.load_rules()?;
        let outcome = self.reconciler.reconcile(&content, &rules)?;

        let final_hash = if outcome.result.modified {
            atomic_write(path, outcome.new_text.as_bytes())?;
            info!(
                "Retagged {} (added {:?}, removed {:?})",
                path.display(),
                outcome.result.added_tags,
                outcome.result.removed_tags
            );
            content_hash(outcome.new_text.as_bytes())
        } else {
            hash
        };

        self.state.record(path, final_hash)?;
        Ok(ProcessOutcome::Reconciled(outcome.result))
    }
}

pub struct WatchLoop {
    root: PathBuf,
    extension: String,
    debounce: Duration,
    processor: Arc<WatchProcessor>,
}

impl WatchLoop {
    pub fn new(root: &Path, extension: &str, debounce: Duration, processor: WatchProcessor) -> Self {
        let root = fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());
        Self {
            root,
            extension: extension.to_string(),
            debounce,
            processor: Arc::new(processor),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether a notified path is a tracked document outside dot-directories
    pub fn is_tracked(&self, path: &Path) -> bool {
        let has_extension = path
            .extension()
            .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(&self.extension));
        if !has_extension {
            return false;
        }
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let hidden_dir = relative
            .parent()
            .map(|dir| {
                dir.components().any(|c| match c {
                    Component::Normal(name) => name.to_string_lossy().starts_with('.'),
                    _ => false,
                })
            })
            .unwrap_or(false);
        !hidden_dir
    }

    fn job(&self) -> debounce::Job {
        let processor = Arc::clone(&self.processor);
        Arc::new(move |path: &Path| match processor.process(path) {
            Ok(ProcessOutcome::Missing) => debug!("Gone before processing: {}", path.display()),
            Ok(_) => {}
            Err(e) => warn!("Failed to process {}: {}", path.display(), e),
        })
    }

    fn handle_event(&self, debouncer: &mut Debouncer, event: Event) {
        if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
            return;
        }
        for path in event.paths {
            if self.is_tracked(&path) {
                debouncer.schedule(path);
            }
        }
    }

    /// Run until `shutdown` is cancelled
    pub async fn run(self, shutdown: CancellationToken) -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<notify::Result<Event>>();
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                let _ = tx.send(res);
            },
            notify::Config::default(),
        )?;
        watcher.watch(&self.root, RecursiveMode::Recursive)?;
        info!("Watching {} for *.{} changes", self.root.display(), self.extension);

        let mut debouncer = Debouncer::new(self.debounce, self.job());

        let initial = collect_documents(&self.root, &self.extension);
        debug!("Scheduling {} existing document(s)", initial.len());
        for path in initial {
            debouncer.schedule(path);
        }

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                received = rx.recv() => match received {
                    Some(Ok(event)) => self.handle_event(&mut debouncer, event),
                    Some(Err(e)) => warn!("Watch error: {}", e),
                    None => break,
                },
            }
        }

        info!("Stopping watcher");
        debouncer.shutdown().await;
        drop(watcher);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::HeuristicAnalyzer;
    use crate::types::{Rule, RuleDraft};
    use crate::storage::RuleStore;
    use tempfile::TempDir;

    fn keyword_rules(dir: &Path) -> Vec<Rule> {
        let mut store = RuleStore::open(dir.join("rules.json"));
        store
            .add(RuleDraft::new("keyword", "meeting", vec!["meetings".to_string()]))
            .unwrap();
        store.rules().to_vec()
    }

    fn processor(dir: &Path, rules: Vec<Rule>) -> WatchProcessor {
        WatchProcessor::new(
            TagReconciler::new(Arc::new(HeuristicAnalyzer::new())),
            Arc::new(rules),
            WatchStateStore::open(dir.join("state.json")),
        )
    }

    #[test]
    fn test_process_reconciles_then_skips_unchanged() {
        let dir = TempDir::new().unwrap();
        let doc = dir.path().join("note.md");
        fs::write(&doc, "Notes from the meeting.\n").unwrap();
        let processor = processor(dir.path(), keyword_rules(dir.path()));

        match processor.process(&doc).unwrap() {
            ProcessOutcome::Reconciled(result) => {
                assert!(result.modified);
                assert_eq!(result.added_tags, vec!["meetings"]);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        let written = fs::read_to_string(&doc).unwrap();
        assert!(written.ends_with("#meetings\n"));

        // Our own write is recorded, so the follow-up event is a no-op
        assert_eq!(processor.process(&doc).unwrap(), ProcessOutcome::Unchanged);
        assert_eq!(
            processor.state().hash_for(&doc).unwrap(),
            Some(content_hash(written.as_bytes()))
        );
    }

    #[test]
    fn test_process_missing_file() {
        let dir = TempDir::new().unwrap();
        let processor = processor(dir.path(), Vec::new());
        assert_eq!(processor.process(&dir.path().join("gone.md")).unwrap(), ProcessOutcome::Missing);
    }

    #[test]
    fn test_is_tracked() {
        let dir = TempDir::new().unwrap();
        let watch = WatchLoop::new(dir.path(), "md", Duration::from_millis(10), processor(dir.path(), Vec::new()));
        let root = watch.root().to_path_buf();

        assert!(watch.is_tracked(&root.join("a.md")));
        assert!(watch.is_tracked(&root.join("sub").join("b.MD")));
        assert!(!watch.is_tracked(&root.join("a.txt")));
        assert!(!watch.is_tracked(&root.join(".git").join("c.md")));
        assert!(!watch.is_tracked(&root.join(".a.md.1234.tmp")));
    }
}
