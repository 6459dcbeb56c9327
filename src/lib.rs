//! Autotag - rule-driven tagging for plain-text and Markdown notes
//!
//! Users declare rules ("documents mentioning a meeting get `#meetings`") and
//! autotag keeps each document's inline `#tag` markers in agreement with them,
//! adding implied tags and removing managed tags that no longer apply.
//!
//! # Architecture
//!
//! - **Analysis**: tokenization, POS, lemma/stem, sentences, entities, sentiment
//!   behind the [`TextAnalyzer`] trait
//! - **Matching**: rule kinds compiled into strategies, plus contextual filters
//! - **Reconcile**: tag diffing and minimal in-place document edits
//! - **Storage**: JSON rule and alias stores with atomic writes
//! - **Sync / Watch**: one-shot directory pass and the debounced watch loop
//!
//! # Example
//!
//! ```ignore
//! use autotag_core::{HeuristicAnalyzer, RuleDraft, RuleStore, TagReconciler};
//! use std::sync::Arc;
//!
//! let mut store = RuleStore::open("rules.json");
//! store.add(RuleDraft::new("keyword", "meeting", vec!["meetings".into()]).with_lemma())?;
//!
//! let reconciler = TagReconciler::new(Arc::new(HeuristicAnalyzer::new()));
//! let outcome = reconciler.reconcile("Two meetings today.", store.rules())?;
//! assert_eq!(outcome.new_text, "Two meetings today.\n\n#meetings\n");
//! ```

pub mod analysis;
pub mod config;
pub mod discover;
pub mod error;
pub mod matching;
pub mod reconcile;
pub mod storage;
pub mod sync;
pub mod types;
pub mod watch;

// Re-export commonly used types
pub use analysis::{HeuristicAnalyzer, TextAnalyzer};
pub use config::Settings;
pub use discover::Discovery;
pub use error::{AutotagError, Result};
pub use matching::{FilterEvaluator, MatchEngine};
pub use reconcile::{ReconcileOutcome, TagReconciler};
pub use storage::{AliasStore, RuleFile, RuleProvider, RuleStore};
pub use sync::{sync_directory, SyncOptions, SyncReport};
pub use types::{
    EntityType, FilterSpec, MatchOccurrence, PosTag, ReconciliationResult, Rule, RuleDraft, RuleKind,
    Scope,
};
pub use watch::{WatchLoop, WatchProcessor, WatchStateStore};
