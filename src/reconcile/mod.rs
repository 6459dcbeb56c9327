//! Tag reconciliation
//!
//! Computes the tags a document should carry under the current rule set and
//! applies the minimal edit: remove managed tags no rule implies any more, add
//! implied tags that are missing. Tags no stored rule declares are never
//! touched.

pub mod markup;

use crate::analysis::TextAnalyzer;
use crate::error::Result;
use crate::matching::{filters, DocumentContext, MatchEngine};
use crate::types::{ReconciliationResult, Rule};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

/// Edited document plus the change report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub new_text: String,
    pub result: ReconciliationResult,
}

/// Tags the reconciler may remove: those declared by any stored rule
///
/// Disabled rules still own their tags, so disabling a rule strips the tags
/// only it implied and re-enabling restores them.
pub fn managed_tags(rules: &[Rule]) -> BTreeSet<String> {
    rules.iter().flat_map(|r| r.tags.iter().cloned()).collect()
}

pub struct TagReconciler {
    analyzer: Arc<dyn TextAnalyzer>,
    engine: MatchEngine,
}

impl TagReconciler {
    pub fn new(analyzer: Arc<dyn TextAnalyzer>) -> Self {
        Self {
            engine: MatchEngine::new(Arc::clone(&analyzer)),
            analyzer,
        }
    }

    /// Tags implied by the rules that fire on `text`, with the firing rule ids
    ///
    /// Rules see the document with every tag marker stripped, which is also
    /// what the rewrite strips to, so a second pass analyses the same text.
    pub fn expected_tags(&self, text: &str, rules: &[Rule]) -> Result<(BTreeSet<String>, Vec<String>)> {
        let stripped = markup::strip_tags(text);
        let ctx = DocumentContext::new(self.analyzer.as_ref(), &stripped);

        let mut expected = BTreeSet::new();
        let mut fired = Vec::new();

        for rule in rules.iter().filter(|r| r.enabled) {
            let occurrences = self.engine.find_in(rule, &ctx)?;
            if occurrences.is_empty() {
                continue;
            }
            let surviving = match rule.active_filters() {
                Some(spec) => filters::apply_in(&ctx, occurrences, spec)?,
                None => occurrences,
            };
            if !surviving.is_empty() {
                debug!(rule = %rule.id, occurrences = surviving.len(), "Rule fired");
                fired.push(rule.id.clone());
                expected.extend(rule.tags.iter().cloned());
            }
        }

        Ok((expected, fired))
    }

    /// Diff existing tags against implied tags and rewrite the document
    pub fn reconcile(&self, text: &str, rules: &[Rule]) -> Result<ReconcileOutcome> {
        let (expected, fired_rule_ids) = self.expected_tags(text, rules)?;
        let managed = managed_tags(rules);
        let existing = markup::extract_tags(text);

        let removed: BTreeSet<String> = existing
            .iter()
            .filter(|tag| managed.contains(*tag) && !expected.contains(*tag))
            .cloned()
            .collect();
        let added: Vec<String> = expected.difference(&existing).cloned().collect();

        let mut new_text = markup::remove_tags(text, &removed);
        new_text = markup::insert_tags(&new_text, &added);

        let result = ReconciliationResult {
            modified: !removed.is_empty() || !added.is_empty(),
            added_tags: added,
            removed_tags: removed.into_iter().collect(),
            fired_rule_ids,
        };

        Ok(ReconcileOutcome { new_text, result })
    }
}
