//! Compound filter predicates over raw occurrences
//!
//! Stages run in a fixed order and short-circuit: POS, then entity presence,
//! then sentiment. Every stage reads the shared [`DocumentContext`].

use super::DocumentContext;
use crate::analysis::{Span, TextAnalyzer};
use crate::error::Result;
use crate::types::{EntityFilter, FilterSpec, MatchOccurrence, Scope, SentimentFilter};
use std::sync::Arc;

/// Applies a rule's [`FilterSpec`] to its occurrences
pub struct FilterEvaluator {
    analyzer: Arc<dyn TextAnalyzer>,
}

impl FilterEvaluator {
    pub fn new(analyzer: Arc<dyn TextAnalyzer>) -> Self {
        Self { analyzer }
    }

    /// Whether a single occurrence satisfies every filter stage
    pub fn evaluate(&self, text: &str, occurrence: &MatchOccurrence, spec: &FilterSpec) -> Result<bool> {
        let ctx = DocumentContext::new(self.analyzer.as_ref(), text);
        passes(&ctx, occurrence, spec)
    }

    /// Occurrences that satisfy every filter stage, in input order
    pub fn apply_all(
        &self,
        text: &str,
        occurrences: Vec<MatchOccurrence>,
        spec: &FilterSpec,
    ) -> Result<Vec<MatchOccurrence>> {
        let ctx = DocumentContext::new(self.analyzer.as_ref(), text);
        apply_in(&ctx, occurrences, spec)
    }
}

/// [`FilterEvaluator::apply_all`] against an existing document context
pub fn apply_in(
    ctx: &DocumentContext<'_>,
    occurrences: Vec<MatchOccurrence>,
    spec: &FilterSpec,
) -> Result<Vec<MatchOccurrence>> {
    if spec.is_empty() {
        return Ok(occurrences);
    }

    let mut kept = Vec::with_capacity(occurrences.len());
    for occurrence in occurrences {
        if passes(ctx, &occurrence, spec)? {
            kept.push(occurrence);
        }
    }
    Ok(kept)
}

fn passes(ctx: &DocumentContext<'_>, occurrence: &MatchOccurrence, spec: &FilterSpec) -> Result<bool> {
    if !spec.pos.is_empty() && !pos_allowed(occurrence, spec) {
        return Ok(false);
    }

    if !spec.require_entity.is_empty() && !entity_present(ctx, occurrence, &spec.require_entity)? {
        return Ok(false);
    }

    if let Some(sentiment) = &spec.sentiment {
        if !sentiment_in_bounds(ctx, occurrence, sentiment)? {
            return Ok(false);
        }
    }

    Ok(true)
}

/// Occurrences without POS information never pass a POS filter
fn pos_allowed(occurrence: &MatchOccurrence, spec: &FilterSpec) -> bool {
    occurrence
        .pos_tags
        .as_ref()
        .is_some_and(|tags| tags.iter().any(|tag| spec.pos.contains(tag)))
}

fn entity_present(ctx: &DocumentContext<'_>, occurrence: &MatchOccurrence, filters: &[EntityFilter]) -> Result<bool> {
    let entities = ctx.entities()?;

    for filter in filters {
        let (start, end) = scope_bounds(ctx, filter.scope.unwrap_or(Scope::Document), occurrence);
        let satisfied = entities
            .iter()
            .any(|e| filter.types.contains(&e.entity_type) && e.start < end && e.end > start);
        if satisfied {
            return Ok(true);
        }
    }

    Ok(false)
}

fn sentiment_in_bounds(ctx: &DocumentContext<'_>, occurrence: &MatchOccurrence, filter: &SentimentFilter) -> Result<bool> {
    let (start, end) = scope_bounds(ctx, filter.scope, occurrence);
    let score = ctx.sentiment(start, end)?;

    let above_min = filter.min.map_or(true, |min| score >= min);
    let below_max = filter.max.map_or(true, |max| score <= max);
    Ok(above_min && below_max)
}

/// Byte range of `scope` anchored at the occurrence start
fn scope_bounds(ctx: &DocumentContext<'_>, scope: Scope, occurrence: &MatchOccurrence) -> (usize, usize) {
    let whole = (0, ctx.text().len());
    let segment = |spans: &[Span]| {
        Span::locate(spans, occurrence.start)
            .map(|s| (s.start, s.end))
            .unwrap_or(whole)
    };

    match scope {
        Scope::Match => (occurrence.start, occurrence.end),
        Scope::Sentence => segment(ctx.sentences()),
        Scope::Paragraph => segment(ctx.paragraphs()),
        Scope::Document => whole,
    }
}

/// Human-readable summary of a filter spec
pub fn describe_filters(spec: &FilterSpec) -> String {
    let mut parts = Vec::new();

    if !spec.pos.is_empty() {
        let tags: Vec<&str> = spec.pos.iter().map(|t| t.as_str()).collect();
        parts.push(format!("POS is {}", tags.join(" or ")));
    }

    for filter in &spec.require_entity {
        let types: Vec<&str> = filter.types.iter().map(|t| t.as_str()).collect();
        let scope = filter.scope.unwrap_or(Scope::Document);
        parts.push(format!("requires {} in {}", types.join(" or "), scope));
    }

    if let Some(sentiment) = &spec.sentiment {
        let range = match (sentiment.min, sentiment.max) {
            (Some(min), Some(max)) => format!("between {} and {}", min, max),
            (Some(min), None) => format!(">= {}", min),
            (None, Some(max)) => format!("<= {}", max),
            (None, None) => "unbounded".to_string(),
        };
        parts.push(format!("{} sentiment {}", sentiment.scope, range));
    }

    if parts.is_empty() {
        "no filters".to_string()
    } else {
        parts.join("; ")
    }
}
