//! Natural-language analysis seam
//!
//! The match and filter pipeline consumes text analysis through the
//! [`TextAnalyzer`] trait only. [`HeuristicAnalyzer`] is the bundled
//! implementation: dictionary lookups, suffix rules and regexes, no models.

pub mod dictionaries;
pub mod entities;
pub mod heuristic;
pub mod morphology;
pub mod patterns;
pub mod sentiment;

pub use entities::EntityRecognizer;
pub use heuristic::HeuristicAnalyzer;

use crate::error::Result;
use crate::types::{EntityType, PosTag};
use serde::{Deserialize, Serialize};

/// A word or punctuation token with byte offsets into the analyzed text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub surface: String,
    pub pos: PosTag,
    /// Lowercase dictionary form
    pub lemma: String,
    /// Lowercase suffix-stripped form
    pub stem: String,
    pub start: usize,
    pub end: usize,
}

/// A contiguous region of text (sentence or paragraph)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(source: &str, start: usize, end: usize) -> Self {
        Self {
            text: source[start..end].to_string(),
            start,
            end,
        }
    }

    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }

    /// Span containing `offset`, falling back to the closest preceding one
    pub fn locate(spans: &[Span], offset: usize) -> Option<&Span> {
        spans
            .iter()
            .find(|s| s.contains(offset))
            .or_else(|| spans.iter().rev().find(|s| s.start <= offset))
            .or_else(|| spans.first())
    }
}

/// A recognized named entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub text: String,
    pub entity_type: EntityType,
    pub start: usize,
    pub end: usize,
    pub confidence: f32,
}

/// Text analysis collaborator used by matching and filtering
///
/// Offsets are byte offsets into the `text` argument. Implementations must be
/// deterministic for a given input.
pub trait TextAnalyzer: Send + Sync {
    /// Tokens in document order
    fn tokenize(&self, text: &str) -> Result<Vec<Token>>;

    /// Sentence boundaries in document order
    fn segment_sentences(&self, text: &str) -> Vec<Span>;

    /// Blank-line delimited paragraphs in document order
    fn segment_paragraphs(&self, text: &str) -> Vec<Span>;

    /// Named entities, non-overlapping, in document order
    fn extract_entities(&self, text: &str) -> Result<Vec<Entity>>;

    /// Sentiment of `text` in `[-1, 1]`
    fn sentiment(&self, text: &str) -> Result<f64>;
}
