//! Match and filter pipeline
//!
//! [`MatchEngine`] turns a rule into raw occurrences; [`FilterEvaluator`]
//! prunes them. Both read document analysis through a [`DocumentContext`], which
//! computes tokens, entities, segments and span sentiment at most once per
//! document.

pub mod engine;
pub mod filters;

pub use engine::{parse_pos_pattern, MatchEngine, MatchStrategy, WordForm};
pub use filters::{describe_filters, FilterEvaluator};

use crate::analysis::{Entity, Span, TextAnalyzer, Token};
use crate::error::Result;
use once_cell::unsync::OnceCell;
use std::cell::RefCell;
use std::collections::HashMap;

/// Lazily computed analysis of one document
pub struct DocumentContext<'a> {
    analyzer: &'a dyn TextAnalyzer,
    text: &'a str,
    tokens: OnceCell<Vec<Token>>,
    entities: OnceCell<Vec<Entity>>,
    sentences: OnceCell<Vec<Span>>,
    paragraphs: OnceCell<Vec<Span>>,
    sentiment: RefCell<HashMap<(usize, usize), f64>>,
}

impl<'a> DocumentContext<'a> {
    pub fn new(analyzer: &'a dyn TextAnalyzer, text: &'a str) -> Self {
        Self {
            analyzer,
            text,
            tokens: OnceCell::new(),
            entities: OnceCell::new(),
            sentences: OnceCell::new(),
            paragraphs: OnceCell::new(),
            sentiment: RefCell::new(HashMap::new()),
        }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn analyzer(&self) -> &'a dyn TextAnalyzer {
        self.analyzer
    }

    pub fn tokens(&self) -> Result<&[Token]> {
        self.tokens
            .get_or_try_init(|| self.analyzer.tokenize(self.text))
            .map(Vec::as_slice)
    }

    pub fn entities(&self) -> Result<&[Entity]> {
        self.entities
            .get_or_try_init(|| self.analyzer.extract_entities(self.text))
            .map(Vec::as_slice)
    }

    pub fn sentences(&self) -> &[Span] {
        self.sentences
            .get_or_init(|| self.analyzer.segment_sentences(self.text))
    }

    pub fn paragraphs(&self) -> &[Span] {
        self.paragraphs
            .get_or_init(|| self.analyzer.segment_paragraphs(self.text))
    }

    /// Sentiment of `text[start..end]`, memoised per span
    pub fn sentiment(&self, start: usize, end: usize) -> Result<f64> {
        if let Some(score) = self.sentiment.borrow().get(&(start, end)) {
            return Ok(*score);
        }
        let score = self.analyzer.sentiment(&self.text[start..end])?;
        self.sentiment.borrow_mut().insert((start, end), score);
        Ok(score)
    }
}
