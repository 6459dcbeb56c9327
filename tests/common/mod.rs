//! Common test utilities and helpers

#![allow(dead_code)]

use autotag_core::{
    analysis::{Entity, Span, Token},
    error::Result,
    PosTag, Rule, RuleKind, TextAnalyzer,
};
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z0-9'#_/-]+").expect("Valid word regex"));

/// Deterministic analyzer for pipeline tests
///
/// Tokens are runs of word characters. POS comes from an explicit table
/// (default NOUN); lemma and stem are the lowercase surface with one trailing
/// `s` removed. Sentences end at `.`; paragraphs at blank lines. Sentiment is
/// the score of the first configured phrase the text contains, else 0.
#[derive(Default)]
pub struct StubAnalyzer {
    pos: HashMap<String, PosTag>,
    sentiment: Vec<(String, f64)>,
}

impl StubAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pos(mut self, word: &str, pos: PosTag) -> Self {
        self.pos.insert(word.to_lowercase(), pos);
        self
    }

    pub fn with_sentiment(mut self, phrase: &str, score: f64) -> Self {
        self.sentiment.push((phrase.to_lowercase(), score));
        self
    }

    pub fn shared(self) -> Arc<dyn TextAnalyzer> {
        Arc::new(self)
    }
}

fn spans_split_by(text: &str, is_end: impl Fn(&str, usize) -> Option<usize>) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < text.len() {
        if let Some(end) = is_end(text, i) {
            push_trimmed(&mut spans, text, start, i + 1);
            start = end;
            i = end;
        } else {
            i += text[i..].chars().next().map_or(1, char::len_utf8);
        }
    }
    push_trimmed(&mut spans, text, start, text.len());
    spans
}

fn push_trimmed(spans: &mut Vec<Span>, text: &str, start: usize, end: usize) {
    let slice = &text[start..end];
    let lead = slice.len() - slice.trim_start().len();
    let trimmed = slice.trim();
    if !trimmed.is_empty() {
        spans.push(Span::new(text, start + lead, start + lead + trimmed.len()));
    }
}

impl TextAnalyzer for StubAnalyzer {
    fn tokenize(&self, text: &str) -> Result<Vec<Token>> {
        Ok(WORD
            .find_iter(text)
            .map(|m| {
                let lower = m.as_str().to_lowercase();
                let base = lower.strip_suffix('s').filter(|b| b.len() > 2).unwrap_or(&lower).to_string();
                Token {
                    surface: m.as_str().to_string(),
                    pos: self.pos.get(&lower).copied().unwrap_or(PosTag::Noun),
                    lemma: base.clone(),
                    stem: base,
                    start: m.start(),
                    end: m.end(),
                }
            })
            .collect())
    }

    fn segment_sentences(&self, text: &str) -> Vec<Span> {
        spans_split_by(text, |t, i| (t.as_bytes()[i] == b'.').then_some(i + 1))
    }

    fn segment_paragraphs(&self, text: &str) -> Vec<Span> {
        spans_split_by(text, |t, i| t[i..].starts_with("\n\n").then_some(i + 2))
    }

    fn extract_entities(&self, _text: &str) -> Result<Vec<Entity>> {
        Ok(Vec::new())
    }

    fn sentiment(&self, text: &str) -> Result<f64> {
        let lower = text.to_lowercase();
        Ok(self
            .sentiment
            .iter()
            .find(|(phrase, _)| lower.contains(phrase.as_str()))
            .map_or(0.0, |(_, score)| *score))
    }
}

/// An enabled rule with a fixed id
pub fn rule(id: &str, kind: RuleKind, match_text: &str, tags: &[&str]) -> Rule {
    Rule {
        id: id.to_string(),
        kind,
        match_text: match_text.to_string(),
        lemma: false,
        stem: false,
        filters: None,
        tags: tags.iter().map(|t| t.to_string()).collect(),
        groups: Vec::new(),
        enabled: true,
        description: None,
        created: Utc::now(),
        modified: None,
    }
}
