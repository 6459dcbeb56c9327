//! Rule → occurrence matching
//!
//! Each [`RuleKind`] compiles into one [`MatchStrategy`]. Every strategy yields
//! occurrences left to right without overlap; "no match" is an empty vector.

use super::DocumentContext;
use crate::analysis::TextAnalyzer;
use crate::error::{AutotagError, Result};
use crate::types::{EntityType, MatchOccurrence, PosTag, Rule, RuleKind};
use regex::Regex;
use std::sync::Arc;
use tracing::debug;

/// Which token form a keyword rule compares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordForm {
    Surface,
    Lemma,
    Stem,
}

/// A rule's match expression, compiled for repeated use
#[derive(Debug, Clone)]
pub enum MatchStrategy {
    /// Contiguous POS tag sequence
    Pattern(Vec<PosTag>),

    /// One word compared per token; `forms` are the accepted normalised values
    Keyword { forms: Vec<String>, form: WordForm },

    /// Case-insensitive escaped literal
    Literal(Regex),

    Entity(EntityType),
}

/// Parse a space-separated POS tag sequence such as `ADJ NOUN`
pub fn parse_pos_pattern(pattern: &str) -> Result<Vec<PosTag>> {
    let tags = pattern
        .split_whitespace()
        .map(|part| {
            part.parse::<PosTag>()
                .map_err(|_| AutotagError::InvalidPattern(format!("unknown POS tag '{}' in '{}'", part, pattern)))
        })
        .collect::<Result<Vec<_>>>()?;

    if tags.is_empty() {
        return Err(AutotagError::InvalidPattern("empty POS pattern".to_string()));
    }
    Ok(tags)
}

impl MatchStrategy {
    /// Compile a rule's match expression
    ///
    /// Keyword rules normalise the match word with the same analyzer that
    /// normalises document tokens.
    pub fn compile(rule: &Rule, analyzer: &dyn TextAnalyzer) -> Result<Self> {
        match rule.kind {
            RuleKind::Pattern => Ok(MatchStrategy::Pattern(parse_pos_pattern(&rule.match_text)?)),
            RuleKind::Keyword => {
                let form = if rule.lemma {
                    WordForm::Lemma
                } else if rule.stem {
                    WordForm::Stem
                } else {
                    WordForm::Surface
                };
                Self::keyword(&rule.match_text, form, analyzer)
            }
            RuleKind::Literal => {
                let literal = rule.match_text.trim();
                if literal.is_empty() {
                    return Err(AutotagError::InvalidPattern("empty literal".to_string()));
                }
                let regex = Regex::new(&format!("(?i){}", regex::escape(literal)))
                    .map_err(|e| AutotagError::InvalidPattern(e.to_string()))?;
                Ok(MatchStrategy::Literal(regex))
            }
            RuleKind::Entity => rule
                .match_text
                .trim()
                .parse::<EntityType>()
                .map(MatchStrategy::Entity)
                .map_err(AutotagError::InvalidPattern),
        }
    }

    /// Keyword strategy for a single word compared by `form`
    pub fn keyword(word: &str, form: WordForm, analyzer: &dyn TextAnalyzer) -> Result<Self> {
        let word = word.trim();
        let lower = word.to_lowercase();

        let mut forms = vec![lower.clone()];
        if form != WordForm::Surface {
            let tokens = analyzer.tokenize(word)?;
            if let Some(token) = tokens.first() {
                let normalised = match form {
                    WordForm::Lemma => token.lemma.clone(),
                    _ => token.stem.clone(),
                };
                if normalised != lower {
                    forms.insert(0, normalised);
                }
            }
            if form == WordForm::Stem {
                // A stem compares only against stems
                forms.truncate(1);
            }
        }

        Ok(MatchStrategy::Keyword { forms, form })
    }

    /// Run the strategy over a document
    pub fn find(&self, ctx: &DocumentContext<'_>) -> Result<Vec<MatchOccurrence>> {
        let text = ctx.text();

        let occurrences = match self {
            MatchStrategy::Pattern(sequence) => {
                let tokens = ctx.tokens()?;
                let width = sequence.len();
                let mut hits = Vec::new();
                let mut i = 0;

                while i + width <= tokens.len() {
                    let window = &tokens[i..i + width];
                    if window.iter().zip(sequence).all(|(token, pos)| token.pos == *pos) {
                        let start = window[0].start;
                        let end = window[width - 1].end;
                        hits.push(MatchOccurrence {
                            text: text[start..end].to_string(),
                            start,
                            end,
                            pos_tags: None,
                        });
                        i += width;
                    } else {
                        i += 1;
                    }
                }
                hits
            }
            MatchStrategy::Keyword { forms, form } => ctx
                .tokens()?
                .iter()
                .filter(|token| {
                    let value = match form {
                        WordForm::Surface => token.surface.to_lowercase(),
                        WordForm::Lemma => token.lemma.clone(),
                        WordForm::Stem => token.stem.clone(),
                    };
                    forms.iter().any(|f| *f == value)
                })
                .map(|token| MatchOccurrence {
                    text: token.surface.clone(),
                    start: token.start,
                    end: token.end,
                    pos_tags: Some(vec![token.pos]),
                })
                .collect(),
            MatchStrategy::Literal(regex) => literal_matches(regex, text).collect(),
            MatchStrategy::Entity(entity_type) => ctx
                .entities()?
                .iter()
                .filter(|e| e.entity_type == *entity_type)
                .map(|e| MatchOccurrence {
                    text: text[e.start..e.end].to_string(),
                    start: e.start,
                    end: e.end,
                    pos_tags: None,
                })
                .collect(),
        };

        Ok(occurrences)
    }
}

/// Non-overlapping case-insensitive hits of a compiled literal
pub fn literal_matches<'a>(regex: &'a Regex, text: &'a str) -> impl Iterator<Item = MatchOccurrence> + 'a {
    regex.find_iter(text).map(|m| MatchOccurrence {
        text: m.as_str().to_string(),
        start: m.start(),
        end: m.end(),
        pos_tags: None,
    })
}

/// Dispatches rules to their matching strategy
pub struct MatchEngine {
    analyzer: Arc<dyn TextAnalyzer>,
}

impl MatchEngine {
    pub fn new(analyzer: Arc<dyn TextAnalyzer>) -> Self {
        Self { analyzer }
    }

    /// Raw occurrences of `rule` in `text`
    pub fn find_matches(&self, rule: &Rule, text: &str) -> Result<Vec<MatchOccurrence>> {
        let ctx = DocumentContext::new(self.analyzer.as_ref(), text);
        self.find_in(rule, &ctx)
    }

    /// Raw occurrences of `rule` against a shared document context
    pub fn find_in(&self, rule: &Rule, ctx: &DocumentContext<'_>) -> Result<Vec<MatchOccurrence>> {
        let strategy = MatchStrategy::compile(rule, self.analyzer.as_ref())?;
        let occurrences = strategy.find(ctx)?;
        debug!(rule = %rule.id, count = occurrences.len(), "Matched rule");
        Ok(occurrences)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::HeuristicAnalyzer;
    use chrono::Utc;

    fn rule(kind: RuleKind, match_text: &str) -> Rule {
        Rule {
            id: format!("{}-test", kind),
            kind,
            match_text: match_text.to_string(),
            lemma: false,
            stem: false,
            filters: None,
            tags: vec!["t".to_string()],
            groups: Vec::new(),
            enabled: true,
            description: None,
            created: Utc::now(),
            modified: None,
        }
    }

    fn engine() -> MatchEngine {
        MatchEngine::new(Arc::new(HeuristicAnalyzer::new()))
    }

    #[test]
    fn test_parse_pos_pattern() {
        assert_eq!(parse_pos_pattern("ADJ noun").unwrap(), vec![PosTag::Adj, PosTag::Noun]);
        assert!(matches!(parse_pos_pattern("ADJ THING"), Err(AutotagError::InvalidPattern(_))));
        assert!(parse_pos_pattern("  ").is_err());
    }

    #[test]
    fn test_literal_non_overlapping() {
        let hits = engine().find_matches(&rule(RuleKind::Literal, "aa"), "aaaa AAA").unwrap();
        let spans: Vec<(usize, usize)> = hits.iter().map(|h| (h.start, h.end)).collect();
        assert_eq!(spans, vec![(0, 2), (2, 4), (5, 7)]);
        assert_eq!(hits[2].text, "AA");
    }

    #[test]
    fn test_literal_phrase_case_insensitive() {
        let hits = engine()
            .find_matches(&rule(RuleKind::Literal, "stand up"), "Daily Stand Up notes. stand up again")
            .unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].text, "Stand Up");
    }

    #[test]
    fn test_keyword_surface() {
        let hits = engine()
            .find_matches(&rule(RuleKind::Keyword, "Docker"), "docker and DOCKER, not dockerfile")
            .unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|h| h.pos_tags.as_ref().map(Vec::len) == Some(1)));
    }

    #[test]
    fn test_keyword_lemma_and_stem() {
        let mut by_lemma = rule(RuleKind::Keyword, "meeting");
        by_lemma.lemma = true;
        let hits = engine().find_matches(&by_lemma, "Two meetings and a meeting").unwrap();
        assert_eq!(hits.len(), 2);

        let mut by_stem = rule(RuleKind::Keyword, "connect");
        by_stem.stem = true;
        let hits = engine()
            .find_matches(&by_stem, "We connected after the connection dropped")
            .unwrap();
        let words: Vec<&str> = hits.iter().map(|h| h.text.as_str()).collect();
        assert_eq!(words, vec!["connected", "connection"]);
    }

    #[test]
    fn test_pattern_windows_do_not_overlap() {
        let hits = engine()
            .find_matches(&rule(RuleKind::Pattern, "ADJ NOUN"), "a quick release and a great deployment")
            .unwrap();
        let texts: Vec<&str> = hits.iter().map(|h| h.text.as_str()).collect();
        assert_eq!(texts, vec!["quick release", "great deployment"]);
        assert!(hits.iter().all(|h| h.pos_tags.is_none()));

        // Three nouns in a row hold one NOUN NOUN window, not two
        let hits = engine()
            .find_matches(&rule(RuleKind::Pattern, "NOUN NOUN"), "server deployment pipeline")
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].text, "server deployment");
    }

    #[test]
    fn test_pattern_rule_rejects_unknown_tag() {
        let err = engine().find_matches(&rule(RuleKind::Pattern, "ADJ WIDGET"), "text").unwrap_err();
        assert!(matches!(err, AutotagError::InvalidPattern(_)));
    }

    #[test]
    fn test_entity_rule() {
        let hits = engine()
            .find_matches(&rule(RuleKind::Entity, "email"), "ping ops@example.com or dev@example.org")
            .unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].text, "ops@example.com");
    }

    #[test]
    fn test_no_match_is_empty() {
        let hits = engine().find_matches(&rule(RuleKind::Keyword, "kubernetes"), "").unwrap();
        assert!(hits.is_empty());
    }
}
