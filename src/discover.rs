//! Corpus exploration for rule authoring
//!
//! Read-only: answers "which words are frequent", "which phrases does this POS
//! pattern produce" and "where does this keyword occur" across a directory.

use crate::analysis::dictionaries::PosLexicon;
use crate::analysis::TextAnalyzer;
use crate::error::Result;
use crate::matching::{parse_pos_pattern, DocumentContext, MatchStrategy, WordForm};
use crate::reconcile::markup::mask_tags;
use crate::sync::collect_documents;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Shortest keyword worth reporting
const MIN_KEYWORD_LEN: usize = 3;

/// A document loaded for discovery
#[derive(Debug, Clone)]
pub struct Document {
    pub path: PathBuf,
    pub text: String,
}

/// Aggregated term frequency
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TermCount {
    pub term: String,
    /// Total occurrences
    pub count: usize,
    /// Documents containing the term at least once
    pub documents: usize,
}

/// Occurrences of a keyword in one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileCount {
    pub path: PathBuf,
    pub count: usize,
}

/// Read every tracked document under `root`; unreadable files are skipped
pub fn load_corpus(root: &Path, extension: &str) -> Vec<Document> {
    collect_documents(root, extension)
        .into_iter()
        .filter_map(|path| match fs::read_to_string(&path) {
            Ok(text) => Some(Document { path, text }),
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                None
            }
        })
        .collect()
}

#[derive(Default)]
struct Tally {
    counts: HashMap<String, (usize, usize)>,
}

impl Tally {
    fn add_document<I: IntoIterator<Item = String>>(&mut self, terms: I) {
        let mut seen = HashSet::new();
        for term in terms {
            let entry = self.counts.entry(term.clone()).or_insert((0, 0));
            entry.0 += 1;
            if seen.insert(term) {
                entry.1 += 1;
            }
        }
    }

    /// Most frequent first, ties alphabetical
    fn ranked(self, limit: usize) -> Vec<TermCount> {
        let mut terms: Vec<TermCount> = self
            .counts
            .into_iter()
            .map(|(term, (count, documents))| TermCount { term, count, documents })
            .collect();
        terms.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.term.cmp(&b.term)));
        terms.truncate(limit);
        terms
    }
}

pub struct Discovery {
    analyzer: Arc<dyn TextAnalyzer>,
}

impl Discovery {
    pub fn new(analyzer: Arc<dyn TextAnalyzer>) -> Self {
        Self { analyzer }
    }

    /// Most frequent content-word lemmas, excluding stopwords and short words
    pub fn keywords(&self, corpus: &[Document], limit: usize) -> Result<Vec<TermCount>> {
        let stopwords = PosLexicon::stopwords();
        let mut tally = Tally::default();

        for doc in corpus {
            let masked = mask_tags(&doc.text);
            let tokens = self.analyzer.tokenize(&masked)?;
            tally.add_document(
                tokens
                    .into_iter()
                    .filter(|t| t.pos.is_content_word())
                    .map(|t| t.lemma)
                    .filter(|lemma| {
                        lemma.chars().count() >= MIN_KEYWORD_LEN && !stopwords.contains(lemma.as_str())
                    }),
            );
        }

        Ok(tally.ranked(limit))
    }

    /// Phrases produced by a POS pattern, lowercased and counted
    pub fn pattern_phrases(&self, corpus: &[Document], pattern: &str, limit: usize) -> Result<Vec<TermCount>> {
        let strategy = MatchStrategy::Pattern(parse_pos_pattern(pattern)?);
        let mut tally = Tally::default();

        for doc in corpus {
            let masked = mask_tags(&doc.text);
            let ctx = DocumentContext::new(self.analyzer.as_ref(), &masked);
            let phrases = strategy.find(&ctx)?;
            debug!("{} phrase(s) for '{}' in {}", phrases.len(), pattern, doc.path.display());
            tally.add_document(phrases.into_iter().map(|occ| occ.text.to_lowercase()));
        }

        Ok(tally.ranked(limit))
    }

    /// Documents containing `word`, most occurrences first
    pub fn keyword_occurrences(
        &self,
        corpus: &[Document],
        word: &str,
        form: WordForm,
        limit: usize,
    ) -> Result<Vec<FileCount>> {
        let strategy = MatchStrategy::keyword(word, form, self.analyzer.as_ref())?;
        let mut files = Vec::new();

        for doc in corpus {
            let masked = mask_tags(&doc.text);
            let ctx = DocumentContext::new(self.analyzer.as_ref(), &masked);
            let count = strategy.find(&ctx)?.len();
            if count > 0 {
                files.push(FileCount {
                    path: doc.path.clone(),
                    count,
                });
            }
        }

        files.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.path.cmp(&b.path)));
        files.truncate(limit);
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::HeuristicAnalyzer;

    fn corpus(texts: &[(&str, &str)]) -> Vec<Document> {
        texts
            .iter()
            .map(|(path, text)| Document {
                path: PathBuf::from(path),
                text: text.to_string(),
            })
            .collect()
    }

    fn discovery() -> Discovery {
        Discovery::new(Arc::new(HeuristicAnalyzer::new()))
    }

    #[test]
    fn test_keywords_rank_by_frequency() {
        let docs = corpus(&[
            ("a.md", "The server crashed. Restart the server."),
            ("b.md", "Another server and a database."),
        ]);
        let top = discovery().keywords(&docs, 2).unwrap();

        assert_eq!(top[0].term, "server");
        assert_eq!(top[0].count, 3);
        assert_eq!(top[0].documents, 2);
        assert_eq!(top.len(), 2);
        assert!(top.iter().all(|t| t.term != "the"));
    }

    #[test]
    fn test_keywords_ignore_existing_tags() {
        let docs = corpus(&[("a.md", "Budget review.\n\n#budgeting #budgeting")]);
        let top = discovery().keywords(&docs, 10).unwrap();
        assert!(top.iter().all(|t| t.term != "budgeting"));
    }

    #[test]
    fn test_pattern_phrases() {
        let docs = corpus(&[
            ("a.md", "A quick release went out."),
            ("b.md", "Another quick release and a slow review."),
        ]);
        let phrases = discovery().pattern_phrases(&docs, "ADJ NOUN", 10).unwrap();

        assert_eq!(phrases[0].term, "quick release");
        assert_eq!(phrases[0].count, 2);
        assert!(discovery().pattern_phrases(&docs, "NOUN BOGUS", 10).is_err());
    }

    #[test]
    fn test_keyword_occurrences_by_lemma() {
        let docs = corpus(&[
            ("a.md", "One meeting."),
            ("b.md", "Two meetings, then another meeting."),
            ("c.md", "Nothing relevant."),
        ]);
        let files = discovery()
            .keyword_occurrences(&docs, "meeting", WordForm::Lemma, 10)
            .unwrap();

        assert_eq!(
            files,
            vec![
                FileCount { path: PathBuf::from("b.md"), count: 2 },
                FileCount { path: PathBuf::from("a.md"), count: 1 },
            ]
        );
    }
}
