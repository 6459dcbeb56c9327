//! Dictionary and suffix-rule text analyzer

use super::dictionaries::{EntityDictionaries, PosLexicon};
use super::entities::EntityRecognizer;
use super::morphology::{lemmatize, stem};
use super::patterns::CommonPatterns;
use super::sentiment::score_words;
use super::{Entity, Span, TextAnalyzer, Token};
use crate::error::Result;
use crate::types::PosTag;

const PUNCTUATION: &str = ".,;:!?()[]{}\"'`…-–—/*_~<>";
const SENTENCE_END: [&str; 3] = [".", "!", "?"];

/// Heuristic analyzer with no external models
///
/// POS tagging uses a closed-class lexicon, capitalization, suffixes and the
/// previous token's tag. Good enough to drive keyword and pattern rules on
/// everyday notes; not a substitute for a trained tagger.
pub struct HeuristicAnalyzer {
    recognizer: EntityRecognizer,
}

impl HeuristicAnalyzer {
    pub fn new() -> Self {
        Self {
            recognizer: EntityRecognizer::new(),
        }
    }

    pub fn with_recognizer(recognizer: EntityRecognizer) -> Self {
        Self { recognizer }
    }
}

impl Default for HeuristicAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextAnalyzer for HeuristicAnalyzer {
    fn tokenize(&self, text: &str) -> Result<Vec<Token>> {
        let mut tokens: Vec<Token> = Vec::new();

        for m in CommonPatterns::token().find_iter(text) {
            let surface = m.as_str();
            let lower = surface.to_lowercase();
            let prev = tokens.last();
            let initial = match prev {
                Some(p) if SENTENCE_END.contains(&p.surface.as_str()) => true,
                _ => at_line_start(text, m.start()),
            };

            let pos = guess_pos(surface, &lower, prev.map(|p| (p.pos, p.surface.as_str())), initial);
            let (lemma, stem) = match pos {
                PosTag::Punct | PosTag::Sym | PosTag::Num => (lower.clone(), lower.clone()),
                _ => (lemmatize(&lower, pos), stem(&lower)),
            };

            tokens.push(Token {
                surface: surface.to_string(),
                pos,
                lemma,
                stem,
                start: m.start(),
                end: m.end(),
            });
        }

        Ok(tokens)
    }

    fn segment_sentences(&self, text: &str) -> Vec<Span> {
        let mut spans = Vec::new();
        let mut line_start = 0;

        for line in text.split_inclusive('\n') {
            let body = line.trim_end_matches(['\n', '\r']);
            let mut seg_start = 0;

            for m in CommonPatterns::sentence_break().find_iter(body) {
                if m.as_str().starts_with('.') && is_abbreviation(&body[..m.start()]) {
                    continue;
                }
                let boundary = m.start() + m.as_str().trim_end().len();
                spans.extend(trimmed_span(text, line_start + seg_start, line_start + boundary));
                seg_start = m.end();
            }
            spans.extend(trimmed_span(text, line_start + seg_start, line_start + body.len()));

            line_start += line.len();
        }

        spans
    }

    fn segment_paragraphs(&self, text: &str) -> Vec<Span> {
        let mut spans = Vec::new();
        let mut start = 0;

        for m in CommonPatterns::paragraph_break().find_iter(text) {
            spans.extend(trimmed_span(text, start, m.start()));
            start = m.end();
        }
        spans.extend(trimmed_span(text, start, text.len()));

        spans
    }

    fn extract_entities(&self, text: &str) -> Result<Vec<Entity>> {
        Ok(self.recognizer.recognize(text))
    }

    fn sentiment(&self, text: &str) -> Result<f64> {
        let words: Vec<String> = CommonPatterns::token()
            .find_iter(text)
            .map(|m| m.as_str().to_lowercase())
            .collect();
        Ok(score_words(&words))
    }
}

/// Only markup (bullets, heading hashes, quotes) precedes `offset` on its line
fn at_line_start(text: &str, offset: usize) -> bool {
    let line_start = text[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
    !text[line_start..offset].chars().any(char::is_alphanumeric)
}

/// The word before a period is a known abbreviation or a single initial
fn is_abbreviation(before: &str) -> bool {
    let word = before
        .rsplit(char::is_whitespace)
        .next()
        .unwrap_or("")
        .trim_start_matches(|c: char| !c.is_alphanumeric());
    if word.is_empty() {
        return false;
    }
    let mut chars = word.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if c.is_uppercase() {
            return true;
        }
    }
    PosLexicon::abbreviations().contains(word.to_lowercase().as_str())
}

fn trimmed_span(text: &str, start: usize, end: usize) -> Option<Span> {
    let slice = &text[start..end];
    let trimmed = slice.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lead = slice.len() - slice.trim_start().len();
    Some(Span::new(text, start + lead, start + lead + trimmed.len()))
}

fn is_capitalized(surface: &str) -> bool {
    surface.chars().next().is_some_and(char::is_uppercase)
}

fn is_all_caps(surface: &str) -> bool {
    surface.chars().filter(|c| c.is_alphabetic()).count() >= 2
        && surface.chars().all(|c| !c.is_alphabetic() || c.is_uppercase())
}

fn guess_pos(surface: &str, lower: &str, prev: Option<(PosTag, &str)>, sentence_initial: bool) -> PosTag {
    if surface.starts_with('#') && surface.len() > 1 {
        return PosTag::Sym;
    }
    if !surface.chars().any(char::is_alphanumeric) {
        return if surface.chars().all(|c| PUNCTUATION.contains(c)) {
            PosTag::Punct
        } else {
            PosTag::Sym
        };
    }
    if surface.chars().all(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-' | '/' | ':')) {
        return PosTag::Num;
    }

    if let Some(pos) = PosLexicon::lookup(lower) {
        return pos;
    }

    if is_capitalized(surface) {
        let known = EntityDictionaries::known_organizations().contains(lower)
            || EntityDictionaries::known_locations().contains(lower)
            || EntityDictionaries::given_names().contains(lower);
        if !sentence_initial || known || is_all_caps(surface) {
            return PosTag::Propn;
        }
    }

    let prev_pos = prev.map(|(pos, _)| pos);
    let after_infinitive_or_modal = match prev {
        Some((PosTag::Part, "to")) => true,
        Some((PosTag::Aux, word)) => matches!(
            word.to_lowercase().as_str(),
            "will" | "would" | "shall" | "should" | "can" | "could" | "may" | "might" | "must"
                | "do" | "does" | "did" | "don't" | "doesn't" | "didn't" | "won't" | "can't"
        ),
        _ => false,
    };

    if lower.ends_with("ly") && lower.len() > 4 {
        return PosTag::Adv;
    }
    if after_infinitive_or_modal {
        return PosTag::Verb;
    }
    if ["ous", "ful", "ive", "able", "ible", "less", "ical", "ish"]
        .iter()
        .any(|s| lower.ends_with(s) && lower.len() > s.len() + 2)
    {
        return PosTag::Adj;
    }
    if ["tion", "sion", "ment", "ness", "ity", "ance", "ence", "ship", "ism", "ist", "er", "or"]
        .iter()
        .any(|s| lower.ends_with(s) && lower.len() > s.len() + 2)
    {
        return PosTag::Noun;
    }
    if ["ize", "ise", "ify"].iter().any(|s| lower.ends_with(s) && lower.len() > s.len() + 2) {
        return PosTag::Verb;
    }
    if lower.ends_with("ing") && lower.len() > 5 {
        return match prev_pos {
            Some(PosTag::Aux | PosTag::Pron | PosTag::Part | PosTag::Verb | PosTag::Adv) => PosTag::Verb,
            _ => PosTag::Noun,
        };
    }
    if lower.ends_with("ed") && lower.len() > 4 {
        return PosTag::Verb;
    }
    if lower.ends_with("al") && lower.len() > 5 {
        return PosTag::Adj;
    }
    if matches!(prev_pos, Some(PosTag::Pron)) && !matches!(prev, Some((_, p)) if p.eq_ignore_ascii_case("it")) {
        // "we deploy", "they ship"
        return PosTag::Verb;
    }

    PosTag::Noun
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(text: &str) -> Vec<(String, PosTag)> {
        HeuristicAnalyzer::new()
            .tokenize(text)
            .unwrap()
            .into_iter()
            .map(|t| (t.surface, t.pos))
            .collect()
    }

    #[test]
    fn test_tokenize_offsets() {
        let text = "Docker deployment meeting";
        let tokens = HeuristicAnalyzer::new().tokenize(text).unwrap();

        assert_eq!(tokens.len(), 3);
        for token in &tokens {
            assert_eq!(&text[token.start..token.end], token.surface);
        }
        assert_eq!(tokens[2].lemma, "meeting");
        assert_eq!(tokens[2].stem, "meet");
    }

    #[test]
    fn test_pos_guessing() {
        let tagged = tags("The quick review of the new deployment went really well.");
        let pos: Vec<PosTag> = tagged.iter().map(|(_, p)| *p).collect();
        assert_eq!(
            pos,
            vec![
                PosTag::Det,
                PosTag::Adj,
                PosTag::Verb, // "review" is in the verb lexicon
                PosTag::Adp,
                PosTag::Det,
                PosTag::Adj,
                PosTag::Noun,
                PosTag::Verb,
                PosTag::Adv,
                PosTag::Adv,
                PosTag::Punct,
            ]
        );
    }

    #[test]
    fn test_proper_nouns_and_symbols() {
        let tagged = tags("Met Alice at Google on 2024-01-15 #work");
        assert_eq!(tagged[1], ("Alice".to_string(), PosTag::Propn));
        assert_eq!(tagged[3], ("Google".to_string(), PosTag::Propn));
        assert_eq!(tagged[5].1, PosTag::Num);
        assert_eq!(tagged[6], ("#work".to_string(), PosTag::Sym));
    }

    #[test]
    fn test_verbs_after_modals() {
        let tagged = tags("We should refactor the parser");
        assert_eq!(tagged[2], ("refactor".to_string(), PosTag::Verb));
        assert_eq!(tagged[4], ("parser".to_string(), PosTag::Noun));
    }

    #[test]
    fn test_lemma_and_stem() {
        let tokens = HeuristicAnalyzer::new().tokenize("They were running meetings").unwrap();
        assert_eq!(tokens[1].lemma, "be");
        assert_eq!(tokens[2].lemma, "run");
        assert_eq!(tokens[3].lemma, "meeting");
        assert_eq!(tokens[3].stem, "meet");
    }

    #[test]
    fn test_segment_sentences() {
        let text = "Dr. Smith arrived. The build broke!\nNext line here";
        let sentences: Vec<String> = HeuristicAnalyzer::new()
            .segment_sentences(text)
            .into_iter()
            .map(|s| s.text)
            .collect();
        assert_eq!(sentences, vec!["Dr. Smith arrived.", "The build broke!", "Next line here"]);
    }

    #[test]
    fn test_segment_paragraphs() {
        let text = "First para\nstill first.\n\n\nSecond para.\n";
        let analyzer = HeuristicAnalyzer::new();
        let paragraphs = analyzer.segment_paragraphs(text);

        assert_eq!(paragraphs.len(), 2);
        assert_eq!(paragraphs[0].text, "First para\nstill first.");
        assert_eq!(paragraphs[1].text, "Second para.");
        assert_eq!(&text[paragraphs[1].start..paragraphs[1].end], "Second para.");
    }

    #[test]
    fn test_sentiment_range() {
        let analyzer = HeuristicAnalyzer::new();
        assert!(analyzer.sentiment("What a great release").unwrap() > 0.5);
        assert!(analyzer.sentiment("The deploy failed again").unwrap() < 0.0);
        assert_eq!(analyzer.sentiment("").unwrap(), 0.0);
    }
}
