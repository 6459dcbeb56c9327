//! Pre-compiled regex patterns shared by the analyzer and the tag reconciler

use once_cell::sync::Lazy;
use regex::Regex;

/// Common patterns used across the analysis and reconcile layers
pub struct CommonPatterns;

impl CommonPatterns {
    /// Tokens: tag markers, words (with inner apostrophes/hyphens), or a single
    /// non-space symbol
    pub fn token() -> &'static Regex {
        static PATTERN: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"#[A-Za-z0-9_/-]+|[\p{L}\p{N}]+(?:['’\-.][\p{L}\p{N}]+)*|[^\s\p{L}\p{N}]")
                .expect("Valid token regex")
        });
        &PATTERN
    }

    /// Tag markers: `#tag` at start of line or after whitespace; group 1 is the name
    pub fn tag_marker() -> &'static Regex {
        static PATTERN: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"(?m)(?:^|[ \t\r\n])#([A-Za-z0-9_/-]+)").expect("Valid tag marker regex")
        });
        &PATTERN
    }

    /// A valid tag name once normalised
    pub fn tag_name() -> &'static Regex {
        static PATTERN: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"^[A-Za-z0-9_/-]+$").expect("Valid tag name regex"));
        &PATTERN
    }

    /// Sentence terminators followed by whitespace
    pub fn sentence_break() -> &'static Regex {
        static PATTERN: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"[.!?]+[\)\]\x22']*\s+").expect("Valid sentence break regex"));
        &PATTERN
    }

    /// Blank lines separating paragraphs
    pub fn paragraph_break() -> &'static Regex {
        static PATTERN: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"\n[ \t]*\r?\n\s*").expect("Valid paragraph break regex"));
        &PATTERN
    }

    /// Title followed by one or more capitalized names: `Dr. Smith`
    pub fn person_with_title() -> &'static Regex {
        static PATTERN: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"\b(?:Dr|Prof|Mr|Mrs|Ms|Miss|Sir|Lord|Lady|Captain|President|Senator|Judge)\.?\s+[A-Z][a-z]+(?:\s+[A-Z][a-z]+)*\b")
                .expect("Valid person title regex")
        });
        &PATTERN
    }

    /// Runs of capitalized words: `Acme Widget Corp`
    pub fn capitalized_run() -> &'static Regex {
        static PATTERN: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"\b[A-Z][A-Za-z&'-]*(?:\s+[A-Z][A-Za-z&'-]*)*\b")
                .expect("Valid capitalized run regex")
        });
        &PATTERN
    }

    /// Numeric and written dates: `2024-01-15`, `1/15/2024`, `Jan 15, 2024`, `15 March`
    pub fn date() -> &'static Regex {
        static PATTERN: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"\b(?:\d{4}-\d{1,2}-\d{1,2}|\d{1,2}[/-]\d{1,2}[/-]\d{2,4}|(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Sept|Oct|Nov|Dec)[a-z]*\.?\s+\d{1,2}(?:st|nd|rd|th)?(?:,?\s+\d{4})?|\d{1,2}(?:st|nd|rd|th)?\s+(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Sept|Oct|Nov|Dec)[a-z]*(?:\s+\d{4})?)\b")
                .expect("Valid date regex")
        });
        &PATTERN
    }

    /// Clock times: `3:30`, `15:04:05`, `3:30 PM`, `9am`
    pub fn time() -> &'static Regex {
        static PATTERN: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"\b(?:\d{1,2}:\d{2}(?::\d{2})?(?:\s*(?:[AaPp]\.?[Mm]\.?))?|\d{1,2}\s*(?:[AaPp][Mm]))\b")
                .expect("Valid time regex")
        });
        &PATTERN
    }

    /// Currency amounts: `$1,200.50`, `€30`, `15 dollars`
    pub fn money() -> &'static Regex {
        static PATTERN: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"[$€£¥]\s?\d[\d,]*(?:\.\d+)?(?:\s?(?:[kKmMbB]|million|billion))?|\b\d[\d,]*(?:\.\d+)?\s?(?:dollars|euros|pounds|USD|EUR|GBP)\b")
                .expect("Valid money regex")
        });
        &PATTERN
    }

    /// Percentages: `12%`, `3.5 percent`
    pub fn percent() -> &'static Regex {
        static PATTERN: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"\b\d+(?:\.\d+)?\s?(?:%|percent\b)").expect("Valid percent regex")
        });
        &PATTERN
    }

    /// Email addresses
    pub fn email() -> &'static Regex {
        static PATTERN: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("Valid email regex")
        });
        &PATTERN
    }

    /// URLs: http:// or https://
    pub fn url() -> &'static Regex {
        static PATTERN: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"https?://[^\s<>()\[\]]+[^\s<>()\[\].,;:!?'\x22]").expect("Valid URL regex")
        });
        &PATTERN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_marker() {
        let re = CommonPatterns::tag_marker();
        let names: Vec<_> = re
            .captures_iter("#first text #second mid#not\n#third ## heading")
            .map(|c| c.get(1).unwrap().as_str())
            .collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_tag_name() {
        assert!(CommonPatterns::tag_name().is_match("work/projects_2024-q1"));
        assert!(!CommonPatterns::tag_name().is_match("two words"));
        assert!(!CommonPatterns::tag_name().is_match(""));
    }

    #[test]
    fn test_token_regex() {
        let tokens: Vec<_> = CommonPatterns::token()
            .find_iter("Don't re-deploy #ops, ok?")
            .map(|m| m.as_str())
            .collect();
        assert_eq!(tokens, vec!["Don't", "re-deploy", "#ops", ",", "ok", "?"]);
    }

    #[test]
    fn test_entity_patterns() {
        assert!(CommonPatterns::date().is_match("due 2024-01-15"));
        assert!(CommonPatterns::date().is_match("on March 3, 2024"));
        assert!(CommonPatterns::time().is_match("at 3:30 PM"));
        assert!(CommonPatterns::money().is_match("costs $1,200.50"));
        assert!(CommonPatterns::percent().is_match("up 12%"));
        assert!(CommonPatterns::email().is_match("mail bob@example.com"));
        assert_eq!(
            CommonPatterns::url().find("see https://example.com/a.").unwrap().as_str(),
            "https://example.com/a"
        );
    }
}
