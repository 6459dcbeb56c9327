//! Lexicon sentiment scoring
//!
//! Sums word valences from [`SentimentLexicon`], flipping and damping a word
//! preceded by a negation within three tokens, scaling it by a directly
//! preceding intensifier, and normalising the total into `[-1, 1]`.

use super::dictionaries::SentimentLexicon;

/// Normalisation constant: a single strongly positive word scores around 0.6
const ALPHA: f64 = 15.0;

/// Negated valence is flipped and scaled by this factor
const NEGATION_SCALAR: f64 = -0.74;

/// How many tokens back a negation still applies
const NEGATION_WINDOW: usize = 3;

/// Score a sequence of lowercase words
pub fn score_words<S: AsRef<str>>(words: &[S]) -> f64 {
    let mut total = 0.0;

    for (i, word) in words.iter().enumerate() {
        let word = word.as_ref();
        let Some(mut valence) = SentimentLexicon::valence(word) else {
            continue;
        };

        if i > 0 {
            if let Some(factor) = SentimentLexicon::intensifier(words[i - 1].as_ref()) {
                valence *= factor;
            }
        }

        let window_start = i.saturating_sub(NEGATION_WINDOW);
        let negated = words[window_start..i]
            .iter()
            .any(|w| SentimentLexicon::negations().contains(w.as_ref()) || w.as_ref().ends_with("n't"));
        if negated {
            valence *= NEGATION_SCALAR;
        }

        total += valence;
    }

    normalize(total)
}

/// Map an unbounded score into `[-1, 1]`
pub fn normalize(score: f64) -> f64 {
    if score == 0.0 {
        return 0.0;
    }
    (score / (score * score + ALPHA).sqrt()).clamp(-1.0, 1.0)
}
