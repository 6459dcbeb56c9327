//! Lemmatization and stemming heuristics
//!
//! `lemmatize` is POS-aware and dictionary-first; `stem` is a trimmed-down
//! Porter-style suffix stripper. Both operate on lowercase input.

use super::dictionaries::MorphologyDictionaries;
use crate::types::PosTag;

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

fn has_vowel(s: &str) -> bool {
    s.chars().any(is_vowel)
}

/// Collapse a doubled final consonant ("runn" -> "run"), except l/s/z
fn undouble(stem: &str) -> String {
    let chars: Vec<char> = stem.chars().collect();
    let n = chars.len();
    if n >= 3 {
        let last = chars[n - 1];
        if last == chars[n - 2] && !is_vowel(last) && !matches!(last, 'l' | 's' | 'z') {
            return chars[..n - 1].iter().collect();
        }
    }
    stem.to_string()
}

/// Restore a silent "e" dropped before -ing/-ed ("creat" -> "create")
fn restore_e(stem: &str) -> String {
    const NEEDS_E: [&str; 8] = ["at", "bl", "iz", "ak", "iv", "uc", "ov", "ag"];
    if stem == "us" || stem == "caus" || NEEDS_E.iter().any(|suffix| stem.ends_with(suffix)) {
        format!("{}e", stem)
    } else {
        stem.to_string()
    }
}

fn strip_verbal_suffix(word: &str) -> Option<String> {
    if let Some(base) = word.strip_suffix("ied") {
        if base.len() >= 2 {
            return Some(format!("{}y", base));
        }
    }
    for suffix in ["ing", "ed"] {
        if let Some(base) = word.strip_suffix(suffix) {
            if base.len() >= 2 && has_vowel(base) {
                let undoubled = undouble(base);
                if undoubled != base {
                    return Some(undoubled);
                }
                return Some(restore_e(base));
            }
        }
    }
    None
}

fn strip_plural(word: &str) -> Option<String> {
    if word.len() <= 3 {
        return None;
    }
    if let Some(base) = word.strip_suffix("ies") {
        return Some(format!("{}y", base));
    }
    for suffix in ["sses", "xes", "ches", "shes", "zes"] {
        if word.ends_with(suffix) {
            return Some(word[..word.len() - 2].to_string());
        }
    }
    if word.ends_with('s') && !word.ends_with("ss") && !word.ends_with("us") && !word.ends_with("is") {
        return Some(word[..word.len() - 1].to_string());
    }
    None
}

/// Dictionary form of a lowercase word given its POS
pub fn lemmatize(word: &str, pos: PosTag) -> String {
    if let Some(lemma) = MorphologyDictionaries::irregular_lemmas().get(word) {
        return (*lemma).to_string();
    }

    let stripped = match pos {
        PosTag::Noun => strip_plural(word),
        PosTag::Verb | PosTag::Aux => strip_verbal_suffix(word).or_else(|| strip_plural(word)),
        _ => None,
    };

    stripped.unwrap_or_else(|| word.to_string())
}

/// Suffix-stripping stem of a lowercase word
pub fn stem(word: &str) -> String {
    let mut w = word.to_string();
    if w.chars().count() <= 3 || !w.is_ascii() {
        return w;
    }

    // Plurals
    if w.ends_with("sses") {
        w.truncate(w.len() - 2);
    } else if w.ends_with("ies") {
        w.truncate(w.len() - 2);
    } else if w.ends_with('s') && !w.ends_with("ss") && !w.ends_with("us") {
        w.truncate(w.len() - 1);
    }

    // Past tense and progressive
    if w.ends_with("eed") {
        w.truncate(w.len() - 1);
    } else {
        for suffix in ["ing", "ed"] {
            if let Some(base) = w.strip_suffix(suffix) {
                if base.len() >= 3 && has_vowel(base) {
                    let undoubled = undouble(base);
                    w = if undoubled != base {
                        undoubled
                    } else if base.ends_with("at") || base.ends_with("bl") || base.ends_with("iz") {
                        format!("{}e", base)
                    } else {
                        base.to_string()
                    };
                }
                break;
            }
        }
    }

    // Terminal y after a consonant
    if w.len() > 3 && w.ends_with('y') {
        let before = w[..w.len() - 1].chars().last().unwrap_or('a');
        if !is_vowel(before) {
            w.truncate(w.len() - 1);
            w.push('i');
        }
    }

    // Derivational suffixes, longest first
    const MAPPINGS: [(&str, &str); 16] = [
        ("ational", "ate"),
        ("tional", "tion"),
        ("ization", "ize"),
        ("fulness", "ful"),
        ("ousness", "ous"),
        ("iveness", "ive"),
        ("ation", "ate"),
        ("alism", "al"),
        ("aliti", "al"),
        ("iviti", "ive"),
        ("biliti", "ble"),
        ("icate", "ic"),
        ("alize", "al"),
        ("ical", "ic"),
        ("ness", ""),
        ("ful", ""),
    ];
    for (suffix, replacement) in MAPPINGS {
        if let Some(base) = w.strip_suffix(suffix) {
            if base.len() >= 2 && has_vowel(base) {
                w = format!("{}{}", base, replacement);
            }
            break;
        }
    }

    const REMOVALS: [&str; 14] = [
        "ement", "ment", "ance", "ence", "able", "ible", "ism", "ate", "iti", "ous", "ive",
        "ize", "ant", "ent",
    ];
    for suffix in REMOVALS {
        if let Some(base) = w.strip_suffix(suffix) {
            if base.len() >= 4 {
                w = base.to_string();
            }
            return w;
        }
    }

    if let Some(base) = w.strip_suffix("ion") {
        if base.len() >= 4 && (base.ends_with('s') || base.ends_with('t')) {
            w = base.to_string();
        }
    }

    w
}
