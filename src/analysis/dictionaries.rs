//! Dictionary-based word lists for the heuristic analyzer
//!
//! Provides curated word lists for part-of-speech guessing, lemmatization,
//! entity recognition and lexicon sentiment.

use crate::types::PosTag;
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

fn set(words: &[&'static str]) -> HashSet<&'static str> {
    words.iter().copied().collect()
}

/// Closed-class and high-frequency open-class words with a fixed POS
pub struct PosLexicon;

impl PosLexicon {
    /// Direct word → POS lookup
    pub fn lookup(word: &str) -> Option<PosTag> {
        static MAP: Lazy<HashMap<&'static str, PosTag>> = Lazy::new(|| {
            let mut map = HashMap::new();
            let groups: [(PosTag, &[&'static str]); 12] = [
                (
                    PosTag::Det,
                    &[
                        "a", "an", "the", "this", "that", "these", "those", "each", "every",
                        "either", "neither", "some", "any", "no", "another", "such", "all",
                        "both", "my", "your", "his", "its", "our", "their",
                    ],
                ),
                (
                    PosTag::Pron,
                    &[
                        "i", "me", "you", "he", "him", "she", "her", "it", "we", "us", "they",
                        "them", "myself", "yourself", "himself", "herself", "itself",
                        "ourselves", "themselves", "mine", "yours", "hers", "ours", "theirs",
                        "who", "whom", "whose", "what", "which", "someone", "anyone",
                        "everyone", "nobody", "something", "anything", "everything", "nothing",
                    ],
                ),
                (
                    PosTag::Adp,
                    &[
                        "in", "on", "at", "by", "for", "with", "about", "against", "between",
                        "into", "through", "during", "before", "after", "above", "below",
                        "from", "up", "down", "of", "off", "over", "under", "around", "among",
                        "across", "behind", "beyond", "near", "onto", "toward", "towards",
                        "upon", "within", "without", "via", "per",
                    ],
                ),
                (PosTag::Cconj, &["and", "or", "but", "nor", "yet", "so", "plus"]),
                (
                    PosTag::Sconj,
                    &[
                        "if", "because", "although", "though", "while", "whereas", "unless",
                        "since", "until", "whether", "once", "than", "when", "where",
                    ],
                ),
                (
                    PosTag::Aux,
                    &[
                        "is", "am", "are", "was", "were", "be", "been", "being", "has", "have",
                        "had", "do", "does", "did", "will", "would", "shall", "should", "can",
                        "could", "may", "might", "must", "isn't", "aren't", "wasn't",
                        "weren't", "don't", "doesn't", "didn't", "won't", "can't", "couldn't",
                        "shouldn't", "wouldn't", "hasn't", "haven't",
                    ],
                ),
                (PosTag::Part, &["to", "not", "n't", "'s"]),
                (
                    PosTag::Intj,
                    &["oh", "wow", "hey", "hello", "hi", "yes", "ouch", "oops", "hmm", "ugh"],
                ),
                (
                    PosTag::Num,
                    &[
                        "one", "two", "three", "four", "five", "six", "seven", "eight", "nine",
                        "ten", "eleven", "twelve", "twenty", "thirty", "hundred", "thousand",
                        "million", "billion",
                    ],
                ),
                (
                    PosTag::Adv,
                    &[
                        "very", "too", "also", "just", "only", "even", "still", "already",
                        "again", "never", "always", "often", "sometimes", "soon", "now",
                        "then", "here", "there", "quite", "rather", "almost", "perhaps",
                        "maybe", "well", "much", "more", "most", "less", "least", "really",
                        "yesterday", "today", "tomorrow", "tonight",
                    ],
                ),
                (
                    PosTag::Adj,
                    &[
                        "good", "great", "bad", "new", "old", "big", "small", "large", "little",
                        "long", "short", "high", "low", "young", "early", "late", "important",
                        "different", "same", "easy", "hard", "difficult", "simple", "fast",
                        "slow", "happy", "sad", "nice", "poor", "rich", "free", "full", "open",
                        "ready", "right", "wrong", "real", "true", "false", "best", "better",
                        "worse", "worst", "excellent", "terrible", "awful", "amazing",
                        "wonderful", "horrible", "clear", "quick", "strong", "weak", "broken",
                        "awesome", "brilliant", "fantastic", "lovely", "ugly", "angry",
                        "urgent", "main", "major", "minor", "whole", "next", "last", "first",
                    ],
                ),
                (
                    PosTag::Verb,
                    &[
                        "go", "went", "gone", "get", "got", "make", "made", "take", "took",
                        "come", "came", "see", "saw", "seen", "know", "knew", "think",
                        "thought", "say", "said", "tell", "told", "find", "found", "give",
                        "gave", "use", "want", "need", "try", "call", "ask", "work", "feel",
                        "felt", "leave", "left", "put", "mean", "keep", "kept", "let", "begin",
                        "began", "seem", "help", "show", "hear", "heard", "run", "ran", "move",
                        "live", "believe", "bring", "brought", "write", "wrote", "written",
                        "fix", "deploy", "build", "built", "ship", "love", "hate", "like",
                        "meet", "met", "discuss", "review", "plan", "add", "remove", "update",
                    ],
                ),
            ];
            for (tag, words) in groups {
                for word in words {
                    map.entry(*word).or_insert(tag);
                }
            }
            map
        });
        MAP.get(word).copied()
    }

    /// Abbreviations that end with a period but do not end a sentence
    pub fn abbreviations() -> &'static HashSet<&'static str> {
        static SET: Lazy<HashSet<&'static str>> = Lazy::new(|| {
            set(&[
                "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "vs", "etc", "inc", "ltd",
                "corp", "co", "e.g", "i.e", "approx", "dept", "fig",
            ])
        });
        &SET
    }

    /// Function words ignored by keyword discovery
    pub fn stopwords() -> &'static HashSet<&'static str> {
        static SET: Lazy<HashSet<&'static str>> = Lazy::new(|| {
            set(&[
                "a", "an", "the", "and", "or", "but", "if", "then", "else", "of", "to", "in",
                "on", "at", "by", "for", "with", "from", "as", "is", "are", "was", "were",
                "be", "been", "being", "it", "its", "this", "that", "these", "those", "i",
                "you", "he", "she", "we", "they", "me", "him", "her", "us", "them", "my",
                "your", "our", "their", "do", "does", "did", "have", "has", "had", "not",
                "no", "so", "too", "very", "can", "will", "just", "also", "there", "here",
                "what", "which", "who", "when", "where", "why", "how", "all", "any", "some",
                "get", "got", "make", "made", "thing", "things", "lot",
            ])
        });
        &SET
    }
}

/// Irregular inflections mapped to their lemma
pub struct MorphologyDictionaries;

impl MorphologyDictionaries {
    pub fn irregular_lemmas() -> &'static HashMap<&'static str, &'static str> {
        static MAP: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
            [
                ("am", "be"),
                ("is", "be"),
                ("are", "be"),
                ("was", "be"),
                ("were", "be"),
                ("been", "be"),
                ("being", "be"),
                ("has", "have"),
                ("had", "have"),
                ("does", "do"),
                ("did", "do"),
                ("done", "do"),
                ("went", "go"),
                ("gone", "go"),
                ("goes", "go"),
                ("got", "get"),
                ("gotten", "get"),
                ("made", "make"),
                ("took", "take"),
                ("taken", "take"),
                ("came", "come"),
                ("saw", "see"),
                ("seen", "see"),
                ("knew", "know"),
                ("known", "know"),
                ("thought", "think"),
                ("said", "say"),
                ("told", "tell"),
                ("found", "find"),
                ("gave", "give"),
                ("given", "give"),
                ("felt", "feel"),
                ("left", "leave"),
                ("kept", "keep"),
                ("began", "begin"),
                ("begun", "begin"),
                ("heard", "hear"),
                ("ran", "run"),
                ("brought", "bring"),
                ("wrote", "write"),
                ("written", "write"),
                ("built", "build"),
                ("met", "meet"),
                ("bought", "buy"),
                ("paid", "pay"),
                ("sent", "send"),
                ("spent", "spend"),
                ("led", "lead"),
                ("held", "hold"),
                ("stood", "stand"),
                ("understood", "understand"),
                ("children", "child"),
                ("people", "person"),
                ("men", "man"),
                ("women", "woman"),
                ("mice", "mouse"),
                ("feet", "foot"),
                ("teeth", "tooth"),
                ("geese", "goose"),
                ("data", "datum"),
                ("analyses", "analysis"),
                ("better", "good"),
                ("best", "good"),
                ("worse", "bad"),
                ("worst", "bad"),
            ]
            .into_iter()
            .collect()
        });
        &MAP
    }
}

/// Entity recognition dictionaries
pub struct EntityDictionaries;

impl EntityDictionaries {
    /// Common person titles and honorifics
    pub fn person_titles() -> &'static HashSet<&'static str> {
        static SET: Lazy<HashSet<&'static str>> = Lazy::new(|| {
            set(&[
                "mr", "mrs", "ms", "miss", "dr", "prof", "professor", "sir", "madam", "lord",
                "lady", "captain", "colonel", "general", "president", "senator", "governor",
                "judge", "reverend",
            ])
        });
        &SET
    }

    /// Frequent given names; a capitalized pair starting with one is a person
    pub fn given_names() -> &'static HashSet<&'static str> {
        static SET: Lazy<HashSet<&'static str>> = Lazy::new(|| {
            set(&[
                "james", "john", "robert", "michael", "william", "david", "richard", "joseph",
                "thomas", "charles", "mary", "patricia", "jennifer", "linda", "elizabeth",
                "barbara", "susan", "jessica", "sarah", "karen", "anna", "emma", "olivia",
                "sophia", "alice", "bob", "carol", "dave", "eve", "frank", "grace", "henry",
                "jane", "kate", "laura", "mark", "nina", "paul", "peter", "rachel", "sam",
                "tom", "maria", "ana", "carlos", "luis", "chen", "wei", "yuki", "priya",
            ])
        });
        &SET
    }

    /// Organization suffixes and indicators
    pub fn organization_indicators() -> &'static HashSet<&'static str> {
        static SET: Lazy<HashSet<&'static str>> = Lazy::new(|| {
            set(&[
                "inc", "corp", "corporation", "company", "co", "ltd", "limited", "llc", "llp",
                "plc", "gmbh", "ag", "group", "holdings", "industries", "enterprises",
                "foundation", "institute", "association", "organization", "university",
                "college", "labs", "laboratory", "agency", "bureau", "commission",
                "committee", "council", "bank", "technologies", "systems",
            ])
        });
        &SET
    }

    /// Well-known organizations recognised by name alone
    pub fn known_organizations() -> &'static HashSet<&'static str> {
        static SET: Lazy<HashSet<&'static str>> = Lazy::new(|| {
            set(&[
                "google", "microsoft", "apple", "amazon", "meta", "facebook", "netflix",
                "ibm", "intel", "nvidia", "oracle", "github", "gitlab", "mozilla", "openai",
                "nasa", "un", "who", "nato", "unesco", "fbi", "cia",
            ])
        });
        &SET
    }

    /// Countries, regions and large cities
    pub fn known_locations() -> &'static HashSet<&'static str> {
        static SET: Lazy<HashSet<&'static str>> = Lazy::new(|| {
            set(&[
                "london", "paris", "berlin", "madrid", "rome", "tokyo", "beijing", "delhi",
                "mumbai", "sydney", "toronto", "chicago", "boston", "seattle", "austin",
                "new york", "los angeles", "san francisco", "amsterdam", "lisbon", "dublin",
                "england", "france", "germany", "spain", "italy", "japan", "china", "india",
                "brazil", "canada", "mexico", "australia", "ireland", "portugal", "europe",
                "asia", "africa", "america", "usa", "uk",
            ])
        });
        &SET
    }

    /// Location type indicators
    pub fn location_indicators() -> &'static HashSet<&'static str> {
        static SET: Lazy<HashSet<&'static str>> = Lazy::new(|| {
            set(&[
                "city", "town", "village", "county", "state", "province", "region",
                "district", "island", "mountain", "river", "lake", "ocean", "sea", "bay",
                "street", "avenue", "road", "boulevard", "square", "park",
            ])
        });
        &SET
    }

    /// Month and weekday names
    pub fn calendar_words() -> &'static HashSet<&'static str> {
        static SET: Lazy<HashSet<&'static str>> = Lazy::new(|| {
            set(&[
                "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday",
                "january", "february", "march", "april", "june", "july", "august",
                "september", "october", "november", "december", "yesterday", "today",
                "tomorrow",
            ])
        });
        &SET
    }
}

/// Lexicon for rule-of-thumb sentiment scoring
pub struct SentimentLexicon;

impl SentimentLexicon {
    /// Word valence in roughly [-3, 3]
    pub fn valence(word: &str) -> Option<f64> {
        static MAP: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
            [
                ("good", 1.9),
                ("great", 3.1),
                ("excellent", 3.2),
                ("amazing", 2.8),
                ("awesome", 3.1),
                ("fantastic", 2.6),
                ("wonderful", 2.7),
                ("brilliant", 2.8),
                ("lovely", 2.8),
                ("love", 3.2),
                ("like", 1.5),
                ("happy", 2.7),
                ("glad", 2.0),
                ("nice", 1.8),
                ("best", 3.2),
                ("better", 1.9),
                ("success", 2.7),
                ("successful", 2.8),
                ("win", 2.8),
                ("improve", 1.9),
                ("improved", 2.1),
                ("helpful", 1.8),
                ("easy", 1.9),
                ("fast", 1.0),
                ("clean", 1.7),
                ("fun", 2.3),
                ("thanks", 1.9),
                ("enjoy", 2.2),
                ("productive", 1.8),
                ("calm", 1.3),
                ("bad", -2.5),
                ("terrible", -2.1),
                ("awful", -2.0),
                ("horrible", -2.5),
                ("hate", -2.7),
                ("sad", -2.1),
                ("angry", -2.3),
                ("worse", -2.1),
                ("worst", -3.1),
                ("fail", -2.5),
                ("failed", -2.3),
                ("failure", -2.3),
                ("broken", -2.2),
                ("bug", -1.2),
                ("crash", -1.7),
                ("problem", -1.7),
                ("issue", -0.8),
                ("slow", -0.9),
                ("difficult", -1.3),
                ("hard", -0.4),
                ("annoying", -1.7),
                ("frustrating", -2.0),
                ("frustrated", -2.0),
                ("stress", -1.8),
                ("stressful", -2.1),
                ("ugly", -2.3),
                ("poor", -2.1),
                ("wrong", -2.1),
                ("tired", -1.9),
                ("worried", -1.8),
                ("blocked", -1.3),
                ("late", -0.8),
            ]
            .into_iter()
            .collect()
        });
        MAP.get(word).copied()
    }

    /// Words that flip the valence of what follows
    pub fn negations() -> &'static HashSet<&'static str> {
        static SET: Lazy<HashSet<&'static str>> = Lazy::new(|| {
            set(&[
                "not", "no", "never", "n't", "don't", "doesn't", "didn't", "isn't", "aren't",
                "wasn't", "weren't", "won't", "can't", "cannot", "without", "hardly",
            ])
        });
        &SET
    }

    /// Intensity multipliers
    pub fn intensifier(word: &str) -> Option<f64> {
        match word {
            "very" | "really" | "extremely" | "incredibly" | "so" | "super" => Some(1.3),
            "totally" | "absolutely" | "completely" => Some(1.4),
            "slightly" | "somewhat" | "barely" | "kinda" => Some(0.6),
            _ => None,
        }
    }
}
