//! Rule-based named entity recognition
//!
//! Detects and classifies entities using local heuristics:
//! - PERSON: names with titles (Dr. Smith), known given name + surname
//! - ORG: capitalized runs ending in a suffix (Acme Corp), well-known names
//! - LOCATION: known places, capitalized words before a place indicator
//! - DATE/TIME/MONEY/PERCENT/EMAIL/URL: regex patterns
//!
//! Candidates below the confidence threshold are dropped and overlaps are
//! resolved in favour of the earlier, then more confident, candidate.

use super::dictionaries::EntityDictionaries;
use super::patterns::CommonPatterns;
use super::Entity;
use crate::types::EntityType;
use regex::Regex;

/// Rule-based entity recognizer
pub struct EntityRecognizer {
    /// Minimum confidence threshold
    threshold: f32,
}

impl EntityRecognizer {
    pub fn new() -> Self {
        Self { threshold: 0.6 }
    }

    /// Set confidence threshold
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Recognize entities in text
    pub fn recognize(&self, text: &str) -> Vec<Entity> {
        let mut entities = Vec::new();

        // Structured values first; they win ties against name heuristics
        entities.extend(Self::detect_pattern(text, CommonPatterns::url(), EntityType::Url, 0.98));
        entities.extend(Self::detect_pattern(text, CommonPatterns::email(), EntityType::Email, 0.98));
        entities.extend(Self::detect_pattern(text, CommonPatterns::money(), EntityType::Money, 0.95));
        entities.extend(Self::detect_pattern(text, CommonPatterns::percent(), EntityType::Percent, 0.95));
        entities.extend(Self::detect_pattern(text, CommonPatterns::date(), EntityType::Date, 0.95));
        entities.extend(Self::detect_pattern(text, CommonPatterns::time(), EntityType::Time, 0.9));
        entities.extend(self.detect_calendar_words(text));

        entities.extend(self.detect_persons_with_titles(text));
        entities.extend(self.detect_capitalized_runs(text));

        entities.retain(|e| e.confidence >= self.threshold);

        Self::resolve_overlaps(entities)
    }

    fn detect_pattern(text: &str, pattern: &Regex, entity_type: EntityType, confidence: f32) -> Vec<Entity> {
        pattern
            .find_iter(text)
            .map(|m| Entity {
                text: m.as_str().to_string(),
                entity_type,
                start: m.start(),
                end: m.end(),
                confidence,
            })
            .collect()
    }

    /// Weekday and month names, "today", "tomorrow"
    fn detect_calendar_words(&self, text: &str) -> Vec<Entity> {
        CommonPatterns::token()
            .find_iter(text)
            .filter(|m| EntityDictionaries::calendar_words().contains(m.as_str().to_lowercase().as_str()))
            .map(|m| Entity {
                text: m.as_str().to_string(),
                entity_type: EntityType::Date,
                start: m.start(),
                end: m.end(),
                confidence: 0.75,
            })
            .collect()
    }

    fn detect_persons_with_titles(&self, text: &str) -> Vec<Entity> {
        CommonPatterns::person_with_title()
            .find_iter(text)
            .map(|m| Entity {
                text: m.as_str().to_string(),
                entity_type: EntityType::Person,
                start: m.start(),
                end: m.end(),
                confidence: 0.9,
            })
            .collect()
    }

    /// Classify each run of capitalized words by its parts
    fn detect_capitalized_runs(&self, text: &str) -> Vec<Entity> {
        let mut entities = Vec::new();

        for run in CommonPatterns::capitalized_run().find_iter(text) {
            let words: Vec<&str> = run.as_str().split_whitespace().collect();
            let lower: Vec<String> = words.iter().map(|w| w.to_lowercase()).collect();
            let joined = lower.join(" ");
            let sentence_initial = is_sentence_initial(text, run.start());

            let classified = if EntityDictionaries::organization_indicators()
                .contains(lower[lower.len() - 1].trim_end_matches('.'))
                && words.len() > 1
            {
                Some((EntityType::Org, 0.85))
            } else if EntityDictionaries::known_locations().contains(joined.as_str()) {
                Some((EntityType::Location, 0.85))
            } else if words.len() == 1 && EntityDictionaries::known_organizations().contains(joined.as_str()) {
                Some((EntityType::Org, 0.8))
            } else if words.len() >= 2 && EntityDictionaries::given_names().contains(lower[0].as_str()) {
                Some((EntityType::Person, 0.8))
            } else if words.len() > 1 && EntityDictionaries::location_indicators().contains(lower[lower.len() - 1].as_str()) {
                Some((EntityType::Location, 0.75))
            } else if words.len() >= 2 && !sentence_initial {
                // Unexplained multi-word proper noun; below the default threshold
                Some((EntityType::Org, 0.5))
            } else {
                None
            };

            if let Some((entity_type, confidence)) = classified {
                entities.push(Entity {
                    text: run.as_str().to_string(),
                    entity_type,
                    start: run.start(),
                    end: run.end(),
                    confidence,
                });
                continue;
            }

            // Known names inside a longer run ("Meeting with Google")
            let mut offset = run.start();
            for word in run.as_str().split_whitespace() {
                let start = offset + text[offset..].find(word).unwrap_or(0);
                let end = start + word.len();
                offset = end;
                let lower = word.to_lowercase();

                let entity_type = if EntityDictionaries::known_organizations().contains(lower.as_str()) {
                    EntityType::Org
                } else if EntityDictionaries::known_locations().contains(lower.as_str()) {
                    EntityType::Location
                } else {
                    continue;
                };

                entities.push(Entity {
                    text: word.to_string(),
                    entity_type,
                    start,
                    end,
                    confidence: 0.8,
                });
            }
        }

        entities
    }

    /// Resolve overlapping entities (earliest start, then highest confidence)
    fn resolve_overlaps(mut entities: Vec<Entity>) -> Vec<Entity> {
        entities.sort_by(|a, b| {
            a.start
                .cmp(&b.start)
                .then_with(|| b.confidence.total_cmp(&a.confidence))
                .then_with(|| b.end.cmp(&a.end))
        });

        let mut resolved: Vec<Entity> = Vec::with_capacity(entities.len());
        let mut last_end = 0;

        for entity in entities {
            if resolved.is_empty() || entity.start >= last_end {
                last_end = entity.end;
                resolved.push(entity);
            }
        }

        resolved
    }
}

impl Default for EntityRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether `offset` starts a sentence (text start, or after terminal punctuation)
fn is_sentence_initial(text: &str, offset: usize) -> bool {
    let raw = &text[..offset];
    let before = raw.trim_end();
    before.is_empty() || before.ends_with(['.', '!', '?', ':']) || raw[before.len()..].contains('\n')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn of_type(entities: &[Entity], entity_type: EntityType) -> Vec<&str> {
        entities
            .iter()
            .filter(|e| e.entity_type == entity_type)
            .map(|e| e.text.as_str())
            .collect()
    }

    #[test]
    fn test_person_with_title() {
        let recognizer = EntityRecognizer::new();
        let entities = recognizer.recognize("Dr. Smith presented the research to Prof. Johnson");

        let persons = of_type(&entities, EntityType::Person);
        assert_eq!(persons, vec!["Dr. Smith", "Prof. Johnson"]);
    }

    #[test]
    fn test_given_name_pair() {
        let entities = EntityRecognizer::new().recognize("Notes from the call with Sarah Connor today");
        assert_eq!(of_type(&entities, EntityType::Person), vec!["Sarah Connor"]);
        assert_eq!(of_type(&entities, EntityType::Date), vec!["today"]);
    }

    #[test]
    fn test_temporal_detection() {
        let entities = EntityRecognizer::new().recognize("The meeting is on 2024-01-15 at 3:30 PM");

        assert_eq!(of_type(&entities, EntityType::Date), vec!["2024-01-15"]);
        assert_eq!(of_type(&entities, EntityType::Time), vec!["3:30 PM"]);
    }

    #[test]
    fn test_organization_detection() {
        let entities = EntityRecognizer::new().recognize("We signed with Acme Widget Corp and talked to Google");

        let orgs = of_type(&entities, EntityType::Org);
        assert!(orgs.contains(&"Acme Widget Corp"));
        assert!(orgs.contains(&"Google"));
    }

    #[test]
    fn test_locations() {
        let entities = EntityRecognizer::new().recognize("Flew from New York to Berlin.");
        assert_eq!(of_type(&entities, EntityType::Location), vec!["New York", "Berlin"]);
    }

    #[test]
    fn test_structured_values() {
        let entities = EntityRecognizer::new()
            .recognize("Budget $5,000 (up 12%) sent to ops@example.com via https://example.com/budget");

        assert_eq!(of_type(&entities, EntityType::Money), vec!["$5,000"]);
        assert_eq!(of_type(&entities, EntityType::Percent), vec!["12%"]);
        assert_eq!(of_type(&entities, EntityType::Email), vec!["ops@example.com"]);
        assert_eq!(of_type(&entities, EntityType::Url), vec!["https://example.com/budget"]);
    }

    #[test]
    fn test_plain_text_has_no_entities() {
        let entities = EntityRecognizer::new().recognize("Docker deployment meeting");
        assert!(entities.is_empty());
    }

    #[test]
    fn test_confidence_threshold() {
        let recognizer = EntityRecognizer::new().with_threshold(0.9);
        for entity in recognizer.recognize("Sarah Connor met Dr. Smith on 2024-01-15") {
            assert!(entity.confidence >= 0.9);
        }
    }

    #[test]
    fn test_overlap_resolution() {
        let entities = vec![
            Entity {
                text: "John".to_string(),
                entity_type: EntityType::Person,
                start: 0,
                end: 4,
                confidence: 0.7,
            },
            Entity {
                text: "John Smith".to_string(),
                entity_type: EntityType::Person,
                start: 0,
                end: 10,
                confidence: 0.9,
            },
        ];

        let resolved = EntityRecognizer::resolve_overlaps(entities);

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].text, "John Smith");
    }
}
