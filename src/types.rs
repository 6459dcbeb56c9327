//! Core data types for the autotag system
//!
//! This module defines the rule model persisted by the rule store, the filter
//! vocabulary (POS tags, entity types, scopes) shared by the match and filter
//! pipeline, and the reports produced by reconciliation. The serialized shape of
//! these types is the on-disk format of the rules file.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Rule kind discriminant
///
/// Each kind selects one matching strategy in the match engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    /// Sequence of part-of-speech tags, e.g. `ADJ NOUN`
    Pattern,

    /// Single word compared per token (surface, lemma or stem)
    Keyword,

    /// Case-insensitive phrase search
    Literal,

    /// Named entity of a given type
    Entity,
}

impl RuleKind {
    /// All rule kinds, in display order
    pub const ALL: [RuleKind; 4] = [
        RuleKind::Pattern,
        RuleKind::Keyword,
        RuleKind::Literal,
        RuleKind::Entity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::Pattern => "pattern",
            RuleKind::Keyword => "keyword",
            RuleKind::Literal => "literal",
            RuleKind::Entity => "entity",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pattern" => Ok(RuleKind::Pattern),
            "keyword" => Ok(RuleKind::Keyword),
            "literal" => Ok(RuleKind::Literal),
            "entity" => Ok(RuleKind::Entity),
            other => Err(format!(
                "unknown rule type '{}' (expected pattern, keyword, literal or entity)",
                other
            )),
        }
    }
}

/// Universal part-of-speech tag set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PosTag {
    Adj,
    Adp,
    Adv,
    Aux,
    Cconj,
    Det,
    Intj,
    Noun,
    Num,
    Part,
    Pron,
    Propn,
    Punct,
    Sconj,
    Sym,
    Verb,
    X,
}

impl PosTag {
    pub const ALL: [PosTag; 17] = [
        PosTag::Adj,
        PosTag::Adp,
        PosTag::Adv,
        PosTag::Aux,
        PosTag::Cconj,
        PosTag::Det,
        PosTag::Intj,
        PosTag::Noun,
        PosTag::Num,
        PosTag::Part,
        PosTag::Pron,
        PosTag::Propn,
        PosTag::Punct,
        PosTag::Sconj,
        PosTag::Sym,
        PosTag::Verb,
        PosTag::X,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PosTag::Adj => "ADJ",
            PosTag::Adp => "ADP",
            PosTag::Adv => "ADV",
            PosTag::Aux => "AUX",
            PosTag::Cconj => "CCONJ",
            PosTag::Det => "DET",
            PosTag::Intj => "INTJ",
            PosTag::Noun => "NOUN",
            PosTag::Num => "NUM",
            PosTag::Part => "PART",
            PosTag::Pron => "PRON",
            PosTag::Propn => "PROPN",
            PosTag::Punct => "PUNCT",
            PosTag::Sconj => "SCONJ",
            PosTag::Sym => "SYM",
            PosTag::Verb => "VERB",
            PosTag::X => "X",
        }
    }

    /// Content words carry meaning on their own (used by keyword discovery)
    pub fn is_content_word(&self) -> bool {
        matches!(
            self,
            PosTag::Noun | PosTag::Propn | PosTag::Adj | PosTag::Verb
        )
    }
}

impl fmt::Display for PosTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PosTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        PosTag::ALL
            .iter()
            .copied()
            .find(|tag| tag.as_str() == upper)
            .ok_or_else(|| format!("unknown POS tag '{}'", s.trim()))
    }
}

/// Named entity categories understood by entity rules and filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityType {
    Person,
    Org,
    Location,
    Date,
    Time,
    Money,
    Percent,
    Email,
    Url,
}

impl EntityType {
    pub const ALL: [EntityType; 9] = [
        EntityType::Person,
        EntityType::Org,
        EntityType::Location,
        EntityType::Date,
        EntityType::Time,
        EntityType::Money,
        EntityType::Percent,
        EntityType::Email,
        EntityType::Url,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Person => "PERSON",
            EntityType::Org => "ORG",
            EntityType::Location => "LOCATION",
            EntityType::Date => "DATE",
            EntityType::Time => "TIME",
            EntityType::Money => "MONEY",
            EntityType::Percent => "PERCENT",
            EntityType::Email => "EMAIL",
            EntityType::Url => "URL",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PERSON" | "PEOPLE" | "PER" => Ok(EntityType::Person),
            "ORG" | "ORGANIZATION" | "ORGANISATION" | "COMPANY" => Ok(EntityType::Org),
            "LOCATION" | "LOC" | "PLACE" | "GPE" => Ok(EntityType::Location),
            "DATE" => Ok(EntityType::Date),
            "TIME" => Ok(EntityType::Time),
            "MONEY" => Ok(EntityType::Money),
            "PERCENT" | "PERCENTAGE" => Ok(EntityType::Percent),
            "EMAIL" => Ok(EntityType::Email),
            "URL" | "LINK" => Ok(EntityType::Url),
            _ => Err(format!("unknown entity type '{}'", s.trim())),
        }
    }
}

/// Span over which a filter is evaluated, anchored at an occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    #[default]
    Sentence,
    Paragraph,
    Document,
    Match,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Sentence => "sentence",
            Scope::Paragraph => "paragraph",
            Scope::Document => "document",
            Scope::Match => "match",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sentence" => Ok(Scope::Sentence),
            "paragraph" => Ok(Scope::Paragraph),
            "document" => Ok(Scope::Document),
            "match" => Ok(Scope::Match),
            other => Err(format!(
                "unknown scope '{}' (expected sentence, paragraph, document or match)",
                other
            )),
        }
    }
}

/// Entity existence requirement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityFilter {
    /// Accepted entity types (OR)
    pub types: Vec<EntityType>,

    /// Where to look; `None` means the whole document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<Scope>,
}

/// Inclusive sentiment bounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,

    #[serde(default)]
    pub scope: Scope,
}

/// Compound filter attached to a rule
///
/// Categories combine with AND; values inside `pos` combine with OR; the entity
/// types of all `require_entity` entries combine with OR.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSpec {
    /// Allowed POS tags (keyword occurrences only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pos: Vec<PosTag>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub require_entity: Vec<EntityFilter>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<SentimentFilter>,
}

impl FilterSpec {
    /// True when no filter category is configured
    pub fn is_empty(&self) -> bool {
        self.pos.is_empty() && self.require_entity.is_empty() && self.sentiment.is_none()
    }
}

fn default_enabled() -> bool {
    true
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// A stored tagging rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    /// Unique id, derived from kind and match text
    pub id: String,

    #[serde(rename = "type")]
    pub kind: RuleKind,

    /// Match expression, interpreted according to `kind`
    #[serde(rename = "match")]
    pub match_text: String,

    /// Compare keyword tokens by lemma
    #[serde(default, skip_serializing_if = "is_false")]
    pub lemma: bool,

    /// Compare keyword tokens by stem
    #[serde(default, skip_serializing_if = "is_false")]
    pub stem: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<FilterSpec>,

    /// Tags applied when the rule fires (never empty)
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,

    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub created: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
}

impl Rule {
    /// Filters attached to the rule, if any are configured
    pub fn active_filters(&self) -> Option<&FilterSpec> {
        self.filters.as_ref().filter(|f| !f.is_empty())
    }

    pub fn in_group(&self, group: &str) -> bool {
        self.groups.iter().any(|g| g == group)
    }
}

/// Unvalidated rule input
///
/// `kind` stays a string so that an unknown rule type is reported as a
/// validation error alongside every other problem with the draft. Exported
/// rule records deserialize into drafts directly (the `id` is ignored).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleDraft {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(rename = "match")]
    pub match_text: String,

    #[serde(default)]
    pub lemma: bool,

    #[serde(default)]
    pub stem: bool,

    #[serde(default)]
    pub filters: Option<FilterSpec>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub groups: Vec<String>,

    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default)]
    pub description: Option<String>,

    /// Preserved on import; set to now when absent
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,

    #[serde(default)]
    pub modified: Option<DateTime<Utc>>,
}

impl RuleDraft {
    pub fn new(kind: impl Into<String>, match_text: impl Into<String>, tags: Vec<String>) -> Self {
        Self {
            kind: kind.into(),
            match_text: match_text.into(),
            lemma: false,
            stem: false,
            filters: None,
            tags,
            groups: Vec::new(),
            enabled: true,
            description: None,
            created: None,
            modified: None,
        }
    }

    pub fn with_lemma(mut self) -> Self {
        self.lemma = true;
        self
    }

    pub fn with_stem(mut self) -> Self {
        self.stem = true;
        self
    }

    pub fn with_filters(mut self, filters: FilterSpec) -> Self {
        self.filters = Some(filters);
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.groups.push(group.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

impl From<&Rule> for RuleDraft {
    fn from(rule: &Rule) -> Self {
        Self {
            kind: rule.kind.to_string(),
            match_text: rule.match_text.clone(),
            lemma: rule.lemma,
            stem: rule.stem,
            filters: rule.filters.clone(),
            tags: rule.tags.clone(),
            groups: rule.groups.clone(),
            enabled: rule.enabled,
            description: rule.description.clone(),
            created: Some(rule.created),
            modified: rule.modified,
        }
    }
}

/// Partial rule update; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RulePatch {
    pub match_text: Option<String>,
    pub lemma: Option<bool>,
    pub stem: Option<bool>,
    /// An empty spec clears the rule's filters
    pub filters: Option<FilterSpec>,
    pub tags: Option<Vec<String>>,
    pub groups: Option<Vec<String>>,
    pub enabled: Option<bool>,
    pub description: Option<String>,
}

/// Selection criteria for listing rules
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleFilter {
    pub enabled_only: bool,
    pub disabled_only: bool,
    pub group: Option<String>,
}

impl RuleFilter {
    pub fn matches(&self, rule: &Rule) -> bool {
        if self.enabled_only && !rule.enabled {
            return false;
        }
        if self.disabled_only && rule.enabled {
            return false;
        }
        match &self.group {
            Some(group) => rule.in_group(group),
            None => true,
        }
    }
}

/// Named rule collection used for organisation only
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

/// Outcome of validating a draft
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validation {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl Validation {
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Rule store counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleStats {
    pub total: usize,
    pub enabled: usize,
    pub disabled: usize,
    pub by_kind: BTreeMap<RuleKind, usize>,
    pub groups: usize,
}

/// Best-effort import summary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
    pub errors: Vec<String>,
}

/// One location where a rule's raw match condition holds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchOccurrence {
    pub text: String,

    /// Byte offset of the first matched byte
    pub start: usize,

    /// Byte offset one past the last matched byte
    pub end: usize,

    /// Present for keyword occurrences only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos_tags: Option<Vec<PosTag>>,
}

/// Change report for one document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationResult {
    pub modified: bool,
    pub added_tags: Vec<String>,
    pub removed_tags: Vec<String>,
    pub fired_rule_ids: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_kind_parsing() {
        assert_eq!("Keyword".parse::<RuleKind>().unwrap(), RuleKind::Keyword);
        assert!("regex".parse::<RuleKind>().is_err());
    }

    #[test]
    fn test_entity_type_aliases() {
        assert_eq!("organization".parse::<EntityType>().unwrap(), EntityType::Org);
        assert_eq!("gpe".parse::<EntityType>().unwrap(), EntityType::Location);
        assert!("planet".parse::<EntityType>().is_err());
    }

    #[test]
    fn test_rule_serialization_shape() {
        let rule = Rule {
            id: "keyword-docker".to_string(),
            kind: RuleKind::Keyword,
            match_text: "docker".to_string(),
            lemma: false,
            stem: false,
            filters: Some(FilterSpec {
                pos: vec![PosTag::Noun],
                require_entity: vec![EntityFilter {
                    types: vec![EntityType::Org],
                    scope: None,
                }],
                sentiment: None,
            }),
            tags: vec!["devops".to_string()],
            groups: Vec::new(),
            enabled: true,
            description: None,
            created: Utc::now(),
            modified: None,
        };

        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(json["type"], "keyword");
        assert_eq!(json["match"], "docker");
        assert_eq!(json["filters"]["pos"][0], "NOUN");
        assert_eq!(json["filters"]["requireEntity"][0]["types"][0], "ORG");
        assert!(json.get("lemma").is_none());

        let back: Rule = serde_json::from_value(json).unwrap();
        assert_eq!(back, rule);
    }

    #[test]
    fn test_draft_defaults_enabled() {
        let draft: RuleDraft =
            serde_json::from_str(r#"{"type":"literal","match":"stand up","tags":["meetings"]}"#)
                .unwrap();
        assert!(draft.enabled);
        assert!(draft.created.is_none());
    }

    #[test]
    fn test_rule_filter_matches() {
        let mut rule: Rule = serde_json::from_str(
            r#"{"id":"a","type":"literal","match":"x","tags":["t"],"groups":["work"],"created":"2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();

        let by_group = RuleFilter {
            group: Some("work".to_string()),
            ..Default::default()
        };
        assert!(by_group.matches(&rule));

        rule.enabled = false;
        let enabled_only = RuleFilter {
            enabled_only: true,
            ..Default::default()
        };
        assert!(!enabled_only.matches(&rule));
    }
}
