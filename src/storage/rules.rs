//! JSON rule store
//!
//! Holds rules and groups in memory and persists the whole document after
//! every successful mutation. Unknown top-level `settings` are carried through
//! untouched.

use super::{atomic_write, load_json_or_default};
use crate::error::{AutotagError, Result};
use crate::matching::parse_pos_pattern;
use crate::reconcile::markup::{is_valid_tag, normalize_tag};
use crate::types::{
    EntityType, Group, ImportReport, Rule, RuleDraft, RuleFilter, RuleKind, RulePatch, RuleStats,
    Validation,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Maximum slug length before the kind prefix
const MAX_SLUG_LEN: usize = 50;

/// On-disk rules document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RulesDocument {
    #[serde(default)]
    rules: Vec<Rule>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    groups: BTreeMap<String, Group>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    settings: Option<serde_json::Value>,
}

/// Export bundle: rules and groups, no settings
#[derive(Debug, Serialize)]
struct ExportBundle<'a> {
    rules: &'a [Rule],
    #[serde(skip_serializing_if = "no_groups")]
    groups: &'a BTreeMap<String, Group>,
}

fn no_groups(groups: &&BTreeMap<String, Group>) -> bool {
    groups.is_empty()
}

impl RulesDocument {
    fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == id)
    }

    /// `{kind}-{slug}`, suffixed `-2`, `-3`, ... on collision
    fn generate_id(&self, kind: RuleKind, match_text: &str) -> String {
        let slug = slugify(match_text);
        let base = if slug.is_empty() {
            format!("{}-rule", kind)
        } else {
            format!("{}-{}", kind, slug)
        };

        if self.get(&base).is_none() {
            return base;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{}-{}", base, n);
            if self.get(&candidate).is_none() {
                return candidate;
            }
            n += 1;
        }
    }

    fn register_groups(&mut self, groups: &[String]) {
        for name in groups {
            self.groups.entry(name.clone()).or_default();
        }
    }
}

/// Lowercase, dash-separated form of `text`, at most 50 characters
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.to_lowercase().chars() {
        if c.is_alphanumeric() {
            slug.push(c);
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }

    let trimmed: String = slug.trim_matches('-').chars().take(MAX_SLUG_LEN).collect();
    trimmed.trim_matches('-').to_string()
}

/// Every problem with a draft, in a stable order
pub fn validate_draft(draft: &RuleDraft) -> Vec<String> {
    let mut errors = Vec::new();

    let kind = match draft.kind.parse::<RuleKind>() {
        Ok(kind) => Some(kind),
        Err(e) => {
            errors.push(e);
            None
        }
    };

    let match_text = draft.match_text.trim();
    if match_text.is_empty() {
        errors.push("match must not be empty".to_string());
    } else {
        match kind {
            Some(RuleKind::Pattern) => {
                if let Err(e) = parse_pos_pattern(match_text) {
                    errors.push(match e {
                        AutotagError::InvalidPattern(msg) => msg,
                        other => other.to_string(),
                    });
                }
            }
            Some(RuleKind::Keyword) if match_text.split_whitespace().count() > 1 => {
                errors.push(format!(
                    "keyword rules match a single word; use a literal rule for '{}'",
                    match_text
                ));
            }
            Some(RuleKind::Entity) => {
                if let Err(e) = match_text.parse::<EntityType>() {
                    errors.push(e);
                }
            }
            _ => {}
        }
    }

    if draft.lemma && draft.stem {
        errors.push("lemma and stem are mutually exclusive".to_string());
    }
    if (draft.lemma || draft.stem) && kind.is_some_and(|k| k != RuleKind::Keyword) {
        errors.push("lemma and stem only apply to keyword rules".to_string());
    }

    if draft.tags.is_empty() {
        errors.push("tags must not be empty".to_string());
    }
    for raw in &draft.tags {
        if !is_valid_tag(&normalize_tag(raw)) {
            errors.push(format!("invalid tag '{}' (allowed: letters, digits, _ / -)", raw.trim()));
        }
    }

    if draft.groups.iter().any(|g| g.trim().is_empty()) {
        errors.push("group names must not be empty".to_string());
    }

    if let Some(filters) = &draft.filters {
        if filters.require_entity.iter().any(|f| f.types.is_empty()) {
            errors.push("requireEntity entries need at least one entity type".to_string());
        }
        if let Some(sentiment) = &filters.sentiment {
            for (label, bound) in [("min", sentiment.min), ("max", sentiment.max)] {
                if let Some(value) = bound {
                    if !(-1.0..=1.0).contains(&value) {
                        errors.push(format!("sentiment {} must be within [-1, 1], got {}", label, value));
                    }
                }
            }
            if let (Some(min), Some(max)) = (sentiment.min, sentiment.max) {
                if min > max {
                    errors.push(format!("sentiment min {} exceeds max {}", min, max));
                }
            }
        }
    }

    errors
}

/// Deduplicated normalised tags, in first-seen order
fn normalize_tags(raw: &[String]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    raw.iter()
        .map(|t| normalize_tag(t))
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

fn normalize_groups(raw: &[String]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    raw.iter()
        .map(|g| g.trim().to_string())
        .filter(|g| seen.insert(g.clone()))
        .collect()
}

fn build_rule(doc: &RulesDocument, draft: RuleDraft) -> Result<Rule> {
    let errors = validate_draft(&draft);
    if !errors.is_empty() {
        return Err(AutotagError::Validation(errors));
    }
    let kind: RuleKind = draft.kind.parse().map_err(|e: String| AutotagError::Validation(vec![e]))?;
    let match_text = draft.match_text.trim().to_string();

    Ok(Rule {
        id: doc.generate_id(kind, &match_text),
        kind,
        match_text,
        lemma: draft.lemma,
        stem: draft.stem,
        filters: draft.filters.filter(|f| !f.is_empty()),
        tags: normalize_tags(&draft.tags),
        groups: normalize_groups(&draft.groups),
        enabled: draft.enabled,
        description: draft.description.filter(|d| !d.trim().is_empty()),
        created: draft.created.unwrap_or_else(Utc::now),
        modified: draft.modified,
    })
}

/// Persistent rule collection
pub struct RuleStore {
    path: PathBuf,
    doc: RulesDocument,
}

impl RuleStore {
    /// Open the store at `path`; missing or corrupt files load empty
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let doc: RulesDocument = load_json_or_default(&path, "rules");
        debug!("Loaded {} rules from {}", doc.rules.len(), path.display());
        Self { path, doc }
    }

    /// Persist `doc` and make it current; on failure the store is unchanged
    fn commit(&mut self, doc: RulesDocument) -> Result<()> {
        let json = serde_json::to_vec_pretty(&doc)?;
        atomic_write(&self.path, &json)?;
        debug!("Persisted {} rules to {}", doc.rules.len(), self.path.display());
        self.doc = doc;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rules(&self) -> &[Rule] {
        &self.doc.rules
    }

    pub fn enabled_rules(&self) -> Vec<Rule> {
        self.doc.rules.iter().filter(|r| r.enabled).cloned().collect()
    }

    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.doc.get(id)
    }

    pub fn list(&self, filter: &RuleFilter) -> Vec<&Rule> {
        self.doc.rules.iter().filter(|r| filter.matches(r)).collect()
    }

    pub fn validate(&self, draft: &RuleDraft) -> Validation {
        Validation::from_errors(validate_draft(draft))
    }

    /// Validate a draft, assign an id and persist
    pub fn add(&mut self, draft: RuleDraft) -> Result<Rule> {
        let mut doc = self.doc.clone();
        let rule = build_rule(&doc, draft)?;
        doc.register_groups(&rule.groups);
        doc.rules.push(rule.clone());
        self.commit(doc)?;
        info!("Added rule {}", rule.id);
        Ok(rule)
    }

    /// Apply a patch; `Ok(None)` when no rule has this id
    pub fn update(&mut self, id: &str, patch: RulePatch) -> Result<Option<Rule>> {
        let Some(index) = self.doc.rules.iter().position(|r| r.id == id) else {
            return Ok(None);
        };

        let current = &self.doc.rules[index];
        let mut draft = RuleDraft::from(current);
        if let Some(match_text) = patch.match_text {
            draft.match_text = match_text;
        }
        if let Some(lemma) = patch.lemma {
            draft.lemma = lemma;
        }
        if let Some(stem) = patch.stem {
            draft.stem = stem;
        }
        if let Some(filters) = patch.filters {
            draft.filters = Some(filters);
        }
        if let Some(tags) = patch.tags {
            draft.tags = tags;
        }
        if let Some(groups) = patch.groups {
            draft.groups = groups;
        }
        if let Some(enabled) = patch.enabled {
            draft.enabled = enabled;
        }
        if let Some(description) = patch.description {
            draft.description = Some(description);
        }

        let errors = validate_draft(&draft);
        if !errors.is_empty() {
            return Err(AutotagError::Validation(errors));
        }

        let updated = Rule {
            id: current.id.clone(),
            kind: current.kind,
            match_text: draft.match_text.trim().to_string(),
            lemma: draft.lemma,
            stem: draft.stem,
            filters: draft.filters.filter(|f| !f.is_empty()),
            tags: normalize_tags(&draft.tags),
            groups: normalize_groups(&draft.groups),
            enabled: draft.enabled,
            description: draft.description.filter(|d| !d.trim().is_empty()),
            created: current.created,
            modified: Some(Utc::now()),
        };

        let mut doc = self.doc.clone();
        doc.register_groups(&updated.groups);
        doc.rules[index] = updated.clone();
        self.commit(doc)?;
        Ok(Some(updated))
    }

    pub fn remove(&mut self, id: &str) -> Result<bool> {
        if self.doc.get(id).is_none() {
            return Ok(false);
        }
        let mut doc = self.doc.clone();
        doc.rules.retain(|r| r.id != id);
        self.commit(doc)?;
        info!("Removed rule {}", id);
        Ok(true)
    }

    pub fn set_enabled(&mut self, id: &str, enabled: bool) -> Result<Option<Rule>> {
        self.update(
            id,
            RulePatch {
                enabled: Some(enabled),
                ..Default::default()
            },
        )
    }

    pub fn stats(&self) -> RuleStats {
        let mut by_kind = BTreeMap::new();
        for rule in &self.doc.rules {
            *by_kind.entry(rule.kind).or_insert(0) += 1;
        }
        let enabled = self.doc.rules.iter().filter(|r| r.enabled).count();

        RuleStats {
            total: self.doc.rules.len(),
            enabled,
            disabled: self.doc.rules.len() - enabled,
            by_kind,
            groups: self.doc.groups.len(),
        }
    }

    /// Tags declared by any stored rule, enabled or not
    pub fn managed_tags(&self) -> BTreeSet<String> {
        crate::reconcile::managed_tags(&self.doc.rules)
    }

    pub fn groups(&self) -> &BTreeMap<String, Group> {
        &self.doc.groups
    }

    /// Create or replace a group
    pub fn add_group(&mut self, name: &str, group: Group) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AutotagError::Validation(vec!["group names must not be empty".to_string()]));
        }
        let invalid: Vec<String> = group
            .additional_tags
            .iter()
            .filter(|t| !is_valid_tag(&normalize_tag(t)))
            .map(|t| format!("invalid tag '{}'", t))
            .collect();
        if !invalid.is_empty() {
            return Err(AutotagError::Validation(invalid));
        }

        let group = Group {
            additional_tags: normalize_tags(&group.additional_tags),
            ..group
        };
        let mut doc = self.doc.clone();
        doc.groups.insert(name.to_string(), group);
        self.commit(doc)
    }

    /// Delete a group and strip it from every rule
    pub fn remove_group(&mut self, name: &str) -> Result<bool> {
        let mut doc = self.doc.clone();
        let mut found = doc.groups.remove(name).is_some();
        for rule in &mut doc.rules {
            let before = rule.groups.len();
            rule.groups.retain(|g| g != name);
            found |= rule.groups.len() != before;
        }
        if found {
            self.commit(doc)?;
        }
        Ok(found)
    }

    /// Pretty JSON bundle of rules and groups
    pub fn export(&self) -> Result<String> {
        let bundle = ExportBundle {
            rules: &self.doc.rules,
            groups: &self.doc.groups,
        };
        Ok(serde_json::to_string_pretty(&bundle)?)
    }

    /// Best-effort import of an export bundle or a bare array of rules
    ///
    /// Ids are regenerated. Invalid records are skipped and reported; the
    /// rest are persisted together.
    pub fn import(&mut self, json: &str) -> Result<ImportReport> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let (records, groups) = match value {
            serde_json::Value::Array(records) => (records, serde_json::Map::new()),
            serde_json::Value::Object(mut bundle) => {
                let records = match bundle.remove("rules") {
                    Some(serde_json::Value::Array(records)) => records,
                    _ => {
                        return Err(AutotagError::Validation(vec![
                            "import expects an array of rules or an object with a 'rules' array".to_string(),
                        ]))
                    }
                };
                let groups = match bundle.remove("groups") {
                    Some(serde_json::Value::Object(groups)) => groups,
                    _ => serde_json::Map::new(),
                };
                (records, groups)
            }
            _ => {
                return Err(AutotagError::Validation(vec![
                    "import expects an array of rules or an object with a 'rules' array".to_string(),
                ]))
            }
        };

        let mut doc = self.doc.clone();
        let mut report = ImportReport::default();
        let mut changed = false;

        for (name, value) in groups {
            match serde_json::from_value::<Group>(value) {
                Ok(group) if !doc.groups.contains_key(&name) => {
                    doc.groups.insert(name, group);
                    changed = true;
                }
                Ok(_) => {}
                Err(e) => report.errors.push(format!("group '{}': {}", name, e)),
            }
        }

        for (index, record) in records.into_iter().enumerate() {
            let draft = match serde_json::from_value::<RuleDraft>(record) {
                Ok(draft) => draft,
                Err(e) => {
                    report.skipped += 1;
                    report.errors.push(format!("rule {}: {}", index + 1, e));
                    continue;
                }
            };

            match build_rule(&doc, draft) {
                Ok(rule) => {
                    doc.register_groups(&rule.groups);
                    doc.rules.push(rule);
                    report.imported += 1;
                    changed = true;
                }
                Err(AutotagError::Validation(errors)) => {
                    report.skipped += 1;
                    report.errors.push(format!("rule {}: {}", index + 1, errors.join("; ")));
                }
                Err(e) => return Err(e),
            }
        }

        if changed {
            self.commit(doc)?;
        }
        if report.skipped > 0 {
            warn!("Import skipped {} invalid rule(s)", report.skipped);
        }
        info!("Imported {} rule(s)", report.imported);
        Ok(report)
    }
}
