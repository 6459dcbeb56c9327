//! Shared helpers for CLI commands
//!
//! Argument parsing for filter flags and construction of the stores and
//! analyzer every command needs.

use autotag_core::{
    error::{AutotagError, Result},
    types::{EntityFilter, SentimentFilter},
    AliasStore, EntityType, FilterSpec, HeuristicAnalyzer, PosTag, RuleStore, Scope, Settings,
    TextAnalyzer,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Resolved settings plus the global path overrides
pub struct Context {
    pub settings: Settings,
    pub rules_path: PathBuf,
}

impl Context {
    pub fn load(config: Option<PathBuf>, rules: Option<PathBuf>) -> Result<Self> {
        let settings = Settings::load(config.as_deref())?;
        let rules_path = settings.rules_path(rules.as_deref());
        debug!("Using rules file: {}", rules_path.display());
        Ok(Self { settings, rules_path })
    }

    pub fn rule_store(&self) -> RuleStore {
        RuleStore::open(&self.rules_path)
    }

    pub fn alias_store(&self) -> AliasStore {
        AliasStore::open(self.settings.aliases_path())
    }

    /// Directory named by an optional alias argument
    pub fn resolve_dir(&self, alias: Option<&str>) -> Result<PathBuf> {
        let dir = self.alias_store().resolve(alias)?;
        debug!("Target directory: {}", dir.display());
        Ok(dir)
    }

    pub fn analyzer(&self) -> Arc<dyn TextAnalyzer> {
        Arc::new(HeuristicAnalyzer::new())
    }
}

/// Split a comma-separated list, dropping empty items
pub fn parse_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Split `value[:scope]`
fn split_scope(raw: &str) -> Result<(&str, Option<Scope>)> {
    match raw.rsplit_once(':') {
        Some((value, scope)) => {
            let scope = scope.parse::<Scope>().map_err(|e| AutotagError::Validation(vec![e]))?;
            Ok((value, Some(scope)))
        }
        None => Ok((raw, None)),
    }
}

/// `PERSON,ORG[:scope]`
pub fn parse_entity_requirement(raw: &str) -> Result<EntityFilter> {
    let (types, scope) = split_scope(raw)?;
    let mut errors = Vec::new();
    let mut parsed = Vec::new();

    for name in parse_csv(types) {
        match name.parse::<EntityType>() {
            Ok(t) => parsed.push(t),
            Err(e) => errors.push(e),
        }
    }
    if parsed.is_empty() && errors.is_empty() {
        errors.push(format!("no entity types in '{}'", raw));
    }
    if !errors.is_empty() {
        return Err(AutotagError::Validation(errors));
    }
    Ok(EntityFilter { types: parsed, scope })
}

fn parse_score(raw: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| AutotagError::Validation(vec![format!("invalid sentiment value '{}'", raw.trim())]))
}

/// Which sentiment flag a value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentimentBound {
    Min,
    Max,
    Between,
}

/// `N[:scope]` for min/max, `N,M[:scope]` for between
pub fn parse_sentiment(bound: SentimentBound, raw: &str) -> Result<SentimentFilter> {
    let (values, scope) = split_scope(raw)?;
    let scope = scope.unwrap_or_default();

    match bound {
        SentimentBound::Min => Ok(SentimentFilter {
            min: Some(parse_score(values)?),
            max: None,
            scope,
        }),
        SentimentBound::Max => Ok(SentimentFilter {
            min: None,
            max: Some(parse_score(values)?),
            scope,
        }),
        SentimentBound::Between => {
            let (low, high) = values.split_once(',').ok_or_else(|| {
                AutotagError::Validation(vec![format!("--sentiment-between expects N,M (got '{}')", raw)])
            })?;
            Ok(SentimentFilter {
                min: Some(parse_score(low)?),
                max: Some(parse_score(high)?),
                scope,
            })
        }
    }
}

/// Assemble a filter spec from the `tag when` flags; `None` when no flag is set
pub fn build_filters(
    pos: Option<&str>,
    require_entity: &[String],
    sentiment_min: Option<&str>,
    sentiment_max: Option<&str>,
    sentiment_between: Option<&str>,
) -> Result<Option<FilterSpec>> {
    let mut errors = Vec::new();
    let mut spec = FilterSpec::default();

    if let Some(pos) = pos {
        for tag in parse_csv(pos) {
            match tag.parse::<PosTag>() {
                Ok(t) => spec.pos.push(t),
                Err(e) => errors.push(e),
            }
        }
    }

    for raw in require_entity {
        match parse_entity_requirement(raw) {
            Ok(filter) => spec.require_entity.push(filter),
            Err(AutotagError::Validation(e)) => errors.extend(e),
            Err(e) => return Err(e),
        }
    }

    let bounds = [
        (SentimentBound::Min, sentiment_min),
        (SentimentBound::Max, sentiment_max),
        (SentimentBound::Between, sentiment_between),
    ];
    for (bound, raw) in bounds {
        let Some(raw) = raw else { continue };
        let parsed = match parse_sentiment(bound, raw) {
            Ok(parsed) => parsed,
            Err(AutotagError::Validation(e)) => {
                errors.extend(e);
                continue;
            }
            Err(e) => return Err(e),
        };
        spec.sentiment = Some(match spec.sentiment.take() {
            None => parsed,
            Some(existing) => {
                if existing.scope != parsed.scope {
                    errors.push("sentiment bounds use different scopes".to_string());
                }
                SentimentFilter {
                    min: parsed.min.or(existing.min),
                    max: parsed.max.or(existing.max),
                    scope: existing.scope,
                }
            }
        });
    }

    if !errors.is_empty() {
        return Err(AutotagError::Validation(errors));
    }
    Ok((!spec.is_empty()).then_some(spec))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_csv() {
        assert_eq!(parse_csv("a, b,,c "), vec!["a", "b", "c"]);
        assert!(parse_csv(" , ").is_empty());
    }

    #[test]
    fn test_entity_requirement_with_scope() {
        let filter = parse_entity_requirement("PERSON,org:sentence").unwrap();
        assert_eq!(filter.types, vec![EntityType::Person, EntityType::Org]);
        assert_eq!(filter.scope, Some(Scope::Sentence));

        let filter = parse_entity_requirement("LOCATION").unwrap();
        assert_eq!(filter.scope, None);

        assert!(parse_entity_requirement("PERSON:everywhere").is_err());
        assert!(parse_entity_requirement("WIZARD").is_err());
    }

    #[test]
    fn test_sentiment_flags() {
        let min = parse_sentiment(SentimentBound::Min, "0.2").unwrap();
        assert_eq!((min.min, min.max, min.scope), (Some(0.2), None, Scope::Sentence));

        let between = parse_sentiment(SentimentBound::Between, "-0.5,0.5:paragraph").unwrap();
        assert_eq!(
            (between.min, between.max, between.scope),
            (Some(-0.5), Some(0.5), Scope::Paragraph)
        );

        assert!(parse_sentiment(SentimentBound::Between, "0.5").is_err());
        assert!(parse_sentiment(SentimentBound::Max, "high").is_err());
    }

    #[test]
    fn test_build_filters_merges_and_collects_errors() {
        assert_eq!(build_filters(None, &[], None, None, None).unwrap(), None);

        let spec = build_filters(Some("NOUN,VERB"), &["PERSON".to_string()], Some("0.1"), Some("0.9"), None)
            .unwrap()
            .unwrap();
        assert_eq!(spec.pos, vec![PosTag::Noun, PosTag::Verb]);
        let sentiment = spec.sentiment.unwrap();
        assert_eq!((sentiment.min, sentiment.max), (Some(0.1), Some(0.9)));

        match build_filters(Some("NOUN,BOGUS"), &["WIZARD".to_string()], Some("x"), None, None) {
            Err(AutotagError::Validation(errors)) => assert_eq!(errors.len(), 3),
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
