//! Rule store persistence across files

mod common;

use autotag_core::{
    types::{EntityFilter, FilterSpec, Group},
    EntityType, Rule, RuleDraft, RuleStore, Scope,
};
use tempfile::TempDir;

fn tags(names: &[&str]) -> Vec<String> {
    names.iter().map(|t| t.to_string()).collect()
}

/// Rule content without the generated id
fn comparable(rules: &[Rule]) -> Vec<RuleDraft> {
    rules.iter().map(RuleDraft::from).collect()
}

#[test]
fn test_export_import_round_trip() {
    let dir = TempDir::new().unwrap();
    let mut source = RuleStore::open(dir.path().join("source.json"));

    source
        .add(RuleDraft::new("keyword", "meeting", tags(&["meetings"])).with_lemma().with_group("work"))
        .unwrap();
    source
        .add(
            RuleDraft::new("literal", "Kubernetes", tags(&["k8s", "devops"])).with_filters(FilterSpec {
                require_entity: vec![EntityFilter {
                    types: vec![EntityType::Org],
                    scope: Some(Scope::Paragraph),
                }],
                ..Default::default()
            }),
        )
        .unwrap();
    source
        .add(RuleDraft::new("entity", "EMAIL", tags(&["contact"])).disabled())
        .unwrap();
    source
        .add_group(
            "work",
            Group {
                description: Some("Work notes".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

    let exported = source.export().unwrap();

    let mut target = RuleStore::open(dir.path().join("target.json"));
    let report = target.import(&exported).unwrap();
    assert_eq!(report.imported, 3);
    assert_eq!(report.skipped, 0);

    // Reopen from disk to prove the import was persisted
    let target = RuleStore::open(dir.path().join("target.json"));
    assert_eq!(comparable(target.rules()), comparable(source.rules()));
    assert_eq!(target.groups(), source.groups());
    assert_eq!(target.managed_tags(), source.managed_tags());
}

#[test]
fn test_import_bare_array_is_best_effort() {
    let dir = TempDir::new().unwrap();
    let mut store = RuleStore::open(dir.path().join("rules.json"));

    let json = r#"[
        {"type": "keyword", "match": "docker", "tags": ["devops"]},
        {"type": "spell", "match": "x", "tags": ["y"]},
        {"type": "literal", "match": "release", "tags": []},
        {"type": "pattern", "match": "ADJ NOUN", "tags": ["phrases"]}
    ]"#;
    let report = store.import(json).unwrap();

    assert_eq!(report.imported, 2);
    assert_eq!(report.skipped, 2);
    assert!(report.errors.iter().any(|e| e.starts_with("rule 2:")));
    assert!(report.errors.iter().any(|e| e.starts_with("rule 3:")));
    assert_eq!(RuleStore::open(dir.path().join("rules.json")).rules().len(), 2);
}

#[test]
fn test_corrupt_rules_file_loads_empty() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rules.json");
    std::fs::write(&path, "{ definitely not json").unwrap();

    let mut store = RuleStore::open(&path);
    assert!(store.rules().is_empty());

    // The next write replaces the corrupt file
    store.add(RuleDraft::new("keyword", "docker", tags(&["devops"]))).unwrap();
    assert_eq!(RuleStore::open(&path).rules().len(), 1);
}
