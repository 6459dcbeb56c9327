//! Rule management commands (`autotag tag ...`)

use super::helpers::{build_filters, parse_csv, Context};
use autotag_core::{
    error::{AutotagError, Result},
    matching::describe_filters,
    storage::atomic_write,
    types::{Group, RuleFilter},
    Rule, RuleDraft,
};
use clap::Subcommand;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

#[derive(Subcommand)]
pub enum TagCommand {
    /// Add a rule: when <type> <match> then apply --tags
    When {
        /// Rule type: pattern, keyword, literal or entity
        kind: String,

        /// POS pattern, word, literal text or entity type
        #[arg(value_name = "MATCH")]
        match_text: String,

        /// Comma-separated tags to apply
        #[arg(short, long)]
        tags: String,

        /// Match keyword by lemma
        #[arg(long, conflicts_with = "stem")]
        lemma: bool,

        /// Match keyword by stem
        #[arg(long)]
        stem: bool,

        /// Allowed POS tags for keyword occurrences (comma-separated)
        #[arg(long)]
        pos: Option<String>,

        /// Required entity types, TYPES[:scope] (repeatable)
        #[arg(long = "require-entity", value_name = "TYPES[:SCOPE]")]
        require_entity: Vec<String>,

        /// Minimum sentiment, N[:scope]
        #[arg(long, value_name = "N[:SCOPE]", allow_hyphen_values = true)]
        sentiment_min: Option<String>,

        /// Maximum sentiment, N[:scope]
        #[arg(long, value_name = "N[:SCOPE]", allow_hyphen_values = true)]
        sentiment_max: Option<String>,

        /// Sentiment range, N,M[:scope]
        #[arg(
            long,
            value_name = "N,M[:SCOPE]",
            allow_hyphen_values = true,
            conflicts_with_all = ["sentiment_min", "sentiment_max"]
        )]
        sentiment_between: Option<String>,

        /// Group membership (repeatable)
        #[arg(short, long)]
        group: Vec<String>,

        #[arg(short, long)]
        description: Option<String>,
    },

    /// List rules
    List {
        #[arg(long, conflicts_with = "disabled")]
        enabled: bool,

        #[arg(long)]
        disabled: bool,

        #[arg(short, long)]
        group: Option<String>,
    },

    /// Show one rule
    Show { id: String },

    /// Delete a rule
    Remove { id: String },

    Enable { id: String },

    Disable { id: String },

    /// Rule counts by state and type
    Stats,

    /// Export rules and groups as JSON
    Export {
        /// Output path (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import rules from an export file or a JSON array of rules
    Import { file: PathBuf },

    /// Manage rule groups
    Group {
        #[command(subcommand)]
        action: GroupAction,
    },
}

#[derive(Subcommand)]
pub enum GroupAction {
    /// Create or replace a group
    Add {
        name: String,

        #[arg(short, long)]
        description: Option<String>,

        /// Comma-separated tags associated with the group
        #[arg(short, long)]
        tags: Option<String>,
    },

    /// Delete a group and drop it from all rules
    Remove { name: String },

    List,
}

fn print_rule_line(rule: &Rule) {
    let state = if rule.enabled { " " } else { "x" };
    println!(
        "[{}] {:<32} {:<8} {:<24} -> {}",
        state,
        rule.id,
        rule.kind.as_str(),
        rule.match_text,
        rule.tags.iter().map(|t| format!("#{}", t)).collect::<Vec<_>>().join(" ")
    );
}

fn print_rule(rule: &Rule) {
    println!("ID:          {}", rule.id);
    println!("Type:        {}", rule.kind);
    println!("Match:       {}", rule.match_text);
    if rule.lemma {
        println!("Compare:     lemma");
    } else if rule.stem {
        println!("Compare:     stem");
    }
    println!("Tags:        {}", rule.tags.join(", "));
    if !rule.groups.is_empty() {
        println!("Groups:      {}", rule.groups.join(", "));
    }
    println!("Enabled:     {}", rule.enabled);
    if let Some(spec) = rule.active_filters() {
        println!("Filters:     {}", describe_filters(spec));
    }
    if let Some(description) = &rule.description {
        println!("Description: {}", description);
    }
    println!("Created:     {}", rule.created.format("%Y-%m-%d %H:%M:%S UTC"));
    if let Some(modified) = rule.modified {
        println!("Modified:    {}", modified.format("%Y-%m-%d %H:%M:%S UTC"));
    }
}

pub fn handle(ctx: &Context, command: TagCommand) -> Result<()> {
    let mut store = ctx.rule_store();

    match command {
        TagCommand::When {
            kind,
            match_text,
            tags,
            lemma,
            stem,
            pos,
            require_entity,
            sentiment_min,
            sentiment_max,
            sentiment_between,
            group,
            description,
        } => {
            let filters = build_filters(
                pos.as_deref(),
                &require_entity,
                sentiment_min.as_deref(),
                sentiment_max.as_deref(),
                sentiment_between.as_deref(),
            )?;

            let mut draft = RuleDraft::new(kind, match_text, parse_csv(&tags));
            draft.lemma = lemma;
            draft.stem = stem;
            draft.filters = filters;
            draft.groups = group;
            draft.description = description;

            let rule = store.add(draft)?;
            println!("Added rule {}", rule.id);
            print_rule(&rule);
        }

        TagCommand::List {
            enabled,
            disabled,
            group,
        } => {
            let filter = RuleFilter {
                enabled_only: enabled,
                disabled_only: disabled,
                group,
            };
            let rules = store.list(&filter);
            if rules.is_empty() {
                println!("No rules found");
            }
            for rule in rules {
                print_rule_line(rule);
            }
        }

        TagCommand::Show { id } => {
            let rule = store.get(&id).ok_or_else(|| AutotagError::RuleNotFound(id.clone()))?;
            print_rule(rule);
        }

        TagCommand::Remove { id } => {
            if !store.remove(&id)? {
                return Err(AutotagError::RuleNotFound(id));
            }
            println!("Removed rule {}", id);
        }

        TagCommand::Enable { id } => {
            store.set_enabled(&id, true)?.ok_or(AutotagError::RuleNotFound(id.clone()))?;
            println!("Enabled rule {}", id);
        }

        TagCommand::Disable { id } => {
            store.set_enabled(&id, false)?.ok_or(AutotagError::RuleNotFound(id.clone()))?;
            println!("Disabled rule {}", id);
        }

        TagCommand::Stats => {
            let stats = store.stats();
            println!("Rules:    {} ({} enabled, {} disabled)", stats.total, stats.enabled, stats.disabled);
            for (kind, count) in &stats.by_kind {
                println!("  {:<8} {}", kind.as_str(), count);
            }
            println!("Groups:   {}", stats.groups);
            println!("Managed tags: {}", store.managed_tags().len());
        }

        TagCommand::Export { output } => {
            let json = store.export()?;
            match output {
                Some(path) => {
                    atomic_write(&path, json.as_bytes())?;
                    println!("Exported {} rule(s) to {}", store.rules().len(), path.display());
                }
                None => println!("{}", json),
            }
        }

        TagCommand::Import { file } => {
            debug!("Importing rules from {}", file.display());
            let json = fs::read_to_string(&file)?;
            let report = store.import(&json)?;
            println!("Imported {} rule(s), skipped {}", report.imported, report.skipped);
            for error in &report.errors {
                println!("  {}", error);
            }
        }

        TagCommand::Group { action } => match action {
            GroupAction::Add {
                name,
                description,
                tags,
            } => {
                let group = Group {
                    description,
                    additional_tags: tags.as_deref().map(parse_csv).unwrap_or_default(),
                    enabled: None,
                };
                store.add_group(&name, group)?;
                println!("Saved group {}", name);
            }
            GroupAction::Remove { name } => {
                if !store.remove_group(&name)? {
                    return Err(AutotagError::GroupNotFound(name));
                }
                println!("Removed group {}", name);
            }
            GroupAction::List => {
                let groups = store.groups();
                if groups.is_empty() {
                    println!("No groups defined");
                }
                for (name, group) in groups {
                    let members = store.rules().iter().filter(|r| r.in_group(name)).count();
                    print!("{} ({} rule(s))", name, members);
                    if let Some(description) = &group.description {
                        print!(": {}", description);
                    }
                    println!();
                }
            }
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use autotag_core::Settings;
    use tempfile::TempDir;

    fn context(dir: &TempDir, rules: &str) -> Context {
        Context {
            settings: Settings {
                data_dir: Some(dir.path().to_path_buf()),
                ..Default::default()
            },
            rules_path: dir.path().join(rules),
        }
    }

    #[test]
    fn test_export_creates_parent_dirs_and_reimports() {
        let dir = TempDir::new().unwrap();
        let source = context(&dir, "rules.json");
        source
            .rule_store()
            .add(RuleDraft::new("keyword", "docker", vec!["devops".to_string()]))
            .unwrap();

        let output = dir.path().join("backups").join("rules-export.json");
        handle(&source, TagCommand::Export { output: Some(output.clone()) }).unwrap();
        assert!(output.exists());

        let target = context(&dir, "imported.json");
        handle(&target, TagCommand::Import { file: output }).unwrap();
        let imported = target.rule_store();
        assert_eq!(imported.rules().len(), 1);
        assert_eq!(imported.rules()[0].id, "keyword-docker");
    }
}
