//! One-shot directory reconciliation (`autotag sync`)

use super::helpers::Context;
use autotag_core::{error::Result, sync_directory, SyncOptions, TagReconciler};
use tracing::warn;

pub fn handle(ctx: &Context, alias: Option<String>, dry_run: bool) -> Result<()> {
    let root = ctx.resolve_dir(alias.as_deref())?;
    let store = ctx.rule_store();
    if store.enabled_rules().is_empty() {
        warn!("No enabled rules in {}", store.path().display());
    }

    let reconciler = TagReconciler::new(ctx.analyzer());
    let options = SyncOptions {
        dry_run,
        extension: ctx.settings.extension.clone(),
    };
    let report = sync_directory(&root, store.rules(), &reconciler, &options)?;

    for file in &report.changed {
        let path = file.path.strip_prefix(&root).unwrap_or(&file.path);
        let mut changes: Vec<String> = file.result.added_tags.iter().map(|t| format!("+#{}", t)).collect();
        changes.extend(file.result.removed_tags.iter().map(|t| format!("-#{}", t)));
        println!("{}: {}", path.display(), changes.join(" "));
    }
    for (path, error) in &report.failures {
        println!("{}: failed ({})", path.display(), error);
    }

    println!(
        "{} of {} document(s) {}{}",
        report.changed.len(),
        report.scanned,
        if dry_run { "would change" } else { "updated" },
        if report.failures.is_empty() {
            String::new()
        } else {
            format!(", {} failed", report.failures.len())
        }
    );
    Ok(())
}
