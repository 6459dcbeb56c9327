//! Continuous reconciliation (`autotag watch`)

use super::helpers::Context;
use autotag_core::{
    error::Result, RuleFile, TagReconciler, WatchLoop, WatchProcessor, WatchStateStore,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub async fn handle(ctx: &Context, alias: Option<String>) -> Result<()> {
    let root = ctx.resolve_dir(alias.as_deref())?;

    let processor = WatchProcessor::new(
        TagReconciler::new(ctx.analyzer()),
        Arc::new(RuleFile::new(ctx.rules_path.clone())),
        WatchStateStore::open(ctx.settings.state_path()),
    );
    let watch = WatchLoop::new(&root, &ctx.settings.extension, ctx.settings.debounce(), processor);

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received shutdown signal, stopping watcher gracefully...");
        }
        signal.cancel();
    });

    println!("Watching {} (Ctrl-C to stop)", watch.root().display());
    watch.run(shutdown).await?;
    info!("Watcher shut down complete");
    Ok(())
}
