//! Watch command implementation

use std::time::Duration;

use anyhow::Result;

use neurobreath_rewards::RewardsEvent;
use neurobreath_rewards::storage::{StoreEvent, StoreWatcher};

use super::CliContext;

/// Watch the store and print one JSON line per state update
pub fn watch_command(ctx: &CliContext) -> Result<()> {
    let (config, engine) = ctx.open_engine()?;
    let updates = engine.subscribe();
    let watcher = StoreWatcher::new(engine.storage(), config.watch.debounce_ms)?;

    tracing::info!(
        "Watching {} (Ctrl-C to stop)",
        engine.storage().dir().display()
    );
    engine.init();

    loop {
        while let Ok(event) = updates.try_recv() {
            print_update(ctx, &event)?;
        }

        match watcher.recv_timeout(Duration::from_millis(500)) {
            Some(StoreEvent::KeyChanged(key)) => {
                engine.refresh(&key);
            }
            Some(StoreEvent::Error(e)) => tracing::warn!("Store watcher error: {}", e),
            None => {}
        }
    }
}

fn print_update(ctx: &CliContext, event: &RewardsEvent) -> Result<()> {
    if ctx.json {
        println!("{}", serde_json::to_string(event)?);
    } else {
        println!(
            "[{:?}] {} available / {} earned, {} badges",
            event.trigger,
            event.state.available_points,
            event.state.total_points,
            event.state.earned_badges.len()
        );
    }
    Ok(())
}
