//! File system watcher for detecting store changes made by other processes

use std::sync::mpsc;
use std::time::Duration;

use anyhow::{Context, Result};
use notify_debouncer_mini::{DebounceEventResult, DebouncedEventKind, new_debouncer, notify};

use super::FileStorage;

/// Events from the store watcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// The value file for this key was written, replaced or removed
    KeyChanged(String),
    /// The watcher reported an error
    Error(String),
}

/// Watches a `FileStorage` directory and emits the keys that changed
pub struct StoreWatcher {
    /// Channel to receive store events
    rx: mpsc::Receiver<StoreEvent>,
    /// The watcher itself (kept alive)
    _watcher: notify_debouncer_mini::Debouncer<notify::RecommendedWatcher>,
}

impl StoreWatcher {
    /// Start watching the directory behind `storage`
    pub fn new(storage: &FileStorage, debounce_ms: u64) -> Result<Self> {
        let (tx, rx) = mpsc::channel();

        let store = storage.clone();
        let mut debouncer = new_debouncer(
            Duration::from_millis(debounce_ms),
            move |res: DebounceEventResult| match res {
                Ok(events) => {
                    for event in events {
                        if !matches!(
                            event.kind,
                            DebouncedEventKind::Any | DebouncedEventKind::AnyContinuous
                        ) {
                            continue;
                        }
                        // Lock and temp files map to no key
                        if let Some(key) = store.key_for(&event.path) {
                            let _ = tx.send(StoreEvent::KeyChanged(key));
                        }
                    }
                }
                Err(e) => {
                    let _ = tx.send(StoreEvent::Error(e.to_string()));
                }
            },
        )
        .context("Failed to create store watcher")?;

        debouncer
            .watcher()
            .watch(storage.dir(), notify::RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch {}", storage.dir().display()))?;

        Ok(Self {
            rx,
            _watcher: debouncer,
        })
    }

    /// Try to receive a store event (non-blocking)
    pub fn try_recv(&self) -> Option<StoreEvent> {
        self.rx.try_recv().ok()
    }

    /// Wait up to `timeout` for the next store event
    pub fn recv_timeout(&self, timeout: Duration) -> Option<StoreEvent> {
        self.rx.recv_timeout(timeout).ok()
    }
}
