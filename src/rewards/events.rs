//! State-changed broadcast
//!
//! Subscribers receive the full freshly derived state together with what
//! triggered it.

use std::sync::Mutex;
use std::sync::mpsc;

use serde::Serialize;

use super::engine::RewardsState;

/// What caused a state-changed broadcast
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum UpdateTrigger {
    /// Engine start-up
    Init,
    /// A watched store key was changed from outside
    Storage { key: String },
    Redeem { coupon_id: String },
    UseToken { token_id: String },
}

/// Payload of a state-changed broadcast
#[derive(Debug, Clone, Serialize)]
pub struct RewardsEvent {
    #[serde(flatten)]
    pub trigger: UpdateTrigger,
    pub state: RewardsState,
}

/// Fan-out of rewards events to any number of subscribers
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Mutex<Vec<mpsc::Sender<RewardsEvent>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber
    pub fn subscribe(&self) -> mpsc::Receiver<RewardsEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(tx);
        rx
    }

    /// Send to every live subscriber, dropping disconnected ones.
    /// Returns how many subscribers received the event.
    pub fn publish(&self, event: RewardsEvent) -> usize {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        subscribers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}
