//! Shared test utilities for rewards engine integration tests

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use neurobreath_rewards::storage::{MemoryStorage, Storage};
use neurobreath_rewards::{FixedClock, RewardsEngine, StoreKeys};
use serde_json::Value;

/// Engine type used throughout the integration tests
pub type TestEngine = RewardsEngine<MemoryStorage, FixedClock>;

/// Fixed "now" for every test: midday in London, so the day key is stable
pub fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

/// Creates an engine over an empty in-memory store
pub fn empty_engine() -> TestEngine {
    RewardsEngine::with_clock(
        MemoryStorage::new(),
        StoreKeys::default(),
        FixedClock(test_now()),
    )
}

/// Creates an engine with the given progress store value
pub fn engine_with_progress(progress: Value) -> TestEngine {
    let engine = empty_engine();
    seed_progress(&engine, progress);
    engine
}

/// Overwrites the progress store, as the practice pages would
pub fn seed_progress(engine: &TestEngine, progress: Value) {
    let key = engine.keys().progress.clone();
    engine
        .storage()
        .set(&key, &progress.to_string())
        .expect("Failed to seed progress");
}

/// Overwrites the challenge store
pub fn seed_challenge(engine: &TestEngine, challenge: Value) {
    let key = engine.keys().challenge.clone();
    engine
        .storage()
        .set(&key, &challenge.to_string())
        .expect("Failed to seed challenge");
}

/// Parsed wallet as currently persisted
pub fn stored_wallet(engine: &TestEngine) -> Option<Value> {
    engine
        .storage()
        .get(&engine.keys().wallet)
        .map(|raw| serde_json::from_str(&raw).expect("Stored wallet is not JSON"))
}

/// Progress worth exactly 650 points: 60 minutes, 5 sessions, 3-day streak
pub fn progress_650() -> Value {
    serde_json::json!({
        "sessions": 5,
        "totalSeconds": 3600,
        "dayStreak": 3
    })
}
