//! Engine over a directory-backed store

use chrono::{TimeZone, Utc};
use neurobreath_rewards::storage::{FileStorage, Storage, StoreEvent, StoreWatcher};
use neurobreath_rewards::{FixedClock, RewardsEngine, StoreKeys};
use std::time::{Duration, Instant};
use tempfile::TempDir;

fn file_engine(dir: &TempDir) -> RewardsEngine<FileStorage, FixedClock> {
    let storage = FileStorage::open(dir.path().join("store")).expect("Failed to open store");
    RewardsEngine::with_clock(
        storage,
        StoreKeys::default(),
        FixedClock(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()),
    )
}

#[test]
fn test_wallet_persists_across_engines() {
    let dir = TempDir::new().unwrap();
    let engine = file_engine(&dir);
    engine
        .storage()
        .set("mpl.stats.v1", r#"{"sessions":5,"totalSeconds":3600,"dayStreak":3}"#)
        .unwrap();
    engine.redeem_coupon("streak-pause-token").unwrap();
    drop(engine);

    let reopened = file_engine(&dir);
    let state = reopened.state();
    assert_eq!(state.available_points, 530);
    assert_eq!(state.wallet.token_count("streak-pause"), 1);
    assert!(reopened.storage().dir().join("nb.rewards.wallet.v1.json").exists());
}

#[test]
fn test_watcher_reports_changed_key() {
    let dir = TempDir::new().unwrap();
    let engine = file_engine(&dir);
    let watcher = StoreWatcher::new(engine.storage(), 50).unwrap();

    std::fs::write(
        engine.storage().dir().join("mpl.stats.v1.json"),
        r#"{"sessions":1}"#,
    )
    .unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    let mut seen = None;
    while Instant::now() < deadline {
        if let Some(StoreEvent::KeyChanged(key)) = watcher.recv_timeout(Duration::from_millis(200))
        {
            seen = Some(key);
            break;
        }
    }

    let key = seen.expect("No change reported");
    assert_eq!(key, "mpl.stats.v1");
    let state = engine.refresh(&key).unwrap();
    assert!(state.has_badge("first-session"));
}
