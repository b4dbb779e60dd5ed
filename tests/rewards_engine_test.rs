//! End-to-end tests for the rewards engine over an in-memory store

mod common;

use common::*;
use neurobreath_rewards::storage::Storage;
use neurobreath_rewards::{Category, CommandError, UpdateTrigger, categorize};
use serde_json::json;

#[test]
fn test_points_from_progress() {
    let engine = engine_with_progress(progress_650());
    let state = engine.state();

    // 60*10 + 5*5 + 25
    assert_eq!(state.total_points, 650);
    assert_eq!(state.available_points, 650);
    assert!(state.has_badge("first-session"));
    assert!(state.has_badge("streak-3"));
    assert!(state.has_badge("week-goal-60"));
    assert!(!state.has_badge("streak-7"));
}

#[test]
fn test_empty_state() {
    let engine = empty_engine();
    let state = engine.state();

    assert_eq!(state.total_points, 0);
    assert_eq!(state.available_points, 0);
    assert!(!state.has_badge("first-session"));
    assert!(state.earned_badges.is_empty());
    assert!(state.coupons.iter().all(|c| !c.redeemable));
}

#[test]
fn test_challenge_minutes_add_to_progress() {
    let engine = engine_with_progress(json!({ "sessions": 1, "totalSeconds": 600 }));
    seed_challenge(
        &engine,
        json!({ "totals": { "totalMins": 30 }, "byDay": { "2024-06-01": { "minutes": 12 } } }),
    );
    let state = engine.state();

    // (10 + 30) minutes + one session
    assert_eq!(state.total_points, 405);
    assert_eq!(state.challenge.today_minutes, 12);
}

#[test]
fn test_redeem_token_coupon() {
    let engine = engine_with_progress(progress_650());
    let redemption = engine.redeem_coupon("streak-pause-token").unwrap();

    assert_eq!(redemption.points_spent, 120);
    assert_eq!(redemption.available_points, 530);
    assert_eq!(redemption.token_balance, Some(1));

    let state = engine.state();
    assert_eq!(state.wallet.points_spent, 120);
    assert_eq!(state.available_points, 530);
    assert_eq!(state.wallet.token_count("streak-pause"), 1);
    assert!(state.coupon("streak-pause-token").unwrap().redeemed);

    let wallet = stored_wallet(&engine).unwrap();
    assert_eq!(wallet["pointsSpent"], 120);
    assert_eq!(wallet["tokens"]["streak-pause"], 1);
}

#[test]
fn test_double_redeem_is_refused_without_charge() {
    let engine = engine_with_progress(progress_650());
    engine.redeem_coupon("streak-pause-token").unwrap();

    let err = engine.redeem_coupon("streak-pause-token").unwrap_err();
    assert_eq!(err.reason(), "already_redeemed");

    let state = engine.state();
    assert_eq!(state.wallet.points_spent, 120);
    assert_eq!(state.wallet.token_count("streak-pause"), 1);
}

#[test]
fn test_use_token_without_token() {
    let engine = engine_with_progress(progress_650());
    engine.state();
    let before = engine.storage().get(&engine.keys().wallet);

    let err = engine.use_token("streak-pause").unwrap_err();
    assert_eq!(err, CommandError::NoToken("streak-pause".to_string()));
    assert_eq!(err.reason(), "no_token");

    // Wallet untouched
    assert_eq!(engine.storage().get(&engine.keys().wallet), before);
}

#[test]
fn test_redeem_then_use_token() {
    let engine = engine_with_progress(progress_650());
    engine.redeem_coupon("streak-pause-token").unwrap();

    assert_eq!(engine.use_token("streak-pause"), Ok(0));
    assert_eq!(engine.state().wallet.token_count("streak-pause"), 0);
    assert_eq!(
        engine.use_token("streak-pause").map_err(|e| e.reason()),
        Err("no_token")
    );
}

#[test]
fn test_redeem_refusals() {
    let engine = engine_with_progress(json!({ "sessions": 2, "totalSeconds": 300 }));
    // 5*10 + 2*5 = 60 points, no week-goal-60 badge

    let err = engine.redeem_coupon("no-such-coupon").unwrap_err();
    assert_eq!(err.reason(), "unknown_coupon");

    let err = engine.redeem_coupon("teacher-time-saver").unwrap_err();
    assert_eq!(err.reason(), "locked");

    // Unlocks at 80 available points
    let err = engine.redeem_coupon("calm-coach-pack").unwrap_err();
    assert_eq!(err, CommandError::Locked("calm-coach-pack".to_string()));

    assert_eq!(engine.state().wallet.points_spent, 0);
}

#[test]
fn test_not_enough_points_for_unlocked_coupon() {
    let engine = engine_with_progress(json!({ "sessions": 2, "totalSeconds": 300 }));
    // Badge earned earlier, progress since reset
    engine
        .storage()
        .set(
            &engine.keys().wallet,
            r#"{"v":1,"earnedBadges":{"week-goal-60":{"title":"Weekly Goal"}}}"#,
        )
        .unwrap();

    let state = engine.state();
    let teacher = state.coupon("teacher-time-saver").unwrap();
    assert!(teacher.unlocked && !teacher.can_afford && !teacher.redeemable);

    let err = engine.redeem_coupon("teacher-time-saver").unwrap_err();
    assert_eq!(
        err,
        CommandError::NotEnoughPoints {
            needed: 200,
            available: 60
        }
    );
    assert_eq!(err.reason(), "not_enough_points");
}

#[test]
fn test_prompt_coupon_fills_vault() {
    let engine = engine_with_progress(progress_650());
    let redemption = engine.redeem_coupon("teacher-time-saver").unwrap();

    let prompt = redemption.prompt.unwrap();
    assert!(!prompt.text.is_empty());
    assert_eq!(redemption.token_balance, None);

    let state = engine.state();
    assert_eq!(state.available_points, 450);
    let entry = state.wallet.prompt_vault.get("teacher-time-saver").unwrap();
    assert_eq!(entry.title, prompt.title);
    assert_eq!(entry.redeemed_at, Some(test_now()));
}

#[test]
fn test_badges_survive_progress_regression() {
    let engine = engine_with_progress(progress_650());
    assert!(engine.state().has_badge("streak-3"));

    // Progress store cleared by the user
    engine.storage().remove(&engine.keys().progress);
    let state = engine.state();

    assert_eq!(state.total_points, 0);
    assert!(state.has_badge("first-session"));
    assert!(state.has_badge("streak-3"));
    assert!(state.newly_earned.is_empty());
}

#[test]
fn test_available_points_clamped_at_zero() {
    let engine = engine_with_progress(progress_650());
    engine.redeem_coupon("teacher-time-saver").unwrap();
    engine.redeem_coupon("streak-pause-token").unwrap();

    // Totals drop below what was already spent
    seed_progress(&engine, json!({ "sessions": 1 }));
    let state = engine.state();

    assert_eq!(state.total_points, 5);
    assert_eq!(state.wallet.points_spent, 320);
    assert_eq!(state.available_points, 0);
}

#[test]
fn test_malformed_wallet_is_repaired() {
    let engine = engine_with_progress(progress_650());
    engine
        .storage()
        .set(
            &engine.keys().wallet,
            r#"{"v":1,"pointsSpent":"oops","earnedBadges":{"streak-7":42},"tokens":[]}"#,
        )
        .unwrap();

    let state = engine.state();
    assert_eq!(state.wallet.points_spent, 0);
    // Kept even though its entry was garbage
    assert!(state.has_badge("streak-7"));
    assert!(state.wallet.tokens.is_empty());
}

#[test]
fn test_badge_minting_keeps_vault_and_unknown_fields() {
    let engine = engine_with_progress(progress_650());
    engine
        .storage()
        .set(
            &engine.keys().wallet,
            &json!({
                "v": 1,
                "pointsSpent": 80,
                "redeemedCoupons": { "calm-coach-pack": { "kind": "prompt" } },
                "promptVault": { "calm-coach-pack": {
                    "title": "60-Second Calm Reset Script",
                    "text": "Soften your shoulders.",
                    "redeemedAt": null
                }},
                "extraField": { "keep": true }
            })
            .to_string(),
        )
        .unwrap();

    // Mints badges, which re-saves the wallet
    let state = engine.state();
    assert!(!state.newly_earned.is_empty());
    assert!(state.wallet.prompt_vault.contains_key("calm-coach-pack"));

    let stored = stored_wallet(&engine).unwrap();
    assert_eq!(
        stored["promptVault"]["calm-coach-pack"]["text"],
        "Soften your shoulders."
    );
    assert_eq!(stored["extraField"]["keep"], true);
    assert_eq!(
        engine.redeem_coupon("calm-coach-pack").map_err(|e| e.reason()),
        Err("already_redeemed")
    );
}

#[test]
fn test_write_failure_keeps_in_memory_result() {
    let engine = engine_with_progress(progress_650());
    let rx = engine.subscribe();
    engine.storage().fail_writes(true);

    let redemption = engine.redeem_coupon("streak-pause-token").unwrap();
    assert_eq!(redemption.available_points, 530);

    let event = rx.try_recv().unwrap();
    assert_eq!(event.state.available_points, 530);
    assert!(stored_wallet(&engine).is_none());

    // Nothing persisted, so a fresh read is back to the full balance
    engine.storage().fail_writes(false);
    assert_eq!(engine.state().available_points, 650);
}

#[test]
fn test_events_for_init_and_commands() {
    let engine = engine_with_progress(progress_650());
    let rx = engine.subscribe();

    engine.init();
    assert_eq!(rx.try_recv().unwrap().trigger, UpdateTrigger::Init);

    engine.redeem_coupon("streak-pause-token").unwrap();
    let event = rx.try_recv().unwrap();
    assert_eq!(
        event.trigger,
        UpdateTrigger::Redeem {
            coupon_id: "streak-pause-token".to_string()
        }
    );
    assert_eq!(event.state.wallet.token_count("streak-pause"), 1);

    engine.use_token("streak-pause").unwrap();
    let event = rx.try_recv().unwrap();
    assert_eq!(
        event.trigger,
        UpdateTrigger::UseToken {
            token_id: "streak-pause".to_string()
        }
    );

    // Refused commands announce nothing
    let _ = engine.use_token("streak-pause");
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_event_serializes_with_reason() {
    let engine = empty_engine();
    let rx = engine.subscribe();
    engine.refresh("nb_challenge_stats_v1");

    let event = rx.try_recv().unwrap();
    let value = serde_json::to_value(&event).unwrap();
    assert_eq!(value["reason"], "storage");
    assert_eq!(value["key"], "nb_challenge_stats_v1");
    assert_eq!(value["state"]["totalPoints"], 0);
}

#[test]
fn test_recommendation() {
    let engine = empty_engine();
    assert_eq!(engine.recommend_next_quest().category, Category::Calm);

    seed_progress(
        &engine,
        json!({
            "sessions": 4,
            "history": { "2024-06-01": { "techs": {
                "box-breathing": 2, "sleepy-time-478": 1, "class-prep": 1
            }}},
            "lastSession": { "techniqueId": "focus-garden" }
        }),
    );
    // focus and mood are both unused; focus was the last session
    assert_eq!(engine.recommend_next_quest().category, Category::Mood);

    // Recommending never writes
    assert!(stored_wallet(&engine).is_none());
}

#[test]
fn test_categorize_keywords() {
    assert_eq!(categorize("sleepy-time-478"), Category::Sleep);
    assert_eq!(categorize("Focus-Garden"), Category::Focus);
    assert_eq!(categorize("box-breathing"), Category::Calm);
}
