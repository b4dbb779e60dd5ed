//! Rewards engine - core gamification logic
//!
//! Every read derives the full state from storage: snapshots, points, badge
//! minting and coupon status. Mutating commands derive first, then apply their
//! own change to the wallet and persist it.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::mpsc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use super::catalog::{
    BADGES, COUPONS, Coupon, CouponContext, CouponKind, CouponReward, EvalContext,
    unlocked_or_false,
};
use super::clock::{Clock, DEFAULT_TIMEZONE, SystemClock, day_key, parse_timezone};
use super::events::{EventBus, RewardsEvent, UpdateTrigger};
use super::points::{MAX_POINTS, available_points, compute_points};
use super::quests::{QuestSuggestion, pick_category, suggestion_for};
use super::snapshot::{
    ChallengeSnapshot, ProgressSnapshot, parse_json, read_challenge, read_progress, tech_counts,
};
use super::wallet::{
    EarnedBadge, MAX_TOKENS, PromptEntry, RedeemedCoupon, Wallet, load_wallet, save_wallet,
};
use crate::storage::Storage;

/// Storage keys of the three stores the engine uses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreKeys {
    pub wallet: String,
    pub progress: String,
    pub challenge: String,
}

impl Default for StoreKeys {
    fn default() -> Self {
        Self {
            wallet: "nb.rewards.wallet.v1".to_string(),
            progress: "mpl.stats.v1".to_string(),
            challenge: "nb_challenge_stats_v1".to_string(),
        }
    }
}

/// A coupon with its current eligibility
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponStatus {
    #[serde(flatten)]
    pub coupon: &'static Coupon,
    pub kind: CouponKind,
    pub unlocked: bool,
    pub redeemed: bool,
    pub can_afford: bool,
    pub redeemable: bool,
}

/// Full derived rewards state
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardsState {
    pub progress: ProgressSnapshot,
    pub challenge: ChallengeSnapshot,
    pub tech_counts: BTreeMap<String, u64>,
    pub wallet: Wallet,
    pub total_points: u32,
    pub available_points: u32,
    /// Every badge id in the wallet, including ones no longer in the catalog
    pub earned_badges: Vec<String>,
    /// Badges minted by the derivation that produced this state
    pub newly_earned: Vec<String>,
    pub coupons: Vec<CouponStatus>,
}

impl RewardsState {
    pub fn coupon(&self, coupon_id: &str) -> Option<&CouponStatus> {
        self.coupons.iter().find(|c| c.coupon.id == coupon_id)
    }

    pub fn has_badge(&self, badge_id: &str) -> bool {
        self.wallet.earned_badges.contains_key(badge_id)
    }
}

/// Why a command was refused
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("unknown coupon '{0}'")]
    UnknownCoupon(String),

    #[error("coupon '{0}' is still locked")]
    Locked(String),

    #[error("coupon '{0}' was already redeemed")]
    AlreadyRedeemed(String),

    #[error("not enough points: need {needed}, have {available}")]
    NotEnoughPoints { needed: u32, available: u32 },

    #[error("no '{0}' token to use")]
    NoToken(String),
}

impl CommandError {
    /// Stable machine-readable reason
    pub fn reason(&self) -> &'static str {
        match self {
            Self::UnknownCoupon(_) => "unknown_coupon",
            Self::Locked(_) => "locked",
            Self::AlreadyRedeemed(_) => "already_redeemed",
            Self::NotEnoughPoints { .. } => "not_enough_points",
            Self::NoToken(_) => "no_token",
        }
    }
}

/// `{ok, reason?}` view of a command result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandOutcome {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
}

impl<T> From<&Result<T, CommandError>> for CommandOutcome {
    fn from(result: &Result<T, CommandError>) -> Self {
        match result {
            Ok(_) => Self {
                ok: true,
                reason: None,
            },
            Err(e) => Self {
                ok: false,
                reason: Some(e.reason()),
            },
        }
    }
}

/// Result of a successful redemption
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Redemption {
    pub coupon_id: &'static str,
    pub points_spent: u64,
    pub available_points: u32,
    /// New balance, for token coupons
    pub token_balance: Option<u32>,
    /// Stored payload, for prompt coupons
    pub prompt: Option<PromptEntry>,
}

/// The rewards service: owns its storage and event bus, holds no other state
pub struct RewardsEngine<S: Storage, C: Clock = SystemClock> {
    storage: S,
    keys: StoreKeys,
    clock: C,
    timezone: Option<Tz>,
    bus: EventBus,
}

impl<S: Storage> RewardsEngine<S, SystemClock> {
    /// Create an engine using wall-clock time
    pub fn new(storage: S, keys: StoreKeys) -> Self {
        Self::with_clock(storage, keys, SystemClock)
    }
}

impl<S: Storage, C: Clock> RewardsEngine<S, C> {
    /// Create an engine with an explicit time source
    pub fn with_clock(storage: S, keys: StoreKeys, clock: C) -> Self {
        Self {
            storage,
            keys,
            clock,
            timezone: parse_timezone(DEFAULT_TIMEZONE),
            bus: EventBus::new(),
        }
    }

    /// Timezone for "today" buckets; `None` uses the host local date
    pub fn with_timezone(mut self, timezone: Option<Tz>) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn keys(&self) -> &StoreKeys {
        &self.keys
    }

    /// Keys whose external changes trigger a refresh
    pub fn watched_keys(&self) -> [&str; 3] {
        [&self.keys.wallet, &self.keys.progress, &self.keys.challenge]
    }

    pub fn subscribe(&self) -> mpsc::Receiver<RewardsEvent> {
        self.bus.subscribe()
    }

    /// Derive the initial state and announce it
    pub fn init(&self) -> RewardsState {
        let state = self.state();
        self.publish(UpdateTrigger::Init, state.clone());
        state
    }

    /// Derive the full state, persisting any newly minted badges
    pub fn state(&self) -> RewardsState {
        let now = self.clock.now();
        let (progress, challenge) = self.read_snapshots(now);
        let wallet = load_wallet(&self.storage, &self.keys.wallet, now);
        let mut state = evaluate(progress, challenge, wallet, now);

        if !state.newly_earned.is_empty() {
            tracing::info!("Earned badges: {}", state.newly_earned.join(", "));
            save_wallet(&self.storage, &self.keys.wallet, &mut state.wallet, now);
        }

        state
    }

    /// React to a change of `key` made outside this engine.
    /// Returns the refreshed state if the key is watched.
    pub fn refresh(&self, key: &str) -> Option<RewardsState> {
        if !self.watched_keys().contains(&key) {
            return None;
        }
        tracing::debug!("Store key '{}' changed externally, refreshing", key);
        let state = self.state();
        self.publish(
            UpdateTrigger::Storage {
                key: key.to_string(),
            },
            state.clone(),
        );
        Some(state)
    }

    /// Spend points on a coupon
    pub fn redeem_coupon(&self, coupon_id: &str) -> Result<Redemption, CommandError> {
        let state = self.state();

        let status = state
            .coupon(coupon_id)
            .ok_or_else(|| CommandError::UnknownCoupon(coupon_id.to_string()))?;
        let coupon = status.coupon;
        if !status.unlocked {
            return Err(CommandError::Locked(coupon.id.to_string()));
        }
        if status.redeemed {
            return Err(CommandError::AlreadyRedeemed(coupon.id.to_string()));
        }
        if state.available_points < coupon.cost {
            return Err(CommandError::NotEnoughPoints {
                needed: coupon.cost,
                available: state.available_points,
            });
        }

        let now = self.clock.now();
        let RewardsState {
            progress,
            challenge,
            mut wallet,
            ..
        } = state;

        wallet.points_spent = wallet
            .points_spent
            .saturating_add(coupon.cost as u64)
            .min(MAX_POINTS as u64);
        wallet.redeemed_coupons.insert(
            coupon.id.to_string(),
            RedeemedCoupon {
                redeemed_at: Some(now),
                title: coupon.title.to_string(),
                kind: Some(coupon.kind()),
                token_id: coupon.token_id().map(str::to_string),
            },
        );

        let mut token_balance = None;
        let mut prompt = None;
        match coupon.reward {
            CouponReward::Token { token_id } => {
                let balance = (wallet.token_count(token_id) + 1).min(MAX_TOKENS);
                wallet.tokens.insert(token_id.to_string(), balance);
                token_balance = Some(balance);
            }
            CouponReward::Prompt { title, text } => {
                let entry = PromptEntry {
                    title: title.to_string(),
                    text: text.to_string(),
                    redeemed_at: Some(now),
                };
                wallet.prompt_vault.insert(coupon.id.to_string(), entry.clone());
                prompt = Some(entry);
            }
        }

        save_wallet(&self.storage, &self.keys.wallet, &mut wallet, now);
        tracing::info!("Redeemed coupon '{}' for {} points", coupon.id, coupon.cost);

        let state = evaluate(progress, challenge, wallet, now);
        let redemption = Redemption {
            coupon_id: coupon.id,
            points_spent: state.wallet.points_spent,
            available_points: state.available_points,
            token_balance,
            prompt,
        };
        self.publish(
            UpdateTrigger::Redeem {
                coupon_id: coupon.id.to_string(),
            },
            state,
        );

        Ok(redemption)
    }

    /// Consume one token. Returns the remaining balance.
    pub fn use_token(&self, token_id: &str) -> Result<u32, CommandError> {
        let state = self.state();
        let current = state.wallet.token_count(token_id);
        if current == 0 {
            return Err(CommandError::NoToken(token_id.to_string()));
        }

        let now = self.clock.now();
        let RewardsState {
            progress,
            challenge,
            mut wallet,
            ..
        } = state;

        let remaining = current - 1;
        wallet.tokens.insert(token_id.to_string(), remaining);
        save_wallet(&self.storage, &self.keys.wallet, &mut wallet, now);
        tracing::info!("Used '{}' token, {} left", token_id, remaining);

        let state = evaluate(progress, challenge, wallet, now);
        self.publish(
            UpdateTrigger::UseToken {
                token_id: token_id.to_string(),
            },
            state,
        );

        Ok(remaining)
    }

    /// Suggest a next activity. Reads progress only; never writes.
    pub fn recommend_next_quest(&self) -> &'static QuestSuggestion {
        let (progress, _) = self.read_snapshots(self.clock.now());
        let counts = tech_counts(&progress);
        suggestion_for(pick_category(&counts, progress.last_session.as_deref()))
    }

    fn read_snapshots(&self, now: DateTime<Utc>) -> (ProgressSnapshot, ChallengeSnapshot) {
        let progress_raw = parse_json(self.storage.get(&self.keys.progress).as_deref());
        let challenge_raw = parse_json(self.storage.get(&self.keys.challenge).as_deref());
        let today = day_key(now, self.timezone);

        (
            read_progress(progress_raw.as_ref()),
            read_challenge(challenge_raw.as_ref(), &today),
        )
    }

    fn publish(&self, trigger: UpdateTrigger, state: RewardsState) {
        let delivered = self.bus.publish(RewardsEvent { trigger, state });
        tracing::trace!("Rewards update delivered to {} subscribers", delivered);
    }
}

/// Derive points, mint badges and rate coupons for one wallet
fn evaluate(
    progress: ProgressSnapshot,
    challenge: ChallengeSnapshot,
    mut wallet: Wallet,
    now: DateTime<Utc>,
) -> RewardsState {
    let tech_counts = tech_counts(&progress);
    let total_points = compute_points(&progress, &challenge);
    let available_points = available_points(total_points, wallet.points_spent);

    let ctx = EvalContext {
        progress: &progress,
        challenge: &challenge,
        tech_counts: &tech_counts,
    };

    let mut newly_earned = Vec::new();
    for badge in BADGES {
        if wallet.earned_badges.contains_key(badge.id) {
            continue;
        }
        if unlocked_or_false(badge.id, badge.rule.evaluate(&ctx)) {
            tracing::debug!("Minting badge '{}'", badge.id);
            wallet.earned_badges.insert(
                badge.id.to_string(),
                EarnedBadge {
                    earned_at: Some(now),
                    title: badge.title.to_string(),
                },
            );
            newly_earned.push(badge.id.to_string());
        }
    }

    let earned: BTreeSet<String> = wallet.earned_badges.keys().cloned().collect();
    let coupon_ctx = CouponContext {
        base: ctx,
        total_points,
        available_points,
        earned_badges: &earned,
    };

    let coupons: Vec<CouponStatus> = COUPONS
        .iter()
        .map(|coupon| {
            let redeemed = wallet.redeemed_coupons.contains_key(coupon.id);
            let unlocked = unlocked_or_false(coupon.id, coupon.rule.evaluate(&coupon_ctx));
            let can_afford = available_points >= coupon.cost;
            CouponStatus {
                coupon,
                kind: coupon.kind(),
                unlocked,
                redeemed,
                can_afford,
                redeemable: unlocked && !redeemed && can_afford,
            }
        })
        .collect();

    RewardsState {
        earned_badges: earned.into_iter().collect(),
        newly_earned,
        coupons,
        tech_counts,
        total_points,
        available_points,
        progress,
        challenge,
        wallet,
    }
}
