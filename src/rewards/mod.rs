//! Gamification system: points, badges, coupons, tokens and quests
//!
//! Derives rewards from locally stored practice progress. Nothing here is
//! cached; every read recomputes from storage.

mod catalog;
mod category;
mod clock;
mod engine;
mod events;
mod points;
mod quests;
mod snapshot;
mod wallet;

pub use catalog::{
    BADGES, Badge, BadgeRule, COUPONS, Catalog, Coupon, CouponContext, CouponKind, CouponReward,
    CouponRule, EvalContext, EvalError, RewardCategory, catalog,
};
pub use category::{Category, CategoryCounts, categorize};
pub use clock::{Clock, DEFAULT_TIMEZONE, FixedClock, SystemClock, day_key, parse_timezone};
pub use engine::{
    CommandError, CommandOutcome, CouponStatus, Redemption, RewardsEngine, RewardsState, StoreKeys,
};
pub use events::{EventBus, RewardsEvent, UpdateTrigger};
pub use points::{MAX_POINTS, PointRewards, available_points, compute_points, total_minutes};
pub use quests::{QuestSuggestion, pick_category, suggestion_for};
pub use snapshot::{
    ChallengeSnapshot, ProgressSnapshot, TodayMinutesSource, read_challenge, read_progress,
    tech_counts,
};
pub use wallet::{EarnedBadge, MAX_TOKENS, PromptEntry, RedeemedCoupon, WALLET_VERSION, Wallet};
