//! Badge and coupon definitions
//!
//! All rewards are defined here with their unlock rules. Ids are persisted in
//! wallets, so they must never change once published; a wallet entry whose id
//! disappears from the catalog is simply orphaned.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::category::{Category, CategoryCounts};
use super::points::total_minutes;
use super::snapshot::{ChallengeSnapshot, ProgressSnapshot};

/// Reward category for grouping in UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RewardCategory {
    Points,
    Breathing,
    Streak,
    Focus,
}

impl RewardCategory {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Points => "Points",
            Self::Breathing => "Breathing",
            Self::Streak => "Streaks",
            Self::Focus => "Focus",
        }
    }
}

/// Inputs available to badge rules
#[derive(Debug, Clone, Copy)]
pub struct EvalContext<'a> {
    pub progress: &'a ProgressSnapshot,
    pub challenge: &'a ChallengeSnapshot,
    pub tech_counts: &'a BTreeMap<String, u64>,
}

/// Inputs available to coupon rules: the badge context plus derived totals
#[derive(Debug, Clone, Copy)]
pub struct CouponContext<'a> {
    pub base: EvalContext<'a>,
    pub total_points: u32,
    pub available_points: u32,
    pub earned_badges: &'a BTreeSet<String>,
}

/// Why a rule could not be evaluated
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    #[error("rule references unknown badge '{0}'")]
    UnknownBadge(&'static str),
}

/// Unlock condition for a badge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BadgeRule {
    MinSessions { sessions: u64 },
    MinTotalMinutes { minutes: u64 },
    MinDayStreak { days: u32 },
    /// Uses of a category, counted from technique history
    MinCategoryUses { category: Category, uses: u64 },
}

impl BadgeRule {
    pub fn evaluate(&self, ctx: &EvalContext<'_>) -> Result<bool, EvalError> {
        match *self {
            Self::MinSessions { sessions } => Ok(ctx.progress.sessions >= sessions),
            Self::MinTotalMinutes { minutes } => {
                Ok(total_minutes(ctx.progress, ctx.challenge) >= minutes)
            }
            Self::MinDayStreak { days } => Ok(ctx.progress.day_streak >= days),
            Self::MinCategoryUses { category, uses } => {
                let counts = CategoryCounts::from_tech_counts(ctx.tech_counts);
                Ok(counts.get(category) >= uses)
            }
        }
    }
}

/// Unlock condition for a coupon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CouponRule {
    MinAvailablePoints { points: u32 },
    BadgeEarned { badge_id: &'static str },
}

impl CouponRule {
    pub fn evaluate(&self, ctx: &CouponContext<'_>) -> Result<bool, EvalError> {
        match *self {
            Self::MinAvailablePoints { points } => Ok(ctx.available_points >= points),
            Self::BadgeEarned { badge_id } => {
                if Badge::get(badge_id).is_none() {
                    return Err(EvalError::UnknownBadge(badge_id));
                }
                Ok(ctx.earned_badges.contains(badge_id))
            }
        }
    }
}

/// Collapse a rule result to a plain unlock flag; failures never unlock
pub fn unlocked_or_false(id: &str, result: Result<bool, EvalError>) -> bool {
    match result {
        Ok(unlocked) => unlocked,
        Err(e) => {
            tracing::debug!("Treating reward '{}' as locked: {}", id, e);
            false
        }
    }
}

/// Badge definition with all metadata
#[derive(Debug, Clone, Serialize)]
pub struct Badge {
    pub id: &'static str,
    pub title: &'static str,
    pub icon: &'static str,
    pub category: RewardCategory,
    pub description: &'static str,
    pub rule: BadgeRule,
}

/// Whether a coupon grants a counted token or a prompt payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CouponKind {
    Token,
    Prompt,
}

/// What redeeming a coupon adds to the wallet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CouponReward {
    Token {
        token_id: &'static str,
    },
    Prompt {
        title: &'static str,
        text: &'static str,
    },
}

/// Coupon definition with all metadata
#[derive(Debug, Clone, Serialize)]
pub struct Coupon {
    pub id: &'static str,
    pub title: &'static str,
    pub icon: &'static str,
    pub category: RewardCategory,
    pub cost: u32,
    pub description: &'static str,
    pub rule: CouponRule,
    pub reward: CouponReward,
}

impl Coupon {
    pub fn kind(&self) -> CouponKind {
        match self.reward {
            CouponReward::Token { .. } => CouponKind::Token,
            CouponReward::Prompt { .. } => CouponKind::Prompt,
        }
    }

    pub fn token_id(&self) -> Option<&'static str> {
        match self.reward {
            CouponReward::Token { token_id } => Some(token_id),
            CouponReward::Prompt { .. } => None,
        }
    }

    /// Get coupon definition by id
    pub fn get(id: &str) -> Option<&'static Coupon> {
        COUPONS.iter().find(|c| c.id == id)
    }
}

impl Badge {
    /// Get badge definition by id
    pub fn get(id: &str) -> Option<&'static Badge> {
        BADGES.iter().find(|b| b.id == id)
    }
}

/// All badge definitions, in evaluation order
pub static BADGES: &[Badge] = &[
    Badge {
        id: "first-session",
        title: "First Step",
        icon: "👣",
        category: RewardCategory::Points,
        description: "Log your first session.",
        rule: BadgeRule::MinSessions { sessions: 1 },
    },
    Badge {
        id: "calm-starter-5",
        title: "Calm Starter",
        icon: "🫧",
        category: RewardCategory::Breathing,
        description: "Accumulate 5 minutes of calm practice.",
        rule: BadgeRule::MinTotalMinutes { minutes: 5 },
    },
    Badge {
        id: "week-goal-60",
        title: "Weekly Goal",
        icon: "🏁",
        category: RewardCategory::Points,
        description: "Accumulate 60 minutes total practice.",
        rule: BadgeRule::MinTotalMinutes { minutes: 60 },
    },
    Badge {
        id: "streak-3",
        title: "3-Day Streak",
        icon: "🔥",
        category: RewardCategory::Streak,
        description: "Practice on 3 different days in a row.",
        rule: BadgeRule::MinDayStreak { days: 3 },
    },
    Badge {
        id: "streak-7",
        title: "7-Day Streak",
        icon: "🌟",
        category: RewardCategory::Streak,
        description: "Practice on 7 different days in a row.",
        rule: BadgeRule::MinDayStreak { days: 7 },
    },
    Badge {
        id: "focus-friend",
        title: "Focus Friend",
        icon: "🌱",
        category: RewardCategory::Focus,
        description: "Use Focus tools at least 5 times (Focus Garden counts).",
        rule: BadgeRule::MinCategoryUses {
            category: Category::Focus,
            uses: 5,
        },
    },
];

const TEACHER_SCRIPT: &str = "Short update (copy/paste):\n\n\
Today we used NeuroBreath for a calm start (1-5 minutes). The goal is consistency without pressure.\n\
What helps most:\n\
• Short, repeatable practice (daily if possible)\n\
• One clear \"next right action\" after calming\n\
• Positive feedback on effort + strategy, not speed\n\n\
If you can, please support with: reduced noise, clear instructions, and one task at a time.";

const CALM_RESET_SCRIPT: &str = "60-second calm reset (read slowly):\n\n\
1) Soften your shoulders.\n\
2) Breathe in gently through the nose.\n\
3) Pause for one beat.\n\
4) Breathe out longer than you breathed in.\n\
5) Notice one thing you can do next, small and easy.\n\n\
Repeat once if needed.";

/// All coupon definitions, in evaluation order
pub static COUPONS: &[Coupon] = &[
    Coupon {
        id: "streak-pause-token",
        title: "Streak Pause Token",
        icon: "⏸️",
        category: RewardCategory::Streak,
        cost: 120,
        description: "Redeem 1 token that you can choose to \"use\" on a tough day to protect motivation. (Local-only; you decide how to apply it.)",
        rule: CouponRule::MinAvailablePoints { points: 120 },
        reward: CouponReward::Token {
            token_id: "streak-pause",
        },
    },
    Coupon {
        id: "teacher-time-saver",
        title: "Teacher Time-Saver Token",
        icon: "🧑‍🏫",
        category: RewardCategory::Points,
        cost: 200,
        description: "Redeem a prompt pack you can copy/paste into a teacher, tutor, SENCO or manager message.",
        rule: CouponRule::BadgeEarned {
            badge_id: "week-goal-60",
        },
        reward: CouponReward::Prompt {
            title: "Teacher / Parent Confidence Script",
            text: TEACHER_SCRIPT,
        },
    },
    Coupon {
        id: "calm-coach-pack",
        title: "Calm Coach Pack",
        icon: "🧘",
        category: RewardCategory::Breathing,
        cost: 80,
        description: "Redeem a micro-coaching prompt to guide a 60-second calm reset.",
        rule: CouponRule::MinAvailablePoints { points: 80 },
        reward: CouponReward::Prompt {
            title: "60-Second Calm Reset Script",
            text: CALM_RESET_SCRIPT,
        },
    },
];

/// Read-only view of every reward definition
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Catalog {
    pub badges: &'static [Badge],
    pub coupons: &'static [Coupon],
}

pub fn catalog() -> Catalog {
    Catalog {
        badges: BADGES,
        coupons: COUPONS,
    }
}
