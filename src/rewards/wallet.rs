//! Wallet ledger
//!
//! The wallet is the only store the engine writes. Loading is tolerant: a
//! missing or unparseable wallet becomes an empty one, and a malformed field
//! or entry is repaired on its own without discarding the rest.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::catalog::CouponKind;
use super::points::MAX_POINTS;
use super::snapshot::{clamp_int, number, parse_json};
use crate::storage::Storage;

/// Current wallet schema version
pub const WALLET_VERSION: u32 = 1;

/// Upper bound for a single token balance
pub const MAX_TOKENS: u32 = 999_999;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EarnedBadge {
    pub earned_at: Option<DateTime<Utc>>,
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RedeemedCoupon {
    pub redeemed_at: Option<DateTime<Utc>>,
    pub title: String,
    pub kind: Option<CouponKind>,
    pub token_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PromptEntry {
    pub title: String,
    pub text: String,
    pub redeemed_at: Option<DateTime<Utc>>,
}

/// Top-level keys this module reads; anything else is carried through as-is
const KNOWN_FIELDS: [&str; 7] = [
    "v",
    "pointsSpent",
    "earnedBadges",
    "redeemedCoupons",
    "tokens",
    "promptVault",
    "updatedAt",
];

/// Persisted ledger of spent points, earned badges, redeemed coupons and tokens
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    #[serde(rename = "v")]
    pub version: u32,
    pub points_spent: u64,
    pub earned_badges: BTreeMap<String, EarnedBadge>,
    pub redeemed_coupons: BTreeMap<String, RedeemedCoupon>,
    pub tokens: BTreeMap<String, u32>,
    pub prompt_vault: BTreeMap<String, PromptEntry>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Fields written by other versions, preserved on save
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Wallet {
    /// An empty wallet stamped with `now`
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            version: WALLET_VERSION,
            points_spent: 0,
            earned_badges: BTreeMap::new(),
            redeemed_coupons: BTreeMap::new(),
            tokens: BTreeMap::new(),
            prompt_vault: BTreeMap::new(),
            updated_at: Some(now),
            extra: Map::new(),
        }
    }

    /// Rebuild a wallet from stored JSON, field by field.
    ///
    /// Badge, coupon and prompt entries are kept even when their payload is
    /// malformed, so a badge is never revoked, a coupon never becomes
    /// redeemable again and a paid prompt is never lost because of a bad write.
    pub fn from_value(value: Option<&Value>, now: DateTime<Utc>) -> Self {
        let Some(obj) = value.and_then(Value::as_object) else {
            return Self::new(now);
        };

        let tokens = obj
            .get("tokens")
            .and_then(Value::as_object)
            .map(|map| {
                map.iter()
                    .map(|(id, count)| {
                        let count = number(Some(count)).unwrap_or(0.0);
                        (id.clone(), clamp_int(count, 0, MAX_TOKENS as i64) as u32)
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            version: number(obj.get("v"))
                .map(|v| clamp_int(v, 0, u32::MAX as i64) as u32)
                .unwrap_or(WALLET_VERSION),
            points_spent: clamp_int(
                number(obj.get("pointsSpent")).unwrap_or(0.0),
                0,
                MAX_POINTS as i64,
            ) as u64,
            earned_badges: entries_or_default(obj.get("earnedBadges")),
            redeemed_coupons: entries_or_default(obj.get("redeemedCoupons")),
            tokens,
            prompt_vault: entries_or_default(obj.get("promptVault")),
            updated_at: obj
                .get("updatedAt")
                .and_then(|v| serde_json::from_value(v.clone()).ok()),
            extra: obj
                .iter()
                .filter(|(key, _)| !KNOWN_FIELDS.contains(&key.as_str()))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        }
    }

    /// Current balance of a token
    pub fn token_count(&self, token_id: &str) -> u32 {
        self.tokens.get(token_id).copied().unwrap_or(0)
    }
}

/// Keep every key; entries that fail to parse fall back to their default
fn entries_or_default<T>(value: Option<&Value>) -> BTreeMap<String, T>
where
    T: DeserializeOwned + Default,
{
    let Some(map) = value.and_then(Value::as_object) else {
        return BTreeMap::new();
    };
    map.iter()
        .map(|(id, entry)| {
            let parsed = serde_json::from_value(entry.clone()).unwrap_or_else(|e| {
                tracing::debug!("Repairing malformed wallet entry '{}': {}", id, e);
                T::default()
            });
            (id.clone(), parsed)
        })
        .collect()
}

/// Load the wallet stored under `key`, or a fresh one
pub fn load_wallet<S: Storage + ?Sized>(storage: &S, key: &str, now: DateTime<Utc>) -> Wallet {
    let raw = storage.get(key);
    let value = parse_json(raw.as_deref());
    Wallet::from_value(value.as_ref(), now)
}

/// Stamp and persist the wallet. Returns `false` if the write failed; the
/// caller keeps working with its in-memory copy.
pub fn save_wallet<S: Storage + ?Sized>(
    storage: &S,
    key: &str,
    wallet: &mut Wallet,
    now: DateTime<Utc>,
) -> bool {
    wallet.updated_at = Some(now);

    let json = match serde_json::to_string(wallet) {
        Ok(json) => json,
        Err(e) => {
            tracing::warn!("Failed to serialize wallet: {}", e);
            return false;
        }
    };

    match storage.set(key, &json) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Failed to save wallet to '{}': {}", key, e);
            false
        }
    }
}
