//! Snapshot readers for the progress and challenge stores
//!
//! Both stores hold JSON written by other parts of the app over several
//! releases. Readers never fail: anything missing, malformed or of the wrong
//! type becomes zero/default, and every number is clamped to a sane range.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use super::category::{Category, CategoryCounts, normalise_tech_id};

pub const MAX_COUNT: i64 = 1_000_000_000;
pub const MAX_SECONDS: i64 = 1_000_000_000_000;
pub const MAX_STREAK_DAYS: i64 = 36_500;

/// Normalized view of the primary progress store
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    pub sessions: u64,
    pub total_seconds: u64,
    pub today_seconds: u64,
    pub day_streak: u32,
    pub total_breaths: u64,
    /// day key -> technique id -> uses that day
    pub history: BTreeMap<String, BTreeMap<String, u64>>,
    /// Technique id of the most recent session
    pub last_session: Option<String>,
}

/// Normalized view of the optional challenge store
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeSnapshot {
    pub total_minutes: u64,
    pub today_minutes: u64,
    pub categories: CategoryCounts,
}

/// Parse raw store contents, treating anything unparseable as absent
pub fn parse_json(raw: Option<&str>) -> Option<Value> {
    let raw = raw?;
    if raw.trim().is_empty() {
        return None;
    }
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!("Ignoring unparseable store value: {}", e);
            None
        }
    }
}

/// Read a JSON number (or numeric string) as a finite float
pub fn number(value: Option<&Value>) -> Option<f64> {
    let x = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    x.is_finite().then_some(x)
}

/// Truncate toward zero and clamp to `[min, max]`
pub fn clamp_int(x: f64, min: i64, max: i64) -> i64 {
    let t = x.trunc();
    if t <= min as f64 {
        min
    } else if t >= max as f64 {
        max
    } else {
        t as i64
    }
}

fn clamped(value: Option<&Value>, max: i64) -> u64 {
    clamp_int(number(value).unwrap_or(0.0), 0, max) as u64
}

fn object(value: Option<&Value>) -> Option<&serde_json::Map<String, Value>> {
    value.and_then(Value::as_object)
}

/// First key present (and not null) on an object
fn first_present<'a>(obj: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find(|v| !v.is_null())
}

/// Build a progress snapshot from the raw progress store value
pub fn read_progress(raw: Option<&Value>) -> ProgressSnapshot {
    let Some(raw) = raw.filter(|v| v.is_object()) else {
        return ProgressSnapshot::default();
    };

    let today_seconds = raw
        .get("todaySeconds")
        .filter(|v| !v.is_null())
        .or_else(|| raw.get("today").and_then(|t| t.get("seconds")));

    let last_session = raw
        .get("lastSession")
        .and_then(|s| first_present(s, &["techniqueId", "techId"]))
        .and_then(Value::as_str)
        .map(normalise_tech_id)
        .filter(|s| !s.is_empty());

    ProgressSnapshot {
        sessions: clamped(raw.get("sessions"), MAX_COUNT),
        total_seconds: clamped(raw.get("totalSeconds"), MAX_SECONDS),
        today_seconds: clamped(today_seconds, MAX_SECONDS),
        day_streak: clamped(first_present(raw, &["dayStreak", "streakDays"]), MAX_STREAK_DAYS)
            as u32,
        total_breaths: clamped(raw.get("totalBreaths"), MAX_COUNT),
        history: read_history(raw.get("history")),
        last_session,
    }
}

/// History may be `{days: {...}}`, `{byDay: {...}}` or the day map itself.
/// Each day keeps its technique counts under `techs`, `techCounts` or
/// `techniques`; days without counts are skipped.
fn read_history(history: Option<&Value>) -> BTreeMap<String, BTreeMap<String, u64>> {
    let mut out = BTreeMap::new();
    let Some(history) = history.filter(|v| v.is_object()) else {
        return out;
    };

    let days = object(first_present(history, &["days", "byDay"]).filter(|v| v.is_object()))
        .or_else(|| history.as_object());
    let Some(days) = days else {
        return out;
    };

    for (day_key, day) in days {
        let Some(techs) = object(first_present(day, &["techs", "techCounts", "techniques"]))
        else {
            continue;
        };
        let counts: BTreeMap<String, u64> = techs
            .iter()
            .map(|(id, count)| (id.clone(), clamped(Some(count), MAX_COUNT)))
            .collect();
        out.insert(day_key.clone(), counts);
    }

    out
}

/// Sum technique usage across all days of history
pub fn tech_counts(progress: &ProgressSnapshot) -> BTreeMap<String, u64> {
    let mut out: BTreeMap<String, u64> = BTreeMap::new();
    for techs in progress.history.values() {
        for (id, count) in techs {
            let slot = out.entry(id.clone()).or_default();
            *slot = slot.saturating_add(*count).min(MAX_COUNT as u64);
        }
    }
    out
}

/// Where a historical challenge-store shape keeps today's minutes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TodayMinutesSource {
    /// `today: {minutes | mins}`
    NestedToday,
    /// `byDay: {"YYYY-MM-DD": {minutes | mins}}`
    ByDayMap,
    /// `days: {"YYYY-MM-DD": {minutes | mins}}`
    DaysMap,
    /// `todayMinutes` at the root or under `fallbackTotals`
    Flat,
}

impl TodayMinutesSource {
    /// Probe order; the first strategy whose container exists wins
    pub const ORDER: [TodayMinutesSource; 4] = [
        TodayMinutesSource::NestedToday,
        TodayMinutesSource::ByDayMap,
        TodayMinutesSource::DaysMap,
        TodayMinutesSource::Flat,
    ];

    /// Extract today's minutes, or `None` if this shape is not present
    pub fn extract(&self, raw: &Value, today_key: &str) -> Option<f64> {
        let minutes_of = |bucket: Option<&Value>| {
            bucket
                .and_then(|b| first_present(b, &["minutes", "mins"]))
                .and_then(|v| number(Some(v)))
                .unwrap_or(0.0)
        };

        match self {
            Self::NestedToday => {
                let today = raw.get("today").filter(|v| v.is_object())?;
                Some(minutes_of(Some(today)))
            }
            Self::ByDayMap => {
                let by_day = raw.get("byDay").filter(|v| v.is_object())?;
                Some(minutes_of(by_day.get(today_key)))
            }
            Self::DaysMap => {
                let days = raw.get("days").filter(|v| v.is_object())?;
                Some(minutes_of(days.get(today_key)))
            }
            Self::Flat => {
                let flat = raw.get("todayMinutes").filter(|v| !v.is_null()).or_else(|| {
                    raw.get("fallbackTotals")
                        .and_then(|t| t.get("todayMinutes"))
                        .filter(|v| !v.is_null())
                })?;
                Some(number(Some(flat)).unwrap_or(0.0))
            }
        }
    }
}

/// Build a challenge snapshot from the raw challenge store value
pub fn read_challenge(raw: Option<&Value>, today_key: &str) -> ChallengeSnapshot {
    let Some(raw) = raw.filter(|v| v.is_object()) else {
        return ChallengeSnapshot::default();
    };

    let category_source = first_present(
        raw,
        &["categoryCounts", "categories", "counts", "challengeCompletions"],
    );
    let mut categories = CategoryCounts::default();
    for category in Category::ALL {
        let value = category_source.and_then(|c| c.get(category.as_str()));
        categories.set(category, clamped(value, MAX_COUNT));
    }

    let totals = first_present(raw, &["totals", "stats", "fallbackTotals"])
        .filter(|v| v.is_object())
        .unwrap_or(raw);

    // Older shapes wrote zeros into fields they no longer used, so the first
    // non-zero candidate wins.
    let candidates = [
        raw.get("totalMinutes"),
        totals.get("totalMinutes"),
        totals.get("totalMins"),
        totals.get("total_mins"),
        totals.get("totalMinsLifetime"),
    ];
    let total_minutes = candidates
        .into_iter()
        .filter_map(number)
        .find(|m| *m != 0.0)
        .unwrap_or(0.0);

    let today_minutes = TodayMinutesSource::ORDER
        .iter()
        .find_map(|source| source.extract(raw, today_key))
        .unwrap_or(0.0);

    ChallengeSnapshot {
        total_minutes: clamp_int(total_minutes, 0, MAX_COUNT) as u64,
        today_minutes: clamp_int(today_minutes, 0, MAX_COUNT) as u64,
        categories,
    }
}
