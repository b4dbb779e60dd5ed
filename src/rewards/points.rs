//! Point computation
//!
//! Points are recomputed from the snapshots on every read and never cached.

use super::snapshot::{ChallengeSnapshot, MAX_COUNT, ProgressSnapshot};

/// Upper bound for any point value
pub const MAX_POINTS: u32 = 2_000_000_000;

/// Point rewards for logged practice
pub struct PointRewards;

impl PointRewards {
    pub const PER_MINUTE: u64 = 10;
    pub const PER_SESSION: u64 = 5;

    /// Streak bonus: step function with breakpoints at 3, 7 and 21 days
    pub fn streak_bonus(day_streak: u32) -> u64 {
        match day_streak {
            21.. => 200,
            7..=20 => 75,
            3..=6 => 25,
            _ => 0,
        }
    }
}

/// Total practice minutes across the progress and challenge stores
pub fn total_minutes(progress: &ProgressSnapshot, challenge: &ChallengeSnapshot) -> u64 {
    (progress.total_seconds / 60).saturating_add(challenge.total_minutes.min(MAX_COUNT as u64))
}

/// Total points earned from practice, clamped to `[0, MAX_POINTS]`
pub fn compute_points(progress: &ProgressSnapshot, challenge: &ChallengeSnapshot) -> u32 {
    let from_minutes = total_minutes(progress, challenge).saturating_mul(PointRewards::PER_MINUTE);
    let from_sessions = progress
        .sessions
        .min(MAX_COUNT as u64)
        .saturating_mul(PointRewards::PER_SESSION);
    let bonus = PointRewards::streak_bonus(progress.day_streak);

    from_minutes
        .saturating_add(from_sessions)
        .saturating_add(bonus)
        .min(MAX_POINTS as u64) as u32
}

/// Points still spendable: `total - spent`, clamped into `[0, total]`
pub fn available_points(total_points: u32, points_spent: u64) -> u32 {
    let spent = points_spent.min(total_points as u64) as u32;
    total_points - spent
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress(sessions: u64, total_seconds: u64, day_streak: u32) -> ProgressSnapshot {
        ProgressSnapshot {
            sessions,
            total_seconds,
            day_streak,
            ..Default::default()
        }
    }

    fn challenge(total_minutes: u64) -> ChallengeSnapshot {
        ChallengeSnapshot {
            total_minutes,
            ..Default::default()
        }
    }

    #[test]
    fn test_scenario_hour_of_practice() {
        let points = compute_points(&progress(5, 3600, 3), &challenge(0));
        assert_eq!(points, 60 * 10 + 5 * 5 + 25);
        assert_eq!(points, 650);
    }

    #[test]
    fn test_empty_snapshots_score_zero() {
        let points = compute_points(&ProgressSnapshot::default(), &ChallengeSnapshot::default());
        assert_eq!(points, 0);
    }

    #[test]
    fn test_partial_minutes_are_floored() {
        assert_eq!(compute_points(&progress(0, 119, 0), &challenge(0)), 10);
        assert_eq!(compute_points(&progress(0, 59, 0), &challenge(2)), 20);
    }

    #[test]
    fn test_streak_bonus_breakpoints() {
        let expected = [
            (0, 0),
            (2, 0),
            (3, 25),
            (6, 25),
            (7, 75),
            (20, 75),
            (21, 200),
            (36_500, 200),
        ];
        for (days, bonus) in expected {
            assert_eq!(PointRewards::streak_bonus(days), bonus, "streak {}", days);
        }

        let mut last = 0;
        for days in 0..=100 {
            let bonus = PointRewards::streak_bonus(days);
            assert!([0, 25, 75, 200].contains(&bonus));
            assert!(bonus >= last);
            last = bonus;
        }
    }

    #[test]
    fn test_monotonic_in_each_input() {
        let base = compute_points(&progress(10, 600, 2), &challenge(5));
        assert!(compute_points(&progress(11, 600, 2), &challenge(5)) >= base);
        assert!(compute_points(&progress(10, 660, 2), &challenge(5)) >= base);
        assert!(compute_points(&progress(10, 600, 3), &challenge(5)) >= base);
        assert!(compute_points(&progress(10, 600, 2), &challenge(6)) >= base);
    }

    #[test]
    fn test_pure() {
        let p = progress(7, 12_345, 8);
        let c = challenge(33);
        assert_eq!(compute_points(&p, &c), compute_points(&p, &c));
    }

    #[test]
    fn test_points_clamped() {
        let p = progress(1_000_000_000, 1_000_000_000_000, 36_500);
        let c = challenge(1_000_000_000);
        assert_eq!(compute_points(&p, &c), MAX_POINTS);
    }

    #[test]
    fn test_available_points_clamped() {
        assert_eq!(available_points(650, 120), 530);
        assert_eq!(available_points(650, 0), 650);
        assert_eq!(available_points(100, 5_000), 0);
        assert_eq!(available_points(0, 0), 0);
    }
}
