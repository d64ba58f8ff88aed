//! XP curve, level derivation and streak bonuses.

use crate::sim::types::MoodState;

/// XP never grows past this value; additions saturate here instead of wrapping.
pub const XP_CAP: u64 = i32::MAX as u64;
/// Hard ceiling for `level` so a capped XP total cannot loop forever.
pub const MAX_LEVEL: u32 = 1000;
/// Longest streak bonus, reached at 10 consecutive good-care days.
pub const MAX_STREAK_BONUS: f64 = 0.5;

/// Cumulative XP needed to leave `level`: `max(100, 100 * level^1.5)`.
pub fn xp_for_next_level(level: u32) -> u64 {
    let raw = 100.0 * (level.max(1) as f64).powf(1.5);
    if !raw.is_finite() || raw >= XP_CAP as f64 {
        return XP_CAP;
    }
    (raw.floor() as u64).max(100)
}

/// The level a given cumulative XP total corresponds to.
pub fn level_for_xp(xp: u64) -> u32 {
    let mut level = 1;
    while level < MAX_LEVEL && xp >= xp_for_next_level(level) {
        level += 1;
    }
    level
}

pub fn streak_bonus(consecutive_days: u32) -> f64 {
    (consecutive_days as f64 * 0.05).min(MAX_STREAK_BONUS)
}

/// Scale a base award by mood and streak. Always at least 1.
pub fn scaled_xp(base: u32, mood: MoodState, consecutive_days: u32) -> u64 {
    let scaled = base as f64 * mood.xp_multiplier() * (1.0 + streak_bonus(consecutive_days));
    (scaled.floor() as u64).max(1)
}

/// Add XP with the overflow guard applied.
pub fn add_capped(xp: u64, amount: u64) -> u64 {
    xp.saturating_add(amount).min(XP_CAP)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xp_curve_has_floor_of_one_hundred() {
        assert_eq!(xp_for_next_level(1), 100);
        assert_eq!(xp_for_next_level(2), 282);
        assert_eq!(xp_for_next_level(4), 800);
        assert_eq!(xp_for_next_level(0), 100);
    }

    #[test]
    fn xp_curve_is_overflow_guarded() {
        assert_eq!(xp_for_next_level(u32::MAX), XP_CAP);
        assert!(xp_for_next_level(MAX_LEVEL) < XP_CAP);
    }

    #[test]
    fn level_lookup_matches_thresholds() {
        assert_eq!(level_for_xp(0), 1);
        assert_eq!(level_for_xp(99), 1);
        assert_eq!(level_for_xp(100), 2);
        assert_eq!(level_for_xp(281), 2);
        assert_eq!(level_for_xp(282), 3);
        assert!(level_for_xp(XP_CAP) <= MAX_LEVEL);
    }

    #[test]
    fn streak_bonus_caps_at_half() {
        assert_eq!(streak_bonus(0), 0.0);
        assert!((streak_bonus(4) - 0.2).abs() < 1e-9);
        assert_eq!(streak_bonus(30), MAX_STREAK_BONUS);
    }

    #[test]
    fn scaled_xp_applies_mood_and_streak() {
        assert_eq!(scaled_xp(10, MoodState::Neutral, 0), 10);
        assert_eq!(scaled_xp(10, MoodState::Ecstatic, 0), 13);
        assert_eq!(scaled_xp(10, MoodState::Neutral, 10), 15);
        assert_eq!(scaled_xp(1, MoodState::Miserable, 0), 1);
    }

    #[test]
    fn add_capped_saturates() {
        assert_eq!(add_capped(XP_CAP - 1, 10), XP_CAP);
        assert_eq!(add_capped(u64::MAX, 1), XP_CAP);
    }
}
