//! Name validation and field-by-field checks for loaded save snapshots.

use crate::sim::clock::{DAYS_PER_MONTH, HOURS_PER_DAY, MINUTES_PER_HOUR, MONTHS_PER_YEAR};
use crate::sim::progression::{level_for_xp, MAX_LEVEL, XP_CAP};
use crate::sim::stat::{STAT_MAX, STAT_MIN};
use crate::sim::types::{GrowthStage, MoodState};
use crate::storage::snapshot::{SaveSnapshot, SAVE_VERSION};

pub const MAX_NAME_CHARS: usize = 50;

/// Creature name validation errors with helpful messages
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    #[error("Name cannot be empty")]
    Empty,

    #[error("Name is too long (maximum {max} characters)")]
    TooLong { max: usize },

    #[error("Name contains invalid characters: {chars}")]
    InvalidCharacters { chars: String },
}

/// Validate a creature name. Surrounding whitespace is trimmed.
pub fn validate_name(name: &str) -> Result<String, NameError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(NameError::Empty);
    }
    if trimmed.chars().count() > MAX_NAME_CHARS {
        return Err(NameError::TooLong {
            max: MAX_NAME_CHARS,
        });
    }
    if trimmed.chars().any(|c| c.is_control()) {
        let chars = trimmed
            .chars()
            .filter(|c| c.is_control())
            .map(|c| format!("\\u{{{:04x}}}", c as u32))
            .collect::<Vec<_>>()
            .join(", ");
        return Err(NameError::InvalidCharacters { chars });
    }
    Ok(trimmed.to_string())
}

/// Reasons a loaded snapshot is rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SnapshotError {
    #[error("invalid name: {0}")]
    Name(#[from] NameError),

    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: i64 },

    #[error("inconsistent snapshot: {0}")]
    Inconsistent(String),

    #[error("unsupported save version {0}")]
    UnsupportedVersion(u32),
}

impl From<SnapshotError> for crate::sim::SimError {
    fn from(err: SnapshotError) -> Self {
        crate::sim::SimError::Validation(err.to_string())
    }
}

fn check_range(field: &'static str, value: i64, min: i64, max: i64) -> Result<(), SnapshotError> {
    if value < min || value > max {
        return Err(SnapshotError::OutOfRange { field, value });
    }
    Ok(())
}

/// Range, membership and cross-field checks on a snapshot read from disk.
pub fn validate_snapshot(snapshot: &SaveSnapshot) -> Result<(), SnapshotError> {
    if snapshot.save_version == 0 || snapshot.save_version > SAVE_VERSION {
        return Err(SnapshotError::UnsupportedVersion(snapshot.save_version));
    }
    validate_name(&snapshot.name)?;

    let (lo, hi) = (STAT_MIN as i64, STAT_MAX as i64);
    for (field, value) in [
        ("water", snapshot.water),
        ("health", snapshot.health),
        ("growth", snapshot.growth),
        ("energy", snapshot.energy),
        ("hunger", snapshot.hunger),
        ("cleanliness", snapshot.cleanliness),
        ("mood", snapshot.mood),
    ] {
        check_range(field, value, lo, hi)?;
    }

    check_range("age", snapshot.age, 0, u32::MAX as i64)?;
    check_range("gameHour", snapshot.game_hour, 0, HOURS_PER_DAY as i64 - 1)?;
    check_range("gameMinute", snapshot.game_minute, 0, MINUTES_PER_HOUR as i64 - 1)?;
    check_range("gameDay", snapshot.game_day, 1, DAYS_PER_MONTH as i64)?;
    check_range("gameMonth", snapshot.game_month, 1, MONTHS_PER_YEAR as i64)?;
    check_range("gameYear", snapshot.game_year, 1, u32::MAX as i64)?;
    check_range("xp", snapshot.xp, 0, XP_CAP as i64)?;
    check_range("level", snapshot.level, 1, MAX_LEVEL as i64)?;
    check_range(
        "consecutiveDaysGoodCare",
        snapshot.consecutive_days_good_care,
        0,
        u32::MAX as i64,
    )?;
    check_range("bonsaiBills", snapshot.bonsai_bills, 0, i64::MAX)?;
    for count in snapshot.inventory_items.values() {
        check_range("inventoryItems", *count, 0, u32::MAX as i64)?;
    }

    let expected_level = level_for_xp(snapshot.xp as u64);
    if snapshot.level as u32 != expected_level {
        return Err(SnapshotError::Inconsistent(format!(
            "level {} does not match xp {} (expected level {})",
            snapshot.level, snapshot.xp, expected_level
        )));
    }
    let expected_stage = GrowthStage::for_level(snapshot.level as u32);
    if snapshot.growth_stage != expected_stage {
        return Err(SnapshotError::Inconsistent(format!(
            "growth stage {:?} does not match level {}",
            snapshot.growth_stage, snapshot.level
        )));
    }
    let expected_mood = MoodState::from_mood(snapshot.mood as u8);
    if snapshot.mood_state != expected_mood {
        return Err(SnapshotError::Inconsistent(format!(
            "mood state {:?} does not match mood {}",
            snapshot.mood_state, snapshot.mood
        )));
    }
    Ok(())
}
