use serde::{Deserialize, Serialize};

pub const MINUTES_PER_HOUR: u32 = 60;
pub const HOURS_PER_DAY: u32 = 24;
pub const DAYS_PER_MONTH: u32 = 30;
pub const MONTHS_PER_YEAR: u32 = 12;

/// In-game calendar owned by the creature: hour 0-23, minute 0-59, day 1-30,
/// month 1-12, year >= 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameClock {
    pub hour: u32,
    pub minute: u32,
    pub day: u32,
    pub month: u32,
    pub year: u32,
}

impl Default for GameClock {
    fn default() -> Self {
        Self {
            hour: 8,
            minute: 0,
            day: 1,
            month: 1,
            year: 1,
        }
    }
}

impl GameClock {
    /// Clamp every field back into its domain.
    pub fn normalized(self) -> Self {
        Self {
            hour: self.hour.min(HOURS_PER_DAY - 1),
            minute: self.minute.min(MINUTES_PER_HOUR - 1),
            day: self.day.clamp(1, DAYS_PER_MONTH),
            month: self.month.clamp(1, MONTHS_PER_YEAR),
            year: self.year.max(1),
        }
    }

    pub fn is_valid(&self) -> bool {
        *self == self.normalized()
    }

    /// Advance by whole game minutes, carrying into hour, day, month and year.
    /// Returns the number of day rollovers that happened.
    pub fn advance(&mut self, game_minutes: u64) -> u32 {
        let total = self.minute as u64 + game_minutes;
        self.minute = (total % MINUTES_PER_HOUR as u64) as u32;

        let total_hours = self.hour as u64 + total / MINUTES_PER_HOUR as u64;
        self.hour = (total_hours % HOURS_PER_DAY as u64) as u32;

        let rollovers = total_hours / HOURS_PER_DAY as u64;
        for _ in 0..rollovers {
            self.next_day();
        }
        rollovers.min(u32::MAX as u64) as u32
    }

    fn next_day(&mut self) {
        self.day += 1;
        if self.day > DAYS_PER_MONTH {
            self.day = 1;
            self.month += 1;
            if self.month > MONTHS_PER_YEAR {
                self.month = 1;
                self.year = self.year.saturating_add(1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minute_carry_into_hour() {
        let mut clock = GameClock::default();
        assert_eq!(clock.advance(75), 0);
        assert_eq!((clock.hour, clock.minute), (9, 15));
    }

    #[test]
    fn day_rollover_counts() {
        let mut clock = GameClock::default();
        // 08:00 + 16h = midnight, one rollover
        assert_eq!(clock.advance(16 * 60), 1);
        assert_eq!((clock.hour, clock.minute, clock.day), (0, 0, 2));
        assert_eq!(clock.advance(3 * 24 * 60), 3);
        assert_eq!(clock.day, 5);
    }

    #[test]
    fn month_and_year_rollover() {
        let mut clock = GameClock {
            hour: 23,
            minute: 59,
            day: 30,
            month: 12,
            year: 4,
        };
        assert_eq!(clock.advance(1), 1);
        assert_eq!(clock, GameClock { hour: 0, minute: 0, day: 1, month: 1, year: 5 });
    }

    #[test]
    fn normalizes_out_of_range_fields() {
        let clock = GameClock { hour: 40, minute: 99, day: 0, month: 13, year: 0 }.normalized();
        assert!(clock.is_valid());
        assert_eq!(clock, GameClock { hour: 23, minute: 59, day: 1, month: 12, year: 1 });
    }
}
