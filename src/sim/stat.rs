//! Bounded integer vital with a fractional carry.
//!
//! Decay rates are fractions of a unit per simulated minute while vitals are whole
//! numbers in `[0, 100]`. `Stat` keeps the leftover fraction so a one-second tick that
//! drains 0.0013 water still adds up over a minute instead of truncating to nothing.

pub const STAT_MIN: u8 = 0;
pub const STAT_MAX: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Stat {
    value: u8,
    carry: f64,
}

impl Stat {
    pub fn new(value: i64) -> Self {
        Self {
            value: clamp_value(value),
            carry: 0.0,
        }
    }

    pub fn get(&self) -> u8 {
        self.value
    }

    /// Overwrite the value, dropping any accumulated fraction.
    pub fn set(&mut self, value: i64) {
        self.value = clamp_value(value);
        self.carry = 0.0;
    }

    /// Apply a whole-unit delta immediately.
    pub fn add(&mut self, delta: i64) {
        self.value = clamp_value(self.value as i64 + delta);
        self.drop_carry_at_bounds();
    }

    /// Apply a fractional delta; only whole units move the visible value.
    pub fn apply(&mut self, delta: f64) {
        if !delta.is_finite() || delta == 0.0 {
            return;
        }
        self.carry += delta;
        let whole = self.carry.trunc();
        if whole != 0.0 {
            self.carry -= whole;
            self.value = clamp_value(self.value as i64 + whole as i64);
        }
        self.drop_carry_at_bounds();
    }

    fn drop_carry_at_bounds(&mut self) {
        if (self.value == STAT_MAX && self.carry > 0.0) || (self.value == STAT_MIN && self.carry < 0.0)
        {
            self.carry = 0.0;
        }
    }
}

fn clamp_value(value: i64) -> u8 {
    value.clamp(STAT_MIN as i64, STAT_MAX as i64) as u8
}
