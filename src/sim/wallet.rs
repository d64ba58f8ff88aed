//! Bonsai bills wallet with a once-per-day grant, following the slot machine's
//! "grant, then refill after 24h" economy.

use chrono::{DateTime, Duration, Utc};

use crate::sim::errors::SimError;

/// Bills granted by a daily reward claim.
pub const DAILY_REWARD: u64 = 50;
/// Hours between daily reward claims.
pub const DAILY_REWARD_HOURS: i64 = 24;
/// Starting balance for a new creature.
pub const STARTING_BILLS: u64 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wallet {
    bills: u64,
    last_daily_reward: Option<DateTime<Utc>>,
}

impl Default for Wallet {
    fn default() -> Self {
        Self {
            bills: STARTING_BILLS,
            last_daily_reward: None,
        }
    }
}

impl Wallet {
    pub fn with_balance(bills: u64, last_daily_reward: Option<DateTime<Utc>>) -> Self {
        Self {
            bills,
            last_daily_reward,
        }
    }

    pub fn balance(&self) -> u64 {
        self.bills
    }

    pub fn last_daily_reward(&self) -> Option<DateTime<Utc>> {
        self.last_daily_reward
    }

    pub fn earn(&mut self, amount: u64) {
        self.bills = self.bills.saturating_add(amount);
    }

    pub fn spend(&mut self, amount: u64) -> Result<(), SimError> {
        if amount > self.bills {
            return Err(SimError::InsufficientFunds);
        }
        self.bills -= amount;
        Ok(())
    }

    pub fn daily_reward_ready(&self, now: DateTime<Utc>) -> bool {
        match self.last_daily_reward {
            Some(last) => now.signed_duration_since(last) >= Duration::hours(DAILY_REWARD_HOURS),
            None => true,
        }
    }

    /// Grant the daily reward when due. Returns the amount granted.
    pub fn claim_daily_reward(&mut self, now: DateTime<Utc>) -> Option<u64> {
        if !self.daily_reward_ready(now) {
            return None;
        }
        self.earn(DAILY_REWARD);
        self.last_daily_reward = Some(now);
        Some(DAILY_REWARD)
    }
}
