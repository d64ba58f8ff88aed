//! Autosave scheduler.
//!
//! The session loop polls [`AutosaveScheduler::is_due`] on every tick; the
//! scheduler only tracks time and never touches the disk itself.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Autosave configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutosaveConfig {
    /// Whether automatic saves are enabled
    pub enabled: bool,
    /// Minutes between automatic saves
    pub interval_minutes: u64,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_minutes: 5,
        }
    }
}

impl AutosaveConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes.max(1) * 60)
    }
}

/// Snapshot of scheduler state for status output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutosaveStatus {
    pub enabled: bool,
    pub interval_minutes: u64,
    pub saves_completed: u64,
    pub next_due_in: Option<Duration>,
}

pub struct AutosaveScheduler {
    config: AutosaveConfig,
    last_save: Instant,
    saves_completed: u64,
}

impl AutosaveScheduler {
    /// The first autosave falls one interval after `started`.
    pub fn new(config: AutosaveConfig, started: Instant) -> Self {
        Self {
            config,
            last_save: started,
            saves_completed: 0,
        }
    }

    pub fn config(&self) -> &AutosaveConfig {
        &self.config
    }

    pub fn enable(&mut self) {
        self.config.enabled = true;
        info!("Autosave enabled");
    }

    pub fn disable(&mut self) {
        self.config.enabled = false;
        info!("Autosave disabled");
    }

    pub fn set_interval_minutes(&mut self, minutes: u64) {
        self.config.interval_minutes = minutes.max(1);
        info!("Autosave interval set to {} minutes", self.config.interval_minutes);
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.config.enabled && now.saturating_duration_since(self.last_save) >= self.config.interval()
    }

    /// Record a save (manual or automatic) so the next autosave is pushed back.
    pub fn mark_saved(&mut self, now: Instant) {
        self.last_save = now;
        self.saves_completed += 1;
        debug!("Autosave clock reset after save #{}", self.saves_completed);
    }

    pub fn status(&self, now: Instant) -> AutosaveStatus {
        let next_due_in = if self.config.enabled {
            Some(
                self.config
                    .interval()
                    .saturating_sub(now.saturating_duration_since(self.last_save)),
            )
        } else {
            None
        };
        AutosaveStatus {
            enabled: self.config.enabled,
            interval_minutes: self.config.interval_minutes,
            saves_completed: self.saves_completed,
            next_due_in,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn due_after_interval() {
        let start = Instant::now();
        let scheduler = AutosaveScheduler::new(
            AutosaveConfig {
                enabled: true,
                interval_minutes: 5,
            },
            start,
        );
        assert!(!scheduler.is_due(start + Duration::from_secs(299)));
        assert!(scheduler.is_due(start + Duration::from_secs(300)));
    }

    #[test]
    fn disabled_is_never_due() {
        let start = Instant::now();
        let mut scheduler = AutosaveScheduler::new(AutosaveConfig::default(), start);
        scheduler.disable();
        assert!(!scheduler.is_due(start + Duration::from_secs(3600)));
        assert_eq!(scheduler.status(start).next_due_in, None);
    }

    #[test]
    fn saving_resets_the_clock() {
        let start = Instant::now();
        let mut scheduler = AutosaveScheduler::new(AutosaveConfig::default(), start);
        let later = start + Duration::from_secs(400);
        assert!(scheduler.is_due(later));
        scheduler.mark_saved(later);
        assert!(!scheduler.is_due(later + Duration::from_secs(10)));
        assert_eq!(scheduler.status(later).saves_completed, 1);
    }
}
