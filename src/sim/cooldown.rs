//! Per-action cooldown bookkeeping, modeled on the per-player cooldown entries of the
//! trigger rate limiter: a last-used timestamp per key compared against a fixed window.

use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;

use crate::sim::types::CareAction;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CooldownTracker {
    last_used: BTreeMap<CareAction, DateTime<Utc>>,
}

impl CooldownTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a tracker from saved last-used stamps.
    pub fn from_entries(last_used: BTreeMap<CareAction, DateTime<Utc>>) -> Self {
        Self { last_used }
    }

    pub fn entries(&self) -> &BTreeMap<CareAction, DateTime<Utc>> {
        &self.last_used
    }

    pub fn last_used(&self, action: CareAction) -> Option<DateTime<Utc>> {
        self.last_used.get(&action).copied()
    }

    /// True when the action has never been used or its window has passed.
    pub fn is_ready(&self, action: CareAction, now: DateTime<Utc>) -> bool {
        self.remaining(action, now).is_none()
    }

    /// Time left on the cooldown, `None` when ready.
    pub fn remaining(&self, action: CareAction, now: DateTime<Utc>) -> Option<Duration> {
        let last = self.last_used.get(&action)?;
        let ready_at = *last + Duration::minutes(action.cooldown_minutes());
        if now < ready_at {
            Some(ready_at - now)
        } else {
            None
        }
    }

    /// Record a use. Timestamps never move backwards for an action.
    pub fn mark(&mut self, action: CareAction, now: DateTime<Utc>) {
        let entry = self.last_used.entry(action).or_insert(now);
        if now > *entry {
            *entry = now;
        }
    }

    /// Move every timestamp by `by`, keeping relative order.
    pub(crate) fn shift(&mut self, by: Duration) {
        for last in self.last_used.values_mut() {
            *last += by;
        }
    }

    /// Drop entries whose window has fully elapsed. Returns the expired actions.
    pub fn expire(&mut self, now: DateTime<Utc>) -> Vec<CareAction> {
        let expired: Vec<CareAction> = self
            .last_used
            .iter()
            .filter(|(action, last)| now >= **last + Duration::minutes(action.cooldown_minutes()))
            .map(|(action, _)| *action)
            .collect();
        for action in &expired {
            self.last_used.remove(action);
        }
        expired
    }
}

/// The "can do X" flags recomputed at the end of every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActionAvailability {
    pub can_water: bool,
    pub can_prune: bool,
    pub can_rest: bool,
    pub can_fertilize: bool,
    pub can_clean: bool,
    pub can_exercise: bool,
    pub can_train: bool,
    pub can_play: bool,
    pub can_meditate: bool,
}

impl ActionAvailability {
    pub fn compute(cooldowns: &CooldownTracker, energy: u8, now: DateTime<Utc>) -> Self {
        let ok = |action: CareAction| {
            cooldowns.is_ready(action, now) && energy >= action.energy_required()
        };
        Self {
            can_water: ok(CareAction::Water),
            can_prune: ok(CareAction::Prune),
            can_rest: ok(CareAction::Rest),
            can_fertilize: ok(CareAction::Fertilize),
            can_clean: ok(CareAction::CleanArea),
            can_exercise: ok(CareAction::LightExercise),
            can_train: ok(CareAction::IntenseTraining),
            can_play: ok(CareAction::Play),
            can_meditate: ok(CareAction::Meditation),
        }
    }

    pub fn get(&self, action: CareAction) -> bool {
        match action {
            CareAction::Water => self.can_water,
            CareAction::Prune => self.can_prune,
            CareAction::Rest => self.can_rest,
            CareAction::Fertilize => self.can_fertilize,
            CareAction::CleanArea => self.can_clean,
            CareAction::LightExercise => self.can_exercise,
            CareAction::IntenseTraining => self.can_train,
            CareAction::Play => self.can_play,
            CareAction::Meditation => self.can_meditate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn cooldown_window_per_action() {
        let mut cd = CooldownTracker::new();
        cd.mark(CareAction::Water, t0());
        assert!(!cd.is_ready(CareAction::Water, t0() + Duration::seconds(119)));
        assert!(cd.is_ready(CareAction::Water, t0() + Duration::minutes(2)));
        assert!(cd.is_ready(CareAction::Prune, t0()));
    }

    #[test]
    fn mark_never_moves_backwards() {
        let mut cd = CooldownTracker::new();
        cd.mark(CareAction::Rest, t0());
        cd.mark(CareAction::Rest, t0() - Duration::minutes(10));
        assert_eq!(cd.last_used(CareAction::Rest), Some(t0()));
    }

    #[test]
    fn expire_removes_elapsed_entries() {
        let mut cd = CooldownTracker::new();
        cd.mark(CareAction::Rest, t0());
        cd.mark(CareAction::Fertilize, t0());
        let expired = cd.expire(t0() + Duration::minutes(1));
        assert_eq!(expired, vec![CareAction::Rest]);
        assert!(cd.last_used(CareAction::Fertilize).is_some());
    }

    #[test]
    fn availability_respects_energy_gates() {
        let cd = CooldownTracker::new();
        let tired = ActionAvailability::compute(&cd, 40, t0());
        assert!(tired.can_exercise);
        assert!(!tired.can_train);
        assert!(tired.get(CareAction::Play));
        let exhausted = ActionAvailability::compute(&cd, 10, t0());
        assert!(!exhausted.can_play);
        assert!(exhausted.can_water);
    }
}
