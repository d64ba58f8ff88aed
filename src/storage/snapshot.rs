//! Versioned JSON save snapshot and its conversion to and from the engines.
//!
//! Numeric fields are kept as signed integers on the wire so that a hand-edited
//! or corrupted file still parses and can be rejected by validation instead of
//! failing deserialization with an opaque error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::sim::clock::GameClock;
use crate::sim::cooldown::{ActionAvailability, CooldownTracker};
use crate::sim::creature::{ActiveEffect, Creature};
use crate::sim::environment::{
    DailyForecast, Environment, EnvironmentSettings, Readings, HUMIDITY_RANGE, QUALITY_RANGE,
    TEMPERATURE_RANGE,
};
use crate::sim::errors::SimError;
use crate::sim::events::{
    self, EnvironmentEvent, UpcomingEvent, MAX_EVENT_HOURS, MAX_INTENSITY, MIN_EVENT_HOURS,
    MIN_INTENSITY,
};
use crate::sim::inventory::Inventory;
use crate::sim::progression::{level_for_xp, XP_CAP};
use crate::sim::rng::SimRng;
use crate::sim::stat::Stat;
use crate::sim::types::{
    CareAction, ClimateZone, CreatureState, GrowthStage, HealthCondition, MoodState, Season,
    TimeOfDay, Weather,
};
use crate::sim::wallet::Wallet;
use crate::validation::validate_name;

/// Current on-disk format version. Version 3 added cooldowns and pending effects;
/// older files load with both empty.
pub const SAVE_VERSION: u32 = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveSnapshot {
    pub name: String,
    pub water: i64,
    pub health: i64,
    pub growth: i64,
    pub energy: i64,
    pub age: i64,
    pub last_update_time: DateTime<Utc>,
    pub game_hour: i64,
    pub game_minute: i64,
    pub game_day: i64,
    pub game_month: i64,
    pub game_year: i64,
    pub xp: i64,
    pub level: i64,
    pub mood: i64,
    pub hunger: i64,
    pub cleanliness: i64,
    pub growth_stage: GrowthStage,
    pub mood_state: MoodState,
    pub health_condition: HealthCondition,
    pub consecutive_days_good_care: i64,
    pub current_state: CreatureState,
    #[serde(default)]
    pub inventory_items: BTreeMap<String, i64>,
    pub bonsai_bills: i64,
    #[serde(default)]
    pub last_daily_reward_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub unlocked_shop_items: Vec<String>,
    #[serde(default)]
    pub cooldowns: BTreeMap<CareAction, DateTime<Utc>>,
    #[serde(default)]
    pub active_effects: Vec<ActiveEffect>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<EnvironmentSnapshot>,
    pub save_version: u32,
    pub save_timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentSnapshot {
    pub climate_zone: ClimateZone,
    pub season: Season,
    pub weather: Weather,
    pub time_of_day: TimeOfDay,
    pub game_minutes: f64,
    pub time_multiplier: f64,
    pub readings: Readings,
    #[serde(default)]
    pub active_events: Vec<EnvironmentEvent>,
    #[serde(default)]
    pub upcoming_events: Vec<UpcomingEvent>,
    #[serde(default)]
    pub forecast: Vec<DailyForecast>,
    pub last_update_time: DateTime<Utc>,
}

impl SaveSnapshot {
    /// Capture the creature (and optionally the environment) at `now`.
    pub fn capture(creature: &Creature, environment: Option<&Environment>, now: DateTime<Utc>) -> Self {
        let clock = creature.clock();
        Self {
            name: creature.name().to_string(),
            water: creature.water() as i64,
            health: creature.health() as i64,
            growth: creature.growth() as i64,
            energy: creature.energy() as i64,
            age: creature.age() as i64,
            last_update_time: creature.last_update_time(),
            game_hour: clock.hour as i64,
            game_minute: clock.minute as i64,
            game_day: clock.day as i64,
            game_month: clock.month as i64,
            game_year: clock.year as i64,
            xp: creature.xp() as i64,
            level: creature.level() as i64,
            mood: creature.mood() as i64,
            hunger: creature.hunger() as i64,
            cleanliness: creature.cleanliness() as i64,
            growth_stage: creature.growth_stage(),
            mood_state: creature.mood_state(),
            health_condition: creature.health_condition(),
            consecutive_days_good_care: creature.consecutive_days_good_care() as i64,
            current_state: creature.current_state(),
            inventory_items: creature
                .inventory()
                .counts()
                .iter()
                .map(|(id, count)| (id.clone(), *count as i64))
                .collect(),
            bonsai_bills: creature.wallet().balance().min(i64::MAX as u64) as i64,
            last_daily_reward_time: creature.wallet().last_daily_reward(),
            unlocked_shop_items: creature.unlocked_shop_items().iter().cloned().collect(),
            cooldowns: creature.cooldowns().entries().clone(),
            active_effects: creature.active_effects().to_vec(),
            environment: environment.map(EnvironmentSnapshot::capture),
            save_version: SAVE_VERSION,
            save_timestamp: now,
        }
    }

    /// Rebuild a creature, clamping every numeric field back into its domain.
    pub fn restore_creature(&self, rng: SimRng) -> Result<Creature, SimError> {
        let name = validate_name(&self.name)?;
        let mut creature = Creature::blank(name, self.last_update_time, rng);

        creature.water = Stat::new(self.water);
        creature.health = Stat::new(self.health);
        creature.growth = Stat::new(self.growth);
        creature.energy = Stat::new(self.energy);
        creature.hunger = Stat::new(self.hunger);
        creature.cleanliness = Stat::new(self.cleanliness);
        creature.mood = Stat::new(self.mood);
        creature.age_days = clamp_u32(self.age);
        creature.xp = (self.xp.max(0) as u64).min(XP_CAP);
        // level, stage and mood state are derived, never trusted
        creature.level = level_for_xp(creature.xp);
        creature.growth_stage = GrowthStage::for_level(creature.level);
        creature.mood_state = MoodState::from_mood(creature.mood.get());
        creature.health_condition = self.health_condition;
        creature.consecutive_days_good_care = clamp_u32(self.consecutive_days_good_care);
        creature.clock = GameClock {
            hour: clamp_u32(self.game_hour),
            minute: clamp_u32(self.game_minute),
            day: clamp_u32(self.game_day),
            month: clamp_u32(self.game_month),
            year: clamp_u32(self.game_year),
        }
        .normalized();
        creature.current_state = self.current_state;
        creature.state_since = self.last_update_time;
        creature.inventory = Inventory::from_counts(
            self.inventory_items
                .iter()
                .map(|(id, count)| (id.clone(), clamp_u32(*count)))
                .collect(),
        );
        creature.wallet = Wallet::with_balance(self.bonsai_bills.max(0) as u64, self.last_daily_reward_time);
        creature.unlocked_shop_items = self
            .unlocked_shop_items
            .iter()
            .map(|id| id.trim())
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect::<BTreeSet<_>>();
        // a stamp past the last update would stretch a cooldown or delay an effect
        let anchor = self.last_update_time;
        creature.cooldowns = CooldownTracker::from_entries(
            self.cooldowns
                .iter()
                .map(|(action, used)| (*action, (*used).min(anchor)))
                .collect(),
        );
        let mut effects: Vec<ActiveEffect> = Vec::with_capacity(self.active_effects.len());
        for effect in &self.active_effects {
            if effects.iter().any(|kept| kept.kind == effect.kind) {
                continue;
            }
            effects.push(ActiveEffect {
                kind: effect.kind,
                activated_at: effect.activated_at.min(anchor),
            });
        }
        creature.active_effects = effects;
        creature.availability = ActionAvailability::compute(
            &creature.cooldowns,
            creature.energy.get(),
            self.last_update_time,
        );
        Ok(creature)
    }

    /// Rebuild the environment, or start a fresh one when the save has none.
    pub fn restore_environment(
        &self,
        settings: EnvironmentSettings,
        now: DateTime<Utc>,
        rng: SimRng,
    ) -> Environment {
        match &self.environment {
            Some(saved) => saved.restore(settings, rng),
            None => Environment::new(settings, now, rng),
        }
    }
}

impl EnvironmentSnapshot {
    pub fn capture(env: &Environment) -> Self {
        Self {
            climate_zone: env.climate_zone(),
            season: env.season(),
            weather: env.weather(),
            time_of_day: env.time_of_day(),
            game_minutes: env.game_minutes(),
            time_multiplier: env.time_multiplier(),
            readings: env.readings(),
            active_events: env.active_events().to_vec(),
            upcoming_events: env.upcoming_events().to_vec(),
            forecast: env.forecast().to_vec(),
            last_update_time: env.last_update_time(),
        }
    }

    /// Saved climate and multiplier override the configured ones.
    pub fn restore(&self, settings: EnvironmentSettings, rng: SimRng) -> Environment {
        let settings = EnvironmentSettings {
            climate_zone: self.climate_zone,
            time_multiplier: self.time_multiplier,
            ..settings
        };
        let mut env = Environment::new(settings, self.last_update_time, rng);
        if self.game_minutes.is_finite() && self.game_minutes >= 0.0 {
            env.game_minutes = self.game_minutes;
        }
        let climate = env.settings.climate_zone;
        env.season = env.season_at_current();
        env.time_of_day = TimeOfDay::from_hour(env.game_hour(), &env.settings.day_bands);
        env.weather = self.weather;
        let now = env.game_minutes;
        env.active_events = self
            .active_events
            .iter()
            .filter(|event| event.start_time.is_finite() && event.is_active_at(now))
            .filter(|event| events::is_compatible(event.event_type, climate))
            .map(|event| EnvironmentEvent {
                intensity: event.intensity.clamp(MIN_INTENSITY, MAX_INTENSITY),
                duration_hours: event.duration_hours.clamp(MIN_EVENT_HOURS, MAX_EVENT_HOURS),
                ..*event
            })
            .take(env.settings.max_active_events)
            .collect();
        env.upcoming_events = self.upcoming_events.clone();
        env.forecast = self.forecast.clone();
        env.readings = Readings {
            temperature: clamp_f64(self.readings.temperature, TEMPERATURE_RANGE),
            humidity: clamp_f64(self.readings.humidity, HUMIDITY_RANGE),
            light_quality: clamp_f64(self.readings.light_quality, QUALITY_RANGE),
            soil_quality: clamp_f64(self.readings.soil_quality, QUALITY_RANGE),
            air_quality: clamp_f64(self.readings.air_quality, QUALITY_RANGE),
        };
        env
    }
}

fn clamp_u32(value: i64) -> u32 {
    value.clamp(0, u32::MAX as i64) as u32
}

fn clamp_f64(value: f64, (lo, hi): (f64, f64)) -> f64 {
    if value.is_finite() {
        value.clamp(lo, hi)
    } else {
        lo
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::rng::seeded;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 10, 18, 30, 0).unwrap()
    }

    #[test]
    fn json_uses_camel_case_field_names() {
        let creature = Creature::new("Momiji", t0(), seeded(1)).unwrap();
        let json = serde_json::to_value(SaveSnapshot::capture(&creature, None, t0())).unwrap();
        for key in [
            "name",
            "lastUpdateTime",
            "gameHour",
            "consecutiveDaysGoodCare",
            "inventoryItems",
            "bonsaiBills",
            "lastDailyRewardTime",
            "unlockedShopItems",
            "cooldowns",
            "activeEffects",
            "saveVersion",
            "saveTimestamp",
        ] {
            assert!(json.get(key).is_some(), "missing {}", key);
        }
        assert!(json.get("environment").is_none());
        assert_eq!(json["growthStage"], "Seedling");
    }

    #[test]
    fn restore_reclamps_out_of_range_values() {
        let creature = Creature::new("Momiji", t0(), seeded(1)).unwrap();
        let mut snap = SaveSnapshot::capture(&creature, None, t0());
        snap.water = 250;
        snap.mood = -4;
        snap.game_hour = 31;
        snap.level = 40;
        snap.inventory_items.insert("burger".into(), -3);
        let restored = snap.restore_creature(seeded(2)).unwrap();
        assert_eq!(restored.water(), 100);
        assert_eq!(restored.mood(), 0);
        assert_eq!(restored.clock().hour, 23);
        assert_eq!(restored.level(), 1);
        assert_eq!(restored.inventory().quantity("burger"), 0);
        assert_eq!(restored.mood_state(), MoodState::Miserable);
    }

    #[test]
    fn restore_pulls_future_stamps_back_to_the_anchor() {
        let mut creature = Creature::new("Momiji", t0(), seeded(1)).unwrap();
        assert!(creature.prune(t0()));
        let mut snap = SaveSnapshot::capture(&creature, None, t0());
        assert_eq!(snap.cooldowns.get(&CareAction::Prune), Some(&t0()));
        assert_eq!(snap.active_effects.len(), 1);

        let forged = t0() + Duration::days(30);
        snap.cooldowns.insert(CareAction::Water, forged);
        snap.active_effects[0].activated_at = forged;
        let duplicate = snap.active_effects[0];
        snap.active_effects.push(duplicate);
        let restored = snap.restore_creature(seeded(2)).unwrap();

        assert_eq!(restored.cooldowns().last_used(CareAction::Water), Some(t0()));
        assert!(restored.cooldowns().is_ready(CareAction::Water, t0() + Duration::minutes(2)));
        assert_eq!(restored.active_effects().len(), 1);
        assert_eq!(restored.active_effects()[0].activated_at, t0());
        assert!(!restored.availability().can_prune);
    }

    #[test]
    fn older_saves_without_cooldowns_still_parse() {
        let creature = Creature::new("Momiji", t0(), seeded(1)).unwrap();
        let mut json = serde_json::to_value(SaveSnapshot::capture(&creature, None, t0())).unwrap();
        let fields = json.as_object_mut().unwrap();
        fields.remove("cooldowns");
        fields.remove("activeEffects");
        fields.insert("saveVersion".into(), serde_json::json!(2));
        let snap: SaveSnapshot = serde_json::from_value(json).unwrap();
        assert!(snap.cooldowns.is_empty());
        assert!(snap.active_effects.is_empty());
    }

    #[test]
    fn environment_round_trips() {
        let mut env = Environment::new(EnvironmentSettings::default(), t0(), seeded(5));
        env.update(t0() + Duration::seconds(600));
        let saved = EnvironmentSnapshot::capture(&env);
        let restored = saved.restore(EnvironmentSettings::default(), seeded(6));
        assert_eq!(restored.season(), env.season());
        assert_eq!(restored.weather(), env.weather());
        assert_eq!(restored.game_minutes(), env.game_minutes());
        assert_eq!(restored.readings(), env.readings());
        assert_eq!(restored.forecast(), env.forecast());
        assert_eq!(restored.last_update_time(), env.last_update_time());
    }
}
