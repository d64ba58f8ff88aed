//! The creature engine: bounded vitals, care actions, progression and the per-tick update.
//!
//! A `Creature` is driven from outside. The host owns the clock and calls
//! [`Creature::update`] with the current time and speed multiplier at whatever cadence it
//! likes; the engine computes how much simulated time passed since the last call and
//! applies decay, conditions, effects and derived state in a fixed order.
//!
//! Care actions never fail loudly. An action on cooldown (or below its energy gate) is
//! ignored and reported as `false`; only name validation surfaces an error.

use chrono::{DateTime, Duration, Utc};
use log::{debug, info, warn};
use std::collections::BTreeSet;
use std::fmt;

use crate::logutil::escape_log;
use crate::sim::change::{Change, ChangeListener, Observed};
use crate::sim::clock::GameClock;
use crate::sim::cooldown::{ActionAvailability, CooldownTracker};
use crate::sim::errors::SimError;
use crate::sim::inventory::Inventory;
use crate::sim::progression::{self, MAX_LEVEL};
use crate::sim::rng::{RngExt, SimRng};
use crate::sim::stat::Stat;
use crate::sim::types::{
    CareAction, CreatureState, FoodItem, GrowthStage, HealthCondition, MoodState,
};
use crate::sim::wallet::Wallet;
use crate::validation::validate_name;

/// One simulated day is the most a single tick may cover.
pub const MAX_MINUTES_PER_TICK: f64 = 1440.0;
/// Game minutes that pass per simulated minute.
pub const GAME_MINUTES_PER_MINUTE: f64 = 60.0;
/// Age never grows by more than a year in one tick.
pub const MAX_AGE_DAYS_PER_TICK: f64 = 365.0;
/// How long an action-entered state (Growing, Blooming, Sleeping) lasts.
pub const TRANSIENT_STATE_MINUTES: i64 = 5;
/// Per-call ceiling for any single decay term.
const DECAY_CAP: f64 = 100.0;
const PASSIVE_GROWTH_CAP: f64 = 10.0;
const PASSIVE_XP_CAP: f64 = 100.0;
const LEVEL_UP_MOOD_BONUS: i64 = 10;
const LEVEL_UP_BILLS_PER_LEVEL: u64 = 10;

/// Deferred bonuses granted by an earlier action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum EffectKind {
    PruneRecovery,
    TrainingHigh,
    VegetableBoost,
}

impl EffectKind {
    fn delay(self) -> Duration {
        match self {
            EffectKind::PruneRecovery => Duration::minutes(CareAction::Prune.cooldown_minutes()),
            EffectKind::TrainingHigh => {
                Duration::minutes(CareAction::IntenseTraining.cooldown_minutes())
            }
            EffectKind::VegetableBoost => Duration::minutes(10),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveEffect {
    pub kind: EffectKind,
    pub activated_at: DateTime<Utc>,
}

impl ActiveEffect {
    pub fn ready_at(&self) -> DateTime<Utc> {
        self.activated_at + self.kind.delay()
    }
}

/// Outcome of one day-boundary care evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyCareOutcome {
    pub good_care: bool,
    pub streak: u32,
    pub xp_awarded: u64,
}

/// Summary returned by [`Creature::update`].
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub minutes_simulated: f64,
    pub day_rollovers: u32,
    pub levels_gained: u32,
    pub daily_care: Vec<DailyCareOutcome>,
    pub skipped_steps: Vec<&'static str>,
    pub changes: Vec<Change>,
}

impl TickReport {
    pub fn daily_xp(&self) -> u64 {
        self.daily_care.iter().map(|d| d.xp_awarded).sum()
    }
}

/// Environmental conditions a creature may optionally be exposed to during a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Exposure {
    pub temperature: f64,
    pub humidity: f64,
    pub light: f64,
}

pub struct Creature {
    pub(crate) name: String,
    pub(crate) water: Stat,
    pub(crate) health: Stat,
    pub(crate) growth: Stat,
    pub(crate) energy: Stat,
    pub(crate) hunger: Stat,
    pub(crate) cleanliness: Stat,
    pub(crate) mood: Stat,
    pub(crate) age_days: u32,
    pub(crate) age_carry: f64,
    pub(crate) xp: u64,
    pub(crate) xp_carry: f64,
    pub(crate) level: u32,
    pub(crate) growth_stage: GrowthStage,
    pub(crate) mood_state: MoodState,
    pub(crate) health_condition: HealthCondition,
    pub(crate) consecutive_days_good_care: u32,
    pub(crate) clock: GameClock,
    pub(crate) clock_carry: f64,
    pub(crate) last_update_time: DateTime<Utc>,
    pub(crate) current_state: CreatureState,
    pub(crate) state_since: DateTime<Utc>,
    pub(crate) cooldowns: CooldownTracker,
    pub(crate) availability: ActionAvailability,
    pub(crate) active_effects: Vec<ActiveEffect>,
    pub(crate) inventory: Inventory,
    pub(crate) wallet: Wallet,
    pub(crate) unlocked_shop_items: BTreeSet<String>,
    pub(crate) rng: SimRng,
    listeners: Vec<Box<dyn ChangeListener>>,
}

impl fmt::Debug for Creature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Creature")
            .field("name", &self.name)
            .field("water", &self.water.get())
            .field("health", &self.health.get())
            .field("growth", &self.growth.get())
            .field("energy", &self.energy.get())
            .field("hunger", &self.hunger.get())
            .field("cleanliness", &self.cleanliness.get())
            .field("mood", &self.mood.get())
            .field("level", &self.level)
            .field("xp", &self.xp)
            .field("state", &self.current_state)
            .field("condition", &self.health_condition)
            .finish_non_exhaustive()
    }
}

impl Creature {
    /// Create a creature with the fixed starting vitals.
    pub fn new(name: &str, now: DateTime<Utc>, rng: SimRng) -> Result<Self, SimError> {
        let name = validate_name(name)?;
        let creature = Self::blank(name, now, rng);
        info!("New bonsai '{}' planted", escape_log(&creature.name));
        Ok(creature)
    }

    /// Default-valued creature for an already validated name.
    pub(crate) fn blank(name: String, now: DateTime<Utc>, rng: SimRng) -> Self {
        let mut creature = Self {
            name,
            water: Stat::new(50),
            health: Stat::new(100),
            growth: Stat::new(10),
            energy: Stat::new(100),
            hunger: Stat::new(30),
            cleanliness: Stat::new(100),
            mood: Stat::new(70),
            age_days: 0,
            age_carry: 0.0,
            xp: 0,
            xp_carry: 0.0,
            level: 1,
            growth_stage: GrowthStage::Seedling,
            mood_state: MoodState::from_mood(70),
            health_condition: HealthCondition::Healthy,
            consecutive_days_good_care: 0,
            clock: GameClock::default(),
            clock_carry: 0.0,
            last_update_time: now,
            current_state: CreatureState::Idle,
            state_since: now,
            cooldowns: CooldownTracker::new(),
            availability: ActionAvailability::default(),
            active_effects: Vec::new(),
            inventory: Inventory::default(),
            wallet: Wallet::default(),
            unlocked_shop_items: BTreeSet::new(),
            rng,
            listeners: Vec::new(),
        };
        creature.refresh_availability(now);
        creature
    }

    // ------------------------------------------------------------------
    // Read surface
    // ------------------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn water(&self) -> u8 {
        self.water.get()
    }
    pub fn health(&self) -> u8 {
        self.health.get()
    }
    pub fn growth(&self) -> u8 {
        self.growth.get()
    }
    pub fn energy(&self) -> u8 {
        self.energy.get()
    }
    pub fn hunger(&self) -> u8 {
        self.hunger.get()
    }
    pub fn cleanliness(&self) -> u8 {
        self.cleanliness.get()
    }
    pub fn mood(&self) -> u8 {
        self.mood.get()
    }
    /// Age in days.
    pub fn age(&self) -> u32 {
        self.age_days
    }
    pub fn xp(&self) -> u64 {
        self.xp
    }
    pub fn level(&self) -> u32 {
        self.level
    }
    pub fn growth_stage(&self) -> GrowthStage {
        self.growth_stage
    }
    pub fn mood_state(&self) -> MoodState {
        self.mood_state
    }
    pub fn health_condition(&self) -> HealthCondition {
        self.health_condition
    }
    pub fn consecutive_days_good_care(&self) -> u32 {
        self.consecutive_days_good_care
    }
    pub fn clock(&self) -> GameClock {
        self.clock
    }
    pub fn last_update_time(&self) -> DateTime<Utc> {
        self.last_update_time
    }
    pub fn current_state(&self) -> CreatureState {
        self.current_state
    }
    pub fn cooldowns(&self) -> &CooldownTracker {
        &self.cooldowns
    }
    pub fn availability(&self) -> ActionAvailability {
        self.availability
    }
    pub fn active_effects(&self) -> &[ActiveEffect] {
        &self.active_effects
    }
    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }
    pub fn wallet(&self) -> &Wallet {
        &self.wallet
    }
    pub fn unlocked_shop_items(&self) -> &BTreeSet<String> {
        &self.unlocked_shop_items
    }

    /// Whether `action` is off cooldown and its energy gate is met at `now`.
    pub fn can_perform(&self, action: CareAction, now: DateTime<Utc>) -> bool {
        self.cooldowns.is_ready(action, now) && self.energy.get() >= action.energy_required()
    }

    pub fn rename(&mut self, name: &str) -> Result<(), SimError> {
        let validated = validate_name(name)?;
        let before = self.observe();
        self.name = validated;
        self.notify(&before);
        Ok(())
    }

    /// Register an observer invoked with every field change.
    pub fn add_listener(&mut self, listener: impl ChangeListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    // ------------------------------------------------------------------
    // Care actions
    // ------------------------------------------------------------------

    /// Dispatch a care action by kind.
    pub fn perform(&mut self, action: CareAction, now: DateTime<Utc>) -> bool {
        match action {
            CareAction::Water => self.give_water(now),
            CareAction::Prune => self.prune(now),
            CareAction::Rest => self.rest(now),
            CareAction::Fertilize => self.apply_fertilizer(now),
            CareAction::CleanArea => self.clean_area(now),
            CareAction::LightExercise => self.light_exercise(now),
            CareAction::IntenseTraining => self.intense_training(now),
            CareAction::Play => self.play(now),
            CareAction::Meditation => self.meditate(now),
        }
    }

    pub fn give_water(&mut self, now: DateTime<Utc>) -> bool {
        self.try_action(CareAction::Water, now, |c, now| {
            // soaking an already saturated pot risks root rot
            if c.water.get() >= 90 && c.health_condition.is_healthy() && c.rng.chance(0.2) {
                c.set_condition(HealthCondition::RootRot);
            }
            c.water.add(30);
            c.energy.add(10);
            c.mood.add(5);
            c.hunger.add(2);
            c.enter_state(CreatureState::Growing, now);
            c.add_experience(5);
        })
    }

    pub fn prune(&mut self, now: DateTime<Utc>) -> bool {
        self.try_action(CareAction::Prune, now, |c, now| {
            c.growth.add(5);
            c.health.add(5);
            c.energy.add(-5);
            c.cleanliness.add(-5);
            c.enter_state(CreatureState::Growing, now);
            c.add_experience(8);
            c.activate_effect(EffectKind::PruneRecovery, now);
        })
    }

    pub fn rest(&mut self, now: DateTime<Utc>) -> bool {
        self.try_action(CareAction::Rest, now, |c, now| {
            c.energy.add(25);
            c.mood.add(3);
            c.hunger.add(3);
            c.enter_state(CreatureState::Sleeping, now);
            c.add_experience(2);
        })
    }

    pub fn apply_fertilizer(&mut self, now: DateTime<Utc>) -> bool {
        self.try_action(CareAction::Fertilize, now, |c, now| {
            c.growth.add(10);
            c.health.add(10);
            c.hunger.add(-15);
            if c.health_condition == HealthCondition::NutrientDeficiency {
                c.set_condition(HealthCondition::Healthy);
            }
            c.enter_state(CreatureState::Blooming, now);
            c.add_experience(10);
        })
    }

    pub fn clean_area(&mut self, now: DateTime<Utc>) -> bool {
        self.try_action(CareAction::CleanArea, now, |c, _| {
            c.cleanliness.add(40);
            c.mood.add(5);
            c.health.add(2);
            c.energy.add(-5);
            if c.health_condition == HealthCondition::PestInfestation && c.rng.chance(0.5) {
                c.set_condition(HealthCondition::Healthy);
            }
            c.add_experience(6);
        })
    }

    pub fn light_exercise(&mut self, now: DateTime<Utc>) -> bool {
        self.try_action(CareAction::LightExercise, now, |c, _| {
            c.energy.add(-10);
            c.health.add(5);
            c.mood.add(5);
            c.hunger.add(8);
            c.growth.add(2);
            c.add_experience(8);
        })
    }

    pub fn intense_training(&mut self, now: DateTime<Utc>) -> bool {
        self.try_action(CareAction::IntenseTraining, now, |c, now| {
            c.energy.add(-25);
            c.health.add(3);
            c.growth.add(5);
            c.hunger.add(15);
            c.mood.add(-5);
            c.add_experience(20);
            c.activate_effect(EffectKind::TrainingHigh, now);
            if c.energy.get() < 40 && c.health_condition.is_healthy() && c.rng.chance(0.3) {
                c.set_condition(HealthCondition::Overtraining);
            }
        })
    }

    pub fn play(&mut self, now: DateTime<Utc>) -> bool {
        self.try_action(CareAction::Play, now, |c, _| {
            c.mood.add(15);
            c.energy.add(-10);
            c.hunger.add(5);
            c.cleanliness.add(-5);
            c.add_experience(6);
        })
    }

    pub fn meditate(&mut self, now: DateTime<Utc>) -> bool {
        self.try_action(CareAction::Meditation, now, |c, _| {
            c.mood.add(10);
            c.energy.add(5);
            c.health.add(3);
            if c.health_condition == HealthCondition::Overtraining && c.rng.chance(0.25) {
                c.set_condition(HealthCondition::Healthy);
            }
            c.add_experience(5);
        })
    }

    fn try_action<F>(&mut self, action: CareAction, now: DateTime<Utc>, apply: F) -> bool
    where
        F: FnOnce(&mut Self, DateTime<Utc>),
    {
        if !self.cooldowns.is_ready(action, now) {
            debug!("{} ignored for '{}': on cooldown", action, escape_log(&self.name));
            return false;
        }
        if self.energy.get() < action.energy_required() {
            debug!(
                "{} ignored for '{}': energy {} below {}",
                action,
                escape_log(&self.name),
                self.energy.get(),
                action.energy_required()
            );
            return false;
        }
        let before = self.observe();
        apply(self, now);
        self.cooldowns.mark(action, now);
        self.refresh_derived(now);
        self.notify(&before);
        true
    }

    // ------------------------------------------------------------------
    // Feeding
    // ------------------------------------------------------------------

    pub fn feed(&mut self, item: FoodItem, now: DateTime<Utc>) -> bool {
        match item {
            FoodItem::Burger => self.feed_burger(now),
            FoodItem::IceCream => self.feed_ice_cream(now),
            FoodItem::Vegetables => self.feed_vegetables(now),
            FoodItem::PremiumNutrients => self.feed_premium_nutrients(now),
            FoodItem::SpecialTreat => self.feed_special_treat(now),
        }
    }

    pub fn feed_burger(&mut self, now: DateTime<Utc>) -> bool {
        self.try_feed(FoodItem::Burger, now, |c, _| {
            c.hunger.add(-30);
            c.energy.add(10);
            c.health.add(-5);
            c.mood.add(10);
            c.cleanliness.add(-5);
            if c.health_condition.is_healthy() && c.rng.chance(0.05) {
                c.set_condition(HealthCondition::NutrientDeficiency);
            }
            c.add_experience(3);
        })
    }

    pub fn feed_ice_cream(&mut self, now: DateTime<Utc>) -> bool {
        self.try_feed(FoodItem::IceCream, now, |c, _| {
            c.hunger.add(-15);
            c.mood.add(15);
            c.energy.add(5);
            c.health.add(-3);
            c.water.add(5);
            if c.health_condition == HealthCondition::Sunburn && c.rng.chance(0.1) {
                c.set_condition(HealthCondition::Healthy);
            }
            c.add_experience(3);
        })
    }

    pub fn feed_vegetables(&mut self, now: DateTime<Utc>) -> bool {
        self.try_feed(FoodItem::Vegetables, now, |c, now| {
            c.hunger.add(-20);
            c.health.add(8);
            c.energy.add(5);
            c.mood.add(-2);
            if c.health_condition == HealthCondition::NutrientDeficiency && c.rng.chance(0.15) {
                c.set_condition(HealthCondition::Healthy);
            }
            c.activate_effect(EffectKind::VegetableBoost, now);
            c.add_experience(4);
        })
    }

    pub fn feed_premium_nutrients(&mut self, now: DateTime<Utc>) -> bool {
        self.try_feed(FoodItem::PremiumNutrients, now, |c, _| {
            c.hunger.add(-25);
            c.health.add(15);
            c.growth.add(5);
            c.energy.add(15);
            if !c.health_condition.is_healthy() && c.rng.chance(0.5) {
                c.set_condition(HealthCondition::Healthy);
            }
            c.add_experience(8);
        })
    }

    pub fn feed_special_treat(&mut self, now: DateTime<Utc>) -> bool {
        self.try_feed(FoodItem::SpecialTreat, now, |c, _| {
            c.hunger.add(-10);
            c.mood.add(25);
            c.energy.add(10);
            if !c.health_condition.is_healthy() && c.rng.chance(0.1) {
                c.set_condition(HealthCondition::Healthy);
            }
            c.add_experience(5);
        })
    }

    fn try_feed<F>(&mut self, item: FoodItem, now: DateTime<Utc>, apply: F) -> bool
    where
        F: FnOnce(&mut Self, DateTime<Utc>),
    {
        let before = self.observe();
        if !self.inventory.consume(item.id()) {
            debug!("{:?} not in stock for '{}'", item, escape_log(&self.name));
            return false;
        }
        apply(self, now);
        self.refresh_derived(now);
        self.notify(&before);
        true
    }

    // ------------------------------------------------------------------
    // Economy
    // ------------------------------------------------------------------

    /// Buy `quantity` units of a food item into the inventory.
    pub fn buy_food(&mut self, item: FoodItem, quantity: u32) -> Result<(), SimError> {
        if quantity == 0 {
            return Err(SimError::Validation("quantity must be at least 1".to_string()));
        }
        let before = self.observe();
        let cost = item.price().saturating_mul(quantity as u64);
        self.wallet.spend(cost)?;
        self.inventory.add(item.id(), quantity);
        self.notify(&before);
        Ok(())
    }

    /// Record a shop unlock. Returns false if already unlocked.
    pub fn unlock_shop_item(&mut self, item_id: &str) -> Result<bool, SimError> {
        let id = item_id.trim();
        if id.is_empty() {
            return Err(SimError::Validation("shop item id must not be blank".to_string()));
        }
        Ok(self.unlocked_shop_items.insert(id.to_string()))
    }

    pub fn claim_daily_reward(&mut self, now: DateTime<Utc>) -> Option<u64> {
        let before = self.observe();
        let granted = self.wallet.claim_daily_reward(now);
        self.notify(&before);
        granted
    }

    // ------------------------------------------------------------------
    // Progression
    // ------------------------------------------------------------------

    /// Award action XP scaled by mood and the care streak. Returns the amount added.
    pub fn add_experience(&mut self, base: u32) -> u64 {
        let amount = progression::scaled_xp(base, self.mood_state, self.consecutive_days_good_care);
        self.grant_raw_xp(amount);
        amount
    }

    fn grant_raw_xp(&mut self, amount: u64) {
        self.xp = progression::add_capped(self.xp, amount);
        self.check_level_up();
    }

    fn check_level_up(&mut self) {
        while self.level < MAX_LEVEL && self.xp >= progression::xp_for_next_level(self.level) {
            self.level += 1;
            self.mood.add(LEVEL_UP_MOOD_BONUS);
            self.wallet
                .earn(LEVEL_UP_BILLS_PER_LEVEL.saturating_mul(self.level as u64));
            info!(
                "'{}' reached level {} ({:?})",
                escape_log(&self.name),
                self.level,
                GrowthStage::for_level(self.level)
            );
        }
        self.growth_stage = GrowthStage::for_level(self.level);
        self.mood_state = MoodState::from_mood(self.mood.get());
    }

    /// Day-boundary evaluation of the five good-care conditions.
    pub fn evaluate_daily_care(&mut self) -> DailyCareOutcome {
        let good_care = self.health.get() > 70
            && self.water.get() > 70
            && self.energy.get() > 70
            && self.hunger.get() < 30
            && self.cleanliness.get() > 70;

        let mut xp_awarded = 0;
        if good_care {
            self.consecutive_days_good_care = self.consecutive_days_good_care.saturating_add(1);
            xp_awarded = 10;
            if self.consecutive_days_good_care % 5 == 0 {
                xp_awarded += self.consecutive_days_good_care as u64 * 2;
            }
            self.grant_raw_xp(xp_awarded);
            debug!(
                "'{}' good care day, streak {}",
                escape_log(&self.name),
                self.consecutive_days_good_care
            );
        } else {
            self.consecutive_days_good_care = 0;
        }
        self.growth.add(1);

        DailyCareOutcome {
            good_care,
            streak: self.consecutive_days_good_care,
            xp_awarded,
        }
    }

    // ------------------------------------------------------------------
    // Tick
    // ------------------------------------------------------------------

    /// Advance the simulation to `now`.
    pub fn update(&mut self, now: DateTime<Utc>, time_speed: f64) -> TickReport {
        self.update_with(now, time_speed, None)
    }

    /// Advance the simulation to `now`, optionally exposed to environment readings.
    pub fn update_with(
        &mut self,
        now: DateTime<Utc>,
        time_speed: f64,
        exposure: Option<Exposure>,
    ) -> TickReport {
        let mut report = TickReport::default();
        let before = self.observe();
        let level_before = self.level;

        let elapsed = now.signed_duration_since(self.last_update_time);
        if elapsed < Duration::zero() {
            warn!(
                "clock moved backwards by {}s for '{}'; resetting anchor",
                -elapsed.num_seconds(),
                escape_log(&self.name)
            );
            self.last_update_time = now;
            return report;
        }

        let speed = if time_speed.is_finite() && time_speed > 0.0 {
            time_speed
        } else {
            debug!("invalid time speed {}; using 1.0", time_speed);
            1.0
        };
        let real_minutes = elapsed.num_milliseconds() as f64 / 60_000.0;
        let minutes = (real_minutes * speed).min(MAX_MINUTES_PER_TICK);
        report.minutes_simulated = minutes;

        if minutes > 0.0 {
            self.run_step("clock", &mut report, |c, r| c.advance_clock(minutes, r));
            self.run_step("decay", &mut report, |c, _| c.apply_decay(minutes));
            self.run_step("growth", &mut report, |c, _| c.apply_passive_growth(minutes));
            self.run_step("penalties", &mut report, |c, _| c.apply_penalties(minutes));
            if let Some(exposure) = exposure {
                self.run_step("exposure", &mut report, |c, _| {
                    c.apply_exposure(minutes, exposure)
                });
            }
            self.run_step("condition", &mut report, |c, _| c.apply_condition(minutes));
        }
        self.run_step("effects", &mut report, |c, _| c.resolve_effects(now));
        self.run_step("cooldowns", &mut report, |c, _| {
            c.cooldowns.expire(now);
            c.refresh_availability(now);
            Ok(())
        });
        if minutes > 0.0 {
            let age_days = real_minutes / 60.0 * speed;
            self.run_step("age", &mut report, |c, _| c.advance_age(age_days));
        }
        self.run_step("state", &mut report, |c, _| {
            c.derive_state(now);
            Ok(())
        });
        self.mood_state = MoodState::from_mood(self.mood.get());
        if minutes > 0.0 {
            self.run_step("passive_xp", &mut report, |c, _| c.award_passive_xp(minutes));
        }
        self.last_update_time = now;

        report.levels_gained = self.level.saturating_sub(level_before);
        report.changes = self.notify(&before);
        report
    }

    fn run_step<F>(&mut self, step: &'static str, report: &mut TickReport, f: F)
    where
        F: FnOnce(&mut Self, &mut TickReport) -> Result<(), SimError>,
    {
        if let Err(err) = f(self, report) {
            warn!(
                "tick step '{}' skipped for '{}': {}",
                step,
                escape_log(&self.name),
                err
            );
            report.skipped_steps.push(step);
        }
    }

    fn advance_clock(&mut self, minutes: f64, report: &mut TickReport) -> Result<(), SimError> {
        let total = self.clock_carry + checked_minutes(minutes)? * GAME_MINUTES_PER_MINUTE;
        let whole = total.floor();
        self.clock_carry = total - whole;
        let rollovers = self.clock.advance(whole as u64);
        report.day_rollovers = rollovers;
        for _ in 0..rollovers {
            let outcome = self.evaluate_daily_care();
            report.daily_care.push(outcome);
        }
        Ok(())
    }

    fn apply_decay(&mut self, minutes: f64) -> Result<(), SimError> {
        let m = checked_minutes(minutes)?;
        self.water.apply(-capped(0.08 * m));
        self.energy.apply(-capped(0.03 * m));
        self.mood.apply(-capped(0.017 * m));
        self.hunger.apply(capped(0.05 * m));
        self.cleanliness.apply(-capped(0.002 * m));
        Ok(())
    }

    fn apply_passive_growth(&mut self, minutes: f64) -> Result<(), SimError> {
        let m = checked_minutes(minutes)?;
        let thriving = self.water.get() > 40
            && self.health.get() > 60
            && self.energy.get() > 30
            && self.hunger.get() < 70;
        if thriving && self.health_condition != HealthCondition::NutrientDeficiency {
            self.growth.apply((0.01 * m).min(PASSIVE_GROWTH_CAP));
        }
        Ok(())
    }

    fn apply_penalties(&mut self, minutes: f64) -> Result<(), SimError> {
        let m = checked_minutes(minutes)?;
        if self.water.get() < 20 {
            self.health.apply(-capped(0.033 * m));
            if self.health_condition.is_healthy() && self.rng.chance(0.10) {
                self.set_condition(HealthCondition::NutrientDeficiency);
            }
        }
        if self.hunger.get() > 80 {
            self.health.apply(-capped(0.017 * m));
            self.mood.apply(-capped(0.033 * m));
        }
        if self.cleanliness.get() < 30 {
            self.health.apply(-capped(0.008 * m));
            self.mood.apply(-capped(0.017 * m));
            if self.health_condition.is_healthy() && self.rng.chance(0.05) {
                let condition = if self.rng.chance(0.5) {
                    HealthCondition::LeafSpot
                } else {
                    HealthCondition::PestInfestation
                };
                self.set_condition(condition);
            }
        }
        Ok(())
    }

    fn apply_exposure(&mut self, minutes: f64, exposure: Exposure) -> Result<(), SimError> {
        let m = checked_minutes(minutes)?;
        if exposure.temperature > 30.0 {
            self.water.apply(-capped(0.02 * m));
        }
        if self.health_condition.is_healthy() {
            if exposure.temperature > 32.0 && exposure.light > 85.0 && self.rng.chance(0.05) {
                self.set_condition(HealthCondition::Sunburn);
            } else if exposure.humidity > 85.0 && self.water.get() > 90 && self.rng.chance(0.03) {
                self.set_condition(HealthCondition::RootRot);
            }
        }
        Ok(())
    }

    fn apply_condition(&mut self, minutes: f64) -> Result<(), SimError> {
        let m = checked_minutes(minutes)?;
        let cured = match self.health_condition {
            HealthCondition::Healthy => false,
            HealthCondition::RootRot => {
                self.health.apply(-capped(0.05 * m));
                self.water.get() < 60 && self.rng.chance(m / 1500.0)
            }
            HealthCondition::LeafSpot => {
                self.health.apply(-capped(0.02 * m));
                self.mood.apply(-capped(0.01 * m));
                self.health.get() > 80 && self.rng.chance(m / 1000.0)
            }
            HealthCondition::PestInfestation => {
                self.health.apply(-capped(0.03 * m));
                self.cleanliness.apply(-capped(0.02 * m));
                self.cleanliness.get() > 80 && self.rng.chance(m / 800.0)
            }
            HealthCondition::NutrientDeficiency => {
                self.energy.apply(-capped(0.02 * m));
                self.health.apply(-capped(0.01 * m));
                self.hunger.get() < 40 && self.water.get() > 50 && self.rng.chance(m / 600.0)
            }
            HealthCondition::Sunburn => {
                self.water.apply(-capped(0.04 * m));
                self.health.apply(-capped(0.01 * m));
                self.rng.chance(m / 500.0)
            }
            HealthCondition::Overtraining => {
                self.energy.apply(-capped(0.04 * m));
                self.mood.apply(-capped(0.02 * m));
                self.energy.get() > 60 && self.rng.chance(m / 300.0)
            }
        };
        if cured {
            info!(
                "'{}' recovered from {:?}",
                escape_log(&self.name),
                self.health_condition
            );
            self.set_condition(HealthCondition::Healthy);
        }
        Ok(())
    }

    fn resolve_effects(&mut self, now: DateTime<Utc>) -> Result<(), SimError> {
        let (ready, pending): (Vec<ActiveEffect>, Vec<ActiveEffect>) = self
            .active_effects
            .iter()
            .partition(|effect| now >= effect.ready_at());
        self.active_effects = pending;
        for effect in ready {
            match effect.kind {
                EffectKind::PruneRecovery => {
                    self.mood.add(10);
                    self.health.add(3);
                }
                EffectKind::TrainingHigh => self.mood.add(15),
                EffectKind::VegetableBoost => {
                    self.mood.add(5);
                    self.health.add(5);
                }
            }
            debug!("'{}' effect {:?} applied", escape_log(&self.name), effect.kind);
        }
        Ok(())
    }

    fn advance_age(&mut self, days: f64) -> Result<(), SimError> {
        if !days.is_finite() || days < 0.0 {
            return Err(SimError::Internal(format!("invalid age delta {}", days)));
        }
        let total = self.age_carry + days.min(MAX_AGE_DAYS_PER_TICK);
        let whole = total.floor();
        self.age_carry = total - whole;
        self.age_days = self.age_days.saturating_add(whole as u32);
        Ok(())
    }

    fn award_passive_xp(&mut self, minutes: f64) -> Result<(), SimError> {
        let m = checked_minutes(minutes)?;
        let flourishing = self.health.get() > 70
            && self.water.get() > 70
            && self.energy.get() > 70
            && self.cleanliness.get() > 70
            && self.hunger.get() < 30;
        if !flourishing {
            self.xp_carry = 0.0;
            return Ok(());
        }
        let total = self.xp_carry + (m * 0.1).min(PASSIVE_XP_CAP);
        let whole = total.floor();
        self.xp_carry = total - whole;
        if whole >= 1.0 {
            self.grant_raw_xp(whole as u64);
        }
        Ok(())
    }

    /// Re-anchor every wall-clock timestamp from `from` to `to`.
    ///
    /// Used after a headless fast-forward so the saved anchor matches real time.
    pub fn rebase(&mut self, from: DateTime<Utc>, to: DateTime<Utc>) {
        let shift = to.signed_duration_since(from);
        self.last_update_time += shift;
        self.state_since += shift;
        self.cooldowns.shift(shift);
        for effect in self.active_effects.iter_mut() {
            effect.activated_at += shift;
        }
        self.refresh_availability(to);
    }

    // ------------------------------------------------------------------
    // Derived state
    // ------------------------------------------------------------------

    fn derive_state(&mut self, now: DateTime<Utc>) {
        let next = if self.health.get() < 30 {
            CreatureState::Unhealthy
        } else if self.energy.get() < 20 {
            CreatureState::Wilting
        } else if self.water.get() < 30 {
            CreatureState::Thirsty
        } else if self.current_state.is_transient()
            && now < self.state_since + Duration::minutes(TRANSIENT_STATE_MINUTES)
        {
            self.current_state
        } else {
            CreatureState::Idle
        };
        if next != self.current_state {
            self.current_state = next;
            self.state_since = now;
        }
    }

    fn enter_state(&mut self, state: CreatureState, now: DateTime<Utc>) {
        self.current_state = state;
        self.state_since = now;
    }

    fn set_condition(&mut self, condition: HealthCondition) {
        if self.health_condition != condition {
            if !condition.is_healthy() {
                info!("'{}' developed {:?}", escape_log(&self.name), condition);
            }
            self.health_condition = condition;
        }
    }

    fn activate_effect(&mut self, kind: EffectKind, now: DateTime<Utc>) {
        self.active_effects.retain(|effect| effect.kind != kind);
        self.active_effects.push(ActiveEffect {
            kind,
            activated_at: now,
        });
    }

    fn refresh_availability(&mut self, now: DateTime<Utc>) {
        self.availability = ActionAvailability::compute(&self.cooldowns, self.energy.get(), now);
    }

    fn refresh_derived(&mut self, now: DateTime<Utc>) {
        self.mood_state = MoodState::from_mood(self.mood.get());
        self.growth_stage = GrowthStage::for_level(self.level);
        self.refresh_availability(now);
    }

    // ------------------------------------------------------------------
    // Change notification
    // ------------------------------------------------------------------

    fn observe(&self) -> Observed {
        Observed {
            fields: vec![
                ("name", self.name.clone()),
                ("water", self.water.get().to_string()),
                ("health", self.health.get().to_string()),
                ("growth", self.growth.get().to_string()),
                ("energy", self.energy.get().to_string()),
                ("hunger", self.hunger.get().to_string()),
                ("cleanliness", self.cleanliness.get().to_string()),
                ("mood", self.mood.get().to_string()),
                ("age", self.age_days.to_string()),
                ("xp", self.xp.to_string()),
                ("level", self.level.to_string()),
                ("growthStage", format!("{:?}", self.growth_stage)),
                ("moodState", format!("{:?}", self.mood_state)),
                ("healthCondition", format!("{:?}", self.health_condition)),
                ("currentState", format!("{:?}", self.current_state)),
                (
                    "consecutiveDaysGoodCare",
                    self.consecutive_days_good_care.to_string(),
                ),
                ("bonsaiBills", self.wallet.balance().to_string()),
                ("inventory", format!("{:?}", self.inventory.counts())),
            ],
        }
    }

    fn notify(&mut self, before: &Observed) -> Vec<Change> {
        let changes = before.diff(&self.observe());
        for change in &changes {
            for listener in self.listeners.iter_mut() {
                listener.on_change(change);
            }
        }
        changes
    }
}

fn capped(amount: f64) -> f64 {
    amount.min(DECAY_CAP)
}

fn checked_minutes(minutes: f64) -> Result<f64, SimError> {
    if minutes.is_finite() && minutes >= 0.0 {
        Ok(minutes)
    } else {
        Err(SimError::Internal(format!("invalid minute delta {}", minutes)))
    }
}
