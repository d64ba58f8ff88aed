//! Simulation core: the creature engine, the environment engine and the value
//! types they share. Nothing in here performs I/O.

pub mod change;
pub mod clock;
pub mod cooldown;
pub mod creature;
pub mod environment;
pub mod errors;
pub mod events;
pub mod inventory;
pub mod progression;
pub mod rng;
pub mod stat;
pub mod types;
pub mod wallet;
pub mod weather;

pub use change::{Change, ChangeListener};
pub use creature::{Creature, DailyCareOutcome, Exposure, TickReport};
pub use environment::{Environment, EnvironmentNotice, EnvironmentReport, EnvironmentSettings, Readings};
pub use errors::SimError;
pub use rng::SimRng;
pub use types::{
    CareAction, ClimateZone, CreatureState, DayBands, EventType, FoodItem, GrowthStage,
    HealthCondition, MoodState, Season, TimeOfDay, Weather,
};
