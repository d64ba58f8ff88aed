//! Environmental events: candidate selection per season and climate, and the
//! reading modifiers each event applies while active.

use serde::{Deserialize, Serialize};

use crate::sim::rng::SimRng;
use crate::sim::types::{ClimateZone, EventType, Season};
use rand::Rng;

pub const MIN_EVENT_HOURS: u32 = 2;
pub const MAX_EVENT_HOURS: u32 = 24;
pub const MIN_INTENSITY: u8 = 1;
pub const MAX_INTENSITY: u8 = 100;

/// A time-bounded modifier on the environment's game-minute timeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentEvent {
    pub event_type: EventType,
    pub intensity: u8,
    /// Game minute the event started at.
    pub start_time: f64,
    /// Length in game hours.
    pub duration_hours: u32,
}

impl EnvironmentEvent {
    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration_hours as f64 * 60.0
    }

    pub fn is_active_at(&self, game_minute: f64) -> bool {
        game_minute < self.end_time()
    }

    pub fn remaining_hours(&self, game_minute: f64) -> f64 {
        ((self.end_time() - game_minute) / 60.0).max(0.0)
    }

    /// Reading deltas for this event, scaled by intensity.
    pub fn modifiers(&self) -> Modifiers {
        base_modifiers(self.event_type).scaled(self.intensity as f64 / MAX_INTENSITY as f64)
    }
}

/// Predicted event for a future game day. Not guaranteed to happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingEvent {
    pub event_type: EventType,
    pub day: u64,
}

/// Additive deltas to the five environment readings.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Modifiers {
    pub temperature: f64,
    pub humidity: f64,
    pub light: f64,
    pub soil: f64,
    pub air: f64,
}

impl Modifiers {
    const fn new(temperature: f64, humidity: f64, light: f64, soil: f64, air: f64) -> Self {
        Self {
            temperature,
            humidity,
            light,
            soil,
            air,
        }
    }

    fn scaled(self, factor: f64) -> Self {
        Self {
            temperature: self.temperature * factor,
            humidity: self.humidity * factor,
            light: self.light * factor,
            soil: self.soil * factor,
            air: self.air * factor,
        }
    }

    pub fn plus(self, other: Modifiers) -> Self {
        Self {
            temperature: self.temperature + other.temperature,
            humidity: self.humidity + other.humidity,
            light: self.light + other.light,
            soil: self.soil + other.soil,
            air: self.air + other.air,
        }
    }
}

/// Full-intensity effect of each event type.
fn base_modifiers(event: EventType) -> Modifiers {
    match event {
        EventType::Heatwave => Modifiers::new(10.0, -10.0, 5.0, -5.0, 0.0),
        EventType::ColdSnap => Modifiers::new(-10.0, 0.0, 0.0, -5.0, 0.0),
        EventType::Frost => Modifiers::new(-6.0, 0.0, 0.0, -10.0, 0.0),
        EventType::Drought => Modifiers::new(3.0, -25.0, 0.0, -25.0, -5.0),
        EventType::HeavyRain => Modifiers::new(-2.0, 25.0, -15.0, 10.0, 5.0),
        EventType::PestOutbreak => Modifiers::new(0.0, 0.0, 0.0, -10.0, -10.0),
        EventType::Pollination => Modifiers::new(0.0, 0.0, 0.0, 5.0, 5.0),
        EventType::BlizzardWarning => Modifiers::new(-12.0, 10.0, -25.0, -5.0, 0.0),
        EventType::Monsoon => Modifiers::new(-1.0, 30.0, -20.0, 5.0, 0.0),
        EventType::SandStorm => Modifiers::new(2.0, -10.0, -20.0, -5.0, -35.0),
        EventType::Fog => Modifiers::new(-1.0, 15.0, -20.0, 0.0, -5.0),
        EventType::GentleBreeze => Modifiers::new(-2.0, 0.0, 0.0, 0.0, 10.0),
    }
}

fn seasonal_events(season: Season) -> &'static [EventType] {
    match season {
        Season::Spring => &[
            EventType::Pollination,
            EventType::HeavyRain,
            EventType::GentleBreeze,
            EventType::Fog,
            EventType::PestOutbreak,
            EventType::Frost,
        ],
        Season::Summer => &[
            EventType::Heatwave,
            EventType::Drought,
            EventType::PestOutbreak,
            EventType::Pollination,
            EventType::GentleBreeze,
            EventType::HeavyRain,
        ],
        Season::Autumn => &[
            EventType::Fog,
            EventType::HeavyRain,
            EventType::GentleBreeze,
            EventType::ColdSnap,
            EventType::PestOutbreak,
            EventType::Frost,
        ],
        Season::Winter => &[
            EventType::ColdSnap,
            EventType::Frost,
            EventType::BlizzardWarning,
            EventType::Fog,
        ],
    }
}

/// Whether an event type can occur at all in a climate.
pub fn is_compatible(event: EventType, climate: ClimateZone) -> bool {
    let cold = matches!(
        event,
        EventType::Frost | EventType::ColdSnap | EventType::BlizzardWarning
    );
    match climate {
        ClimateZone::Desert => !cold && event != EventType::Monsoon,
        ClimateZone::Tropical => !cold && event != EventType::SandStorm,
        ClimateZone::Temperate | ClimateZone::Alpine => {
            !matches!(event, EventType::Monsoon | EventType::SandStorm)
        }
    }
}

/// Climate-filtered candidate list; repeated entries weight the draw.
pub fn candidates(season: Season, climate: ClimateZone) -> Vec<EventType> {
    let mut list: Vec<EventType> = seasonal_events(season)
        .iter()
        .copied()
        .filter(|event| is_compatible(*event, climate))
        .collect();

    let boosted: &[EventType] = match climate {
        ClimateZone::Desert => &[EventType::Drought, EventType::Heatwave, EventType::SandStorm],
        ClimateZone::Tropical => &[EventType::Monsoon, EventType::HeavyRain],
        ClimateZone::Alpine => &[
            EventType::Frost,
            EventType::ColdSnap,
            EventType::BlizzardWarning,
        ],
        ClimateZone::Temperate => &[],
    };
    list.extend_from_slice(boosted);

    if list.is_empty() {
        list.push(EventType::GentleBreeze);
    }
    list
}

/// Draw a new event starting at `start_time`.
pub fn spawn(
    rng: &mut SimRng,
    season: Season,
    climate: ClimateZone,
    start_time: f64,
) -> EnvironmentEvent {
    let pool = candidates(season, climate);
    let event_type = pool[rng.gen_range(0..pool.len())];
    EnvironmentEvent {
        event_type,
        intensity: rng.gen_range(MIN_INTENSITY..=MAX_INTENSITY),
        start_time,
        duration_hours: rng.gen_range(MIN_EVENT_HOURS..=MAX_EVENT_HOURS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::rng::seeded;

    #[test]
    fn desert_and_tropical_drop_cold_events() {
        for season in Season::ALL {
            for climate in [ClimateZone::Desert, ClimateZone::Tropical] {
                let list = candidates(season, climate);
                assert!(!list.contains(&EventType::Frost));
                assert!(!list.contains(&EventType::ColdSnap));
                assert!(!list.contains(&EventType::BlizzardWarning));
                assert!(!list.is_empty());
            }
        }
    }

    #[test]
    fn desert_boosts_heat() {
        let list = candidates(Season::Summer, ClimateZone::Desert);
        let droughts = list.iter().filter(|e| **e == EventType::Drought).count();
        assert_eq!(droughts, 2);
        assert!(list.contains(&EventType::SandStorm));
    }

    #[test]
    fn spawned_events_respect_bounds() {
        let mut rng = seeded(42);
        for _ in 0..200 {
            let event = spawn(&mut rng, Season::Winter, ClimateZone::Alpine, 600.0);
            assert!((MIN_INTENSITY..=MAX_INTENSITY).contains(&event.intensity));
            assert!((MIN_EVENT_HOURS..=MAX_EVENT_HOURS).contains(&event.duration_hours));
            assert!(is_compatible(event.event_type, ClimateZone::Alpine));
        }
    }

    #[test]
    fn event_expires_at_end_time() {
        let event = EnvironmentEvent {
            event_type: EventType::Fog,
            intensity: 50,
            start_time: 0.0,
            duration_hours: 2,
        };
        assert!(event.is_active_at(119.0));
        assert!(!event.is_active_at(120.0));
        assert_eq!(event.modifiers().light, -10.0);
    }

    #[test]
    fn remaining_hours_counts_down_to_zero() {
        let event = EnvironmentEvent {
            event_type: EventType::Heatwave,
            intensity: 40,
            start_time: 60.0,
            duration_hours: 3,
        };
        assert_eq!(event.remaining_hours(60.0), 3.0);
        assert_eq!(event.remaining_hours(210.0), 0.5);
        assert_eq!(event.remaining_hours(500.0), 0.0);
    }
}
