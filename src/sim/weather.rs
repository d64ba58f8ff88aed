//! Weighted weather tables keyed by season and climate.
//!
//! Each (climate, season) pair is a cumulative ladder: the first rung whose
//! threshold exceeds the roll wins, the final rung catches everything else.

use crate::sim::types::{ClimateZone, Season, Weather};

type Ladder = &'static [(f64, Weather)];

const TEMPERATE_SPRING: Ladder = &[
    (0.4, Weather::Cloudy),
    (0.7, Weather::Rain),
    (0.9, Weather::Sunny),
    (1.0, Weather::Wind),
];
const TEMPERATE_SUMMER: Ladder = &[
    (0.5, Weather::Sunny),
    (0.6, Weather::Humid),
    (0.75, Weather::Rain),
    (0.9, Weather::Cloudy),
    (1.0, Weather::Storm),
];
const TEMPERATE_AUTUMN: Ladder = &[
    (0.3, Weather::Cloudy),
    (0.55, Weather::Rain),
    (0.75, Weather::Wind),
    (0.9, Weather::Sunny),
    (1.0, Weather::Storm),
];
const TEMPERATE_WINTER: Ladder = &[
    (0.35, Weather::Snow),
    (0.65, Weather::Cloudy),
    (0.8, Weather::Wind),
    (0.9, Weather::Sunny),
    (1.0, Weather::Rain),
];

const TROPICAL_SPRING: Ladder = &[
    (0.35, Weather::Humid),
    (0.6, Weather::Sunny),
    (0.85, Weather::Rain),
    (1.0, Weather::Cloudy),
];
const TROPICAL_SUMMER: Ladder = &[
    (0.35, Weather::Rain),
    (0.6, Weather::Humid),
    (0.8, Weather::Storm),
    (1.0, Weather::Sunny),
];
const TROPICAL_AUTUMN: Ladder = &[
    (0.3, Weather::Rain),
    (0.55, Weather::Humid),
    (0.75, Weather::Cloudy),
    (0.9, Weather::Sunny),
    (1.0, Weather::Storm),
];
const TROPICAL_WINTER: Ladder = &[
    (0.45, Weather::Sunny),
    (0.7, Weather::Cloudy),
    (0.9, Weather::Humid),
    (1.0, Weather::Rain),
];

const DESERT_SPRING: Ladder = &[
    (0.6, Weather::Sunny),
    (0.85, Weather::Wind),
    (0.95, Weather::Cloudy),
    (1.0, Weather::Rain),
];
const DESERT_SUMMER: Ladder = &[
    (0.75, Weather::Sunny),
    (0.92, Weather::Wind),
    (1.0, Weather::Storm),
];
const DESERT_AUTUMN: Ladder = &[
    (0.6, Weather::Sunny),
    (0.8, Weather::Wind),
    (0.95, Weather::Cloudy),
    (1.0, Weather::Rain),
];
const DESERT_WINTER: Ladder = &[
    (0.5, Weather::Sunny),
    (0.75, Weather::Cloudy),
    (0.9, Weather::Wind),
    (1.0, Weather::Rain),
];

const ALPINE_SPRING: Ladder = &[
    (0.3, Weather::Cloudy),
    (0.5, Weather::Snow),
    (0.7, Weather::Rain),
    (0.9, Weather::Sunny),
    (1.0, Weather::Wind),
];
const ALPINE_SUMMER: Ladder = &[
    (0.45, Weather::Sunny),
    (0.7, Weather::Cloudy),
    (0.85, Weather::Rain),
    (0.95, Weather::Wind),
    (1.0, Weather::Storm),
];
const ALPINE_AUTUMN: Ladder = &[
    (0.3, Weather::Cloudy),
    (0.5, Weather::Wind),
    (0.7, Weather::Snow),
    (0.85, Weather::Rain),
    (1.0, Weather::Sunny),
];
const ALPINE_WINTER: Ladder = &[
    (0.6, Weather::Snow),
    (0.8, Weather::Cloudy),
    (0.9, Weather::Wind),
    (0.97, Weather::Storm),
    (1.0, Weather::Sunny),
];

fn ladder(season: Season, climate: ClimateZone) -> Ladder {
    match (climate, season) {
        (ClimateZone::Temperate, Season::Spring) => TEMPERATE_SPRING,
        (ClimateZone::Temperate, Season::Summer) => TEMPERATE_SUMMER,
        (ClimateZone::Temperate, Season::Autumn) => TEMPERATE_AUTUMN,
        (ClimateZone::Temperate, Season::Winter) => TEMPERATE_WINTER,
        (ClimateZone::Tropical, Season::Spring) => TROPICAL_SPRING,
        (ClimateZone::Tropical, Season::Summer) => TROPICAL_SUMMER,
        (ClimateZone::Tropical, Season::Autumn) => TROPICAL_AUTUMN,
        (ClimateZone::Tropical, Season::Winter) => TROPICAL_WINTER,
        (ClimateZone::Desert, Season::Spring) => DESERT_SPRING,
        (ClimateZone::Desert, Season::Summer) => DESERT_SUMMER,
        (ClimateZone::Desert, Season::Autumn) => DESERT_AUTUMN,
        (ClimateZone::Desert, Season::Winter) => DESERT_WINTER,
        (ClimateZone::Alpine, Season::Spring) => ALPINE_SPRING,
        (ClimateZone::Alpine, Season::Summer) => ALPINE_SUMMER,
        (ClimateZone::Alpine, Season::Autumn) => ALPINE_AUTUMN,
        (ClimateZone::Alpine, Season::Winter) => ALPINE_WINTER,
    }
}

/// Pick the weather for a roll in `[0, 1)`. Out-of-range rolls are clamped.
pub fn weather_for_roll(season: Season, climate: ClimateZone, roll: f64) -> Weather {
    let roll = if roll.is_finite() { roll.clamp(0.0, 1.0) } else { 0.0 };
    let rungs = ladder(season, climate);
    for &(threshold, weather) in rungs {
        if roll < threshold {
            return weather;
        }
    }
    rungs
        .last()
        .map(|&(_, weather)| weather)
        .unwrap_or_default()
}

/// Whether `weather` can ever be rolled for this season and climate.
pub fn is_possible(season: Season, climate: ClimateZone, weather: Weather) -> bool {
    ladder(season, climate).iter().any(|&(_, w)| w == weather)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temperate_summer_ladder() {
        let pick = |r| weather_for_roll(Season::Summer, ClimateZone::Temperate, r);
        assert_eq!(pick(0.1), Weather::Sunny);
        assert_eq!(pick(0.55), Weather::Humid);
        assert_eq!(pick(0.65), Weather::Rain);
        assert_eq!(pick(0.8), Weather::Cloudy);
        assert_eq!(pick(0.95), Weather::Storm);
    }

    #[test]
    fn temperate_spring_ladder() {
        let pick = |r| weather_for_roll(Season::Spring, ClimateZone::Temperate, r);
        assert_eq!(pick(0.0), Weather::Cloudy);
        assert_eq!(pick(0.4), Weather::Rain);
        assert_eq!(pick(0.89), Weather::Sunny);
        assert_eq!(pick(0.99), Weather::Wind);
    }

    #[test]
    fn every_ladder_is_ordered_and_complete() {
        for climate in [
            ClimateZone::Temperate,
            ClimateZone::Tropical,
            ClimateZone::Desert,
            ClimateZone::Alpine,
        ] {
            for season in Season::ALL {
                let rungs = ladder(season, climate);
                assert!(rungs.windows(2).all(|w| w[0].0 < w[1].0));
                assert_eq!(rungs.last().map(|r| r.0), Some(1.0));
            }
        }
    }

    #[test]
    fn desert_summer_never_snows() {
        for i in 0..100 {
            let roll = i as f64 / 100.0;
            assert_ne!(
                weather_for_roll(Season::Summer, ClimateZone::Desert, roll),
                Weather::Snow
            );
        }
        assert!(!is_possible(Season::Summer, ClimateZone::Desert, Weather::Snow));
    }

    #[test]
    fn roll_of_one_hits_last_rung() {
        assert_eq!(
            weather_for_roll(Season::Winter, ClimateZone::Alpine, 1.0),
            Weather::Sunny
        );
        assert_eq!(
            weather_for_roll(Season::Winter, ClimateZone::Alpine, f64::NAN),
            Weather::Snow
        );
    }
}
