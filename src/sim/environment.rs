//! World clock, seasons, weather and events, ticking on their own timeline.
//!
//! The environment keeps game time as a running count of game minutes. One real
//! second advances it by `time_multiplier` game minutes. Day, season and time of
//! day are all derived from that counter.

use chrono::{DateTime, Duration, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::sim::creature::Exposure;
use crate::sim::errors::SimError;
use crate::sim::events::{self, EnvironmentEvent, Modifiers, UpcomingEvent};
use crate::sim::rng::{RngExt, SimRng};
use crate::sim::types::{ClimateZone, DayBands, EventType, Season, TimeOfDay, Weather};
use crate::sim::weather::weather_for_roll;

pub const MIN_TIME_MULTIPLIER: f64 = 0.1;
pub const MAX_TIME_MULTIPLIER: f64 = 100.0;
pub const MINUTES_PER_DAY: f64 = 1440.0;
/// Base weather reroll chance per elapsed game hour.
pub const WEATHER_REROLL_PER_HOUR: f64 = 0.02;
/// Days either side of a season change with doubled reroll chance.
pub const TURBULENCE_DAYS: u64 = 3;

pub const TEMPERATURE_RANGE: (f64, f64) = (-40.0, 60.0);
pub const HUMIDITY_RANGE: (f64, f64) = (5.0, 100.0);
pub const QUALITY_RANGE: (f64, f64) = (0.0, 100.0);

/// Construction-time settings for an [`Environment`].
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentSettings {
    pub climate_zone: ClimateZone,
    pub time_multiplier: f64,
    pub season_length_days: u32,
    pub day_bands: DayBands,
    pub forecast_days: u32,
    pub max_active_events: usize,
    pub daily_event_chance: f64,
}

impl Default for EnvironmentSettings {
    fn default() -> Self {
        Self {
            climate_zone: ClimateZone::Temperate,
            time_multiplier: 1.0,
            season_length_days: 30,
            day_bands: DayBands::EXTENDED,
            forecast_days: 5,
            max_active_events: 2,
            daily_event_chance: 0.15,
        }
    }
}

impl EnvironmentSettings {
    fn sanitized(mut self) -> Self {
        self.time_multiplier = clamp_multiplier(self.time_multiplier);
        self.season_length_days = self.season_length_days.max(1);
        if !self.daily_event_chance.is_finite() {
            self.daily_event_chance = 0.0;
        }
        self.daily_event_chance = self.daily_event_chance.clamp(0.0, 1.0);
        self
    }
}

fn clamp_multiplier(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(MIN_TIME_MULTIPLIER, MAX_TIME_MULTIPLIER)
    } else {
        1.0
    }
}

/// Derived readings, recomputed every tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Readings {
    pub temperature: f64,
    pub humidity: f64,
    pub light_quality: f64,
    pub soil_quality: f64,
    pub air_quality: f64,
}

impl Readings {
    pub fn is_in_range(&self) -> bool {
        let within = |v: f64, (lo, hi): (f64, f64)| v >= lo && v <= hi;
        within(self.temperature, TEMPERATURE_RANGE)
            && within(self.humidity, HUMIDITY_RANGE)
            && within(self.light_quality, QUALITY_RANGE)
            && within(self.soil_quality, QUALITY_RANGE)
            && within(self.air_quality, QUALITY_RANGE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub day: u64,
    pub weather: Weather,
}

/// Notable transitions reported by [`Environment::update`].
#[derive(Debug, Clone, PartialEq)]
pub enum EnvironmentNotice {
    SeasonChanged { from: Season, to: Season },
    WeatherChanged { from: Weather, to: Weather },
    TimeOfDayChanged(TimeOfDay),
    EventStarted(EnvironmentEvent),
    EventEnded(EventType),
}

#[derive(Debug, Clone, Default)]
pub struct EnvironmentReport {
    pub game_minutes_advanced: f64,
    pub notices: Vec<EnvironmentNotice>,
    pub skipped_steps: Vec<&'static str>,
}

#[derive(Debug)]
pub struct Environment {
    pub(crate) settings: EnvironmentSettings,
    pub(crate) game_minutes: f64,
    pub(crate) season: Season,
    pub(crate) weather: Weather,
    pub(crate) time_of_day: TimeOfDay,
    pub(crate) readings: Readings,
    pub(crate) active_events: Vec<EnvironmentEvent>,
    pub(crate) upcoming_events: Vec<UpcomingEvent>,
    pub(crate) forecast: Vec<DailyForecast>,
    pub(crate) last_update_time: DateTime<Utc>,
    pub(crate) rng: SimRng,
}

impl Environment {
    /// Start at day 1, Morning, in Spring, with weather rolled for the season.
    pub fn new(settings: EnvironmentSettings, now: DateTime<Utc>, rng: SimRng) -> Self {
        let settings = settings.sanitized();
        let game_minutes = settings.day_bands.morning_start as f64 * 60.0;
        let mut env = Self {
            season: Season::Spring,
            weather: Weather::Sunny,
            time_of_day: TimeOfDay::from_hour(settings.day_bands.morning_start, &settings.day_bands),
            readings: Readings {
                temperature: 0.0,
                humidity: 50.0,
                light_quality: 50.0,
                soil_quality: 50.0,
                air_quality: 50.0,
            },
            active_events: Vec::new(),
            upcoming_events: Vec::new(),
            forecast: Vec::new(),
            last_update_time: now,
            game_minutes,
            settings,
            rng,
        };
        env.season = env.season_at(env.game_minutes);
        env.weather = env.roll_weather(env.season);
        env.regenerate_forecast();
        env.regenerate_upcoming();
        env.recompute_readings();
        env
    }

    pub fn settings(&self) -> &EnvironmentSettings {
        &self.settings
    }
    pub fn climate_zone(&self) -> ClimateZone {
        self.settings.climate_zone
    }
    pub fn time_multiplier(&self) -> f64 {
        self.settings.time_multiplier
    }
    pub fn season(&self) -> Season {
        self.season
    }
    pub fn weather(&self) -> Weather {
        self.weather
    }
    pub fn time_of_day(&self) -> TimeOfDay {
        self.time_of_day
    }
    pub fn readings(&self) -> Readings {
        self.readings
    }
    pub fn active_events(&self) -> &[EnvironmentEvent] {
        &self.active_events
    }
    pub fn upcoming_events(&self) -> &[UpcomingEvent] {
        &self.upcoming_events
    }
    pub fn forecast(&self) -> &[DailyForecast] {
        &self.forecast
    }
    pub fn game_minutes(&self) -> f64 {
        self.game_minutes
    }
    pub fn last_update_time(&self) -> DateTime<Utc> {
        self.last_update_time
    }

    /// 1-based game day.
    pub fn game_day(&self) -> u64 {
        day_index(self.game_minutes) + 1
    }

    pub fn game_hour(&self) -> u32 {
        ((self.game_minutes.max(0.0) % MINUTES_PER_DAY) / 60.0).floor() as u32
    }

    pub fn game_minute(&self) -> u32 {
        (self.game_minutes.max(0.0) % 60.0).floor() as u32
    }

    /// Readings a creature can factor into its own update.
    pub fn exposure(&self) -> Exposure {
        Exposure {
            temperature: self.readings.temperature,
            humidity: self.readings.humidity,
            light: self.readings.light_quality,
        }
    }

    /// Change the climate. Weather is rerolled and incompatible events end.
    pub fn set_climate_zone(&mut self, zone: ClimateZone) {
        if zone == self.settings.climate_zone {
            return;
        }
        info!("Climate zone changed to {:?}", zone);
        self.settings.climate_zone = zone;
        self.active_events
            .retain(|event| events::is_compatible(event.event_type, zone));
        self.weather = self.roll_weather(self.season);
        self.regenerate_forecast();
        self.regenerate_upcoming();
        self.recompute_readings();
    }

    /// Set the time multiplier, clamped to [0.1, 100].
    pub fn set_time_multiplier(&mut self, multiplier: f64) {
        if !multiplier.is_finite() {
            warn!("ignoring non-finite time multiplier");
            return;
        }
        self.settings.time_multiplier = clamp_multiplier(multiplier);
    }

    /// Move the wall-clock anchor from `from` to `to` without advancing game time.
    pub fn rebase(&mut self, from: DateTime<Utc>, to: DateTime<Utc>) {
        self.last_update_time += to.signed_duration_since(from);
    }

    /// Advance the world to `now`.
    pub fn update(&mut self, now: DateTime<Utc>) -> EnvironmentReport {
        let mut report = EnvironmentReport::default();
        let elapsed = now.signed_duration_since(self.last_update_time);
        if elapsed < Duration::zero() {
            warn!(
                "environment clock moved backwards by {}s; resetting anchor",
                -elapsed.num_seconds()
            );
            self.last_update_time = now;
            return report;
        }
        self.last_update_time = now;

        let real_seconds = elapsed.num_milliseconds() as f64 / 1000.0;
        let delta = real_seconds * self.settings.time_multiplier;
        if !(delta > 0.0) {
            return report;
        }
        report.game_minutes_advanced = delta;

        let previous_day = day_index(self.game_minutes);
        let previous_season = self.season;

        self.run_step("clock", &mut report, |env, _| env.advance_time(delta));
        self.run_step("time_of_day", &mut report, |env, r| {
            let next = TimeOfDay::from_hour(env.game_hour(), &env.settings.day_bands);
            if next != env.time_of_day {
                env.time_of_day = next;
                r.notices.push(EnvironmentNotice::TimeOfDayChanged(next));
            }
            Ok(())
        });
        self.run_step("season", &mut report, |env, _| {
            env.season = env.season_at(env.game_minutes);
            Ok(())
        });

        let season_changed = self.season != previous_season;
        if season_changed {
            self.run_step("season_weather", &mut report, |env, r| {
                info!("Season changed from {:?} to {:?}", previous_season, env.season);
                r.notices.push(EnvironmentNotice::SeasonChanged {
                    from: previous_season,
                    to: env.season,
                });
                let from = env.weather;
                env.weather = env.roll_weather(env.season);
                r.notices.push(EnvironmentNotice::WeatherChanged {
                    from,
                    to: env.weather,
                });
                env.regenerate_forecast();
                Ok(())
            });
        } else {
            self.run_step("weather", &mut report, |env, r| env.maybe_reroll_weather(delta, r));
        }

        self.run_step("expire_events", &mut report, |env, r| {
            env.expire_events(r);
            Ok(())
        });
        self.run_step("spawn_events", &mut report, |env, r| env.maybe_spawn_event(delta, r));

        if season_changed || day_index(self.game_minutes) != previous_day {
            self.run_step("upcoming", &mut report, |env, _| {
                if !season_changed {
                    env.regenerate_forecast();
                }
                env.regenerate_upcoming();
                Ok(())
            });
        }
        self.run_step("readings", &mut report, |env, _| {
            env.recompute_readings();
            Ok(())
        });

        report
    }

    fn run_step<F>(&mut self, step: &'static str, report: &mut EnvironmentReport, f: F)
    where
        F: FnOnce(&mut Self, &mut EnvironmentReport) -> Result<(), SimError>,
    {
        if let Err(err) = f(self, report) {
            warn!("environment step '{}' skipped: {}", step, err);
            report.skipped_steps.push(step);
        }
    }

    fn advance_time(&mut self, delta: f64) -> Result<(), SimError> {
        let next = self.game_minutes + delta;
        if !next.is_finite() {
            return Err(SimError::Internal(format!("game time overflow at +{}", delta)));
        }
        self.game_minutes = next;
        Ok(())
    }

    fn year_days(&self) -> u64 {
        self.settings.season_length_days as u64 * 4
    }

    pub(crate) fn season_at_current(&self) -> Season {
        self.season_at(self.game_minutes)
    }

    fn season_at(&self, game_minutes: f64) -> Season {
        let day_of_year = day_index(game_minutes) % self.year_days();
        Season::from_index((day_of_year / self.settings.season_length_days as u64) as u32)
    }

    fn near_season_boundary(&self) -> bool {
        let length = self.settings.season_length_days as u64;
        let day_in_season = day_index(self.game_minutes) % length;
        day_in_season < TURBULENCE_DAYS || length - day_in_season <= TURBULENCE_DAYS
    }

    fn roll_weather(&mut self, season: Season) -> Weather {
        let roll = self.rng.roll();
        weather_for_roll(season, self.settings.climate_zone, roll)
    }

    fn maybe_reroll_weather(
        &mut self,
        delta: f64,
        report: &mut EnvironmentReport,
    ) -> Result<(), SimError> {
        let mut chance = delta / 60.0 * WEATHER_REROLL_PER_HOUR;
        if self.near_season_boundary() {
            chance *= 2.0;
        }
        if !self.rng.chance(chance) {
            return Ok(());
        }
        let next = self.roll_weather(self.season);
        if next != self.weather {
            debug!("Weather changed from {:?} to {:?}", self.weather, next);
            report.notices.push(EnvironmentNotice::WeatherChanged {
                from: self.weather,
                to: next,
            });
            self.weather = next;
            self.regenerate_forecast();
        }
        Ok(())
    }

    fn expire_events(&mut self, report: &mut EnvironmentReport) {
        let now = self.game_minutes;
        let mut ended = Vec::new();
        self.active_events.retain(|event| {
            let active = event.is_active_at(now);
            if !active {
                ended.push(event.event_type);
            }
            active
        });
        for event_type in ended {
            debug!("Environment event {:?} ended", event_type);
            report.notices.push(EnvironmentNotice::EventEnded(event_type));
        }
    }

    fn maybe_spawn_event(
        &mut self,
        delta: f64,
        report: &mut EnvironmentReport,
    ) -> Result<(), SimError> {
        if self.active_events.len() >= self.settings.max_active_events {
            return Ok(());
        }
        let chance = delta / MINUTES_PER_DAY * self.settings.daily_event_chance;
        if !self.rng.chance(chance) {
            return Ok(());
        }
        let event = events::spawn(
            &mut self.rng,
            self.season,
            self.settings.climate_zone,
            self.game_minutes,
        );
        if self
            .active_events
            .iter()
            .any(|active| active.event_type == event.event_type)
        {
            return Ok(());
        }
        info!(
            "Environment event {:?} started (intensity {}, {}h)",
            event.event_type, event.intensity, event.duration_hours
        );
        self.active_events.push(event);
        report.notices.push(EnvironmentNotice::EventStarted(event));
        Ok(())
    }

    fn regenerate_forecast(&mut self) {
        let today = day_index(self.game_minutes);
        let mut forecast = Vec::with_capacity(self.settings.forecast_days as usize);
        for offset in 1..=self.settings.forecast_days as u64 {
            let day = today + offset;
            let season = self.season_at(day as f64 * MINUTES_PER_DAY);
            forecast.push(DailyForecast {
                day: day + 1,
                weather: self.roll_weather(season),
            });
        }
        self.forecast = forecast;
    }

    fn regenerate_upcoming(&mut self) {
        let today = day_index(self.game_minutes);
        let mut upcoming = Vec::new();
        for offset in 1..=self.settings.forecast_days as u64 {
            if !self.rng.chance(self.settings.daily_event_chance) {
                continue;
            }
            let day = today + offset;
            let season = self.season_at(day as f64 * MINUTES_PER_DAY);
            let predicted = events::spawn(
                &mut self.rng,
                season,
                self.settings.climate_zone,
                day as f64 * MINUTES_PER_DAY,
            );
            upcoming.push(UpcomingEvent {
                event_type: predicted.event_type,
                day: day + 1,
            });
        }
        self.upcoming_events = upcoming;
    }

    fn recompute_readings(&mut self) {
        let climate = self.settings.climate_zone;
        let event_mods = self
            .active_events
            .iter()
            .fold(Modifiers::default(), |acc, event| acc.plus(event.modifiers()));

        let temperature = season_temperature(self.season)
            + climate_temperature(climate)
            + time_temperature(self.time_of_day)
            + weather_temperature(self.weather)
            + event_mods.temperature
            + self.rng.jitter(1.5);

        let humidity = climate_humidity(climate)
            + weather_humidity(self.weather)
            + time_humidity(self.time_of_day)
            + event_mods.humidity
            + self.rng.jitter(3.0);

        let light = time_light(self.time_of_day)
            + weather_light(self.weather)
            + season_light(self.season)
            + event_mods.light
            + self.rng.jitter(2.0);

        let soil = 70.0
            + climate_soil(climate)
            + season_soil(self.season)
            + weather_soil(self.weather)
            + event_mods.soil
            + self.rng.jitter(2.0);

        let daytime_haze = if self.time_of_day == TimeOfDay::Day { 5.0 } else { 0.0 };
        let air = 80.0 + weather_air(self.weather) + climate_air(climate) - daytime_haze
            + event_mods.air
            + self.rng.jitter(2.0);

        self.readings = Readings {
            temperature: clamp_reading(temperature, TEMPERATURE_RANGE),
            humidity: clamp_reading(humidity, HUMIDITY_RANGE),
            light_quality: clamp_reading(light, QUALITY_RANGE),
            soil_quality: clamp_reading(soil, QUALITY_RANGE),
            air_quality: clamp_reading(air, QUALITY_RANGE),
        };
    }
}

fn day_index(game_minutes: f64) -> u64 {
    (game_minutes.max(0.0) / MINUTES_PER_DAY).floor() as u64
}

fn clamp_reading(value: f64, (lo, hi): (f64, f64)) -> f64 {
    if value.is_finite() {
        value.clamp(lo, hi)
    } else {
        lo
    }
}

fn season_temperature(season: Season) -> f64 {
    match season {
        Season::Spring => 15.0,
        Season::Summer => 26.0,
        Season::Autumn => 13.0,
        Season::Winter => 2.0,
    }
}

fn climate_temperature(climate: ClimateZone) -> f64 {
    match climate {
        ClimateZone::Temperate => 0.0,
        ClimateZone::Tropical => 10.0,
        ClimateZone::Desert => 14.0,
        ClimateZone::Alpine => -10.0,
    }
}

fn time_temperature(time: TimeOfDay) -> f64 {
    match time {
        TimeOfDay::Morning => -2.0,
        TimeOfDay::Day => 4.0,
        TimeOfDay::Evening => 0.0,
        TimeOfDay::Night => -5.0,
    }
}

fn weather_temperature(weather: Weather) -> f64 {
    match weather {
        Weather::Sunny => 3.0,
        Weather::Cloudy => -1.0,
        Weather::Rain => -3.0,
        Weather::Humid => 2.0,
        Weather::Wind => -2.0,
        Weather::Storm => -4.0,
        Weather::Snow => -6.0,
    }
}

fn climate_humidity(climate: ClimateZone) -> f64 {
    match climate {
        ClimateZone::Temperate => 55.0,
        ClimateZone::Tropical => 80.0,
        ClimateZone::Desert => 20.0,
        ClimateZone::Alpine => 45.0,
    }
}

fn weather_humidity(weather: Weather) -> f64 {
    match weather {
        Weather::Sunny => -10.0,
        Weather::Cloudy => 5.0,
        Weather::Rain => 25.0,
        Weather::Humid => 30.0,
        Weather::Wind => -10.0,
        Weather::Storm => 30.0,
        Weather::Snow => 10.0,
    }
}

fn time_humidity(time: TimeOfDay) -> f64 {
    match time {
        TimeOfDay::Morning => 5.0,
        TimeOfDay::Day => -5.0,
        TimeOfDay::Evening => 0.0,
        TimeOfDay::Night => 10.0,
    }
}

fn time_light(time: TimeOfDay) -> f64 {
    match time {
        TimeOfDay::Morning => 60.0,
        TimeOfDay::Day => 90.0,
        TimeOfDay::Evening => 40.0,
        TimeOfDay::Night => 5.0,
    }
}

fn weather_light(weather: Weather) -> f64 {
    match weather {
        Weather::Sunny => 10.0,
        Weather::Cloudy => -20.0,
        Weather::Rain => -30.0,
        Weather::Humid => -10.0,
        Weather::Wind => 0.0,
        Weather::Storm => -45.0,
        Weather::Snow => -15.0,
    }
}

fn season_light(season: Season) -> f64 {
    match season {
        Season::Summer => 5.0,
        Season::Winter => -10.0,
        Season::Spring | Season::Autumn => 0.0,
    }
}

fn climate_soil(climate: ClimateZone) -> f64 {
    match climate {
        ClimateZone::Temperate => 0.0,
        ClimateZone::Tropical => 5.0,
        ClimateZone::Desert => -20.0,
        ClimateZone::Alpine => -10.0,
    }
}

fn season_soil(season: Season) -> f64 {
    match season {
        Season::Spring => 10.0,
        Season::Summer => 0.0,
        Season::Autumn => 5.0,
        Season::Winter => -10.0,
    }
}

fn weather_soil(weather: Weather) -> f64 {
    match weather {
        Weather::Rain => 5.0,
        Weather::Storm | Weather::Snow => -5.0,
        _ => 0.0,
    }
}

fn weather_air(weather: Weather) -> f64 {
    match weather {
        Weather::Wind => 10.0,
        Weather::Rain => 5.0,
        Weather::Storm | Weather::Humid => -10.0,
        _ => 0.0,
    }
}

fn climate_air(climate: ClimateZone) -> f64 {
    match climate {
        ClimateZone::Desert => -10.0,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::rng::seeded;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn starts_in_spring_morning() {
        let env = Environment::new(EnvironmentSettings::default(), t0(), seeded(1));
        assert_eq!(env.season(), Season::Spring);
        assert_eq!(env.time_of_day(), TimeOfDay::Morning);
        assert_eq!(env.game_day(), 1);
        assert_eq!(env.forecast().len(), 5);
        assert!(env.readings().is_in_range());
    }

    #[test]
    fn multiplier_is_clamped() {
        let mut env = Environment::new(EnvironmentSettings::default(), t0(), seeded(1));
        env.set_time_multiplier(500.0);
        assert_eq!(env.time_multiplier(), MAX_TIME_MULTIPLIER);
        env.set_time_multiplier(0.0);
        assert_eq!(env.time_multiplier(), MIN_TIME_MULTIPLIER);
        env.set_time_multiplier(f64::NAN);
        assert_eq!(env.time_multiplier(), MIN_TIME_MULTIPLIER);
    }

    #[test]
    fn one_real_second_is_one_game_minute() {
        let mut env = Environment::new(EnvironmentSettings::default(), t0(), seeded(1));
        let start = env.game_minutes();
        let report = env.update(t0() + Duration::seconds(90));
        assert_eq!(report.game_minutes_advanced, 90.0);
        assert_eq!(env.game_minutes(), start + 90.0);
    }

    #[test]
    fn season_advances_after_season_length() {
        let settings = EnvironmentSettings {
            season_length_days: 2,
            time_multiplier: 100.0,
            ..EnvironmentSettings::default()
        };
        let mut env = Environment::new(settings, t0(), seeded(9));
        // 2 game days at 100 game minutes per real second
        let report = env.update(t0() + Duration::seconds(2 * 1440 / 100 + 1));
        assert_eq!(env.season(), Season::Summer);
        assert!(report
            .notices
            .iter()
            .any(|n| matches!(n, EnvironmentNotice::SeasonChanged { to: Season::Summer, .. })));
    }

    #[test]
    fn events_expire_and_cap_holds() {
        let settings = EnvironmentSettings {
            daily_event_chance: 1.0,
            time_multiplier: 100.0,
            ..EnvironmentSettings::default()
        };
        let mut env = Environment::new(settings, t0(), seeded(4));
        let mut now = t0();
        for _ in 0..500 {
            now += Duration::seconds(30);
            env.update(now);
            assert!(env.active_events().len() <= 2);
            let minute = env.game_minutes();
            assert!(env.active_events().iter().all(|e| e.is_active_at(minute)));
            assert!(env.readings().is_in_range());
        }
    }

    #[test]
    fn zero_elapsed_update_is_a_no_op() {
        let mut env = Environment::new(EnvironmentSettings::default(), t0(), seeded(2));
        env.update(t0() + Duration::seconds(10));
        let readings = env.readings();
        let report = env.update(t0() + Duration::seconds(10));
        assert!(report.notices.is_empty());
        assert_eq!(env.readings(), readings);
    }

    #[test]
    fn climate_change_drops_cold_events() {
        let mut env = Environment::new(EnvironmentSettings::default(), t0(), seeded(2));
        env.active_events.push(EnvironmentEvent {
            event_type: EventType::Frost,
            intensity: 40,
            start_time: env.game_minutes(),
            duration_hours: 10,
        });
        env.set_climate_zone(ClimateZone::Desert);
        assert!(env.active_events().is_empty());
        assert_eq!(env.climate_zone(), ClimateZone::Desert);
    }
}
