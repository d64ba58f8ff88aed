//! Value types shared by the creature and environment engines.
//!
//! Everything here is plain data: the derived-state functions (`MoodState::from_mood`,
//! `GrowthStage::for_level`, `TimeOfDay::from_hour`) are pure so they can be checked in
//! isolation and re-used by snapshot validation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Behavioral state of the creature, re-derived every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CreatureState {
    #[default]
    Idle,
    Growing,
    Blooming,
    Sleeping,
    Thirsty,
    Wilting,
    Unhealthy,
}

impl CreatureState {
    /// States entered by a care action rather than by vitals.
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            CreatureState::Growing | CreatureState::Blooming | CreatureState::Sleeping
        )
    }
}

/// Qualitative mood, a step function of the `mood` vital.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum MoodState {
    Ecstatic,
    Happy,
    #[default]
    Content,
    Neutral,
    Unhappy,
    Sad,
    Miserable,
}

impl MoodState {
    pub fn from_mood(mood: u8) -> Self {
        match mood {
            90..=u8::MAX => MoodState::Ecstatic,
            75..=89 => MoodState::Happy,
            60..=74 => MoodState::Content,
            40..=59 => MoodState::Neutral,
            25..=39 => MoodState::Unhappy,
            10..=24 => MoodState::Sad,
            _ => MoodState::Miserable,
        }
    }

    /// XP multiplier applied by `Creature::add_experience`.
    pub fn xp_multiplier(self) -> f64 {
        match self {
            MoodState::Ecstatic => 1.3,
            MoodState::Happy => 1.2,
            MoodState::Content => 1.1,
            MoodState::Neutral => 1.0,
            MoodState::Unhappy => 0.9,
            MoodState::Sad => 0.8,
            MoodState::Miserable => 0.7,
        }
    }
}

/// Coarse life stage, a step function of level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum GrowthStage {
    #[default]
    Seedling,
    Sapling,
    YoungBonsai,
    MatureBonsai,
    ElderBonsai,
    AncientBonsai,
    LegendaryBonsai,
}

impl GrowthStage {
    pub fn for_level(level: u32) -> Self {
        match level {
            0..=5 => GrowthStage::Seedling,
            6..=15 => GrowthStage::Sapling,
            16..=30 => GrowthStage::YoungBonsai,
            31..=50 => GrowthStage::MatureBonsai,
            51..=75 => GrowthStage::ElderBonsai,
            76..=100 => GrowthStage::AncientBonsai,
            _ => GrowthStage::LegendaryBonsai,
        }
    }
}

/// Afflictions with their own decay and self-cure dynamics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum HealthCondition {
    #[default]
    Healthy,
    RootRot,
    LeafSpot,
    PestInfestation,
    NutrientDeficiency,
    Sunburn,
    Overtraining,
}

impl HealthCondition {
    pub fn is_healthy(self) -> bool {
        self == HealthCondition::Healthy
    }
}

/// Care actions guarded by a cooldown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CareAction {
    Water,
    Prune,
    Rest,
    Fertilize,
    CleanArea,
    LightExercise,
    IntenseTraining,
    Play,
    Meditation,
}

impl CareAction {
    pub const ALL: [CareAction; 9] = [
        CareAction::Water,
        CareAction::Prune,
        CareAction::Rest,
        CareAction::Fertilize,
        CareAction::CleanArea,
        CareAction::LightExercise,
        CareAction::IntenseTraining,
        CareAction::Play,
        CareAction::Meditation,
    ];

    /// Cooldown in real minutes.
    pub fn cooldown_minutes(self) -> i64 {
        match self {
            CareAction::Water => 2,
            CareAction::Prune => 3,
            CareAction::Rest => 1,
            CareAction::Fertilize => 5,
            CareAction::CleanArea => 4,
            CareAction::LightExercise => 2,
            CareAction::IntenseTraining => 3,
            CareAction::Play => 2,
            CareAction::Meditation => 2,
        }
    }

    /// Minimum energy required before the action is allowed.
    pub fn energy_required(self) -> u8 {
        match self {
            CareAction::LightExercise => 30,
            CareAction::IntenseTraining => 50,
            CareAction::Play => 30,
            _ => 0,
        }
    }

    /// Parse a user supplied action name (case-insensitive, a few aliases).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "water" | "givewater" => Some(CareAction::Water),
            "prune" => Some(CareAction::Prune),
            "rest" | "sleep" => Some(CareAction::Rest),
            "fertilize" | "fertilizer" | "applyfertilizer" => Some(CareAction::Fertilize),
            "clean" | "cleanarea" => Some(CareAction::CleanArea),
            "exercise" | "lightexercise" => Some(CareAction::LightExercise),
            "training" | "train" | "intensetraining" => Some(CareAction::IntenseTraining),
            "play" => Some(CareAction::Play),
            "meditate" | "meditation" => Some(CareAction::Meditation),
            _ => None,
        }
    }
}

impl fmt::Display for CareAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Consumable food items held in the inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FoodItem {
    Burger,
    IceCream,
    Vegetables,
    PremiumNutrients,
    SpecialTreat,
}

impl FoodItem {
    pub const ALL: [FoodItem; 5] = [
        FoodItem::Burger,
        FoodItem::IceCream,
        FoodItem::Vegetables,
        FoodItem::PremiumNutrients,
        FoodItem::SpecialTreat,
    ];

    /// Inventory key for this item.
    pub fn id(self) -> &'static str {
        match self {
            FoodItem::Burger => "burger",
            FoodItem::IceCream => "ice_cream",
            FoodItem::Vegetables => "vegetables",
            FoodItem::PremiumNutrients => "premium_nutrients",
            FoodItem::SpecialTreat => "special_treat",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        FoodItem::ALL.into_iter().find(|item| item.id() == id)
    }

    /// Shop price in bonsai bills.
    pub fn price(self) -> u64 {
        match self {
            FoodItem::Burger => 15,
            FoodItem::IceCream => 10,
            FoodItem::Vegetables => 0,
            FoodItem::PremiumNutrients => 60,
            FoodItem::SpecialTreat => 35,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum Season {
    #[default]
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Spring, Season::Summer, Season::Autumn, Season::Winter];

    pub fn from_index(index: u32) -> Self {
        Season::ALL[(index % 4) as usize]
    }

    pub fn next(self) -> Self {
        match self {
            Season::Spring => Season::Summer,
            Season::Summer => Season::Autumn,
            Season::Autumn => Season::Winter,
            Season::Winter => Season::Spring,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Weather {
    #[default]
    Sunny,
    Cloudy,
    Rain,
    Humid,
    Wind,
    Storm,
    Snow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ClimateZone {
    #[default]
    Temperate,
    Tropical,
    Desert,
    Alpine,
}

impl ClimateZone {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "temperate" => Some(ClimateZone::Temperate),
            "tropical" => Some(ClimateZone::Tropical),
            "desert" => Some(ClimateZone::Desert),
            "alpine" => Some(ClimateZone::Alpine),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TimeOfDay {
    #[default]
    Morning,
    Day,
    Evening,
    Night,
}

/// Hour boundaries for `TimeOfDay`. Two bandings exist; both are selectable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayBands {
    pub morning_start: u32,
    pub day_start: u32,
    pub evening_start: u32,
    pub night_start: u32,
}

impl DayBands {
    /// Morning 5-10, Day 10-18, Evening 18-22.
    pub const EXTENDED: DayBands = DayBands {
        morning_start: 5,
        day_start: 10,
        evening_start: 18,
        night_start: 22,
    };

    /// Morning 6-10, Day 10-16, Evening 16-20.
    pub const CLASSIC: DayBands = DayBands {
        morning_start: 6,
        day_start: 10,
        evening_start: 16,
        night_start: 20,
    };

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "extended" => Some(DayBands::EXTENDED),
            "classic" => Some(DayBands::CLASSIC),
            _ => None,
        }
    }
}

impl Default for DayBands {
    fn default() -> Self {
        DayBands::EXTENDED
    }
}

impl TimeOfDay {
    pub fn from_hour(hour: u32, bands: &DayBands) -> Self {
        let hour = hour % 24;
        if hour >= bands.morning_start && hour < bands.day_start {
            TimeOfDay::Morning
        } else if hour >= bands.day_start && hour < bands.evening_start {
            TimeOfDay::Day
        } else if hour >= bands.evening_start && hour < bands.night_start {
            TimeOfDay::Evening
        } else {
            TimeOfDay::Night
        }
    }
}

/// Randomly generated environmental event types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    Heatwave,
    ColdSnap,
    Frost,
    Drought,
    HeavyRain,
    PestOutbreak,
    Pollination,
    BlizzardWarning,
    Monsoon,
    SandStorm,
    Fog,
    GentleBreeze,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn growth_stage_boundaries() {
        let cases = [
            (1, GrowthStage::Seedling),
            (5, GrowthStage::Seedling),
            (6, GrowthStage::Sapling),
            (15, GrowthStage::Sapling),
            (16, GrowthStage::YoungBonsai),
            (30, GrowthStage::YoungBonsai),
            (31, GrowthStage::MatureBonsai),
            (50, GrowthStage::MatureBonsai),
            (51, GrowthStage::ElderBonsai),
            (75, GrowthStage::ElderBonsai),
            (76, GrowthStage::AncientBonsai),
            (100, GrowthStage::AncientBonsai),
            (101, GrowthStage::LegendaryBonsai),
        ];
        for (level, expected) in cases {
            assert_eq!(GrowthStage::for_level(level), expected, "level {}", level);
        }
    }

    #[test]
    fn mood_state_thresholds() {
        assert_eq!(MoodState::from_mood(95), MoodState::Ecstatic);
        assert_eq!(MoodState::from_mood(80), MoodState::Happy);
        assert_eq!(MoodState::from_mood(65), MoodState::Content);
        assert_eq!(MoodState::from_mood(50), MoodState::Neutral);
        assert_eq!(MoodState::from_mood(30), MoodState::Unhappy);
        assert_eq!(MoodState::from_mood(15), MoodState::Sad);
        assert_eq!(MoodState::from_mood(5), MoodState::Miserable);
    }

    #[test]
    fn time_of_day_bandings_differ() {
        assert_eq!(TimeOfDay::from_hour(5, &DayBands::EXTENDED), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_hour(5, &DayBands::CLASSIC), TimeOfDay::Night);
        assert_eq!(TimeOfDay::from_hour(17, &DayBands::EXTENDED), TimeOfDay::Day);
        assert_eq!(TimeOfDay::from_hour(17, &DayBands::CLASSIC), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::from_hour(21, &DayBands::EXTENDED), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::from_hour(21, &DayBands::CLASSIC), TimeOfDay::Night);
        assert_eq!(TimeOfDay::from_hour(0, &DayBands::EXTENDED), TimeOfDay::Night);
    }

    #[test]
    fn care_action_parsing() {
        assert_eq!(CareAction::parse("Water"), Some(CareAction::Water));
        assert_eq!(CareAction::parse("intense-training"), Some(CareAction::IntenseTraining));
        assert_eq!(CareAction::parse("clean_area"), Some(CareAction::CleanArea));
        assert_eq!(CareAction::parse("dance"), None);
    }

    #[test]
    fn food_item_ids_round_trip() {
        for item in FoodItem::ALL {
            assert_eq!(FoodItem::from_id(item.id()), Some(item));
        }
        assert_eq!(FoodItem::from_id("pizza"), None);
    }
}
