//! Fixed catalogue of support-card bonus categories and the per-card bonus table.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

pub const BONUS_KIND_COUNT: usize = 31;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BonusKind {
    FriendshipBonus,
    MoodEffect,
    SpeedBonus,
    StaminaBonus,
    PowerBonus,
    GutsBonus,
    WitBonus,
    TrainingEffectiveness,
    InitialSpeed,
    InitialStamina,
    InitialPower,
    InitialGuts,
    InitialWit,
    InitialFriendshipGauge,
    RaceBonus,
    FanBonus,
    HintLevels,
    HintFrequency,
    SpecialtyPriority,
    MaxSpeed,
    MaxStamina,
    MaxPower,
    MaxGuts,
    MaxWit,
    EventRecovery,
    EventEffectiveness,
    FailureProtection,
    EnergyCostReduction,
    MinigameEffectiveness,
    SkillPointBonus,
    WitFriendshipRecovery,
}

impl BonusKind {
    pub const ALL: [BonusKind; BONUS_KIND_COUNT] = [
        BonusKind::FriendshipBonus,
        BonusKind::MoodEffect,
        BonusKind::SpeedBonus,
        BonusKind::StaminaBonus,
        BonusKind::PowerBonus,
        BonusKind::GutsBonus,
        BonusKind::WitBonus,
        BonusKind::TrainingEffectiveness,
        BonusKind::InitialSpeed,
        BonusKind::InitialStamina,
        BonusKind::InitialPower,
        BonusKind::InitialGuts,
        BonusKind::InitialWit,
        BonusKind::InitialFriendshipGauge,
        BonusKind::RaceBonus,
        BonusKind::FanBonus,
        BonusKind::HintLevels,
        BonusKind::HintFrequency,
        BonusKind::SpecialtyPriority,
        BonusKind::MaxSpeed,
        BonusKind::MaxStamina,
        BonusKind::MaxPower,
        BonusKind::MaxGuts,
        BonusKind::MaxWit,
        BonusKind::EventRecovery,
        BonusKind::EventEffectiveness,
        BonusKind::FailureProtection,
        BonusKind::EnergyCostReduction,
        BonusKind::MinigameEffectiveness,
        BonusKind::SkillPointBonus,
        BonusKind::WitFriendshipRecovery,
    ];

    /// Flat per-stat training bonuses, Speed..Wit then Skill Points.
    pub const STAT_BONUSES: [BonusKind; 6] = [
        BonusKind::SpeedBonus,
        BonusKind::StaminaBonus,
        BonusKind::PowerBonus,
        BonusKind::GutsBonus,
        BonusKind::WitBonus,
        BonusKind::SkillPointBonus,
    ];

    pub const INITIAL_STATS: [BonusKind; 5] = [
        BonusKind::InitialSpeed,
        BonusKind::InitialStamina,
        BonusKind::InitialPower,
        BonusKind::InitialGuts,
        BonusKind::InitialWit,
    ];

    /// Dataset spelling of the bonus name.
    pub fn name(self) -> &'static str {
        match self {
            Self::FriendshipBonus => "Friendship Bonus",
            Self::MoodEffect => "Mood Effect",
            Self::SpeedBonus => "Speed Bonus",
            Self::StaminaBonus => "Stamina Bonus",
            Self::PowerBonus => "Power Bonus",
            Self::GutsBonus => "Guts Bonus",
            Self::WitBonus => "Wit Bonus",
            Self::TrainingEffectiveness => "Training Effectiveness",
            Self::InitialSpeed => "Initial Speed",
            Self::InitialStamina => "Initial Stamina",
            Self::InitialPower => "Initial Power",
            Self::InitialGuts => "Initial Guts",
            Self::InitialWit => "Initial Wit",
            Self::InitialFriendshipGauge => "Initial Friendship Gauge",
            Self::RaceBonus => "Race Bonus",
            Self::FanBonus => "Fan Bonus",
            Self::HintLevels => "Hint Levels",
            Self::HintFrequency => "Hint Frequency",
            Self::SpecialtyPriority => "Specialty Priority",
            Self::MaxSpeed => "Max Speed",
            Self::MaxStamina => "Max Stamina",
            Self::MaxPower => "Max Power",
            Self::MaxGuts => "Max Guts",
            Self::MaxWit => "Max Wit",
            Self::EventRecovery => "Event Recovery",
            Self::EventEffectiveness => "Event Effectiveness",
            Self::FailureProtection => "Failure Protection",
            Self::EnergyCostReduction => "Energy Cost Reduction",
            Self::MinigameEffectiveness => "Minigame Effectiveness",
            Self::SkillPointBonus => "Skill Point Bonus",
            Self::WitFriendshipRecovery => "Wit Friendship Recovery",
        }
    }

    pub fn from_name(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        Self::ALL.iter().copied().find(|kind| kind.name() == trimmed)
    }

    fn index(self) -> usize {
        self as usize
    }

    /// Unique effects of these kinds compound with the base value instead of adding.
    pub fn stacks_multiplicatively(self) -> bool {
        matches!(
            self,
            Self::FriendshipBonus
                | Self::TrainingEffectiveness
                | Self::HintFrequency
                | Self::FailureProtection
                | Self::EnergyCostReduction
        )
    }
}

/// Bonus magnitudes for one resolved card. `None` means the card does not
/// carry that bonus; it contributes nothing to sums and is never scaled.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BonusTable {
    values: [Option<f64>; BONUS_KIND_COUNT],
}

impl BonusTable {
    pub fn get(&self, kind: BonusKind) -> Option<f64> {
        self.values[kind.index()]
    }

    pub fn value_or_zero(&self, kind: BonusKind) -> f64 {
        self.get(kind).unwrap_or(0.0)
    }

    /// Value as a fraction (`value / 100`), zero when unset.
    pub fn fraction(&self, kind: BonusKind) -> f64 {
        self.value_or_zero(kind) / 100.0
    }

    pub fn set(&mut self, kind: BonusKind, value: Option<f64>) {
        self.values[kind.index()] = value;
    }

    /// Stacks an unlocked unique effect onto the current value.
    pub fn stack(&mut self, kind: BonusKind, value: f64) {
        let stacked = match self.get(kind) {
            None => value,
            Some(base) if kind.stacks_multiplicatively() => {
                ((1.0 + base / 100.0) * (1.0 + value / 100.0) - 1.0) * 100.0
            }
            Some(base) => base + value,
        };
        self.set(kind, Some(stacked));
    }

    pub fn iter(&self) -> impl Iterator<Item = (BonusKind, f64)> + '_ {
        BonusKind::ALL
            .iter()
            .filter_map(|&kind| self.get(kind).map(|value| (kind, value)))
    }
}

impl Serialize for BonusTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (kind, value) in self.iter() {
            map.serialize_entry(kind.name(), &value)?;
        }
        map.end()
    }
}
