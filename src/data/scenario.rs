//! Scenario configuration: base training yields, facility growth, race rewards
//! and flat scenario bonuses, keyed by scenario name.
//!
//! The built-in URA and Unity tables are immutable statics. A YAML overlay can
//! add scenarios or replace built-in ones without touching the statics.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::DeckError;

pub const DEFAULT_SCENARIO: &str = "URA";

/// Column order of a training row: five stat deltas, skill points, energy.
pub const TRAINING_ROW_LEN: usize = 7;
pub const ENERGY_COLUMN: usize = 6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceRewards {
    /// Speed, Stamina, Power, Guts, Wit, Skill Points.
    pub finale: [f64; 6],
    pub career: [f64; 6],
    pub optional: [f64; 6],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub name: String,
    /// One row per facility in Speed, Stamina, Power, Guts, Wit order.
    pub training: [[f64; TRAINING_ROW_LEN]; 5],
    /// Per-level facility growth increment, same facility order.
    pub facility_increments: [f64; 5],
    #[serde(default = "default_max_stats")]
    pub max_stats: [f64; 5],
    pub race_rewards: RaceRewards,
    /// Flat stats granted by the scenario, Speed..Wit.
    #[serde(default)]
    pub bonus_stats: [f64; 5],
    /// Stat pool spread over facilities in proportion to the training distribution.
    #[serde(default)]
    pub distributed_bonus: f64,
}

fn default_max_stats() -> [f64; 5] {
    [1200.0; 5]
}

impl ScenarioConfig {
    pub fn base_gains(&self, facility: usize) -> [f64; 6] {
        let row = &self.training[facility];
        [row[0], row[1], row[2], row[3], row[4], row[5]]
    }

    pub fn energy(&self, facility: usize) -> f64 {
        self.training[facility][ENERGY_COLUMN]
    }
}

static URA: Lazy<ScenarioConfig> = Lazy::new(|| ScenarioConfig {
    name: "URA".to_string(),
    training: [
        [10.0, 0.0, 5.0, 0.0, 0.0, 2.0, -21.0],
        [0.0, 9.0, 0.0, 4.0, 0.0, 2.0, -19.0],
        [0.0, 5.0, 8.0, 0.0, 0.0, 2.0, -20.0],
        [4.0, 0.0, 4.0, 8.0, 0.0, 2.0, -22.0],
        [2.0, 0.0, 0.0, 0.0, 9.0, 4.0, 5.0],
    ],
    facility_increments: [1.0 / 10.0, 1.0 / 9.0, 1.0 / 8.0, 1.0 / 8.0, 1.0 / 9.0],
    max_stats: default_max_stats(),
    race_rewards: standard_race_rewards(),
    bonus_stats: [15.0; 5],
    distributed_bonus: 0.0,
});

// Unity assumes two-trainee unity trainings on average plus rank-up rewards
// and eight spirit bursts of 15 main stat and 7 sub stat.
static UNITY: Lazy<ScenarioConfig> = Lazy::new(|| ScenarioConfig {
    name: "Unity".to_string(),
    training: [
        [10.0, 0.0, 4.0, 0.0, 0.0, 4.0, -19.0],
        [0.0, 10.0, 0.0, 6.0, 0.0, 4.0, -20.0],
        [0.0, 4.0, 11.0, 0.0, 0.0, 4.0, -20.0],
        [3.0, 0.0, 3.0, 8.0, 0.0, 4.0, -22.0],
        [3.0, 0.0, 0.0, 0.0, 11.0, 5.0, 0.0],
    ],
    facility_increments: [1.0 / 8.0, 1.0 / 8.0, 1.0 / 9.0, 1.0 / 6.0, 1.0 / 10.0],
    max_stats: default_max_stats(),
    race_rewards: standard_race_rewards(),
    bonus_stats: [46.0; 5],
    distributed_bonus: (8 * 15 + 8 * 7) as f64,
});

fn standard_race_rewards() -> RaceRewards {
    RaceRewards {
        finale: [10.0, 10.0, 10.0, 10.0, 10.0, 60.0],
        career: [3.0, 3.0, 3.0, 3.0, 3.0, 45.0],
        optional: [1.0, 1.0, 1.0, 1.0, 1.0, 45.0],
    }
}

/// Scenario-exclusive cards (card id -> scenarios it may be used in).
static CARD_LIMITS: Lazy<BTreeMap<u32, Vec<String>>> = Lazy::new(|| {
    let mut limits = BTreeMap::new();
    for card_id in [20021, 10022, 30021, 10021] {
        limits.insert(card_id, vec!["URA".to_string()]);
    }
    for card_id in [30036, 10060] {
        limits.insert(card_id, vec!["Unity".to_string()]);
    }
    limits
});

#[derive(Debug, Default, Deserialize)]
struct ScenarioOverlay {
    #[serde(default)]
    scenarios: Vec<ScenarioConfig>,
    #[serde(default)]
    card_limits: BTreeMap<u32, Vec<String>>,
}

/// Scenario lookup table. Starts from the built-ins; overlays replace by name.
#[derive(Debug, Clone)]
pub struct ScenarioTable {
    scenarios: BTreeMap<String, ScenarioConfig>,
    card_limits: BTreeMap<u32, Vec<String>>,
}

impl Default for ScenarioTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ScenarioTable {
    pub fn builtin() -> Self {
        let mut scenarios = BTreeMap::new();
        scenarios.insert(URA.name.clone(), URA.clone());
        scenarios.insert(UNITY.name.clone(), UNITY.clone());
        Self {
            scenarios,
            card_limits: CARD_LIMITS.clone(),
        }
    }

    pub fn get(&self, name: &str) -> Result<&ScenarioConfig, DeckError> {
        self.scenarios
            .get(name)
            .ok_or_else(|| DeckError::UnknownScenario(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.scenarios.keys().map(String::as_str)
    }

    pub fn insert(&mut self, config: ScenarioConfig) {
        self.scenarios.insert(config.name.clone(), config);
    }

    /// Cards without a limit entry are allowed everywhere.
    pub fn is_card_allowed(&self, card_id: u32, scenario: &str) -> bool {
        match self.card_limits.get(&card_id) {
            Some(allowed) => allowed.iter().any(|name| name == scenario),
            None => true,
        }
    }

    /// Applies a YAML overlay with optional `scenarios` and `card_limits` sections.
    pub fn apply_overlay_str(&mut self, raw: &str) -> Result<(), DeckError> {
        let overlay: ScenarioOverlay = serde_yaml::from_str(raw)?;
        for config in overlay.scenarios {
            log::debug!("scenario overlay replaces '{}'", config.name);
            self.insert(config);
        }
        self.card_limits.extend(overlay.card_limits);
        Ok(())
    }

    pub fn load_overlay(&mut self, path: impl AsRef<Path>) -> Result<(), DeckError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .map_err(|err| DeckError::io(path.display().to_string(), err))?;
        self.apply_overlay_str(&raw)
    }
}
