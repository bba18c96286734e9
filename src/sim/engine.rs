//! Deterministic turn-by-turn training simulation.
//!
//! Cards never roll dice here: facility presence, rainbow trainings and event
//! outcomes are folded into expected values, so the same deck and parameters
//! always produce the same stats.

use serde::{Deserialize, Serialize};

use crate::cards::{BonusKind, CardCategory, ResolvedCard, StatBundle, FACILITY_COUNT};
use crate::data::scenario::{ScenarioConfig, ScenarioTable, DEFAULT_SCENARIO};
use crate::deck::Deck;
use crate::error::DeckError;
use crate::sim::distribution::TrainingDistribution;
use crate::sim::facility::FacilityBonuses;
use crate::sim::{bond_turns, training_turns};

/// Energy deficit that costs one training turn of rest. Calibration constant.
pub const ENERGY_PER_WASTED_TURN: f64 = 71.0;
pub const OPTIONAL_RACE_ENERGY: f64 = 15.0;
pub const DEFAULT_MOOD_BONUS: f64 = 20.0;

const FINALE_RACES: f64 = 3.0;
const CAREER_RACES: f64 = 8.0;
const TURNS_PER_FACILITY_LEVEL: u32 = 4;
const MAX_FACILITY_LEVEL: u32 = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    pub scenario: String,
    pub average_mood_bonus: f64,
    pub optional_races: u32,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            scenario: DEFAULT_SCENARIO.to_string(),
            average_mood_bonus: DEFAULT_MOOD_BONUS,
            optional_races: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AccumulatedStats {
    pub speed: f64,
    pub stamina: f64,
    pub power: f64,
    pub guts: f64,
    pub wit: f64,
    pub skill_points: f64,
}

impl AccumulatedStats {
    /// Speed, Stamina, Power, Guts, Wit, Skill Points.
    pub fn from_array(values: [f64; 6]) -> Self {
        Self {
            speed: values[0],
            stamina: values[1],
            power: values[2],
            guts: values[3],
            wit: values[4],
            skill_points: values[5],
        }
    }

    pub fn to_array(&self) -> [f64; 6] {
        [
            self.speed,
            self.stamina,
            self.power,
            self.guts,
            self.wit,
            self.skill_points,
        ]
    }

    /// Field-wise `self - other`.
    pub fn delta(&self, other: &AccumulatedStats) -> AccumulatedStats {
        let mine = self.to_array();
        let theirs = other.to_array();
        Self::from_array(std::array::from_fn(|index| mine[index] - theirs[index]))
    }
}

/// Full result of one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationOutcome {
    pub scenario: String,
    pub stats: AccumulatedStats,
    pub distribution: TrainingDistribution,
    pub total_turns: f64,
    pub wasted_turns: f64,
    pub usable_turns: f64,
    pub net_energy: f64,
    pub facility_turns: [f64; FACILITY_COUNT],
    /// Cards dropped because the scenario excludes them.
    pub excluded_cards: Vec<u32>,
}

pub fn simulate(
    deck: &Deck,
    scenarios: &ScenarioTable,
    params: &SimulationParams,
) -> Result<AccumulatedStats, DeckError> {
    simulate_detailed(deck, scenarios, params).map(|outcome| outcome.stats)
}

pub fn simulate_detailed(
    deck: &Deck,
    scenarios: &ScenarioTable,
    params: &SimulationParams,
) -> Result<SimulationOutcome, DeckError> {
    let scenario = scenarios.get(&params.scenario)?;

    let (cards, excluded_cards): (Vec<&ResolvedCard>, Vec<&ResolvedCard>) = deck
        .cards()
        .iter()
        .partition(|card| scenarios.is_card_allowed(card.id, &scenario.name));
    let excluded_cards: Vec<u32> = excluded_cards.iter().map(|card| card.id).collect();
    if !excluded_cards.is_empty() {
        log::debug!(
            "scenario {} excludes cards {:?}",
            scenario.name,
            excluded_cards
        );
    }

    let distribution = deck.training_distribution(scenarios, &scenario.name);
    let total_turns = training_turns(params.optional_races);
    let aggregates = DeckAggregates::from_cards(&cards);

    let mut totals = [0.0_f64; 6];

    // Event rewards and starting stats.
    let event_scale = 1.0 + aggregates.event_effectiveness;
    for (slot, value) in totals.iter_mut().zip(aggregates.events.primary()) {
        *slot += value * event_scale;
    }
    totals[5] += aggregates.events.skill_points * event_scale;
    for card in &cards {
        for (slot, kind) in totals.iter_mut().zip(BonusKind::INITIAL_STATS) {
            *slot += card.bonus(kind);
        }
    }

    let net_energy = net_energy(scenario, &distribution, &aggregates, total_turns, params);
    let wasted_turns = if net_energy < 0.0 {
        -net_energy / ENERGY_PER_WASTED_TURN
    } else {
        0.0
    };
    let usable_turns = (total_turns - wasted_turns).max(0.0);

    let mood = 1.0 + params.average_mood_bonus / 100.0;
    let mut facility_turns = [0.0; FACILITY_COUNT];
    for (facility, category) in CardCategory::FACILITIES.iter().enumerate() {
        let turns = usable_turns * distribution.share(facility);
        facility_turns[facility] = turns;
        let members: Vec<&ResolvedCard> = cards
            .iter()
            .copied()
            .filter(|card| card.category == *category)
            .collect();
        let bonuses = FacilityBonuses::from_cards(&members, |card| {
            bond_turns(card.initial_bond()) as f64
        });
        let effectiveness = 1.0
            + aggregates.training_effectiveness * distribution.share(facility)
            + bonuses.training_effectiveness / 100.0;
        let gains = train_facility(scenario, facility, turns, mood, effectiveness, &bonuses);
        log::debug!(
            "{category}: {turns:.2} turns, {} cards, gains {gains:?}",
            bonuses.card_count
        );
        for (slot, gain) in totals.iter_mut().zip(gains) {
            *slot += gain;
        }
    }

    let races = &scenario.race_rewards;
    let race_scale = 1.0 + aggregates.race_bonus;
    let optional = params.optional_races as f64;
    for index in 0..6 {
        totals[index] += races.finale[index] * FINALE_RACES
            + races.career[index] * CAREER_RACES * race_scale
            + races.optional[index] * optional * race_scale;
    }
    for (index, bonus) in scenario.bonus_stats.iter().enumerate() {
        totals[index] += bonus + scenario.distributed_bonus * distribution.share(index);
    }

    for (index, value) in totals.iter_mut().enumerate() {
        if !value.is_finite() {
            log::warn!("non-finite simulated stat at index {index}, using 0");
            *value = 0.0;
        }
    }

    Ok(SimulationOutcome {
        scenario: scenario.name.clone(),
        stats: AccumulatedStats::from_array(totals),
        distribution,
        total_turns,
        wasted_turns,
        usable_turns,
        net_energy,
        facility_turns,
        excluded_cards,
    })
}

/// Deck-wide bonus sums, as fractions.
#[derive(Debug, Default)]
struct DeckAggregates {
    event_effectiveness: f64,
    event_recovery: f64,
    race_bonus: f64,
    wit_friendship_recovery: f64,
    training_effectiveness: f64,
    events: StatBundle,
}

impl DeckAggregates {
    fn from_cards(cards: &[&ResolvedCard]) -> Self {
        let mut aggregates = Self::default();
        for card in cards {
            aggregates.event_effectiveness += card.bonuses.fraction(BonusKind::EventEffectiveness);
            aggregates.event_recovery += card.bonuses.fraction(BonusKind::EventRecovery);
            aggregates.race_bonus += card.bonuses.fraction(BonusKind::RaceBonus);
            aggregates.wit_friendship_recovery +=
                card.bonuses.fraction(BonusKind::WitFriendshipRecovery);
            aggregates.training_effectiveness +=
                card.bonuses.fraction(BonusKind::TrainingEffectiveness);
            aggregates.events.add(&card.event_rewards);
        }
        aggregates
    }
}

fn net_energy(
    scenario: &ScenarioConfig,
    distribution: &TrainingDistribution,
    aggregates: &DeckAggregates,
    total_turns: f64,
    params: &SimulationParams,
) -> f64 {
    let wit_index = CardCategory::Wit.facility_index().unwrap_or(FACILITY_COUNT - 1);
    let mut energy = 0.0;
    for facility in 0..FACILITY_COUNT {
        let mut spent = scenario.energy(facility) * total_turns * distribution.share(facility);
        if facility == wit_index {
            spent *= 1.0 + aggregates.wit_friendship_recovery;
        }
        energy += spent;
    }
    energy += aggregates.events.energy * (1.0 + aggregates.event_recovery);
    energy - OPTIONAL_RACE_ENERGY * params.optional_races as f64
}

/// Stat gains from `turns` trainings at one facility. The last partial turn
/// counts in proportion to its fraction.
fn train_facility(
    scenario: &ScenarioConfig,
    facility: usize,
    turns: f64,
    mood: f64,
    effectiveness: f64,
    bonuses: &FacilityBonuses,
) -> [f64; 6] {
    let mut gains = [0.0; 6];
    if turns <= 0.0 || !turns.is_finite() {
        return gains;
    }
    let base = scenario.base_gains(facility);
    let increment = scenario.facility_increments[facility];
    let normal = mood * effectiveness;
    let rainbow = mood
        * (1.0 + bonuses.mood_effect / 100.0)
        * effectiveness
        * (1.0 + bonuses.friendship / 100.0);

    let whole_turns = turns.ceil() as u32;
    for turn in 0..whole_turns {
        let level = (turn / TURNS_PER_FACILITY_LEVEL).min(MAX_FACILITY_LEVEL);
        let facility_multiplier = 1.0 + level as f64 * increment;
        let multiplier = if bonuses.has_cards() && turn as f64 >= bonuses.average_bond_turn {
            rainbow
        } else {
            normal
        };
        let weight = (turns - turn as f64).min(1.0);
        for (index, gain) in gains.iter_mut().enumerate() {
            if base[index] <= 0.0 {
                continue;
            }
            let turn_gain = (base[index] * facility_multiplier * multiplier).floor() + bonuses.flat[index];
            *gain += turn_gain * weight;
        }
    }
    gains
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::BonusTable;

    fn card(id: u32, category: CardCategory, bonuses: &[(BonusKind, f64)]) -> ResolvedCard {
        let mut table = BonusTable::default();
        for (kind, value) in bonuses {
            table.set(*kind, Some(*value));
        }
        ResolvedCard {
            id,
            limit_break: 4,
            name: format!("card-{id}"),
            category,
            rarity: 3,
            bonuses: table,
            event_rewards: StatBundle::default(),
            hints: Vec::new(),
            turns_to_max_bond: 12,
            max_friendship_turns: 55,
        }
    }

    fn run(deck: &Deck, params: &SimulationParams) -> SimulationOutcome {
        simulate_detailed(deck, &ScenarioTable::builtin(), params).expect("simulation runs")
    }

    #[test]
    fn empty_ura_deck_matches_reference_speed() {
        let outcome = run(&Deck::new(), &SimulationParams::default());
        assert_eq!(outcome.total_turns, 67.0);
        assert!((outcome.net_energy + 1031.8).abs() < 1e-9);
        assert!((outcome.wasted_turns - 1031.8 / 71.0).abs() < 1e-9);
        assert_eq!(outcome.stats.speed.round(), 276.0);
        assert!(outcome.stats.speed > 275.8 && outcome.stats.speed < 275.9);
    }

    #[test]
    fn unknown_scenario_fails() {
        let params = SimulationParams {
            scenario: "Aoharu".to_string(),
            ..SimulationParams::default()
        };
        let err = simulate(&Deck::new(), &ScenarioTable::builtin(), &params).expect_err("unknown");
        assert!(matches!(err, DeckError::UnknownScenario(_)));
    }

    #[test]
    fn simulation_is_deterministic() {
        let deck = Deck::from_cards(vec![
            card(1, CardCategory::Speed, &[(BonusKind::FriendshipBonus, 25.0)]),
            card(2, CardCategory::Wit, &[(BonusKind::TrainingEffectiveness, 10.0)]),
        ]);
        let params = SimulationParams::default();
        assert_eq!(run(&deck, &params), run(&deck, &params));
    }

    #[test]
    fn speed_card_raises_speed() {
        let params = SimulationParams::default();
        let empty = run(&Deck::new(), &params).stats;
        let deck = Deck::from_cards(vec![card(
            1,
            CardCategory::Speed,
            &[
                (BonusKind::FriendshipBonus, 25.0),
                (BonusKind::SpeedBonus, 1.0),
                (BonusKind::SpecialtyPriority, 50.0),
            ],
        )]);
        let with_card = run(&deck, &params).stats;
        assert!(with_card.speed > empty.speed);
    }

    #[test]
    fn scenario_exclusive_card_is_ignored_elsewhere() {
        let unity = SimulationParams {
            scenario: "Unity".to_string(),
            ..SimulationParams::default()
        };
        let deck = Deck::from_cards(vec![card(
            30021,
            CardCategory::Power,
            &[(BonusKind::InitialPower, 30.0)],
        )]);
        let outcome = run(&deck, &unity);
        assert_eq!(outcome.excluded_cards, vec![30021]);
        assert_eq!(outcome.stats, run(&Deck::new(), &unity).stats);
    }

    #[test]
    fn optional_races_cost_energy_and_turns() {
        let none = run(&Deck::new(), &SimulationParams::default());
        let five = run(
            &Deck::new(),
            &SimulationParams {
                optional_races: 5,
                ..SimulationParams::default()
            },
        );
        assert_eq!(five.total_turns, 62.0);
        assert!(five.usable_turns < none.usable_turns);
    }

    #[test]
    fn manual_distribution_is_capped_and_used() {
        let mut deck = Deck::from_cards(vec![card(1, CardCategory::Wit, &[])]);
        deck.set_manual_distribution([0.0, 0.0, 0.0, 0.0, 1.0])
            .expect("valid distribution");
        let outcome = run(&deck, &SimulationParams::default());
        assert_eq!(outcome.distribution.shares(), [0.125, 0.125, 0.125, 0.125, 0.5]);
        assert!(outcome.wasted_turns > 0.0);
        assert!(outcome.usable_turns <= outcome.total_turns);
    }

    #[test]
    fn delta_subtracts_each_field() {
        let high = AccumulatedStats::from_array([10.0, 20.0, 30.0, 40.0, 50.0, 60.0]);
        let low = AccumulatedStats::from_array([1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(high.delta(&low).to_array(), [9.0, 18.0, 27.0, 36.0, 45.0, 54.0]);
    }
}
