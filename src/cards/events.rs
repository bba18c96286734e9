//! Best-choice evaluation of a card's story events.
//!
//! Each choice's rewards are split into outcome groups on the `di` marker. A
//! choice with a single group yields that group; a branching choice yields its
//! best group. Within an event the best positive choice is taken, modelling a
//! player who always picks optimally.

use serde::Serialize;

use crate::data::card::{parse_signed_int, EventChoice, EventRecord, EventTable, RewardEntry};

/// Penalty applied to an outcome that ends the event chain early. A tunable
/// heuristic, not a derived value.
pub const EARLY_TERMINATION_PENALTY: f64 = 1000.0;

const OUTCOME_DELIMITER: &str = "di";
const CHAIN_ENDED: &str = "ee";

const PRIMARY_STAT_WEIGHT: f64 = 1.0;
const ENERGY_WEIGHT: f64 = 2.0;
const POTENTIAL_WEIGHT: f64 = 0.2;
const BOND_WEIGHT: f64 = 0.0;

/// Summed event rewards. `skill_points` is the dataset's "Potential".
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StatBundle {
    pub speed: f64,
    pub stamina: f64,
    pub power: f64,
    pub guts: f64,
    pub wit: f64,
    pub energy: f64,
    pub skill_points: f64,
    pub bond: f64,
    pub skill_hints: f64,
}

impl StatBundle {
    pub fn evaluate(&self) -> f64 {
        (self.speed + self.stamina + self.power + self.guts + self.wit) * PRIMARY_STAT_WEIGHT
            + self.energy * ENERGY_WEIGHT
            + self.skill_points * POTENTIAL_WEIGHT
            + self.bond * BOND_WEIGHT
    }

    pub fn add(&mut self, other: &StatBundle) {
        self.speed += other.speed;
        self.stamina += other.stamina;
        self.power += other.power;
        self.guts += other.guts;
        self.wit += other.wit;
        self.energy += other.energy;
        self.skill_points += other.skill_points;
        self.bond += other.bond;
        self.skill_hints += other.skill_hints;
    }

    pub fn scaled(&self, factor: f64) -> StatBundle {
        StatBundle {
            speed: self.speed * factor,
            stamina: self.stamina * factor,
            power: self.power * factor,
            guts: self.guts * factor,
            wit: self.wit * factor,
            energy: self.energy * factor,
            skill_points: self.skill_points * factor,
            bond: self.bond * factor,
            skill_hints: self.skill_hints * factor,
        }
    }

    /// Speed, Stamina, Power, Guts, Wit.
    pub fn primary(&self) -> [f64; 5] {
        [self.speed, self.stamina, self.power, self.guts, self.wit]
    }

    fn apply(&mut self, reward: &RewardEntry) {
        let amount = parse_signed_int(&reward.value).unwrap_or(0) as f64;
        match reward.kind.trim() {
            "Speed" => self.speed += amount,
            "Stamina" => self.stamina += amount,
            "Power" => self.power += amount,
            "Guts" => self.guts += amount,
            "Intelligence" | "Wit" => self.wit += amount,
            "All Stats" => {
                self.speed += amount;
                self.stamina += amount;
                self.power += amount;
                self.guts += amount;
                self.wit += amount;
            }
            "Energy" => self.energy += amount,
            "Potential" | "Skill Points" => self.skill_points += amount,
            "Bond" => self.bond += amount,
            "Skill Hint" => self.skill_hints += amount,
            _ => {}
        }
    }
}

/// One mutually exclusive outcome of a choice.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OutcomeGroup {
    pub stats: StatBundle,
    pub ends_chain: bool,
}

impl OutcomeGroup {
    fn from_rewards<'a>(rewards: impl IntoIterator<Item = &'a RewardEntry>) -> Self {
        let mut group = OutcomeGroup::default();
        for reward in rewards {
            if reward.kind.trim() == CHAIN_ENDED {
                group.ends_chain = true;
            } else {
                group.stats.apply(reward);
            }
        }
        group
    }

    pub fn value(&self) -> f64 {
        let penalty = if self.ends_chain {
            EARLY_TERMINATION_PENALTY
        } else {
            0.0
        };
        self.stats.evaluate() - penalty
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChoiceOutcome {
    Single(OutcomeGroup),
    Branching(Vec<OutcomeGroup>),
}

impl ChoiceOutcome {
    pub fn from_choice(choice: &EventChoice) -> Self {
        let mut groups: Vec<Vec<&RewardEntry>> = vec![Vec::new()];
        for reward in &choice.rewards {
            if reward.kind.trim() == OUTCOME_DELIMITER {
                groups.push(Vec::new());
            } else if let Some(current) = groups.last_mut() {
                current.push(reward);
            }
        }
        let mut groups: Vec<OutcomeGroup> = groups
            .into_iter()
            .filter(|group| !group.is_empty())
            .map(OutcomeGroup::from_rewards)
            .collect();

        match groups.len() {
            0 => Self::Single(OutcomeGroup::default()),
            1 => Self::Single(groups.remove(0)),
            _ => Self::Branching(groups),
        }
    }

    /// The group this choice is expected to yield and its evaluated value.
    pub fn best(&self) -> (OutcomeGroup, f64) {
        match self {
            Self::Single(group) => (*group, group.value()),
            Self::Branching(groups) => groups
                .iter()
                .map(|group| (*group, group.value()))
                .fold(None, |best: Option<(OutcomeGroup, f64)>, candidate| match best {
                    Some(current) if current.1 >= candidate.1 => Some(current),
                    _ => Some(candidate),
                })
                .unwrap_or_default(),
        }
    }
}

/// Stats of the best choice in an event, or nothing when no choice is worth more than zero.
pub fn best_event_outcome(event: &EventRecord) -> StatBundle {
    let mut best_value = 0.0;
    let mut best_stats = StatBundle::default();
    for choice in &event.choices {
        let (group, value) = ChoiceOutcome::from_choice(choice).best();
        if value > best_value {
            best_value = value;
            best_stats = group.stats;
        }
    }
    best_stats
}

fn sum_best(events: &[EventRecord]) -> StatBundle {
    let mut total = StatBundle::default();
    for event in events {
        total.add(&best_event_outcome(event));
    }
    total
}

/// Expected rewards across all event categories. Chained, dated and special
/// events always fire; one random event is expected, so random events are averaged.
pub fn best_event_rewards(events: &EventTable) -> StatBundle {
    let mut total = sum_best(&events.chain_events);
    total.add(&sum_best(&events.dates));
    total.add(&sum_best(&events.special_events));
    if !events.random_events.is_empty() {
        let random = sum_best(&events.random_events);
        total.add(&random.scaled(1.0 / events.random_events.len() as f64));
    }
    total
}
