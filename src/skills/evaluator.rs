//! Value and activation-probability estimates for hinted skills.

use serde::{Deserialize, Serialize};

use crate::data::card::SkillRecord;
use crate::sim::AccumulatedStats;
use crate::skills::condition::{Clause, CompareOp, Condition};

pub const DISTANCE_LABELS: [&str; 4] = ["Sprint", "Mile", "Medium", "Long"];
pub const RUNNING_STYLE_LABELS: [&str; 4] = ["Front Runner", "Pace Chaser", "Late Surger", "End Closer"];

/// Floor of the wit-based activation heuristic.
const MIN_WIT_PROC: f64 = 0.2;
const WIT_PROC_SCALE: f64 = 90.0;

/// Active race distances and running styles, in label order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceContext {
    pub distances: [bool; 4],
    pub running_styles: [bool; 4],
}

impl RaceContext {
    pub fn new(distances: [bool; 4], running_styles: [bool; 4]) -> Self {
        Self {
            distances,
            running_styles,
        }
    }

    /// Flag for a 1-based trigger index, `None` when out of range.
    fn flag(flags: &[bool; 4], one_based: i64) -> Option<bool> {
        usize::try_from(one_based - 1)
            .ok()
            .and_then(|index| flags.get(index).copied())
    }

    pub fn distance(&self, one_based: i64) -> Option<bool> {
        Self::flag(&self.distances, one_based)
    }

    pub fn running_style(&self, one_based: i64) -> Option<bool> {
        Self::flag(&self.running_styles, one_based)
    }
}

/// Per-stat weights used to value a skill.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatWeights {
    pub speed: f64,
    pub stamina: f64,
    pub power: f64,
    pub guts: f64,
    pub wit: f64,
}

impl Default for StatWeights {
    fn default() -> Self {
        Self {
            speed: 1.0,
            stamina: 1.0,
            power: 1.0,
            guts: 1.0,
            wit: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SkillEvaluation {
    /// Stat-equivalent value, `None` for ability types with no known valuation.
    pub value: Option<f64>,
    pub proc_chance: f64,
}

impl SkillEvaluation {
    pub fn expected_value(&self) -> Option<f64> {
        self.value.map(|value| value * self.proc_chance)
    }
}

/// Stat-equivalent value of a skill by ability type.
pub fn skill_value(ability_type: i32, ability_value: f64, weights: &StatWeights) -> Option<f64> {
    match ability_type {
        // stamina recovery
        9 => Some(weights.stamina * ability_value * 200.0 / 550.0),
        // reaction time
        10 => Some(weights.speed * ability_value * 20.0 / 4000.0),
        // target speed
        27 => Some(weights.speed * ability_value * 60.0 / 4000.0),
        // navigation has no stat equivalent
        28 => Some(0.0),
        // acceleration
        31 => Some(weights.power * ability_value * 60.0 / 4000.0),
        _ => None,
    }
}

pub fn wit_proc_chance(wit: f64) -> f64 {
    if wit > 0.0 {
        (1.0 - WIT_PROC_SCALE / wit).max(MIN_WIT_PROC)
    } else {
        0.0
    }
}

fn flag_probability(flag: Option<bool>, op: CompareOp, wit: f64) -> f64 {
    match (flag, op) {
        (Some(set), CompareOp::Eq) => f64::from(u8::from(set)),
        (Some(set), CompareOp::Ne) => f64::from(u8::from(!set)),
        _ => wit_proc_chance(wit),
    }
}

fn clause_probability(clause: &Clause, context: &RaceContext, wit: f64) -> f64 {
    match clause.field.as_str() {
        "running_style" => flag_probability(context.running_style(clause.value), clause.op, wit),
        "distance_type" => flag_probability(context.distance(clause.value), clause.op, wit),
        "is_badstart" => 0.25,
        "order_rate" | "always" | "is_lastspurt" | "hp_per" | "phase" => 1.0,
        "is_surrounded" | "change_order_onetime" => 0.8,
        _ => wit_proc_chance(wit),
    }
}

/// Probability that a parsed condition is met in `context`.
pub fn condition_probability(condition: &Condition, context: &RaceContext, wit: f64) -> f64 {
    if condition.is_always() {
        return 1.0;
    }
    condition.groups.iter().fold(0.0, |either, group| {
        let all: f64 = group
            .iter()
            .map(|clause| clause_probability(clause, context, wit))
            .product();
        either + all - either * all
    })
}

/// Activation probability for a raw condition string. Malformed conditions
/// never proc and are logged rather than propagated.
pub fn proc_chance(raw_condition: &str, context: &RaceContext, wit: f64) -> f64 {
    match Condition::parse(raw_condition) {
        Ok(condition) => condition_probability(&condition, context, wit),
        Err(err) => {
            log::warn!("{err}; treating skill as never activating");
            0.0
        }
    }
}

pub fn evaluate_skill(
    skill: &SkillRecord,
    deck_stats: &AccumulatedStats,
    context: &RaceContext,
    weights: &StatWeights,
) -> SkillEvaluation {
    let value = skill_value(skill.ability_type, skill.ability_value, weights);
    if value.is_none() {
        log::debug!(
            "no valuation for skill '{}' (ability type {})",
            skill.skill_name.as_deref().unwrap_or("unknown"),
            skill.ability_type
        );
    }
    SkillEvaluation {
        value,
        proc_chance: proc_chance(skill.condition(), context, deck_stats.wit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(left: f64, right: f64) -> bool {
        (left - right).abs() < 1e-9
    }

    fn medium_pace() -> RaceContext {
        RaceContext::new([false, false, true, false], [false, true, false, false])
    }

    #[test]
    fn empty_condition_always_procs() {
        assert_eq!(proc_chance("", &medium_pace(), 0.0), 1.0);
    }

    #[test]
    fn running_style_flags_gate_activation() {
        let context = medium_pace();
        assert_eq!(proc_chance("running_style==1", &context, 600.0), 0.0);
        assert_eq!(proc_chance("running_style==2", &context, 600.0), 1.0);
        assert_eq!(proc_chance("running_style!=2", &context, 600.0), 0.0);
        assert_eq!(proc_chance("distance_type!=1", &context, 600.0), 1.0);
    }

    #[test]
    fn out_of_range_flag_uses_wit_heuristic() {
        let context = medium_pace();
        assert!(approx_eq(proc_chance("running_style==7", &context, 300.0), 0.7));
        assert!(approx_eq(proc_chance("distance_type>=2", &context, 300.0), 0.7));
    }

    #[test]
    fn fixed_fields_and_wit_fallback() {
        let context = medium_pace();
        assert_eq!(proc_chance("is_badstart==1", &context, 0.0), 0.25);
        assert_eq!(proc_chance("is_surrounded==1", &context, 0.0), 0.8);
        assert_eq!(proc_chance("corner_random==1", &context, 0.0), 0.0);
        assert!(approx_eq(proc_chance("corner_random==1", &context, 100.0), 0.2));
        assert!(approx_eq(proc_chance("corner_random==1", &context, 900.0), 0.9));
    }

    #[test]
    fn and_multiplies_and_or_combines_independently() {
        let context = medium_pace();
        assert!(approx_eq(
            proc_chance("is_surrounded==1&is_badstart==1", &context, 0.0),
            0.2
        ));
        // 0.25 and 0.25 -> 0.4375
        assert!(approx_eq(
            proc_chance("is_badstart==1@is_badstart==1", &context, 0.0),
            0.4375
        ));
        // wit 180 -> 0.5 each branch -> 0.75
        assert!(approx_eq(
            proc_chance("corner_random==1@straight_random==1", &context, 180.0),
            0.75
        ));
    }

    #[test]
    fn malformed_condition_never_procs() {
        assert_eq!(proc_chance("phase=>2", &medium_pace(), 600.0), 0.0);
    }

    #[test]
    fn skill_value_table() {
        let weights = StatWeights {
            speed: 2.0,
            stamina: 1.1,
            power: 0.5,
            guts: 1.0,
            wit: 1.0,
        };
        assert!(approx_eq(skill_value(9, 550.0, &weights).unwrap_or_default(), 220.0));
        assert!(approx_eq(skill_value(27, 4000.0, &weights).unwrap_or_default(), 120.0));
        assert!(approx_eq(skill_value(10, 4000.0, &weights).unwrap_or_default(), 40.0));
        assert!(approx_eq(skill_value(31, 4000.0, &weights).unwrap_or_default(), 30.0));
        assert_eq!(skill_value(28, 1500.0, &weights), Some(0.0));
        assert_eq!(skill_value(1, 10.0, &weights), None);
    }

    #[test]
    fn evaluate_skill_combines_value_and_proc() {
        let skill = SkillRecord {
            ability_type: 27,
            ability_value: 3500.0,
            condition_1: Some("distance_type==3&phase==2".to_string()),
            rarity: 2,
            ..SkillRecord::default()
        };
        let stats = AccumulatedStats {
            wit: 400.0,
            ..AccumulatedStats::default()
        };
        let evaluation =
            evaluate_skill(&skill, &stats, &medium_pace(), &StatWeights::default());
        assert_eq!(evaluation.proc_chance, 1.0);
        assert!(approx_eq(evaluation.expected_value().unwrap_or_default(), 52.5));
    }
}
