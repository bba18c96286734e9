//! Per-card and deck-level hint statistics.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::cards::{BonusKind, ResolvedCard};
use crate::sim::{training_turns, AccumulatedStats};
use crate::skills::condition::Condition;
use crate::skills::evaluator::{
    evaluate_skill, RaceContext, StatWeights, DISTANCE_LABELS, RUNNING_STYLE_LABELS,
};

/// Chance per training turn that a card offers a hint, before bonuses.
const BASE_HINT_RATE: f64 = 0.075;

pub const GENERAL_HINT_LABEL: &str = "General";

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct HintSummary {
    pub hint_frequency: f64,
    pub hints_from_events: f64,
    pub useful_hints_rate: f64,
    pub hints_from_training: f64,
    pub total_hints: f64,
    /// Expected value of gold skill hints (value times proc chance).
    pub gold_skill_value: f64,
}

#[derive(Debug, Clone, Copy, Default)]
struct HintTriggers {
    running_style: i64,
    distance_type: i64,
}

fn triggers(condition: &str) -> HintTriggers {
    match Condition::parse(condition) {
        Ok(parsed) => HintTriggers {
            running_style: parsed.trigger_value("running_style"),
            distance_type: parsed.trigger_value("distance_type"),
        },
        Err(err) => {
            log::warn!("{err}; hint treated as general");
            HintTriggers::default()
        }
    }
}

/// A hint is useful unless it targets a distance or running style that is off.
fn is_useful(triggers: HintTriggers, context: &RaceContext) -> bool {
    let distance_ok =
        triggers.distance_type == 0 || context.distance(triggers.distance_type) != Some(false);
    let style_ok = triggers.running_style == 0
        || context.running_style(triggers.running_style) != Some(false);
    distance_ok && style_ok
}

pub fn card_hint_summary(
    card: &ResolvedCard,
    deck_stats: &AccumulatedStats,
    context: &RaceContext,
    weights: &StatWeights,
    optional_races: u32,
) -> HintSummary {
    let hint_frequency = BASE_HINT_RATE * (card.bonus(BonusKind::HintFrequency) + 100.0) / 100.0;
    let hint_levels = card.bonus(BonusKind::HintLevels).max(1.0);
    let hints_from_events = card.event_rewards.skill_hints;

    let mut useful = 0usize;
    let mut gold_skill_value = 0.0;
    for hint in &card.hints {
        let skill = &hint.skill_data;
        if is_useful(triggers(skill.condition()), context) {
            useful += 1;
        }
        if skill.is_gold() {
            if let Some(expected) = evaluate_skill(skill, deck_stats, context, weights).expected_value()
            {
                gold_skill_value += expected;
            }
        }
    }

    let useful_hints_rate = if card.hints.is_empty() {
        0.0
    } else {
        useful as f64 / card.hints.len() as f64
    };
    let hints_from_training =
        training_turns(optional_races) * hint_frequency * hint_levels * useful_hints_rate;

    HintSummary {
        hint_frequency,
        hints_from_events,
        useful_hints_rate,
        hints_from_training,
        total_hints: hints_from_events + hints_from_training,
        gold_skill_value,
    }
}

/// Sums per-card summaries; frequency and useful rate are averaged over the cards.
pub fn deck_hint_summary(
    cards: &[ResolvedCard],
    deck_stats: &AccumulatedStats,
    context: &RaceContext,
    weights: &StatWeights,
    optional_races: u32,
) -> HintSummary {
    let mut total = HintSummary::default();
    for card in cards {
        let summary = card_hint_summary(card, deck_stats, context, weights, optional_races);
        total.hint_frequency += summary.hint_frequency;
        total.hints_from_events += summary.hints_from_events;
        total.useful_hints_rate += summary.useful_hints_rate;
        total.hints_from_training += summary.hints_from_training;
        total.total_hints += summary.total_hints;
        total.gold_skill_value += summary.gold_skill_value;
    }
    if !cards.is_empty() {
        total.hint_frequency /= cards.len() as f64;
        total.useful_hints_rate /= cards.len() as f64;
    }
    total
}

/// Labels of the distances and running styles a card's hints target.
pub fn hint_types(card: &ResolvedCard) -> Vec<String> {
    let mut labels = BTreeSet::new();
    for hint in &card.hints {
        let triggers = triggers(hint.skill_data.condition());
        let style = label(&RUNNING_STYLE_LABELS, triggers.running_style);
        let distance = label(&DISTANCE_LABELS, triggers.distance_type);
        labels.extend(style);
        labels.extend(distance);
        if triggers.running_style == 0 && triggers.distance_type == 0 {
            labels.insert(GENERAL_HINT_LABEL);
        }
    }
    labels.into_iter().map(str::to_string).collect()
}

fn label(labels: &[&'static str; 4], one_based: i64) -> Option<&'static str> {
    usize::try_from(one_based - 1)
        .ok()
        .and_then(|index| labels.get(index).copied())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::resolver::resolve_record;
    use crate::cards::ResolveOptions;
    use crate::data::card::CardRecord;
    use serde_json::json;

    fn card_with_hints() -> ResolvedCard {
        let record: CardRecord = serde_json::from_value(json!({
            "id": 30010,
            "rarity": 3,
            "prefered_type": "Wit",
            "effects": [
                {"type_name": "Hint Frequency", "mlb": 40},
                {"type_name": "Hint Levels", "mlb": 2}
            ],
            "hints_table": [
                {"skill_id": 1, "skill_data": {"condition_1": "distance_type==4", "rarity": 1}},
                {"skill_id": 2, "skill_data": {"condition_1": "running_style==2&phase==1", "rarity": 1}},
                {"skill_id": 3, "skill_data": {"condition_1": "", "rarity": 2, "ability_type": 27, "ability_value": 4000}},
                {"skill_id": 4, "skill_data": {"condition_1": "distance_type==3", "rarity": 1}}
            ],
            "all_events": {"dates": [{"choices": [{"rewards": [
                {"type": "Skill Hint", "value": "+1"}, {"type": "Wit", "value": "+5"}
            ]}]}]}
        }))
        .expect("fixture");
        resolve_record(&record, 4, ResolveOptions::default()).expect("resolve")
    }

    fn medium_pace() -> RaceContext {
        RaceContext::new([false, false, true, false], [false, true, false, false])
    }

    #[test]
    fn card_summary_counts_useful_hints() {
        let summary = card_hint_summary(
            &card_with_hints(),
            &AccumulatedStats::default(),
            &medium_pace(),
            &StatWeights::default(),
            0,
        );
        assert!((summary.hint_frequency - 0.105).abs() < 1e-9);
        assert_eq!(summary.useful_hints_rate, 0.75);
        let expected_training = 67.0 * 0.105 * 2.0 * 0.75;
        assert!((summary.hints_from_training - expected_training).abs() < 1e-9);
        assert_eq!(summary.hints_from_events, 1.0);
        assert!((summary.total_hints - (expected_training + 1.0)).abs() < 1e-9);
        assert!((summary.gold_skill_value - 60.0).abs() < 1e-9);
    }

    #[test]
    fn deck_summary_averages_rates() {
        let card = card_with_hints();
        let deck = vec![card.clone(), card];
        let single = card_hint_summary(
            &deck[0],
            &AccumulatedStats::default(),
            &medium_pace(),
            &StatWeights::default(),
            2,
        );
        let summary = deck_hint_summary(
            &deck,
            &AccumulatedStats::default(),
            &medium_pace(),
            &StatWeights::default(),
            2,
        );
        assert!((summary.hint_frequency - single.hint_frequency).abs() < 1e-12);
        assert!((summary.useful_hints_rate - single.useful_hints_rate).abs() < 1e-12);
        assert!((summary.total_hints - 2.0 * single.total_hints).abs() < 1e-9);
        assert_eq!(
            deck_hint_summary(&[], &AccumulatedStats::default(), &medium_pace(), &StatWeights::default(), 0),
            HintSummary::default()
        );
    }

    #[test]
    fn hint_types_label_targets() {
        let types = hint_types(&card_with_hints());
        assert_eq!(types, vec!["General", "Long", "Medium", "Pace Chaser"]);
    }
}
