//! Weighted scoring of simulated stats, with threshold penalties.

use serde::{Deserialize, Serialize};

use crate::sim::AccumulatedStats;
use crate::skills::evaluator::DISTANCE_LABELS;
use crate::skills::{HintSummary, RaceContext, StatWeights};

/// Score weights for one distance, or the average over several.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreWeights {
    pub stats: StatWeights,
    pub skill_points: f64,
    pub hints: f64,
    pub gold_skills: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            stats: StatWeights::default(),
            skill_points: 0.2,
            hints: 4.0,
            gold_skills: 1.0,
        }
    }
}

const fn distance_weights(
    speed: f64,
    stamina: f64,
    power: f64,
    guts: f64,
    wit: f64,
) -> ScoreWeights {
    ScoreWeights {
        stats: StatWeights {
            speed,
            stamina,
            power,
            guts,
            wit,
        },
        skill_points: 0.4,
        // one hint is worth roughly six speed and two power
        hints: 7.5,
        gold_skills: 1.0,
    }
}

/// Sprint, Mile, Medium, Long.
pub const DISTANCE_WEIGHTS: [ScoreWeights; 4] = [
    distance_weights(1.75, 0.25, 1.75, 0.25, 1.0),
    distance_weights(1.5, 0.75, 1.25, 0.5, 1.0),
    distance_weights(1.5, 1.0, 1.0, 0.75, 0.75),
    distance_weights(1.0, 1.5, 0.5, 1.25, 0.75),
];

impl ScoreWeights {
    /// Average of the active distances' weights; defaults when none is active.
    pub fn for_context(context: &RaceContext) -> Self {
        let active: Vec<&ScoreWeights> = DISTANCE_WEIGHTS
            .iter()
            .zip(context.distances)
            .filter_map(|(weights, active)| active.then_some(weights))
            .collect();
        if active.is_empty() {
            return Self::default();
        }

        let count = active.len() as f64;
        let mean = |select: fn(&ScoreWeights) -> f64| {
            active.iter().map(|weights| select(weights)).sum::<f64>() / count
        };
        Self {
            stats: StatWeights {
                speed: mean(|w| w.stats.speed),
                stamina: mean(|w| w.stats.stamina),
                power: mean(|w| w.stats.power),
                guts: mean(|w| w.stats.guts),
                wit: mean(|w| w.stats.wit),
            },
            skill_points: mean(|w| w.skill_points),
            hints: mean(|w| w.hints),
            gold_skills: mean(|w| w.gold_skills),
        }
    }

    /// Speed..Wit then Skill Points.
    fn stat_array(&self) -> [f64; 6] {
        [
            self.stats.speed,
            self.stats.stamina,
            self.stats.power,
            self.stats.guts,
            self.stats.wit,
            self.skill_points,
        ]
    }
}

/// Thresholds and rates for score penalties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PenaltyConfig {
    pub enabled: bool,
    /// Minimum stamina per distance, Sprint..Long.
    pub stamina_thresholds: [f64; 4],
    /// Minimum speed per distance, Sprint..Long.
    pub speed_thresholds: [f64; 4],
    /// Falling more than this below a threshold is a major shortfall.
    pub threshold_buffer: f64,
    pub major_penalty: f64,
    pub minor_penalty: f64,
    pub hints_major_rate: f64,
    pub hints_minor_rate: f64,
    pub overbuilt_threshold: f64,
    pub overbuilt_base: f64,
    pub overbuilt_increment: f64,
    pub overbuilt_step: f64,
    pub overbuilt_max: f64,
}

impl Default for PenaltyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            stamina_thresholds: [200.0, 300.0, 400.0, 500.0],
            speed_thresholds: [900.0, 800.0, 700.0, 600.0],
            threshold_buffer: 100.0,
            major_penalty: 0.2,
            minor_penalty: 0.1,
            hints_major_rate: 0.25,
            hints_minor_rate: 0.5,
            overbuilt_threshold: 1200.0,
            overbuilt_base: 0.01,
            overbuilt_increment: 0.01,
            overbuilt_step: 10.0,
            overbuilt_max: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PenaltyKind {
    Stamina,
    Speed,
    UsefulHints,
    StatOverbuilt,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Penalty {
    pub kind: PenaltyKind,
    pub fraction: f64,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatContribution {
    pub stat: &'static str,
    pub value: f64,
    pub weight: f64,
    pub contribution: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub total: f64,
    pub base: f64,
    pub penalties: Vec<Penalty>,
    pub contributions: Vec<StatContribution>,
    pub active_distances: Vec<&'static str>,
    pub stamina_threshold: Option<f64>,
    pub speed_threshold: Option<f64>,
}

impl ScoreBreakdown {
    pub fn penalty_fraction(&self) -> f64 {
        self.penalties.iter().map(|penalty| penalty.fraction).sum()
    }
}

const STAT_LABELS: [&str; 6] = ["Speed", "Stamina", "Power", "Guts", "Wit", "Skill Points"];

/// Scores `delta` (stats gained over an empty deck) and applies penalties
/// judged on `raw` (the deck's absolute stats).
pub fn score_breakdown(
    raw: &AccumulatedStats,
    delta: &AccumulatedStats,
    hints: &HintSummary,
    weights: &ScoreWeights,
    context: &RaceContext,
    config: &PenaltyConfig,
) -> ScoreBreakdown {
    let mut contributions: Vec<StatContribution> = STAT_LABELS
        .into_iter()
        .zip(delta.to_array())
        .zip(weights.stat_array())
        .map(|((stat, value), weight)| StatContribution {
            stat,
            value,
            weight,
            contribution: value * weight,
        })
        .collect();
    contributions.push(StatContribution {
        stat: "Hints",
        value: hints.total_hints,
        weight: weights.hints,
        contribution: hints.total_hints * weights.hints,
    });
    contributions.push(StatContribution {
        stat: "Gold Skills",
        value: hints.gold_skill_value,
        weight: weights.gold_skills,
        contribution: hints.gold_skill_value * weights.gold_skills,
    });
    let base: f64 = contributions.iter().map(|entry| entry.contribution).sum();

    let active_distances: Vec<&'static str> = DISTANCE_LABELS
        .iter()
        .zip(context.distances)
        .filter_map(|(label, active)| active.then_some(*label))
        .collect();

    let mut breakdown = ScoreBreakdown {
        total: base,
        base,
        penalties: Vec::new(),
        contributions,
        active_distances,
        stamina_threshold: None,
        speed_threshold: None,
    };
    if !config.enabled {
        return breakdown;
    }

    if !breakdown.active_distances.is_empty() {
        let stamina_threshold = max_active(&config.stamina_thresholds, context);
        let speed_threshold = max_active(&config.speed_thresholds, context);
        breakdown.stamina_threshold = Some(stamina_threshold);
        breakdown.speed_threshold = Some(speed_threshold);
        let distances = breakdown.active_distances.join(", ");
        for (kind, label, value, threshold) in [
            (PenaltyKind::Stamina, "Stamina", raw.stamina, stamina_threshold),
            (PenaltyKind::Speed, "Speed", raw.speed, speed_threshold),
        ] {
            if let Some(penalty) = shortfall_penalty(kind, label, value, threshold, &distances, config)
            {
                breakdown.penalties.push(penalty);
            }
        }
    }

    let rate = hints.useful_hints_rate;
    let hint_fraction = if rate < config.hints_major_rate {
        config.major_penalty
    } else if rate < config.hints_minor_rate {
        config.minor_penalty
    } else {
        0.0
    };
    if hint_fraction > 0.0 {
        breakdown.penalties.push(Penalty {
            kind: PenaltyKind::UsefulHints,
            fraction: hint_fraction,
            reason: format!(
                "{}% penalty: useful hints rate {:.0}% is low",
                percent(hint_fraction),
                rate * 100.0
            ),
        });
    }

    if let Some(penalty) = overbuilt_penalty(raw, config) {
        breakdown.penalties.push(penalty);
    }

    breakdown.total = base * (1.0 - breakdown.penalty_fraction());
    breakdown
}

pub fn score(
    raw: &AccumulatedStats,
    delta: &AccumulatedStats,
    hints: &HintSummary,
    weights: &ScoreWeights,
    context: &RaceContext,
    config: &PenaltyConfig,
) -> f64 {
    score_breakdown(raw, delta, hints, weights, context, config).total
}

fn max_active(thresholds: &[f64; 4], context: &RaceContext) -> f64 {
    thresholds
        .iter()
        .zip(context.distances)
        .filter_map(|(threshold, active)| active.then_some(*threshold))
        .fold(f64::MIN, f64::max)
}

fn shortfall_penalty(
    kind: PenaltyKind,
    label: &str,
    value: f64,
    threshold: f64,
    distances: &str,
    config: &PenaltyConfig,
) -> Option<Penalty> {
    let (fraction, severity) = if value < threshold - config.threshold_buffer {
        (config.major_penalty, "significantly below")
    } else if value < threshold {
        (config.minor_penalty, "below")
    } else {
        return None;
    };
    Some(Penalty {
        kind,
        fraction,
        reason: format!(
            "{}% penalty: {label} {:.0} is {severity} threshold {threshold} for {distances}",
            percent(fraction),
            value
        ),
    })
}

/// Worst single-stat overbuild across the five stats and skill points.
fn overbuilt_penalty(raw: &AccumulatedStats, config: &PenaltyConfig) -> Option<Penalty> {
    let step = if config.overbuilt_step > 0.0 {
        config.overbuilt_step
    } else {
        1.0
    };
    let values = raw.to_array();
    let mut worst: Option<(usize, f64)> = None;
    for (index, value) in values.into_iter().enumerate() {
        if value <= config.overbuilt_threshold {
            continue;
        }
        let increments = ((value - config.overbuilt_threshold) / step).floor();
        let fraction =
            (config.overbuilt_base + increments * config.overbuilt_increment).min(config.overbuilt_max);
        if worst.map_or(true, |(_, current)| fraction > current) {
            worst = Some((index, fraction));
        }
    }
    let (index, fraction) = worst?;
    Some(Penalty {
        kind: PenaltyKind::StatOverbuilt,
        fraction,
        reason: format!(
            "{}% penalty: {} {:.0} exceeds {}",
            percent(fraction),
            STAT_LABELS[index],
            values[index],
            config.overbuilt_threshold
        ),
    })
}

fn percent(fraction: f64) -> i64 {
    (fraction * 100.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(distances: [bool; 4]) -> RaceContext {
        RaceContext::new(distances, [false, true, false, false])
    }

    fn stats(speed: f64, stamina: f64) -> AccumulatedStats {
        AccumulatedStats {
            speed,
            stamina,
            ..AccumulatedStats::default()
        }
    }

    fn useful_hints() -> HintSummary {
        HintSummary {
            useful_hints_rate: 1.0,
            ..HintSummary::default()
        }
    }

    #[test]
    fn no_active_distance_uses_defaults() {
        let weights = ScoreWeights::for_context(&context([false; 4]));
        assert_eq!(weights, ScoreWeights::default());
    }

    #[test]
    fn multiple_distances_average_weights() {
        let weights = ScoreWeights::for_context(&context([true, false, false, true]));
        assert!((weights.stats.speed - 1.375).abs() < 1e-12);
        assert!((weights.stats.stamina - 0.875).abs() < 1e-12);
        assert!((weights.skill_points - 0.4).abs() < 1e-12);
        assert!((weights.hints - 7.5).abs() < 1e-12);
    }

    #[test]
    fn weighting_changes_score_not_stats() {
        let raw = stats(1000.0, 600.0);
        let delta = stats(100.0, 20.0);
        let medium = context([false, false, true, false]);
        let sprint = context([true, false, false, false]);
        let config = PenaltyConfig::default();
        let medium_score = score(
            &raw,
            &delta,
            &useful_hints(),
            &ScoreWeights::for_context(&medium),
            &medium,
            &config,
        );
        let sprint_score = score(
            &raw,
            &delta,
            &useful_hints(),
            &ScoreWeights::for_context(&sprint),
            &sprint,
            &config,
        );
        assert!((medium_score - (150.0 + 20.0)).abs() < 1e-9);
        assert!((sprint_score - (175.0 + 5.0)).abs() < 1e-9);
    }

    #[test]
    fn stamina_shortfall_is_major_below_buffer() {
        let medium = context([false, false, true, false]);
        let breakdown = score_breakdown(
            &stats(800.0, 250.0),
            &stats(100.0, 0.0),
            &useful_hints(),
            &ScoreWeights::for_context(&medium),
            &medium,
            &PenaltyConfig::default(),
        );
        assert_eq!(breakdown.stamina_threshold, Some(400.0));
        assert_eq!(breakdown.penalties.len(), 1);
        assert_eq!(breakdown.penalties[0].kind, PenaltyKind::Stamina);
        assert!((breakdown.total - 150.0 * 0.8).abs() < 1e-9);
    }

    #[test]
    fn penalties_add_up() {
        let long = context([false, false, false, true]);
        let hints = HintSummary {
            useful_hints_rate: 0.3,
            ..HintSummary::default()
        };
        // stamina 450 < 500 minor, speed 450 < 500 major, hints 0.3 minor,
        // power 1235 overbuilt by 3 steps
        let raw = AccumulatedStats {
            speed: 450.0,
            stamina: 450.0,
            power: 1235.0,
            ..AccumulatedStats::default()
        };
        let breakdown = score_breakdown(
            &raw,
            &stats(100.0, 0.0),
            &hints,
            &ScoreWeights::for_context(&long),
            &long,
            &PenaltyConfig::default(),
        );
        assert!((breakdown.penalty_fraction() - (0.1 + 0.2 + 0.1 + 0.04)).abs() < 1e-12);
        assert!((breakdown.total - 100.0 * (1.0 - 0.44)).abs() < 1e-9);
    }

    #[test]
    fn overbuilt_penalty_is_capped() {
        let raw = AccumulatedStats {
            wit: 2000.0,
            skill_points: 5000.0,
            ..AccumulatedStats::default()
        };
        let penalty = overbuilt_penalty(&raw, &PenaltyConfig::default()).expect("overbuilt");
        assert_eq!(penalty.fraction, 0.5);
        // ties keep the first stat
        assert!(penalty.reason.contains("Wit"));
        assert!(overbuilt_penalty(&stats(1200.0, 0.0), &PenaltyConfig::default()).is_none());
    }

    #[test]
    fn skill_points_can_be_overbuilt() {
        let raw = AccumulatedStats {
            skill_points: 2000.0,
            ..AccumulatedStats::default()
        };
        let penalty = overbuilt_penalty(&raw, &PenaltyConfig::default()).expect("overbuilt");
        assert_eq!(penalty.fraction, 0.5);
        assert!(penalty.reason.contains("Skill Points 2000"));

        let slightly = AccumulatedStats {
            speed: 1215.0,
            skill_points: 1225.0,
            ..AccumulatedStats::default()
        };
        let penalty = overbuilt_penalty(&slightly, &PenaltyConfig::default()).expect("overbuilt");
        assert!((penalty.fraction - 0.03).abs() < 1e-12);
        assert!(penalty.reason.contains("Skill Points"));
    }

    #[test]
    fn disabled_penalties_leave_base_score() {
        let config = PenaltyConfig {
            enabled: false,
            ..PenaltyConfig::default()
        };
        let breakdown = score_breakdown(
            &stats(0.0, 0.0),
            &stats(10.0, 10.0),
            &HintSummary::default(),
            &ScoreWeights::default(),
            &context([true; 4]),
            &config,
        );
        assert!(breakdown.penalties.is_empty());
        assert_eq!(breakdown.total, breakdown.base);
        assert!((breakdown.base - 20.0).abs() < 1e-12);
    }
}
