pub mod export;
pub mod ranking;
pub mod scoring;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::cards::resolver::{rarity_label, resolve_record};
use crate::cards::{ResolveOptions, ResolvedCard};
use crate::data::card::{CardRecord, MAX_LIMIT_BREAK};
use crate::data::dataset::CardDataset;
use crate::data::scenario::ScenarioTable;
use crate::deck::Deck;
use crate::error::DeckError;
use crate::optimizer::ranking::{
    group_entries, DeckCardSummary, DeckSummary, SkippedCandidate, Tierlist, TierlistEntry,
};
use crate::optimizer::scoring::{score_breakdown, PenaltyConfig, ScoreWeights};
use crate::parallel::map_in_batches;
use crate::sim::{simulate, AccumulatedStats, SimulationParams};
use crate::skills::{card_hint_summary, deck_hint_summary, hint_types, RaceContext};

/// Number of progress-reporting batches for rank-with-progress.
const RANK_PROGRESS_BATCH_COUNT: usize = 40;

/// Limit-break levels to rank per rarity. Unknown rarities are never ranked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitBreakFilter {
    #[serde(rename = "R", default = "default_levels")]
    pub r: Vec<u8>,
    #[serde(rename = "SR", default = "default_levels")]
    pub sr: Vec<u8>,
    #[serde(rename = "SSR", default = "default_levels")]
    pub ssr: Vec<u8>,
}

fn default_levels() -> Vec<u8> {
    vec![0, MAX_LIMIT_BREAK]
}

impl Default for LimitBreakFilter {
    fn default() -> Self {
        Self {
            r: default_levels(),
            sr: default_levels(),
            ssr: default_levels(),
        }
    }
}

impl LimitBreakFilter {
    pub fn levels(&self, rarity: u8) -> &[u8] {
        match rarity {
            1 => &self.r,
            2 => &self.sr,
            3 => &self.ssr,
            _ => &[],
        }
    }

    pub fn allows(&self, rarity: u8, limit_break: u8) -> bool {
        self.levels(rarity).contains(&limit_break)
    }
}

/// Execution controls for a ranking run.
#[derive(Debug, Clone)]
pub struct RankingOptions {
    pub parallel: bool,
    pub deadline: Option<Instant>,
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for RankingOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            deadline: None,
            cancel: None,
        }
    }
}

impl RankingOptions {
    fn should_stop(&self) -> bool {
        let cancelled = self
            .cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed));
        let expired = self.deadline.is_some_and(|deadline| Instant::now() >= deadline);
        cancelled || expired
    }
}

#[derive(Debug, Clone)]
pub struct RankingRequest {
    pub context: RaceContext,
    pub limit_break_filter: LimitBreakFilter,
    pub params: SimulationParams,
    pub penalties: PenaltyConfig,
    pub options: RankingOptions,
}

impl Default for RankingRequest {
    fn default() -> Self {
        Self {
            // Medium distance, Pace Chaser
            context: RaceContext::new([false, false, true, false], [false, true, false, false]),
            limit_break_filter: LimitBreakFilter::default(),
            params: SimulationParams::default(),
            penalties: PenaltyConfig::default(),
            options: RankingOptions::default(),
        }
    }
}

/// Everything a candidate is scored against, computed once per ranking.
struct Baseline<'a> {
    deck: &'a Deck,
    scenarios: &'a ScenarioTable,
    request: &'a RankingRequest,
    weights: ScoreWeights,
    empty_stats: AccumulatedStats,
    stats: AccumulatedStats,
    score: f64,
}

enum CandidateOutcome {
    Ranked(TierlistEntry),
    Skipped(SkippedCandidate),
    NotEvaluated,
}

pub fn rank(
    deck: &Deck,
    dataset: &CardDataset,
    scenarios: &ScenarioTable,
    request: &RankingRequest,
) -> Result<Tierlist, DeckError> {
    rank_with_progress(deck, dataset, scenarios, request, |_, _| {})
}

/// Like [rank] but evaluates in batches and invokes `on_progress(done, total)`
/// over the candidate list.
pub fn rank_with_progress<F>(
    deck: &Deck,
    dataset: &CardDataset,
    scenarios: &ScenarioTable,
    request: &RankingRequest,
    on_progress: F,
) -> Result<Tierlist, DeckError>
where
    F: FnMut(u32, u32),
{
    let params = &request.params;
    let context = &request.context;
    let weights = ScoreWeights::for_context(context);

    let stats = simulate(deck, scenarios, params)?;
    let empty_stats = simulate(&deck.emptied(), scenarios, params)?;
    let delta = stats.delta(&empty_stats);
    let hints = deck_hint_summary(
        deck.cards(),
        &stats,
        context,
        &weights.stats,
        params.optional_races,
    );
    let breakdown = score_breakdown(&stats, &delta, &hints, &weights, context, &request.penalties);

    let baseline = Baseline {
        deck,
        scenarios,
        request,
        weights,
        empty_stats,
        stats,
        score: breakdown.total,
    };

    let candidates: Vec<(&CardRecord, u8)> = dataset
        .unique_records()
        .flat_map(|record| {
            (0..=MAX_LIMIT_BREAK)
                .filter(|level| request.limit_break_filter.allows(record.rarity, *level))
                .map(move |level| (record, level))
        })
        .collect();
    log::debug!(
        "ranking {} candidates against a {}-card deck",
        candidates.len(),
        deck.len()
    );

    let outcomes = map_in_batches(
        &candidates[..],
        RANK_PROGRESS_BATCH_COUNT.min(candidates.len()),
        request.options.parallel,
        |(record, level)| evaluate_candidate(&baseline, record, *level),
        on_progress,
    );

    let mut entries = Vec::with_capacity(outcomes.len());
    let mut skipped = Vec::new();
    let mut truncated = false;
    for outcome in outcomes {
        match outcome {
            CandidateOutcome::Ranked(entry) => entries.push(entry),
            CandidateOutcome::Skipped(candidate) => skipped.push(candidate),
            CandidateOutcome::NotEvaluated => truncated = true,
        }
    }
    if truncated {
        log::warn!(
            "ranking stopped early after {} of {} candidates",
            entries.len() + skipped.len(),
            candidates.len()
        );
    }

    Ok(Tierlist {
        groups: group_entries(entries),
        deck: DeckSummary {
            cards: deck
                .cards()
                .iter()
                .map(|card| deck_card_summary(card, &baseline))
                .collect(),
            stats: delta,
            hints,
            score: breakdown.total,
            breakdown,
        },
        skipped,
        rejected: dataset.rejected().to_vec(),
        truncated,
    })
}

fn deck_card_summary(card: &ResolvedCard, baseline: &Baseline<'_>) -> DeckCardSummary {
    DeckCardSummary {
        id: card.id,
        card_name: card.name.clone(),
        card_rarity: card.rarity_label(),
        limit_break: card.limit_break,
        card_type: card.category,
        hints: card_hint_summary(
            card,
            &baseline.stats,
            &baseline.request.context,
            &baseline.weights.stats,
            baseline.request.params.optional_races,
        ),
    }
}

fn evaluate_candidate(baseline: &Baseline<'_>, record: &CardRecord, level: u8) -> CandidateOutcome {
    if baseline.request.options.should_stop() {
        return CandidateOutcome::NotEvaluated;
    }
    match score_candidate(baseline, record, level) {
        Ok(entry) => CandidateOutcome::Ranked(entry),
        Err(reason) => {
            log::warn!("skipping card {} at {}lb: {reason}", record.id, level);
            CandidateOutcome::Skipped(SkippedCandidate {
                id: record.id,
                limit_break: level,
                reason,
            })
        }
    }
}

fn score_candidate(
    baseline: &Baseline<'_>,
    record: &CardRecord,
    level: u8,
) -> Result<TierlistEntry, String> {
    let request = baseline.request;
    let context = &request.context;
    let params = &request.params;
    let weights = &baseline.weights;

    let card = resolve_record(record, level, ResolveOptions::default())
        .map_err(|err| err.to_string())?;
    let hint_types = hint_types(&card);
    let deck = baseline.deck.with_card(card);

    let stats = simulate(&deck, baseline.scenarios, params).map_err(|err| err.to_string())?;
    let delta = stats.delta(&baseline.empty_stats);
    let deck_hints = deck_hint_summary(
        deck.cards(),
        &stats,
        context,
        &weights.stats,
        params.optional_races,
    );
    let new_score = score_breakdown(&stats, &delta, &deck_hints, weights, context, &request.penalties)
        .total;
    let score = new_score - baseline.score;
    if !score.is_finite() {
        return Err(format!("non-finite score {score}"));
    }

    let Some(card) = deck.cards().last() else {
        return Err("candidate missing from deck".to_string());
    };
    let card_hints = card_hint_summary(
        card,
        &stats,
        context,
        &weights.stats,
        params.optional_races,
    );

    Ok(TierlistEntry {
        id: card.id,
        card_name: card.name.clone(),
        card_rarity: rarity_label(card.rarity),
        limit_break: level,
        card_type: card.category,
        hints: card_hints,
        hint_types,
        stats: delta,
        stats_diff_only_added_to_deck: stats.delta(&baseline.stats),
        score,
    })
}
