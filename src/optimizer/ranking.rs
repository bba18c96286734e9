use std::collections::BTreeMap;

use serde::Serialize;

use crate::cards::CardCategory;
use crate::data::dataset::RejectedRecord;
use crate::optimizer::scoring::ScoreBreakdown;
use crate::sim::AccumulatedStats;
use crate::skills::HintSummary;

#[derive(Debug, Clone, Serialize)]
pub struct TierlistEntry {
    pub id: u32,
    pub card_name: String,
    pub card_rarity: &'static str,
    pub limit_break: u8,
    pub card_type: CardCategory,
    pub hints: HintSummary,
    pub hint_types: Vec<String>,
    /// Stats over an empty deck, with the candidate added to the baseline.
    pub stats: AccumulatedStats,
    /// Stats gained over the baseline deck alone.
    pub stats_diff_only_added_to_deck: AccumulatedStats,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeckCardSummary {
    pub id: u32,
    pub card_name: String,
    pub card_rarity: &'static str,
    pub limit_break: u8,
    pub card_type: CardCategory,
    pub hints: HintSummary,
}

/// The baseline deck the candidates were scored against.
#[derive(Debug, Clone, Serialize)]
pub struct DeckSummary {
    pub cards: Vec<DeckCardSummary>,
    pub stats: AccumulatedStats,
    pub hints: HintSummary,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedCandidate {
    pub id: u32,
    pub limit_break: u8,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Tierlist {
    /// Entries per card category, best first.
    pub groups: BTreeMap<String, Vec<TierlistEntry>>,
    pub deck: DeckSummary,
    pub skipped: Vec<SkippedCandidate>,
    /// Dataset entries that never became candidates.
    pub rejected: Vec<RejectedRecord>,
    /// Set when cancellation or the deadline stopped evaluation early.
    pub truncated: bool,
}

impl Tierlist {
    pub fn entry_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &TierlistEntry)> {
        self.groups
            .iter()
            .flat_map(|(group, entries)| entries.iter().map(move |entry| (group.as_str(), entry)))
    }
}

/// Groups entries by category and sorts each group by descending score.
/// The sort is stable, so ties keep their evaluation order.
pub fn group_entries(entries: Vec<TierlistEntry>) -> BTreeMap<String, Vec<TierlistEntry>> {
    let mut groups: BTreeMap<String, Vec<TierlistEntry>> = BTreeMap::new();
    for entry in entries {
        groups
            .entry(entry.card_type.as_str().to_string())
            .or_default()
            .push(entry);
    }
    for entries in groups.values_mut() {
        entries.sort_by(|left, right| right.score.total_cmp(&left.score));
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: u32, card_type: CardCategory, score: f64) -> TierlistEntry {
        TierlistEntry {
            id,
            card_name: format!("card-{id}"),
            card_rarity: "SSR",
            limit_break: 4,
            card_type,
            hints: HintSummary::default(),
            hint_types: Vec::new(),
            stats: AccumulatedStats::default(),
            stats_diff_only_added_to_deck: AccumulatedStats::default(),
            score,
        }
    }

    #[test]
    fn groups_sort_descending_and_keep_tie_order() {
        let groups = group_entries(vec![
            entry(1, CardCategory::Speed, 10.0),
            entry(2, CardCategory::Wit, 5.0),
            entry(3, CardCategory::Speed, 30.0),
            entry(4, CardCategory::Speed, 10.0),
        ]);
        let speed: Vec<u32> = groups["Speed"].iter().map(|entry| entry.id).collect();
        assert_eq!(speed, vec![3, 1, 4]);
        assert_eq!(groups["Wit"].len(), 1);
        assert!(!groups.contains_key("Power"));
    }
}
