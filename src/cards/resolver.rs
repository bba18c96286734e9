//! Resolves a raw card record at a limit-break level into a [ResolvedCard].

use serde::Serialize;
use serde_json::Value;

use crate::cards::bonus::{BonusKind, BonusTable};
use crate::cards::category::CardCategory;
use crate::cards::events::{best_event_rewards, StatBundle};
use crate::data::card::{CardRecord, EffectEntry, HintEntry, MAX_LIMIT_BREAK};
use crate::data::dataset::CardDataset;
use crate::error::DeckError;
use crate::sim::{bond_turns, training_turns};

/// Dataset sentinel for "no value at this level".
const UNSET_MAGNITUDE: f64 = -1.0;

/// Options when resolving a card.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveOptions {
    /// Stack unlocked unique effects onto the base table. Off by default because
    /// most exports already fold unique effects into `effects`.
    pub apply_unique_effects: bool,
}

/// A card at one limit-break level. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedCard {
    pub id: u32,
    pub limit_break: u8,
    pub name: String,
    pub category: CardCategory,
    pub rarity: u8,
    pub bonuses: BonusTable,
    pub event_rewards: StatBundle,
    #[serde(skip)]
    pub hints: Vec<HintEntry>,
    /// Turns to max bond for the base turn budget.
    pub turns_to_max_bond: u32,
    /// Training turns left once bonded, for the base turn budget.
    pub max_friendship_turns: i64,
}

impl ResolvedCard {
    pub fn bonus(&self, kind: BonusKind) -> f64 {
        self.bonuses.value_or_zero(kind)
    }

    /// Bond gauge the card starts with from its bonus and events.
    pub fn initial_bond(&self) -> f64 {
        self.bonus(BonusKind::InitialFriendshipGauge) + self.event_rewards.bond
    }

    pub fn rarity_label(&self) -> &'static str {
        rarity_label(self.rarity)
    }
}

pub fn rarity_label(rarity: u8) -> &'static str {
    match rarity {
        1 => "R",
        2 => "SR",
        3 => "SSR",
        _ => "Unknown",
    }
}

pub fn resolve(
    card_id: u32,
    limit_break: u8,
    dataset: &CardDataset,
) -> Result<ResolvedCard, DeckError> {
    resolve_with_options(card_id, limit_break, dataset, ResolveOptions::default())
}

pub fn resolve_with_options(
    card_id: u32,
    limit_break: u8,
    dataset: &CardDataset,
    options: ResolveOptions,
) -> Result<ResolvedCard, DeckError> {
    let record = dataset
        .get(card_id)
        .ok_or(DeckError::CardNotFound { card_id })?;
    resolve_record(record, limit_break, options)
}

pub fn resolve_record(
    record: &CardRecord,
    limit_break: u8,
    options: ResolveOptions,
) -> Result<ResolvedCard, DeckError> {
    if limit_break > MAX_LIMIT_BREAK {
        return Err(DeckError::InvalidLimitBreak {
            card_id: record.id,
            level: limit_break,
        });
    }

    let mut bonuses = BonusTable::default();
    for effect in &record.effects {
        match BonusKind::from_name(&effect.type_name) {
            Some(kind) => bonuses.set(kind, magnitude_at(effect, limit_break)),
            None => log::debug!(
                "card {}: ignoring unknown effect '{}'",
                record.id,
                effect.type_name
            ),
        }
    }

    if options.apply_unique_effects {
        for unique in &record.unique_effects {
            if limit_break < unique.level_unlocked.as_level() {
                continue;
            }
            for effect in &unique.effects {
                if let Some(kind) = BonusKind::from_name(&effect.type_name) {
                    bonuses.stack(kind, effect.value);
                }
            }
        }
    }

    let event_rewards = best_event_rewards(&record.all_events);
    let initial_bond =
        bonuses.value_or_zero(BonusKind::InitialFriendshipGauge) + event_rewards.bond;
    let turns_to_max_bond = bond_turns(initial_bond);
    let max_friendship_turns = training_turns(0) as i64 - turns_to_max_bond as i64;

    Ok(ResolvedCard {
        id: record.id,
        limit_break,
        name: record.display_name().to_string(),
        category: CardCategory::from_preferred_type(record.prefered_type.as_deref()),
        rarity: record.rarity,
        bonuses,
        event_rewards,
        hints: record.all_hints().cloned().collect(),
        turns_to_max_bond,
        max_friendship_turns,
    })
}

/// Magnitude at `level`, falling back to the max-limit-break value when the
/// level's field is absent or non-numeric. The dataset's -1 sentinel is unset.
fn magnitude_at(effect: &EffectEntry, level: u8) -> Option<f64> {
    let exact = effect.raw_at(level).and_then(Value::as_f64);
    let value = match exact {
        Some(value) => value,
        None => effect.raw_at(MAX_LIMIT_BREAK).and_then(Value::as_f64)?,
    };
    if value == UNSET_MAGNITUDE {
        None
    } else {
        Some(value)
    }
}
