//! Expected card bonuses at a shared training facility.
//!
//! Each turn one matching card leads the training (the primary) while the
//! others join with a presence probability. Rather than sampling, every card
//! takes the primary role with weight `1/n` and the rest contribute their
//! bonus scaled by presence.

use crate::cards::{BonusKind, ResolvedCard};

/// Baseline chance that a secondary card shows up at its specialty facility.
/// Calibration constant.
pub const SECONDARY_PRESENCE_BASE: f64 = 0.2;

pub fn presence(card: &ResolvedCard) -> f64 {
    (SECONDARY_PRESENCE_BASE + card.bonuses.fraction(BonusKind::SpecialtyPriority)).min(1.0)
}

/// Expected value of `selector` over all primary assignments of `cards`.
/// Zero cards contribute nothing; a single card contributes at full strength.
pub fn expected_contribution<F>(cards: &[&ResolvedCard], selector: F) -> f64
where
    F: Fn(&ResolvedCard) -> f64,
{
    if cards.is_empty() {
        return 0.0;
    }
    let weight = 1.0 / cards.len() as f64;
    let mut total = 0.0;
    for (primary_index, primary) in cards.iter().enumerate() {
        let secondary: f64 = cards
            .iter()
            .enumerate()
            .filter(|(index, _)| *index != primary_index)
            .map(|(_, card)| selector(card) * presence(card))
            .sum();
        total += weight * (selector(primary) + secondary);
    }
    total
}

/// Expected card bonuses at one facility.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FacilityBonuses {
    pub card_count: usize,
    pub mood_effect: f64,
    pub training_effectiveness: f64,
    pub friendship: f64,
    /// Flat Speed..Wit and Skill Point bonuses.
    pub flat: [f64; 6],
    /// Turn after which training at this facility counts as bonded.
    pub average_bond_turn: f64,
}

impl FacilityBonuses {
    pub fn from_cards(cards: &[&ResolvedCard], bond_turn: impl Fn(&ResolvedCard) -> f64) -> Self {
        let mut flat = [0.0; 6];
        for (slot, kind) in flat.iter_mut().zip(BonusKind::STAT_BONUSES) {
            *slot = expected_contribution(cards, |card| card.bonus(kind));
        }
        let average_bond_turn = if cards.is_empty() {
            0.0
        } else {
            cards.iter().map(|card| bond_turn(card)).sum::<f64>() / cards.len() as f64
        };
        Self {
            card_count: cards.len(),
            mood_effect: expected_contribution(cards, |card| card.bonus(BonusKind::MoodEffect)),
            training_effectiveness: expected_contribution(cards, |card| {
                card.bonus(BonusKind::TrainingEffectiveness)
            }),
            friendship: expected_contribution(cards, |card| card.bonus(BonusKind::FriendshipBonus)),
            flat,
            average_bond_turn,
        }
    }

    pub fn has_cards(&self) -> bool {
        self.card_count > 0
    }
}
