//! Training-turn allocation across the five facilities.

use serde::Serialize;

use crate::cards::{BonusKind, ResolvedCard, FACILITY_COUNT};
use crate::error::DeckError;

const BASE_SHARE: f64 = 0.2;
/// No facility may take more than this share of the turns.
pub const MAX_FACILITY_SHARE: f64 = 0.5;

/// Normalized share of turns per facility (Speed, Stamina, Power, Guts, Wit).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrainingDistribution([f64; FACILITY_COUNT]);

impl Default for TrainingDistribution {
    fn default() -> Self {
        Self([BASE_SHARE; FACILITY_COUNT])
    }
}

impl TrainingDistribution {
    /// Derives the distribution from card categories and specialty priority.
    pub fn from_cards<'a>(cards: impl IntoIterator<Item = &'a ResolvedCard>) -> Self {
        let mut weights = [BASE_SHARE; FACILITY_COUNT];
        for card in cards {
            if let Some(index) = card.category.facility_index() {
                weights[index] += card.bonuses.fraction(BonusKind::SpecialtyPriority);
            }
        }
        Self::from_weights(weights)
    }

    /// Normalizes and caps arbitrary non-negative weights.
    pub fn from_weights(weights: [f64; FACILITY_COUNT]) -> Self {
        let mut shares = normalize(weights);
        cap_largest(&mut shares);
        Self(shares)
    }

    /// Validates a user-supplied distribution before normalizing it.
    pub fn manual(weights: [f64; FACILITY_COUNT]) -> Result<Self, DeckError> {
        if let Some(bad) = weights.iter().find(|value| !value.is_finite() || **value < 0.0) {
            return Err(DeckError::InvalidDistribution(format!(
                "share {bad} must be finite and non-negative"
            )));
        }
        Ok(Self::from_weights(weights))
    }

    pub fn shares(&self) -> [f64; FACILITY_COUNT] {
        self.0
    }

    pub fn share(&self, facility: usize) -> f64 {
        self.0[facility]
    }
}

fn normalize(weights: [f64; FACILITY_COUNT]) -> [f64; FACILITY_COUNT] {
    let total: f64 = weights.iter().sum();
    if total > 0.0 && total.is_finite() {
        weights.map(|weight| weight / total)
    } else {
        [BASE_SHARE; FACILITY_COUNT]
    }
}

/// Caps the largest share and hands the excess to the others in proportion
/// to their share, or evenly when they are all zero.
fn cap_largest(shares: &mut [f64; FACILITY_COUNT]) {
    let Some((max_index, max_value)) = shares
        .iter()
        .copied()
        .enumerate()
        .max_by(|left, right| left.1.total_cmp(&right.1))
    else {
        return;
    };
    if max_value <= MAX_FACILITY_SHARE {
        return;
    }

    let excess = max_value - MAX_FACILITY_SHARE;
    shares[max_index] = MAX_FACILITY_SHARE;
    let remaining: f64 = shares
        .iter()
        .enumerate()
        .filter(|(index, _)| *index != max_index)
        .map(|(_, share)| share)
        .sum();

    for (index, share) in shares.iter_mut().enumerate() {
        if index == max_index {
            continue;
        }
        if remaining > 0.0 {
            *share += excess * (*share / remaining);
        } else {
            *share += excess / (FACILITY_COUNT - 1) as f64;
        }
    }
}
