//! A roster of resolved cards plus an optional manual training distribution.

use crate::cards::{ResolvedCard, FACILITY_COUNT};
use crate::data::ScenarioTable;
use crate::error::DeckError;
use crate::sim::TrainingDistribution;

#[derive(Debug, Clone, Default)]
pub struct Deck {
    cards: Vec<ResolvedCard>,
    manual_distribution: Option<TrainingDistribution>,
}

impl Deck {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_cards(cards: Vec<ResolvedCard>) -> Self {
        Self {
            cards,
            manual_distribution: None,
        }
    }

    pub fn add_card(&mut self, card: ResolvedCard) {
        self.cards.push(card);
    }

    /// Removes the first card with `card_id`.
    pub fn remove_card(&mut self, card_id: u32) -> Option<ResolvedCard> {
        let index = self.cards.iter().position(|card| card.id == card_id)?;
        Some(self.cards.remove(index))
    }

    pub fn set_manual_distribution(
        &mut self,
        shares: [f64; FACILITY_COUNT],
    ) -> Result<(), DeckError> {
        self.manual_distribution = Some(TrainingDistribution::manual(shares)?);
        Ok(())
    }

    pub fn clear_manual_distribution(&mut self) {
        self.manual_distribution = None;
    }

    pub fn manual_distribution(&self) -> Option<TrainingDistribution> {
        self.manual_distribution
    }

    /// Manual distribution when set, otherwise derived from the cards
    /// `scenario` allows. The simulator uses the same distribution.
    pub fn training_distribution(
        &self,
        scenarios: &ScenarioTable,
        scenario: &str,
    ) -> TrainingDistribution {
        self.manual_distribution.unwrap_or_else(|| {
            TrainingDistribution::from_cards(
                self.cards
                    .iter()
                    .filter(|card| scenarios.is_card_allowed(card.id, scenario)),
            )
        })
    }

    /// Copy of this deck with `card` appended.
    pub fn with_card(&self, card: ResolvedCard) -> Deck {
        let mut deck = self.clone();
        deck.add_card(card);
        deck
    }

    /// Empty deck that keeps this deck's manual distribution.
    pub fn emptied(&self) -> Deck {
        Deck {
            cards: Vec::new(),
            manual_distribution: self.manual_distribution,
        }
    }

    pub fn cards(&self) -> &[ResolvedCard] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{BonusKind, BonusTable, CardCategory, StatBundle};
    use crate::data::DEFAULT_SCENARIO;

    fn card(id: u32, category: CardCategory, specialty: f64) -> ResolvedCard {
        let mut bonuses = BonusTable::default();
        bonuses.set(BonusKind::SpecialtyPriority, Some(specialty));
        ResolvedCard {
            id,
            limit_break: 4,
            name: format!("card-{id}"),
            category,
            rarity: 3,
            bonuses,
            event_rewards: StatBundle::default(),
            hints: Vec::new(),
            turns_to_max_bond: 10,
            max_friendship_turns: 57,
        }
    }

    #[test]
    fn add_and_remove_first_match() {
        let mut deck = Deck::new();
        deck.add_card(card(1, CardCategory::Speed, 0.0));
        deck.add_card(card(2, CardCategory::Wit, 0.0));
        deck.add_card(card(1, CardCategory::Power, 0.0));
        let removed = deck.remove_card(1).expect("card 1 present");
        assert_eq!(removed.category, CardCategory::Speed);
        assert_eq!(deck.len(), 2);
        assert!(deck.remove_card(9).is_none());
    }

    #[test]
    fn distribution_follows_specialty_priority() {
        let mut deck = Deck::new();
        deck.add_card(card(1, CardCategory::Speed, 80.0));
        deck.add_card(card(2, CardCategory::Support, 500.0));
        let shares = deck
            .training_distribution(&ScenarioTable::builtin(), DEFAULT_SCENARIO)
            .shares();
        // weights 1.0, 0.2, 0.2, 0.2, 0.2 normalize to 0.5 for Speed
        assert!((shares[0] - 0.5).abs() < 1e-12);
        assert!((shares[1] - 0.125).abs() < 1e-12);
    }

    #[test]
    fn distribution_ignores_cards_the_scenario_excludes() {
        let scenarios = ScenarioTable::builtin();
        let mut deck = Deck::new();
        deck.add_card(card(1, CardCategory::Speed, 80.0));
        let speed_only = deck.training_distribution(&scenarios, "Unity");

        // 30021 is limited to URA
        deck.add_card(card(30021, CardCategory::Power, 500.0));
        assert_eq!(deck.training_distribution(&scenarios, "Unity"), speed_only);
        let ura = deck.training_distribution(&scenarios, DEFAULT_SCENARIO).shares();
        assert!(ura[2] > speed_only.shares()[2]);
    }

    #[test]
    fn manual_distribution_overrides_and_clears() {
        let mut deck = Deck::new();
        deck.add_card(card(1, CardCategory::Speed, 80.0));
        deck.set_manual_distribution([0.0, 1.0, 1.0, 1.0, 1.0])
            .expect("valid shares");
        let shares = deck
            .training_distribution(&ScenarioTable::builtin(), "Unity")
            .shares();
        assert_eq!(shares, [0.0, 0.25, 0.25, 0.25, 0.25]);
        assert!(deck.set_manual_distribution([-1.0, 0.0, 0.0, 0.0, 0.0]).is_err());
        deck.clear_manual_distribution();
        assert!(deck.manual_distribution().is_none());
    }

    #[test]
    fn with_card_leaves_original_untouched() {
        let deck = Deck::from_cards(vec![card(1, CardCategory::Speed, 0.0)]);
        let extended = deck.with_card(card(2, CardCategory::Guts, 0.0));
        assert_eq!(deck.len(), 1);
        assert_eq!(extended.len(), 2);
        assert!(extended.emptied().is_empty());
    }
}
