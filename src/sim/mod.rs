pub mod distribution;
pub mod engine;
pub mod facility;

pub use distribution::TrainingDistribution;
pub use engine::{simulate, simulate_detailed, AccumulatedStats, SimulationOutcome, SimulationParams};
pub use facility::{expected_contribution, presence, FacilityBonuses};

/// Career turns, plus the finale block, minus mandatory race turns.
pub const BASE_TRAINING_TURNS: u32 = 72 + 6 - 11;
/// Bond gauge value at which a card is fully bonded.
pub const BOND_TARGET: f64 = 80.0;
/// Bond gained per training turn with the card.
pub const BOND_GAIN_PER_TURN: f64 = 7.0;

/// Training turns left after `optional_races` optional races.
pub fn training_turns(optional_races: u32) -> f64 {
    BASE_TRAINING_TURNS.saturating_sub(optional_races) as f64
}

/// Turns of training needed to max bond from `initial_bond`.
pub fn bond_turns(initial_bond: f64) -> u32 {
    ((BOND_TARGET - initial_bond).max(0.0) / BOND_GAIN_PER_TURN).ceil() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turn_budget_shrinks_with_optional_races() {
        assert_eq!(training_turns(0), 67.0);
        assert_eq!(training_turns(5), 62.0);
        assert_eq!(training_turns(100), 0.0);
    }

    #[test]
    fn bond_turns_round_up() {
        assert_eq!(bond_turns(0.0), 12);
        assert_eq!(bond_turns(10.0), 10);
        assert_eq!(bond_turns(35.0), 7);
        assert_eq!(bond_turns(95.0), 0);
    }
}
