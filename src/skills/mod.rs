pub mod condition;
pub mod evaluator;
pub mod hints;

pub use condition::{Condition, ConditionError};
pub use evaluator::{evaluate_skill, proc_chance, RaceContext, SkillEvaluation, StatWeights};
pub use hints::{card_hint_summary, deck_hint_summary, hint_types, HintSummary};
