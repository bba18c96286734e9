pub mod card;
pub mod dataset;
pub mod scenario;
pub mod validate;

pub use card::{CardRecord, HintEntry, SkillRecord};
pub use dataset::{CardDataset, RejectedRecord, DEFAULT_DATASET_PATH};
pub use scenario::{ScenarioConfig, ScenarioTable, DEFAULT_SCENARIO};
