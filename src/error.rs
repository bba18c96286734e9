//! Error taxonomy for dataset loading, card resolution and simulation.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeckError {
    #[error("support card {card_id} not found in dataset")]
    CardNotFound { card_id: u32 },
    #[error("limit break {level} for card {card_id} is outside 0..=4")]
    InvalidLimitBreak { card_id: u32, level: u8 },
    #[error("unknown scenario '{0}'")]
    UnknownScenario(String),
    #[error("invalid card dataset: {0}")]
    InvalidDataset(String),
    #[error("invalid training distribution: {0}")]
    InvalidDistribution(String),
    #[error("unable to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("unable to parse json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unable to parse yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl DeckError {
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
