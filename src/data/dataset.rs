//! Read-only card dataset indexed by card id.
//! Load once, then share by reference with the resolver and the ranking engine.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::data::card::CardRecord;
use crate::error::DeckError;

pub const DEFAULT_DATASET_PATH: &str = "data/cards.json";

/// A dataset entry that could not be read as a card record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedRecord {
    /// Position in the dataset array.
    pub index: usize,
    pub id: Option<u64>,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct CardDataset {
    records: Vec<CardRecord>,
    by_id: HashMap<u32, usize>,
    rejected: Vec<RejectedRecord>,
}

impl CardDataset {
    /// Builds the id index. The first record wins when ids repeat.
    pub fn from_records(records: Vec<CardRecord>) -> Self {
        let mut by_id = HashMap::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            if by_id.contains_key(&record.id) {
                log::warn!(
                    "duplicate card id {} at position {index}; keeping first record",
                    record.id
                );
                continue;
            }
            by_id.insert(record.id, index);
        }
        Self {
            records,
            by_id,
            rejected: Vec::new(),
        }
    }

    /// Loads a JSON array of records, or an object with a `cards` array.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DeckError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .map_err(|err| DeckError::io(path.display().to_string(), err))?;
        Self::from_json_str(&raw)
    }

    /// Parses records one by one. An entry that does not fit the record shape
    /// is logged and kept in [CardDataset::rejected]; only a bad root fails.
    pub fn from_json_str(raw: &str) -> Result<Self, DeckError> {
        let mut root: Value = serde_json::from_str(raw)?;
        let entries = match root.get_mut("cards").map(Value::take).unwrap_or(root) {
            Value::Array(entries) => entries,
            _ => {
                return Err(DeckError::InvalidDataset(
                    "expected a JSON array of cards or an object with a 'cards' array".to_string(),
                ))
            }
        };

        let mut records = Vec::with_capacity(entries.len());
        let mut rejected = Vec::new();
        for (index, entry) in entries.into_iter().enumerate() {
            let id = entry.get("id").and_then(Value::as_u64);
            match serde_json::from_value::<CardRecord>(entry) {
                Ok(record) => records.push(record),
                Err(err) => {
                    log::warn!(
                        "skipping dataset entry {index} (id {}): {err}",
                        id.map_or_else(|| "unknown".to_string(), |id| id.to_string())
                    );
                    rejected.push(RejectedRecord {
                        index,
                        id,
                        reason: err.to_string(),
                    });
                }
            }
        }
        log::debug!(
            "loaded {} support card records, rejected {}",
            records.len(),
            rejected.len()
        );
        let mut dataset = Self::from_records(records);
        dataset.rejected = rejected;
        Ok(dataset)
    }

    pub fn get(&self, card_id: u32) -> Option<&CardRecord> {
        self.by_id.get(&card_id).map(|&index| &self.records[index])
    }

    /// Records in dataset order (duplicates included).
    pub fn records(&self) -> &[CardRecord] {
        &self.records
    }

    /// Unique records in dataset order; duplicates after the first are skipped.
    pub fn unique_records(&self) -> impl Iterator<Item = &CardRecord> {
        self.records
            .iter()
            .enumerate()
            .filter(|(index, record)| self.by_id.get(&record.id) == Some(index))
            .map(|(_, record)| record)
    }

    /// Entries dropped at load time.
    pub fn rejected(&self) -> &[RejectedRecord] {
        &self.rejected
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
