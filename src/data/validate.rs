//! Structural checks over a raw card dataset.
//!
//! Runs on the untyped JSON so problems the typed loader would silently
//! default away (string magnitudes, unknown categories) are still reported.

use std::collections::HashSet;
use std::fmt;
use std::fs;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::cards::{BonusKind, CardCategory};
use crate::data::card::LIMIT_BREAK_KEYS;
use crate::error::DeckError;
use crate::skills::Condition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationSeverity {
    Error,
    Warning,
    Info,
}

impl ValidationSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for ValidationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationDiagnostic {
    pub severity: ValidationSeverity,
    pub context: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    pub fn push(
        &mut self,
        severity: ValidationSeverity,
        context: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(ValidationDiagnostic {
            severity,
            context: context.into(),
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diag| diag.severity == ValidationSeverity::Error)
    }

    pub fn count(&self, severity: ValidationSeverity) -> usize {
        self.diagnostics
            .iter()
            .filter(|diag| diag.severity == severity)
            .count()
    }
}

const KNOWN_PREFERRED_TYPES: &[&str] = &[
    "Speed",
    "Stamina",
    "Power",
    "Guts",
    "Intelligence",
    "Wit",
    "Support",
    "Friend",
    "Group",
];

/// Ability types the skill evaluator can value.
const VALUED_ABILITY_TYPES: &[i64] = &[9, 10, 27, 28, 31];

pub fn validate_card_dataset(path: &str) -> Result<ValidationReport, DeckError> {
    let raw = fs::read_to_string(path).map_err(|err| DeckError::io(path, err))?;
    let payload: Value = serde_json::from_str(&raw)?;
    Ok(validate_card_value(&payload))
}

pub fn validate_card_value(payload: &Value) -> ValidationReport {
    let mut report = ValidationReport::default();
    let Some(entries) = payload
        .get("cards")
        .and_then(Value::as_array)
        .or_else(|| payload.as_array())
    else {
        report.push(
            ValidationSeverity::Error,
            "root",
            "expected top-level JSON array or { cards: [...] }",
        );
        return report;
    };

    let mut seen_ids = HashSet::new();
    for (index, entry) in entries.iter().enumerate() {
        let base_context = format!("entry[{index}]");
        let Some(object) = entry.as_object() else {
            report.push(
                ValidationSeverity::Error,
                base_context,
                "entry is not an object",
            );
            continue;
        };

        let card_id = match object.get("id").and_then(Value::as_u64) {
            Some(id) => {
                if !seen_ids.insert(id) {
                    report.push(
                        ValidationSeverity::Error,
                        format!("{base_context}.id"),
                        format!("duplicate id {id}, the first record wins"),
                    );
                }
                id.to_string()
            }
            None => {
                report.push(
                    ValidationSeverity::Error,
                    format!("{base_context}.id"),
                    "missing non-negative integer 'id'",
                );
                "<missing-id>".to_string()
            }
        };
        let card_context = format!("{base_context} id={card_id}");

        let rarity = object.get("rarity").and_then(|value| {
            value
                .as_u64()
                .or_else(|| value.as_str().and_then(|text| text.trim().parse().ok()))
        });
        match rarity {
            Some(1..=3) => {}
            Some(other) => report.push(
                ValidationSeverity::Warning,
                format!("{card_context}.rarity"),
                format!("rarity {other} is outside 1..=3"),
            ),
            None => report.push(
                ValidationSeverity::Warning,
                format!("{card_context}.rarity"),
                "missing rarity",
            ),
        }

        match object.get("prefered_type").and_then(Value::as_str) {
            Some(kind) if KNOWN_PREFERRED_TYPES.contains(&kind.trim()) => {}
            Some(kind) => report.push(
                ValidationSeverity::Warning,
                format!("{card_context}.prefered_type"),
                format!(
                    "unknown type '{kind}', card is treated as {}",
                    CardCategory::Unknown
                ),
            ),
            None => report.push(
                ValidationSeverity::Info,
                format!("{card_context}.prefered_type"),
                "no preferred type",
            ),
        }

        validate_effects(&mut report, object, &card_context);
        validate_hints(&mut report, object, &card_context);
    }

    report
}

fn validate_effects(report: &mut ValidationReport, object: &Map<String, Value>, context: &str) {
    // null reads as no effects
    let Some(effects) = object.get("effects").filter(|value| !value.is_null()) else {
        return;
    };
    let Some(effects) = effects.as_array() else {
        report.push(
            ValidationSeverity::Error,
            format!("{context}.effects"),
            "expected array",
        );
        return;
    };

    for (effect_index, effect) in effects.iter().enumerate() {
        let effect_context = format!("{context}.effects[{effect_index}]");
        let Some(effect) = effect.as_object() else {
            report.push(
                ValidationSeverity::Error,
                effect_context,
                "effect is not an object",
            );
            continue;
        };

        match effect.get("type_name").and_then(Value::as_str) {
            Some(name) if BonusKind::from_name(name).is_some() => {}
            Some(name) => report.push(
                ValidationSeverity::Warning,
                format!("{effect_context}.type_name"),
                format!("unrecognized bonus '{name}' is ignored"),
            ),
            None => report.push(
                ValidationSeverity::Error,
                format!("{effect_context}.type_name"),
                "missing non-empty 'type_name'",
            ),
        }

        for key in LIMIT_BREAK_KEYS {
            match effect.get(key) {
                None | Some(Value::Null) | Some(Value::Number(_)) => {}
                Some(other) => report.push(
                    ValidationSeverity::Warning,
                    format!("{effect_context}.{key}"),
                    format!("non-numeric magnitude {other}, falls back to mlb"),
                ),
            }
        }
        if !effect.get("mlb").is_some_and(Value::is_number) {
            report.push(
                ValidationSeverity::Info,
                format!("{effect_context}.mlb"),
                "no numeric mlb fallback",
            );
        }
    }
}

fn validate_hints(report: &mut ValidationReport, object: &Map<String, Value>, context: &str) {
    for table in ["hints_table", "hints_event_table"] {
        let Some(hints) = object.get(table).and_then(Value::as_array) else {
            continue;
        };
        for (hint_index, hint) in hints.iter().enumerate() {
            let hint_context = format!("{context}.{table}[{hint_index}]");
            let Some(skill) = hint.get("skill_data").and_then(Value::as_object) else {
                report.push(
                    ValidationSeverity::Warning,
                    hint_context,
                    "hint has no skill_data",
                );
                continue;
            };

            if let Some(condition) = skill.get("condition_1").and_then(Value::as_str) {
                if let Err(err) = Condition::parse(condition) {
                    report.push(
                        ValidationSeverity::Warning,
                        format!("{hint_context}.condition_1"),
                        format!("{err}; proc chance will be 0"),
                    );
                }
            }

            if let Some(ability) = skill.get("ability_type").and_then(Value::as_i64) {
                if !VALUED_ABILITY_TYPES.contains(&ability) {
                    report.push(
                        ValidationSeverity::Info,
                        format!("{hint_context}.ability_type"),
                        format!("ability type {ability} has no known value"),
                    );
                }
            }
        }
    }
}
