//! Raw support-card records as exported by the card database.
//!
//! Records are read-only reference data. Missing or null fields default and
//! numeric fields accept numbers or numeric strings, so partially scraped
//! entries still deserialize; unknown fields are ignored.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Dataset keys for the five limit-break levels, indexed by level.
pub const LIMIT_BREAK_KEYS: [&str; 5] = ["0lb", "1lb", "2lb", "3lb", "mlb"];

/// Highest limit-break level (index into [LIMIT_BREAK_KEYS]).
pub const MAX_LIMIT_BREAK: u8 = 4;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CardRecord {
    pub id: u32,
    #[serde(default)]
    pub chara_id_card: Option<i64>,
    #[serde(default)]
    pub card_chara_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_u8")]
    pub rarity: u8,
    #[serde(default)]
    pub prefered_type: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub effects: Vec<EffectEntry>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub unique_effects: Vec<UniqueEffect>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub all_events: EventTable,
    #[serde(default, deserialize_with = "null_as_default")]
    pub hints_table: Vec<HintEntry>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub hints_event_table: Vec<HintEntry>,
}

impl CardRecord {
    pub fn display_name(&self) -> &str {
        self.card_chara_name.as_deref().unwrap_or("Unknown")
    }

    /// Training hints followed by event hints.
    pub fn all_hints(&self) -> impl Iterator<Item = &HintEntry> {
        self.hints_table.iter().chain(self.hints_event_table.iter())
    }
}

/// One effect row: a bonus name and its magnitude per limit-break level.
///
/// Magnitudes are kept as raw JSON values because scraped rows sometimes carry
/// strings or nulls where a number is expected.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EffectEntry {
    pub type_name: String,
    #[serde(rename = "0lb", default)]
    pub lb0: Option<Value>,
    #[serde(rename = "1lb", default)]
    pub lb1: Option<Value>,
    #[serde(rename = "2lb", default)]
    pub lb2: Option<Value>,
    #[serde(rename = "3lb", default)]
    pub lb3: Option<Value>,
    #[serde(rename = "mlb", default)]
    pub mlb: Option<Value>,
}

impl EffectEntry {
    /// Raw magnitude at `level`, or `None` when the field is absent.
    pub fn raw_at(&self, level: u8) -> Option<&Value> {
        match level {
            0 => self.lb0.as_ref(),
            1 => self.lb1.as_ref(),
            2 => self.lb2.as_ref(),
            3 => self.lb3.as_ref(),
            _ => self.mlb.as_ref(),
        }
    }
}

/// Level at which a unique effect unlocks. Exports use either the
/// limit-break key ("2lb") or a plain index; -1 means always unlocked.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum UnlockLevel {
    Index(i64),
    Key(String),
}

impl Default for UnlockLevel {
    fn default() -> Self {
        Self::Index(0)
    }
}

impl UnlockLevel {
    pub fn as_level(&self) -> u8 {
        match self {
            Self::Index(index) => (*index).clamp(0, MAX_LIMIT_BREAK as i64) as u8,
            Self::Key(key) => LIMIT_BREAK_KEYS
                .iter()
                .position(|candidate| candidate == key)
                .map(|index| index as u8)
                .unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UniqueEffect {
    #[serde(default)]
    pub level_unlocked: UnlockLevel,
    #[serde(default, deserialize_with = "null_as_default")]
    pub effects: Vec<UniqueEffectValue>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UniqueEffectValue {
    pub type_name: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub value: f64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EventTable {
    #[serde(default, deserialize_with = "null_as_default")]
    pub chain_events: Vec<EventRecord>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub dates: Vec<EventRecord>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub special_events: Vec<EventRecord>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub random_events: Vec<EventRecord>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EventRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub choices: Vec<EventChoice>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EventChoice {
    #[serde(default, deserialize_with = "null_as_default")]
    pub rewards: Vec<RewardEntry>,
}

/// One reward token. `value` is a signed string such as "+10", "-5" or "10/20";
/// bare numbers are kept as their decimal text.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RewardEntry {
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(default, deserialize_with = "reward_text")]
    pub value: String,
    #[serde(default)]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct HintEntry {
    #[serde(default)]
    pub skill_id: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub skill_data: SkillRecord,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SkillRecord {
    #[serde(default)]
    pub id: u32,
    #[serde(default, deserialize_with = "lenient_u8")]
    pub rarity: u8,
    #[serde(default)]
    pub group_id: u32,
    #[serde(default)]
    pub grade_value: i64,
    #[serde(default)]
    pub condition_1: Option<String>,
    #[serde(default, deserialize_with = "lenient_i32")]
    pub ability_type: i32,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub ability_value: f64,
    #[serde(default)]
    pub skill_name: Option<String>,
    #[serde(default)]
    pub skill_desc: Option<String>,
}

impl SkillRecord {
    pub fn condition(&self) -> &str {
        self.condition_1.as_deref().unwrap_or("")
    }

    pub fn is_gold(&self) -> bool {
        self.rarity == 2
    }
}

/// Parses a signed reward token. A `a/b` pair yields the floored mean of both sides.
pub fn parse_signed_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if let Some((left, right)) = trimmed.split_once('/') {
        let left = parse_plain(left)?;
        let right = parse_plain(right)?;
        return Some((left + right).div_euclid(2));
    }
    parse_plain(trimmed)
}

fn parse_plain(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix('+').unwrap_or(trimmed);
    trimmed.parse::<i64>().ok()
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Non-numeric values read as 0.
fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(numeric(&value).filter(|number| number.is_finite()).unwrap_or(0.0))
}

/// Non-integral or out-of-range values read as 0.
fn lenient_u8<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(numeric(&value)
        .filter(|number| number.fract() == 0.0 && (0.0..=f64::from(u8::MAX)).contains(number))
        .map(|number| number as u8)
        .unwrap_or(0))
}

fn lenient_i32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(numeric(&value)
        .filter(|number| {
            number.fract() == 0.0
                && (f64::from(i32::MIN)..=f64::from(i32::MAX)).contains(number)
        })
        .map(|number| number as i32)
        .unwrap_or(0))
}

fn reward_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        Value::Number(number) => number.to_string(),
        _ => String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_signed_int_handles_signs_and_pairs() {
        assert_eq!(parse_signed_int("+10"), Some(10));
        assert_eq!(parse_signed_int("-5"), Some(-5));
        assert_eq!(parse_signed_int(" 7 "), Some(7));
        assert_eq!(parse_signed_int("10/21"), Some(15));
        assert_eq!(parse_signed_int("-3/0"), Some(-2));
        assert_eq!(parse_signed_int("random"), None);
        assert_eq!(parse_signed_int(""), None);
    }

    #[test]
    fn unlock_level_accepts_keys_and_indices() {
        assert_eq!(UnlockLevel::Key("2lb".to_string()).as_level(), 2);
        assert_eq!(UnlockLevel::Key("mlb".to_string()).as_level(), 4);
        assert_eq!(UnlockLevel::Index(-1).as_level(), 0);
        assert_eq!(UnlockLevel::Index(3).as_level(), 3);
    }

    #[test]
    fn card_record_tolerates_sparse_json() {
        let record: CardRecord = serde_json::from_value(serde_json::json!({
            "id": 30001,
            "effects": [{"type_name": "Speed Bonus", "0lb": 5, "mlb": "n/a"}],
            "extra_field": true
        }))
        .expect("sparse record should deserialize");
        assert_eq!(record.id, 30001);
        assert_eq!(record.display_name(), "Unknown");
        assert!(record.effects[0].raw_at(1).is_none());
        assert!(record.effects[0].raw_at(4).is_some());
    }

    #[test]
    fn null_and_mistyped_fields_fall_back() {
        let record: CardRecord = serde_json::from_value(serde_json::json!({
            "id": 30002,
            "rarity": null,
            "unique_effects": null,
            "all_events": {"dates": [{"choices": [{"rewards": [
                {"type": "Speed", "value": 10},
                {"type": "Stamina", "value": null}
            ]}]}]},
            "hints_table": [
                {"skill_id": 7, "skill_data": {"rarity": "2", "ability_type": "27", "ability_value": null}}
            ],
            "hints_event_table": null
        }))
        .expect("mistyped record should deserialize");
        assert_eq!(record.rarity, 0);
        assert!(record.unique_effects.is_empty());
        let rewards = &record.all_events.dates[0].choices[0].rewards;
        assert_eq!(parse_signed_int(&rewards[0].value), Some(10));
        assert_eq!(rewards[1].value, "");
        let skill = &record.hints_table[0].skill_data;
        assert!(skill.is_gold());
        assert_eq!(skill.ability_type, 27);
        assert_eq!(skill.ability_value, 0.0);
        assert!(record.hints_event_table.is_empty());
    }
}
