// Statistic records returned by the backend.
//
// Typed batting and pitching rows plus a dynamic row shape for natural-language
// query results. All field access goes through `StatRecord::field`, which
// returns `None` for names the record does not carry.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::StatType;

/// Rendered in place of a null or missing value.
pub const MISSING_PLACEHOLDER: &str = "--";

/// Player identifier used as row identity.
pub type PlayerId = i64;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("row {index} is malformed: {message}")]
    Malformed { index: usize, message: String },

    #[error("row {index} has no player identifier")]
    MissingPlayerId { index: usize },

    #[error("duplicate player id {player_id} in result set")]
    DuplicatePlayerId { player_id: PlayerId },
}

// ---------------------------------------------------------------------------
// FieldValue
// ---------------------------------------------------------------------------

/// A single cell value looked up by field name.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Text(String),
    Null,
}

impl FieldValue {
    /// Convert an arbitrary JSON value into a cell value.
    pub fn from_json(value: &Value) -> FieldValue {
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Text(b.to_string()),
            Value::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Int(i),
                None => n.as_f64().map_or(FieldValue::Null, FieldValue::Float),
            },
            Value::String(s) => FieldValue::Text(s.clone()),
            other => FieldValue::Text(other.to_string()),
        }
    }

    pub fn is_missing(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Float(f) => !f.is_finite(),
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::Int(_) => false,
        }
    }

    /// Display form with fixed precision for numeric columns.
    ///
    /// Missing values render as [`MISSING_PLACEHOLDER`]. When `precision` is
    /// set, integers are widened so a column lines up (`3` → `3.00`).
    pub fn display(&self, precision: Option<u8>) -> String {
        if self.is_missing() {
            return MISSING_PLACEHOLDER.to_string();
        }
        match (self, precision) {
            (FieldValue::Int(i), None) => i.to_string(),
            (FieldValue::Int(i), Some(p)) => format!("{:.*}", p as usize, *i as f64),
            (FieldValue::Float(f), Some(p)) => format!("{:.*}", p as usize, f),
            (FieldValue::Float(f), None) => f.to_string(),
            (FieldValue::Text(s), _) => s.clone(),
            (FieldValue::Null, _) => MISSING_PLACEHOLDER.to_string(),
        }
    }

    /// Raw form used for CSV export. Missing values become an empty field.
    pub fn raw(&self) -> String {
        if self.is_missing() {
            return String::new();
        }
        match self {
            FieldValue::Int(i) => i.to_string(),
            FieldValue::Float(f) => f.to_string(),
            FieldValue::Text(s) => s.clone(),
            FieldValue::Null => String::new(),
        }
    }
}

impl From<Option<i64>> for FieldValue {
    fn from(value: Option<i64>) -> Self {
        value.map_or(FieldValue::Null, FieldValue::Int)
    }
}

impl From<Option<i32>> for FieldValue {
    fn from(value: Option<i32>) -> Self {
        value.map_or(FieldValue::Null, |v| FieldValue::Int(i64::from(v)))
    }
}

impl From<Option<f64>> for FieldValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(FieldValue::Null, FieldValue::Float)
    }
}

impl From<Option<&String>> for FieldValue {
    fn from(value: Option<&String>) -> Self {
        value.map_or(FieldValue::Null, |s| FieldValue::Text(s.clone()))
    }
}

// ---------------------------------------------------------------------------
// Typed records
// ---------------------------------------------------------------------------

/// One batting line. The backend merges the player row into the stat row, so
/// name/team/position arrive alongside the counting stats.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BattingStats {
    pub player_id: PlayerId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub season: Option<i32>,
    #[serde(default)]
    pub games: Option<i64>,
    #[serde(default)]
    pub at_bats: Option<i64>,
    #[serde(default)]
    pub hits: Option<i64>,
    #[serde(default)]
    pub runs: Option<i64>,
    #[serde(default)]
    pub rbis: Option<i64>,
    #[serde(default)]
    pub home_runs: Option<i64>,
    #[serde(default)]
    pub batting_average: Option<f64>,
    #[serde(default)]
    pub exit_velocity: Option<f64>,
    #[serde(default)]
    pub launch_angle: Option<f64>,
}

impl BattingStats {
    pub fn field(&self, name: &str) -> Option<FieldValue> {
        let value = match name {
            "player_id" => FieldValue::Int(self.player_id),
            "name" => FieldValue::Text(self.name.clone()),
            "team" => self.team.as_ref().into(),
            "position" => self.position.as_ref().into(),
            "season" => self.season.into(),
            "games" => self.games.into(),
            "at_bats" => self.at_bats.into(),
            "hits" => self.hits.into(),
            "runs" => self.runs.into(),
            "rbis" => self.rbis.into(),
            "home_runs" => self.home_runs.into(),
            "batting_average" => self.batting_average.into(),
            "exit_velocity" => self.exit_velocity.into(),
            "launch_angle" => self.launch_angle.into(),
            _ => return None,
        };
        Some(value)
    }
}

/// One pitching line.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PitchingStats {
    pub player_id: PlayerId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub season: Option<i32>,
    #[serde(default)]
    pub games: Option<i64>,
    #[serde(default)]
    pub innings_pitched: Option<f64>,
    #[serde(default)]
    pub hits_allowed: Option<i64>,
    #[serde(default)]
    pub runs_allowed: Option<i64>,
    #[serde(default)]
    pub earned_runs: Option<i64>,
    #[serde(default)]
    pub walks: Option<i64>,
    #[serde(default)]
    pub strikeouts: Option<i64>,
    #[serde(default)]
    pub era: Option<f64>,
    #[serde(default)]
    pub velocity: Option<f64>,
    #[serde(default)]
    pub spin_rate: Option<f64>,
}

impl PitchingStats {
    pub fn field(&self, name: &str) -> Option<FieldValue> {
        let value = match name {
            "player_id" => FieldValue::Int(self.player_id),
            "name" => FieldValue::Text(self.name.clone()),
            "team" => self.team.as_ref().into(),
            "position" => self.position.as_ref().into(),
            "season" => self.season.into(),
            "games" => self.games.into(),
            "innings_pitched" => self.innings_pitched.into(),
            "hits_allowed" => self.hits_allowed.into(),
            "runs_allowed" => self.runs_allowed.into(),
            "earned_runs" => self.earned_runs.into(),
            "walks" => self.walks.into(),
            "strikeouts" => self.strikeouts.into(),
            "era" => self.era.into(),
            "velocity" => self.velocity.into(),
            "spin_rate" => self.spin_rate.into(),
            _ => return None,
        };
        Some(value)
    }
}

/// A row from a natural-language query. Its shape is described by the
/// response's own column schema, so fields are kept by name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DynamicRecord {
    pub player_id: PlayerId,
    pub fields: BTreeMap<String, FieldValue>,
}

impl DynamicRecord {
    /// Build from a JSON object. The identifier is taken from `player_id`,
    /// falling back to `id`; numeric strings are accepted.
    pub fn from_json(index: usize, value: &Value) -> Result<Self, RecordError> {
        let object = value.as_object().ok_or_else(|| RecordError::Malformed {
            index,
            message: "expected a JSON object".into(),
        })?;

        let player_id = ["player_id", "id"]
            .iter()
            .filter_map(|key| object.get(*key))
            .find_map(parse_player_id)
            .ok_or(RecordError::MissingPlayerId { index })?;

        let fields = object
            .iter()
            .map(|(k, v)| (k.clone(), FieldValue::from_json(v)))
            .collect();

        Ok(DynamicRecord { player_id, fields })
    }
}

fn parse_player_id(value: &Value) -> Option<PlayerId> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// StatRecord
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum StatRecord {
    Batting(BattingStats),
    Pitching(PitchingStats),
    Dynamic(DynamicRecord),
}

impl StatRecord {
    /// Decode one row of a typed statistics response.
    pub fn from_json(stat_type: StatType, index: usize, value: Value) -> Result<Self, RecordError> {
        let malformed = |e: serde_json::Error| RecordError::Malformed {
            index,
            message: e.to_string(),
        };
        match stat_type {
            StatType::Batting => serde_json::from_value(value)
                .map(StatRecord::Batting)
                .map_err(malformed),
            StatType::Pitching => serde_json::from_value(value)
                .map(StatRecord::Pitching)
                .map_err(malformed),
        }
    }

    pub fn player_id(&self) -> PlayerId {
        match self {
            StatRecord::Batting(b) => b.player_id,
            StatRecord::Pitching(p) => p.player_id,
            StatRecord::Dynamic(d) => d.player_id,
        }
    }

    /// Validated lookup by field name. `None` means the record has no such
    /// field; `Some(FieldValue::Null)` means the field exists but is empty.
    pub fn field(&self, name: &str) -> Option<FieldValue> {
        match self {
            StatRecord::Batting(b) => b.field(name),
            StatRecord::Pitching(p) => p.field(name),
            StatRecord::Dynamic(d) => d.fields.get(name).cloned(),
        }
    }

    /// Player name, if the record carries one.
    pub fn name(&self) -> Option<String> {
        match self.field("name") {
            Some(FieldValue::Text(s)) if !s.is_empty() => Some(s),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// RecordSet
// ---------------------------------------------------------------------------

/// Records of one response, with player identifiers guaranteed unique.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordSet {
    records: Vec<StatRecord>,
}

impl RecordSet {
    pub fn new(records: Vec<StatRecord>) -> Result<Self, RecordError> {
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            if !seen.insert(record.player_id()) {
                return Err(RecordError::DuplicatePlayerId {
                    player_id: record.player_id(),
                });
            }
        }
        Ok(RecordSet { records })
    }

    pub fn records(&self) -> &[StatRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Lookup data
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub abbreviation: Option<String>,
}

impl Team {
    /// Value sent as the `team` filter: the abbreviation when known.
    pub fn filter_value(&self) -> &str {
        self.abbreviation.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub id: PlayerId,
    pub name: String,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
}

/// One player's stat lines, possibly spanning several seasons.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerDetail {
    pub player: PlayerSummary,
    pub stat_type: StatType,
    pub stats: Vec<StatRecord>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn batter(id: PlayerId) -> StatRecord {
        StatRecord::Batting(BattingStats {
            player_id: id,
            name: format!("Player {id}"),
            ..Default::default()
        })
    }

    #[test]
    fn display_applies_precision() {
        assert_eq!(FieldValue::Float(0.2734).display(Some(3)), "0.273");
        assert_eq!(FieldValue::Float(3.5).display(Some(2)), "3.50");
        assert_eq!(FieldValue::Float(180.33).display(Some(1)), "180.3");
        assert_eq!(FieldValue::Int(3).display(Some(2)), "3.00");
        assert_eq!(FieldValue::Int(42).display(None), "42");
    }

    #[test]
    fn missing_values_render_as_placeholder() {
        assert_eq!(FieldValue::Null.display(Some(3)), MISSING_PLACEHOLDER);
        assert_eq!(FieldValue::Null.display(None), MISSING_PLACEHOLDER);
        assert_eq!(FieldValue::Float(f64::NAN).display(Some(2)), MISSING_PLACEHOLDER);
        assert_eq!(FieldValue::Text(String::new()).display(None), MISSING_PLACEHOLDER);
    }

    #[test]
    fn raw_keeps_unformatted_value() {
        assert_eq!(FieldValue::Float(0.2734).raw(), "0.2734");
        assert_eq!(FieldValue::Int(30).raw(), "30");
        assert_eq!(FieldValue::Null.raw(), "");
    }

    #[test]
    fn from_json_maps_types() {
        assert_eq!(FieldValue::from_json(&json!(7)), FieldValue::Int(7));
        assert_eq!(FieldValue::from_json(&json!(2.5)), FieldValue::Float(2.5));
        assert_eq!(FieldValue::from_json(&json!("LAD")), FieldValue::Text("LAD".into()));
        assert_eq!(FieldValue::from_json(&json!(null)), FieldValue::Null);
        assert_eq!(FieldValue::from_json(&json!(true)), FieldValue::Text("true".into()));
    }

    #[test]
    fn batting_record_decodes_with_nulls() {
        let value = json!({
            "id": 91,
            "player_id": 660271,
            "name": "Shohei Ohtani",
            "team": "LAD",
            "position": "DH",
            "season": 2023,
            "at_bats": 497,
            "hits": 151,
            "runs": 102,
            "rbis": 95,
            "home_runs": 44,
            "batting_average": 0.304,
            "exit_velocity": null
        });
        let record = StatRecord::from_json(StatType::Batting, 0, value).unwrap();
        assert_eq!(record.player_id(), 660271);
        assert_eq!(record.field("home_runs"), Some(FieldValue::Int(44)));
        assert_eq!(record.field("exit_velocity"), Some(FieldValue::Null));
        assert_eq!(record.field("games"), Some(FieldValue::Null));
        assert_eq!(record.field("era"), None);
        assert_eq!(record.name().as_deref(), Some("Shohei Ohtani"));
    }

    #[test]
    fn pitching_record_lookup_rejects_batting_fields() {
        let value = json!({ "player_id": 1, "name": "Arm", "era": 2.87, "innings_pitched": 180.1 });
        let record = StatRecord::from_json(StatType::Pitching, 0, value).unwrap();
        assert_eq!(record.field("era"), Some(FieldValue::Float(2.87)));
        assert_eq!(record.field("home_runs"), None);
    }

    #[test]
    fn typed_record_without_player_id_is_malformed() {
        let err = StatRecord::from_json(StatType::Batting, 3, json!({ "name": "Nobody" }))
            .unwrap_err();
        assert!(matches!(err, RecordError::Malformed { index: 3, .. }));
    }

    #[test]
    fn dynamic_record_falls_back_to_id() {
        let record = DynamicRecord::from_json(0, &json!({ "id": "12", "war": 8.1 })).unwrap();
        assert_eq!(record.player_id, 12);
        assert_eq!(record.fields.get("war"), Some(&FieldValue::Float(8.1)));
    }

    #[test]
    fn dynamic_record_requires_identifier() {
        let err = DynamicRecord::from_json(4, &json!({ "name": "x" })).unwrap_err();
        assert_eq!(err, RecordError::MissingPlayerId { index: 4 });

        let err = DynamicRecord::from_json(5, &json!([1, 2])).unwrap_err();
        assert!(matches!(err, RecordError::Malformed { index: 5, .. }));
    }

    #[test]
    fn record_set_accepts_unique_ids() {
        let set = RecordSet::new(vec![batter(1), batter(2), batter(3)]).unwrap();
        assert_eq!(set.len(), 3);
        assert!(!set.is_empty());
    }

    #[test]
    fn record_set_rejects_duplicate_ids() {
        let err = RecordSet::new(vec![batter(1), batter(2), batter(1)]).unwrap_err();
        assert_eq!(err, RecordError::DuplicatePlayerId { player_id: 1 });
    }

    #[test]
    fn team_filter_value_prefers_abbreviation() {
        let team = Team {
            id: 1,
            name: "Los Angeles Dodgers".into(),
            abbreviation: Some("LAD".into()),
        };
        assert_eq!(team.filter_value(), "LAD");
        let unnamed = Team {
            id: 2,
            name: "Expos".into(),
            abbreviation: None,
        };
        assert_eq!(unnamed.filter_value(), "Expos");
    }
}
