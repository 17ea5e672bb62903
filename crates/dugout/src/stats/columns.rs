// Column schemas for the results table.
//
// A `ColumnSpec` is either the static schema for a stat type or the dynamic
// schema returned with a natural-language query result.

use serde::{Deserialize, Serialize};

use super::record::{FieldValue, StatRecord, MISSING_PLACEHOLDER};
use super::StatType;

/// One column: which field it shows, its header, width in terminal cells,
/// and fixed numeric precision (`None` for counts and text).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub field: String,
    #[serde(rename = "headerName", alias = "label")]
    pub label: String,
    #[serde(default = "default_width")]
    pub width: u16,
    #[serde(default)]
    pub precision: Option<u8>,
}

fn default_width() -> u16 {
    10
}

impl Column {
    pub fn new(field: &str, label: &str, width: u16, precision: Option<u8>) -> Self {
        Column {
            field: field.to_string(),
            label: label.to_string(),
            width,
            precision,
        }
    }

    /// Format this column's cell for `record`. A field the record does not
    /// carry renders the same as a null value.
    pub fn format(&self, record: &StatRecord) -> String {
        match record.field(&self.field) {
            Some(value) => value.display(self.precision),
            None => MISSING_PLACEHOLDER.to_string(),
        }
    }

    /// Raw (unformatted) value for export.
    pub fn raw(&self, record: &StatRecord) -> String {
        record
            .field(&self.field)
            .unwrap_or(FieldValue::Null)
            .raw()
    }
}

/// Where the active schema came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaSource {
    Standard(StatType),
    Custom,
}

/// Ordered display schema for one result set.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnSpec {
    columns: Vec<Column>,
}

impl ColumnSpec {
    pub fn new(columns: Vec<Column>) -> Self {
        ColumnSpec { columns }
    }

    /// The static schema for a stat type.
    pub fn standard(stat_type: StatType) -> Self {
        let columns = match stat_type {
            StatType::Batting => vec![
                Column::new("name", "Player", 22, None),
                Column::new("team", "Team", 6, None),
                Column::new("games", "Games", 6, None),
                Column::new("at_bats", "AB", 5, None),
                Column::new("hits", "H", 5, None),
                Column::new("runs", "R", 5, None),
                Column::new("rbis", "RBI", 5, None),
                Column::new("home_runs", "HR", 5, None),
                Column::new("batting_average", "AVG", 6, Some(3)),
                Column::new("exit_velocity", "Exit Velo", 9, Some(1)),
                Column::new("launch_angle", "Launch Angle", 12, Some(1)),
            ],
            StatType::Pitching => vec![
                Column::new("name", "Player", 22, None),
                Column::new("team", "Team", 6, None),
                Column::new("games", "Games", 6, None),
                Column::new("innings_pitched", "IP", 6, Some(1)),
                Column::new("hits_allowed", "H", 5, None),
                Column::new("runs_allowed", "R", 5, None),
                Column::new("earned_runs", "ER", 5, None),
                Column::new("walks", "BB", 5, None),
                Column::new("strikeouts", "K", 5, None),
                Column::new("era", "ERA", 6, Some(2)),
                Column::new("velocity", "Velo", 6, Some(1)),
                Column::new("spin_rate", "Spin Rate", 9, Some(0)),
            ],
        };
        ColumnSpec { columns }
    }

    /// Normalize a schema received from a query response: drop columns
    /// without a field name and fill in precision for well-known fields.
    pub fn from_response(columns: Vec<Column>) -> Self {
        let columns = columns
            .into_iter()
            .filter(|c| !c.field.trim().is_empty())
            .map(|mut c| {
                if c.precision.is_none() {
                    c.precision = default_precision(&c.field);
                }
                if c.label.trim().is_empty() {
                    c.label = c.field.clone();
                }
                c
            })
            .collect();
        ColumnSpec { columns }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn labels(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.label.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Display-formatted cells for one record, in column order.
    pub fn format_row(&self, record: &StatRecord) -> Vec<String> {
        self.columns.iter().map(|c| c.format(record)).collect()
    }

    /// Raw cells for one record, in column order.
    pub fn raw_row(&self, record: &StatRecord) -> Vec<String> {
        self.columns.iter().map(|c| c.raw(record)).collect()
    }
}

/// Precision for rate stats that commonly appear in query results.
pub fn default_precision(field: &str) -> Option<u8> {
    match field {
        "batting_average" | "avg" | "obp" | "slg" | "ops" | "woba" => Some(3),
        "era" | "whip" | "fip" | "war" | "bwar" | "fwar" => Some(2),
        "innings_pitched" | "exit_velocity" | "launch_angle" | "velocity" => Some(1),
        "spin_rate" => Some(0),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
