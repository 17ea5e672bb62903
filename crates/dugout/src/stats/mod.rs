// Statistics domain: stat types, records, column schemas, filters, the filter
// form model, the results table model, and CSV export.

pub mod columns;
pub mod export;
pub mod filter;
pub mod form;
pub mod record;
pub mod table;

use serde::{Deserialize, Serialize};

/// Discriminator selecting the batting or pitching record shape and schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatType {
    #[default]
    Batting,
    Pitching,
}

impl StatType {
    /// Wire name used in paths and query parameters.
    pub fn as_str(self) -> &'static str {
        match self {
            StatType::Batting => "batting",
            StatType::Pitching => "pitching",
        }
    }

    /// Human-readable label for the UI.
    pub fn label(self) -> &'static str {
        match self {
            StatType::Batting => "Batting",
            StatType::Pitching => "Pitching",
        }
    }

    /// Stat type that describes a player at `position`: pitchers (`P`,
    /// `SP`, `RP`, `RHP`, `LHP`) get pitching lines, everyone else batting.
    pub fn for_position(position: &str) -> StatType {
        match position.trim().to_ascii_uppercase().as_str() {
            "P" | "SP" | "RP" | "RHP" | "LHP" => StatType::Pitching,
            _ => StatType::Batting,
        }
    }

    /// The other stat type.
    pub fn toggled(self) -> StatType {
        match self {
            StatType::Batting => StatType::Pitching,
            StatType::Pitching => StatType::Batting,
        }
    }
}

impl std::fmt::Display for StatType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
