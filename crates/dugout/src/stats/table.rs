// Results table model.
//
// Holds the current result set together with the schema that renders it.
// A standard fetch installs the static schema for its stat type; a
// natural-language result installs its own schema until the next standard
// result replaces it.

use super::columns::{ColumnSpec, SchemaSource};
use super::export::{self, ExportError};
use super::record::{PlayerId, RecordSet};
use super::StatType;

/// A row ready for display: identity plus formatted cells.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedRow {
    pub player_id: PlayerId,
    pub cells: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatisticsTable {
    stat_type: StatType,
    records: RecordSet,
    standard_columns: ColumnSpec,
    custom_columns: Option<ColumnSpec>,
}

impl Default for StatisticsTable {
    fn default() -> Self {
        StatisticsTable::new(StatType::default())
    }
}

impl StatisticsTable {
    pub fn new(stat_type: StatType) -> Self {
        StatisticsTable {
            stat_type,
            records: RecordSet::default(),
            standard_columns: ColumnSpec::standard(stat_type),
            custom_columns: None,
        }
    }

    /// Install the result of a standard filter request. Any custom schema
    /// from an earlier query is dropped.
    pub fn replace_standard(&mut self, stat_type: StatType, records: RecordSet) {
        if stat_type != self.stat_type {
            self.standard_columns = ColumnSpec::standard(stat_type);
        }
        self.stat_type = stat_type;
        self.records = records;
        self.custom_columns = None;
    }

    /// Install a natural-language result and its schema. An empty schema
    /// keeps the static one for the current stat type.
    pub fn replace_custom(&mut self, records: RecordSet, columns: ColumnSpec) {
        self.records = records;
        self.custom_columns = if columns.is_empty() { None } else { Some(columns) };
    }

    pub fn stat_type(&self) -> StatType {
        self.stat_type
    }

    pub fn records(&self) -> &RecordSet {
        &self.records
    }

    /// The schema in effect: custom when present, static otherwise.
    pub fn columns(&self) -> &ColumnSpec {
        self.custom_columns.as_ref().unwrap_or(&self.standard_columns)
    }

    pub fn schema_source(&self) -> SchemaSource {
        if self.custom_columns.is_some() {
            SchemaSource::Custom
        } else {
            SchemaSource::Standard(self.stat_type)
        }
    }

    pub fn row_count(&self) -> usize {
        self.records.len()
    }

    pub fn rendered_rows(&self) -> Vec<RenderedRow> {
        let columns = self.columns();
        self.records
            .records()
            .iter()
            .map(|record| RenderedRow {
                player_id: record.player_id(),
                cells: columns.format_row(record),
            })
            .collect()
    }

    /// CSV of the displayed rows under the active schema.
    pub fn to_csv(&self) -> Result<Vec<u8>, ExportError> {
        export::write_csv(self.columns(), self.records.records())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::columns::Column;
    use crate::stats::record::{BattingStats, DynamicRecord, FieldValue, PitchingStats, StatRecord};
    use std::collections::{BTreeMap, HashSet};

    fn batters(n: i64) -> RecordSet {
        let records = (1..=n)
            .map(|i| {
                StatRecord::Batting(BattingStats {
                    player_id: i,
                    name: format!("Batter {i}"),
                    home_runs: Some(i * 2),
                    batting_average: Some(0.250 + i as f64 / 1000.0),
                    ..Default::default()
                })
            })
            .collect();
        RecordSet::new(records).unwrap()
    }

    fn query_result() -> (RecordSet, ColumnSpec) {
        let mut fields = BTreeMap::new();
        fields.insert("name".to_string(), FieldValue::Text("Barry Bonds".into()));
        fields.insert("bwar".to_string(), FieldValue::Float(11.9));
        let records = RecordSet::new(vec![StatRecord::Dynamic(DynamicRecord {
            player_id: 111188,
            fields,
        })])
        .unwrap();
        let columns = ColumnSpec::from_response(vec![
            Column::new("name", "Player", 20, None),
            Column::new("bwar", "bWAR", 6, None),
        ]);
        (records, columns)
    }

    #[test]
    fn renders_one_row_per_record_with_unique_ids() {
        let mut table = StatisticsTable::default();
        table.replace_standard(StatType::Batting, batters(25));
        let rows = table.rendered_rows();
        assert_eq!(rows.len(), 25);
        let ids: HashSet<_> = rows.iter().map(|r| r.player_id).collect();
        assert_eq!(ids.len(), 25);
        assert!(rows.iter().all(|r| r.cells.len() == table.columns().len()));
    }

    #[test]
    fn custom_schema_overrides_until_next_standard_result() {
        let mut table = StatisticsTable::default();
        table.replace_standard(StatType::Batting, batters(3));
        assert_eq!(table.schema_source(), SchemaSource::Standard(StatType::Batting));

        let (records, columns) = query_result();
        table.replace_custom(records, columns.clone());
        assert_eq!(table.schema_source(), SchemaSource::Custom);
        assert_eq!(table.columns(), &columns);
        assert_eq!(table.rendered_rows()[0].cells, vec!["Barry Bonds", "11.90"]);

        table.replace_standard(StatType::Batting, batters(2));
        assert_eq!(table.schema_source(), SchemaSource::Standard(StatType::Batting));
        assert_eq!(table.columns(), &ColumnSpec::standard(StatType::Batting));
    }

    #[test]
    fn stat_type_change_recomputes_static_schema() {
        let mut table = StatisticsTable::default();
        let pitcher = StatRecord::Pitching(PitchingStats {
            player_id: 9,
            name: "Closer".into(),
            era: Some(1.234),
            ..Default::default()
        });
        table.replace_standard(StatType::Pitching, RecordSet::new(vec![pitcher]).unwrap());
        assert_eq!(table.stat_type(), StatType::Pitching);
        assert_eq!(table.columns(), &ColumnSpec::standard(StatType::Pitching));
        assert_eq!(table.rendered_rows()[0].cells[9], "1.23");
    }

    #[test]
    fn empty_custom_schema_falls_back_to_static() {
        let mut table = StatisticsTable::default();
        let (records, _) = query_result();
        table.replace_custom(records, ColumnSpec::default());
        assert_eq!(table.schema_source(), SchemaSource::Standard(StatType::Batting));
    }

    #[test]
    fn csv_header_matches_active_labels() {
        let mut table = StatisticsTable::default();
        let (records, columns) = query_result();
        table.replace_custom(records, columns);
        let csv = String::from_utf8(table.to_csv().unwrap()).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("Player,bWAR"));
        assert_eq!(lines.next(), Some("Barry Bonds,11.9"));
    }
}
