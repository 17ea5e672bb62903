// Message types passed between the TUI, the controller and API tasks.
//
// The TUI sends `UserCommand`s to the controller; spawned API calls report
// back with `ApiEvent`s; the controller pushes `UiUpdate`s to the TUI.

use std::path::PathBuf;

use crate::api::{ApiResult, QueryOutput};
use crate::stats::columns::{Column, SchemaSource};
use crate::stats::filter::FilterCriteria;
use crate::stats::record::{PlayerDetail, PlayerId, PlayerSummary, StatRecord, Team};
use crate::stats::table::RenderedRow;
use crate::stats::StatType;

/// Loading state of the results table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Error,
}

impl LoadStatus {
    pub fn label(self) -> &'static str {
        match self {
            LoadStatus::Idle => "Idle",
            LoadStatus::Loading => "Loading...",
            LoadStatus::Ready => "Ready",
            LoadStatus::Error => "Error",
        }
    }
}

// ---------------------------------------------------------------------------
// TUI -> controller
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum UserCommand {
    SubmitFilter(FilterCriteria),
    /// Reissue the default unfiltered request.
    ResetFilters,
    NaturalLanguageQuery(String),
    /// Write the displayed rows to the local export file.
    ExportTable,
    /// Ask the backend for a CSV of the last submitted criteria.
    ExportServer,
    /// Autocomplete as the user types in the lookup pane.
    SuggestPlayers(String),
    SearchPlayers(String),
    /// Show one player's lines. `stat_type: None` uses the table's type.
    OpenPlayer {
        player_id: PlayerId,
        stat_type: Option<StatType>,
    },
    DismissError,
    Quit,
}

// ---------------------------------------------------------------------------
// API tasks -> controller
// ---------------------------------------------------------------------------

/// Completion of a spawned API call. `seq` is the counter value at the time
/// the call was issued.
#[derive(Debug, Clone)]
pub enum ApiEvent {
    Statistics {
        seq: u64,
        stat_type: StatType,
        result: ApiResult<Vec<StatRecord>>,
    },
    Query {
        seq: u64,
        result: ApiResult<QueryOutput>,
    },
    Teams(ApiResult<Vec<Team>>),
    Players {
        seq: u64,
        result: ApiResult<Vec<PlayerSummary>>,
    },
    PlayerDetail {
        seq: u64,
        result: ApiResult<Option<PlayerDetail>>,
    },
    ServerExport {
        path: PathBuf,
        result: ApiResult<Vec<u8>>,
    },
}

// ---------------------------------------------------------------------------
// Controller -> TUI
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum UiUpdate {
    Snapshot(Box<AppSnapshot>),
    Teams(Vec<Team>),
    Players(Vec<PlayerSummary>),
    PlayerDetail(Box<PlayerDetail>),
    /// Transient informational message (e.g. export location).
    Notice(String),
}

/// Everything the TUI needs to draw the results table and status line.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppSnapshot {
    pub status: LoadStatus,
    pub stat_type: StatType,
    pub schema_source: Option<SchemaSource>,
    pub columns: Vec<Column>,
    pub rows: Vec<RenderedRow>,
    pub error: Option<String>,
}

impl AppSnapshot {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}
