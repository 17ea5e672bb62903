// Application state and orchestration logic.
//
// The controller owns the results table and its loading/error state. User
// commands from the TUI start API calls on spawned tasks; their completions
// come back as `ApiEvent`s tagged with the sequence number they were issued
// under, and only the latest table-affecting completion is applied.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::api::{ApiError, ApiResult, StatsApi};
use crate::config::Config;
use crate::protocol::{ApiEvent, AppSnapshot, LoadStatus, UiUpdate, UserCommand};
use crate::stats::export::{self, ExportError};
use crate::stats::filter::FilterCriteria;
use crate::stats::record::{PlayerId, RecordSet, Team};
use crate::stats::table::StatisticsTable;
use crate::stats::StatType;

/// The request issued at startup and on reset.
pub fn initial_criteria() -> FilterCriteria {
    FilterCriteria::default()
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

pub struct AppState {
    pub config: Config,
    pub api: Arc<dyn StatsApi>,
    /// Spawned API tasks report through a clone of this sender.
    pub api_tx: mpsc::Sender<ApiEvent>,
    pub status: LoadStatus,
    /// Counter for table-affecting requests (filters and NL queries).
    /// Completions carrying an older value are discarded.
    pub request_seq: u64,
    /// Counter for player lookups and searches.
    pub lookup_seq: u64,
    pub detail_seq: u64,
    pub table: StatisticsTable,
    /// Criteria of the last submitted filter, used for server export and
    /// player detail seasons.
    pub last_criteria: FilterCriteria,
    pub error: Option<String>,
    pub teams: Vec<Team>,
}

impl AppState {
    pub fn new(config: Config, api: Arc<dyn StatsApi>, api_tx: mpsc::Sender<ApiEvent>) -> Self {
        AppState {
            config,
            api,
            api_tx,
            status: LoadStatus::Idle,
            request_seq: 0,
            lookup_seq: 0,
            detail_seq: 0,
            table: StatisticsTable::default(),
            last_criteria: initial_criteria(),
            error: None,
            teams: Vec::new(),
        }
    }

    pub fn build_snapshot(&self) -> AppSnapshot {
        AppSnapshot {
            status: self.status,
            stat_type: self.table.stat_type(),
            schema_source: Some(self.table.schema_source()),
            columns: self.table.columns().columns().to_vec(),
            rows: self.table.rendered_rows(),
            error: self.error.clone(),
        }
    }

    /// Default statistics request plus the team list.
    pub fn initial_load(&mut self) {
        info!("Issuing initial load");
        self.submit_filter(initial_criteria());
        self.load_teams();
    }

    /// Start a statistics fetch for `criteria`.
    pub fn submit_filter(&mut self, criteria: FilterCriteria) {
        self.request_seq += 1;
        let seq = self.request_seq;
        self.status = LoadStatus::Loading;
        self.last_criteria = criteria.clone();

        let api = Arc::clone(&self.api);
        let tx = self.api_tx.clone();
        let stat_type = criteria.stat_type;
        info!(seq, %stat_type, "Submitting filter");
        tokio::spawn(async move {
            let result = api.fetch_statistics(stat_type, &criteria).await;
            let _ = tx
                .send(ApiEvent::Statistics {
                    seq,
                    stat_type,
                    result,
                })
                .await;
        });
    }

    pub fn reset(&mut self) {
        info!("Resetting filters");
        self.submit_filter(initial_criteria());
    }

    pub fn run_query(&mut self, text: String) {
        self.request_seq += 1;
        let seq = self.request_seq;
        self.status = LoadStatus::Loading;

        let api = Arc::clone(&self.api);
        let tx = self.api_tx.clone();
        info!(seq, query = %text, "Running natural-language query");
        tokio::spawn(async move {
            let result = api.run_natural_language_query(&text).await;
            let _ = tx.send(ApiEvent::Query { seq, result }).await;
        });
    }

    pub fn load_teams(&mut self) {
        let api = Arc::clone(&self.api);
        let tx = self.api_tx.clone();
        tokio::spawn(async move {
            let result = api.get_teams().await;
            let _ = tx.send(ApiEvent::Teams(result)).await;
        });
    }

    /// Autocomplete (`full == false`) or full search of players.
    pub fn find_players(&mut self, query: String, full: bool) {
        self.lookup_seq += 1;
        let seq = self.lookup_seq;
        let api = Arc::clone(&self.api);
        let tx = self.api_tx.clone();
        debug!(seq, %query, full, "Player lookup");
        tokio::spawn(async move {
            let result = if full {
                api.search_players(&query).await
            } else {
                api.lookup_players(&query).await
            };
            let _ = tx.send(ApiEvent::Players { seq, result }).await;
        });
    }

    /// Fetch one player's lines for `stat_type` (the table's when `None`)
    /// and the last submitted season.
    pub fn open_player(&mut self, player_id: PlayerId, stat_type: Option<StatType>) {
        self.detail_seq += 1;
        let seq = self.detail_seq;
        let stat_type = stat_type.unwrap_or_else(|| self.table.stat_type());
        let season = self.last_criteria.season;
        let api = Arc::clone(&self.api);
        let tx = self.api_tx.clone();
        info!(seq, player_id, %stat_type, ?season, "Opening player detail");
        tokio::spawn(async move {
            let result = api.fetch_player_stats(player_id, stat_type, season).await;
            let _ = tx.send(ApiEvent::PlayerDetail { seq, result }).await;
        });
    }

    /// Write the displayed rows to the configured export file.
    pub fn export_table(&self) -> Result<PathBuf, ExportError> {
        let bytes = self.table.to_csv()?;
        let path = self.config.export_path();
        export::save(&path, &bytes)?;
        info!(path = %path.display(), rows = self.table.row_count(), "Exported table");
        Ok(path)
    }

    /// Request a server-side export of the last submitted criteria.
    pub fn export_server(&mut self) {
        let path = self.config.server_export_path();
        let criteria = self.last_criteria.clone();
        let api = Arc::clone(&self.api);
        let tx = self.api_tx.clone();
        info!(path = %path.display(), "Requesting server export");
        tokio::spawn(async move {
            let result = api.export_statistics(&criteria).await;
            let _ = tx.send(ApiEvent::ServerExport { path, result }).await;
        });
    }

    fn fail(&mut self, message: String) {
        warn!("Request failed: {}", message);
        self.status = LoadStatus::Error;
        self.error = Some(message);
    }

    /// Apply a user command. Returns the updates to push to the TUI.
    pub fn handle_command(&mut self, cmd: UserCommand) -> Vec<UiUpdate> {
        match cmd {
            UserCommand::SubmitFilter(criteria) => {
                self.submit_filter(criteria);
                vec![self.snapshot_update()]
            }
            UserCommand::ResetFilters => {
                self.reset();
                vec![self.snapshot_update()]
            }
            UserCommand::NaturalLanguageQuery(text) => {
                // Rejected here so an in-flight request keeps its sequence
                // number and the table keeps its status.
                if text.trim().is_empty() {
                    let error = ApiError::InvalidQuery("query is empty".into());
                    warn!("{}", error);
                    self.error = Some(error.to_string());
                } else {
                    self.run_query(text);
                }
                vec![self.snapshot_update()]
            }
            UserCommand::ExportTable => match self.export_table() {
                Ok(path) => vec![UiUpdate::Notice(format!(
                    "Exported {} rows to {}",
                    self.table.row_count(),
                    path.display()
                ))],
                Err(e) => {
                    warn!("Export failed: {}", e);
                    self.error = Some(e.to_string());
                    vec![self.snapshot_update()]
                }
            },
            UserCommand::ExportServer => {
                self.export_server();
                vec![UiUpdate::Notice("Server export requested".to_string())]
            }
            UserCommand::SuggestPlayers(query) => {
                self.find_players(query, false);
                Vec::new()
            }
            UserCommand::SearchPlayers(query) => {
                self.find_players(query, true);
                Vec::new()
            }
            UserCommand::OpenPlayer {
                player_id,
                stat_type,
            } => {
                self.open_player(player_id, stat_type);
                Vec::new()
            }
            UserCommand::DismissError => {
                self.error = None;
                if self.status == LoadStatus::Error {
                    self.status = LoadStatus::Idle;
                }
                vec![self.snapshot_update()]
            }
            // Handled in the main loop
            UserCommand::Quit => Vec::new(),
        }
    }

    /// Apply a completed API call. Stale completions are dropped.
    pub fn handle_api_event(&mut self, event: ApiEvent) -> Vec<UiUpdate> {
        match event {
            ApiEvent::Statistics {
                seq,
                stat_type,
                result,
            } => {
                if self.is_stale(seq) {
                    return Vec::new();
                }
                match result.into_result() {
                    Ok(records) => match RecordSet::new(records) {
                        Ok(set) => {
                            info!(seq, rows = set.len(), %stat_type, "Statistics loaded");
                            self.table.replace_standard(stat_type, set);
                            self.status = LoadStatus::Ready;
                            self.error = None;
                        }
                        Err(e) => self.fail(e.to_string()),
                    },
                    Err(message) => self.fail(message),
                }
                vec![self.snapshot_update()]
            }
            ApiEvent::Query { seq, result } => {
                if self.is_stale(seq) {
                    return Vec::new();
                }
                match result.into_result() {
                    Ok(output) => match RecordSet::new(output.records) {
                        Ok(set) => {
                            info!(seq, rows = set.len(), columns = output.columns.len(), "Query loaded");
                            self.table.replace_custom(set, output.columns);
                            self.status = LoadStatus::Ready;
                            self.error = None;
                        }
                        Err(e) => self.fail(e.to_string()),
                    },
                    Err(message) => self.fail(message),
                }
                vec![self.snapshot_update()]
            }
            ApiEvent::Teams(result) => match result.into_result() {
                Ok(teams) => {
                    info!(count = teams.len(), "Teams loaded");
                    self.teams = teams.clone();
                    vec![UiUpdate::Teams(teams)]
                }
                Err(message) => {
                    warn!("Team list failed: {}", message);
                    self.error = Some(format!("Failed to load teams: {message}"));
                    vec![self.snapshot_update()]
                }
            },
            ApiEvent::Players { seq, result } => {
                if seq != self.lookup_seq {
                    debug!(seq, current = self.lookup_seq, "Discarding stale player lookup");
                    return Vec::new();
                }
                self.side_result(result, UiUpdate::Players)
            }
            ApiEvent::PlayerDetail { seq, result } => {
                if seq != self.detail_seq {
                    debug!(seq, current = self.detail_seq, "Discarding stale player detail");
                    return Vec::new();
                }
                match result.into_result() {
                    Ok(Some(detail)) => vec![UiUpdate::PlayerDetail(Box::new(detail))],
                    Ok(None) => vec![UiUpdate::Notice("No statistics for that player".to_string())],
                    Err(message) => {
                        warn!("Player detail failed: {}", message);
                        self.error = Some(message);
                        vec![self.snapshot_update()]
                    }
                }
            }
            ApiEvent::ServerExport { path, result } => match result.into_result() {
                Ok(bytes) => match export::save(&path, &bytes) {
                    Ok(()) => {
                        info!(path = %path.display(), bytes = bytes.len(), "Server export saved");
                        vec![UiUpdate::Notice(format!(
                            "Server export saved to {}",
                            path.display()
                        ))]
                    }
                    Err(e) => {
                        warn!("Saving server export failed: {}", e);
                        self.error = Some(e.to_string());
                        vec![self.snapshot_update()]
                    }
                },
                Err(message) => {
                    warn!("Server export failed: {}", message);
                    self.error = Some(format!("Server export failed: {message}"));
                    vec![self.snapshot_update()]
                }
            },
        }
    }

    fn is_stale(&self, seq: u64) -> bool {
        if seq != self.request_seq {
            debug!(
                "Discarding stale completion (seq: {}, current: {})",
                seq, self.request_seq
            );
            return true;
        }
        false
    }

    /// Results that do not touch the table: a failure only raises the banner.
    fn side_result<T: Default>(
        &mut self,
        result: ApiResult<T>,
        wrap: impl FnOnce(T) -> UiUpdate,
    ) -> Vec<UiUpdate> {
        match result.into_result() {
            Ok(data) => vec![wrap(data)],
            Err(message) => {
                warn!("Lookup failed: {}", message);
                self.error = Some(message);
                vec![self.snapshot_update()]
            }
        }
    }

    fn snapshot_update(&self) -> UiUpdate {
        UiUpdate::Snapshot(Box::new(self.build_snapshot()))
    }
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

/// Run the controller loop.
///
/// Issues the initial load, then listens on user commands and API
/// completions with `tokio::select!`, pushing updates through `ui_tx`.
pub async fn run(
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    mut api_rx: mpsc::Receiver<ApiEvent>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut state: AppState,
) -> anyhow::Result<()> {
    info!("Application event loop started");

    state.initial_load();
    let _ = ui_tx
        .send(UiUpdate::Snapshot(Box::new(state.build_snapshot())))
        .await;

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UserCommand::Quit) => {
                        info!("Quit command received, shutting down");
                        break;
                    }
                    Some(cmd) => {
                        for update in state.handle_command(cmd) {
                            let _ = ui_tx.send(update).await;
                        }
                    }
                    None => {
                        info!("Command channel closed, shutting down");
                        break;
                    }
                }
            }

            event = api_rx.recv() => {
                match event {
                    Some(event) => {
                        for update in state.handle_api_event(event) {
                            let _ = ui_tx.send(update).await;
                        }
                    }
                    None => {
                        info!("API channel closed, shutting down");
                        break;
                    }
                }
            }
        }
    }

    info!("Application event loop exiting");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
