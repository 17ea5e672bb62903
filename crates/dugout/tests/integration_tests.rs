// Integration tests for the dugout controller.
//
// These drive `app::run` end-to-end through its channels with a scripted
// in-memory `StatsApi`, the way the TUI and the HTTP client would.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use dugout::api::{ApiResult, QueryOutput, StatsApi};
use dugout::app::{self, AppState};
use dugout::config::{ApiSection, Config, CredentialsConfig, ExportSection, UiSection};
use dugout::protocol::{AppSnapshot, LoadStatus, UiUpdate, UserCommand};
use dugout::stats::columns::{Column, ColumnSpec, SchemaSource};
use dugout::stats::filter::{FilterCriteria, Metric};
use dugout::stats::record::{
    BattingStats, DynamicRecord, FieldValue, PlayerDetail, PlayerId, PlayerSummary, StatRecord,
    Team,
};
use dugout::stats::StatType;

// ===========================================================================
// Test helpers
// ===========================================================================

type StatsReply = (Duration, ApiResult<Vec<StatRecord>>);

/// Replays queued statistics replies in order and records every request.
#[derive(Default)]
struct ScriptedApi {
    stats_requests: Mutex<Vec<(StatType, Vec<(String, String)>)>>,
    stats_replies: Mutex<VecDeque<StatsReply>>,
    query_reply: Mutex<Option<ApiResult<QueryOutput>>>,
}

impl ScriptedApi {
    fn with_stats(replies: Vec<StatsReply>) -> Self {
        ScriptedApi {
            stats_replies: Mutex::new(replies.into()),
            ..Default::default()
        }
    }

    fn requests(&self) -> Vec<(StatType, Vec<(String, String)>)> {
        self.stats_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl StatsApi for ScriptedApi {
    async fn fetch_statistics(
        &self,
        stat_type: StatType,
        criteria: &FilterCriteria,
    ) -> ApiResult<Vec<StatRecord>> {
        self.stats_requests
            .lock()
            .unwrap()
            .push((stat_type, criteria.to_query_params()));
        let reply = self.stats_replies.lock().unwrap().pop_front();
        match reply {
            Some((delay, result)) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                result
            }
            None => ApiResult::ok(Vec::new()),
        }
    }

    async fn fetch_player_stats(
        &self,
        _player_id: PlayerId,
        _stat_type: StatType,
        _season: Option<i32>,
    ) -> ApiResult<Option<PlayerDetail>> {
        ApiResult::ok(None)
    }

    async fn search_players(&self, _query: &str) -> ApiResult<Vec<PlayerSummary>> {
        ApiResult::ok(Vec::new())
    }

    async fn lookup_players(&self, _query: &str) -> ApiResult<Vec<PlayerSummary>> {
        ApiResult::ok(Vec::new())
    }

    async fn get_teams(&self) -> ApiResult<Vec<Team>> {
        ApiResult::ok(vec![Team {
            id: 147,
            name: "New York Yankees".into(),
            abbreviation: Some("NYY".into()),
        }])
    }

    async fn export_statistics(&self, _criteria: &FilterCriteria) -> ApiResult<Vec<u8>> {
        ApiResult::ok(Vec::new())
    }

    async fn run_natural_language_query(&self, _text: &str) -> ApiResult<QueryOutput> {
        self.query_reply
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| ApiResult::ok(QueryOutput::default()))
    }
}

fn test_config() -> Config {
    Config {
        api: ApiSection {
            base_url: "http://localhost:5000/api".into(),
            timeout_secs: 5,
        },
        export: ExportSection {
            directory: std::env::temp_dir()
                .join("dugout_integration")
                .to_string_lossy()
                .into_owned(),
            file_name: "baseball_stats.csv".into(),
        },
        ui: UiSection::default(),
        credentials: CredentialsConfig::default(),
    }
}

fn batter(id: i64, name: &str, home_runs: i64) -> StatRecord {
    StatRecord::Batting(BattingStats {
        player_id: id,
        name: name.into(),
        team: Some("NYY".into()),
        home_runs: Some(home_runs),
        batting_average: Some(0.281),
        ..Default::default()
    })
}

struct Harness {
    cmd_tx: mpsc::Sender<UserCommand>,
    ui_rx: mpsc::Receiver<UiUpdate>,
    handle: tokio::task::JoinHandle<anyhow::Result<()>>,
}

fn start(api: Arc<ScriptedApi>) -> Harness {
    let (api_tx, api_rx) = mpsc::channel(64);
    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (ui_tx, ui_rx) = mpsc::channel(256);
    let state = AppState::new(test_config(), api, api_tx);
    let handle = tokio::spawn(app::run(cmd_rx, api_rx, ui_tx, state));
    Harness {
        cmd_tx,
        ui_rx,
        handle,
    }
}

impl Harness {
    /// Next snapshot for which `pred` holds; other updates are skipped.
    async fn snapshot_where(&mut self, pred: impl Fn(&AppSnapshot) -> bool) -> AppSnapshot {
        let wait = async {
            loop {
                match self.ui_rx.recv().await {
                    Some(UiUpdate::Snapshot(s)) if pred(&s) => return *s,
                    Some(_) => continue,
                    None => panic!("controller exited before the expected snapshot"),
                }
            }
        };
        tokio::time::timeout(Duration::from_secs(10), wait)
            .await
            .expect("timed out waiting for snapshot")
    }

    async fn settled(&mut self) -> AppSnapshot {
        self.snapshot_where(|s| s.status != LoadStatus::Loading).await
    }

    async fn send(&self, cmd: UserCommand) {
        self.cmd_tx.send(cmd).await.unwrap();
    }

    async fn quit(self) {
        self.cmd_tx.send(UserCommand::Quit).await.unwrap();
        self.handle.await.unwrap().unwrap();
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[tokio::test]
async fn initial_load_fetches_default_statistics_and_teams() {
    let api = Arc::new(ScriptedApi::with_stats(vec![(
        Duration::ZERO,
        ApiResult::ok(vec![batter(1, "Aaron Judge", 37), batter(2, "Juan Soto", 35)]),
    )]));
    let mut h = start(api.clone());

    let mut saw_teams = false;
    let snapshot = loop {
        match h.ui_rx.recv().await.unwrap() {
            UiUpdate::Teams(teams) => {
                assert_eq!(teams[0].filter_value(), "NYY");
                saw_teams = true;
            }
            UiUpdate::Snapshot(s) if s.status == LoadStatus::Ready => {
                if saw_teams {
                    break *s;
                }
                // Teams may still be in flight.
                let next = h.ui_rx.recv().await.unwrap();
                assert!(matches!(next, UiUpdate::Teams(_)));
                break *s;
            }
            _ => {}
        }
    };

    assert_eq!(snapshot.row_count(), 2);
    assert_eq!(
        snapshot.schema_source,
        Some(SchemaSource::Standard(StatType::Batting))
    );
    assert_eq!(api.requests(), vec![(StatType::Batting, Vec::new())]);
    h.quit().await;
}

#[tokio::test]
async fn reset_issues_the_initial_request() {
    let api = Arc::new(ScriptedApi::default());
    let mut h = start(api.clone());
    h.settled().await;

    let mut criteria = FilterCriteria::unfiltered(StatType::Pitching);
    criteria.season = Some(2021);
    h.send(UserCommand::SubmitFilter(criteria)).await;
    h.snapshot_where(|s| s.status == LoadStatus::Ready && s.stat_type == StatType::Pitching)
        .await;

    h.send(UserCommand::ResetFilters).await;
    h.snapshot_where(|s| s.status == LoadStatus::Ready && s.stat_type == StatType::Batting)
        .await;

    let requests = api.requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[0], requests[2]);
    assert_ne!(requests[0], requests[1]);
    h.quit().await;
}

#[tokio::test]
async fn typed_filter_sends_only_applicable_parameters() {
    let api = Arc::new(ScriptedApi::default());
    let mut h = start(api.clone());
    h.settled().await;

    let mut criteria = FilterCriteria::unfiltered(StatType::Batting);
    criteria.season = Some(2023);
    criteria.minimum_thresholds.insert(Metric::HomeRuns, 30.0);
    criteria.minimum_thresholds.insert(Metric::Innings, 50.0);
    h.send(UserCommand::SubmitFilter(criteria)).await;
    h.snapshot_where(|s| s.status == LoadStatus::Ready).await;

    let requests = api.requests();
    assert_eq!(
        requests[1],
        (
            StatType::Batting,
            vec![
                ("season".to_string(), "2023".to_string()),
                ("min_home_runs".to_string(), "30".to_string()),
            ]
        )
    );
    h.quit().await;
}

#[tokio::test]
async fn backend_failure_shows_banner_and_keeps_table() {
    let api = Arc::new(ScriptedApi::with_stats(vec![
        (
            Duration::ZERO,
            ApiResult::ok(vec![batter(1, "Aaron Judge", 37)]),
        ),
        (Duration::ZERO, ApiResult::failure("no data")),
    ]));
    let mut h = start(api);
    let before = h.settled().await;
    assert_eq!(before.row_count(), 1);

    h.send(UserCommand::SubmitFilter(FilterCriteria::default()))
        .await;
    let after = h.snapshot_where(|s| s.status == LoadStatus::Error).await;
    assert_eq!(after.error.as_deref(), Some("no data"));
    assert_eq!(after.rows, before.rows);

    h.send(UserCommand::DismissError).await;
    let dismissed = h.snapshot_where(|s| s.error.is_none()).await;
    assert_eq!(dismissed.rows, before.rows);
    h.quit().await;
}

#[tokio::test]
async fn query_schema_holds_until_next_standard_result() {
    let api = Arc::new(ScriptedApi::with_stats(vec![
        (Duration::ZERO, ApiResult::ok(vec![batter(1, "Aaron Judge", 37)])),
        (Duration::ZERO, ApiResult::ok(vec![batter(2, "Juan Soto", 35)])),
    ]));
    let mut fields = BTreeMap::new();
    fields.insert("name".to_string(), FieldValue::Text("Barry Bonds".into()));
    fields.insert("season".to_string(), FieldValue::Int(2001));
    fields.insert("home_runs".to_string(), FieldValue::Int(73));
    *api.query_reply.lock().unwrap() = Some(ApiResult::ok(QueryOutput {
        records: vec![StatRecord::Dynamic(DynamicRecord {
            player_id: 111188,
            fields,
        })],
        columns: ColumnSpec::from_response(vec![
            Column::new("name", "Player", 200, None),
            Column::new("season", "Season", 80, None),
            Column::new("home_runs", "HR", 80, None),
        ]),
    }));

    let mut h = start(api);
    h.settled().await;

    h.send(UserCommand::NaturalLanguageQuery("most home runs in a season".into()))
        .await;
    let custom = h
        .snapshot_where(|s| s.schema_source == Some(SchemaSource::Custom))
        .await;
    let labels: Vec<&str> = custom.columns.iter().map(|c| c.label.as_str()).collect();
    assert_eq!(labels, vec!["Player", "Season", "HR"]);
    assert_eq!(custom.rows[0].cells, vec!["Barry Bonds", "2001", "73"]);

    h.send(UserCommand::SubmitFilter(FilterCriteria::default()))
        .await;
    let standard = h
        .snapshot_where(|s| {
            s.status == LoadStatus::Ready
                && s.schema_source == Some(SchemaSource::Standard(StatType::Batting))
        })
        .await;
    assert_eq!(
        standard.columns,
        ColumnSpec::standard(StatType::Batting).columns().to_vec()
    );
    assert_eq!(standard.rows[0].cells[0], "Juan Soto");
    h.quit().await;
}

#[tokio::test(start_paused = true)]
async fn slow_stale_response_never_overwrites_newer_result() {
    let api = Arc::new(ScriptedApi::with_stats(vec![
        (Duration::ZERO, ApiResult::ok(Vec::new())),
        // First submission answers late...
        (
            Duration::from_millis(500),
            ApiResult::ok(vec![batter(1, "Stale Slugger", 10)]),
        ),
        // ...after the second one has already answered.
        (
            Duration::from_millis(10),
            ApiResult::ok(vec![batter(2, "Fresh Slugger", 20)]),
        ),
    ]));
    let mut h = start(api);
    h.settled().await;

    h.send(UserCommand::SubmitFilter(FilterCriteria::default()))
        .await;
    let mut second = FilterCriteria::default();
    second.season = Some(2024);
    h.send(UserCommand::SubmitFilter(second)).await;

    let fresh = h.snapshot_where(|s| s.status == LoadStatus::Ready).await;
    assert_eq!(fresh.rows[0].cells[0], "Fresh Slugger");

    // Let the stale reply land; it must not produce an update.
    tokio::time::sleep(Duration::from_secs(1)).await;
    while let Ok(update) = h.ui_rx.try_recv() {
        if let UiUpdate::Snapshot(s) = update {
            assert_ne!(s.rows.first().map(|r| r.cells[0].as_str()), Some("Stale Slugger"));
        }
    }
    h.quit().await;
}

#[tokio::test]
async fn duplicate_identifiers_are_rejected_as_error() {
    let api = Arc::new(ScriptedApi::with_stats(vec![(
        Duration::ZERO,
        ApiResult::ok(vec![batter(7, "Twin A", 1), batter(7, "Twin B", 2)]),
    )]));
    let mut h = start(api);
    let snapshot = h.settled().await;
    assert_eq!(snapshot.status, LoadStatus::Error);
    assert!(snapshot.rows.is_empty());
    assert_eq!(
        snapshot.error.as_deref(),
        Some("duplicate player id 7 in result set")
    );
    h.quit().await;
}
