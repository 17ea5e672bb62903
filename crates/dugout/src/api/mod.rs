// HTTP access to the statistics service.
//
// `StatsApi` is the seam the controller talks to; `client::StatsClient` is the
// reqwest implementation. Every operation returns an `ApiResult` so failures
// arrive as data rather than as propagated errors.

pub mod client;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::Config;
use crate::stats::columns::ColumnSpec;
use crate::stats::filter::FilterCriteria;
use crate::stats::record::{PlayerDetail, PlayerId, PlayerSummary, RecordError, StatRecord, Team};
use crate::stats::StatType;

/// Used when no token is configured. Matches the backend's development token.
pub const DEV_TOKEN: &str = "dev-token";

/// Autocomplete lookups below this length are not sent.
pub const MIN_LOOKUP_CHARS: usize = 2;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ApiError {
    /// Network-level failure: connect, timeout, broken body.
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered but reported failure.
    #[error("{message}")]
    Backend { message: String },

    /// Non-success HTTP status without a usable error body.
    #[error("server returned {status}")]
    Status { status: reqwest::StatusCode },

    /// The body did not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),

    #[error(transparent)]
    Record(#[from] RecordError),

    /// Rejected before any request was sent.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("invalid client configuration: {0}")]
    Config(String),
}

// ---------------------------------------------------------------------------
// ApiResult
// ---------------------------------------------------------------------------

/// Uniform result of every API operation.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResult<T> {
    pub success: bool,
    pub data: T,
    pub error: Option<String>,
}

impl<T> ApiResult<T> {
    pub fn ok(data: T) -> Self {
        ApiResult {
            success: true,
            data,
            error: None,
        }
    }

    /// Collapse the result into a `Result` for callers that branch on it.
    pub fn into_result(self) -> Result<T, String> {
        if self.success {
            Ok(self.data)
        } else {
            Err(self
                .error
                .unwrap_or_else(|| "request failed".to_string()))
        }
    }
}

impl<T: Default> ApiResult<T> {
    pub fn failure(message: impl Into<String>) -> Self {
        ApiResult {
            success: false,
            data: T::default(),
            error: Some(message.into()),
        }
    }
}

impl<T: Default> From<Result<T, ApiError>> for ApiResult<T> {
    fn from(result: Result<T, ApiError>) -> Self {
        match result {
            Ok(data) => ApiResult::ok(data),
            Err(e) => ApiResult::failure(e.to_string()),
        }
    }
}

/// Records plus the schema that describes them, from a natural-language
/// query.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryOutput {
    pub records: Vec<StatRecord>,
    pub columns: ColumnSpec,
}

// ---------------------------------------------------------------------------
// ApiConfig
// ---------------------------------------------------------------------------

/// Immutable connection settings handed to the client at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    pub base_url: String,
    pub token: String,
    pub timeout: Duration,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>, timeout: Duration) -> Self {
        ApiConfig {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let token = match config.credentials.api_token.as_deref() {
            Some(t) if !t.trim().is_empty() => t.trim().to_string(),
            _ => {
                tracing::warn!("No API token configured, using development token");
                DEV_TOKEN.to_string()
            }
        };
        ApiConfig::new(
            config.api.base_url.clone(),
            token,
            Duration::from_secs(config.api.timeout_secs),
        )
    }

    /// Absolute URL for an endpoint path.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

// ---------------------------------------------------------------------------
// StatsApi
// ---------------------------------------------------------------------------

/// Operations the statistics service offers.
#[async_trait]
pub trait StatsApi: Send + Sync {
    async fn fetch_statistics(
        &self,
        stat_type: StatType,
        criteria: &FilterCriteria,
    ) -> ApiResult<Vec<StatRecord>>;

    async fn fetch_player_stats(
        &self,
        player_id: PlayerId,
        stat_type: StatType,
        season: Option<i32>,
    ) -> ApiResult<Option<PlayerDetail>>;

    async fn search_players(&self, query: &str) -> ApiResult<Vec<PlayerSummary>>;

    async fn lookup_players(&self, query: &str) -> ApiResult<Vec<PlayerSummary>>;

    async fn get_teams(&self) -> ApiResult<Vec<Team>>;

    async fn export_statistics(&self, criteria: &FilterCriteria) -> ApiResult<Vec<u8>>;

    async fn run_natural_language_query(&self, text: &str) -> ApiResult<QueryOutput>;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
