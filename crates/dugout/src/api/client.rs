// reqwest implementation of `StatsApi`.
//
// One `reqwest::Client` per `StatsClient`, built with the bearer credential as
// a default header so every request carries it. Response bodies may be a
// `{success, data, error}` envelope or a bare payload.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::{ApiConfig, ApiError, ApiResult, QueryOutput, StatsApi, MIN_LOOKUP_CHARS};
use crate::stats::columns::{Column, ColumnSpec};
use crate::stats::filter::FilterCriteria;
use crate::stats::record::{
    DynamicRecord, PlayerDetail, PlayerId, PlayerSummary, StatRecord, Team,
};
use crate::stats::StatType;

// ---------------------------------------------------------------------------
// StatsClient
// ---------------------------------------------------------------------------

pub struct StatsClient {
    http: reqwest::Client,
    config: ApiConfig,
}

impl StatsClient {
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.token))
            .map_err(|e| ApiError::Config(format!("token is not a valid header value: {e}")))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(StatsClient { http, config })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    async fn get_json(&self, path: &str, params: &[(String, String)]) -> Result<Value, ApiError> {
        let url = self.config.url(path);
        info!(%url, ?params, "GET");
        let response = self.http.get(&url).query(params).send().await?;
        let status = response.status();
        let text = response.text().await?;
        parse_body(status, &text)
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        let url = self.config.url(path);
        info!(%url, "POST");
        let response = self.http.post(&url).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;
        parse_body(status, &text)
    }

    async fn try_fetch_statistics(
        &self,
        stat_type: StatType,
        criteria: &FilterCriteria,
    ) -> Result<Vec<StatRecord>, ApiError> {
        // Thresholds are filtered by the criteria's own stat type, so it must
        // match the endpoint's.
        let mut criteria = criteria.clone();
        criteria.stat_type = stat_type;

        // The typed endpoint has no date filter, so date-bounded requests go
        // to the generic one.
        let body = if criteria.date_range.is_some() {
            self.get_json("statistics", &criteria.to_generic_params())
                .await?
        } else {
            let path = format!("stats/{}", stat_type.as_str());
            self.get_json(&path, &criteria.to_query_params()).await?
        };
        decode_records(stat_type, payload(body))
    }

    async fn try_fetch_player_stats(
        &self,
        player_id: PlayerId,
        stat_type: StatType,
        season: Option<i32>,
    ) -> Result<Option<PlayerDetail>, ApiError> {
        let mut params = vec![("type".to_string(), stat_type.as_str().to_string())];
        if let Some(season) = season {
            params.push(("season".to_string(), season.to_string()));
        }
        let body = self
            .get_json(&format!("stats/player/{player_id}"), &params)
            .await?;
        decode_player_detail(stat_type, payload(body)).map(Some)
    }

    async fn try_search_players(&self, query: &str) -> Result<Vec<PlayerSummary>, ApiError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let body = self
            .get_json("players/search", &[("q".to_string(), query.to_string())])
            .await?;
        decode_list(payload(body))
    }

    async fn try_lookup_players(&self, query: &str) -> Result<Vec<PlayerSummary>, ApiError> {
        let query = query.trim();
        if query.chars().count() < MIN_LOOKUP_CHARS {
            return Ok(Vec::new());
        }
        let body = self
            .get_json("players", &[("query".to_string(), query.to_string())])
            .await?;
        decode_list(payload(body))
    }

    async fn try_get_teams(&self) -> Result<Vec<Team>, ApiError> {
        let body = self.get_json("teams", &[]).await?;
        decode_list(payload(body))
    }

    async fn try_export_statistics(&self, criteria: &FilterCriteria) -> Result<Vec<u8>, ApiError> {
        let url = self.config.url("statistics/export");
        let params = criteria.to_generic_params();
        info!(%url, ?params, "GET (export)");
        let response = self
            .http
            .get(&url)
            .header(ACCEPT, "text/csv")
            .query(&params)
            .send()
            .await?;
        let status = response.status();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains("json"));
        let bytes = response.bytes().await?;
        if !status.is_success() || is_json {
            // A JSON body here is an error envelope, never the export itself.
            let text = String::from_utf8_lossy(&bytes);
            return Err(match parse_body(status, &text) {
                Err(e) => e,
                Ok(_) if !status.is_success() => ApiError::Status { status },
                Ok(_) => ApiError::Decode("expected CSV export, got JSON".into()),
            });
        }
        Ok(bytes.to_vec())
    }

    async fn try_run_query(&self, text: &str) -> Result<QueryOutput, ApiError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ApiError::InvalidQuery("query is empty".into()));
        }
        let body = self.post_json("nlp/query", &json!({ "query": text })).await?;
        decode_query_output(body)
    }
}

#[async_trait]
impl StatsApi for StatsClient {
    async fn fetch_statistics(
        &self,
        stat_type: StatType,
        criteria: &FilterCriteria,
    ) -> ApiResult<Vec<StatRecord>> {
        finish(
            "fetch_statistics",
            self.try_fetch_statistics(stat_type, criteria).await,
        )
    }

    async fn fetch_player_stats(
        &self,
        player_id: PlayerId,
        stat_type: StatType,
        season: Option<i32>,
    ) -> ApiResult<Option<PlayerDetail>> {
        finish(
            "fetch_player_stats",
            self.try_fetch_player_stats(player_id, stat_type, season)
                .await,
        )
    }

    async fn search_players(&self, query: &str) -> ApiResult<Vec<PlayerSummary>> {
        finish("search_players", self.try_search_players(query).await)
    }

    async fn lookup_players(&self, query: &str) -> ApiResult<Vec<PlayerSummary>> {
        finish("lookup_players", self.try_lookup_players(query).await)
    }

    async fn get_teams(&self) -> ApiResult<Vec<Team>> {
        finish("get_teams", self.try_get_teams().await)
    }

    async fn export_statistics(&self, criteria: &FilterCriteria) -> ApiResult<Vec<u8>> {
        finish("export_statistics", self.try_export_statistics(criteria).await)
    }

    async fn run_natural_language_query(&self, text: &str) -> ApiResult<QueryOutput> {
        finish("run_natural_language_query", self.try_run_query(text).await)
    }
}

fn finish<T: Default>(operation: &str, result: Result<T, ApiError>) -> ApiResult<T> {
    if let Err(e) = &result {
        warn!(operation, error = %e, "API call failed");
    }
    result.into()
}

// ---------------------------------------------------------------------------
// Body parsing helpers
// ---------------------------------------------------------------------------

/// Parse a JSON body and apply the envelope's success flag and the HTTP
/// status. Returns the whole JSON value on success.
pub(crate) fn parse_body(status: StatusCode, text: &str) -> Result<Value, ApiError> {
    let value: Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(e) => {
            if !status.is_success() {
                return Err(ApiError::Status { status });
            }
            return Err(ApiError::Decode(format!("invalid JSON: {e}")));
        }
    };

    let success = value.get("success").and_then(Value::as_bool);
    let message = value
        .get("error")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map(str::to_string);

    match (success, status.is_success()) {
        (Some(false), _) => Err(ApiError::Backend {
            message: message.unwrap_or_else(|| "request failed".to_string()),
        }),
        (_, false) => match message {
            Some(message) => Err(ApiError::Backend { message }),
            None => Err(ApiError::Status { status }),
        },
        _ => Ok(value),
    }
}

/// The payload of an envelope, or the value itself for a bare body.
pub(crate) fn payload(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("success") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

fn as_array(value: Value) -> Result<Vec<Value>, ApiError> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Null => Ok(Vec::new()),
        other => Err(ApiError::Decode(format!(
            "expected a list, got {}",
            type_name(&other)
        ))),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

pub(crate) fn decode_records(stat_type: StatType, value: Value) -> Result<Vec<StatRecord>, ApiError> {
    let records = as_array(value)?
        .into_iter()
        .enumerate()
        .map(|(i, item)| StatRecord::from_json(stat_type, i, item))
        .collect::<Result<Vec<_>, _>>()?;
    debug!(count = records.len(), %stat_type, "decoded statistics");
    Ok(records)
}

fn decode_list<T: serde::de::DeserializeOwned>(value: Value) -> Result<Vec<T>, ApiError> {
    as_array(value)?
        .into_iter()
        .map(|item| serde_json::from_value(item).map_err(|e| ApiError::Decode(e.to_string())))
        .collect()
}

/// Stat rows of the player endpoint lack the player's own fields; copy them
/// in so the rows render like any other result.
pub(crate) fn decode_player_detail(stat_type: StatType, value: Value) -> Result<PlayerDetail, ApiError> {
    let mut object = match value {
        Value::Object(map) => map,
        other => {
            return Err(ApiError::Decode(format!(
                "expected player detail object, got {}",
                type_name(&other)
            )))
        }
    };

    let player: PlayerSummary = serde_json::from_value(object.remove("player").unwrap_or(Value::Null))
        .map_err(|e| ApiError::Decode(format!("player: {e}")))?;

    let rows = as_array(object.remove("stats").unwrap_or(Value::Null))?;
    let mut stats = Vec::with_capacity(rows.len());
    for (i, mut row) in rows.into_iter().enumerate() {
        if let Value::Object(map) = &mut row {
            map.entry("player_id").or_insert_with(|| json!(player.id));
            map.entry("name").or_insert_with(|| json!(player.name));
            if let Some(team) = &player.team {
                map.entry("team").or_insert_with(|| json!(team));
            }
            if let Some(position) = &player.position {
                map.entry("position").or_insert_with(|| json!(position));
            }
        }
        stats.push(StatRecord::from_json(stat_type, i, row)?);
    }

    Ok(PlayerDetail {
        player,
        stat_type,
        stats,
    })
}

pub(crate) fn decode_query_output(value: Value) -> Result<QueryOutput, ApiError> {
    let columns = match value.get("columns") {
        Some(Value::Null) | None => Vec::new(),
        Some(columns) => serde_json::from_value::<Vec<Column>>(columns.clone())
            .map_err(|e| ApiError::Decode(format!("columns: {e}")))?,
    };

    let records = as_array(payload(value))?
        .iter()
        .enumerate()
        .map(|(i, item)| DynamicRecord::from_json(i, item).map(StatRecord::Dynamic))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(QueryOutput {
        records,
        columns: ColumnSpec::from_response(columns),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
