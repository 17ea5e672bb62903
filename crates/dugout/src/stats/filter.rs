// Filter criteria and their translation into backend query parameters.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use thiserror::Error;

use super::StatType;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ---------------------------------------------------------------------------
// Metric
// ---------------------------------------------------------------------------

/// A statistic that can carry a minimum threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Metric {
    Games,
    AtBats,
    Hits,
    HomeRuns,
    Innings,
    Strikeouts,
}

impl Metric {
    pub const ALL: [Metric; 6] = [
        Metric::Games,
        Metric::AtBats,
        Metric::Hits,
        Metric::HomeRuns,
        Metric::Innings,
        Metric::Strikeouts,
    ];

    /// Whether this threshold means anything for `stat_type`.
    pub fn applies_to(self, stat_type: StatType) -> bool {
        match self {
            Metric::Games => true,
            Metric::AtBats | Metric::Hits | Metric::HomeRuns => stat_type == StatType::Batting,
            Metric::Innings | Metric::Strikeouts => stat_type == StatType::Pitching,
        }
    }

    /// Metrics valid for `stat_type`, in display order.
    pub fn for_stat_type(stat_type: StatType) -> Vec<Metric> {
        Metric::ALL
            .into_iter()
            .filter(|m| m.applies_to(stat_type))
            .collect()
    }

    pub fn param_name(self) -> &'static str {
        match self {
            Metric::Games => "min_games",
            Metric::AtBats => "min_at_bats",
            Metric::Hits => "min_hits",
            Metric::HomeRuns => "min_home_runs",
            Metric::Innings => "min_innings",
            Metric::Strikeouts => "min_strikeouts",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Metric::Games => "Min games",
            Metric::AtBats => "Min at-bats",
            Metric::Hits => "Min hits",
            Metric::HomeRuns => "Min home runs",
            Metric::Innings => "Min innings",
            Metric::Strikeouts => "Min strikeouts",
        }
    }

    /// Innings are the only fractional threshold.
    pub fn allows_fraction(self) -> bool {
        self == Metric::Innings
    }
}

// ---------------------------------------------------------------------------
// DateRange
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DateRangeError {
    #[error("start date {start} is after end date {end}")]
    Inverted { start: NaiveDate, end: NaiveDate },
}

/// Inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DateRangeError> {
        if start > end {
            return Err(DateRangeError::Inverted { start, end });
        }
        Ok(DateRange { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }
}

// ---------------------------------------------------------------------------
// FilterCriteria
// ---------------------------------------------------------------------------

/// User-selected constraints for one statistics request.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterCriteria {
    pub stat_type: StatType,
    pub season: Option<i32>,
    pub team: Option<String>,
    pub date_range: Option<DateRange>,
    pub minimum_thresholds: BTreeMap<Metric, f64>,
}

impl FilterCriteria {
    /// Criteria with no constraints: the initial-load and reset request.
    pub fn unfiltered(stat_type: StatType) -> Self {
        FilterCriteria {
            stat_type,
            ..Default::default()
        }
    }

    /// Thresholds that apply to the selected stat type and actually
    /// constrain something. Keys for the other stat type and non-positive
    /// minimums are ignored here rather than rejected.
    pub fn effective_thresholds(&self) -> impl Iterator<Item = (Metric, f64)> + '_ {
        self.minimum_thresholds
            .iter()
            .filter(|(metric, value)| metric.applies_to(self.stat_type) && **value > 0.0)
            .map(|(metric, value)| (*metric, *value))
    }

    /// Parameters for `GET /stats/{type}`. The stat type travels in the path.
    pub fn to_query_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(season) = self.season {
            params.push(("season".to_string(), season.to_string()));
        }
        if let Some(team) = self.team.as_deref().filter(|t| !t.trim().is_empty()) {
            params.push(("team".to_string(), team.trim().to_string()));
        }
        for (metric, value) in self.effective_thresholds() {
            params.push((metric.param_name().to_string(), format_threshold(value)));
        }
        params
    }

    /// Parameters for the generic `GET /statistics` and
    /// `GET /statistics/export` endpoints, which also take a date range.
    pub fn to_generic_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("stat_type".to_string(), self.stat_type.as_str().to_string())];
        params.extend(self.to_query_params());
        if let Some(range) = self.date_range {
            params.push((
                "start_date".to_string(),
                range.start().format(DATE_FORMAT).to_string(),
            ));
            params.push((
                "end_date".to_string(),
                range.end().format(DATE_FORMAT).to_string(),
            ));
        }
        params
    }
}

/// Whole numbers go out without a decimal point (`30`, not `30.0`).
pub fn format_threshold(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn param_names(params: &[(String, String)]) -> Vec<&str> {
        params.iter().map(|(k, _)| k.as_str()).collect()
    }

    #[test]
    fn batting_example_requests_only_batting_params() {
        let mut criteria = FilterCriteria::unfiltered(StatType::Batting);
        criteria.season = Some(2023);
        criteria.minimum_thresholds.insert(Metric::HomeRuns, 30.0);

        let params = criteria.to_query_params();
        assert_eq!(
            params,
            vec![
                ("season".to_string(), "2023".to_string()),
                ("min_home_runs".to_string(), "30".to_string()),
            ]
        );
    }

    #[test]
    fn pitching_thresholds_never_sent_for_batting() {
        let mut criteria = FilterCriteria::unfiltered(StatType::Batting);
        criteria.minimum_thresholds.insert(Metric::Innings, 100.0);
        criteria.minimum_thresholds.insert(Metric::Strikeouts, 150.0);
        criteria.minimum_thresholds.insert(Metric::Hits, 120.0);

        let params = criteria.to_query_params();
        let names = param_names(&params);
        assert_eq!(names, vec!["min_hits"]);
    }

    #[test]
    fn batting_thresholds_never_sent_for_pitching() {
        let mut criteria = FilterCriteria::unfiltered(StatType::Pitching);
        for metric in Metric::ALL {
            criteria.minimum_thresholds.insert(metric, 10.0);
        }
        let params = criteria.to_query_params();
        for (name, _) in &params {
            assert!(
                ["min_games", "min_innings", "min_strikeouts"].contains(&name.as_str()),
                "unexpected param {name}"
            );
        }
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn every_metric_filtered_for_every_stat_type() {
        for stat_type in [StatType::Batting, StatType::Pitching] {
            let mut criteria = FilterCriteria::unfiltered(stat_type);
            for metric in Metric::ALL {
                criteria.minimum_thresholds.insert(metric, 5.0);
            }
            let sent: Vec<Metric> = criteria.effective_thresholds().map(|(m, _)| m).collect();
            assert_eq!(sent, Metric::for_stat_type(stat_type));
        }
    }

    #[test]
    fn zero_threshold_is_no_constraint() {
        let mut criteria = FilterCriteria::unfiltered(StatType::Batting);
        criteria.minimum_thresholds.insert(Metric::HomeRuns, 0.0);
        assert!(criteria.to_query_params().is_empty());
    }

    #[test]
    fn unfiltered_sends_no_params() {
        assert!(FilterCriteria::unfiltered(StatType::Batting).to_query_params().is_empty());
        assert_eq!(
            FilterCriteria::unfiltered(StatType::Pitching).to_generic_params(),
            vec![("stat_type".to_string(), "pitching".to_string())]
        );
    }

    #[test]
    fn blank_team_is_omitted() {
        let mut criteria = FilterCriteria::unfiltered(StatType::Batting);
        criteria.team = Some("  ".into());
        assert!(criteria.to_query_params().is_empty());
        criteria.team = Some("NYY".into());
        assert_eq!(
            criteria.to_query_params(),
            vec![("team".to_string(), "NYY".to_string())]
        );
    }

    #[test]
    fn generic_params_include_dates() {
        let mut criteria = FilterCriteria::unfiltered(StatType::Batting);
        criteria.date_range = Some(
            DateRange::new(
                NaiveDate::from_ymd_opt(2023, 4, 1).unwrap(),
                NaiveDate::from_ymd_opt(2023, 9, 30).unwrap(),
            )
            .unwrap(),
        );
        let params = criteria.to_generic_params();
        assert!(params.contains(&("start_date".to_string(), "2023-04-01".to_string())));
        assert!(params.contains(&("end_date".to_string(), "2023-09-30".to_string())));
        assert_eq!(params[0], ("stat_type".to_string(), "batting".to_string()));
    }

    #[test]
    fn inverted_date_range_rejected() {
        let start = NaiveDate::from_ymd_opt(2023, 9, 30).unwrap();
        let end = NaiveDate::from_ymd_opt(2023, 4, 1).unwrap();
        assert!(matches!(
            DateRange::new(start, end),
            Err(DateRangeError::Inverted { .. })
        ));
    }

    #[test]
    fn threshold_formatting() {
        assert_eq!(format_threshold(30.0), "30");
        assert_eq!(format_threshold(100.5), "100.5");
    }
}
