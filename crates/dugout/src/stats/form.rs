// Filter form model: the editable text behind the form widget.
//
// Holds raw user input and turns it into a complete `FilterCriteria` only on
// submit. Blank inputs become "no constraint"; switching stat type drops the
// thresholds that belong to the other type.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use thiserror::Error;

use super::filter::{DateRange, DateRangeError, FilterCriteria, Metric, DATE_FORMAT};
use super::record::Team;
use super::StatType;

/// Earliest season the backend could plausibly hold.
pub const FIRST_SEASON: i32 = 1871;
pub const LAST_SEASON: i32 = 2100;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormError {
    #[error("season must be a year between 1871 and 2100, got \"{0}\"")]
    InvalidSeason(String),

    #[error("{field} must be a date in YYYY-MM-DD form, got \"{value}\"")]
    InvalidDate { field: &'static str, value: String },

    #[error("both start and end dates are required for a date range")]
    IncompleteDateRange,

    #[error(transparent)]
    DateRange(#[from] DateRangeError),

    #[error("{metric} must be a non-negative number, got \"{value}\"")]
    InvalidThreshold { metric: &'static str, value: String },
}

/// A single editable row of the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    StatType,
    Season,
    Team,
    StartDate,
    EndDate,
    Threshold(Metric),
}

impl FormField {
    pub fn label(self) -> &'static str {
        match self {
            FormField::StatType => "Stat type",
            FormField::Season => "Season",
            FormField::Team => "Team",
            FormField::StartDate => "Start date",
            FormField::EndDate => "End date",
            FormField::Threshold(metric) => metric.label(),
        }
    }

    /// Selector fields change with Left/Right instead of typed text.
    pub fn is_selector(self) -> bool {
        matches!(self, FormField::StatType | FormField::Team)
    }

    fn accepts(self, c: char) -> bool {
        match self {
            FormField::StatType | FormField::Team => false,
            FormField::Season => c.is_ascii_digit(),
            FormField::StartDate | FormField::EndDate => c.is_ascii_digit() || c == '-',
            FormField::Threshold(metric) => {
                c.is_ascii_digit() || (c == '.' && metric.allows_fraction())
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FilterForm {
    stat_type: StatType,
    season: String,
    teams: Vec<Team>,
    team_index: Option<usize>,
    start_date: String,
    end_date: String,
    thresholds: BTreeMap<Metric, String>,
    focus: usize,
}

impl FilterForm {
    pub fn stat_type(&self) -> StatType {
        self.stat_type
    }

    /// Visible rows in order. Threshold rows depend on the stat type.
    pub fn fields(&self) -> Vec<FormField> {
        let mut fields = vec![
            FormField::StatType,
            FormField::Season,
            FormField::Team,
            FormField::StartDate,
            FormField::EndDate,
        ];
        fields.extend(
            Metric::for_stat_type(self.stat_type)
                .into_iter()
                .map(FormField::Threshold),
        );
        fields
    }

    pub fn focus_index(&self) -> usize {
        self.focus
    }

    pub fn focused(&self) -> FormField {
        let fields = self.fields();
        fields[self.focus.min(fields.len() - 1)]
    }

    pub fn focus_next(&mut self) {
        let len = self.fields().len();
        self.focus = (self.focus + 1) % len;
    }

    pub fn focus_prev(&mut self) {
        let len = self.fields().len();
        self.focus = (self.focus + len - 1) % len;
    }

    /// Switch stat type, discarding thresholds that do not apply to it.
    pub fn set_stat_type(&mut self, stat_type: StatType) {
        if stat_type == self.stat_type {
            return;
        }
        self.stat_type = stat_type;
        self.thresholds.retain(|metric, _| metric.applies_to(stat_type));
        self.focus = self.focus.min(self.fields().len() - 1);
    }

    /// Replace the team list, keeping the current selection when that team
    /// is still present.
    pub fn set_teams(&mut self, teams: Vec<Team>) {
        let selected_id = self.selected_team().map(|t| t.id);
        self.team_index = selected_id.and_then(|id| teams.iter().position(|t| t.id == id));
        self.teams = teams;
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn selected_team(&self) -> Option<&Team> {
        self.team_index.and_then(|i| self.teams.get(i))
    }

    /// Step through "any team" followed by each known team.
    pub fn cycle_team(&mut self, forward: bool) {
        if self.teams.is_empty() {
            self.team_index = None;
            return;
        }
        let last = self.teams.len() - 1;
        self.team_index = match (self.team_index, forward) {
            (None, true) => Some(0),
            (None, false) => Some(last),
            (Some(i), true) if i < last => Some(i + 1),
            (Some(i), false) if i > 0 => Some(i - 1),
            _ => None,
        };
    }

    /// Left/Right on the focused selector.
    pub fn cycle_selector(&mut self, forward: bool) {
        match self.focused() {
            FormField::StatType => self.set_stat_type(self.stat_type.toggled()),
            FormField::Team => self.cycle_team(forward),
            _ => {}
        }
    }

    /// Append a typed character to the focused text field. Characters the
    /// field can never accept are dropped.
    pub fn insert_char(&mut self, c: char) {
        let field = self.focused();
        if !field.accepts(c) {
            return;
        }
        if let Some(buf) = self.buffer_mut(field) {
            buf.push(c);
        }
    }

    pub fn backspace(&mut self) {
        let field = self.focused();
        if let Some(buf) = self.buffer_mut(field) {
            buf.pop();
        }
    }

    /// Directly set a text field (used by tests and paste).
    pub fn set_text(&mut self, field: FormField, value: &str) {
        if let FormField::Threshold(metric) = field {
            if !metric.applies_to(self.stat_type) {
                return;
            }
        }
        if let Some(buf) = self.buffer_mut(field) {
            *buf = value.chars().filter(|c| field.accepts(*c)).collect();
        }
    }

    /// Current display text of a field.
    pub fn text(&self, field: FormField) -> String {
        match field {
            FormField::StatType => self.stat_type.label().to_string(),
            FormField::Team => self
                .selected_team()
                .map_or_else(|| "Any".to_string(), |t| t.filter_value().to_string()),
            FormField::Season => self.season.clone(),
            FormField::StartDate => self.start_date.clone(),
            FormField::EndDate => self.end_date.clone(),
            FormField::Threshold(metric) => {
                self.thresholds.get(&metric).cloned().unwrap_or_default()
            }
        }
    }

    fn buffer_mut(&mut self, field: FormField) -> Option<&mut String> {
        match field {
            FormField::StatType | FormField::Team => None,
            FormField::Season => Some(&mut self.season),
            FormField::StartDate => Some(&mut self.start_date),
            FormField::EndDate => Some(&mut self.end_date),
            FormField::Threshold(metric) => Some(self.thresholds.entry(metric).or_default()),
        }
    }

    /// Clear every input back to the initial state. The team list is kept.
    pub fn reset(&mut self) {
        let teams = std::mem::take(&mut self.teams);
        *self = FilterForm {
            teams,
            ..FilterForm::default()
        };
    }

    /// Validate the inputs and build the criteria to request.
    pub fn submit(&self) -> Result<FilterCriteria, FormError> {
        let season = match self.season.trim() {
            "" => None,
            s => {
                let year: i32 = s
                    .parse()
                    .map_err(|_| FormError::InvalidSeason(s.to_string()))?;
                if !(FIRST_SEASON..=LAST_SEASON).contains(&year) {
                    return Err(FormError::InvalidSeason(s.to_string()));
                }
                Some(year)
            }
        };

        let start = parse_date("start date", &self.start_date)?;
        let end = parse_date("end date", &self.end_date)?;
        let date_range = match (start, end) {
            (None, None) => None,
            (Some(start), Some(end)) => Some(DateRange::new(start, end)?),
            _ => return Err(FormError::IncompleteDateRange),
        };

        let mut minimum_thresholds = BTreeMap::new();
        for (metric, raw) in &self.thresholds {
            if !metric.applies_to(self.stat_type) {
                continue;
            }
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }
            let value: f64 = raw.parse().map_err(|_| FormError::InvalidThreshold {
                metric: metric.label(),
                value: raw.to_string(),
            })?;
            if !value.is_finite() || value < 0.0 {
                return Err(FormError::InvalidThreshold {
                    metric: metric.label(),
                    value: raw.to_string(),
                });
            }
            // A zero minimum constrains nothing.
            if value > 0.0 {
                minimum_thresholds.insert(*metric, value);
            }
        }

        Ok(FilterCriteria {
            stat_type: self.stat_type,
            season,
            team: self.selected_team().map(|t| t.filter_value().to_string()),
            date_range,
            minimum_thresholds,
        })
    }
}

fn parse_date(field: &'static str, raw: &str) -> Result<Option<NaiveDate>, FormError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map(Some)
        .map_err(|_| FormError::InvalidDate {
            field,
            value: raw.to_string(),
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
