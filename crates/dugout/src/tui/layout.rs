// Screen layout: panel arrangement and sizing.
//
// +--------------------------------------------------+
// | Status Bar (1 row)                               |
// +--------------------------------------------------+
// | Error Banner (3 rows, only while an error shows) |
// +----------------+---------------------------------+
// | Filter Form    | Results Table / Player Lookup   |
// | (34 cols)      |                                 |
// +----------------+---------------------------------+
// | NL Search (3 rows)                               |
// +--------------------------------------------------+
// | Help Bar (1 row)                                 |
// +--------------------------------------------------+

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Width of the filter form column.
pub const FORM_WIDTH: u16 = 34;

#[derive(Debug, Clone)]
pub struct AppLayout {
    pub status_bar: Rect,
    pub error_banner: Option<Rect>,
    pub filter_form: Rect,
    /// Results table, or the player lookup pane while it has focus.
    pub results: Rect,
    pub search: Rect,
    pub help_bar: Rect,
}

pub fn build_layout(area: Rect, show_banner: bool) -> AppLayout {
    let banner_height = if show_banner { 3 } else { 0 };
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(banner_height),
            Constraint::Min(6),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(FORM_WIDTH), Constraint::Min(20)])
        .split(vertical[2]);

    AppLayout {
        status_bar: vertical[0],
        error_banner: show_banner.then_some(vertical[1]),
        filter_form: horizontal[0],
        results: horizontal[1],
        search: vertical[3],
        help_bar: vertical[4],
    }
}

/// A rectangle of `percent_x` by `percent_y` centered in `area`.
pub fn centered(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
