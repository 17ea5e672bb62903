// Results table widget: rows of the latest snapshot under its column schema.
//
// Column widths come from the schema, clamped so a query schema with wide
// pixel-style widths still fits a terminal. The selected row is highlighted
// while the table has focus.

use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Row, Table, TableState};
use ratatui::Frame;

use super::border_style;
use crate::protocol::{AppSnapshot, LoadStatus};
use crate::stats::columns::Column;
use crate::tui::{FocusPane, ViewState};

const MIN_WIDTH: u16 = 4;
const MAX_WIDTH: u16 = 24;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let snapshot = &state.snapshot;
    let focused = state.focus == FocusPane::Table;

    let header = Row::new(
        snapshot
            .columns
            .iter()
            .map(|c| Cell::from(c.label.clone()))
            .collect::<Vec<_>>(),
    )
    .style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = snapshot
        .rows
        .iter()
        .map(|row| Row::new(row.cells.iter().map(|c| Cell::from(c.clone())).collect::<Vec<_>>()))
        .collect();

    let table = Table::new(rows, column_widths(&snapshot.columns))
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style(focused))
                .title(title(snapshot)),
        )
        .row_highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol(">> ");

    let mut table_state = TableState::default();
    if focused && !snapshot.rows.is_empty() {
        table_state.select(Some(state.selected_row));
    }
    frame.render_stateful_widget(table, area, &mut table_state);
}

pub fn column_widths(columns: &[Column]) -> Vec<Constraint> {
    columns
        .iter()
        .map(|c| {
            let label = c.label.chars().count() as u16;
            Constraint::Length(c.width.max(label).clamp(MIN_WIDTH, MAX_WIDTH))
        })
        .collect()
}

pub fn title(snapshot: &AppSnapshot) -> String {
    let what = snapshot.stat_type.label();
    match snapshot.status {
        LoadStatus::Loading => format!("{what} (loading...)"),
        LoadStatus::Idle if snapshot.rows.is_empty() => format!("{what} (no data)"),
        _ => format!("{what} ({} rows)", snapshot.row_count()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
