// Player detail popup: one row per season under the stat type's schema.

use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Row, Table};
use ratatui::Frame;

use super::stats_table::column_widths;
use crate::stats::columns::{Column, ColumnSpec};
use crate::stats::record::PlayerDetail;
use crate::stats::StatType;

/// Schema for a single player's lines: season first, without the columns
/// that repeat the player's own identity.
pub fn detail_columns(stat_type: StatType) -> ColumnSpec {
    let mut columns = vec![Column::new("season", "Season", 6, None)];
    columns.extend(
        ColumnSpec::standard(stat_type)
            .columns()
            .iter()
            .filter(|c| c.field != "name")
            .cloned(),
    );
    ColumnSpec::new(columns)
}

pub fn render(frame: &mut Frame, area: Rect, detail: &PlayerDetail) {
    let spec = detail_columns(detail.stat_type);

    let header = Row::new(
        spec.labels()
            .into_iter()
            .map(|l| Cell::from(l.to_string()))
            .collect::<Vec<_>>(),
    )
    .style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = detail
        .stats
        .iter()
        .map(|record| Row::new(spec.format_row(record)))
        .collect();

    let player = &detail.player;
    let mut title = format!(" {} ", player.name);
    if let Some(team) = &player.team {
        title.push_str(&format!("| {team} "));
    }
    if let Some(position) = &player.position {
        title.push_str(&format!("| {position} "));
    }
    title.push_str(&format!("| {} (Esc to close) ", detail.stat_type.label()));

    let mut widths = column_widths(spec.columns());
    if widths.is_empty() {
        widths.push(Constraint::Min(1));
    }
    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(title),
    );

    frame.render_widget(Clear, area);
    frame.render_widget(table, area);
}
