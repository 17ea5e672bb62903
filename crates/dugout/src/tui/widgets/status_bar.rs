// Status bar widget: load status, stat type, schema and row count, focus.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::protocol::LoadStatus;
use crate::stats::columns::SchemaSource;
use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let snapshot = &state.snapshot;
    let (dot, dot_color) = status_indicator(snapshot.status);

    let mut spans = vec![
        Span::styled(format!(" {dot} "), Style::default().fg(dot_color)),
        Span::styled(
            snapshot.status.label(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Span::styled(" | ", Style::default().fg(Color::Gray)),
        Span::styled(
            schema_label(snapshot.schema_source),
            Style::default().fg(Color::White),
        ),
        Span::styled(" | ", Style::default().fg(Color::Gray)),
        Span::styled(
            format!("{} rows", snapshot.row_count()),
            Style::default().fg(Color::White),
        ),
        Span::styled(" | ", Style::default().fg(Color::Gray)),
        Span::styled(
            format!("[{}]", state.focus.label()),
            Style::default().fg(Color::Cyan),
        ),
    ];

    if let Some(notice) = &state.notice {
        spans.push(Span::styled("  ", Style::default()));
        spans.push(Span::styled(notice.clone(), Style::default().fg(Color::Green)));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, area);
}

pub fn status_indicator(status: LoadStatus) -> (&'static str, Color) {
    match status {
        LoadStatus::Idle => ("●", Color::Gray),
        LoadStatus::Loading => ("●", Color::Yellow),
        LoadStatus::Ready => ("●", Color::Green),
        LoadStatus::Error => ("●", Color::Red),
    }
}

pub fn schema_label(source: Option<SchemaSource>) -> String {
    match source {
        Some(SchemaSource::Standard(stat_type)) => stat_type.label().to_string(),
        Some(SchemaSource::Custom) => "Query result".to_string(),
        None => "No data".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
