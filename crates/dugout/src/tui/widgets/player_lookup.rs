// Player lookup pane: query line plus suggestion/search results.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use super::border_style;
use crate::api::MIN_LOOKUP_CHARS;
use crate::stats::record::PlayerSummary;
use crate::tui::{FocusPane, ViewState};

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let focused = state.focus == FocusPane::Lookup;
    let mut lines = vec![Line::from(vec![
        Span::styled("Find: ", Style::default().fg(Color::Gray)),
        Span::styled(
            format!("{}_", state.lookup_query),
            Style::default().fg(Color::White),
        ),
    ])];
    lines.push(Line::from(""));

    if state.lookup_query.trim().chars().count() < MIN_LOOKUP_CHARS {
        lines.push(Line::from(Span::styled(
            format!("Type at least {MIN_LOOKUP_CHARS} characters"),
            Style::default().fg(Color::DarkGray),
        )));
    } else if state.lookup_results.is_empty() {
        lines.push(Line::from(Span::styled(
            "No matches (Enter for full search)",
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        lines.extend(
            state
                .lookup_results
                .iter()
                .enumerate()
                .map(|(i, p)| result_line(p, state.lookup_selected == Some(i))),
        );
    }

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style(focused))
            .title("Player Lookup (Up/Down select, Enter open/search)"),
    );
    frame.render_widget(paragraph, area);
}

pub fn result_line(player: &PlayerSummary, selected: bool) -> Line<'static> {
    let style = if selected {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };
    let team = player.team.as_deref().unwrap_or("--");
    let position = player.position.as_deref().unwrap_or("--");
    Line::from(Span::styled(
        format!("{:<24} {:<5} {}", player.name, team, position),
        style,
    ))
}
