// Natural-language search box.

use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use super::border_style;
use crate::tui::{FocusPane, ViewState};

const PLACEHOLDER: &str = "e.g. top 10 home run hitters in 2023";

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let focused = state.focus == FocusPane::Search;
    let line = if state.search_text.is_empty() && !focused {
        Line::from(Span::styled(PLACEHOLDER, Style::default().fg(Color::DarkGray)))
    } else {
        let cursor = if focused { "_" } else { "" };
        Line::from(vec![
            Span::styled(state.search_text.clone(), Style::default().fg(Color::White)),
            Span::styled(cursor, Style::default().fg(Color::Cyan)),
        ])
    };

    let paragraph = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style(focused))
            .title("Ask (Enter to run)"),
    );
    frame.render_widget(paragraph, area);
}
