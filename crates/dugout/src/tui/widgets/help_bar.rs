// Help bar: key hints for the focused pane.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::tui::{FocusPane, ViewState};

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let text = if state.detail.is_some() {
        " Esc:Close | Ctrl+C:Quit"
    } else {
        hints(state.focus)
    };
    let paragraph = Paragraph::new(Line::from(Span::styled(
        text,
        Style::default().fg(Color::White).add_modifier(Modifier::DIM),
    )))
    .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

pub fn hints(focus: FocusPane) -> &'static str {
    match focus {
        FocusPane::Form => {
            " Tab:Pane | Up/Down:Field | Left/Right:Select | Enter:Apply | Ctrl+R:Reset | Esc:Dismiss"
        }
        FocusPane::Table => {
            " Tab:Pane | j/k:Move | PgUp/PgDn:Page | d:Player | e:Export | E:Server export | q:Quit"
        }
        FocusPane::Search => " Tab:Pane | Enter:Run query | Esc:Dismiss | Ctrl+C:Quit",
        FocusPane::Lookup => " Tab:Pane | Up/Down:Select | Enter:Open/Search | Esc:Dismiss",
    }
}
