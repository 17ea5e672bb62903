// TUI widget modules for each dashboard panel.

pub mod error_banner;
pub mod filter_form;
pub mod help_bar;
pub mod nl_search;
pub mod player_detail;
pub mod player_lookup;
pub mod stats_table;
pub mod status_bar;

use ratatui::style::{Color, Style};

/// Border style for a pane, highlighted when it has focus.
pub fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}
