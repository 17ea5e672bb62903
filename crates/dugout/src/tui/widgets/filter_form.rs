// Filter form widget: one line per field, the focused line highlighted.
//
// Selector fields render as `< value >`; text fields show a cursor while
// focused. Blank text fields show `any`.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use super::border_style;
use crate::stats::form::{FilterForm, FormField};
use crate::tui::{FocusPane, ViewState};

const LABEL_WIDTH: usize = 15;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let focused_pane = state.focus == FocusPane::Form;
    let lines = form_lines(&state.form, focused_pane);

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style(focused_pane))
            .title("Filters (Enter apply, Ctrl+R reset)"),
    );
    frame.render_widget(paragraph, area);
}

/// Build the form lines. The focused field is only highlighted while the
/// form pane has focus.
pub fn form_lines(form: &FilterForm, focused_pane: bool) -> Vec<Line<'static>> {
    let focused_field = form.focused();
    form.fields()
        .into_iter()
        .map(|field| {
            let is_focused = focused_pane && field == focused_field;
            let label = format!("{:<width$}", field.label(), width = LABEL_WIDTH);
            let value = display_value(form, field, is_focused);

            let value_style = if is_focused {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            Line::from(vec![
                Span::styled(label, Style::default().fg(Color::Gray)),
                Span::styled(value, value_style),
            ])
        })
        .collect()
}

fn display_value(form: &FilterForm, field: FormField, focused: bool) -> String {
    let text = form.text(field);
    if field.is_selector() {
        return format!("< {text} >");
    }
    match (text.is_empty(), focused) {
        (_, true) => format!("{text}_"),
        (true, false) => "any".to_string(),
        (false, false) => text,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
