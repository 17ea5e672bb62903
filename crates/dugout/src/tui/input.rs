// Keyboard input handling and command dispatch.
//
// Translates crossterm key events into UserCommand messages for the
// controller, or into local ViewState mutations (focus, selection, typing).

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::{FocusPane, ViewState};
use crate::api::MIN_LOOKUP_CHARS;
use crate::protocol::UserCommand;
use crate::stats::StatType;

/// Rows moved by PageUp/PageDown in the results table.
pub const PAGE_SIZE: usize = 10;

/// Handle a keyboard event.
///
/// Returns `Some(UserCommand)` when the key press should be forwarded to the
/// controller, `None` when it was handled locally.
pub fn handle_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    // crossterm on Windows reports both press and release.
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    let ctrl = key_event.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && key_event.code == KeyCode::Char('c') {
        return Some(UserCommand::Quit);
    }

    if key_event.code == KeyCode::Esc {
        return handle_escape(view_state);
    }

    // The detail popup is modal.
    if view_state.detail.is_some() {
        return None;
    }

    match key_event.code {
        KeyCode::Tab => {
            view_state.focus = view_state.focus.next();
            return None;
        }
        KeyCode::BackTab => {
            view_state.focus = view_state.focus.prev();
            return None;
        }
        _ => {}
    }

    match view_state.focus {
        FocusPane::Form => handle_form(key_event, ctrl, view_state),
        FocusPane::Table => handle_table(key_event, view_state),
        FocusPane::Search => handle_search(key_event, view_state),
        FocusPane::Lookup => handle_lookup(key_event, view_state),
    }
}

/// Esc closes the popup first, then dismisses the banner.
fn handle_escape(view_state: &mut ViewState) -> Option<UserCommand> {
    if view_state.detail.take().is_some() {
        return None;
    }
    view_state.notice = None;
    if view_state.form_error.take().is_some() {
        return None;
    }
    view_state
        .snapshot
        .error
        .is_some()
        .then_some(UserCommand::DismissError)
}

fn handle_form(key_event: KeyEvent, ctrl: bool, view_state: &mut ViewState) -> Option<UserCommand> {
    let form = &mut view_state.form;
    match key_event.code {
        KeyCode::Char('r') if ctrl => {
            form.reset();
            view_state.form_error = None;
            Some(UserCommand::ResetFilters)
        }
        KeyCode::Up => {
            form.focus_prev();
            None
        }
        KeyCode::Down => {
            form.focus_next();
            None
        }
        KeyCode::Left => {
            form.cycle_selector(false);
            None
        }
        KeyCode::Right => {
            form.cycle_selector(true);
            None
        }
        KeyCode::Backspace => {
            form.backspace();
            None
        }
        KeyCode::Enter => match form.submit() {
            Ok(criteria) => {
                view_state.form_error = None;
                Some(UserCommand::SubmitFilter(criteria))
            }
            Err(e) => {
                view_state.form_error = Some(e.to_string());
                None
            }
        },
        KeyCode::Char(c) if !ctrl => {
            form.insert_char(c);
            None
        }
        _ => None,
    }
}

fn handle_table(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Down | KeyCode::Char('j') => {
            view_state.move_selection(1);
            None
        }
        KeyCode::Up | KeyCode::Char('k') => {
            view_state.move_selection(-1);
            None
        }
        KeyCode::PageDown => {
            view_state.move_selection(PAGE_SIZE as isize);
            None
        }
        KeyCode::PageUp => {
            view_state.move_selection(-(PAGE_SIZE as isize));
            None
        }
        KeyCode::Char('e') => Some(UserCommand::ExportTable),
        KeyCode::Char('E') => Some(UserCommand::ExportServer),
        KeyCode::Char('d') | KeyCode::Enter => view_state
            .selected_player()
            .map(|player_id| UserCommand::OpenPlayer {
                player_id,
                stat_type: None,
            }),
        KeyCode::Char('q') => Some(UserCommand::Quit),
        _ => None,
    }
}

fn handle_search(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Char(c) => {
            view_state.search_text.push(c);
            None
        }
        KeyCode::Backspace => {
            view_state.search_text.pop();
            None
        }
        KeyCode::Enter => {
            let text = view_state.search_text.trim();
            if text.is_empty() {
                None
            } else {
                Some(UserCommand::NaturalLanguageQuery(text.to_string()))
            }
        }
        _ => None,
    }
}

fn handle_lookup(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Char(c) => {
            view_state.lookup_query.push(c);
            lookup_changed(view_state)
        }
        KeyCode::Backspace => {
            view_state.lookup_query.pop();
            lookup_changed(view_state)
        }
        KeyCode::Down => {
            let len = view_state.lookup_results.len();
            if len > 0 {
                view_state.lookup_selected = Some(match view_state.lookup_selected {
                    None => 0,
                    Some(i) => (i + 1).min(len - 1),
                });
            }
            None
        }
        KeyCode::Up => {
            view_state.lookup_selected = match view_state.lookup_selected {
                Some(0) | None => None,
                Some(i) => Some(i - 1),
            };
            None
        }
        KeyCode::Enter => match view_state.lookup_selected {
            Some(i) => view_state
                .lookup_results
                .get(i)
                .map(|p| UserCommand::OpenPlayer {
                    player_id: p.id,
                    stat_type: p.position.as_deref().map(StatType::for_position),
                }),
            None => {
                let query = view_state.lookup_query.trim();
                if query.is_empty() {
                    None
                } else {
                    Some(UserCommand::SearchPlayers(query.to_string()))
                }
            }
        },
        _ => None,
    }
}

/// Typing in the lookup box asks for suggestions once the query is long
/// enough; shorter input clears the list.
fn lookup_changed(view_state: &mut ViewState) -> Option<UserCommand> {
    view_state.lookup_selected = None;
    let query = view_state.lookup_query.trim();
    if query.chars().count() < MIN_LOOKUP_CHARS {
        view_state.lookup_results.clear();
        return None;
    }
    Some(UserCommand::SuggestPlayers(query.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
