// Terminal UI: layout, input handling, and widget rendering.
//
// The TUI owns a `ViewState` holding the form being edited plus the latest
// table snapshot from the controller. The controller pushes `UiUpdate`
// messages over an mpsc channel; the TUI applies them and redraws on a tick.

pub mod input;
pub mod layout;
pub mod widgets;

use std::time::Duration;

use anyhow::Context;
use crossterm::event::{Event, EventStream};
use futures_util::StreamExt;
use ratatui::Frame;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::protocol::{AppSnapshot, UiUpdate, UserCommand};
use crate::stats::form::FilterForm;
use crate::stats::record::{PlayerDetail, PlayerId, PlayerSummary};

use layout::build_layout;

// ---------------------------------------------------------------------------
// FocusPane
// ---------------------------------------------------------------------------

/// Pane receiving keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusPane {
    #[default]
    Form,
    Table,
    Search,
    Lookup,
}

impl FocusPane {
    const ORDER: [FocusPane; 4] = [
        FocusPane::Form,
        FocusPane::Table,
        FocusPane::Search,
        FocusPane::Lookup,
    ];

    fn index(self) -> usize {
        Self::ORDER.iter().position(|p| *p == self).unwrap_or(0)
    }

    pub fn next(self) -> FocusPane {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> FocusPane {
        Self::ORDER[(self.index() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }

    pub fn label(self) -> &'static str {
        match self {
            FocusPane::Form => "Filters",
            FocusPane::Table => "Results",
            FocusPane::Search => "Ask",
            FocusPane::Lookup => "Players",
        }
    }
}

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

/// TUI-local state read by `render_frame`.
#[derive(Debug, Default)]
pub struct ViewState {
    pub form: FilterForm,
    pub focus: FocusPane,
    /// Latest table state from the controller.
    pub snapshot: AppSnapshot,
    pub selected_row: usize,
    pub search_text: String,
    pub lookup_query: String,
    pub lookup_results: Vec<PlayerSummary>,
    pub lookup_selected: Option<usize>,
    /// Open player detail popup.
    pub detail: Option<PlayerDetail>,
    /// Validation error from the form; never reaches the controller.
    pub form_error: Option<String>,
    pub notice: Option<String>,
}

impl ViewState {
    pub fn apply_snapshot(&mut self, snapshot: AppSnapshot) {
        let rows = snapshot.rows.len();
        self.selected_row = self.selected_row.min(rows.saturating_sub(1));
        self.snapshot = snapshot;
    }

    /// Message for the error banner: a form error wins over a request error.
    pub fn banner(&self) -> Option<&str> {
        self.form_error
            .as_deref()
            .or(self.snapshot.error.as_deref())
    }

    pub fn move_selection(&mut self, delta: isize) {
        let rows = self.snapshot.rows.len();
        if rows == 0 {
            self.selected_row = 0;
            return;
        }
        let target = self.selected_row as isize + delta;
        self.selected_row = target.clamp(0, rows as isize - 1) as usize;
    }

    pub fn selected_player(&self) -> Option<PlayerId> {
        self.snapshot
            .rows
            .get(self.selected_row)
            .map(|row| row.player_id)
    }
}

// ---------------------------------------------------------------------------
// UiUpdate processing
// ---------------------------------------------------------------------------

pub fn apply_ui_update(state: &mut ViewState, update: UiUpdate) {
    match update {
        UiUpdate::Snapshot(snapshot) => state.apply_snapshot(*snapshot),
        UiUpdate::Teams(teams) => state.form.set_teams(teams),
        UiUpdate::Players(players) => {
            state.lookup_results = players;
            state.lookup_selected = None;
        }
        UiUpdate::PlayerDetail(detail) => state.detail = Some(*detail),
        UiUpdate::Notice(message) => state.notice = Some(message),
    }
}

// ---------------------------------------------------------------------------
// Render frame
// ---------------------------------------------------------------------------

pub fn render_frame(frame: &mut Frame, state: &ViewState) {
    let layout = build_layout(frame.area(), state.banner().is_some());

    widgets::status_bar::render(frame, layout.status_bar, state);
    if let (Some(area), Some(message)) = (layout.error_banner, state.banner()) {
        widgets::error_banner::render(frame, area, message);
    }
    widgets::filter_form::render(frame, layout.filter_form, state);
    if state.focus == FocusPane::Lookup {
        widgets::player_lookup::render(frame, layout.results, state);
    } else {
        widgets::stats_table::render(frame, layout.results, state);
    }
    widgets::nl_search::render(frame, layout.search, state);
    widgets::help_bar::render(frame, layout.help_bar, state);

    if let Some(detail) = &state.detail {
        widgets::player_detail::render(frame, layout::centered(frame.area(), 80, 60), detail);
    }
}

// ---------------------------------------------------------------------------
// Main TUI loop
// ---------------------------------------------------------------------------

/// Run the TUI event loop until the user quits or the controller goes away.
///
/// Restores the terminal on exit and on panic.
pub async fn run(
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
    tick: Duration,
) -> anyhow::Result<()> {
    let mut terminal = ratatui::init();

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = ratatui::restore();
        original_hook(panic_info);
    }));

    let mut view_state = ViewState::default();
    let mut event_stream = EventStream::new();
    let mut render_tick = tokio::time::interval(tick);
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let result = loop {
        tokio::select! {
            update = ui_rx.recv() => {
                match update {
                    Some(update) => apply_ui_update(&mut view_state, update),
                    None => {
                        info!("UI channel closed");
                        break Ok(());
                    }
                }
            }

            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) => {
                        if let Some(cmd) = input::handle_key(key_event, &mut view_state) {
                            let quit = cmd == UserCommand::Quit;
                            let _ = cmd_tx.send(cmd).await;
                            if quit {
                                break Ok(());
                            }
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!("Terminal input error: {}", e);
                        break Err(anyhow::Error::new(e).context("reading terminal input"));
                    }
                    None => break Ok(()),
                }
            }

            _ = render_tick.tick() => {
                if let Err(e) = terminal
                    .draw(|frame| render_frame(frame, &view_state))
                    .context("drawing frame")
                {
                    break Err(e);
                }
            }
        }
    };

    ratatui::restore();
    result
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
