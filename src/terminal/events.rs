use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::{debug, warn};

use crate::domain::email::{EmailSummary, ProviderIndex};
use crate::mail::provider::ProviderError;
use crate::terminal::state::{ViewMode, ViewState};

/// Everything the main loop reacts to, funnelled through one channel.
#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize { width: u16, height: u16 },
    /// Periodic refresh timer fired.
    Tick(DateTime<Local>),
    SpinnerTick,
    ListFetched {
        result: Result<Vec<EmailSummary>, ProviderError>,
        at: DateTime<Local>,
    },
    BodyFetched(Result<String, ProviderError>),
    MarkedAllRead(Result<(), ProviderError>),
}

/// Work requested by the reducer. Each one ends in exactly one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    FetchList,
    FetchBody(ProviderIndex),
    MarkAllRead,
    ScheduleTick,
    ScheduleSpinner,
    Quit,
}

/// Startup: load the list, start polling, animate while loading.
pub fn init(state: &mut ViewState) -> Vec<Command> {
    let mut cmds = vec![Command::FetchList, Command::ScheduleTick];
    cmds.extend(state.start_spinner());
    cmds
}

pub fn update(state: &mut ViewState, event: AppEvent) -> Vec<Command> {
    let mut cmds = match event {
        AppEvent::Key(key) => handle_key(key, state),

        AppEvent::Resize { width, height } => {
            state.resize(width, height);
            vec![]
        }

        AppEvent::Tick(_) => {
            debug!("refresh tick");
            vec![state.begin_refresh(false), Command::ScheduleTick]
        }

        AppEvent::SpinnerTick => state.spinner_tick().into_iter().collect(),

        AppEvent::ListFetched { result, at } => {
            match &result {
                Ok(items) => debug!("list fetched: {} unread", items.len()),
                Err(e) => warn!("list fetch failed: {e}"),
            }
            state.apply_list(result, at);
            vec![]
        }

        AppEvent::BodyFetched(result) => {
            if let Err(e) = &result {
                warn!("body fetch failed: {e}");
            }
            state.apply_body(result);
            vec![]
        }

        AppEvent::MarkedAllRead(result) => {
            if let Err(e) = &result {
                warn!("mark all read failed: {e}");
            }
            vec![state.apply_mark_all(result)]
        }
    };

    if state.loading {
        cmds.extend(state.start_spinner());
    }
    cmds
}

fn handle_key(key: KeyEvent, state: &mut ViewState) -> Vec<Command> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return vec![Command::Quit];
    }

    match state.mode {
        ViewMode::List => handle_list_keys(key, state),
        ViewMode::Detail => handle_detail_keys(key, state),
    }
}

fn handle_list_keys(key: KeyEvent, state: &mut ViewState) -> Vec<Command> {
    // typing a filter swallows every key
    if state.list.is_editing_filter() {
        state.list.handle_key(key);
        return vec![];
    }

    match key.code {
        KeyCode::Char('q') => vec![Command::Quit],
        KeyCode::Char('r') => vec![state.begin_refresh(true)],
        KeyCode::Char('a') => state.begin_mark_all().into_iter().collect(),
        KeyCode::Enter => state.open_selected().into_iter().collect(),
        _ => {
            state.list.handle_key(key);
            vec![]
        }
    }
}

fn handle_detail_keys(key: KeyEvent, state: &mut ViewState) -> Vec<Command> {
    let page = i32::from(state.body_view_height());
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => state.close_email(),
        // retry from the error panel
        KeyCode::Char('r') if state.last_error.is_some() => {
            return vec![state.begin_refresh(true)];
        }
        KeyCode::Down | KeyCode::Char('j') => state.scroll_body(1),
        KeyCode::Up | KeyCode::Char('k') => state.scroll_body(-1),
        KeyCode::PageDown | KeyCode::Char(' ') => state.scroll_body(page),
        KeyCode::PageUp => state.scroll_body(-page),
        KeyCode::Home | KeyCode::Char('g') => state.body_scroll = 0,
        KeyCode::End | KeyCode::Char('G') => state.scroll_body_to_end(),
        _ => {}
    }
    vec![]
}
