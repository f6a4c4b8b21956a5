use chrono::{DateTime, Local};
use std::time::Duration;

use crate::domain::email::EmailSummary;
use crate::mail::provider::ProviderError;
use crate::terminal::events::Command;
use crate::terminal::list::EmailList;
use crate::terminal::ui::{detail_body_width, wrapped_rows};

/// Rows taken by the list screen around the list itself
/// (title, spacer, status line, help bar).
pub const LIST_CHROME_ROWS: u16 = 4;
/// Rows taken by the detail screen around the body.
pub const DETAIL_CHROME_ROWS: u16 = 12;

pub const SPINNER_FRAMES: &[&str] = &["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    List,
    Detail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Spinner {
    pub frame: usize,
    /// A `SpinnerTick` is scheduled.
    pub running: bool,
}

impl Spinner {
    pub fn glyph(&self) -> &'static str {
        SPINNER_FRAMES[self.frame % SPINNER_FRAMES.len()]
    }
}

/// Everything the renderer reads. Only the reducer mutates it.
#[derive(Debug)]
pub struct ViewState {
    pub mode: ViewMode,
    pub list: EmailList,

    /// Summary captured on `enter` while its body is being fetched.
    pub pending: Option<EmailSummary>,
    /// Set exactly while `mode == Detail`.
    pub current_email: Option<EmailSummary>,
    /// A mark-all-read is in flight.
    pub marking: bool,
    pub email_body: String,
    pub body_scroll: u16,

    pub loading: bool,
    pub last_refresh: DateTime<Local>,
    pub last_error: Option<ProviderError>,

    pub viewport: Viewport,
    pub spinner: Spinner,
    pub refresh_every: Duration,
}

impl ViewState {
    pub fn new(viewport: Viewport, refresh_every: Duration, now: DateTime<Local>) -> Self {
        let mut s = Self {
            mode: ViewMode::List,
            list: EmailList::new(),
            pending: None,
            current_email: None,
            marking: false,
            email_body: String::new(),
            body_scroll: 0,
            loading: true,
            last_refresh: now,
            last_error: None,
            viewport: Viewport::default(),
            spinner: Spinner::default(),
            refresh_every,
        };
        s.resize(viewport.width, viewport.height);
        s
    }

    pub fn emails(&self) -> &[EmailSummary] {
        self.list.items()
    }

    /// Issue a list fetch. Manual refreshes show the loading screen,
    /// background polls do not.
    pub fn begin_refresh(&mut self, show_loading: bool) -> Command {
        if show_loading {
            self.loading = true;
        }
        Command::FetchList
    }

    pub fn open_selected(&mut self) -> Option<Command> {
        if self.loading {
            return None;
        }
        let selected = self.list.selected()?.clone();
        let index = selected.index;
        self.pending = Some(selected);
        self.loading = true;
        Some(Command::FetchBody(index))
    }

    pub fn begin_mark_all(&mut self) -> Option<Command> {
        if self.loading || self.list.is_empty() {
            return None;
        }
        self.loading = true;
        self.marking = true;
        Some(Command::MarkAllRead)
    }

    pub fn apply_list(
        &mut self,
        result: Result<Vec<EmailSummary>, ProviderError>,
        at: DateTime<Local>,
    ) {
        self.last_refresh = at;
        match result {
            Ok(items) => {
                self.list.set_items(items);
                self.last_error = None;
            }
            Err(e) => self.last_error = Some(e),
        }
        // a body fetch or mark-all still in flight keeps input blocked
        self.loading = self.pending.is_some() || self.marking;
    }

    pub fn apply_body(&mut self, result: Result<String, ProviderError>) {
        self.loading = self.marking;
        let pending = self.pending.take();
        match result {
            Ok(body) => {
                if let Some(email) = pending {
                    self.current_email = Some(email);
                    self.email_body = body;
                    self.mode = ViewMode::Detail;
                    self.body_scroll = 0;
                    self.last_error = None;
                }
            }
            Err(e) => self.last_error = Some(e),
        }
    }

    /// Always follows up with a list refresh, even on failure.
    pub fn apply_mark_all(&mut self, result: Result<(), ProviderError>) -> Command {
        self.marking = false;
        if let Err(e) = result {
            self.last_error = Some(e);
        }
        self.begin_refresh(true)
    }

    pub fn close_email(&mut self) {
        self.mode = ViewMode::List;
        self.current_email = None;
        self.email_body.clear();
        self.body_scroll = 0;
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.viewport = Viewport { width, height };
        self.list.set_height(height.saturating_sub(LIST_CHROME_ROWS));
        self.body_scroll = self.body_scroll.min(self.max_body_scroll());
    }

    pub fn scroll_body(&mut self, delta: i32) {
        if self.mode != ViewMode::Detail {
            return;
        }
        let next = (i32::from(self.body_scroll) + delta).max(0);
        let next = u16::try_from(next).unwrap_or(u16::MAX);
        self.body_scroll = next.min(self.max_body_scroll());
    }

    pub fn scroll_body_to_end(&mut self) {
        self.body_scroll = self.max_body_scroll();
    }

    pub fn body_view_height(&self) -> u16 {
        self.viewport.height.saturating_sub(DETAIL_CHROME_ROWS).max(1)
    }

    fn max_body_scroll(&self) -> u16 {
        let rows = wrapped_rows(&self.email_body, detail_body_width(self.viewport.width));
        let visible = usize::from(self.body_view_height());
        u16::try_from(rows.saturating_sub(visible)).unwrap_or(u16::MAX)
    }

    /// Schedule a spinner frame unless one is already scheduled.
    pub fn start_spinner(&mut self) -> Option<Command> {
        if self.spinner.running {
            return None;
        }
        self.spinner.running = true;
        Some(Command::ScheduleSpinner)
    }

    pub fn spinner_tick(&mut self) -> Option<Command> {
        if !self.loading {
            self.spinner.running = false;
            return None;
        }
        self.spinner.frame = self.spinner.frame.wrapping_add(1);
        Some(Command::ScheduleSpinner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(index: usize) -> EmailSummary {
        EmailSummary {
            sender: "someone@example.com".into(),
            subject: format!("subject {index}"),
            date: String::new(),
            index,
        }
    }

    fn state() -> ViewState {
        ViewState::new(
            Viewport {
                width: 80,
                height: 24,
            },
            Duration::from_secs(10),
            Local::now(),
        )
    }

    #[test]
    fn starts_loading_in_list_mode() {
        let s = state();
        assert!(s.loading);
        assert_eq!(s.mode, ViewMode::List);
        assert!(s.emails().is_empty());
        assert!(s.current_email.is_none());
    }

    #[test]
    fn refresh_loading_flag_follows_call_site() {
        let mut s = state();
        s.loading = false;
        assert_eq!(s.begin_refresh(false), Command::FetchList);
        assert!(!s.loading);
        assert_eq!(s.begin_refresh(true), Command::FetchList);
        assert!(s.loading);
    }

    #[test]
    fn list_result_keeps_loading_while_body_pending() {
        let mut s = state();
        s.apply_list(Ok(vec![summary(1), summary(2)]), Local::now());
        assert!(!s.loading);
        assert!(s.open_selected().is_some());
        s.apply_list(Ok(vec![summary(1)]), Local::now());
        assert!(s.loading);
        s.apply_body(Ok("hi".into()));
        assert!(!s.loading);
        assert_eq!(s.mode, ViewMode::Detail);
    }

    #[test]
    fn body_without_pending_summary_is_ignored() {
        let mut s = state();
        s.loading = false;
        s.apply_body(Ok("orphan".into()));
        assert_eq!(s.mode, ViewMode::List);
        assert!(s.current_email.is_none());
    }

    #[test]
    fn body_scroll_is_clamped() {
        let mut s = state();
        s.apply_list(Ok(vec![summary(1)]), Local::now());
        s.open_selected();
        let body: Vec<String> = (0..40).map(|i| format!("line {i}")).collect();
        s.apply_body(Ok(body.join("\n")));

        // 24 rows leave 12 for the body
        s.scroll_body(-3);
        assert_eq!(s.body_scroll, 0);
        s.scroll_body(100);
        assert_eq!(s.body_scroll, 28);

        s.resize(80, 44);
        assert_eq!(s.body_scroll, 8);
    }

    #[test]
    fn word_wrapped_body_scrolls_to_the_last_row() {
        let mut s = state();
        s.resize(22, 24);
        s.apply_list(Ok(vec![summary(1)]), Local::now());
        s.open_selected();
        let mut lines = vec!["aaaaaaa bbbbbbb ccccccc"; 11];
        lines.push("aaaaaaa bbbbbbb zzzzzzz");
        s.apply_body(Ok(lines.join("\n")));

        // 14 columns wrap every line onto 3 rows; 12 rows are visible
        s.scroll_body_to_end();
        assert_eq!(s.body_scroll, 24);
    }

    #[test]
    fn mark_all_in_flight_keeps_loading_across_list_results() {
        let mut s = state();
        s.apply_list(Ok(vec![summary(1), summary(2)]), Local::now());
        assert_eq!(s.begin_mark_all(), Some(Command::MarkAllRead));
        s.apply_list(Ok(vec![summary(1), summary(2)]), Local::now());
        assert!(s.loading);
        assert_eq!(s.begin_mark_all(), None);

        s.apply_mark_all(Ok(()));
        assert!(!s.marking);
        s.apply_list(Ok(vec![]), Local::now());
        assert!(!s.loading);
    }

    #[test]
    fn spinner_runs_only_while_loading() {
        let mut s = state();
        assert_eq!(s.start_spinner(), Some(Command::ScheduleSpinner));
        assert_eq!(s.start_spinner(), None);
        assert_eq!(s.spinner_tick(), Some(Command::ScheduleSpinner));
        assert_eq!(s.spinner.frame, 1);
        s.loading = false;
        assert_eq!(s.spinner_tick(), None);
        assert!(!s.spinner.running);
        assert_eq!(s.start_spinner(), Some(Command::ScheduleSpinner));
    }
}
