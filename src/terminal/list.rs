use crossterm::event::{KeyCode, KeyEvent};
use ratatui::widgets::ListState;

use crate::domain::email::{EmailSummary, ListEntry};

/// Rows each entry occupies on screen (title, sender, spacer).
pub const ROWS_PER_ITEM: u16 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    Off,
    /// Query being typed; matches update live.
    Editing(String),
    Applied(String),
}

impl Filter {
    pub fn query(&self) -> Option<&str> {
        match self {
            Filter::Off => None,
            Filter::Editing(q) | Filter::Applied(q) => Some(q),
        }
    }
}

/// Unread list with selection and filtering.
#[derive(Debug, Default)]
pub struct EmailList {
    items: Vec<EmailSummary>,
    /// Positions in `items` that pass the filter, in order.
    visible: Vec<usize>,
    pub list_state: ListState,
    filter: Filter,
    page: usize,
}

impl EmailList {
    pub fn new() -> Self {
        Self {
            page: 1,
            ..Self::default()
        }
    }

    /// Replace the whole sequence. Selection is kept where possible and
    /// clamped to the new bounds.
    pub fn set_items(&mut self, items: Vec<EmailSummary>) {
        self.items = items;
        self.refilter();
    }

    pub fn items(&self) -> &[EmailSummary] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn visible(&self) -> impl Iterator<Item = &EmailSummary> {
        self.visible.iter().map(|&i| &self.items[i])
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.list_state.selected()
    }

    pub fn selected(&self) -> Option<&EmailSummary> {
        let idx = self.list_state.selected()?;
        self.visible.get(idx).map(|&i| &self.items[i])
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn is_editing_filter(&self) -> bool {
        matches!(self.filter, Filter::Editing(_))
    }

    /// Height in rows available to the list.
    pub fn set_height(&mut self, rows: u16) {
        self.page = usize::from((rows / ROWS_PER_ITEM).max(1));
    }

    pub fn move_selection(&mut self, delta: i32) {
        if self.visible.is_empty() {
            self.list_state.select(None);
            return;
        }
        let cur = self.list_state.selected().unwrap_or(0) as i32;
        let len = self.visible.len() as i32;
        let next = (cur + delta).clamp(0, len - 1) as usize;
        self.list_state.select(Some(next));
    }

    fn select_first(&mut self) {
        if !self.visible.is_empty() {
            self.list_state.select(Some(0));
        }
    }

    fn select_last(&mut self) {
        if !self.visible.is_empty() {
            self.list_state.select(Some(self.visible.len() - 1));
        }
    }

    /// Returns true when the key was used by the list.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if let Filter::Editing(query) = &mut self.filter {
            match key.code {
                KeyCode::Esc => self.filter = Filter::Off,
                KeyCode::Enter => {
                    self.filter = if query.is_empty() {
                        Filter::Off
                    } else {
                        Filter::Applied(std::mem::take(query))
                    };
                }
                KeyCode::Backspace => {
                    query.pop();
                }
                KeyCode::Char(c) => query.push(c),
                _ => {}
            }
            self.refilter();
            return true;
        }

        let page = self.page as i32;
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::PageDown => self.move_selection(page),
            KeyCode::PageUp => self.move_selection(-page),
            KeyCode::Home | KeyCode::Char('g') => self.select_first(),
            KeyCode::End | KeyCode::Char('G') => self.select_last(),
            KeyCode::Char('/') => {
                self.filter = Filter::Editing(String::new());
                self.refilter();
            }
            KeyCode::Esc if self.filter != Filter::Off => {
                self.filter = Filter::Off;
                self.refilter();
            }
            _ => return false,
        }
        true
    }

    fn refilter(&mut self) {
        let query = self.filter.query().map(str::to_lowercase);
        self.visible = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, e)| match &query {
                Some(q) => e.filter_value().to_lowercase().contains(q.as_str()),
                None => true,
            })
            .map(|(i, _)| i)
            .collect();

        if self.visible.is_empty() {
            self.list_state.select(None);
        } else {
            let cur = self.list_state.selected().unwrap_or(0);
            self.list_state.select(Some(cur.min(self.visible.len() - 1)));
        }
    }
}
