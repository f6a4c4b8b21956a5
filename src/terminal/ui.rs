use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, BorderType, List, ListItem, Padding, Paragraph, Wrap},
};

use crate::domain::email::{EmailSummary, ListEntry, relative_time};
use crate::mail::provider::ProviderError;
use crate::terminal::list::Filter;
use crate::terminal::state::{ViewMode, ViewState};

const ACCENT: Color = Color::Rgb(0x25, 0x63, 0xEB);
const SUBTLE: Color = Color::Rgb(0x6B, 0x72, 0x80);
const SENDER: Color = Color::Rgb(0x60, 0xA5, 0xFA);
const DATE: Color = Color::Rgb(0x93, 0xC5, 0xFD);
const TEXT: Color = Color::Rgb(0xE5, 0xE7, 0xEB);
const DIM: Color = Color::Rgb(0x4B, 0x55, 0x63);
const SUCCESS: Color = Color::Rgb(0x34, 0xD3, 0x99);
const ERROR: Color = Color::Rgb(0xFF, 0x6B, 0x6B);
const HELP_KEY_BG: Color = Color::Rgb(0x3F, 0x3F, 0x46);
const HELP_DESC_FG: Color = Color::Rgb(0xA1, 0xA1, 0xAA);
const HELP_BG: Color = Color::Rgb(0x27, 0x27, 0x2A);

const ERROR_BOX_WIDTH: u16 = 60;

/// Draw the whole screen. Reads the state only.
pub fn render(f: &mut Frame, state: &ViewState) {
    let area = f.area();

    if let Some(err) = &state.last_error {
        render_error(f, area, err);
        return;
    }
    if state.loading {
        render_loading(f, area, state);
        return;
    }
    match state.mode {
        ViewMode::List if state.list.is_empty() => render_empty(f, area, state),
        ViewMode::List => render_list(f, area, state),
        ViewMode::Detail => render_detail(f, area, state),
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(row);
    cell
}

/// Rows `text` takes when word wrapped to `width`, the same way it is drawn.
pub fn wrapped_rows(text: &str, width: u16) -> usize {
    Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .line_count(width.max(1))
}

fn detail_box_width(screen_width: u16) -> u16 {
    screen_width
        .saturating_sub(4)
        .max(20)
        .min(screen_width.saturating_sub(2))
}

/// Columns left for the body inside the detail box (border + padding).
pub fn detail_body_width(screen_width: u16) -> u16 {
    detail_box_width(screen_width).saturating_sub(6).max(1)
}

fn render_error(f: &mut Frame, area: Rect, err: &ProviderError) {
    let width = ERROR_BOX_WIDTH.min(area.width);
    // border + horizontal padding
    let inner = width.saturating_sub(6);
    let message = err.to_string();
    let hint = err.hint();
    let rows = 6 + wrapped_rows(&message, inner) + wrapped_rows(hint, inner);
    // border + vertical padding
    let height = u16::try_from(rows + 4).unwrap_or(u16::MAX).min(area.height);

    let text = Text::from(vec![
        Line::styled(
            "Error",
            Style::default().fg(ERROR).add_modifier(Modifier::BOLD),
        ),
        Line::default(),
        Line::styled(message, Style::default().fg(TEXT)),
        Line::default(),
        Line::styled(hint, hint_style()),
        Line::default(),
        Line::styled("'r' retry • 'q' quit", hint_style()),
    ]);

    let block = Block::bordered()
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(ERROR))
        .padding(Padding::new(2, 2, 1, 1));

    f.render_widget(
        Paragraph::new(text).block(block).wrap(Wrap { trim: false }),
        centered(area, width, height),
    );
}

fn hint_style() -> Style {
    Style::default().fg(SUBTLE).add_modifier(Modifier::ITALIC)
}

fn render_loading(f: &mut Frame, area: Rect, state: &ViewState) {
    let line = Line::from(vec![
        Span::styled(state.spinner.glyph(), Style::default().fg(ACCENT)),
        Span::raw(" Loading..."),
    ]);
    let width = u16::try_from(line.width()).unwrap_or(area.width);
    f.render_widget(Paragraph::new(line), centered(area, width, 1));
}

fn render_empty(f: &mut Frame, area: Rect, state: &ViewState) {
    let [body, help] = Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(area);

    let text = Text::from(vec![
        Line::styled(
            "All caught up!",
            Style::default().fg(SUCCESS).add_modifier(Modifier::BOLD),
        ),
        Line::default(),
        Line::styled("No unread emails in your inbox.", hint_style()),
        Line::default(),
        Line::styled(
            format!(
                "Last checked: {} • Auto-refresh: {}s",
                state.last_refresh.format("%H:%M:%S"),
                state.refresh_every.as_secs()
            ),
            Style::default().fg(DIM).add_modifier(Modifier::ITALIC),
        ),
    ]);

    f.render_widget(
        Paragraph::new(text).alignment(Alignment::Center),
        centered(body, body.width, 5),
    );
    render_help(f, help, &[("r", "refresh"), ("q", "quit")]);
}

fn list_title(state: &ViewState) -> String {
    let n = state.emails().len();
    if n > 0 {
        format!("Unread Emails ({n})")
    } else {
        "Unread Emails".to_string()
    }
}

fn status_line(state: &ViewState) -> Line<'static> {
    let shown = state.list.visible_len();
    let noun = if shown == 1 { "item" } else { "items" };
    match state.list.filter() {
        Filter::Off => Line::styled(format!(" {shown} {noun}"), Style::default().fg(SUBTLE)),
        Filter::Editing(q) => Line::from(vec![
            Span::styled(" Filter: ", Style::default().fg(ACCENT)),
            Span::styled(format!("{q}▏"), Style::default().fg(TEXT)),
        ]),
        Filter::Applied(q) => Line::from(vec![
            Span::styled(format!(" “{q}” "), Style::default().fg(TEXT)),
            Span::styled(format!("{shown} filtered"), Style::default().fg(SUBTLE)),
        ]),
    }
}

fn render_list(f: &mut Frame, area: Rect, state: &ViewState) {
    let [title, status, list_area, time_info, help] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(area);

    f.render_widget(
        Paragraph::new(Line::styled(
            format!(" {} ", list_title(state)),
            Style::default()
                .fg(Color::White)
                .bg(ACCENT)
                .add_modifier(Modifier::BOLD),
        )),
        title,
    );
    f.render_widget(Paragraph::new(status_line(state)), status);

    let now = state.last_refresh.naive_local();
    let selected = state.list.selected_index();
    let items: Vec<ListItem> = state
        .list
        .visible()
        .enumerate()
        .map(|(i, e)| email_item(e, Some(i) == selected, list_area.width, now))
        .collect();

    // rendering only needs a scratch copy of the selection
    f.render_stateful_widget(List::new(items), list_area, &mut state.list.list_state.clone());

    f.render_widget(
        Paragraph::new(Line::styled(
            format!(
                " Updated {} • Auto-refresh: {}s",
                state.last_refresh.format("%H:%M:%S"),
                state.refresh_every.as_secs()
            ),
            Style::default().fg(DIM).add_modifier(Modifier::ITALIC),
        )),
        time_info,
    );

    render_help(
        f,
        help,
        &[
            ("enter", "read"),
            ("r", "refresh"),
            ("a", "mark all read"),
            ("/", "filter"),
            ("q", "quit"),
        ],
    );
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn email_item(
    e: &EmailSummary,
    is_selected: bool,
    width: u16,
    now: chrono::NaiveDateTime,
) -> ListItem<'static> {
    let width = usize::from(width);
    let subject = format!("  {}", truncate(e.title(), width.saturating_sub(16).max(10)));
    let age = relative_time(&e.date, now);
    let gap = width
        .saturating_sub(subject.chars().count() + age.chars().count() + 4)
        .max(1);

    let (bar, subject_style, age_style, sender_style) = if is_selected {
        (
            Span::styled(
                "│",
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
            ),
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
            Style::default().fg(DATE),
            Style::default().fg(SENDER),
        )
    } else {
        (
            Span::raw(" "),
            Style::default().fg(TEXT),
            Style::default().fg(DIM),
            Style::default().fg(SUBTLE),
        )
    };

    ListItem::new(Text::from(vec![
        Line::from(vec![
            bar.clone(),
            Span::styled(subject, subject_style),
            Span::raw(" ".repeat(gap)),
            Span::styled(age, age_style),
        ]),
        Line::from(vec![bar, Span::styled(format!("  {}", e.sender), sender_style)]),
        Line::default(),
    ]))
}

fn render_detail(f: &mut Frame, area: Rect, state: &ViewState) {
    let Some(email) = &state.current_email else {
        return;
    };

    let [_, main, help] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .areas(area);

    let box_width = detail_box_width(area.width);
    let [_, boxed] = Layout::horizontal([Constraint::Length(2), Constraint::Length(box_width)])
        .areas(main);

    let block = Block::bordered()
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(ACCENT))
        .padding(Padding::new(2, 2, 1, 1));
    let inner = block.inner(boxed);
    f.render_widget(block, boxed);

    let [subject, _, from, date, divider, _, body] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Fill(1),
    ])
    .areas(inner);

    let meta = Style::default().fg(SUBTLE);
    f.render_widget(
        Paragraph::new(Line::styled(
            email.subject.clone(),
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )),
        subject,
    );
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("From: ", meta),
            Span::styled(email.sender.clone(), Style::default().fg(SENDER)),
        ])),
        from,
    );
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("Date: ", meta),
            Span::styled(email.date.clone(), Style::default().fg(DATE)),
        ])),
        date,
    );
    f.render_widget(
        Paragraph::new(Line::styled(
            "─".repeat(usize::from(divider.width)),
            Style::default().fg(DIM),
        )),
        divider,
    );
    f.render_widget(
        Paragraph::new(state.email_body.as_str())
            .style(Style::default().fg(TEXT))
            .wrap(Wrap { trim: false })
            .scroll((state.body_scroll, 0)),
        body,
    );

    render_help(
        f,
        help,
        &[("↑/↓", "scroll"), ("q", "back"), ("esc", "back to list")],
    );
}

fn render_help(f: &mut Frame, area: Rect, bindings: &[(&str, &str)]) {
    let key_style = Style::default()
        .fg(Color::White)
        .bg(HELP_KEY_BG)
        .add_modifier(Modifier::BOLD);
    let desc_style = Style::default().fg(HELP_DESC_FG).bg(HELP_BG);

    let mut spans = Vec::with_capacity(bindings.len() * 3);
    for (i, (key, desc)) in bindings.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled(format!(" {key} "), key_style));
        spans.push(Span::styled(format!(" {desc} "), desc_style));
    }

    f.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(HELP_BG)),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::events::{AppEvent, Command, update};
    use crate::terminal::state::Viewport;
    use chrono::Local;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::{Terminal, backend::TestBackend, buffer::Buffer};
    use std::time::Duration;

    const W: u16 = 80;
    const H: u16 = 24;

    fn new_state() -> ViewState {
        ViewState::new(
            Viewport {
                width: W,
                height: H,
            },
            Duration::from_secs(10),
            Local::now(),
        )
    }

    fn summaries(n: usize) -> Vec<EmailSummary> {
        (1..=n)
            .map(|i| EmailSummary {
                sender: format!("sender{i}@example.com"),
                subject: format!("Subject number {i}"),
                date: "2024-03-10 11:00:00".into(),
                index: i,
            })
            .collect()
    }

    fn listed(state: &mut ViewState, n: usize) {
        update(
            state,
            AppEvent::ListFetched {
                result: Ok(summaries(n)),
                at: Local::now(),
            },
        );
    }

    fn press(state: &mut ViewState, code: KeyCode) {
        update(state, AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)));
    }

    fn draw(state: &ViewState) -> Buffer {
        let mut terminal = Terminal::new(TestBackend::new(W, H)).unwrap();
        terminal.draw(|f| render(f, state)).unwrap();
        terminal.backend().buffer().clone()
    }

    fn screen(buf: &Buffer) -> String {
        buf.content
            .chunks(usize::from(buf.area.width))
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn rendering_is_repeatable() {
        let mut s = new_state();
        listed(&mut s, 3);
        press(&mut s, KeyCode::Down);
        let before = s.list.selected_index();

        assert_eq!(draw(&s), draw(&s));
        assert_eq!(s.list.selected_index(), before);
    }

    #[test]
    fn loading_screen_while_fetching() {
        let s = new_state();
        let text = screen(&draw(&s));
        assert!(text.contains("Loading..."));
        assert!(!text.contains("Unread Emails"));
    }

    #[test]
    fn list_shows_count_and_entries() {
        let mut s = new_state();
        listed(&mut s, 3);
        let text = screen(&draw(&s));
        assert!(text.contains("Unread Emails (3)"));
        for i in 1..=3 {
            assert!(text.contains(&format!("Subject number {i}")));
            assert!(text.contains(&format!("sender{i}@example.com")));
        }
        assert!(text.contains("mark all read"));
        assert!(text.contains("Auto-refresh: 10s"));
    }

    #[test]
    fn empty_list_shows_caught_up_panel() {
        let mut s = new_state();
        listed(&mut s, 0);
        let text = screen(&draw(&s));
        assert!(text.contains("All caught up!"));
        assert!(text.contains("Last checked: "));
        assert!(!text.contains("Unread Emails"));
    }

    #[test]
    fn detail_shows_header_and_body() {
        let mut s = new_state();
        listed(&mut s, 3);
        press(&mut s, KeyCode::Down);
        press(&mut s, KeyCode::Enter);
        update(&mut s, AppEvent::BodyFetched(Ok("Hello".into())));

        let text = screen(&draw(&s));
        assert!(text.contains("Subject number 2"));
        assert!(text.contains("From: sender2@example.com"));
        assert!(text.contains("Date: 2024-03-10 11:00:00"));
        assert!(text.contains("Hello"));
        assert!(text.contains("back to list"));
    }

    #[test]
    fn error_panel_takes_priority() {
        let mut s = new_state();
        listed(&mut s, 3);
        press(&mut s, KeyCode::Enter);
        update(
            &mut s,
            AppEvent::BodyFetched(Err(ProviderError::Unknown("index out of range".into()))),
        );

        let text = screen(&draw(&s));
        assert!(text.contains("Error"));
        assert!(text.contains("index out of range"));
        assert!(text.contains("'r' retry • 'q' quit"));
        assert!(!text.contains("Unread Emails"));
    }

    #[test]
    fn error_panel_over_detail_view() {
        let mut s = new_state();
        listed(&mut s, 1);
        press(&mut s, KeyCode::Enter);
        update(&mut s, AppEvent::BodyFetched(Ok("Hello".into())));
        s.last_error = Some(ProviderError::Unavailable("gone".into()));

        let text = screen(&draw(&s));
        assert!(text.contains("Make sure Mail.app is running."));
        assert!(!text.contains("From: "));
    }

    #[test]
    fn filter_prompt_is_shown() {
        let mut s = new_state();
        listed(&mut s, 3);
        press(&mut s, KeyCode::Char('/'));
        press(&mut s, KeyCode::Char('2'));
        let text = screen(&draw(&s));
        assert!(text.contains("Filter: 2"));
        assert!(text.contains("Subject number 2"));
        assert!(!text.contains("Subject number 3"));
    }

    #[test]
    fn end_brings_last_wrapped_line_into_view() {
        let (w, h) = (22, 24);
        let mut s = ViewState::new(
            Viewport {
                width: w,
                height: h,
            },
            Duration::from_secs(10),
            Local::now(),
        );
        listed(&mut s, 1);
        press(&mut s, KeyCode::Enter);
        let mut lines = vec!["aaaaaaa bbbbbbb ccccccc"; 11];
        lines.push("aaaaaaa bbbbbbb zzzzzzz");
        update(&mut s, AppEvent::BodyFetched(Ok(lines.join("\n"))));
        press(&mut s, KeyCode::End);

        let mut terminal = Terminal::new(TestBackend::new(w, h)).unwrap();
        terminal.draw(|f| render(f, &s)).unwrap();
        let text = screen(terminal.backend().buffer());
        assert!(text.contains("zzzzzzz"), "last line should be visible:\n{text}");

        // one more step down stays put
        let at_end = s.body_scroll;
        press(&mut s, KeyCode::Down);
        assert_eq!(s.body_scroll, at_end);
    }

    #[test]
    fn body_width_matches_detail_box() {
        assert_eq!(detail_body_width(80), 70);
        assert_eq!(detail_body_width(22), 14);
        assert_eq!(wrapped_rows("aaaaaaa bbbbbbb ccccccc", 14), 3);
        assert_eq!(wrapped_rows("one\n\ntwo", 14), 3);
    }

    #[test]
    fn empty_list_keeps_polling() {
        let mut s = new_state();
        listed(&mut s, 0);
        for _ in 0..2 {
            let cmds = update(&mut s, AppEvent::Tick(Local::now()));
            assert_eq!(cmds, vec![Command::FetchList, Command::ScheduleTick]);
            assert!(!s.loading);
            listed(&mut s, 0);
            assert!(screen(&draw(&s)).contains("All caught up!"));
        }
    }

    #[test]
    fn long_subjects_are_truncated() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghijkl", 5), "abcd…");
    }
}
