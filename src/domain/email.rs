use chrono::{NaiveDateTime, TimeDelta};
use serde::Serialize;

/// 1-based position inside the provider's unread set at the time of a query.
/// Not stable across refreshes.
pub type ProviderIndex = usize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailSummary {
    pub sender: String,
    pub subject: String,
    /// Provider formatted, kept opaque.
    pub date: String,
    pub index: ProviderIndex,
}

/// What the list widget needs to know about a row.
pub trait ListEntry {
    fn title(&self) -> &str;
    fn description(&self, now: NaiveDateTime) -> String;
    fn filter_value(&self) -> &str;
}

impl ListEntry for EmailSummary {
    fn title(&self) -> &str {
        &self.subject
    }

    fn description(&self, now: NaiveDateTime) -> String {
        format!("{} • {}", self.sender, relative_time(&self.date, now))
    }

    fn filter_value(&self) -> &str {
        &self.subject
    }
}

// Layouts Mail.app uses for `date received as string`, depending on locale.
const DATE_FORMATS: &[&str] = &[
    "%A, %B %d, %Y at %I:%M:%S %p",
    "%A, %d %B %Y at %I:%M:%S %p",
    "%B %d, %Y at %I:%M:%S %p",
    "%d %B %Y at %I:%M:%S %p",
    "%m/%d/%y, %I:%M %p",
    "%Y-%m-%d %H:%M:%S",
    "%a %b %d %H:%M:%S %Y",
];

pub fn parse_date(date: &str) -> Option<NaiveDateTime> {
    // newer macOS puts a narrow no-break space before AM/PM
    let normalized = date.trim().replace(['\u{202f}', '\u{a0}'], " ");
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(&normalized, f).ok())
}

/// Human friendly age of `date` as seen from `now`. Falls back to the raw
/// string when the date cannot be parsed.
pub fn relative_time(date: &str, now: NaiveDateTime) -> String {
    let Some(t) = parse_date(date) else {
        return date.to_string();
    };

    let d = now - t;
    if d < TimeDelta::minutes(1) {
        return "just now".to_string();
    }
    if d < TimeDelta::hours(1) {
        return format!("{}m ago", d.num_minutes());
    }
    if d < TimeDelta::hours(24) {
        return format!("{}h ago", d.num_hours());
    }
    if d < TimeDelta::hours(48) {
        return "yesterday".to_string();
    }
    format!("{}d ago", d.num_days())
}
