use log::{debug, warn};
use std::process::Command;

use crate::domain::email::{EmailSummary, ProviderIndex};
use crate::mail::provider::{MailProvider, ProviderError};

const FIELD_SEP: &str = "|||";

/// Apple Mail, scripted through `osascript`.
pub struct MailAppProvider {
    pub mailbox: String,
    pub limit: usize,
}

impl MailAppProvider {
    pub fn new(mailbox: impl Into<String>, limit: usize) -> Self {
        Self {
            mailbox: mailbox.into(),
            limit,
        }
    }

    fn mailbox_ref(&self) -> String {
        if self.mailbox.eq_ignore_ascii_case("inbox") {
            "inbox".to_string()
        } else {
            format!("mailbox \"{}\"", self.mailbox.replace('"', "\\\""))
        }
    }

    fn list_script(&self) -> String {
        format!(
            r#"
tell application "Mail"
	set output to ""
	set unreadMessages to (messages of {mailbox} whose read status is false)
	set msgCount to count of unreadMessages
	if msgCount > {limit} then set msgCount to {limit}
	repeat with i from 1 to msgCount
		set msg to item i of unreadMessages
		set output to output & (i as string) & "{sep}" & (sender of msg) & "{sep}" & (subject of msg) & "{sep}" & ((date received of msg) as string) & linefeed
	end repeat
	return output
end tell
"#,
            mailbox = self.mailbox_ref(),
            limit = self.limit,
            sep = FIELD_SEP,
        )
    }

    fn body_script(&self, index: ProviderIndex) -> String {
        format!(
            r#"
tell application "Mail"
	set unreadMessages to (messages of {mailbox} whose read status is false)
	set msg to item {index} of unreadMessages
	set msgContent to content of msg
	set read status of msg to true
	return msgContent
end tell
"#,
            mailbox = self.mailbox_ref(),
        )
    }

    fn mark_all_script(&self) -> String {
        format!(
            r#"
tell application "Mail"
	set unreadMessages to (messages of {mailbox} whose read status is false)
	repeat with msg in unreadMessages
		set read status of msg to true
	end repeat
end tell
"#,
            mailbox = self.mailbox_ref(),
        )
    }
}

/// Run one AppleScript and return its stdout.
fn run_osascript(script: &str, index: Option<ProviderIndex>) -> Result<String, ProviderError> {
    let out = Command::new("osascript")
        .arg("-e")
        .arg(script)
        .output()
        .map_err(|e| ProviderError::Unavailable(format!("cannot run osascript: {e}")))?;

    if !out.status.success() {
        let stderr = String::from_utf8_lossy(&out.stderr);
        warn!("osascript failed ({}): {}", out.status, stderr.trim());
        return Err(classify_failure(&stderr, index));
    }

    Ok(String::from_utf8_lossy(&out.stdout).into_owned())
}

/// Map AppleScript error output to the provider taxonomy.
pub fn classify_failure(stderr: &str, index: Option<ProviderIndex>) -> ProviderError {
    let msg = stderr.trim().to_string();
    let lower = msg.to_lowercase();

    if lower.contains("(-600)") || lower.contains("isn't running") || lower.contains("isn’t running")
    {
        return ProviderError::Unavailable(msg);
    }
    if lower.contains("(-1743)") || lower.contains("not authorized") || lower.contains("not allowed")
    {
        return ProviderError::PermissionDenied(msg);
    }
    if lower.contains("(-1719)")
        || lower.contains("invalid index")
        || lower.contains("can’t get item")
        || lower.contains("can't get item")
    {
        if let Some(index) = index {
            return ProviderError::IndexStale { index };
        }
    }
    if msg.is_empty() {
        ProviderError::Unknown("osascript exited with an error".to_string())
    } else {
        ProviderError::Unknown(msg)
    }
}

/// Parse `index|||sender|||subject|||date` lines. Malformed lines are skipped.
pub fn parse_summaries(output: &str) -> Vec<EmailSummary> {
    output
        .trim()
        .lines()
        .filter(|l| !l.is_empty())
        .filter_map(|line| {
            let parts: Vec<&str> = line.split(FIELD_SEP).collect();
            if parts.len() < 4 {
                debug!("skipping malformed line: {line}");
                return None;
            }
            Some(EmailSummary {
                index: parts[0].trim().parse().unwrap_or(0),
                sender: parts[1].trim().to_string(),
                subject: parts[2].trim().to_string(),
                date: parts[3].trim().to_string(),
            })
        })
        .collect()
}

impl MailProvider for MailAppProvider {
    fn list_unread(&self) -> Result<Vec<EmailSummary>, ProviderError> {
        let out = run_osascript(&self.list_script(), None)?;
        let mut items = parse_summaries(&out);
        items.truncate(self.limit);
        Ok(items)
    }

    fn fetch_body(&self, index: ProviderIndex) -> Result<String, ProviderError> {
        let out = run_osascript(&self.body_script(index), Some(index))?;
        Ok(out.trim().to_string())
    }

    fn mark_all_read(&self) -> Result<(), ProviderError> {
        run_osascript(&self.mark_all_script(), None).map(|_| ())
    }
}
