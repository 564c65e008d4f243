//! Slack incoming-webhook reminders
//!
//! Nothing is posted from here; the output is a message and a `curl` command
//! the user can run or paste into a scheduler.

use serde_json::json;

use crate::domain::Deadline;

/// Placeholder used when no webhook is configured.
pub const PLACEHOLDER_WEBHOOK: &str = "https://hooks.slack.com/services/XXXX/XXXX/XXXX";

/// `Reminder: <title> due <Mon D, YYYY> (<Category>). <url>`
pub fn reminder_text(deadline: &Deadline) -> String {
    let text = format!(
        "Reminder: {} due {} ({}). {}",
        deadline.title,
        deadline.date.format("%b %-d, %Y"),
        deadline.category.label(),
        deadline.url.as_deref().unwrap_or_default()
    );
    text.trim().to_string()
}

/// Quote `s` for a POSIX shell single-quoted string.
fn shell_single_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

/// A `curl` command posting the reminder to `webhook`.
pub fn curl_command(webhook: Option<&str>, deadline: &Deadline) -> String {
    let payload = json!({ "text": reminder_text(deadline) }).to_string();
    format!(
        "curl -X POST -H 'Content-type: application/json' --data {} {}",
        shell_single_quote(&payload),
        webhook.unwrap_or(PLACEHOLDER_WEBHOOK)
    )
}
