//! iCalendar (RFC 5545) export of deadlines and dated WBS items
//!
//! Every event is an all-day event: `DTSTART` is the date, `DTEND` the
//! following day.

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::domain::{Deadline, Outline};

pub const PRODID: &str = "-//TrackOps//MVP//EN";
pub const UID_DOMAIN: &str = "trackops";

/// One all-day calendar entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IcsEvent {
    pub uid: String,
    pub date: NaiveDate,
    pub summary: String,
    pub description: String,
}

impl From<&Deadline> for IcsEvent {
    fn from(d: &Deadline) -> Self {
        let mut description = d
            .url
            .as_deref()
            .map(|u| format!("View: {u}"))
            .unwrap_or_default();
        if !d.tags.is_empty() {
            description.push_str(&format!("\nTags: {}", d.tags.join(", ")));
        }
        Self {
            uid: format!("{}@{}", d.id, UID_DOMAIN),
            date: d.date,
            summary: format!("{} [{}]", d.title, d.category.label()),
            description,
        }
    }
}

/// Events for every WBS item that has a due date.
pub fn outline_events(outline: &Outline) -> Vec<IcsEvent> {
    outline
        .rows()
        .into_iter()
        .filter_map(|row| {
            let date = row.due?;
            let mut description = format!("Status: {}", row.status);
            if let Some(owner) = &row.owner {
                description.push_str(&format!("\nOwner: {owner}"));
            }
            Some(IcsEvent {
                uid: format!("{}@{}", row.id, UID_DOMAIN),
                date,
                summary: format!("{} {}", row.number, row.title),
                description,
            })
        })
        .collect()
}

/// Escape backslash, newline, comma and semicolon for TEXT values.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            ',' => out.push_str("\\,"),
            ';' => out.push_str("\\;"),
            '\r' => {}
            _ => out.push(ch),
        }
    }
    out
}

/// Render a VCALENDAR with CRLF line endings; `None` when there is nothing to export.
///
/// `stamp` is the UTC creation time written as `DTSTAMP`.
pub fn to_ics(events: &[IcsEvent], stamp: NaiveDateTime) -> Option<String> {
    if events.is_empty() {
        return None;
    }
    let dtstamp = stamp.format("%Y%m%dT%H%M%SZ").to_string();
    let mut lines = vec![
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        format!("PRODID:{PRODID}"),
    ];
    for event in events {
        let end = event.date + Duration::days(1);
        lines.extend([
            "BEGIN:VEVENT".to_string(),
            format!("UID:{}", event.uid),
            format!("DTSTAMP:{dtstamp}"),
            format!("DTSTART;VALUE=DATE:{}", event.date.format("%Y%m%d")),
            format!("DTEND;VALUE=DATE:{}", end.format("%Y%m%d")),
            format!("SUMMARY:{}", escape_text(&event.summary)),
            format!("DESCRIPTION:{}", escape_text(&event.description)),
            "END:VEVENT".to_string(),
        ]);
    }
    lines.push("END:VCALENDAR".to_string());

    let mut out = lines.join("\r\n");
    out.push_str("\r\n");
    Some(out)
}
