//! Domain entities: core data structures

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::error::DomainError;

/// Date format used everywhere a date is typed, stored or exported.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<NaiveDate, DomainError> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| DomainError::InvalidDate(s.to_string()))
}

/// Generate a fresh opaque identifier.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Progress of a work item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    #[default]
    NotStarted,
    InProgress,
    Done,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::NotStarted => "not-started",
            Status::InProgress => "in-progress",
            Status::Done => "done",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = DomainError;

    /// Accepts `not-started`, `not_started`, `not started` and friends.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == '_' || c == ' ' { '-' } else { c })
            .collect();
        match normalized.as_str() {
            "not-started" | "todo" => Ok(Status::NotStarted),
            "in-progress" | "doing" => Ok(Status::InProgress),
            "done" => Ok(Status::Done),
            _ => Err(DomainError::UnknownStatus(s.to_string())),
        }
    }
}

/// Priority bucket, P0 being the most urgent.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Priority {
    P0,
    P1,
    #[default]
    P2,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Priority::P0 => "P0",
            Priority::P1 => "P1",
            Priority::P2 => "P2",
        };
        f.write_str(s)
    }
}

impl FromStr for Priority {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "P0" | "0" => Ok(Priority::P0),
            "P1" | "1" => Ok(Priority::P1),
            "P2" | "2" => Ok(Priority::P2),
            _ => Err(DomainError::UnknownPriority(s.to_string())),
        }
    }
}

/// One row of the work-breakdown structure.
///
/// The dotted number shown to users is not stored here; it is derived from
/// the item's position and level in its [`Outline`](crate::domain::Outline).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem {
    pub id: String,
    pub title: String,
    #[serde(deserialize_with = "non_negative_level")]
    pub level: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due: Option<NaiveDate>,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub priority: Priority,
}

/// Stored levels below zero load as root level. The upper bound is applied
/// by the owning outline.
fn non_negative_level<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    let level = i64::deserialize(deserializer)?;
    Ok(usize::try_from(level).unwrap_or(0))
}

impl ListItem {
    /// New item with a fresh id and default metadata.
    pub fn new(title: impl Into<String>, level: usize) -> Self {
        Self {
            id: new_id(),
            title: title.into(),
            level,
            owner: None,
            due: None,
            status: Status::default(),
            priority: Priority::default(),
        }
    }

    /// Apply a partial update. Fields left `None` in the patch are untouched.
    pub fn apply(&mut self, patch: &ItemPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(owner) = &patch.owner {
            self.owner = owner.clone();
        }
        if let Some(due) = patch.due {
            self.due = due;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
    }
}

/// Partial field update for a [`ListItem`].
///
/// `owner` and `due` are doubly optional: `Some(None)` clears the field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemPatch {
    pub title: Option<String>,
    pub owner: Option<Option<String>>,
    pub due: Option<Option<NaiveDate>>,
    pub status: Option<Status>,
    pub priority: Option<Priority>,
}

impl ItemPatch {
    pub fn is_empty(&self) -> bool {
        *self == ItemPatch::default()
    }
}

/// Stable read of one item together with its computed number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemRow {
    pub number: String,
    pub id: String,
    pub title: String,
    pub level: usize,
    pub owner: Option<String>,
    pub due: Option<NaiveDate>,
    pub status: Status,
    pub priority: Priority,
}
