//! Deadlines: dated, categorized commitments with reminder offsets.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::domain::entities::new_id;
use crate::domain::error::DomainError;
use crate::domain::opportunity::Opportunity;

/// Reminder offsets (days relative to the deadline) used when none are given.
pub const DEFAULT_REMINDERS: [i64; 2] = [-7, -1];

/// Which track of work a deadline belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Govcon,
    Product,
    Fundraise,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Govcon, Category::Product, Category::Fundraise];

    pub fn key(&self) -> &'static str {
        match self {
            Category::Govcon => "govcon",
            Category::Product => "product",
            Category::Fundraise => "fundraise",
        }
    }

    /// Human label.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Govcon => "GovCon",
            Category::Product => "Product",
            Category::Fundraise => "Raise",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.key() == wanted || c.label().to_lowercase() == wanted)
            .ok_or_else(|| DomainError::UnknownCategory(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deadline {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub reminders: Vec<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_opportunity_id: Option<String>,
}

/// Input for a manually added deadline.
#[derive(Debug, Clone, Default)]
pub struct NewDeadline {
    pub title: String,
    pub date: Option<NaiveDate>,
    pub category: Category,
    pub url: Option<String>,
    pub tags: Vec<String>,
}

/// Whole days from `today` until `date` (negative when past).
pub fn days_until(date: NaiveDate, today: NaiveDate) -> i64 {
    (date - today).num_days()
}

/// Ordered collection of deadlines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadlineBook {
    deadlines: Vec<Deadline>,
}

impl DeadlineBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> &[Deadline] {
        &self.deadlines
    }

    pub fn len(&self) -> usize {
        self.deadlines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Deadline> {
        self.deadlines.iter().find(|d| d.id == id)
    }

    /// Add a manual deadline. Blank titles or a missing date are ignored.
    pub fn add(&mut self, new: NewDeadline, reminders: &[i64]) -> Option<String> {
        let title = new.title.trim();
        let date = new.date?;
        if title.is_empty() {
            return None;
        }
        let deadline = Deadline {
            id: new_id(),
            title: title.to_string(),
            date,
            category: new.category,
            source: None,
            url: new.url.filter(|u| !u.trim().is_empty()),
            tags: new
                .tags
                .into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
            reminders: reminders.to_vec(),
            from_opportunity_id: None,
        };
        let id = deadline.id.clone();
        self.deadlines.push(deadline);
        Some(id)
    }

    /// Track an opportunity's due date as a GovCon deadline.
    pub fn add_from_opportunity(&mut self, opp: &Opportunity, reminders: &[i64]) -> String {
        let deadline = Deadline {
            id: new_id(),
            title: opp.title.clone(),
            date: opp.due,
            category: Category::Govcon,
            source: Some(opp.source.to_string()),
            url: opp.url.clone(),
            tags: opp.tags.clone(),
            reminders: reminders.to_vec(),
            from_opportunity_id: Some(opp.id.clone()),
        };
        let id = deadline.id.clone();
        self.deadlines.push(deadline);
        id
    }

    pub fn remove(&mut self, id: &str) -> Option<Deadline> {
        let pos = self.deadlines.iter().position(|d| d.id == id)?;
        Some(self.deadlines.remove(pos))
    }

    /// All deadlines sorted by date, stable for equal dates.
    pub fn sorted(&self) -> Vec<&Deadline> {
        self.deadlines.iter().sorted_by_key(|d| d.date).collect()
    }

    /// The `limit` earliest deadlines.
    pub fn upcoming(&self, limit: usize) -> Vec<&Deadline> {
        self.sorted().into_iter().take(limit).collect()
    }

    /// Date-sorted deadlines grouped by month, labelled "Month YYYY".
    pub fn by_month(&self) -> Vec<(String, Vec<&Deadline>)> {
        let chunks = self
            .sorted()
            .into_iter()
            .chunk_by(|d| (d.date.year(), d.date.month()));
        let groups = chunks
            .into_iter()
            .map(|(_, group)| {
                let items: Vec<&Deadline> = group.collect();
                let label = items[0].date.format("%B %Y").to_string();
                (label, items)
            })
            .collect();
        groups
    }

    /// Number of deadlines due between today and `days` from now, inclusive.
    pub fn due_within(&self, days: i64, today: NaiveDate) -> usize {
        self.deadlines
            .iter()
            .filter(|d| (0..=days).contains(&days_until(d.date, today)))
            .count()
    }

    /// Distinct categories in first-use order.
    pub fn categories_in_use(&self) -> Vec<Category> {
        self.deadlines.iter().map(|d| d.category).unique().collect()
    }

    /// Deadlines whose ids are in `ids`, in book order.
    pub fn select(&self, ids: &[String]) -> Vec<&Deadline> {
        self.deadlines
            .iter()
            .filter(|d| ids.contains(&d.id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        crate::domain::entities::parse_date(s).unwrap()
    }

    fn book() -> DeadlineBook {
        let mut book = DeadlineBook::new();
        for (title, d, cat) in [
            ("Investor update email", "2025-11-02", Category::Fundraise),
            ("SBIR whitepaper", "2025-10-12", Category::Govcon),
            ("SDA demo deck v1", "2025-10-06", Category::Product),
        ] {
            book.add(
                NewDeadline {
                    title: title.into(),
                    date: Some(date(d)),
                    category: cat,
                    ..Default::default()
                },
                &DEFAULT_REMINDERS,
            );
        }
        book
    }

    #[test]
    fn test_add_requires_title_and_date() {
        let mut book = DeadlineBook::new();
        assert!(book
            .add(
                NewDeadline {
                    title: "  ".into(),
                    date: Some(date("2025-10-01")),
                    ..Default::default()
                },
                &[]
            )
            .is_none());
        assert!(book
            .add(
                NewDeadline {
                    title: "No date".into(),
                    ..Default::default()
                },
                &[]
            )
            .is_none());
        assert!(book.is_empty());
    }

    #[test]
    fn test_upcoming_sorted_and_limited() {
        let book = book();
        let titles: Vec<_> = book.upcoming(2).iter().map(|d| d.title.as_str()).collect();
        assert_eq!(titles, vec!["SDA demo deck v1", "SBIR whitepaper"]);
    }

    #[test]
    fn test_by_month_groups_chronologically() {
        let book = book();
        let groups = book.by_month();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "October 2025");
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[1].0, "November 2025");
    }

    #[test]
    fn test_due_within_counts_only_future_window() {
        let book = book();
        assert_eq!(book.due_within(30, date("2025-10-07")), 2);
        assert_eq!(book.due_within(5, date("2025-10-07")), 1);
    }

    #[test]
    fn test_days_until_negative_when_past() {
        assert_eq!(days_until(date("2025-10-01"), date("2025-10-03")), -2);
    }

    #[test]
    fn test_category_parse_accepts_key_and_label() {
        assert_eq!("raise".parse::<Category>().unwrap(), Category::Fundraise);
        assert_eq!("GovCon".parse::<Category>().unwrap(), Category::Govcon);
        assert!("ops".parse::<Category>().is_err());
    }

    #[test]
    fn test_categories_in_use_distinct() {
        assert_eq!(book().categories_in_use().len(), 3);
    }
}
