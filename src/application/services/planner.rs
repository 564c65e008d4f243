//! Deadline planner service

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, info, instrument};

use crate::application::export::{curl_command, outline_events, to_ics, IcsEvent};
use crate::application::services::reference::resolve_reference;
use crate::application::storage::JsonStore;
use crate::application::{ApplicationResult, OutlineService};
use crate::config::Settings;
use crate::domain::{
    Category, Deadline, DeadlineBook, DomainError, NewDeadline, Opportunity,
};
use crate::infrastructure::traits::FileSystem;

/// Dashboard numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerSummary {
    pub total: usize,
    pub due_soon: usize,
    pub horizon_days: i64,
    pub categories: Vec<Category>,
}

/// Deadline planner service.
pub struct PlannerService {
    store: JsonStore<DeadlineBook>,
    settings: Arc<Settings>,
}

impl PlannerService {
    pub fn new(fs: Arc<dyn FileSystem>, settings: Arc<Settings>) -> Self {
        let store = JsonStore::new(fs, settings.deadlines_path());
        Self { store, settings }
    }

    pub fn load(&self) -> ApplicationResult<DeadlineBook> {
        self.store.load()
    }

    fn reminders(&self) -> &[i64] {
        &self.settings.planner.default_reminders
    }

    pub fn resolve(&self, book: &DeadlineBook, reference: &str) -> ApplicationResult<String> {
        let ids = book.all().iter().map(|d| d.id.as_str());
        Ok(resolve_reference(ids, reference, |_| None)?)
    }

    /// Add a manual deadline; `None` if the title is blank or the date missing.
    #[instrument(level = "debug", skip(self, new), fields(title = %new.title))]
    pub fn add(&self, new: NewDeadline) -> ApplicationResult<Option<String>> {
        let mut book = self.load()?;
        let id = book.add(new, self.reminders());
        if id.is_some() {
            self.store.save(&book)?;
        } else {
            debug!("ignored deadline without title or date");
        }
        Ok(id)
    }

    #[instrument(level = "debug", skip(self, opp), fields(opp = %opp.id))]
    pub fn add_from_opportunity(&self, opp: &Opportunity) -> ApplicationResult<String> {
        let mut book = self.load()?;
        let id = book.add_from_opportunity(opp, self.reminders());
        self.store.save(&book)?;
        info!("tracking opportunity {} as deadline {}", opp.id, id);
        Ok(id)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn remove(&self, reference: &str) -> ApplicationResult<Deadline> {
        let mut book = self.load()?;
        let id = self.resolve(&book, reference)?;
        let removed = book
            .remove(&id)
            .ok_or_else(|| DomainError::ItemNotFound(id.clone()))?;
        self.store.save(&book)?;
        Ok(removed)
    }

    /// The configured number of earliest deadlines.
    pub fn upcoming(&self) -> ApplicationResult<Vec<Deadline>> {
        let book = self.load()?;
        Ok(book
            .upcoming(self.settings.planner.upcoming_limit)
            .into_iter()
            .cloned()
            .collect())
    }

    pub fn by_month(&self) -> ApplicationResult<Vec<(String, Vec<Deadline>)>> {
        let book = self.load()?;
        Ok(book
            .by_month()
            .into_iter()
            .map(|(label, group)| (label, group.into_iter().cloned().collect()))
            .collect())
    }

    pub fn summary(&self, today: NaiveDate) -> ApplicationResult<PlannerSummary> {
        let book = self.load()?;
        let horizon_days = self.settings.planner.horizon_days;
        Ok(PlannerSummary {
            total: book.len(),
            due_soon: book.due_within(horizon_days, today),
            horizon_days,
            categories: book.categories_in_use(),
        })
    }

    /// Calendar export of the referenced deadlines (all when `references`
    /// is empty), optionally with dated WBS items. `None` when empty.
    #[instrument(level = "debug", skip(self, outline))]
    pub fn export_ics(
        &self,
        references: &[String],
        outline: Option<&OutlineService>,
        stamp: NaiveDateTime,
    ) -> ApplicationResult<Option<String>> {
        let book = self.load()?;
        let selected: Vec<&Deadline> = if references.is_empty() {
            book.sorted()
        } else {
            let ids = references
                .iter()
                .map(|r| self.resolve(&book, r))
                .collect::<ApplicationResult<Vec<_>>>()?;
            book.select(&ids)
        };

        let mut events: Vec<IcsEvent> = selected.into_iter().map(IcsEvent::from).collect();
        if let Some(outline) = outline {
            events.extend(outline_events(&outline.load()?));
        }
        debug!("exporting {} events", events.len());
        Ok(to_ics(&events, stamp))
    }

    /// Slack `curl` reminder for one deadline.
    pub fn slack_reminder(&self, reference: &str) -> ApplicationResult<String> {
        let book = self.load()?;
        let id = self.resolve(&book, reference)?;
        let deadline = book
            .get(&id)
            .ok_or_else(|| DomainError::ItemNotFound(id.clone()))?;
        Ok(curl_command(self.settings.slack.webhook.as_deref(), deadline))
    }
}
