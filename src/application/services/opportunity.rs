//! Opportunity catalog service

use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, instrument};

use crate::application::import::{map_opportunity_rows, read_rows};
use crate::application::services::reference::resolve_reference;
use crate::application::storage::JsonStore;
use crate::application::{ApplicationResult, PlannerService};
use crate::config::Settings;
use crate::domain::{DomainError, Facets, Opportunity, OpportunityCatalog, OpportunityFilter};
use crate::infrastructure::traits::FileSystem;

/// Opportunity catalog service.
pub struct OpportunityService {
    fs: Arc<dyn FileSystem>,
    store: JsonStore<OpportunityCatalog>,
    settings: Arc<Settings>,
}

impl OpportunityService {
    pub fn new(fs: Arc<dyn FileSystem>, settings: Arc<Settings>) -> Self {
        let store = JsonStore::new(fs.clone(), settings.opportunities_path());
        Self {
            fs,
            store,
            settings,
        }
    }

    pub fn load(&self) -> ApplicationResult<OpportunityCatalog> {
        self.store.load()
    }

    pub fn get(&self, reference: &str) -> ApplicationResult<Opportunity> {
        let catalog = self.load()?;
        let ids = catalog.all().iter().map(|o| o.id.as_str());
        let id = resolve_reference(ids, reference, |_| None)?;
        let opp = catalog
            .get(&id)
            .cloned()
            .ok_or(DomainError::ItemNotFound(id))?;
        Ok(opp)
    }

    /// Opportunities that match the company profile (skipped when `all`)
    /// and the filter.
    pub fn relevant(
        &self,
        filter: &OpportunityFilter,
        all: bool,
    ) -> ApplicationResult<Vec<Opportunity>> {
        let catalog = self.load()?;
        let profile = (!all).then_some(&self.settings.company);
        Ok(catalog
            .relevant(profile, filter)
            .into_iter()
            .cloned()
            .collect())
    }

    pub fn facets(&self) -> ApplicationResult<Facets> {
        Ok(self.load()?.facets())
    }

    /// Import a CSV/TSV file in front of the existing catalog.
    #[instrument(level = "debug", skip(self))]
    pub fn import(&self, path: &Path, today: NaiveDate) -> ApplicationResult<usize> {
        let rows = read_rows(self.fs.as_ref(), path)?;
        let batch = map_opportunity_rows(&rows, today);
        let mut catalog = self.load()?;
        let added = catalog.prepend_batch(batch);
        self.store.save(&catalog)?;
        info!("imported {} opportunities from {}", added, path.display());
        Ok(added)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn remove(&self, reference: &str) -> ApplicationResult<Opportunity> {
        let opp = self.get(reference)?;
        let mut catalog = self.load()?;
        catalog.remove(&opp.id);
        self.store.save(&catalog)?;
        Ok(opp)
    }

    /// Add the opportunity's due date to the planner.
    pub fn track(&self, reference: &str, planner: &PlannerService) -> ApplicationResult<String> {
        let opp = self.get(reference)?;
        planner.add_from_opportunity(&opp)
    }
}
