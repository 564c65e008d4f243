//! Funding opportunities and relevance matching against the company profile.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// Where an opportunity was published.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpportunitySource {
    #[serde(rename = "AFWERX")]
    Afwerx,
    #[serde(rename = "DSIP")]
    Dsip,
    #[serde(rename = "SAM")]
    Sam,
    #[default]
    Other,
}

impl fmt::Display for OpportunitySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OpportunitySource::Afwerx => "AFWERX",
            OpportunitySource::Dsip => "DSIP",
            OpportunitySource::Sam => "SAM",
            OpportunitySource::Other => "Other",
        };
        f.write_str(s)
    }
}

impl FromStr for OpportunitySource {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "AFWERX" => Ok(OpportunitySource::Afwerx),
            "DSIP" => Ok(OpportunitySource::Dsip),
            "SAM" | "SAM.GOV" => Ok(OpportunitySource::Sam),
            "OTHER" => Ok(OpportunitySource::Other),
            _ => Err(DomainError::UnknownSource(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opportunity {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub agency: String,
    #[serde(default)]
    pub source: OpportunitySource,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub naics: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub due: NaiveDate,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Opportunity {
    fn haystack(&self) -> String {
        [
            self.title.as_str(),
            self.topic.as_str(),
            &self.keywords.join(" "),
        ]
        .join(" ")
        .to_lowercase()
    }
}

/// Company data that decides which opportunities are worth a look.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyProfile {
    pub name: String,
    pub stage: String,
    pub capabilities: String,
    pub naics: Vec<String>,
    pub keywords: Vec<String>,
}

impl CompanyProfile {
    /// Shares a NAICS code or a keyword (case-insensitive) with the opportunity.
    pub fn matches(&self, opp: &Opportunity) -> bool {
        let naics_hit = self.naics.iter().any(|n| opp.naics.contains(n));
        let keyword_hit = self.keywords.iter().any(|k| {
            opp.keywords
                .iter()
                .any(|ok| ok.to_lowercase() == k.to_lowercase())
        });
        naics_hit || keyword_hit
    }
}

/// User-driven narrowing. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpportunityFilter {
    pub query: Option<String>,
    pub agency: Option<String>,
    pub source: Option<OpportunitySource>,
    pub naics: Option<String>,
    pub tag: Option<String>,
}

impl OpportunityFilter {
    pub fn matches(&self, opp: &Opportunity) -> bool {
        let query_hit = match self.query.as_deref().map(str::trim) {
            Some(q) if !q.is_empty() => opp.haystack().contains(&q.to_lowercase()),
            _ => true,
        };
        let agency_hit = self.agency.as_ref().map_or(true, |a| &opp.agency == a);
        let source_hit = self.source.map_or(true, |s| opp.source == s);
        let naics_hit = self.naics.as_ref().map_or(true, |n| opp.naics.contains(n));
        let tag_hit = self.tag.as_ref().map_or(true, |t| opp.tags.contains(t));
        query_hit && agency_hit && source_hit && naics_hit && tag_hit
    }
}

/// Distinct values offered as filter choices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Facets {
    pub agencies: Vec<String>,
    pub sources: Vec<OpportunitySource>,
    pub naics: Vec<String>,
    pub tags: Vec<String>,
}

/// Opportunity catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpportunityCatalog {
    opportunities: Vec<Opportunity>,
}

impl OpportunityCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_opportunities(opportunities: Vec<Opportunity>) -> Self {
        Self { opportunities }
    }

    pub fn all(&self) -> &[Opportunity] {
        &self.opportunities
    }

    pub fn len(&self) -> usize {
        self.opportunities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.opportunities.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Opportunity> {
        self.opportunities.iter().find(|o| o.id == id)
    }

    /// Put a freshly imported batch in front of the existing catalog.
    pub fn prepend_batch(&mut self, batch: Vec<Opportunity>) -> usize {
        let added = batch.len();
        self.opportunities.splice(0..0, batch);
        added
    }

    pub fn remove(&mut self, id: &str) -> Option<Opportunity> {
        let pos = self.opportunities.iter().position(|o| o.id == id)?;
        Some(self.opportunities.remove(pos))
    }

    /// Opportunities matching the profile (unless `profile` is `None`) and filter.
    pub fn relevant(
        &self,
        profile: Option<&CompanyProfile>,
        filter: &OpportunityFilter,
    ) -> Vec<&Opportunity> {
        self.opportunities
            .iter()
            .filter(|o| profile.map_or(true, |p| p.matches(o)))
            .filter(|o| filter.matches(o))
            .collect()
    }

    pub fn facets(&self) -> Facets {
        Facets {
            agencies: self
                .opportunities
                .iter()
                .map(|o| o.agency.clone())
                .filter(|a| !a.is_empty())
                .unique()
                .collect(),
            sources: self.opportunities.iter().map(|o| o.source).unique().collect(),
            naics: self
                .opportunities
                .iter()
                .flat_map(|o| o.naics.iter().cloned())
                .unique()
                .collect(),
            tags: self
                .opportunities
                .iter()
                .flat_map(|o| o.tags.iter().cloned())
                .unique()
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opp(id: &str, agency: &str, naics: &[&str], keywords: &[&str], tags: &[&str]) -> Opportunity {
        Opportunity {
            id: id.into(),
            title: format!("{id} title"),
            agency: agency.into(),
            source: OpportunitySource::Other,
            topic: String::new(),
            naics: naics.iter().map(|s| s.to_string()).collect(),
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
            url: None,
            due: NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(),
            tags: tags.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn catalog() -> OpportunityCatalog {
        OpportunityCatalog::from_opportunities(vec![
            opp("sbir", "USAF", &["541715"], &["SBIR"], &["SBIR"]),
            opp("sda", "Space Force", &["334220"], &["SDA", "space"], &["Space"]),
            opp("ato", "USAF", &["541519"], &["RMF"], &["Security"]),
        ])
    }

    fn profile() -> CompanyProfile {
        CompanyProfile {
            naics: vec!["541715".into()],
            keywords: vec!["sda".into()],
            ..Default::default()
        }
    }

    #[test]
    fn test_profile_matches_naics_or_keyword() {
        let catalog = catalog();
        let ids: Vec<_> = catalog
            .relevant(Some(&profile()), &OpportunityFilter::default())
            .iter()
            .map(|o| o.id.as_str())
            .collect();
        assert_eq!(ids, vec!["sbir", "sda"]);
    }

    #[test]
    fn test_filters_combine_with_profile() {
        let catalog = catalog();
        let filter = OpportunityFilter {
            agency: Some("USAF".into()),
            ..Default::default()
        };
        let ids: Vec<_> = catalog
            .relevant(Some(&profile()), &filter)
            .iter()
            .map(|o| o.id.as_str())
            .collect();
        assert_eq!(ids, vec!["sbir"]);
    }

    #[test]
    fn test_query_searches_title_topic_keywords() {
        let catalog = catalog();
        let filter = OpportunityFilter {
            query: Some("rmf".into()),
            ..Default::default()
        };
        assert_eq!(catalog.relevant(None, &filter).len(), 1);
    }

    #[test]
    fn test_facets_are_distinct_in_first_seen_order() {
        let facets = catalog().facets();
        assert_eq!(facets.agencies, vec!["USAF", "Space Force"]);
        assert_eq!(facets.sources, vec![OpportunitySource::Other]);
        assert_eq!(facets.naics.len(), 3);
    }

    #[test]
    fn test_prepend_batch_puts_new_first() {
        let mut catalog = catalog();
        catalog.prepend_batch(vec![opp("new", "DoD", &[], &[], &[])]);
        assert_eq!(catalog.all()[0].id, "new");
        assert_eq!(catalog.len(), 4);
    }
}
