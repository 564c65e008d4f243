//! Tabular import: CSV/TSV text into WBS items and opportunities
//!
//! Rows are read into string-keyed maps first (keys lowercased and trimmed),
//! then mapped field by field onto typed records. Missing or malformed
//! values fall back to defaults; a single bad cell never rejects a row.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{Duration, NaiveDate};
use regex::Regex;
use tracing::debug;

use crate::application::error_ext::{CsvResultExt, IoResultExt};
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{
    new_id, parse_date, ListItem, Opportunity, OpportunitySource, Priority, Status,
};
use crate::infrastructure::traits::FileSystem;

/// Days added to today when an imported opportunity has no usable due date.
pub const DEFAULT_DUE_DAYS: i64 = 60;

/// One data row keyed by lowercased header name.
pub type RawRow = BTreeMap<String, String>;

/// Parse delimited text with a header row.
///
/// The delimiter is a tab when the header line contains one, otherwise a
/// comma. Quoted fields may contain delimiters. Short rows are padded with
/// empty values; surplus cells are dropped.
pub fn parse_rows(text: &str) -> csv::Result<Vec<RawRow>> {
    let header_line = text.lines().next().unwrap_or_default();
    let delimiter = if header_line.contains('\t') { b'\t' } else { b',' };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: RawRow = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.clone(), record.get(i).unwrap_or_default().to_string()))
            .collect();
        rows.push(row);
    }
    debug!(columns = headers.len(), rows = rows.len(), "parsed rows");
    Ok(rows)
}

/// Read and parse a CSV/TSV file.
pub fn read_rows(fs: &dyn FileSystem, path: &Path) -> ApplicationResult<Vec<RawRow>> {
    let text = fs
        .read_to_string(path)
        .with_path_context("read import file", path)?;
    parse_rows(&text).for_import(path)
}

/// Split a list cell on `|`, `;` or `,`, dropping blanks.
pub fn split_list(cell: &str) -> Vec<String> {
    cell.split(['|', ';', ','])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn cell<'a>(row: &'a RawRow, key: &str) -> Option<&'a str> {
    row.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// Maps raw rows onto WBS items.
pub struct WbsRowMapper {
    max_level: usize,
    number_regex: Regex,
}

impl WbsRowMapper {
    pub fn new(max_level: usize) -> ApplicationResult<Self> {
        let number_regex =
            Regex::new(r"^\d+(\.\d+)*$").map_err(|e| ApplicationError::OperationFailed {
                context: "compile WBS number pattern".into(),
                source: Box::new(e),
            })?;
        Ok(Self {
            max_level,
            number_regex,
        })
    }

    /// Level from the `level` column, else from a dotted `number`/`wbs` column.
    fn level(&self, row: &RawRow) -> usize {
        let explicit = cell(row, "level").and_then(|v| v.parse::<i64>().ok());
        let derived = || {
            cell(row, "number")
                .or_else(|| cell(row, "wbs"))
                .filter(|n| self.number_regex.is_match(n))
                .map(|n| n.split('.').count() as i64 - 1)
        };
        let level = explicit.or_else(derived).unwrap_or(0);
        level.clamp(0, self.max_level as i64) as usize
    }

    pub fn map(&self, row: &RawRow) -> ListItem {
        let mut item = ListItem::new(cell(row, "title").unwrap_or_default(), self.level(row));
        item.owner = cell(row, "owner").map(String::from);
        item.due = cell(row, "due").and_then(|d| parse_date(d).ok());
        item.status = cell(row, "status")
            .and_then(|s| s.parse::<Status>().ok())
            .unwrap_or_default();
        item.priority = cell(row, "priority")
            .and_then(|p| p.parse::<Priority>().ok())
            .unwrap_or_default();
        item
    }

    pub fn map_all(&self, rows: &[RawRow]) -> Vec<ListItem> {
        rows.iter().map(|r| self.map(r)).collect()
    }
}

/// Map one opportunity row. `batch` is shared by all rows of one import.
pub fn map_opportunity_row(row: &RawRow, index: usize, batch: &str, today: NaiveDate) -> Opportunity {
    let list = |key: &str| cell(row, key).map(split_list).unwrap_or_default();
    Opportunity {
        id: format!("csv-{batch}-{index}"),
        title: cell(row, "title").unwrap_or_default().to_string(),
        agency: cell(row, "agency").unwrap_or_default().to_string(),
        source: cell(row, "source")
            .and_then(|s| s.parse::<OpportunitySource>().ok())
            .unwrap_or_default(),
        topic: cell(row, "topic").unwrap_or_default().to_string(),
        naics: list("naics"),
        keywords: list("keywords"),
        url: cell(row, "url").map(String::from),
        due: cell(row, "due")
            .and_then(|d| parse_date(d).ok())
            .unwrap_or(today + Duration::days(DEFAULT_DUE_DAYS)),
        tags: list("tags"),
    }
}

pub fn map_opportunity_rows(rows: &[RawRow], today: NaiveDate) -> Vec<Opportunity> {
    let batch = new_id();
    rows.iter()
        .enumerate()
        .map(|(i, row)| map_opportunity_row(row, i, &batch, today))
        .collect()
}
