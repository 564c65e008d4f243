//! Projection of the outline onto an editable grid.

use crate::domain::entities::{parse_date, ListItem, DATE_FORMAT};
use crate::domain::grid::{CellPos, Grid};
use crate::domain::outline::Outline;

/// Editable columns of the WBS table, left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WbsColumn {
    Title,
    Owner,
    Due,
    Status,
    Priority,
}

impl WbsColumn {
    pub const ALL: [WbsColumn; 5] = [
        WbsColumn::Title,
        WbsColumn::Owner,
        WbsColumn::Due,
        WbsColumn::Status,
        WbsColumn::Priority,
    ];

    pub fn header(&self) -> &'static str {
        match self {
            WbsColumn::Title => "title",
            WbsColumn::Owner => "owner",
            WbsColumn::Due => "due",
            WbsColumn::Status => "status",
            WbsColumn::Priority => "priority",
        }
    }

    pub fn index_of(name: &str) -> Option<usize> {
        let name = name.trim().to_lowercase();
        Self::ALL.iter().position(|c| c.header() == name)
    }

    fn read(&self, item: &ListItem) -> String {
        match self {
            WbsColumn::Title => item.title.clone(),
            WbsColumn::Owner => item.owner.clone().unwrap_or_default(),
            WbsColumn::Due => item
                .due
                .map(|d| d.format(DATE_FORMAT).to_string())
                .unwrap_or_default(),
            WbsColumn::Status => item.status.to_string(),
            WbsColumn::Priority => item.priority.to_string(),
        }
    }

    /// Best-effort write: values that do not parse leave the field as it was,
    /// blank owner or due clears it.
    fn write(&self, item: &mut ListItem, value: &str) {
        let value = value.trim();
        match self {
            WbsColumn::Title => item.title = value.to_string(),
            WbsColumn::Owner => {
                item.owner = (!value.is_empty()).then(|| value.to_string());
            }
            WbsColumn::Due => {
                if value.is_empty() {
                    item.due = None;
                } else if let Ok(date) = parse_date(value) {
                    item.due = Some(date);
                }
            }
            WbsColumn::Status => {
                if let Ok(status) = value.parse() {
                    item.status = status;
                }
            }
            WbsColumn::Priority => {
                if let Ok(priority) = value.parse() {
                    item.priority = priority;
                }
            }
        }
    }
}

impl Outline {
    /// One grid row per item, one column per [`WbsColumn`].
    pub fn to_grid(&self) -> Grid {
        let rows = self
            .items()
            .iter()
            .map(|item| WbsColumn::ALL.iter().map(|c| c.read(item)).collect())
            .collect();
        Grid::from_rows(rows, WbsColumn::ALL.len())
    }

    /// Write the given grid cells back into their items.
    ///
    /// Cells beyond the outline are ignored; the outline never grows here.
    pub fn apply_cells(&mut self, grid: &Grid, cells: &[CellPos]) {
        let items = self.items_mut();
        for pos in cells {
            let (Some(item), Some(column), Some(value)) = (
                items.get_mut(pos.row),
                WbsColumn::ALL.get(pos.col),
                grid.cell(pos.row, pos.col),
            ) else {
                continue;
            };
            column.write(item, value);
        }
    }

    /// Paste clipboard text into the WBS table at `(row, col)`.
    ///
    /// Only the pasted block is written back. Returns the number of cells
    /// written.
    pub fn paste(&mut self, row: usize, col: usize, text: &str) -> usize {
        let mut grid = self.to_grid();
        let cells = grid.paste_cells(row, col, text);
        self.apply_cells(&grid, &cells);
        cells.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Priority, Status};
    use crate::domain::outline::MAX_LEVEL;

    #[test]
    fn test_paste_owner_and_due_block() {
        let mut outline = Outline::proposal_template(MAX_LEVEL);
        let written = outline.paste(1, 1, "dana\t2025-10-01\nlee\t2025-10-15\n");

        assert_eq!(written, 4);
        let items = outline.items();
        assert_eq!(items[1].owner.as_deref(), Some("dana"));
        assert_eq!(items[2].owner.as_deref(), Some("lee"));
        assert_eq!(items[2].due, parse_date("2025-10-15").ok());
        assert_eq!(items[0].owner, None);
        assert_eq!(items[3].owner, None);
    }

    #[test]
    fn test_paste_clipped_to_existing_rows_and_columns() {
        let mut outline = Outline::proposal_template(MAX_LEVEL);
        let written = outline.paste(4, 3, "done,P0,extra\nignored,row");
        assert_eq!(written, 2);
        assert_eq!(outline.len(), 5);
        assert_eq!(outline.items()[4].status, Status::Done);
        assert_eq!(outline.items()[4].priority, Priority::P0);
    }

    #[test]
    fn test_unparseable_values_leave_fields_unchanged() {
        let mut outline = Outline::proposal_template(MAX_LEVEL);
        outline.paste(0, 2, "someday\tblocked\tP9");
        let first = &outline.items()[0];
        assert_eq!(first.due, None);
        assert_eq!(first.status, Status::NotStarted);
        assert_eq!(first.priority, Priority::P2);
    }

    #[test]
    fn test_cells_outside_pasted_block_untouched() {
        let mut outline = Outline::from_items(
            vec![ListItem::new("  Draft  ", 0), ListItem::new("B", 0)],
            MAX_LEVEL,
        );

        let written = outline.paste(1, 1, "lee");

        assert_eq!(written, 1);
        assert_eq!(outline.items()[0].title, "  Draft  ");
        assert_eq!(outline.items()[1].owner.as_deref(), Some("lee"));
    }

    #[test]
    fn test_column_lookup_by_header() {
        assert_eq!(WbsColumn::index_of("Due"), Some(2));
        assert_eq!(WbsColumn::index_of("number"), None);
    }
}
