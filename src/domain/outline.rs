//! Hierarchical list store for the work-breakdown structure.
//!
//! The outline is a flat, ordered sequence of [`ListItem`]s. Each item carries
//! a nesting level; the hierarchy is implied by order: an item's children are
//! the contiguous run of following items with a strictly greater level.
//! Dotted numbers ("1.2.3") are recomputed from order and levels on every read.

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::domain::entities::{ItemPatch, ItemRow, ListItem};

/// Default nesting limit for indent.
pub const MAX_LEVEL: usize = 5;

/// Ordered sequence of WBS items with hierarchy-aware editing.
///
/// All operations are total. Referencing an unknown id is a no-op, reported
/// through the return value (`None` / `false`) rather than an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outline {
    items: Vec<ListItem>,
    #[serde(default = "default_max_level")]
    max_level: usize,
}

fn default_max_level() -> usize {
    MAX_LEVEL
}

impl Default for Outline {
    fn default() -> Self {
        Self::new()
    }
}

impl Outline {
    pub fn new() -> Self {
        Self::with_max_level(MAX_LEVEL)
    }

    pub fn with_max_level(max_level: usize) -> Self {
        Self {
            items: Vec::new(),
            max_level,
        }
    }

    /// Build from externally supplied items, clamping out-of-range levels.
    pub fn from_items(items: Vec<ListItem>, max_level: usize) -> Self {
        let mut outline = Self::with_max_level(max_level);
        outline.append_batch(items);
        outline
    }

    /// Standard proposal skeleton used to seed an empty workspace.
    pub fn proposal_template(max_level: usize) -> Self {
        let items = [
            ("Proposal", 0),
            ("Capture plan", 1),
            ("Technical Volume", 1),
            ("System architecture", 2),
            ("Submission", 0),
        ]
        .into_iter()
        .map(|(title, level)| ListItem::new(title, level))
        .collect();
        Self::from_items(items, max_level)
    }

    pub fn max_level(&self) -> usize {
        self.max_level
    }

    /// Change the nesting limit. Existing deeper items are clamped.
    pub fn set_max_level(&mut self, max_level: usize) {
        self.max_level = max_level;
        for item in &mut self.items {
            item.level = item.level.min(max_level);
        }
    }

    pub fn items(&self) -> &[ListItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&ListItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|i| i.id == id)
    }

    /// Append a new root-level item at the end and return its id.
    #[instrument(level = "trace", skip(self))]
    pub fn add_row(&mut self, title: &str) -> String {
        let item = ListItem::new(title, 0);
        let id = item.id.clone();
        self.items.push(item);
        id
    }

    /// Insert a new empty item right after `after_id`, at the same level.
    ///
    /// Unknown `after_id` is a no-op and returns `None`; nothing is appended.
    #[instrument(level = "trace", skip(self))]
    pub fn add_sibling(&mut self, after_id: &str) -> Option<String> {
        let pos = self.position(after_id)?;
        let level = self.items[pos].level;
        Some(self.insert_at(pos + 1, level))
    }

    /// Insert a new empty item right after `after_id`, one level deeper.
    #[instrument(level = "trace", skip(self))]
    pub fn add_child(&mut self, after_id: &str) -> Option<String> {
        let pos = self.position(after_id)?;
        let level = (self.items[pos].level + 1).min(self.max_level);
        Some(self.insert_at(pos + 1, level))
    }

    fn insert_at(&mut self, index: usize, level: usize) -> String {
        let item = ListItem::new("", level);
        let id = item.id.clone();
        self.items.insert(index, item);
        id
    }

    /// Increase the item's level, clamped at the nesting limit.
    #[instrument(level = "trace", skip(self))]
    pub fn indent(&mut self, id: &str) -> bool {
        let max_level = self.max_level;
        match self.items.iter_mut().find(|i| i.id == id) {
            Some(item) => {
                item.level = (item.level + 1).min(max_level);
                true
            }
            None => false,
        }
    }

    /// Decrease the item's level, clamped at 0.
    #[instrument(level = "trace", skip(self))]
    pub fn outdent(&mut self, id: &str) -> bool {
        match self.items.iter_mut().find(|i| i.id == id) {
            Some(item) => {
                item.level = item.level.saturating_sub(1);
                true
            }
            None => false,
        }
    }

    /// Remove a single item.
    ///
    /// Descendants are not reparented and keep their levels; they attach to
    /// whatever now precedes them when numbers are recomputed.
    #[instrument(level = "trace", skip(self))]
    pub fn remove(&mut self, id: &str) -> Option<ListItem> {
        let pos = self.position(id)?;
        Some(self.items.remove(pos))
    }

    /// Shallow-merge a partial update into the item.
    #[instrument(level = "trace", skip(self))]
    pub fn update(&mut self, id: &str, patch: &ItemPatch) -> bool {
        match self.items.iter_mut().find(|i| i.id == id) {
            Some(item) => {
                item.apply(patch);
                true
            }
            None => false,
        }
    }

    /// Append a batch of items in one step, clamping their levels.
    pub fn append_batch(&mut self, items: impl IntoIterator<Item = ListItem>) -> usize {
        let max_level = self.max_level;
        let before = self.items.len();
        self.items.extend(items.into_iter().map(|mut item| {
            item.level = item.level.min(max_level);
            item
        }));
        self.items.len() - before
    }

    /// Dotted numbers for every item, in order.
    pub fn numbers(&self) -> Vec<String> {
        renumber(self.items.iter().map(|i| i.level))
    }

    /// Items paired with their computed numbers.
    pub fn rows(&self) -> Vec<ItemRow> {
        self.items
            .iter()
            .zip(self.numbers())
            .map(|(item, number)| ItemRow {
                number,
                id: item.id.clone(),
                title: item.title.clone(),
                level: item.level,
                owner: item.owner.clone(),
                due: item.due,
                status: item.status,
                priority: item.priority,
            })
            .collect()
    }

    /// Resolve a dotted number such as `1.2` to the item's id.
    pub fn find_by_number(&self, number: &str) -> Option<&str> {
        let wanted = number.trim().trim_end_matches('.');
        self.numbers()
            .iter()
            .position(|n| n == wanted)
            .map(|pos| self.items[pos].id.as_str())
    }

    /// Ids of the item and its descendants (the contiguous deeper run).
    pub fn subtree(&self, id: &str) -> Vec<&str> {
        let Some(pos) = self.position(id) else {
            return Vec::new();
        };
        let level = self.items[pos].level;
        std::iter::once(self.items[pos].id.as_str())
            .chain(
                self.items[pos + 1..]
                    .iter()
                    .take_while(|i| i.level > level)
                    .map(|i| i.id.as_str()),
            )
            .collect()
    }

    pub(crate) fn items_mut(&mut self) -> &mut [ListItem] {
        &mut self.items
    }
}

/// Compute dotted numbers from a sequence of levels.
///
/// One running counter is kept per depth. An item at depth `d` increments the
/// counter at `d` and drops every deeper counter; its number is the counters
/// from the root down to `d` joined with dots.
///
/// Depth is the item's effective depth in the implied tree: a level with no
/// shallower predecessor (for example the children of a deleted root) takes
/// over the depth of the items it displaced instead of leaving a gap. For a
/// well-formed outline this is exactly the item's level.
pub fn renumber(levels: impl IntoIterator<Item = usize>) -> Vec<String> {
    // (level, counter) for each open depth, root first
    let mut stack: Vec<(usize, usize)> = Vec::new();

    levels
        .into_iter()
        .map(|level| {
            let mut displaced = None;
            while let Some(&(open_level, counter)) = stack.last() {
                if open_level <= level {
                    break;
                }
                displaced = Some(counter);
                stack.pop();
            }
            let continues = matches!(stack.last(), Some(&(open_level, _)) if open_level == level);
            if continues {
                if let Some(top) = stack.last_mut() {
                    top.1 += 1;
                }
            } else {
                stack.push((level, displaced.map_or(1, |c| c + 1)));
            }
            stack.iter().map(|(_, counter)| counter).join(".")
        })
        .collect()
}
