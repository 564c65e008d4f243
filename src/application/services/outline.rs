//! WBS outline service
//!
//! Loads the outline store, applies one editing operation and saves it back.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::application::export::{outline_events, outline_to_csv, to_ics};
use crate::application::import::{read_rows, WbsRowMapper};
use crate::application::services::reference::resolve_reference;
use crate::application::storage::JsonStore;
use crate::application::ApplicationResult;
use crate::config::Settings;
use crate::domain::{DomainError, ItemPatch, ItemRow, Key, Outline, OutlineEditor};
use crate::infrastructure::traits::FileSystem;

/// Outline (work-breakdown structure) service.
pub struct OutlineService {
    fs: Arc<dyn FileSystem>,
    store: JsonStore<Outline>,
    settings: Arc<Settings>,
}

impl OutlineService {
    pub fn new(fs: Arc<dyn FileSystem>, settings: Arc<Settings>) -> Self {
        let store = JsonStore::new(fs.clone(), settings.outline_path());
        Self {
            fs,
            store,
            settings,
        }
    }

    fn max_level(&self) -> usize {
        self.settings.outline.max_level
    }

    /// Load the outline with the configured nesting limit applied.
    pub fn load(&self) -> ApplicationResult<Outline> {
        let mut outline = self.store.load()?;
        outline.set_max_level(self.max_level());
        Ok(outline)
    }

    /// Load, mutate, save. The closure's result is passed through.
    fn modify<R>(&self, f: impl FnOnce(&mut Outline) -> R) -> ApplicationResult<R> {
        let mut outline = self.load()?;
        let result = f(&mut outline);
        self.store.save(&outline)?;
        Ok(result)
    }

    /// Map a user reference (id, id prefix or dotted number) to an item id.
    pub fn resolve(&self, outline: &Outline, reference: &str) -> ApplicationResult<String> {
        let ids = outline.items().iter().map(|i| i.id.as_str());
        let id = resolve_reference(ids, reference, |n| {
            outline.find_by_number(n).map(String::from)
        })?;
        Ok(id)
    }

    pub fn rows(&self) -> ApplicationResult<Vec<ItemRow>> {
        Ok(self.load()?.rows())
    }

    /// Seed an empty outline with the proposal template. Returns false if
    /// the outline already has items.
    #[instrument(level = "debug", skip(self))]
    pub fn init_template(&self) -> ApplicationResult<bool> {
        self.modify(|outline| {
            if !outline.is_empty() {
                return false;
            }
            *outline = Outline::proposal_template(outline.max_level());
            true
        })
    }

    #[instrument(level = "debug", skip(self))]
    pub fn add_row(&self, title: &str) -> ApplicationResult<String> {
        self.modify(|outline| outline.add_row(title))
    }

    /// Insert after `reference` as sibling, or as child when `child` is set.
    /// The new item gets `title`.
    #[instrument(level = "debug", skip(self))]
    pub fn insert_after(
        &self,
        reference: &str,
        title: &str,
        child: bool,
    ) -> ApplicationResult<String> {
        let mut outline = self.load()?;
        let after = self.resolve(&outline, reference)?;
        let inserted = if child {
            outline.add_child(&after)
        } else {
            outline.add_sibling(&after)
        };
        let id = inserted.ok_or_else(|| DomainError::ItemNotFound(after.clone()))?;
        outline.update(
            &id,
            &ItemPatch {
                title: Some(title.to_string()),
                ..ItemPatch::default()
            },
        );
        self.store.save(&outline)?;
        debug!("inserted {} after {}", id, after);
        Ok(id)
    }

    /// Indent (`delta` > 0) or outdent (`delta` < 0) one item `|delta|` times.
    #[instrument(level = "debug", skip(self))]
    pub fn shift(&self, reference: &str, delta: i32) -> ApplicationResult<usize> {
        let mut outline = self.load()?;
        let id = self.resolve(&outline, reference)?;
        for _ in 0..delta.unsigned_abs() {
            if delta > 0 {
                outline.indent(&id);
            } else {
                outline.outdent(&id);
            }
        }
        let level = outline.get(&id).map(|i| i.level).unwrap_or_default();
        self.store.save(&outline)?;
        Ok(level)
    }

    /// Remove one item. Its descendants stay where they are.
    #[instrument(level = "debug", skip(self))]
    pub fn remove(&self, reference: &str) -> ApplicationResult<String> {
        let mut outline = self.load()?;
        let id = self.resolve(&outline, reference)?;
        let removed = outline.remove(&id);
        self.store.save(&outline)?;
        Ok(removed.map(|i| i.title).unwrap_or_default())
    }

    #[instrument(level = "debug", skip(self, patch))]
    pub fn update(&self, reference: &str, patch: &ItemPatch) -> ApplicationResult<String> {
        let mut outline = self.load()?;
        let id = self.resolve(&outline, reference)?;
        outline.update(&id, patch);
        self.store.save(&outline)?;
        Ok(id)
    }

    /// Paste delimited text into the WBS table. Returns cells written.
    #[instrument(level = "debug", skip(self, text))]
    pub fn paste(&self, row: usize, col: usize, text: &str) -> ApplicationResult<usize> {
        let written = self.modify(|outline| outline.paste(row, col, text))?;
        info!("pasted {} cells at ({}, {})", written, row, col);
        Ok(written)
    }

    /// Replay key presses starting at `reference`, then optionally type a
    /// title into the focused item. Returns the final focus.
    #[instrument(level = "debug", skip(self))]
    pub fn apply_keys(
        &self,
        reference: Option<&str>,
        keys: &[Key],
        title: Option<&str>,
    ) -> ApplicationResult<Option<String>> {
        let outline = self.load()?;
        let start = reference
            .map(|r| self.resolve(&outline, r))
            .transpose()?;

        let mut editor = OutlineEditor::new(outline);
        if let Some(id) = &start {
            editor.set_focus(id);
        }
        for key in keys {
            editor.handle_key(*key);
        }
        if let Some(title) = title {
            editor.type_title(title);
        }
        let focus = editor.focus().map(String::from);
        self.store.save(editor.outline())?;
        Ok(focus)
    }

    /// Append items from a CSV/TSV file. Returns the number imported.
    #[instrument(level = "debug", skip(self))]
    pub fn import(&self, path: &Path) -> ApplicationResult<usize> {
        let rows = read_rows(self.fs.as_ref(), path)?;
        let mapper = WbsRowMapper::new(self.max_level())?;
        let items = mapper.map_all(&rows);
        let added = self.modify(|outline| outline.append_batch(items))?;
        info!("imported {} WBS items from {}", added, path.display());
        Ok(added)
    }

    pub fn export_csv(&self) -> ApplicationResult<String> {
        outline_to_csv(&self.load()?)
    }

    /// Calendar of dated items; `None` when no item has a due date.
    pub fn export_ics(&self, stamp: chrono::NaiveDateTime) -> ApplicationResult<Option<String>> {
        let outline = self.load()?;
        Ok(to_ics(&outline_events(&outline), stamp))
    }
}
