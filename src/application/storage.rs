//! JSON-file stores for the outline, deadline book and opportunity catalog
//!
//! Each aggregate lives in its own file under the data directory. A missing
//! file loads as the empty aggregate; saves replace the file atomically.

use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::application::error_ext::{IoResultExt, JsonResultExt};
use crate::application::ApplicationResult;
use crate::infrastructure::traits::FileSystem;

/// Typed store backed by one JSON file.
pub struct JsonStore<T> {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonStore<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    pub fn new(fs: Arc<dyn FileSystem>, path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            path: path.into(),
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.fs.exists(&self.path)
    }

    /// Load the aggregate, or its default when the file does not exist yet.
    #[instrument(level = "debug", skip(self), fields(path = %self.path.display()))]
    pub fn load(&self) -> ApplicationResult<T> {
        if !self.fs.exists(&self.path) {
            debug!("store missing, starting empty");
            return Ok(T::default());
        }
        let content = self
            .fs
            .read_to_string(&self.path)
            .with_path_context("read store", &self.path)?;
        if content.trim().is_empty() {
            return Ok(T::default());
        }
        serde_json::from_str(&content).for_store(&self.path)
    }

    #[instrument(level = "debug", skip(self, value), fields(path = %self.path.display()))]
    pub fn save(&self, value: &T) -> ApplicationResult<()> {
        let mut content = serde_json::to_string_pretty(value).for_store(&self.path)?;
        content.push('\n');
        self.fs
            .write_atomic(&self.path, &content)
            .with_path_context("write store", &self.path)?;
        debug!(bytes = content.len(), "store saved");
        Ok(())
    }
}
