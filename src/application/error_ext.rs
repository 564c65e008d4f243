//! Error conversion helpers for store and import I/O
//!
//! Extension traits that attach the offending path to lower-level errors.

use std::io;
use std::path::Path;

use crate::application::{ApplicationError, ApplicationResult};

/// Attach an action and path to an I/O error.
pub trait IoResultExt<T> {
    /// ```ignore
    /// fs.read_to_string(&path)
    ///     .with_path_context("read store", &path)?;
    /// ```
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::OperationFailed {
            context: format!("{}: {}", action, path.display()),
            source: Box::new(e),
        })
    }
}

/// Turn a JSON decoding failure into a corrupt-store error for `path`.
pub trait JsonResultExt<T> {
    fn for_store(self, path: &Path) -> ApplicationResult<T>;
}

impl<T> JsonResultExt<T> for serde_json::Result<T> {
    fn for_store(self, path: &Path) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::CorruptStore {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

/// Turn a CSV failure into an import error for `path`.
pub trait CsvResultExt<T> {
    fn for_import(self, path: &Path) -> ApplicationResult<T>;
}

impl<T> CsvResultExt<T> for csv::Result<T> {
    fn for_import(self, path: &Path) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::Import {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}
