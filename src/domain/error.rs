//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent values that cannot be interpreted.
///
/// Store operations themselves never fail; these only surface when a
/// user-typed value has to be parsed at a boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("unknown status: {0} (expected not-started, in-progress or done)")]
    UnknownStatus(String),

    #[error("unknown priority: {0} (expected P0, P1 or P2)")]
    UnknownPriority(String),

    #[error("unknown category: {0} (expected govcon, product or fundraise)")]
    UnknownCategory(String),

    #[error("unknown opportunity source: {0}")]
    UnknownSource(String),

    #[error("unknown key: {0} (expected enter, tab, shift-tab, backspace, up, down, left or right)")]
    UnknownKey(String),

    #[error("invalid date: {0} (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("item not found: {0}")]
    ItemNotFound(String),

    #[error("ambiguous reference: {reference} matches {count} items")]
    AmbiguousReference { reference: String, count: usize },
}
