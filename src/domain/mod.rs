//! Domain layer: entities and business logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod deadline;
pub mod editor;
pub mod entities;
pub mod error;
pub mod grid;
pub mod opportunity;
pub mod outline;
pub mod table;

pub use deadline::{days_until, Category, Deadline, DeadlineBook, NewDeadline, DEFAULT_REMINDERS};
pub use editor::{Key, OutlineEditor};
pub use entities::*;
pub use error::DomainError;
pub use grid::{parse_clipboard, CellPos, Grid};
pub use opportunity::{
    CompanyProfile, Facets, Opportunity, OpportunityCatalog, OpportunityFilter, OpportunitySource,
};
pub use outline::{renumber, Outline, MAX_LEVEL};
pub use table::WbsColumn;
