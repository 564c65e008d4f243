//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem) and own one store
//! each, but are themselves concrete structs, not traits.

mod opportunity;
mod outline;
mod planner;
pub mod reference;

pub use opportunity::OpportunityService;
pub use outline::OutlineService;
pub use planner::{PlannerService, PlannerSummary};
pub use reference::resolve_reference;
