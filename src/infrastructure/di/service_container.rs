//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::{OpportunityService, OutlineService, PlannerService};
use crate::config::Settings;
use crate::infrastructure::traits::{CommandEditor, Editor, FileSystem, RealFileSystem};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Editor abstraction
    pub editor: Arc<dyn Editor>,

    pub outline: OutlineService,
    pub planner: PlannerService,
    pub opportunities: OpportunityService,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        let editor = Arc::new(CommandEditor::new(settings.editor.clone()));
        Self::with_deps(settings, Arc::new(RealFileSystem), editor)
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, fs: Arc<dyn FileSystem>, editor: Arc<dyn Editor>) -> Self {
        let settings = Arc::new(settings);

        let outline = OutlineService::new(fs.clone(), settings.clone());
        let planner = PlannerService::new(fs.clone(), settings.clone());
        let opportunities = OpportunityService::new(fs.clone(), settings.clone());

        Self {
            settings,
            fs,
            editor,
            outline,
            planner,
            opportunities,
        }
    }
}
