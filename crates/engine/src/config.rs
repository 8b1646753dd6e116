//! Catalog configuration
//!
//! Small knobs for the composition root. Defaults match production
//! behavior; tests flip individual flags.

/// Configuration for a [`crate::Catalog`]
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Whether the workspace-isolation overlay is honored at all
    ///
    /// When off, the isolation wrapper becomes a pass-through.
    pub workspace_isolation: bool,

    /// Whether add/save stamp `date_created` / `date_modified`
    pub stamp_modification_times: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            workspace_isolation: true,
            stamp_modification_times: true,
        }
    }
}

impl CatalogConfig {
    /// The default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle the isolation overlay
    pub fn workspace_isolation(mut self, enabled: bool) -> Self {
        self.workspace_isolation = enabled;
        self
    }

    /// Toggle creation/modification stamping
    pub fn stamp_modification_times(mut self, enabled: bool) -> Self {
        self.stamp_modification_times = enabled;
        self
    }
}
