//! Service container for dependency injection
//!
//! Wires up the binder with its settings-derived dependencies.

use std::sync::Arc;

use crate::application::services::ConfigBinder;
use crate::config::Settings;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};

/// Container holding settings and I/O boundaries.
///
/// The binder itself is built on demand: it owns `Rc` state and is cheap
/// to construct.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealFileSystem))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, fs: Arc<dyn FileSystem>) -> Self {
        let settings = Arc::new(settings);

        Self { settings, fs }
    }

    /// Binder configured from the current settings.
    pub fn binder(&self) -> ConfigBinder {
        ConfigBinder::new(&self.settings)
    }
}
