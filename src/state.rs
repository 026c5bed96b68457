use std::sync::Arc;

use crate::config::Config;
use crate::registry::ModelRegistry;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub registry: Arc<ModelRegistry>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let registry = Arc::new(ModelRegistry::new(config.models.clone()));
        Self { config, registry }
    }

    /// Build state around an existing registry. Used by tests to inject
    /// pre-loaded stub models.
    pub fn with_registry(config: Config, registry: Arc<ModelRegistry>) -> Self {
        Self { config, registry }
    }
}
