use std::sync::Arc;

use crate::config::Config;
use crate::services::{CatalogClient, EmbeddingProvider, PopularityCache};

/// Shared application state
///
/// Built once by the composition root; every handler gets a cheap clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: Arc<dyn CatalogClient>,
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub popularity: Arc<PopularityCache>,
}

impl AppState {
    pub fn new(
        config: Config,
        catalog: Arc<dyn CatalogClient>,
        embedder: Arc<dyn EmbeddingProvider>,
        popularity: Arc<PopularityCache>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            catalog,
            embedder,
            popularity,
        }
    }
}
