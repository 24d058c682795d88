use std::sync::Arc;
use std::time::Duration;

use movie_insight_api::{
    api::{create_router, AppState},
    config::Config,
    services::{
        movie_lookup::build_settings, BuildOutcome, CatalogClient, EmbeddingProvider,
        FastEmbedProvider, PopularityCache, TmdbClient,
    },
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("movie_insight_api=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    let catalog: Arc<dyn CatalogClient> = Arc::new(TmdbClient::new(
        config.tmdb_api_key.clone(),
        config.tmdb_api_url.clone(),
        Duration::from_secs(config.catalog_timeout_secs),
    )?);
    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(FastEmbedProvider::new().await?);
    let popularity = Arc::new(PopularityCache::new());

    // Warm the recommendation pool before taking traffic; an empty pool is retried lazily
    match popularity
        .build_if_empty(Arc::clone(&catalog), embedder.as_ref(), build_settings(&config))
        .await
    {
        Ok(BuildOutcome::EmptyPool) => {
            tracing::warn!("Starting with an empty recommendation pool")
        }
        Ok(outcome) => tracing::info!(?outcome, "Recommendation pool ready"),
        Err(e) => tracing::error!(error = %e, "Recommendation pool warm-up failed"),
    }

    let address = config.bind_address();
    let state = AppState::new(config, catalog, embedder, popularity);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(address = %address, "Movie insight API listening");
    axum::serve(listener, app).await?;

    Ok(())
}
