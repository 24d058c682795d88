pub mod catalog;
pub mod embedding;
pub mod movie_lookup;
pub mod popularity;
pub mod recommendations;

pub use catalog::{CatalogClient, TmdbClient};
pub use embedding::{EmbeddingError, EmbeddingProvider, FastEmbedProvider};
pub use popularity::{BuildOutcome, BuildSettings, PopularityCache};
pub use recommendations::RecommendationPolicy;
