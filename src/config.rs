use serde::Deserialize;

use crate::services::recommendations::RecommendationPolicy;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// TMDB API key (v3 auth)
    pub tmdb_api_key: String,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Prefix joined with poster/backdrop/profile paths
    #[serde(default = "default_tmdb_image_base")]
    pub tmdb_image_base: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of "popular" listing pages pulled into the recommendation pool
    #[serde(default = "default_popular_pages")]
    pub popular_pages: u32,

    /// Timeout applied to every individual catalog request
    #[serde(default = "default_catalog_timeout_secs")]
    pub catalog_timeout_secs: u64,

    /// Minimum cosine similarity for a candidate to be recommended
    #[serde(default = "default_similarity_floor")]
    pub similarity_floor: f32,

    /// Maximum number of recommendations per movie
    #[serde(default = "default_max_recommendations")]
    pub max_recommendations: usize,

    /// Country code used to pick the watch-provider link
    #[serde(default = "default_watch_region")]
    pub watch_region: String,

    /// Number of cast members included in a movie response
    #[serde(default = "default_cast_limit")]
    pub cast_limit: usize,
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_tmdb_image_base() -> String {
    "https://image.tmdb.org/t/p/original".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_popular_pages() -> u32 {
    5
}

fn default_catalog_timeout_secs() -> u64 {
    10
}

fn default_similarity_floor() -> f32 {
    0.25
}

fn default_max_recommendations() -> usize {
    6
}

fn default_watch_region() -> String {
    "IN".to_string()
}

fn default_cast_limit() -> usize {
    5
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Builds a config from explicit key/value pairs (env-style, upper-case keys)
    pub fn from_vars<I>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter::<_, Config>(vars).map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn recommendation_policy(&self) -> RecommendationPolicy {
        RecommendationPolicy {
            similarity_floor: self.similarity_floor,
            max_results: self.max_recommendations,
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
