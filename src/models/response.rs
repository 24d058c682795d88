use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body of POST /api/movie
#[derive(Debug, Clone, Deserialize)]
pub struct MovieRequest {
    #[serde(default)]
    pub title: Option<String>,
}

/// Response returned to the client for a movie lookup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieResponse {
    pub movie: MovieView,
    pub recommendations: Vec<RecommendationItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieView {
    pub id: i64,
    pub title: String,
    pub overview: String,
    pub poster: Option<String>,
    pub backdrop: Option<String>,
    pub genres: Vec<String>,
    pub runtime: Option<u32>,
    pub release_date: Option<String>,
    pub rating: Option<f64>,
    /// Upper-cased ISO 639-1 code
    pub language: String,
    pub cast: Vec<CastMemberView>,
    #[serde(rename = "trailerUrl")]
    pub trailer_url: Option<String>,
    #[serde(rename = "watchUrl")]
    pub watch_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CastMemberView {
    pub name: Option<String>,
    pub character: Option<String>,
    pub profile_path: Option<String>,
}

/// A single similar-movie suggestion
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationItem {
    pub id: i64,
    pub title: String,
    pub poster: Option<String>,
    pub backdrop: Option<String>,
    pub rating: f64,
    /// Four-digit year or empty
    pub year: String,
    /// Cosine similarity as a percentage, one decimal place
    pub similarity: f64,
}

/// GET /api/health
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub cached_movies: usize,
    pub built_at: Option<DateTime<Utc>>,
}
