use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// TMDB sends `null` for text fields it has no value for; treat it like an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A movie record as returned by TMDB list and search endpoints
///
/// Popular-listing entries become recommendation candidates; search results
/// become the query movie handed to the ranker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandidateMovie {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub overview: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vote_average: f64,
    /// ISO date (`YYYY-MM-DD`) or empty
    #[serde(default, deserialize_with = "null_as_default")]
    pub release_date: String,
}

impl CandidateMovie {
    /// Text fed to the embedding model: title and overview joined by one space
    pub fn embedding_text(&self) -> String {
        format!("{} {}", self.title, self.overview)
    }

    /// Records without a synopsis carry too little text to embed usefully
    pub fn has_overview(&self) -> bool {
        !self.overview.is_empty()
    }

    /// First four characters of the release date, or empty when unknown
    pub fn release_year(&self) -> String {
        self.release_date.chars().take(4).collect()
    }
}

/// GET /movie/popular
#[derive(Debug, Clone, Deserialize)]
pub struct PopularPage {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub results: Vec<CandidateMovie>,
}

/// GET /search/movie
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub results: Vec<CandidateMovie>,
}

// ============================================================================
// Movie details (append_to_response=credits,watch/providers,videos)
// ============================================================================

/// GET /movie/{id}
#[derive(Debug, Clone, Deserialize, Default)]
pub struct MovieDetails {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub overview: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub original_language: String,
    #[serde(default)]
    pub credits: Credits,
    #[serde(default, rename = "watch/providers")]
    pub watch_providers: WatchProviders,
    #[serde(default)]
    pub videos: Videos,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Genre {
    #[serde(default)]
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<CastCredit>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CastCredit {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub character: Option<String>,
    #[serde(default)]
    pub profile_path: Option<String>,
}

/// Watch providers keyed by ISO 3166-1 country code
#[derive(Debug, Clone, Deserialize, Default)]
pub struct WatchProviders {
    #[serde(default)]
    pub results: HashMap<String, RegionProviders>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegionProviders {
    #[serde(default)]
    pub link: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Videos {
    #[serde(default)]
    pub results: Vec<Video>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Video {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub site: String,
    #[serde(default, rename = "type")]
    pub video_type: String,
}
