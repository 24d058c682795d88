pub mod movie;
pub mod response;

pub use movie::{
    CandidateMovie, CastCredit, Credits, Genre, MovieDetails, PopularPage, RegionProviders,
    SearchResults, Video, Videos, WatchProviders,
};
pub use response::{
    CastMemberView, HealthResponse, MovieRequest, MovieResponse, MovieView, RecommendationItem,
};

/// Joins a TMDB image path onto the configured image base
///
/// Missing or empty paths resolve to `None` rather than a dangling base URL.
pub fn image_url(base: &str, path: Option<&str>) -> Option<String> {
    match path {
        Some(p) if !p.is_empty() => Some(format!("{}{}", base, p)),
        _ => None,
    }
}
