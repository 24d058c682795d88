/// Movie catalog abstraction
///
/// The recommendation pool and the query movie both come from an external
/// catalog. Keeping it behind a trait lets the popularity cache and the HTTP
/// layer run against TMDB in production and against fakes in tests.
use crate::{
    error::AppResult,
    models::{CandidateMovie, MovieDetails},
};

pub mod tmdb;

pub use tmdb::TmdbClient;

/// Trait for movie catalog clients
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogClient: Send + Sync {
    /// Fetch one page (1-based) of the "popular movies" listing
    async fn fetch_popular_page(&self, page: u32) -> AppResult<Vec<CandidateMovie>>;

    /// Search by title and return the best (first) match, if any
    async fn search_movie(&self, title: &str) -> AppResult<Option<CandidateMovie>>;

    /// Fetch full details including credits, watch providers and videos
    ///
    /// Returns `None` when the catalog does not know the id.
    async fn movie_details(&self, movie_id: i64) -> AppResult<Option<MovieDetails>>;

    /// Catalog name for logging and debugging
    fn name(&self) -> &'static str;
}
