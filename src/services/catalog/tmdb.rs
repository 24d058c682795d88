/// The Movie Database (TMDB) v3 catalog client
///
/// Endpoints used:
/// 1. Popular listing: /movie/popular?page=N → candidate pool
/// 2. Search: /search/movie?query=... → query movie (first result)
/// 3. Details: /movie/{id}?append_to_response=credits,watch/providers,videos
///
/// Every request carries the `api_key` query parameter and its own timeout.
use crate::{
    error::{AppError, AppResult},
    models::{CandidateMovie, MovieDetails, PopularPage, SearchResults},
    services::catalog::CatalogClient,
};
use reqwest::{Client as HttpClient, Response, StatusCode};
use std::time::Duration;

const DETAILS_APPEND: &str = "credits,watch/providers,videos";

#[derive(Clone)]
pub struct TmdbClient {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl TmdbClient {
    pub fn new(api_key: String, api_url: String, timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    async fn ensure_success(response: Response) -> AppResult<Response> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(AppError::ExternalApi(format!(
            "TMDB returned status {}: {}",
            status, body
        )))
    }
}

#[async_trait::async_trait]
impl CatalogClient for TmdbClient {
    async fn fetch_popular_page(&self, page: u32) -> AppResult<Vec<CandidateMovie>> {
        let response = self
            .http_client
            .get(self.url("/movie/popular"))
            .query(&[("api_key", self.api_key.as_str())])
            .query(&[("page", page)])
            .send()
            .await?;

        let listing: PopularPage = Self::ensure_success(response).await?.json().await?;

        tracing::debug!(
            page = page,
            results = listing.results.len(),
            catalog = "tmdb",
            "Popular page fetched"
        );

        Ok(listing.results)
    }

    async fn search_movie(&self, title: &str) -> AppResult<Option<CandidateMovie>> {
        if title.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }

        let response = self
            .http_client
            .get(self.url("/search/movie"))
            .query(&[("api_key", self.api_key.as_str()), ("query", title)])
            .send()
            .await?;

        let search: SearchResults = Self::ensure_success(response).await?.json().await?;

        tracing::info!(
            query = %title,
            results = search.results.len(),
            catalog = "tmdb",
            "Movie search completed"
        );

        Ok(search.results.into_iter().next())
    }

    async fn movie_details(&self, movie_id: i64) -> AppResult<Option<MovieDetails>> {
        let response = self
            .http_client
            .get(self.url(&format!("/movie/{}", movie_id)))
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("append_to_response", DETAILS_APPEND),
            ])
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            tracing::info!(movie_id = movie_id, catalog = "tmdb", "Movie details not found");
            return Ok(None);
        }

        let details: MovieDetails = Self::ensure_success(response).await?.json().await?;
        Ok(Some(details))
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
