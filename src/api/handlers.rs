use axum::{extract::State, Extension, Json};
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::{HealthResponse, MovieRequest, MovieResponse},
    services::movie_lookup,
};

use super::AppState;

/// Health check endpoint, reporting the size of the recommendation pool
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        cached_movies: state.popularity.len(),
        built_at: state.popularity.built_at(),
    })
}

/// Look up a movie by title and return its details plus similar movies
pub async fn get_movie(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<MovieRequest>,
) -> AppResult<Json<MovieResponse>> {
    let title = request.title.unwrap_or_default();

    tracing::info!(request_id = %request_id, title = %title, "Processing movie lookup");

    let response = movie_lookup::lookup_movie(
        Arc::clone(&state.catalog),
        Arc::clone(&state.embedder),
        &state.popularity,
        &state.config,
        &title,
    )
    .await?;

    Ok(Json(response))
}
