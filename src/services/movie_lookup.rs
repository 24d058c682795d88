use std::sync::Arc;
use std::time::Duration;

use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::{image_url, CastMemberView, MovieDetails, MovieResponse, MovieView, RecommendationItem},
    services::{
        catalog::CatalogClient,
        embedding::EmbeddingProvider,
        popularity::{BuildSettings, PopularityCache},
        recommendations,
    },
};

const YOUTUBE_WATCH_URL: &str = "https://www.youtube.com/watch?v=";

/// Looks up a movie by title and pairs its details with similar popular titles
///
/// Recommendation problems never fail the lookup: an empty pool or an
/// embedding error just yields an empty recommendation list.
pub async fn lookup_movie(
    catalog: Arc<dyn CatalogClient>,
    embedder: Arc<dyn EmbeddingProvider>,
    popularity: &PopularityCache,
    config: &Config,
    title: &str,
) -> AppResult<MovieResponse> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::InvalidInput("Movie title required".to_string()));
    }

    let movie = catalog
        .search_movie(title)
        .await?
        .ok_or_else(|| AppError::NotFound("Movie not found".to_string()))?;

    let details = catalog
        .movie_details(movie.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Movie not found".to_string()))?;

    if popularity.is_empty() {
        let settings = build_settings(config);
        if let Err(e) = popularity
            .build_if_empty(Arc::clone(&catalog), embedder.as_ref(), settings)
            .await
        {
            tracing::warn!(error = %e, "Lazy popularity cache build failed");
        }
    }

    let recommendations = match recommendations::recommend(
        popularity,
        embedder.as_ref(),
        &movie,
        &config.recommendation_policy(),
        &config.tmdb_image_base,
    )
    .await
    {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!(movie_id = movie.id, error = %e, "Recommendations unavailable");
            Vec::new()
        }
    };

    tracing::info!(
        movie_id = movie.id,
        title = %details.title,
        recommendations = recommendations.len(),
        "Movie lookup completed"
    );

    Ok(format_response(details, recommendations, config))
}

/// Cache build parameters derived from configuration
pub fn build_settings(config: &Config) -> BuildSettings {
    BuildSettings {
        pages: config.popular_pages,
        page_timeout: Duration::from_secs(config.catalog_timeout_secs),
    }
}

/// First YouTube trailer, as a watch URL
pub fn extract_trailer(details: &MovieDetails) -> Option<String> {
    details
        .videos
        .results
        .iter()
        .find(|v| v.video_type == "Trailer" && v.site == "YouTube")
        .map(|v| format!("{}{}", YOUTUBE_WATCH_URL, v.key))
}

/// TMDB watch page for the given country, if the movie is offered there
pub fn extract_watch_link(details: &MovieDetails, region: &str) -> Option<String> {
    details
        .watch_providers
        .results
        .get(region)
        .and_then(|providers| providers.link.clone())
}

pub fn format_response(
    details: MovieDetails,
    recommendations: Vec<RecommendationItem>,
    config: &Config,
) -> MovieResponse {
    let base = config.tmdb_image_base.as_str();

    let cast = details
        .credits
        .cast
        .iter()
        .take(config.cast_limit)
        .map(|member| CastMemberView {
            name: member.name.clone(),
            character: member.character.clone(),
            profile_path: image_url(base, member.profile_path.as_deref()),
        })
        .collect();

    let trailer_url = extract_trailer(&details);
    let watch_url = extract_watch_link(&details, &config.watch_region);

    let movie = MovieView {
        id: details.id,
        poster: image_url(base, details.poster_path.as_deref()),
        backdrop: image_url(base, details.backdrop_path.as_deref()),
        genres: details.genres.into_iter().map(|g| g.name).collect(),
        runtime: details.runtime,
        release_date: details.release_date,
        rating: details.vote_average,
        language: details.original_language.to_uppercase(),
        title: details.title,
        overview: details.overview,
        cast,
        trailer_url,
        watch_url,
    };

    MovieResponse {
        movie,
        recommendations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CandidateMovie, CastCredit, RegionProviders, Video};
    use crate::services::catalog::MockCatalogClient;
    use crate::services::embedding::{Embedding, EmbeddingError};
    use crate::services::popularity::CacheEntry;

    fn config() -> Config {
        Config::from_vars(vec![("TMDB_API_KEY".to_string(), "test".to_string())]).unwrap()
    }

    fn video(video_type: &str, site: &str, key: &str) -> Video {
        Video {
            key: key.to_string(),
            site: site.to_string(),
            video_type: video_type.to_string(),
        }
    }

    fn candidate(id: i64, title: &str, overview: &str) -> CandidateMovie {
        CandidateMovie {
            id,
            title: title.to_string(),
            overview: overview.to_string(),
            poster_path: None,
            backdrop_path: None,
            vote_average: 7.1,
            release_date: "2010-07-15".to_string(),
        }
    }

    fn details(id: i64, title: &str) -> MovieDetails {
        MovieDetails {
            id,
            title: title.to_string(),
            overview: "Dreams within dreams.".to_string(),
            original_language: "en".to_string(),
            ..Default::default()
        }
    }

    struct UnitEmbedder;

    #[async_trait::async_trait]
    impl EmbeddingProvider for UnitEmbedder {
        async fn encode_batch(&self, texts: &[String]) -> Result<Vec<Embedding>, EmbeddingError> {
            Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
        }

        fn dimension(&self) -> usize {
            2
        }
    }

    #[test]
    fn test_extract_trailer_picks_youtube_trailer() {
        let mut d = details(1, "Inception");
        d.videos.results = vec![
            video("Teaser", "YouTube", "teaser"),
            video("Trailer", "Vimeo", "vimeo"),
            video("Trailer", "YouTube", "YoHD9XEInc0"),
            video("Trailer", "YouTube", "second"),
        ];

        assert_eq!(
            extract_trailer(&d),
            Some("https://www.youtube.com/watch?v=YoHD9XEInc0".to_string())
        );
    }

    #[test]
    fn test_extract_trailer_none() {
        assert_eq!(extract_trailer(&details(1, "Inception")), None);
    }

    #[test]
    fn test_extract_watch_link_by_region() {
        let mut d = details(1, "Inception");
        d.watch_providers.results.insert(
            "IN".to_string(),
            RegionProviders {
                link: Some("https://www.themoviedb.org/movie/1/watch?locale=IN".to_string()),
            },
        );

        assert!(extract_watch_link(&d, "IN").is_some());
        assert_eq!(extract_watch_link(&d, "US"), None);
    }

    #[test]
    fn test_format_response_limits_cast_and_resolves_images() {
        let config = config();
        let mut d = details(27205, "Inception");
        d.poster_path = Some("/poster.jpg".to_string());
        d.credits.cast = (0..8)
            .map(|i| CastCredit {
                name: Some(format!("Actor {}", i)),
                character: Some(format!("Role {}", i)),
                profile_path: if i == 0 { Some("/p0.jpg".to_string()) } else { None },
            })
            .collect();

        let response = format_response(d, Vec::new(), &config);

        assert_eq!(response.movie.cast.len(), 5);
        assert_eq!(
            response.movie.cast[0].profile_path.as_deref(),
            Some("https://image.tmdb.org/t/p/original/p0.jpg")
        );
        assert_eq!(response.movie.cast[1].profile_path, None);
        assert_eq!(
            response.movie.poster.as_deref(),
            Some("https://image.tmdb.org/t/p/original/poster.jpg")
        );
        assert_eq!(response.movie.backdrop, None);
        assert_eq!(response.movie.language, "EN");
    }

    #[tokio::test]
    async fn test_lookup_rejects_blank_title() {
        let catalog = MockCatalogClient::new();
        let result = lookup_movie(
            Arc::new(catalog),
            Arc::new(UnitEmbedder),
            &PopularityCache::new(),
            &config(),
            "  ",
        )
        .await;

        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_lookup_not_found() {
        let mut catalog = MockCatalogClient::new();
        catalog.expect_search_movie().returning(|_| Ok(None));

        let result = lookup_movie(
            Arc::new(catalog),
            Arc::new(UnitEmbedder),
            &PopularityCache::new(),
            &config(),
            "Nothing Like This",
        )
        .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_lookup_builds_cache_lazily_and_excludes_self() {
        let mut catalog = MockCatalogClient::new();
        catalog.expect_name().return_const("mock");
        catalog
            .expect_search_movie()
            .returning(|_| Ok(Some(candidate(27205, "Inception", "Dreams within dreams."))));
        catalog
            .expect_movie_details()
            .returning(|id| Ok(Some(details(id, "Inception"))));
        catalog
            .expect_fetch_popular_page()
            .times(5)
            .returning(|page| {
                if page == 1 {
                    Ok(vec![
                        candidate(27205, "Inception", "Dreams within dreams."),
                        candidate(157336, "Interstellar", "Explorers travel through a wormhole."),
                    ])
                } else {
                    Ok(Vec::new())
                }
            });

        let cache = PopularityCache::new();
        let response = lookup_movie(
            Arc::new(catalog),
            Arc::new(UnitEmbedder),
            &cache,
            &config(),
            "Inception",
        )
        .await
        .unwrap();

        assert_eq!(cache.len(), 2);
        assert_eq!(response.movie.id, 27205);
        assert_eq!(response.recommendations.len(), 1);
        assert_eq!(response.recommendations[0].id, 157336);
        assert_eq!(response.recommendations[0].similarity, 100.0);
        assert_eq!(response.recommendations[0].year, "2010");
    }

    #[tokio::test]
    async fn test_lookup_degrades_when_embedding_fails() {
        struct Broken;

        #[async_trait::async_trait]
        impl EmbeddingProvider for Broken {
            async fn encode_batch(&self, _: &[String]) -> Result<Vec<Embedding>, EmbeddingError> {
                Err(EmbeddingError::Model("offline".to_string()))
            }

            fn dimension(&self) -> usize {
                2
            }
        }

        let mut catalog = MockCatalogClient::new();
        catalog
            .expect_search_movie()
            .returning(|_| Ok(Some(candidate(1, "Heat", "Heist."))));
        catalog
            .expect_movie_details()
            .returning(|id| Ok(Some(details(id, "Heat"))));

        let cache = PopularityCache::prebuilt(vec![CacheEntry {
            movie: candidate(2, "Ronin", "Heist."),
            embedding: vec![1.0, 0.0],
        }])
        .unwrap();

        let response = lookup_movie(Arc::new(catalog), Arc::new(Broken), &cache, &config(), "Heat")
            .await
            .unwrap();

        assert_eq!(response.movie.title, "Heat");
        assert!(response.recommendations.is_empty());
    }
}
