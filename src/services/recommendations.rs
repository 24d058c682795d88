use crate::{
    models::{image_url, CandidateMovie, RecommendationItem},
    services::embedding::{cosine_similarity, EmbeddingError, EmbeddingProvider},
    services::popularity::{CacheEntry, PopularityCache},
};

/// Thresholds applied when turning similarity scores into recommendations
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecommendationPolicy {
    /// Candidates scoring strictly below this are unrelated, not merely weak
    pub similarity_floor: f32,
    /// Maximum number of recommendations returned
    pub max_results: usize,
}

impl Default for RecommendationPolicy {
    fn default() -> Self {
        Self {
            similarity_floor: 0.25,
            max_results: 6,
        }
    }
}

/// A cache position with its similarity to the query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredCandidate {
    pub index: usize,
    pub score: f32,
}

/// Scores every cached entry against the query and keeps the best matches
///
/// Entries are ordered by similarity, highest first; equal scores keep cache
/// insertion order. The query movie itself and anything under the floor are
/// skipped, and at most `policy.max_results` survive.
pub fn rank(
    query_embedding: &[f32],
    query_id: i64,
    entries: &[CacheEntry],
    policy: &RecommendationPolicy,
) -> Result<Vec<ScoredCandidate>, EmbeddingError> {
    if let Some(first) = entries.first() {
        if first.embedding.len() != query_embedding.len() {
            return Err(EmbeddingError::DimensionMismatch {
                expected: first.embedding.len(),
                actual: query_embedding.len(),
            });
        }
    }

    let mut scored: Vec<ScoredCandidate> = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| ScoredCandidate {
            index,
            score: cosine_similarity(query_embedding, &entry.embedding),
        })
        .collect();

    // sort_by is stable, which gives the insertion-order tie-break
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));

    Ok(scored
        .into_iter()
        .filter(|c| entries[c.index].movie.id != query_id)
        .filter(|c| c.score >= policy.similarity_floor)
        .take(policy.max_results)
        .collect())
}

/// Recommends cached movies similar to `query`
///
/// An empty cache yields no recommendations without touching the embedder.
/// Embedding failures are returned as-is; no partial list accompanies them.
pub async fn recommend(
    cache: &PopularityCache,
    embedder: &dyn EmbeddingProvider,
    query: &CandidateMovie,
    policy: &RecommendationPolicy,
    image_base: &str,
) -> Result<Vec<RecommendationItem>, EmbeddingError> {
    let entries = cache.entries();
    if entries.is_empty() {
        return Ok(Vec::new());
    }

    let query_embedding = embedder.encode_one(&query.embedding_text()).await?;
    let ranked = rank(&query_embedding, query.id, entries, policy)?;

    tracing::debug!(
        movie_id = query.id,
        candidates = entries.len(),
        recommended = ranked.len(),
        "Ranked recommendations"
    );

    Ok(ranked
        .into_iter()
        .map(|c| to_item(&entries[c.index].movie, c.score, image_base))
        .collect())
}

fn to_item(movie: &CandidateMovie, score: f32, image_base: &str) -> RecommendationItem {
    RecommendationItem {
        id: movie.id,
        title: movie.title.clone(),
        poster: image_url(image_base, movie.poster_path.as_deref()),
        backdrop: image_url(image_base, movie.backdrop_path.as_deref()),
        rating: movie.vote_average,
        year: movie.release_year(),
        similarity: similarity_percent(score),
    }
}

/// Similarity as a percentage rounded to one decimal place
pub fn similarity_percent(score: f32) -> f64 {
    (f64::from(score) * 1000.0).round() / 10.0
}
