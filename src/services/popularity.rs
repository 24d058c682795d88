/// Popularity cache: the pool of recommendable movies and their embeddings
///
/// The pool is built once, lazily or during warm-up, from several pages of the
/// catalog's "popular" listing. After a successful build it is never mutated;
/// readers get a plain slice with no locking.
///
/// Build policy:
/// - pages are fetched concurrently, each bounded by its own timeout
/// - a page that fails or times out is dropped, never retried
/// - records without an overview are discarded before embedding
/// - all surviving texts are embedded in a single batch call
/// - the pool is published all-or-nothing; a build that yields no usable
///   records, or whose embedding fails, leaves the cache empty so a later
///   call can try again
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OnceCell};

use crate::{
    error::{AppError, AppResult},
    models::CandidateMovie,
    services::catalog::CatalogClient,
    services::embedding::{Embedding, EmbeddingError, EmbeddingProvider},
};

/// A cached candidate and its embedding, kept together so they cannot drift apart
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub movie: CandidateMovie,
    pub embedding: Embedding,
}

/// How the popular listing is pulled into the pool
#[derive(Debug, Clone, Copy)]
pub struct BuildSettings {
    /// Pages 1..=pages are requested
    pub pages: u32,
    /// Upper bound for each page fetch, applied independently
    pub page_timeout: Duration,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            pages: 5,
            page_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    /// The pool was already populated; nothing was fetched or embedded
    AlreadyBuilt(usize),
    /// This call populated the pool with the given number of entries
    Built(usize),
    /// No page produced a usable record; the cache is still empty
    EmptyPool,
}

struct PopularityPool {
    entries: Vec<CacheEntry>,
    built_at: DateTime<Utc>,
}

enum BuildAbort {
    Empty,
    Embedding(EmbeddingError),
}

/// Record of the most recent failed build attempt
///
/// Callers that queued behind an attempt take its result instead of starting
/// another build of their own.
#[derive(Default)]
struct AttemptLog {
    finished: u64,
    last_failure: Option<Result<BuildOutcome, EmbeddingError>>,
}

/// Process-wide candidate pool, owned by the composition root
#[derive(Default)]
pub struct PopularityCache {
    pool: OnceCell<PopularityPool>,
    attempts: Mutex<AttemptLog>,
    finished_attempts: AtomicU64,
}

impl PopularityCache {
    /// Creates an empty, uninitialized cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a cache that is already populated with the given entries
    #[cfg(test)]
    pub(crate) fn prebuilt(entries: Vec<CacheEntry>) -> Result<Self, EmbeddingError> {
        if entries.is_empty() {
            return Ok(Self::new());
        }

        let dimension = entries[0].embedding.len();
        check_dimensions(entries.iter().map(|e| &e.embedding), dimension)?;

        let pool = PopularityPool {
            entries,
            built_at: Utc::now(),
        };

        Ok(Self {
            pool: OnceCell::new_with(Some(pool)),
            ..Self::default()
        })
    }

    /// Builds the pool unless it is already populated
    ///
    /// Concurrent callers are serialized: exactly one build runs and the others
    /// wait for it and share its outcome, whether that is a populated pool, an
    /// empty pool or an embedding error. Only a call that starts after a failed
    /// attempt has finished builds again. Per-page catalog failures are absorbed;
    /// an embedding failure is returned and leaves the cache empty.
    pub async fn build_if_empty(
        &self,
        catalog: Arc<dyn CatalogClient>,
        embedder: &dyn EmbeddingProvider,
        settings: BuildSettings,
    ) -> Result<BuildOutcome, EmbeddingError> {
        if let Some(pool) = self.pool.get() {
            return Ok(BuildOutcome::AlreadyBuilt(pool.entries.len()));
        }

        let seen = self.finished_attempts.load(Ordering::Acquire);
        let mut log = self.attempts.lock().await;

        if let Some(pool) = self.pool.get() {
            return Ok(BuildOutcome::AlreadyBuilt(pool.entries.len()));
        }
        if log.finished != seen {
            if let Some(outcome) = log.last_failure.clone() {
                tracing::debug!("Sharing outcome of the build attempt this call waited on");
                return outcome;
            }
        }

        let outcome = match Self::assemble(catalog, embedder, settings).await {
            Ok(pool) => {
                let count = pool.entries.len();
                match self.pool.set(pool) {
                    Ok(()) => Ok(BuildOutcome::Built(count)),
                    Err(_) => Ok(BuildOutcome::AlreadyBuilt(self.len())),
                }
            }
            Err(BuildAbort::Empty) => Ok(BuildOutcome::EmptyPool),
            Err(BuildAbort::Embedding(e)) => Err(e),
        };

        log.last_failure = match &outcome {
            Ok(BuildOutcome::Built(_)) | Ok(BuildOutcome::AlreadyBuilt(_)) => None,
            failed => Some(failed.clone()),
        };
        log.finished += 1;
        self.finished_attempts.store(log.finished, Ordering::Release);

        outcome
    }

    /// Number of cached candidates
    pub fn len(&self) -> usize {
        self.pool.get().map_or(0, |pool| pool.entries.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cached entries in insertion order (empty until built)
    pub fn entries(&self) -> &[CacheEntry] {
        self.pool.get().map_or(&[], |pool| pool.entries.as_slice())
    }

    pub fn built_at(&self) -> Option<DateTime<Utc>> {
        self.pool.get().map(|pool| pool.built_at)
    }

    async fn assemble(
        catalog: Arc<dyn CatalogClient>,
        embedder: &dyn EmbeddingProvider,
        settings: BuildSettings,
    ) -> Result<PopularityPool, BuildAbort> {
        tracing::info!(
            pages = settings.pages,
            catalog = catalog.name(),
            "Building popularity cache"
        );

        let pages = fetch_pages(catalog, settings).await;
        let candidates = usable_candidates(aggregate_pages(pages));

        if candidates.is_empty() {
            tracing::warn!("Popularity cache build produced no usable movies");
            return Err(BuildAbort::Empty);
        }

        let texts: Vec<String> = candidates.iter().map(CandidateMovie::embedding_text).collect();
        let embeddings = embedder
            .encode_batch(&texts)
            .await
            .map_err(BuildAbort::Embedding)?;

        let entries = pair_entries(candidates, embeddings, embedder.dimension())
            .map_err(BuildAbort::Embedding)?;

        tracing::info!(cached = entries.len(), "Popularity cache built");

        Ok(PopularityPool {
            entries,
            built_at: Utc::now(),
        })
    }
}

/// Result of fetching one page of the popular listing
#[derive(Debug)]
pub struct PageFetch {
    pub page: u32,
    pub result: AppResult<Vec<CandidateMovie>>,
}

/// Fetches pages 1..=settings.pages concurrently, returned in page order
async fn fetch_pages(catalog: Arc<dyn CatalogClient>, settings: BuildSettings) -> Vec<PageFetch> {
    let mut tasks = Vec::new();

    for page in 1..=settings.pages {
        let catalog = Arc::clone(&catalog);
        let task = tokio::spawn(async move {
            match tokio::time::timeout(settings.page_timeout, catalog.fetch_popular_page(page)).await
            {
                Ok(result) => result,
                Err(_) => Err(AppError::ExternalApi(format!(
                    "popular page {} timed out after {:?}",
                    page, settings.page_timeout
                ))),
            }
        });
        tasks.push((page, task));
    }

    let mut fetches = Vec::with_capacity(tasks.len());
    for (page, task) in tasks {
        let result = match task.await {
            Ok(result) => result,
            Err(e) => Err(AppError::Internal(e.to_string())),
        };
        fetches.push(PageFetch { page, result });
    }

    fetches
}

/// Concatenates successful pages in order and drops failed ones
pub fn aggregate_pages(pages: Vec<PageFetch>) -> Vec<CandidateMovie> {
    let mut movies = Vec::new();
    let mut failed = 0;

    for fetch in pages {
        match fetch.result {
            Ok(results) => movies.extend(results),
            Err(e) => {
                failed += 1;
                tracing::warn!(page = fetch.page, error = %e, "Popular page dropped");
            }
        }
    }

    if failed > 0 {
        tracing::warn!(
            failed_pages = failed,
            movies = movies.len(),
            "Partial popular listing fetch"
        );
    }

    movies
}

/// Drops records without an overview and repeated ids (first occurrence wins)
pub fn usable_candidates(movies: Vec<CandidateMovie>) -> Vec<CandidateMovie> {
    let mut seen = HashSet::new();
    movies
        .into_iter()
        .filter(CandidateMovie::has_overview)
        .filter(|movie| seen.insert(movie.id))
        .collect()
}

/// Zips records with their vectors, rejecting a batch that is misaligned or
/// whose vectors do not have the provider's dimension
fn pair_entries(
    candidates: Vec<CandidateMovie>,
    embeddings: Vec<Embedding>,
    dimension: usize,
) -> Result<Vec<CacheEntry>, EmbeddingError> {
    if candidates.len() != embeddings.len() {
        return Err(EmbeddingError::LengthMismatch {
            expected: candidates.len(),
            actual: embeddings.len(),
        });
    }

    check_dimensions(embeddings.iter(), dimension)?;

    Ok(candidates
        .into_iter()
        .zip(embeddings)
        .map(|(movie, embedding)| CacheEntry { movie, embedding })
        .collect())
}

fn check_dimensions<'a>(
    mut embeddings: impl Iterator<Item = &'a Embedding>,
    dimension: usize,
) -> Result<(), EmbeddingError> {
    match embeddings.find(|e| e.len() != dimension) {
        Some(bad) => Err(EmbeddingError::DimensionMismatch {
            expected: dimension,
            actual: bad.len(),
        }),
        None => Ok(()),
    }
}
