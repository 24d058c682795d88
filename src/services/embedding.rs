/// Text embedding provider
///
/// Converts "title overview" strings into fixed-length vectors whose cosine
/// similarity tracks semantic closeness. The production provider runs
/// all-MiniLM-L6-v2 locally through fastembed; encoding is CPU-bound and
/// synchronous, so every call is dispatched to a blocking thread.
use std::sync::Arc;

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

pub type Embedding = Vec<f32>;

/// Output dimension of all-MiniLM-L6-v2
pub const MINILM_DIMENSION: usize = 384;

/// Typed failure raised while embedding the pool or a query
#[derive(thiserror::Error, Debug, Clone)]
pub enum EmbeddingError {
    #[error("embedding model error: {0}")]
    Model(String),

    #[error("embedding task failed: {0}")]
    Task(String),

    #[error("embedding count mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("empty embedding result")]
    Empty,
}

/// Trait for embedding providers
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Encode many texts at once
    ///
    /// Returns exactly one vector per input, in input order.
    async fn encode_batch(&self, texts: &[String]) -> Result<Vec<Embedding>, EmbeddingError>;

    /// Encode a single text (a batch of one)
    async fn encode_one(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        let mut vectors = self.encode_batch(&[text.to_string()]).await?;
        vectors.pop().ok_or(EmbeddingError::Empty)
    }

    /// Vector dimensionality, fixed for the process lifetime
    fn dimension(&self) -> usize;
}

pub struct FastEmbedProvider {
    model: Arc<TextEmbedding>,
}

impl FastEmbedProvider {
    /// Loads all-MiniLM-L6-v2, downloading it on first run
    pub async fn new() -> Result<Self, EmbeddingError> {
        let model = tokio::task::spawn_blocking(|| {
            let options = InitOptions::new(EmbeddingModel::AllMiniLML6V2)
                .with_show_download_progress(false);
            TextEmbedding::try_new(options)
        })
        .await
        .map_err(|e| EmbeddingError::Task(e.to_string()))?
        .map_err(|e| EmbeddingError::Model(format!("model initialization failed: {e}")))?;

        tracing::info!(model = "all-MiniLM-L6-v2", dimension = MINILM_DIMENSION, "Embedding model loaded");

        Ok(Self {
            model: Arc::new(model),
        })
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for FastEmbedProvider {
    async fn encode_batch(&self, texts: &[String]) -> Result<Vec<Embedding>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let model = Arc::clone(&self.model);
        let owned = texts.to_vec();
        let vectors = tokio::task::spawn_blocking(move || model.embed(owned, None))
            .await
            .map_err(|e| EmbeddingError::Task(e.to_string()))?
            .map_err(|e| EmbeddingError::Model(e.to_string()))?;

        if vectors.len() != texts.len() {
            return Err(EmbeddingError::LengthMismatch {
                expected: texts.len(),
                actual: vectors.len(),
            });
        }

        Ok(vectors)
    }

    fn dimension(&self) -> usize {
        MINILM_DIMENSION
    }
}

/// Cosine of the angle between two vectors
///
/// Zero-norm inputs score 0.0. Callers check dimensions beforehand.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        0.0
    } else {
        dot / denom
    }
}
