//! Vector store trait

use std::fmt::Debug;

use async_trait::async_trait;

use super::{CacheMatch, CacheRecord};
use crate::domain::DomainError;

/// Trait for the external similarity index (pgvector, in-memory, ...)
#[async_trait]
pub trait VectorStore: Send + Sync + Debug {
    /// Search for the records most similar to `embedding`.
    ///
    /// Returns at most `top_k` matches with `score >= min_score`, ordered
    /// descending by score. Implementations may search approximately over a
    /// wider internal candidate pool, but the best candidate must still win.
    /// Matched records are returned without their stored vectors.
    async fn search(
        &self,
        embedding: &[f32],
        top_k: usize,
        min_score: f32,
    ) -> Result<Vec<CacheMatch>, DomainError>;

    /// Persist a record including its vector.
    ///
    /// Concurrent inserts from independent requests must not corrupt the
    /// index or lose either record; near-duplicate records from simultaneous
    /// misses are acceptable.
    async fn insert(&self, record: CacheRecord) -> Result<(), DomainError>;
}
