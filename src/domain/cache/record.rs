//! Cached record types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single cached query/response pair stored in the vector index.
///
/// Records are immutable once written; the embedding is only ever read back
/// for similarity comparison, never updated in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheRecord {
    /// Unique identifier for this record
    id: String,
    /// The original query text
    query_text: String,
    /// The embedding vector for similarity search
    embedding: Vec<f32>,
    /// The generated response being cached
    response_text: String,
    /// When this record was created
    created_at: DateTime<Utc>,
}

impl CacheRecord {
    /// Create a new cache record with a generated id
    pub fn new(
        query_text: impl Into<String>,
        embedding: Vec<f32>,
        response_text: impl Into<String>,
    ) -> Self {
        Self {
            id: format!("rec:{}", Uuid::new_v4()),
            query_text: query_text.into(),
            embedding,
            response_text: response_text.into(),
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn query_text(&self) -> &str {
        &self.query_text
    }

    pub fn embedding(&self) -> &[f32] {
        &self.embedding
    }

    pub fn response_text(&self) -> &str {
        &self.response_text
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Embedding dimension of this record
    pub fn dimensions(&self) -> usize {
        self.embedding.len()
    }
}

/// Result of a vector store lookup.
///
/// Carries the matched record's metadata and similarity score but never the
/// stored embedding: vectors are stripped before results leave the store.
#[derive(Debug, Clone)]
pub struct CacheMatch {
    /// Id of the matched record
    pub id: String,
    /// The query that produced the cached response
    pub query_text: String,
    /// The cached response
    pub response_text: String,
    /// When the matched record was created
    pub created_at: DateTime<Utc>,
    /// Similarity score in [0, 1]
    pub score: f32,
}

impl CacheMatch {
    /// Build a match from a record, dropping the embedding
    pub fn from_record(record: &CacheRecord, score: f32) -> Self {
        Self {
            id: record.id().to_string(),
            query_text: record.query_text().to_string(),
            response_text: record.response_text().to_string(),
            created_at: record.created_at(),
            score,
        }
    }
}
