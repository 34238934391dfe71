//! In-memory vector store implementation

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::cache::{CacheMatch, CacheRecord, VectorStore};
use crate::domain::embedding::cosine_similarity;
use crate::domain::DomainError;

/// In-memory vector store using linear search
///
/// Suitable for development and small-scale deployments.
/// For production with large cache sizes, use PgvectorVectorStore.
#[derive(Debug)]
pub struct InMemoryVectorStore {
    records: RwLock<HashMap<String, CacheRecord>>,
    max_records: usize,
}

impl InMemoryVectorStore {
    /// Create a new in-memory vector store
    pub fn new(max_records: usize) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            max_records,
        }
    }

    /// Evict the oldest record if the store is full
    fn evict_if_needed(&self, records: &mut HashMap<String, CacheRecord>) {
        if records.len() < self.max_records {
            return;
        }

        if let Some(oldest_id) = records
            .iter()
            .min_by_key(|(_, record)| record.created_at())
            .map(|(id, _)| id.clone())
        {
            records.remove(&oldest_id);
        }
    }

    /// Number of records currently stored
    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn search(
        &self,
        embedding: &[f32],
        top_k: usize,
        min_score: f32,
    ) -> Result<Vec<CacheMatch>, DomainError> {
        let records = self
            .records
            .read()
            .map_err(|e| DomainError::search(format!("Failed to acquire read lock: {}", e)))?;

        let mut results: Vec<CacheMatch> = records
            .values()
            .map(|record| {
                let score = cosine_similarity(embedding, record.embedding());
                CacheMatch::from_record(record, score)
            })
            .filter(|m| m.score >= min_score)
            .collect();

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(top_k);

        Ok(results)
    }

    async fn insert(&self, record: CacheRecord) -> Result<(), DomainError> {
        let mut records = self
            .records
            .write()
            .map_err(|e| DomainError::storage(format!("Failed to acquire write lock: {}", e)))?;

        self.evict_if_needed(&mut records);
        records.insert(record.id().to_string(), record);

        Ok(())
    }
}
