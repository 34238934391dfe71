//! pgvector-backed vector store implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPool;
use sqlx::Row;

use crate::domain::cache::{CacheMatch, CacheRecord, VectorStore};
use crate::domain::DomainError;

/// Configuration for the pgvector store
#[derive(Debug, Clone)]
pub struct PgvectorConfig {
    /// Embedding dimensions
    pub dimensions: usize,
    /// Table name for cached entries
    pub table_name: String,
    /// How many nearest candidates to pull before threshold filtering
    pub candidate_pool: usize,
}

impl PgvectorConfig {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            table_name: "semantic_cache_entries".to_string(),
            candidate_pool: 20,
        }
    }

    pub fn with_table_name(mut self, name: impl Into<String>) -> Self {
        self.table_name = name.into();
        self
    }

    pub fn with_candidate_pool(mut self, pool: usize) -> Self {
        self.candidate_pool = pool;
        self
    }
}

/// Vector store backed by Postgres with the pgvector extension.
///
/// Uses the cosine distance operator; similarity is 1 - distance.
#[derive(Debug)]
pub struct PgvectorVectorStore {
    pool: PgPool,
    config: PgvectorConfig,
}

impl PgvectorVectorStore {
    pub fn new(pool: PgPool, config: PgvectorConfig) -> Self {
        Self { pool, config }
    }

    /// Ensure the cache table exists with the pgvector extension
    pub async fn ensure_table(&self) -> Result<(), DomainError> {
        sqlx::query("CREATE EXTENSION IF NOT EXISTS vector")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DomainError::storage(format!("Failed to create vector extension: {}", e))
            })?;

        let query = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id VARCHAR(255) PRIMARY KEY,
                query_text TEXT NOT NULL,
                response_text TEXT NOT NULL,
                embedding vector({}) NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
            self.config.table_name, self.config.dimensions
        );

        sqlx::query(&query)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to create table: {}", e)))?;

        // IVFFlat requires some data to build, so ignore errors
        let vector_index = format!(
            "CREATE INDEX IF NOT EXISTS idx_{}_embedding ON {} USING ivfflat (embedding vector_cosine_ops)",
            self.config.table_name, self.config.table_name
        );
        let _ = sqlx::query(&vector_index).execute(&self.pool).await;

        Ok(())
    }
}

/// Render an embedding in pgvector's literal syntax
fn embedding_to_pgvector(embedding: &[f32]) -> String {
    let values: Vec<String> = embedding.iter().map(|v| v.to_string()).collect();
    format!("[{}]", values.join(","))
}

/// Convert a cosine distance to a similarity score
fn distance_to_similarity(distance: f64) -> f32 {
    (1.0 - distance) as f32
}

#[async_trait]
impl VectorStore for PgvectorVectorStore {
    async fn search(
        &self,
        embedding: &[f32],
        top_k: usize,
        min_score: f32,
    ) -> Result<Vec<CacheMatch>, DomainError> {
        let embedding_str = embedding_to_pgvector(embedding);

        // Pull a wider candidate pool ordered by distance, then apply the
        // similarity threshold here so approximate index scans cannot drop
        // the best candidate.
        let query = format!(
            r#"
            SELECT
                id,
                query_text,
                response_text,
                created_at,
                embedding <=> '{}' as distance
            FROM {}
            ORDER BY distance
            LIMIT {}
            "#,
            embedding_str,
            self.config.table_name,
            self.config.candidate_pool.max(top_k)
        );

        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Vector search failed");
                DomainError::search(format!("Search failed: {}", e))
            })?;

        let mut results = Vec::with_capacity(rows.len());

        for row in rows {
            let distance: f64 = row.get("distance");
            let score = distance_to_similarity(distance);

            if score < min_score {
                continue;
            }

            let created_at: DateTime<Utc> = row.get("created_at");

            results.push(CacheMatch {
                id: row.get("id"),
                query_text: row.get("query_text"),
                response_text: row.get("response_text"),
                created_at,
                score,
            });
        }

        results.truncate(top_k);

        Ok(results)
    }

    async fn insert(&self, record: CacheRecord) -> Result<(), DomainError> {
        let embedding_str = embedding_to_pgvector(record.embedding());

        let query = format!(
            r#"
            INSERT INTO {} (id, query_text, response_text, embedding, created_at)
            VALUES ($1, $2, $3, $4::vector, $5)
            "#,
            self.config.table_name
        );

        sqlx::query(&query)
            .bind(record.id())
            .bind(record.query_text())
            .bind(record.response_text())
            .bind(&embedding_str)
            .bind(record.created_at())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Cache insert failed");
                DomainError::storage(format!("Insert failed: {}", e))
            })?;

        Ok(())
    }
}
