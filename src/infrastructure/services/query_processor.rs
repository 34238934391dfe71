//! Query processing service
//!
//! Decides, per query, whether to serve a cached response or generate a
//! fresh one, and keeps the statistics tracker consistent with whatever
//! actually happened.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use crate::domain::cache::{
    clamp_score, round2, CacheConfig, CacheRecord, QueryOutcome, VectorStore,
};
use crate::domain::embedding::EmbeddingProvider;
use crate::domain::llm::GenerativeModel;
use crate::domain::DomainError;
use crate::infrastructure::stats::StatsTracker;

/// Baseline cost of a generation round trip used to estimate latency saved
/// by a cache hit, in milliseconds. The estimate is a fixed approximation,
/// not a measurement of the avoided call.
const SAVED_LATENCY_BASELINE_MS: f64 = 800.0;

/// Fraction of the observed hit latency added on top of the baseline
const SAVED_LATENCY_FACTOR: f64 = 0.1;

/// Result of a processed query
#[derive(Debug, Clone)]
pub struct AskResult {
    /// The response text served to the caller
    pub response: String,
    /// Hit/miss metadata for this request
    pub outcome: QueryOutcome,
}

/// Orchestrates the embed, search, generate and persist stages for a query
#[derive(Debug)]
pub struct QueryProcessor {
    embedding_provider: Arc<dyn EmbeddingProvider>,
    generative_model: Arc<dyn GenerativeModel>,
    vector_store: Arc<dyn VectorStore>,
    stats: Arc<StatsTracker>,
    config: CacheConfig,
}

impl QueryProcessor {
    pub fn new(
        embedding_provider: Arc<dyn EmbeddingProvider>,
        generative_model: Arc<dyn GenerativeModel>,
        vector_store: Arc<dyn VectorStore>,
        stats: Arc<StatsTracker>,
        config: CacheConfig,
    ) -> Self {
        Self {
            embedding_provider,
            generative_model,
            vector_store,
            stats,
            config,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Process one query end to end.
    ///
    /// A hit serves the cached response without touching the generative
    /// model. A miss generates a response and persists it; when only the
    /// persist step fails the response is still returned, flagged as
    /// unpersisted, and counted as a miss. Any earlier stage failure aborts
    /// the request and leaves the statistics untouched.
    pub async fn ask(
        &self,
        query: &str,
        threshold: Option<f32>,
    ) -> Result<AskResult, DomainError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(DomainError::validation("Query must not be empty"));
        }

        let threshold = threshold.unwrap_or(self.config.default_threshold);
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(DomainError::validation(format!(
                "Threshold must be in (0, 1], got {}",
                threshold
            )));
        }

        let start = Instant::now();

        let embedding = self
            .with_timeout(
                self.embedding_provider
                    .embed(query, &self.config.embedding_model),
                || DomainError::embedding("Embedding request timed out"),
            )
            .await?;

        let matches = self
            .with_timeout(self.vector_store.search(&embedding, 1, threshold), || {
                DomainError::search("Vector search timed out")
            })
            .await?;

        if let Some(best) = matches.into_iter().next() {
            let latency_ms = elapsed_ms(start);
            let saved_latency_ms =
                round2(SAVED_LATENCY_BASELINE_MS + latency_ms * SAVED_LATENCY_FACTOR);
            let score = clamp_score(best.score);

            tracing::info!(
                score,
                threshold,
                latency_ms,
                cached_query = %best.query_text,
                "Cache hit"
            );

            self.stats
                .record_hit(query, threshold, score, saved_latency_ms);

            return Ok(AskResult {
                response: best.response_text,
                outcome: QueryOutcome::hit(score, latency_ms, saved_latency_ms),
            });
        }

        let response = self
            .with_timeout(
                self.generative_model
                    .generate(query, &self.config.generation_model),
                || DomainError::generation("Generation request timed out"),
            )
            .await?;

        let record = CacheRecord::new(query, embedding, response.clone());
        let persist_result = self
            .with_timeout(self.vector_store.insert(record), || {
                DomainError::storage("Cache insert timed out")
            })
            .await;

        let latency_ms = elapsed_ms(start);
        let mut outcome = QueryOutcome::miss(latency_ms, self.config.generation_model.clone());

        if let Err(e) = persist_result {
            // The caller still gets their answer; only the cache write was lost.
            tracing::warn!(error = %e, "Failed to persist generated response");
            outcome = outcome.with_unpersisted();
        }

        tracing::info!(threshold, latency_ms, "Cache miss");

        self.stats.record_miss(latency_ms);

        Ok(AskResult { response, outcome })
    }

    async fn with_timeout<T, F>(
        &self,
        fut: F,
        on_timeout: impl FnOnce() -> DomainError,
    ) -> Result<T, DomainError>
    where
        F: Future<Output = Result<T, DomainError>>,
    {
        match tokio::time::timeout(self.config.request_timeout(), fut).await {
            Ok(result) => result,
            Err(_) => Err(on_timeout()),
        }
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::{CacheMatch, MockVectorStore, CACHED_MODEL_TAG};
    use crate::domain::embedding::MockEmbeddingProvider;
    use crate::domain::llm::MockGenerativeModel;
    use chrono::Utc;

    struct Fixture {
        embedding: Arc<MockEmbeddingProvider>,
        model: Arc<MockGenerativeModel>,
        store: Arc<MockVectorStore>,
        stats: Arc<StatsTracker>,
    }

    impl Fixture {
        fn new(
            embedding: MockEmbeddingProvider,
            model: MockGenerativeModel,
            store: MockVectorStore,
        ) -> Self {
            Self {
                embedding: Arc::new(embedding),
                model: Arc::new(model),
                store: Arc::new(store),
                stats: Arc::new(StatsTracker::new(50, 1000)),
            }
        }

        fn processor(&self) -> QueryProcessor {
            QueryProcessor::new(
                Arc::clone(&self.embedding) as Arc<dyn EmbeddingProvider>,
                Arc::clone(&self.model) as Arc<dyn GenerativeModel>,
                Arc::clone(&self.store) as Arc<dyn VectorStore>,
                Arc::clone(&self.stats),
                CacheConfig::default(),
            )
        }
    }

    fn cache_match(query: &str, response: &str, score: f32) -> CacheMatch {
        CacheMatch {
            id: "rec:test".to_string(),
            query_text: query.to_string(),
            response_text: response.to_string(),
            created_at: Utc::now(),
            score,
        }
    }

    #[tokio::test]
    async fn test_hit_serves_cached_response() {
        let fixture = Fixture::new(
            MockEmbeddingProvider::new(),
            MockGenerativeModel::new(),
            MockVectorStore::new().with_match(cache_match("similar query", "cached answer", 0.91)),
        );
        let processor = fixture.processor();

        let result = processor.ask("my query", None).await.unwrap();

        assert_eq!(result.response, "cached answer");
        assert!(result.outcome.hit);
        assert_eq!(result.outcome.score, Some(0.91));
        assert_eq!(result.outcome.model.as_deref(), Some(CACHED_MODEL_TAG));
        assert!(!result.outcome.unpersisted);
    }

    #[tokio::test]
    async fn test_hit_skips_generation_and_insert() {
        let fixture = Fixture::new(
            MockEmbeddingProvider::new(),
            MockGenerativeModel::new(),
            MockVectorStore::new().with_match(cache_match("q", "a", 0.95)),
        );
        let processor = fixture.processor();

        processor.ask("my query", None).await.unwrap();

        assert_eq!(fixture.model.generate_calls(), 0);
        assert_eq!(fixture.store.insert_calls(), 0);
        assert_eq!(fixture.store.search_calls(), 1);
    }

    #[tokio::test]
    async fn test_hit_saved_latency_estimate() {
        let fixture = Fixture::new(
            MockEmbeddingProvider::new(),
            MockGenerativeModel::new(),
            MockVectorStore::new().with_match(cache_match("q", "a", 0.9)),
        );
        let processor = fixture.processor();

        let result = processor.ask("my query", None).await.unwrap();

        // Estimate is baseline plus a fraction of the observed latency, so
        // it can never be below the baseline.
        let saved = result.outcome.saved_latency_ms.unwrap();
        assert!(saved >= SAVED_LATENCY_BASELINE_MS);
        assert!(
            (saved
                - round2(
                    SAVED_LATENCY_BASELINE_MS
                        + result.outcome.latency_ms * SAVED_LATENCY_FACTOR
                ))
            .abs()
                < 0.05
        );
    }

    #[tokio::test]
    async fn test_hit_records_stats() {
        let fixture = Fixture::new(
            MockEmbeddingProvider::new(),
            MockGenerativeModel::new(),
            MockVectorStore::new().with_match(cache_match("q", "a", 0.88)),
        );
        let processor = fixture.processor();

        processor.ask("my query", None).await.unwrap();

        let snapshot = fixture.stats.snapshot();
        assert_eq!(snapshot.total_queries, 1);
        assert_eq!(snapshot.total_hits, 1);
        assert_eq!(snapshot.recent_hits.len(), 1);
        assert_eq!(snapshot.recent_hits[0].query, "my query");
        assert_eq!(snapshot.recent_hits[0].score, 0.88);
    }

    #[tokio::test]
    async fn test_miss_generates_and_persists() {
        let fixture = Fixture::new(
            MockEmbeddingProvider::new(),
            MockGenerativeModel::new().with_response("fresh answer"),
            MockVectorStore::new(),
        );
        let processor = fixture.processor();

        let result = processor.ask("new question", None).await.unwrap();

        assert_eq!(result.response, "fresh answer");
        assert!(!result.outcome.hit);
        assert_eq!(result.outcome.score, None);
        assert_eq!(result.outcome.saved_latency_ms, None);
        assert_eq!(result.outcome.model.as_deref(), Some("gpt-5-nano"));
        assert!(!result.outcome.unpersisted);

        assert_eq!(fixture.model.generate_calls(), 1);
        let inserted = fixture.store.inserted();
        assert_eq!(inserted.len(), 1);
        assert_eq!(inserted[0].query_text(), "new question");
        assert_eq!(inserted[0].response_text(), "fresh answer");
        assert_eq!(
            inserted[0].embedding(),
            MockEmbeddingProvider::vector_for("new question").as_slice()
        );
    }

    #[tokio::test]
    async fn test_miss_records_stats() {
        let fixture = Fixture::new(
            MockEmbeddingProvider::new(),
            MockGenerativeModel::new(),
            MockVectorStore::new(),
        );
        let processor = fixture.processor();

        processor.ask("new question", None).await.unwrap();

        let snapshot = fixture.stats.snapshot();
        assert_eq!(snapshot.total_queries, 1);
        assert_eq!(snapshot.total_hits, 0);
        assert!(snapshot.recent_hits.is_empty());
        assert!(snapshot.miss_median_latency_ms >= 0.0);
    }

    #[tokio::test]
    async fn test_below_threshold_match_is_a_miss() {
        let fixture = Fixture::new(
            MockEmbeddingProvider::new(),
            MockGenerativeModel::new().with_response("fresh"),
            MockVectorStore::new().with_match(cache_match("q", "stale", 0.5)),
        );
        let processor = fixture.processor();

        let result = processor.ask("my query", None).await.unwrap();

        assert!(!result.outcome.hit);
        assert_eq!(result.response, "fresh");
        assert_eq!(fixture.model.generate_calls(), 1);
    }

    #[tokio::test]
    async fn test_caller_threshold_overrides_default() {
        let fixture = Fixture::new(
            MockEmbeddingProvider::new(),
            MockGenerativeModel::new(),
            MockVectorStore::new().with_match(cache_match("q", "cached", 0.75)),
        );
        let processor = fixture.processor();

        // Stricter than the match score: miss
        let strict = processor.ask("my query", Some(0.8)).await.unwrap();
        assert!(!strict.outcome.hit);

        // Looser: hit
        let loose = processor.ask("my query", Some(0.6)).await.unwrap();
        assert!(loose.outcome.hit);
    }

    #[tokio::test]
    async fn test_empty_query_rejected() {
        let fixture = Fixture::new(
            MockEmbeddingProvider::new(),
            MockGenerativeModel::new(),
            MockVectorStore::new(),
        );
        let processor = fixture.processor();

        let result = processor.ask("   ", None).await;

        assert!(matches!(result, Err(DomainError::Validation { .. })));
        assert_eq!(fixture.embedding.embed_calls(), 0);
    }

    #[tokio::test]
    async fn test_invalid_threshold_rejected() {
        let fixture = Fixture::new(
            MockEmbeddingProvider::new(),
            MockGenerativeModel::new(),
            MockVectorStore::new(),
        );
        let processor = fixture.processor();

        for threshold in [0.0, -0.1, 1.5] {
            let result = processor.ask("q", Some(threshold)).await;
            assert!(matches!(result, Err(DomainError::Validation { .. })));
        }
    }

    #[tokio::test]
    async fn test_embedding_failure_aborts_without_stats() {
        let fixture = Fixture::new(
            MockEmbeddingProvider::new().with_error("provider down"),
            MockGenerativeModel::new(),
            MockVectorStore::new(),
        );
        let processor = fixture.processor();

        let result = processor.ask("q", None).await;

        assert!(matches!(result, Err(DomainError::Embedding { .. })));
        assert_eq!(fixture.store.search_calls(), 0);
        assert_eq!(fixture.model.generate_calls(), 0);
        assert_eq!(fixture.stats.snapshot().total_queries, 0);
    }

    #[tokio::test]
    async fn test_search_failure_aborts_without_stats() {
        let fixture = Fixture::new(
            MockEmbeddingProvider::new(),
            MockGenerativeModel::new(),
            MockVectorStore::new().with_search_error("index down"),
        );
        let processor = fixture.processor();

        let result = processor.ask("q", None).await;

        assert!(matches!(result, Err(DomainError::Search { .. })));
        assert_eq!(fixture.model.generate_calls(), 0);
        assert_eq!(fixture.stats.snapshot().total_queries, 0);
    }

    #[tokio::test]
    async fn test_generation_failure_aborts_without_stats() {
        let fixture = Fixture::new(
            MockEmbeddingProvider::new(),
            MockGenerativeModel::new().with_error("rate limited"),
            MockVectorStore::new(),
        );
        let processor = fixture.processor();

        let result = processor.ask("q", None).await;

        assert!(matches!(result, Err(DomainError::Generation { .. })));
        assert_eq!(fixture.store.insert_calls(), 0);
        assert_eq!(fixture.stats.snapshot().total_queries, 0);
    }

    #[tokio::test]
    async fn test_insert_failure_still_returns_answer() {
        let fixture = Fixture::new(
            MockEmbeddingProvider::new(),
            MockGenerativeModel::new().with_response("fresh"),
            MockVectorStore::new().with_insert_error("disk full"),
        );
        let processor = fixture.processor();

        let result = processor.ask("q", None).await.unwrap();

        assert_eq!(result.response, "fresh");
        assert!(!result.outcome.hit);
        assert!(result.outcome.unpersisted);

        // Still a completed miss from the tracker's point of view
        let snapshot = fixture.stats.snapshot();
        assert_eq!(snapshot.total_queries, 1);
        assert_eq!(snapshot.total_hits, 0);
    }

    #[tokio::test]
    async fn test_score_rounded_to_two_decimals() {
        let fixture = Fixture::new(
            MockEmbeddingProvider::new(),
            MockGenerativeModel::new(),
            MockVectorStore::new().with_match(cache_match("q", "a", 0.876_543)),
        );
        let processor = fixture.processor();

        let result = processor.ask("q", None).await.unwrap();

        assert_eq!(result.outcome.score, Some(0.88));
    }

    #[tokio::test]
    async fn test_concurrent_asks_count_every_query() {
        use crate::infrastructure::vector_store::InMemoryVectorStore;

        let stats = Arc::new(StatsTracker::new(50, 1000));
        let processor = Arc::new(QueryProcessor::new(
            Arc::new(MockEmbeddingProvider::new()) as Arc<dyn EmbeddingProvider>,
            Arc::new(MockGenerativeModel::new()) as Arc<dyn GenerativeModel>,
            Arc::new(InMemoryVectorStore::new(100)) as Arc<dyn VectorStore>,
            Arc::clone(&stats),
            CacheConfig::default(),
        ));

        let mut handles = Vec::new();
        for i in 0..16 {
            let processor = Arc::clone(&processor);
            handles.push(tokio::spawn(async move {
                processor.ask(&format!("question number {}", i), None).await
            }));
        }

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(stats.snapshot().total_queries, 16);
    }

    #[tokio::test]
    async fn test_repeated_miss_then_hit_with_real_store() {
        use crate::infrastructure::vector_store::InMemoryVectorStore;

        let embedding = Arc::new(MockEmbeddingProvider::new());
        let model = Arc::new(MockGenerativeModel::new().with_response("answer"));
        let store = Arc::new(InMemoryVectorStore::new(100));
        let stats = Arc::new(StatsTracker::new(50, 1000));

        let processor = QueryProcessor::new(
            Arc::clone(&embedding) as Arc<dyn EmbeddingProvider>,
            Arc::clone(&model) as Arc<dyn GenerativeModel>,
            Arc::clone(&store) as Arc<dyn VectorStore>,
            Arc::clone(&stats),
            CacheConfig::default(),
        );

        let first = processor.ask("what is rust?", None).await.unwrap();
        assert!(!first.outcome.hit);

        // Identical query embeds identically, so the second pass must hit
        let second = processor.ask("what is rust?", None).await.unwrap();
        assert!(second.outcome.hit);
        assert_eq!(second.response, "answer");
        assert_eq!(second.outcome.score, Some(1.0));

        assert_eq!(model.generate_calls(), 1);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.total_queries, 2);
        assert_eq!(snapshot.total_hits, 1);
        assert_eq!(snapshot.hit_rate, 0.5);
    }
}
