//! Semantic Cache API
//!
//! A similarity-gated response cache fronting a generative model:
//! - Embeds each query and looks for a sufficiently similar prior one
//! - Serves the cached response on a hit, generates and persists on a miss
//! - Tracks hit/miss statistics and estimated latency savings

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use tracing::info;

use api::AppState;
use domain::cache::VectorStore;
use domain::embedding::EmbeddingProvider;
use domain::llm::GenerativeModel;
use domain::DomainError;
use infrastructure::embedding::OpenAiEmbeddingProvider;
use infrastructure::http_client::HttpClient;
use infrastructure::llm::OpenAiGenerativeModel;
use infrastructure::services::QueryProcessor;
use infrastructure::stats::StatsTracker;
use infrastructure::vector_store::{InMemoryVectorStore, PgvectorConfig, PgvectorVectorStore};

/// Create the application state with all collaborators wired up
pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let api_key =
        std::env::var("OPENAI_API_KEY").unwrap_or_else(|_| "sk-placeholder".to_string());
    let base_url = std::env::var("OPENAI_BASE_URL").ok();

    let embedding_provider = create_embedding_provider(&api_key, base_url.as_deref(), config)?;
    let generative_model = create_generative_model(&api_key, base_url.as_deref(), config)?;
    let vector_store = create_vector_store(config).await?;

    let stats = Arc::new(StatsTracker::new(
        config.cache.recent_hits_capacity,
        config.cache.miss_window,
    ));

    let processor = Arc::new(QueryProcessor::new(
        embedding_provider,
        generative_model,
        vector_store,
        Arc::clone(&stats),
        config.cache.clone(),
    ));

    Ok(AppState::new(processor, stats))
}

fn create_embedding_provider(
    api_key: &str,
    base_url: Option<&str>,
    config: &AppConfig,
) -> anyhow::Result<Arc<dyn EmbeddingProvider>> {
    let client = HttpClient::with_timeout(config.cache.request_timeout())?;

    let provider = match base_url {
        Some(url) => {
            info!("Using OpenAI embeddings with custom base URL: {}", url);
            OpenAiEmbeddingProvider::with_base_url(client, api_key, url)
        }
        None => OpenAiEmbeddingProvider::new(client, api_key),
    };

    // A store built for one dimension cannot index vectors of another, so a
    // known mismatch is fatal at startup rather than a runtime surprise.
    match provider.dimensions(&config.cache.embedding_model) {
        Some(dims) if dims != config.cache.embedding_dimensions => {
            return Err(DomainError::configuration(format!(
                "Model {} produces {}-dimensional embeddings, but {} are configured",
                config.cache.embedding_model, dims, config.cache.embedding_dimensions
            ))
            .into());
        }
        None => {
            tracing::warn!(
                model = %config.cache.embedding_model,
                "Unknown embedding model, trusting configured dimensions"
            );
        }
        Some(_) => {}
    }

    Ok(Arc::new(provider))
}

fn create_generative_model(
    api_key: &str,
    base_url: Option<&str>,
    config: &AppConfig,
) -> anyhow::Result<Arc<dyn GenerativeModel>> {
    let client = HttpClient::with_timeout(config.cache.request_timeout())?;

    let model = match base_url {
        Some(url) => OpenAiGenerativeModel::with_base_url(client, api_key, url),
        None => OpenAiGenerativeModel::new(client, api_key),
    };

    Ok(Arc::new(model))
}

async fn create_vector_store(config: &AppConfig) -> anyhow::Result<Arc<dyn VectorStore>> {
    match config.storage.backend.as_str() {
        "postgres" => {
            let database_url = std::env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

            info!("Connecting to PostgreSQL...");
            let pool = sqlx::PgPool::connect(&database_url)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to connect to PostgreSQL: {}", e))?;
            info!("PostgreSQL connection established");

            let store = PgvectorVectorStore::new(
                pool,
                PgvectorConfig::new(config.cache.embedding_dimensions)
                    .with_candidate_pool(config.cache.candidate_pool),
            );
            store.ensure_table().await?;

            Ok(Arc::new(store))
        }
        other => {
            if other != "memory" {
                tracing::warn!(backend = other, "Unknown storage backend, using memory");
            }
            info!("Using in-memory vector store");
            Ok(Arc::new(InMemoryVectorStore::new(config.storage.max_records)))
        }
    }
}
