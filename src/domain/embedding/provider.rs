//! Embedding provider trait

use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::DomainError;

/// Trait for services that turn text into embedding vectors
#[async_trait]
pub trait EmbeddingProvider: Send + Sync + Debug {
    /// Embed a single text with the given model
    async fn embed(&self, text: &str, model: &str) -> Result<Vec<f32>, DomainError>;

    /// Provider name for logging
    fn provider_name(&self) -> &str;

    /// Output dimension for a model this provider knows, if any
    fn dimensions(&self, model: &str) -> Option<usize>;
}
