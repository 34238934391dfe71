//! Generative model trait

use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::DomainError;

/// Trait for the generative backend that answers cache misses
#[async_trait]
pub trait GenerativeModel: Send + Sync + Debug {
    /// Generate a response for a query
    async fn generate(&self, query: &str, model: &str) -> Result<String, DomainError>;

    /// Provider name for logging
    fn provider_name(&self) -> &str;
}


#[cfg(test)]
mod tests {
    use super::mock::MockGenerativeModel;
    use super::*;

    #[tokio::test]
    async fn test_mock_canned_response() {
        let model = MockGenerativeModel::new().with_response("hello");

        let response = model.generate("q", "m").await.unwrap();

        assert_eq!(response, "hello");
        assert_eq!(model.generate_calls(), 1);
    }

    #[tokio::test]
    async fn test_mock_error_injection() {
        let model = MockGenerativeModel::new().with_error("rate limited");

        let result = model.generate("q", "m").await;

        assert!(matches!(result, Err(DomainError::Generation { .. })));
    }
}
