//! OpenAI generative model implementation

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::llm::GenerativeModel;
use crate::domain::DomainError;
use crate::infrastructure::http_client::HttpClientTrait;

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";

/// OpenAI chat completions backend
#[derive(Debug)]
pub struct OpenAiGenerativeModel<C: HttpClientTrait> {
    client: C,
    auth_header: String,
    base_url: String,
}

impl<C: HttpClientTrait> OpenAiGenerativeModel<C> {
    /// Create a new OpenAI generative model
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, DEFAULT_OPENAI_BASE_URL)
    }

    /// Create a new backend with custom base URL
    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let auth_header = format!("Bearer {}", api_key.into());
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            client,
            auth_header,
            base_url,
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("Authorization", self.auth_header.as_str()),
            ("Content-Type", "application/json"),
        ]
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<String, DomainError> {
        let response: OpenAiChatResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::generation(format!("Failed to parse completion response: {}", e))
        })?;

        response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| DomainError::generation("Completion response contained no choices"))
    }
}

#[async_trait]
impl<C: HttpClientTrait> GenerativeModel for OpenAiGenerativeModel<C> {
    async fn generate(&self, query: &str, model: &str) -> Result<String, DomainError> {
        let url = self.completions_url();
        let body = serde_json::json!({
            "model": model,
            "messages": [{ "role": "user", "content": query }],
        });

        let response = self
            .client
            .post_json(&url, self.headers(), &body)
            .await
            .map_err(|e| DomainError::generation(format!("Completion request failed: {}", e)))?;

        self.parse_response(response)
    }

    fn provider_name(&self) -> &str {
        "openai"
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiChatResponse {
    choices: Vec<OpenAiChatChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChatChoice {
    message: OpenAiChatMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiChatMessage {
    content: String,
}
