//! Ask endpoint request and response types

use serde::{Deserialize, Serialize};

use crate::domain::cache::QueryOutcome;
use crate::infrastructure::services::AskResult;

/// Request body for POST /ask
#[derive(Debug, Clone, Deserialize)]
pub struct AskRequest {
    /// The query text
    pub query: String,
    /// Optional similarity threshold override in (0, 1]
    #[serde(default)]
    pub threshold: Option<f32>,
}

/// Response body for POST /ask
#[derive(Debug, Clone, Serialize)]
pub struct AskResponse {
    pub response: String,
    pub meta: AskMeta,
}

/// Hit/miss metadata attached to every answer
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AskMeta {
    pub hit: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
    pub latency_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_latency_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Only present when a generated answer could not be cached
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub unpersisted: bool,
}

impl From<QueryOutcome> for AskMeta {
    fn from(outcome: QueryOutcome) -> Self {
        Self {
            hit: outcome.hit,
            score: outcome.score,
            latency_ms: outcome.latency_ms,
            saved_latency_ms: outcome.saved_latency_ms,
            model: outcome.model,
            unpersisted: outcome.unpersisted,
        }
    }
}

impl From<AskResult> for AskResponse {
    fn from(result: AskResult) -> Self {
        Self {
            response: result.response,
            meta: result.outcome.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_threshold_defaults_to_none() {
        let request: AskRequest = serde_json::from_str(r#"{"query": "hello"}"#).unwrap();

        assert_eq!(request.query, "hello");
        assert_eq!(request.threshold, None);
    }

    #[test]
    fn test_request_with_threshold() {
        let request: AskRequest =
            serde_json::from_str(r#"{"query": "hello", "threshold": 0.85}"#).unwrap();

        assert_eq!(request.threshold, Some(0.85));
    }

    #[test]
    fn test_hit_meta_serialization() {
        let response = AskResponse {
            response: "cached".to_string(),
            meta: QueryOutcome::hit(0.82, 12.34, 801.23).into(),
        };

        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["response"], "cached");
        assert_eq!(json["meta"]["hit"], true);
        let score = json["meta"]["score"].as_f64().unwrap();
        assert!((score - 0.82).abs() < 1e-6);
        assert_eq!(json["meta"]["latencyMs"], 12.34);
        assert_eq!(json["meta"]["savedLatencyMs"], 801.23);
        assert_eq!(json["meta"]["model"], "cached");
        assert!(json["meta"].get("unpersisted").is_none());
    }

    #[test]
    fn test_miss_meta_omits_hit_fields() {
        let response = AskResponse {
            response: "fresh".to_string(),
            meta: QueryOutcome::miss(950.0, "gpt-5-nano").into(),
        };

        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["meta"]["hit"], false);
        assert!(json["meta"].get("score").is_none());
        assert!(json["meta"].get("savedLatencyMs").is_none());
        assert_eq!(json["meta"]["model"], "gpt-5-nano");
    }

    #[test]
    fn test_unpersisted_flag_serialized_when_set() {
        let response = AskResponse {
            response: "fresh".to_string(),
            meta: QueryOutcome::miss(950.0, "gpt-5-nano").with_unpersisted().into(),
        };

        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["meta"]["unpersisted"], true);
    }
}
