//! Per-request outcome metadata

use serde::Serialize;

/// Model tag reported for responses served from cache
pub const CACHED_MODEL_TAG: &str = "cached";

/// Outcome of a single completed query.
///
/// Built exactly once per request after the final stage; failed requests
/// never produce one.
#[derive(Debug, Clone, Serialize)]
pub struct QueryOutcome {
    /// Whether the response was served from cache
    pub hit: bool,
    /// Similarity score of the cache hit, clamped to [0, 1], 2 decimals
    pub score: Option<f32>,
    /// Wall-clock latency of the full request path, milliseconds, 2 decimals
    pub latency_ms: f64,
    /// Estimated generation latency avoided by the hit
    pub saved_latency_ms: Option<f64>,
    /// Which model produced the response ("cached" for hits)
    pub model: Option<String>,
    /// Set when the miss response could not be persisted to the store
    pub unpersisted: bool,
}

impl QueryOutcome {
    /// Outcome for a cache hit
    pub fn hit(score: f32, latency_ms: f64, saved_latency_ms: f64) -> Self {
        Self {
            hit: true,
            score: Some(clamp_score(score)),
            latency_ms: round2(latency_ms),
            saved_latency_ms: Some(round2(saved_latency_ms)),
            model: Some(CACHED_MODEL_TAG.to_string()),
            unpersisted: false,
        }
    }

    /// Outcome for a cache miss answered by the generative model
    pub fn miss(latency_ms: f64, model: impl Into<String>) -> Self {
        Self {
            hit: false,
            score: None,
            latency_ms: round2(latency_ms),
            saved_latency_ms: None,
            model: Some(model.into()),
            unpersisted: false,
        }
    }

    /// Flag that the record insert failed after a successful generation
    pub fn with_unpersisted(mut self) -> Self {
        self.unpersisted = true;
        self
    }
}

/// Round to 2 decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Clamp a similarity score to [0, 1] and round to 2 decimals
pub fn clamp_score(score: f32) -> f32 {
    let clamped = score.clamp(0.0, 1.0) as f64;
    round2(clamped) as f32
}
