//! Cache behaviour configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the semantic cache decision engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Default similarity threshold for cache hits when the caller does not
    /// supply one (0.0 to 1.0)
    #[serde(default = "default_threshold")]
    pub default_threshold: f32,

    /// Candidate pool width handed to the index so it can search
    /// approximately while top-1 retrieval stays accurate
    #[serde(default = "default_candidate_pool")]
    pub candidate_pool: usize,

    /// Number of recent hit events retained for observability
    #[serde(default = "default_recent_hits_capacity")]
    pub recent_hits_capacity: usize,

    /// Rolling window of miss latencies used for the median
    #[serde(default = "default_miss_window")]
    pub miss_window: usize,

    /// Embedding model to use
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Expected embedding dimension; must match the model
    #[serde(default = "default_embedding_dimensions")]
    pub embedding_dimensions: usize,

    /// Generative model answering cache misses
    #[serde(default = "default_generation_model")]
    pub generation_model: String,

    /// Timeout applied to each external call (embed, search, generate,
    /// insert), in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_threshold() -> f32 {
    0.70
}

fn default_candidate_pool() -> usize {
    20
}

fn default_recent_hits_capacity() -> usize {
    50
}

fn default_miss_window() -> usize {
    1000
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_embedding_dimensions() -> usize {
    1536
}

fn default_generation_model() -> String {
    "gpt-5-nano".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_threshold: default_threshold(),
            candidate_pool: default_candidate_pool(),
            recent_hits_capacity: default_recent_hits_capacity(),
            miss_window: default_miss_window(),
            embedding_model: default_embedding_model(),
            embedding_dimensions: default_embedding_dimensions(),
            generation_model: default_generation_model(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Per-call timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn with_default_threshold(mut self, threshold: f32) -> Self {
        self.default_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    pub fn with_candidate_pool(mut self, pool: usize) -> Self {
        self.candidate_pool = pool;
        self
    }

    pub fn with_recent_hits_capacity(mut self, capacity: usize) -> Self {
        self.recent_hits_capacity = capacity;
        self
    }

    pub fn with_miss_window(mut self, window: usize) -> Self {
        self.miss_window = window;
        self
    }

    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    pub fn with_embedding_dimensions(mut self, dimensions: usize) -> Self {
        self.embedding_dimensions = dimensions;
        self
    }

    pub fn with_generation_model(mut self, model: impl Into<String>) -> Self {
        self.generation_model = model.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_secs = timeout.as_secs();
        self
    }
}
