//! Semantic cache domain types and the vector store boundary

mod config;
mod outcome;
mod record;
mod store;

pub use config::CacheConfig;
pub use outcome::{clamp_score, round2, QueryOutcome, CACHED_MODEL_TAG};
pub use record::{CacheMatch, CacheRecord};
pub use store::VectorStore;

#[cfg(test)]
pub use store::mock::MockVectorStore;
