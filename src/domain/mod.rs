//! Domain models and trait boundaries

pub mod cache;
pub mod embedding;
pub mod llm;
pub mod stats;

mod error;

pub use error::DomainError;
