//! Infrastructure implementations of the domain boundaries

pub mod embedding;
pub mod http_client;
pub mod llm;
pub mod logging;
pub mod services;
pub mod stats;
pub mod vector_store;
