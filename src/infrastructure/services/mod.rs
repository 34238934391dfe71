//! Application services

mod query_processor;

pub use query_processor::{AskResult, QueryProcessor};
