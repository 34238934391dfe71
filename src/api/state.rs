//! Shared application state

use std::sync::Arc;

use crate::infrastructure::services::QueryProcessor;
use crate::infrastructure::stats::StatsTracker;

/// State shared by all request handlers
#[derive(Clone)]
pub struct AppState {
    pub processor: Arc<QueryProcessor>,
    pub stats: Arc<StatsTracker>,
}

impl AppState {
    pub fn new(processor: Arc<QueryProcessor>, stats: Arc<StatsTracker>) -> Self {
        Self { processor, stats }
    }
}
