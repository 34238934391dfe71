//! Aggregate statistics types

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One cache hit retained for the recent-hits feed
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentHitEntry {
    /// The incoming query that hit the cache
    pub query: String,
    /// Threshold in effect for that request
    pub threshold: f32,
    /// Similarity score of the match
    pub score: f32,
    /// Estimated latency avoided
    pub saved_latency_ms: f64,
    /// When the hit completed
    pub timestamp: DateTime<Utc>,
}

/// Point-in-time view of the aggregate counters.
///
/// All derived values (hit rate, averages, median) are computed at snapshot
/// time from a single consistent read of the counters.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    /// Total completed queries (hits plus misses)
    pub total_queries: u64,
    /// Completed queries served from cache
    pub total_hits: u64,
    /// Mean saved latency across all hits, 0.0 when there are none
    pub avg_saved_latency_ms: f64,
    /// total_hits / total_queries, 0.0 when no queries completed
    pub hit_rate: f64,
    /// Median latency over the rolling miss window, 0.0 when empty
    pub miss_median_latency_ms: f64,
    /// Most recent hits, newest first
    pub recent_hits: Vec<RecentHitEntry>,
}
