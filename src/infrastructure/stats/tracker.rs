//! Aggregate statistics tracker

use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::Utc;

use crate::domain::cache::round2;
use crate::domain::stats::{RecentHitEntry, StatsSnapshot};

/// Mutable counters behind the tracker's lock
#[derive(Debug, Default)]
struct StatsInner {
    total_queries: u64,
    total_hits: u64,
    saved_latency_sum: f64,
    recent_hits: VecDeque<RecentHitEntry>,
    miss_latencies: VecDeque<f64>,
}

/// Tracks hit/miss counters across concurrent requests.
///
/// All updates happen under one mutex so a snapshot always sees a
/// consistent state; the lock is never held across an await point.
#[derive(Debug)]
pub struct StatsTracker {
    inner: Mutex<StatsInner>,
    recent_hits_capacity: usize,
    miss_window: usize,
}

impl StatsTracker {
    pub fn new(recent_hits_capacity: usize, miss_window: usize) -> Self {
        Self {
            inner: Mutex::new(StatsInner::default()),
            recent_hits_capacity,
            miss_window,
        }
    }

    /// Record a completed cache hit
    pub fn record_hit(&self, query: &str, threshold: f32, score: f32, saved_latency_ms: f64) {
        let mut inner = match self.inner.lock() {
            Ok(inner) => inner,
            Err(poisoned) => poisoned.into_inner(),
        };

        inner.total_queries += 1;
        inner.total_hits += 1;
        inner.saved_latency_sum += saved_latency_ms;

        inner.recent_hits.push_front(RecentHitEntry {
            query: query.to_string(),
            threshold,
            score,
            saved_latency_ms,
            timestamp: Utc::now(),
        });
        inner.recent_hits.truncate(self.recent_hits_capacity);
    }

    /// Record a completed cache miss with its full request latency
    pub fn record_miss(&self, latency_ms: f64) {
        let mut inner = match self.inner.lock() {
            Ok(inner) => inner,
            Err(poisoned) => poisoned.into_inner(),
        };

        inner.total_queries += 1;

        inner.miss_latencies.push_back(latency_ms);
        if inner.miss_latencies.len() > self.miss_window {
            inner.miss_latencies.pop_front();
        }
    }

    /// Consistent point-in-time view of all counters
    pub fn snapshot(&self) -> StatsSnapshot {
        let inner = match self.inner.lock() {
            Ok(inner) => inner,
            Err(poisoned) => poisoned.into_inner(),
        };

        let avg_saved_latency_ms = if inner.total_hits > 0 {
            round2(inner.saved_latency_sum / inner.total_hits as f64)
        } else {
            0.0
        };

        // The exact quotient, not rounded: totalHits/totalQueries must hold
        // for any hit/miss sequence.
        let hit_rate = if inner.total_queries > 0 {
            inner.total_hits as f64 / inner.total_queries as f64
        } else {
            0.0
        };

        StatsSnapshot {
            total_queries: inner.total_queries,
            total_hits: inner.total_hits,
            avg_saved_latency_ms,
            hit_rate,
            miss_median_latency_ms: round2(median(&inner.miss_latencies)),
            recent_hits: inner.recent_hits.iter().cloned().collect(),
        }
    }
}

/// Median over the rolling window; mean of the two middle values when the
/// window has even length, 0.0 when empty
fn median(values: &VecDeque<f64>) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let mut sorted: Vec<f64> = values.iter().copied().collect();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}
