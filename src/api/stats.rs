//! Stats endpoint

use axum::{extract::State, Json};

use super::state::AppState;
use crate::domain::stats::StatsSnapshot;

/// GET /stats - point-in-time view of the aggregate counters
pub async fn stats(State(state): State<AppState>) -> Json<StatsSnapshot> {
    Json(state.stats.snapshot())
}
