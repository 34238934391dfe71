//! Ask endpoint

use axum::{extract::State, Json};

use super::state::AppState;
use super::types::{ApiError, AskRequest, AskResponse};

/// POST /ask - answer a query from cache or by fresh generation
pub async fn ask(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
    let result = state
        .processor
        .ask(&request.query, request.threshold)
        .await?;

    Ok(Json(result.into()))
}
