//! Axum route handlers for stored match results.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::matching::events::ProjectRequestUploaded;
use crate::models::project_request::MatchRow;
use crate::requests::repository::{get_matches, get_request};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct MatchListResponse {
    pub project_request_id: i64,
    pub status: String,
    pub matches: Vec<MatchRow>,
}

#[derive(Debug, Serialize)]
pub struct RematchAccepted {
    pub project_request_id: i64,
    pub dispatched: bool,
}

/// GET /api/v1/project-requests/:id/matches
///
/// Best match first. Empty while the background run is still pending.
pub async fn handle_get_matches(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MatchListResponse>, AppError> {
    let request = get_request(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Project request {id} not found")))?;
    let matches = get_matches(&state.db, id).await?;

    Ok(Json(MatchListResponse {
        project_request_id: id,
        status: request.status,
        matches,
    }))
}

/// POST /api/v1/project-requests/:id/rematch
///
/// Re-runs matching, e.g. after new CVs were uploaded.
pub async fn handle_rematch(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<(StatusCode, Json<RematchAccepted>), AppError> {
    let request = get_request(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Project request {id} not found")))?;

    state
        .match_events
        .publish(ProjectRequestUploaded::new(request.id, request.customer_name));

    Ok((
        StatusCode::ACCEPTED,
        Json(RematchAccepted {
            project_request_id: id,
            dispatched: true,
        }),
    ))
}
