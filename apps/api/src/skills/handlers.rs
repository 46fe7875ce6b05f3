//! Axum route handlers for the skill catalog.

use axum::{extract::State, http::StatusCode, Json};

use crate::errors::AppError;
use crate::state::AppState;

/// GET /api/v1/skills
///
/// Canonical skill names, sorted.
pub async fn handle_list_skills(
    State(state): State<AppState>,
) -> Result<Json<Vec<String>>, AppError> {
    let catalog = state.skills.all_uppercased().await?;
    let mut skills: Vec<String> = catalog.iter().cloned().collect();
    skills.sort();
    Ok(Json(skills))
}

/// POST /api/v1/skills/refresh
///
/// Drops the cached catalog; the next lookup reloads it from the database.
pub async fn handle_refresh_skills(State(state): State<AppState>) -> StatusCode {
    state.skills.invalidate();
    StatusCode::NO_CONTENT
}
