//! Axum route handlers for the Consultant API.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::consultants::ingest::{canonical_cv_skills, canonical_engagements, parse_cv};
use crate::consultants::repository::{
    get_profile, insert_consultant, list_consultants, set_cv_s3_key, NewConsultant,
};
use crate::documents::{
    document_key, extract_text, finish_archive, read_upload_form, store_document,
};
use crate::errors::AppError;
use crate::models::consultant::{ConsultantProfile, ConsultantRow};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CvUploaded {
    pub id: i64,
    pub name: String,
    pub skills: Vec<String>,
    pub engagements: usize,
}

/// POST /api/v1/consultants
///
/// Multipart fields: `file` (CV as PDF or text), optional `name` and `email`
/// overriding what the model reads from the CV.
pub async fn handle_upload_cv(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<CvUploaded>), AppError> {
    let form = read_upload_form(multipart).await?;
    let file = form
        .file
        .as_ref()
        .ok_or_else(|| AppError::Validation("'file' is required".to_string()))?;

    let cv_text = extract_text(file).await?;
    let parsed = parse_cv(&cv_text, state.llm.as_ref()).await?;

    let name = form
        .field("name")
        .or(parsed.name.as_deref().map(str::trim))
        .filter(|n| !n.is_empty())
        .ok_or_else(|| {
            AppError::Validation("name is required when it cannot be read from the CV".to_string())
        })?
        .to_string();
    let email = form
        .field("email")
        .map(str::to_string)
        .or(parsed.email.clone());
    let skills = canonical_cv_skills(&parsed.skills);
    let engagements = canonical_engagements(&parsed.engagements);

    let id = insert_consultant(
        &state.db,
        NewConsultant {
            name: &name,
            email: email.as_deref(),
            cv_text: &cv_text,
            skills: &skills,
            engagements: &engagements,
        },
    )
    .await?;

    // New CVs can introduce skills the cached catalog has never seen.
    state.skills.invalidate();

    let key = document_key("cvs", id, file);
    let stored = store_document(&state.s3, &state.config.s3_bucket, &key, file).await;
    finish_archive(&key, stored, || set_cv_s3_key(&state.db, id, &key)).await;
    info!(consultant_id = id, "CV uploaded for {name}");

    Ok((
        StatusCode::CREATED,
        Json(CvUploaded {
            id,
            name,
            skills: skills.into_iter().map(|(skill, _)| skill).collect(),
            engagements: engagements.len(),
        }),
    ))
}

/// GET /api/v1/consultants
pub async fn handle_list_consultants(
    State(state): State<AppState>,
) -> Result<Json<Vec<ConsultantRow>>, AppError> {
    Ok(Json(list_consultants(&state.db).await?))
}

/// GET /api/v1/consultants/:id
pub async fn handle_get_consultant(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ConsultantProfile>, AppError> {
    let profile = get_profile(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Consultant {id} not found")))?;
    Ok(Json(profile))
}
