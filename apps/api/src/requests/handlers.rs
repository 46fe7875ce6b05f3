//! Axum route handlers for the Project Request API.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::documents::{
    document_key, extract_text, finish_archive, read_upload_form, store_document,
};
use crate::errors::AppError;
use crate::matching::events::ProjectRequestUploaded;
use crate::models::project_request::{ProjectRequestRow, RequestSkillRow, RequestStatus};
use crate::requests::ingest::{canonical_request_skills, derive_title, parse_project_request};
use crate::requests::repository::{
    get_request, get_request_skills, insert_request, list_requests, set_s3_key, NewProjectRequest,
};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ProjectRequestCreated {
    pub id: i64,
    pub customer_name: String,
    pub title: String,
    pub skills: Vec<RequestSkill>,
    pub status: RequestStatus,
}

#[derive(Debug, Serialize)]
pub struct RequestSkill {
    pub name: String,
    pub is_required: bool,
}

#[derive(Debug, Serialize)]
pub struct ProjectRequestDetail {
    #[serde(flatten)]
    pub request: ProjectRequestRow,
    pub skills: Vec<RequestSkillRow>,
}

/// POST /api/v1/project-requests
///
/// Multipart fields: `customer_name`, `title` (optional), and either a `file`
/// (PDF or text) or a `text` field. Matching starts in the background; the
/// response does not wait for it.
pub async fn handle_upload_request(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ProjectRequestCreated>), AppError> {
    let form = read_upload_form(multipart).await?;

    let text = match &form.file {
        Some(file) => extract_text(file).await?,
        None => form.require_field("text")?.to_string(),
    };

    let parsed = parse_project_request(&text, state.llm.as_ref()).await?;

    let customer_name = form
        .field("customer_name")
        .or(parsed.customer_name.as_deref().map(str::trim))
        .filter(|c| !c.is_empty())
        .ok_or_else(|| {
            AppError::Validation(
                "customer_name is required when it cannot be read from the document".to_string(),
            )
        })?
        .to_string();
    let title = derive_title(form.field("title"), parsed.title.as_deref(), &text);
    let skills = canonical_request_skills(&parsed.skills);

    let id = insert_request(
        &state.db,
        NewProjectRequest {
            customer_name: &customer_name,
            title: &title,
            description: &text,
            deadline: parsed.deadline,
            skills: &skills,
        },
    )
    .await?;

    // The row is committed: matching starts regardless of how archiving goes.
    state
        .match_events
        .publish(ProjectRequestUploaded::new(id, customer_name.clone()));

    if let Some(file) = &form.file {
        let key = document_key("project-requests", id, file);
        let stored = store_document(&state.s3, &state.config.s3_bucket, &key, file).await;
        finish_archive(&key, stored, || set_s3_key(&state.db, id, &key)).await;
    }
    info!(project_request_id = id, "Project request uploaded for {customer_name}");

    Ok((
        StatusCode::CREATED,
        Json(ProjectRequestCreated {
            id,
            customer_name,
            title,
            skills: skills
                .into_iter()
                .map(|(name, is_required)| RequestSkill { name, is_required })
                .collect(),
            status: RequestStatus::Uploaded,
        }),
    ))
}

/// GET /api/v1/project-requests
pub async fn handle_list_requests(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProjectRequestRow>>, AppError> {
    Ok(Json(list_requests(&state.db).await?))
}

/// GET /api/v1/project-requests/:id
pub async fn handle_get_request(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ProjectRequestDetail>, AppError> {
    let request = get_request(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Project request {id} not found")))?;
    let skills = get_request_skills(&state.db, id).await?;
    Ok(Json(ProjectRequestDetail { request, skills }))
}
