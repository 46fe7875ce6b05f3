//! Axum route handlers for consultant search and industry detection.

use std::collections::BTreeSet;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::consultants::repository::load_profiles;
use crate::errors::AppError;
use crate::search::consultant_filter::{filter_profiles, resolve_query, ConsultantHit, ConsultantQuery};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DetectIndustriesRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct DetectIndustriesResponse {
    pub industries: BTreeSet<String>,
}

/// GET /api/v1/consultants/search?customer=&industry=&skill=
pub async fn handle_search_consultants(
    State(state): State<AppState>,
    Query(query): Query<ConsultantQuery>,
) -> Result<Json<Vec<ConsultantHit>>, AppError> {
    let skill = match non_blank(query.skill.as_deref()) {
        Some(raw) => {
            // A skill outside the catalog cannot be listed on any consultant.
            match state.skills.normalize_and_filter([raw]).await?.into_iter().next() {
                Some(canonical) => Some(canonical),
                None => return Ok(Json(vec![])),
            }
        }
        None => None,
    };

    let resolved = resolve_query(
        non_blank(query.customer.as_deref()),
        non_blank(query.industry.as_deref()),
        skill,
        &state.lexicon,
    );
    let profiles = load_profiles(&state.db).await?;

    Ok(Json(filter_profiles(&profiles, &resolved, &state.lexicon)))
}

/// GET /api/v1/industries
pub async fn handle_list_industries(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.lexicon.industries())
}

/// POST /api/v1/industries/detect
pub async fn handle_detect_industries(
    State(state): State<AppState>,
    Json(request): Json<DetectIndustriesRequest>,
) -> Json<DetectIndustriesResponse> {
    Json(DetectIndustriesResponse {
        industries: state.lexicon.detect_industries(&request.text),
    })
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
