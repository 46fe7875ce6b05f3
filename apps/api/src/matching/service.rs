//! Matching Service — the consumer side of the upload trigger.
//!
//! `MatchingService` is the seam the worker calls through; `SkillMatchingService`
//! is the production implementation backed by Postgres.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{debug, warn};

use crate::consultants::repository::load_profiles;
use crate::errors::AppError;
use crate::matching::scoring::{rank_candidates, RequestProfile, RequestedSkill};
use crate::models::project_request::{ProjectRequestRow, RequestSkillRow, RequestStatus};
use crate::requests::repository::{get_request, get_request_skills, replace_matches, set_status};
use crate::search::SearchLexicon;
use crate::skills::catalog::normalize_skill;
use crate::skills::SkillCatalog;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchSummary {
    pub project_request_id: i64,
    pub candidates_scored: usize,
    pub matches_stored: usize,
    pub best_score: Option<u32>,
}

#[async_trait]
pub trait MatchingService: Send + Sync {
    async fn on_project_request_uploaded(
        &self,
        project_request_id: i64,
    ) -> Result<MatchSummary, AppError>;
}

pub struct SkillMatchingService {
    db: PgPool,
    skills: Arc<SkillCatalog>,
    lexicon: Arc<SearchLexicon>,
    match_limit: usize,
}

impl SkillMatchingService {
    pub fn new(
        db: PgPool,
        skills: Arc<SkillCatalog>,
        lexicon: Arc<SearchLexicon>,
        match_limit: usize,
    ) -> Self {
        Self {
            db,
            skills,
            lexicon,
            match_limit,
        }
    }

    async fn run(&self, project_request_id: i64) -> Result<MatchSummary, AppError> {
        let request = get_request(&self.db, project_request_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Project request {project_request_id} not found"))
            })?;
        let skills = get_request_skills(&self.db, project_request_id).await?;

        let profile =
            build_request_profile(&request, &skills, &self.skills, &self.lexicon).await?;
        let consultants = load_profiles(&self.db).await?;
        let ranked = rank_candidates(&profile, &consultants, &self.lexicon, self.match_limit);

        replace_matches(&self.db, project_request_id, &ranked).await?;

        Ok(MatchSummary {
            project_request_id,
            candidates_scored: consultants.len(),
            matches_stored: ranked.len(),
            best_score: ranked.first().map(|c| c.score),
        })
    }
}

/// Turns a stored request into scorer input. Requested skills missing from the
/// catalog are kept with `in_catalog = false` so they can still match on CV text.
pub async fn build_request_profile(
    request: &ProjectRequestRow,
    skills: &[RequestSkillRow],
    catalog: &SkillCatalog,
    lexicon: &SearchLexicon,
) -> Result<RequestProfile, AppError> {
    let known = catalog
        .normalize_and_filter(skills.iter().map(|s| s.skill_name.as_str()))
        .await?;

    let requested: Vec<RequestedSkill> = skills
        .iter()
        .filter_map(|s| {
            normalize_skill(&s.skill_name).map(|name| RequestedSkill {
                in_catalog: known.contains(&name),
                name,
                is_required: s.is_required,
            })
        })
        .collect();

    let unknown = requested.iter().filter(|s| !s.in_catalog).count();
    if unknown > 0 {
        debug!(
            project_request_id = request.id,
            "{unknown} requested skills are not in the catalog, matching them on CV text only"
        );
    }

    let customer_terms = lexicon
        .expand_customer_term(&request.customer_name)
        .into_iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();
    let industries =
        lexicon.detect_industries(&format!("{}\n{}", request.title, request.description));

    Ok(RequestProfile {
        skills: requested,
        customer_terms,
        industries,
    })
}

/// Awaits a match run; on error calls `mark_failed` before handing the error back.
/// A failure to mark the request is logged and does not replace the run's error.
pub async fn run_or_mark_failed<R, M, MFut>(
    project_request_id: i64,
    run: R,
    mark_failed: M,
) -> Result<MatchSummary, AppError>
where
    R: Future<Output = Result<MatchSummary, AppError>>,
    M: FnOnce() -> MFut,
    MFut: Future<Output = Result<(), sqlx::Error>>,
{
    let result = run.await;
    if result.is_err() {
        if let Err(e) = mark_failed().await {
            warn!(
                project_request_id,
                "Could not mark project request as match_failed: {e}"
            );
        }
    }
    result
}

#[async_trait]
impl MatchingService for SkillMatchingService {
    async fn on_project_request_uploaded(
        &self,
        project_request_id: i64,
    ) -> Result<MatchSummary, AppError> {
        run_or_mark_failed(project_request_id, self.run(project_request_id), || {
            set_status(&self.db, project_request_id, RequestStatus::MatchFailed)
        })
        .await
    }
}
