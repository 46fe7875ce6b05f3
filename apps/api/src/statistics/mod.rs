//! Statistics — aggregate counts over consultants, requests and matches.

use std::collections::BTreeMap;

use axum::{extract::State, Json};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use crate::errors::AppError;
use crate::models::project_request::RequestStatus;
use crate::state::AppState;

const TOP_SKILLS: i64 = 10;

#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
pub struct SkillCount {
    pub skill_name: String,
    pub consultants: i64,
}

#[derive(Debug, Clone, FromRow)]
struct StatusCount {
    status: String,
    count: i64,
}

#[derive(Debug, Serialize)]
pub struct StatisticsReport {
    pub consultants: i64,
    pub project_requests: i64,
    pub requests_by_status: BTreeMap<String, i64>,
    pub top_skills: Vec<SkillCount>,
    /// Mean of each matched request's best score. `None` before any match run.
    pub average_best_match_score: Option<f64>,
}

/// GET /api/v1/statistics
pub async fn handle_statistics(
    State(state): State<AppState>,
) -> Result<Json<StatisticsReport>, AppError> {
    Ok(Json(compute_statistics(&state.db).await?))
}

pub async fn compute_statistics(pool: &PgPool) -> Result<StatisticsReport, sqlx::Error> {
    let consultants: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM consultants")
        .fetch_one(pool)
        .await?;

    let status_rows = sqlx::query_as::<_, StatusCount>(
        "SELECT status, COUNT(*) AS count FROM project_requests GROUP BY status",
    )
    .fetch_all(pool)
    .await?;

    let top_skills = sqlx::query_as::<_, SkillCount>(
        r#"
        SELECT skill_name, COUNT(*) AS consultants
        FROM consultant_skills
        GROUP BY skill_name
        ORDER BY consultants DESC, skill_name
        LIMIT $1
        "#,
    )
    .bind(TOP_SKILLS)
    .fetch_all(pool)
    .await?;

    let average_best_match_score: Option<f64> = sqlx::query_scalar(
        r#"
        SELECT AVG(best)::FLOAT8
        FROM (
            SELECT MAX(score) AS best
            FROM project_request_matches
            GROUP BY project_request_id
        ) AS best_scores
        "#,
    )
    .fetch_one(pool)
    .await?;

    let requests_by_status = status_breakdown(&status_rows);
    Ok(StatisticsReport {
        consultants,
        project_requests: requests_by_status.values().sum(),
        requests_by_status,
        top_skills,
        average_best_match_score,
    })
}

/// Every known status appears, zero when absent. Unknown statuses are kept as-is.
fn status_breakdown(rows: &[StatusCount]) -> BTreeMap<String, i64> {
    let mut breakdown: BTreeMap<String, i64> = [
        RequestStatus::Uploaded,
        RequestStatus::Matched,
        RequestStatus::MatchFailed,
    ]
    .iter()
    .map(|s| (s.as_str().to_string(), 0))
    .collect();

    for row in rows {
        *breakdown.entry(row.status.clone()).or_insert(0) += row.count;
    }
    breakdown
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(status: &str, count: i64) -> StatusCount {
        StatusCount {
            status: status.to_string(),
            count,
        }
    }

    #[test]
    fn test_status_breakdown_fills_missing_statuses() {
        let breakdown = status_breakdown(&[row("matched", 4)]);
        assert_eq!(breakdown.get("matched"), Some(&4));
        assert_eq!(breakdown.get("uploaded"), Some(&0));
        assert_eq!(breakdown.get("match_failed"), Some(&0));
    }

    #[test]
    fn test_status_breakdown_keeps_unknown_status() {
        let breakdown = status_breakdown(&[row("archived", 2), row("uploaded", 1)]);
        assert_eq!(breakdown.len(), 4);
        assert_eq!(breakdown.values().sum::<i64>(), 3);
    }
}
