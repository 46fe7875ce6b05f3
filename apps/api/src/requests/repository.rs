use chrono::NaiveDate;
use sqlx::PgPool;
use tracing::info;

use crate::matching::scoring::CandidateScore;
use crate::models::project_request::{MatchRow, ProjectRequestRow, RequestSkillRow, RequestStatus};

/// Parameters for inserting a newly uploaded project request.
pub struct NewProjectRequest<'a> {
    pub customer_name: &'a str,
    pub title: &'a str,
    pub description: &'a str,
    pub deadline: Option<NaiveDate>,
    /// (canonical skill name, is_required)
    pub skills: &'a [(String, bool)],
}

/// Inserts the request and its skills in one transaction. Returns the new id.
pub async fn insert_request(pool: &PgPool, new: NewProjectRequest<'_>) -> Result<i64, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO project_requests (customer_name, title, description, deadline, status)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(new.customer_name)
    .bind(new.title)
    .bind(new.description)
    .bind(new.deadline)
    .bind(RequestStatus::Uploaded.as_str())
    .fetch_one(&mut *tx)
    .await?;

    for (skill_name, is_required) in new.skills {
        sqlx::query(
            r#"
            INSERT INTO project_request_skills (project_request_id, skill_name, is_required)
            VALUES ($1, $2, $3)
            ON CONFLICT (project_request_id, skill_name) DO NOTHING
            "#,
        )
        .bind(id)
        .bind(skill_name)
        .bind(is_required)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    info!(
        "Inserted project request {id} for '{}' with {} skills",
        new.customer_name,
        new.skills.len()
    );
    Ok(id)
}

pub async fn set_s3_key(pool: &PgPool, id: i64, s3_key: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE project_requests SET s3_key = $1 WHERE id = $2")
        .bind(s3_key)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn set_status(pool: &PgPool, id: i64, status: RequestStatus) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE project_requests SET status = $1 WHERE id = $2")
        .bind(status.as_str())
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn get_request(pool: &PgPool, id: i64) -> Result<Option<ProjectRequestRow>, sqlx::Error> {
    sqlx::query_as::<_, ProjectRequestRow>("SELECT * FROM project_requests WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list_requests(pool: &PgPool) -> Result<Vec<ProjectRequestRow>, sqlx::Error> {
    sqlx::query_as::<_, ProjectRequestRow>(
        "SELECT * FROM project_requests ORDER BY created_at DESC, id DESC",
    )
    .fetch_all(pool)
    .await
}

pub async fn get_request_skills(
    pool: &PgPool,
    id: i64,
) -> Result<Vec<RequestSkillRow>, sqlx::Error> {
    sqlx::query_as::<_, RequestSkillRow>(
        r#"
        SELECT * FROM project_request_skills
        WHERE project_request_id = $1
        ORDER BY is_required DESC, skill_name
        "#,
    )
    .bind(id)
    .fetch_all(pool)
    .await
}

/// Replaces all stored matches for the request and marks it matched.
pub async fn replace_matches(
    pool: &PgPool,
    project_request_id: i64,
    ranked: &[CandidateScore],
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM project_request_matches WHERE project_request_id = $1")
        .bind(project_request_id)
        .execute(&mut *tx)
        .await?;

    for candidate in ranked {
        sqlx::query(
            r#"
            INSERT INTO project_request_matches
                (project_request_id, consultant_id, score, matched_skills, missing_skills,
                 customer_experience, industry_experience)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(project_request_id)
        .bind(candidate.consultant_id)
        .bind(candidate.score as i32)
        .bind(&candidate.matched_skills)
        .bind(&candidate.missing_skills)
        .bind(candidate.customer_experience)
        .bind(candidate.industry_experience)
        .execute(&mut *tx)
        .await?;
    }

    sqlx::query("UPDATE project_requests SET status = $1 WHERE id = $2")
        .bind(RequestStatus::Matched.as_str())
        .bind(project_request_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await
}

pub async fn get_matches(
    pool: &PgPool,
    project_request_id: i64,
) -> Result<Vec<MatchRow>, sqlx::Error> {
    sqlx::query_as::<_, MatchRow>(
        r#"
        SELECT * FROM project_request_matches
        WHERE project_request_id = $1
        ORDER BY score DESC, consultant_id
        "#,
    )
    .bind(project_request_id)
    .fetch_all(pool)
    .await
}
