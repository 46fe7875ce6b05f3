use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Lifecycle of a project request as seen by the match worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Uploaded,
    Matched,
    MatchFailed,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Uploaded => "uploaded",
            RequestStatus::Matched => "matched",
            RequestStatus::MatchFailed => "match_failed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProjectRequestRow {
    pub id: i64,
    pub customer_name: String,
    pub title: String,
    pub description: String,
    pub deadline: Option<NaiveDate>,
    pub s3_key: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RequestSkillRow {
    pub project_request_id: i64,
    pub skill_name: String,
    pub is_required: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MatchRow {
    pub project_request_id: i64,
    pub consultant_id: i64,
    pub score: i32,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub customer_experience: bool,
    pub industry_experience: bool,
    pub created_at: DateTime<Utc>,
}
