use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ConsultantRow {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    #[serde(skip_serializing)]
    pub cv_text: String,
    pub cv_s3_key: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ConsultantSkillRow {
    pub consultant_id: i64,
    /// Canonical form: trimmed and uppercased.
    pub skill_name: String,
    pub years_experience: Option<f32>,
}

/// A customer assignment listed on a consultant's CV.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EngagementRow {
    pub id: i64,
    pub consultant_id: i64,
    pub customer_name: String,
    pub industry: Option<String>,
    pub description: Option<String>,
}

/// A consultant together with the skills and engagements parsed from their CV.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsultantProfile {
    #[serde(flatten)]
    pub consultant: ConsultantRow,
    pub skills: Vec<ConsultantSkillRow>,
    pub engagements: Vec<EngagementRow>,
}
