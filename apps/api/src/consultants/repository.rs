use std::collections::HashMap;

use sqlx::PgPool;
use tracing::info;

use crate::models::consultant::{ConsultantProfile, ConsultantRow, ConsultantSkillRow, EngagementRow};

/// Parameters for inserting a consultant parsed from an uploaded CV.
pub struct NewConsultant<'a> {
    pub name: &'a str,
    pub email: Option<&'a str>,
    pub cv_text: &'a str,
    /// (canonical skill name, years of experience)
    pub skills: &'a [(String, Option<f32>)],
    pub engagements: &'a [NewEngagement],
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewEngagement {
    pub customer_name: String,
    pub industry: Option<String>,
    pub description: Option<String>,
}

/// Inserts the consultant with skills and engagements in one transaction.
pub async fn insert_consultant(pool: &PgPool, new: NewConsultant<'_>) -> Result<i64, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO consultants (name, email, cv_text) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(new.name)
    .bind(new.email)
    .bind(new.cv_text)
    .fetch_one(&mut *tx)
    .await?;

    for (skill_name, years) in new.skills {
        sqlx::query(
            r#"
            INSERT INTO consultant_skills (consultant_id, skill_name, years_experience)
            VALUES ($1, $2, $3)
            ON CONFLICT (consultant_id, skill_name) DO NOTHING
            "#,
        )
        .bind(id)
        .bind(skill_name)
        .bind(years)
        .execute(&mut *tx)
        .await?;
    }

    for engagement in new.engagements {
        sqlx::query(
            r#"
            INSERT INTO consultant_engagements (consultant_id, customer_name, industry, description)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(id)
        .bind(&engagement.customer_name)
        .bind(&engagement.industry)
        .bind(&engagement.description)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    info!(
        "Inserted consultant {id} ({}) with {} skills and {} engagements",
        new.name,
        new.skills.len(),
        new.engagements.len()
    );
    Ok(id)
}

pub async fn set_cv_s3_key(pool: &PgPool, id: i64, s3_key: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE consultants SET cv_s3_key = $1 WHERE id = $2")
        .bind(s3_key)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn list_consultants(pool: &PgPool) -> Result<Vec<ConsultantRow>, sqlx::Error> {
    sqlx::query_as::<_, ConsultantRow>("SELECT * FROM consultants ORDER BY name, id")
        .fetch_all(pool)
        .await
}

pub async fn get_profile(pool: &PgPool, id: i64) -> Result<Option<ConsultantProfile>, sqlx::Error> {
    let Some(consultant) =
        sqlx::query_as::<_, ConsultantRow>("SELECT * FROM consultants WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?
    else {
        return Ok(None);
    };

    let skills = sqlx::query_as::<_, ConsultantSkillRow>(
        "SELECT * FROM consultant_skills WHERE consultant_id = $1 ORDER BY skill_name",
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    let engagements = sqlx::query_as::<_, EngagementRow>(
        "SELECT * FROM consultant_engagements WHERE consultant_id = $1 ORDER BY id",
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    Ok(Some(ConsultantProfile {
        consultant,
        skills,
        engagements,
    }))
}

/// Loads every consultant with skills and engagements. Three queries, grouped in memory.
pub async fn load_profiles(pool: &PgPool) -> Result<Vec<ConsultantProfile>, sqlx::Error> {
    let consultants = list_consultants(pool).await?;
    let skills = sqlx::query_as::<_, ConsultantSkillRow>(
        "SELECT * FROM consultant_skills ORDER BY consultant_id, skill_name",
    )
    .fetch_all(pool)
    .await?;
    let engagements = sqlx::query_as::<_, EngagementRow>(
        "SELECT * FROM consultant_engagements ORDER BY consultant_id, id",
    )
    .fetch_all(pool)
    .await?;

    Ok(group_profiles(consultants, skills, engagements))
}

fn group_profiles(
    consultants: Vec<ConsultantRow>,
    skills: Vec<ConsultantSkillRow>,
    engagements: Vec<EngagementRow>,
) -> Vec<ConsultantProfile> {
    let mut skills_by_id: HashMap<i64, Vec<ConsultantSkillRow>> = HashMap::new();
    for skill in skills {
        skills_by_id.entry(skill.consultant_id).or_default().push(skill);
    }
    let mut engagements_by_id: HashMap<i64, Vec<EngagementRow>> = HashMap::new();
    for engagement in engagements {
        engagements_by_id
            .entry(engagement.consultant_id)
            .or_default()
            .push(engagement);
    }

    consultants
        .into_iter()
        .map(|consultant| ConsultantProfile {
            skills: skills_by_id.remove(&consultant.id).unwrap_or_default(),
            engagements: engagements_by_id.remove(&consultant.id).unwrap_or_default(),
            consultant,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn consultant(id: i64) -> ConsultantRow {
        ConsultantRow {
            id,
            name: format!("Consultant {id}"),
            email: None,
            cv_text: String::new(),
            cv_s3_key: None,
            created_at: Utc::now(),
        }
    }

    fn skill(consultant_id: i64, name: &str) -> ConsultantSkillRow {
        ConsultantSkillRow {
            consultant_id,
            skill_name: name.to_string(),
            years_experience: None,
        }
    }

    #[test]
    fn test_group_profiles_assigns_children() {
        let profiles = group_profiles(
            vec![consultant(1), consultant(2)],
            vec![skill(1, "RUST"), skill(2, "JAVA"), skill(1, "GO")],
            vec![EngagementRow {
                id: 10,
                consultant_id: 2,
                customer_name: "NAV".to_string(),
                industry: Some("public sector".to_string()),
                description: None,
            }],
        );
        assert_eq!(profiles.len(), 2);
        let names: Vec<&str> = profiles[0].skills.iter().map(|s| s.skill_name.as_str()).collect();
        assert_eq!(names, vec!["RUST", "GO"]);
        assert!(profiles[0].engagements.is_empty());
        assert_eq!(profiles[1].engagements[0].customer_name, "NAV");
    }

    #[test]
    fn test_group_profiles_ignores_orphans() {
        let profiles = group_profiles(vec![consultant(1)], vec![skill(9, "RUST")], vec![]);
        assert!(profiles[0].skills.is_empty());
    }
}
