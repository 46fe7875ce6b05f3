use serde::{Deserialize, Serialize};

use crate::consultants::prompts::{CV_PARSE_PROMPT, CV_PARSE_ROLE};
use crate::consultants::repository::NewEngagement;
use crate::errors::AppError;
use crate::llm_client::prompts::{system_prompt, EXTRACTION_INSTRUCTION};
use crate::llm_client::{call_json, LanguageModel};
use crate::skills::catalog::normalize_skill;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedCvSkill {
    pub name: String,
    pub years_experience: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedEngagement {
    pub customer_name: String,
    pub industry: Option<String>,
    pub description: Option<String>,
}

/// Model output for a CV.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedCv {
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub skills: Vec<ParsedCvSkill>,
    #[serde(default)]
    pub engagements: Vec<ParsedEngagement>,
}

pub async fn parse_cv(cv_text: &str, llm: &dyn LanguageModel) -> Result<ParsedCv, AppError> {
    if cv_text.trim().is_empty() {
        return Err(AppError::Validation("CV text cannot be empty".to_string()));
    }

    let prompt = CV_PARSE_PROMPT
        .replace("{cv_text}", cv_text)
        .replace("{extraction_instruction}", EXTRACTION_INSTRUCTION);
    call_json(llm, &prompt, &system_prompt(CV_PARSE_ROLE))
        .await
        .map_err(|e| AppError::Llm(format!("CV parsing failed: {e}")))
}

/// Canonical skills in first-seen order, keeping the highest reported experience.
/// Negative or non-finite years are dropped.
pub fn canonical_cv_skills(parsed: &[ParsedCvSkill]) -> Vec<(String, Option<f32>)> {
    let mut skills: Vec<(String, Option<f32>)> = Vec::new();
    for skill in parsed {
        let Some(name) = normalize_skill(&skill.name) else {
            continue;
        };
        let years = skill
            .years_experience
            .filter(|y| y.is_finite() && *y >= 0.0);
        match skills.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, best)) => {
                *best = match (*best, years) {
                    (Some(a), Some(b)) => Some(a.max(b)),
                    (a, b) => a.or(b),
                }
            }
            None => skills.push((name, years)),
        }
    }
    skills
}

/// Trims engagement fields and drops entries without a customer.
pub fn canonical_engagements(parsed: &[ParsedEngagement]) -> Vec<NewEngagement> {
    parsed
        .iter()
        .filter_map(|e| {
            let customer_name = e.customer_name.trim();
            if customer_name.is_empty() {
                return None;
            }
            Some(NewEngagement {
                customer_name: customer_name.to_string(),
                industry: non_blank(e.industry.as_deref()),
                description: non_blank(e.description.as_deref()),
            })
        })
        .collect()
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
