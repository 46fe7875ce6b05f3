use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::llm_client::prompts::{system_prompt, EXTRACTION_INSTRUCTION};
use crate::llm_client::{call_json, LanguageModel};
use crate::requests::prompts::{REQUEST_PARSE_PROMPT, REQUEST_PARSE_ROLE};
use crate::skills::catalog::normalize_skill;

const MAX_TITLE_CHARS: usize = 120;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedRequestSkill {
    pub name: String,
    #[serde(default = "default_required")]
    pub is_required: bool,
}

fn default_required() -> bool {
    true
}

/// Model output for a project request document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedProjectRequest {
    pub title: Option<String>,
    pub customer_name: Option<String>,
    pub deadline: Option<NaiveDate>,
    #[serde(default)]
    pub skills: Vec<ParsedRequestSkill>,
}

pub async fn parse_project_request(
    text: &str,
    llm: &dyn LanguageModel,
) -> Result<ParsedProjectRequest, AppError> {
    if text.trim().is_empty() {
        return Err(AppError::Validation(
            "Project request text cannot be empty".to_string(),
        ));
    }

    let prompt = REQUEST_PARSE_PROMPT
        .replace("{request_text}", text)
        .replace("{extraction_instruction}", EXTRACTION_INSTRUCTION);
    call_json(llm, &prompt, &system_prompt(REQUEST_PARSE_ROLE))
        .await
        .map_err(|e| AppError::Llm(format!("Project request parsing failed: {e}")))
}

/// Canonical (uppercased) skills in first-seen order. A skill listed both as
/// required and optional counts as required.
pub fn canonical_request_skills(parsed: &[ParsedRequestSkill]) -> Vec<(String, bool)> {
    let mut skills: Vec<(String, bool)> = Vec::new();
    for skill in parsed {
        let Some(name) = normalize_skill(&skill.name) else {
            continue;
        };
        match skills.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, required)) => *required |= skill.is_required,
            None => skills.push((name, skill.is_required)),
        }
    }
    skills
}

/// Title precedence: form field, then parsed title, then the first non-blank line
/// of the document, cut to `MAX_TITLE_CHARS`.
pub fn derive_title(explicit: Option<&str>, parsed: Option<&str>, text: &str) -> String {
    let candidate = explicit
        .or(parsed.map(str::trim).filter(|t| !t.is_empty()))
        .or_else(|| text.lines().map(str::trim).find(|l| !l.is_empty()))
        .unwrap_or("Untitled request");
    candidate.chars().take(MAX_TITLE_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::tests::ScriptedModel;

    fn skill(name: &str, is_required: bool) -> ParsedRequestSkill {
        ParsedRequestSkill {
            name: name.to_string(),
            is_required,
        }
    }

    #[tokio::test]
    async fn test_parse_project_request_from_model_reply() {
        let model = ScriptedModel::replying(vec![
            r#"{
                "title": "Backend-utvikler til kjernebank",
                "customer_name": "Sparebank1",
                "deadline": "2026-11-01",
                "skills": [
                    {"name": "Kotlin", "is_required": true},
                    {"name": "Kafka", "is_required": false},
                    {"name": "PostgreSQL"}
                ]
            }"#,
        ]);
        let parsed = parse_project_request("Sparebank1 søker backend-utvikler", &model)
            .await
            .unwrap();
        assert_eq!(parsed.customer_name.as_deref(), Some("Sparebank1"));
        assert_eq!(parsed.deadline, NaiveDate::from_ymd_opt(2026, 11, 1));
        assert_eq!(parsed.skills.len(), 3);
        assert!(parsed.skills[2].is_required);

        let prompts = model.prompts.lock().unwrap();
        assert!(prompts[0].contains("Sparebank1 søker backend-utvikler"));
        assert!(!prompts[0].contains("{request_text}"));
    }

    #[tokio::test]
    async fn test_parse_empty_text_skips_model() {
        let model = ScriptedModel::replying(vec![]);
        let result = parse_project_request("   ", &model).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(model.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_parse_garbage_reply_is_llm_error() {
        let model = ScriptedModel::replying(vec!["I cannot help with that"]);
        let result = parse_project_request("Trenger Java-utvikler", &model).await;
        assert!(matches!(result, Err(AppError::Llm(_))));
    }

    #[test]
    fn test_canonical_request_skills_dedupes_and_promotes_required() {
        let skills = canonical_request_skills(&[
            skill(" kotlin", false),
            skill("Kafka", false),
            skill("KOTLIN ", true),
            skill("  ", true),
        ]);
        assert_eq!(
            skills,
            vec![("KOTLIN".to_string(), true), ("KAFKA".to_string(), false)]
        );
    }

    #[test]
    fn test_derive_title_precedence() {
        let text = "\n  Rammeavtale for utviklere\nMer tekst";
        assert_eq!(derive_title(Some("Eget navn"), Some("Parsed"), text), "Eget navn");
        assert_eq!(derive_title(None, Some("Parsed"), text), "Parsed");
        assert_eq!(derive_title(None, Some("  "), text), "Rammeavtale for utviklere");
        assert_eq!(derive_title(None, None, ""), "Untitled request");
    }

    #[test]
    fn test_derive_title_truncates() {
        let long = "x".repeat(500);
        assert_eq!(derive_title(None, None, &long).chars().count(), MAX_TITLE_CHARS);
    }
}
