//! Match Scoring — ranks consultants against one project request.
//!
//! Pure and deterministic: the matching service gathers the inputs, this module
//! only computes.
//!
//! Algorithm:
//! 1. For each requested skill:
//!    - consultant lists the catalog skill → strength 1.0
//!    - CV text mentions the skill as a whole word → strength 0.6
//!    - otherwise → 0.0 (missing)
//!    Required skills weigh 1.0, nice-to-have skills 0.5.
//! 2. skill_score = Σ(strength × weight) / Σ(weight)
//! 3. +0.15 when the consultant has worked for the customer (any synonym),
//!    +0.10 when an engagement falls in an industry detected in the request.
//! 4. score = round(min(0.75 × skill_score + bonuses, 1.0) × 100)

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::models::consultant::ConsultantProfile;
use crate::search::lexicon::contains_word;
use crate::search::SearchLexicon;

pub const DIRECT_SKILL_STRENGTH: f32 = 1.0;
pub const CV_TEXT_STRENGTH: f32 = 0.6;
const REQUIRED_WEIGHT: f32 = 1.0;
const OPTIONAL_WEIGHT: f32 = 0.5;
const SKILL_SHARE: f32 = 0.75;
const CUSTOMER_BONUS: f32 = 0.15;
const INDUSTRY_BONUS: f32 = 0.10;

/// One skill asked for by the project request, in canonical (uppercased) form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestedSkill {
    pub name: String,
    pub is_required: bool,
    /// Whether the skill exists in the catalog. Unknown skills only match via CV text.
    pub in_catalog: bool,
}

/// Everything about a project request the scorer needs.
#[derive(Debug, Clone, Default)]
pub struct RequestProfile {
    pub skills: Vec<RequestedSkill>,
    /// Lowercased customer name plus all synonyms.
    pub customer_terms: HashSet<String>,
    /// Canonical industries detected in the request text.
    pub industries: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    pub consultant_id: i64,
    pub score: u32, // 0 – 100
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub customer_experience: bool,
    pub industry_experience: bool,
}

pub fn score_consultant(
    request: &RequestProfile,
    consultant: &ConsultantProfile,
    lexicon: &SearchLexicon,
) -> CandidateScore {
    let own_skills: HashSet<&str> = consultant
        .skills
        .iter()
        .map(|s| s.skill_name.as_str())
        .collect();
    let cv_text = consultant.consultant.cv_text.to_lowercase();

    let mut matched_skills = Vec::new();
    let mut missing_skills = Vec::new();
    let mut total_weight = 0.0_f32;
    let mut total_strength = 0.0_f32;

    for skill in &request.skills {
        let weight = if skill.is_required {
            REQUIRED_WEIGHT
        } else {
            OPTIONAL_WEIGHT
        };
        total_weight += weight;

        let strength = if skill.in_catalog && own_skills.contains(skill.name.as_str()) {
            DIRECT_SKILL_STRENGTH
        } else if contains_word(&cv_text, &skill.name.to_lowercase()) {
            CV_TEXT_STRENGTH
        } else {
            0.0
        };

        total_strength += strength * weight;
        if strength > 0.0 {
            matched_skills.push(skill.name.clone());
        } else {
            missing_skills.push(skill.name.clone());
        }
    }

    let skill_score = if total_weight > 0.0 {
        total_strength / total_weight
    } else {
        0.0
    };

    let customer_experience = consultant
        .engagements
        .iter()
        .any(|e| request.customer_terms.contains(&e.customer_name.trim().to_lowercase()));

    let industry_experience = !request.industries.is_empty()
        && consultant.engagements.iter().any(|e| {
            let text = format!(
                "{} {}",
                e.industry.as_deref().unwrap_or_default(),
                e.description.as_deref().unwrap_or_default()
            );
            !lexicon
                .detect_industries(&text)
                .is_disjoint(&request.industries)
        });

    let mut combined = SKILL_SHARE * skill_score;
    if customer_experience {
        combined += CUSTOMER_BONUS;
    }
    if industry_experience {
        combined += INDUSTRY_BONUS;
    }

    CandidateScore {
        consultant_id: consultant.consultant.id,
        score: (combined.min(1.0) * 100.0).round() as u32,
        matched_skills,
        missing_skills,
        customer_experience,
        industry_experience,
    }
}

/// Scores every consultant and returns the best `limit` with a non-zero score,
/// highest first. Ties go to the lower consultant id.
pub fn rank_candidates(
    request: &RequestProfile,
    consultants: &[ConsultantProfile],
    lexicon: &SearchLexicon,
    limit: usize,
) -> Vec<CandidateScore> {
    let mut ranked: Vec<CandidateScore> = consultants
        .iter()
        .map(|c| score_consultant(request, c, lexicon))
        .filter(|s| s.score > 0)
        .collect();
    ranked.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.consultant_id.cmp(&b.consultant_id))
    });
    ranked.truncate(limit);
    ranked
}
