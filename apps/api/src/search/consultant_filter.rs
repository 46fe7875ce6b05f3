//! In-memory consultant search over loaded profiles.
//!
//! Criteria are ANDed. Customer criteria are expanded through the lexicon, so a
//! search for "sparebank1" also finds engagements recorded as "SB1".

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::models::consultant::{ConsultantProfile, EngagementRow};
use crate::search::SearchLexicon;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConsultantQuery {
    pub customer: Option<String>,
    pub industry: Option<String>,
    pub skill: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ConsultantHit {
    pub id: i64,
    pub name: String,
    pub skills: Vec<String>,
    pub matched_customers: Vec<String>,
    pub matched_industries: Vec<String>,
}

/// Resolved form of a `ConsultantQuery`.
#[derive(Debug, Default)]
pub struct ResolvedQuery {
    /// Lowercased customer name plus synonyms.
    pub customer_terms: Option<HashSet<String>>,
    pub industry: Option<IndustryCriterion>,
    /// Canonical skill. Must already be validated against the catalog.
    pub skill: Option<String>,
}

#[derive(Debug)]
pub enum IndustryCriterion {
    /// Canonical industries detected in the query.
    Canonical(BTreeSet<String>),
    /// Unconfigured industry, compared case-insensitively with the engagement's industry.
    Literal(String),
}

pub fn resolve_query(
    customer: Option<&str>,
    industry: Option<&str>,
    skill: Option<String>,
    lexicon: &SearchLexicon,
) -> ResolvedQuery {
    let customer_terms = customer.map(|c| {
        lexicon
            .expand_customer_term(c)
            .into_iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect()
    });

    let industry = industry.map(|i| {
        let detected = lexicon.detect_industries(i);
        if detected.is_empty() {
            IndustryCriterion::Literal(i.trim().to_lowercase())
        } else {
            IndustryCriterion::Canonical(detected)
        }
    });

    ResolvedQuery {
        customer_terms,
        industry,
        skill,
    }
}

pub fn filter_profiles(
    profiles: &[ConsultantProfile],
    query: &ResolvedQuery,
    lexicon: &SearchLexicon,
) -> Vec<ConsultantHit> {
    profiles
        .iter()
        .filter_map(|profile| match_profile(profile, query, lexicon))
        .collect()
}

fn match_profile(
    profile: &ConsultantProfile,
    query: &ResolvedQuery,
    lexicon: &SearchLexicon,
) -> Option<ConsultantHit> {
    if let Some(skill) = &query.skill {
        if !profile.skills.iter().any(|s| &s.skill_name == skill) {
            return None;
        }
    }

    let matched_customers: Vec<String> = match &query.customer_terms {
        Some(terms) => {
            let hits: Vec<String> = profile
                .engagements
                .iter()
                .filter(|e| terms.contains(&e.customer_name.trim().to_lowercase()))
                .map(|e| e.customer_name.clone())
                .collect();
            if hits.is_empty() {
                return None;
            }
            hits
        }
        None => vec![],
    };

    let matched_industries: Vec<String> = match &query.industry {
        Some(criterion) => {
            let hits = engagement_industries(&profile.engagements, criterion, lexicon);
            if hits.is_empty() {
                return None;
            }
            hits.into_iter().collect()
        }
        None => vec![],
    };

    Some(ConsultantHit {
        id: profile.consultant.id,
        name: profile.consultant.name.clone(),
        skills: profile.skills.iter().map(|s| s.skill_name.clone()).collect(),
        matched_customers,
        matched_industries,
    })
}

fn engagement_industries(
    engagements: &[EngagementRow],
    criterion: &IndustryCriterion,
    lexicon: &SearchLexicon,
) -> BTreeSet<String> {
    let mut hits = BTreeSet::new();
    for engagement in engagements {
        match criterion {
            IndustryCriterion::Canonical(wanted) => {
                let text = format!(
                    "{} {}",
                    engagement.industry.as_deref().unwrap_or_default(),
                    engagement.description.as_deref().unwrap_or_default()
                );
                hits.extend(
                    lexicon
                        .detect_industries(&text)
                        .intersection(wanted)
                        .cloned(),
                );
            }
            IndustryCriterion::Literal(wanted) => {
                if let Some(industry) = &engagement.industry {
                    if industry.trim().to_lowercase() == *wanted {
                        hits.insert(industry.trim().to_string());
                    }
                }
            }
        }
    }
    hits
}
