//! Search Lexicon — synonym expansion for customer names and industry detection in free text.
//!
//! Built once from `LexiconConfig` at startup and shared read-only via `Arc`.
//! All lookups are case-insensitive. Industry detection matches on word boundaries
//! so a short synonym such as "bank" does not fire inside "Sparebank1".

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Canonical term → aliases, as read from the lexicon JSON file.
///
/// ```json
/// {
///   "customers":  { "sparebank1": ["sparebank 1", "sb1"] },
///   "industries": { "finance": ["bank", "finans"] }
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LexiconConfig {
    #[serde(default)]
    pub customers: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub industries: HashMap<String, Vec<String>>,
}

impl LexiconConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read lexicon file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Lexicon file {} is not valid JSON", path.display()))
    }
}

/// A canonical term with its configured aliases, in configuration order.
#[derive(Debug, Clone)]
struct SynonymGroup {
    canonical: String,
    aliases: Vec<String>,
}

impl SynonymGroup {
    /// Canonical name first, then aliases. Blank strings are skipped.
    fn terms(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.canonical.as_str())
            .chain(self.aliases.iter().map(String::as_str))
            .filter(|t| !t.trim().is_empty())
    }
}

pub struct SearchLexicon {
    customer_groups: Vec<SynonymGroup>,
    /// Lowercased canonical name or alias → index into `customer_groups`.
    customer_index: HashMap<String, usize>,
    industry_groups: Vec<SynonymGroup>,
    /// Lowercased (term, canonical) pairs, longest term first.
    industry_terms: Vec<(String, String)>,
}

impl SearchLexicon {
    pub fn new(config: LexiconConfig) -> Self {
        let customer_groups = into_groups(config.customers);
        let mut customer_index = HashMap::new();
        for (idx, group) in customer_groups.iter().enumerate() {
            for term in group.terms() {
                customer_index.entry(fold(term)).or_insert(idx);
            }
        }

        let industry_groups = into_groups(config.industries);
        let mut industry_terms: Vec<(String, String)> = industry_groups
            .iter()
            .flat_map(|g| g.terms().map(move |t| (fold(t), g.canonical.clone())))
            .collect();
        industry_terms.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));
        industry_terms.dedup();

        info!(
            "Search lexicon loaded: {} customer groups, {} industry groups",
            customer_groups.len(),
            industry_groups.len()
        );

        Self {
            customer_groups,
            customer_index,
            industry_groups,
            industry_terms,
        }
    }

    pub fn empty() -> Self {
        Self::new(LexiconConfig::default())
    }

    /// Returns `term` plus every known name for the same customer.
    /// A term that is itself an alias expands to its canonical name and sibling aliases.
    /// Unknown terms come back as a singleton set.
    pub fn expand_customer_term(&self, term: &str) -> HashSet<String> {
        let mut expanded = HashSet::new();
        expanded.insert(term.to_string());

        if let Some(&idx) = self.customer_index.get(&fold(term)) {
            expanded.extend(self.customer_groups[idx].terms().map(str::to_string));
        }
        expanded
    }

    /// Canonical industry names with at least one synonym present in `text`.
    pub fn detect_industries(&self, text: &str) -> BTreeSet<String> {
        let haystack = text.to_lowercase();
        self.industry_terms
            .iter()
            .filter(|(term, _)| contains_word(&haystack, term))
            .map(|(_, canonical)| canonical.clone())
            .collect()
    }

    /// Sorted canonical industry names.
    pub fn industries(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .industry_groups
            .iter()
            .map(|g| g.canonical.clone())
            .collect();
        names.sort();
        names
    }
}

fn into_groups(map: HashMap<String, Vec<String>>) -> Vec<SynonymGroup> {
    let mut groups: Vec<SynonymGroup> = map
        .into_iter()
        .filter(|(canonical, _)| !canonical.trim().is_empty())
        .map(|(canonical, aliases)| SynonymGroup { canonical, aliases })
        .collect();
    // HashMap order is random; sort so alias collisions resolve the same way every run.
    groups.sort_by(|a, b| a.canonical.cmp(&b.canonical));
    groups
}

fn fold(term: &str) -> String {
    term.trim().to_lowercase()
}

/// True when `needle` occurs in `haystack` with no alphanumeric character directly
/// before or after it. Both sides are expected to be lowercased already.
pub(crate) fn contains_word(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    haystack.match_indices(needle).any(|(start, matched)| {
        let end = start + matched.len();
        let before_ok = haystack[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let after_ok = haystack[end..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());
        before_ok && after_ok
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lexicon() -> SearchLexicon {
        let config: LexiconConfig = serde_json::from_str(
            r#"{
                "customers": {
                    "sparebank1": ["sparebank 1", "sb1"],
                    "Statens vegvesen": ["SVV", "vegvesenet"]
                },
                "industries": {
                    "finance": ["bank", "finans"],
                    "energy": ["olje og gass", "kraft", "energi"],
                    "public sector": ["offentlig", "kommune"]
                }
            }"#,
        )
        .unwrap();
        SearchLexicon::new(config)
    }

    fn set(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_expand_customer_term_exact_synonyms() {
        assert_eq!(
            lexicon().expand_customer_term("sparebank1"),
            set(&["sparebank1", "sparebank 1", "sb1"])
        );
    }

    #[test]
    fn test_expand_always_contains_input() {
        let lex = lexicon();
        for term in ["sparebank1", "Ukjent Kunde AS", "", "  sb1  "] {
            assert!(lex.expand_customer_term(term).contains(term), "missing {term:?}");
        }
    }

    #[test]
    fn test_expand_unknown_term_is_singleton() {
        assert_eq!(
            lexicon().expand_customer_term("Equinor"),
            set(&["Equinor"])
        );
    }

    #[test]
    fn test_expand_is_case_insensitive() {
        let expanded = lexicon().expand_customer_term("SpareBank1");
        assert!(expanded.contains("SpareBank1"));
        assert!(expanded.contains("sb1"));
        assert!(expanded.contains("sparebank 1"));
    }

    #[test]
    fn test_expand_from_alias_reaches_canonical() {
        assert_eq!(
            lexicon().expand_customer_term("svv"),
            set(&["svv", "Statens vegvesen", "SVV", "vegvesenet"])
        );
    }

    #[test]
    fn test_empty_lexicon_expands_to_input_only() {
        assert_eq!(SearchLexicon::empty().expand_customer_term("sb1"), set(&["sb1"]));
    }

    #[test]
    fn test_detect_industries_finds_finance() {
        let detected = lexicon().detect_industries("Prosjekt i bank og finans for Sparebank1");
        assert!(detected.contains("finance"));
        assert_eq!(detected.len(), 1);
    }

    #[test]
    fn test_detect_industries_is_case_insensitive() {
        let detected = lexicon().detect_industries("BANK-integrasjon");
        assert!(detected.contains("finance"));
    }

    #[test]
    fn test_detect_industries_ignores_partial_words() {
        // "bank" inside "Sparebank1", "kraft" inside "arbeidskraft"
        let detected = lexicon().detect_industries("Sparebank1 trenger arbeidskraft");
        assert!(detected.is_empty(), "got {detected:?}");
    }

    #[test]
    fn test_detect_industries_multi_word_synonym_and_canonical() {
        let detected =
            lexicon().detect_industries("Olje og gass, samt en kommune i Energy-sektoren");
        assert_eq!(
            detected.into_iter().collect::<Vec<_>>(),
            vec!["energy".to_string(), "public sector".to_string()]
        );
    }

    #[test]
    fn test_detect_industries_nothing_configured() {
        assert!(SearchLexicon::empty().detect_industries("bank").is_empty());
    }

    #[test]
    fn test_industries_sorted() {
        assert_eq!(
            lexicon().industries(),
            vec!["energy", "finance", "public sector"]
        );
    }

    #[test]
    fn test_contains_word_boundaries() {
        assert!(contains_word("bank", "bank"));
        assert!(contains_word("a bank.", "bank"));
        assert!(!contains_word("banking", "bank"));
        assert!(contains_word("banking og bank", "bank"));
        assert!(!contains_word("anything", ""));
    }

    #[test]
    fn test_lexicon_config_defaults_missing_maps() {
        let config: LexiconConfig = serde_json::from_str(r#"{"customers": {}}"#).unwrap();
        assert!(config.industries.is_empty());
    }
}
