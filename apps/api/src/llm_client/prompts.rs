// Shared prompt fragments. Each service that calls the model keeps its own
// prompts.rs next to it; only cross-cutting instructions live here.

/// System prompt that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Appended to every extraction prompt so the model does not invent skills.
pub const EXTRACTION_INSTRUCTION: &str = "\
    CRITICAL: Only extract what is explicitly stated in the document. \
    Do NOT infer skills from job titles or industries. \
    Use the most common spelling of each technology (e.g. 'Kubernetes', not 'k8s'). \
    If a field is not present, use null or an empty list.";

/// Builds a system prompt from a service-specific role line plus the JSON-only rules.
pub fn system_prompt(role: &str) -> String {
    format!("{role} {JSON_ONLY_SYSTEM}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_keeps_json_rules() {
        let prompt = system_prompt("You extract consultant profiles.");
        assert!(prompt.starts_with("You extract consultant profiles."));
        assert!(prompt.contains("valid JSON only"));
    }
}
