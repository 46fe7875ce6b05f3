// Project request parsing prompts.

pub const REQUEST_PARSE_ROLE: &str = "\
You read customer project requests for an IT consultancy and extract what the customer asks for.";

pub const REQUEST_PARSE_PROMPT: &str = r#"Extract the structured requirements from the project request below.

PROJECT REQUEST:
{request_text}

OUTPUT SCHEMA (return exactly this structure):
{
  "title": "short title of the assignment" | null,
  "customer_name": "name of the customer organisation" | null,
  "deadline": "YYYY-MM-DD" | null,
  "skills": [
    {"name": "technology, method or certification", "is_required": true | false}
  ]
}

Rules:
- "is_required" is true for must-have requirements ("skal", "må", "required", "must")
  and false for nice-to-have ones ("bør", "ønskelig", "preferred", "plus").
- One entry per skill. Do not list soft skills such as "communication".
- "deadline" is the answer/offer deadline, not the project start date.

{extraction_instruction}"#;
