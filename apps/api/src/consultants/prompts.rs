// CV parsing prompts.

pub const CV_PARSE_ROLE: &str = "\
You read consultant CVs for an IT consultancy and extract a structured competence profile.";

pub const CV_PARSE_PROMPT: &str = r#"Extract the consultant profile from the CV below.

CV TEXT:
{cv_text}

OUTPUT SCHEMA (return exactly this structure):
{
  "name": "full name of the consultant" | null,
  "email": "email address" | null,
  "skills": [
    {"name": "technology, method or certification", "years_experience": number | null}
  ],
  "engagements": [
    {
      "customer_name": "customer the consultant worked for",
      "industry": "industry of that customer" | null,
      "description": "one or two sentences about the assignment" | null
    }
  ]
}

Rules:
- One skill entry per technology; merge duplicates and keep the highest years_experience.
- List every customer engagement, including ones for the consultancy's own clients.
- Do not list employers as customers unless the CV describes work for them as a client.

{extraction_instruction}"#;
