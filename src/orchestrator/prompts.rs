/// Prompt templates for pipeline capabilities
///
/// System prompts ask for JSON matching each record shape. The normalizer
/// does not rely on compliance; it falls back to section parsing.
use std::collections::BTreeMap;

/// Marker handed to a capability whose input topic has no message
pub const NO_INPUT: &str = "[no upstream artifact]";

/// Placeholder for a role listed without a responsibility
pub const MISSING_RESPONSIBILITY: &str = "Responsibility not provided; infer it from the role name";

pub const ROLE_PLANNER_PROMPT: &str = r#"You are the TeamLeader coordinating a multi-agent web delivery team.

Responsibilities:
1. Read the client brief and identify the deliverables.
2. List a clear task list and state what every role on the current team must do.
3. If a role has no work, say so explicitly (for example "Engineer: no task, draft only").

Output strictly in JSON (no Markdown, code fences or extra text):
{
  "available_roles": ["TeamLeader", "Engineer"],
  "tasks": [
    {"role": "TeamLeader", "tasks": ["clarify requirements", "split deliverables"]},
    {"role": "Engineer", "tasks": ["render the HTML page from the specification"]}
  ]
}

- available_roles: the roles on the current team, as listed in the input.
- tasks: one entry per role; each role must come from available_roles.
"#;

pub const PRODUCT_MANAGER_PROMPT: &str = r#"You are a Product Manager agent.
Convert the brief into a structured PRD and stick to the JSON schema.
No prose, only JSON.

{
  "product": "string",
  "goals": ["string"],
  "target_users": ["string"],
  "page_sections": [
    { "id": "string", "purpose": "string", "success_metric": "string (optional)" }
  ]
}
"#;

pub const ARCHITECT_PROMPT: &str = r#"You are a Web Architect agent designing the page structure.
Use the PRD to design the page. Return JSON only, matching the schema:
{
  "layout": "string",
  "colors": ["string"],
  "components": [
    {
      "id": "string",
      "html": "root tag, e.g. section",
      "children": [
        { "tag": "string", "content_hint": "string" }
      ]
    }
  ]
}
"#;

pub const PROJECT_PLANNER_PROMPT: &str = r#"You are the Project role in a multi-agent web delivery team.

Mission:
- Break the PRD and the architect's design down into execution-ready tasks.
- Order tasks so prerequisites come first.

Output strictly in JSON (no Markdown, code fences or extra text):
{
  "summary": "One sentence on how the PRD will be implemented",
  "tasks": [
    {
      "id": "kebab-or-snake-id",
      "description": "Concrete, testable task",
      "depends_on": ["task-id-a"],
      "deliverable": "What must be produced"
    }
  ]
}

Rules:
- Every id in depends_on must be the id of another task in the list.
- Do not invent features beyond the PRD and the design.
"#;

pub const ENGINEER_PROMPT: &str = r#"You are a Frontend Engineer.
Generate a COMPLETE HTML5 + CSS page based on the input.
Output ONLY raw HTML code, without backticks.
"#;

/// Team roster line for each role, in roster order
pub fn roster_lines(roles: &[String], responsibilities: &BTreeMap<String, String>) -> String {
    roles
        .iter()
        .map(|role| {
            let duty = responsibilities
                .get(role)
                .map(String::as_str)
                .unwrap_or(MISSING_RESPONSIBILITY);
            format!("- {}: {}", role, duty)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// User prompt for the role planner: the brief plus the team it may use
pub fn role_planner_input(
    brief: &str,
    roles: &[String],
    responsibilities: &BTreeMap<String, String>,
) -> String {
    format!(
        r#"## Client Brief
{brief}

## Current Team (use only these roles)
{roster}

## Instructions
Return the JSON task list described in the system prompt.
"#,
        brief = brief.trim(),
        roster = roster_lines(roles, responsibilities)
    )
}
