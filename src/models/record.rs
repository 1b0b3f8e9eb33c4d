//! Structured records exchanged between pipeline stages
//!
//! Each record kind is produced by exactly one capability. Every field has
//! a defined empty value so a record decoded from a partial payload never
//! carries `null` where downstream stages expect a string or a list.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel task for a role the planner left without work
pub const NO_TASK: &str = "无任务或待确认";

/// Shape a capability's output is normalized into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Requirements,
    PageSpec,
    TaskPlan,
    RolePlan,
}

impl RecordKind {
    /// Top-level keys that identify a strict payload of this kind
    pub fn known_keys(&self) -> &'static [&'static str] {
        match self {
            RecordKind::Requirements => &[
                "product",
                "title",
                "goals",
                "target_users",
                "page_sections",
                "sections",
            ],
            RecordKind::PageSpec => &["layout", "colors", "palette", "components"],
            RecordKind::TaskPlan => &["summary", "tasks", "prioritized_tasks"],
            RecordKind::RolePlan => &["available_roles", "roles", "tasks", "assignments"],
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordKind::Requirements => "requirements document",
            RecordKind::PageSpec => "page specification",
            RecordKind::TaskPlan => "task plan",
            RecordKind::RolePlan => "role plan",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Requirements Document
// =============================================================================

/// One section of the page the product needs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSection {
    #[serde(deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(deserialize_with = "lenient::string")]
    pub purpose: String,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional_string"
    )]
    pub success_metric: Option<String>,
}

/// Requirements document (PRD) produced from the user's brief
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Prd {
    #[serde(alias = "title", deserialize_with = "lenient::string")]
    pub product: String,
    #[serde(deserialize_with = "lenient::string_list")]
    pub goals: Vec<String>,
    #[serde(deserialize_with = "lenient::string_list")]
    pub target_users: Vec<String>,
    #[serde(alias = "sections", deserialize_with = "lenient::list")]
    pub page_sections: Vec<PageSection>,
}

// =============================================================================
// Page Specification
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentChild {
    #[serde(deserialize_with = "lenient::string")]
    pub tag: String,
    #[serde(deserialize_with = "lenient::string")]
    pub content_hint: String,
}

/// A page component: a root element and the child elements it holds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Component {
    #[serde(deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(rename = "html", alias = "root_tag", deserialize_with = "lenient::string")]
    pub root_tag: String,
    #[serde(deserialize_with = "lenient::list")]
    pub children: Vec<ComponentChild>,
}

/// Page architecture derived from a PRD
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSpec {
    #[serde(deserialize_with = "lenient::string")]
    pub layout: String,
    #[serde(alias = "palette", deserialize_with = "lenient::string_list")]
    pub colors: Vec<String>,
    #[serde(deserialize_with = "lenient::list")]
    pub components: Vec<Component>,
}

// =============================================================================
// Task Plan
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskItem {
    #[serde(deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(deserialize_with = "lenient::string")]
    pub description: String,
    /// Ids of tasks that must finish first (set semantics, first-seen order)
    #[serde(alias = "dependsOn", deserialize_with = "lenient::string_list")]
    pub depends_on: Vec<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional_string"
    )]
    pub deliverable: Option<String>,
}

/// Ordered implementation backlog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskPlan {
    #[serde(deserialize_with = "lenient::string")]
    pub summary: String,
    #[serde(alias = "prioritized_tasks", deserialize_with = "lenient::list")]
    pub tasks: Vec<TaskItem>,
}

impl TaskPlan {
    /// `(task id, dependency id)` pairs whose dependency names no task in this plan
    pub fn dangling_dependencies(&self) -> Vec<(String, String)> {
        self.tasks
            .iter()
            .flat_map(|task| {
                task.depends_on
                    .iter()
                    .filter(|dep| !self.tasks.iter().any(|t| &t.id == *dep))
                    .map(move |dep| (task.id.clone(), dep.clone()))
            })
            .collect()
    }
}

// =============================================================================
// Role Plan
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleAssignment {
    #[serde(deserialize_with = "lenient::string")]
    pub role: String,
    #[serde(deserialize_with = "lenient::string_list")]
    pub tasks: Vec<String>,
}

/// Team roster and the work assigned to each role
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RolePlan {
    #[serde(alias = "roles", deserialize_with = "lenient::string_list")]
    pub available_roles: Vec<String>,
    #[serde(alias = "assignments", deserialize_with = "lenient::list")]
    pub tasks: Vec<RoleAssignment>,
}

impl RolePlan {
    /// Tasks assigned to `role`, if the plan mentions it
    pub fn tasks_for(&self, role: &str) -> Option<&[String]> {
        self.tasks
            .iter()
            .find(|a| a.role == role)
            .map(|a| a.tasks.as_slice())
    }
}

// =============================================================================
// Record envelope
// =============================================================================

/// Any record a stage can publish
///
/// Serializes without a tag so the audit dump shows plain mappings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StructuredRecord {
    Requirements(Prd),
    PageSpec(PageSpec),
    TaskPlan(TaskPlan),
    RolePlan(RolePlan),
}

impl StructuredRecord {
    pub fn kind(&self) -> RecordKind {
        match self {
            StructuredRecord::Requirements(_) => RecordKind::Requirements,
            StructuredRecord::PageSpec(_) => RecordKind::PageSpec,
            StructuredRecord::TaskPlan(_) => RecordKind::TaskPlan,
            StructuredRecord::RolePlan(_) => RecordKind::RolePlan,
        }
    }

    /// True when no field carries any extracted value
    pub fn is_blank(&self) -> bool {
        match self {
            StructuredRecord::Requirements(prd) => {
                prd.product.is_empty()
                    && prd.goals.is_empty()
                    && prd.target_users.is_empty()
                    && prd.page_sections.is_empty()
            }
            StructuredRecord::PageSpec(spec) => {
                spec.layout.is_empty() && spec.colors.is_empty() && spec.components.is_empty()
            }
            StructuredRecord::TaskPlan(plan) => plan.summary.is_empty() && plan.tasks.is_empty(),
            StructuredRecord::RolePlan(plan) => plan.tasks.is_empty(),
        }
    }

    pub fn as_prd(&self) -> Option<&Prd> {
        match self {
            StructuredRecord::Requirements(prd) => Some(prd),
            _ => None,
        }
    }

    pub fn as_page_spec(&self) -> Option<&PageSpec> {
        match self {
            StructuredRecord::PageSpec(spec) => Some(spec),
            _ => None,
        }
    }

    pub fn as_task_plan(&self) -> Option<&TaskPlan> {
        match self {
            StructuredRecord::TaskPlan(plan) => Some(plan),
            _ => None,
        }
    }

    pub fn as_role_plan(&self) -> Option<&RolePlan> {
        match self {
            StructuredRecord::RolePlan(plan) => Some(plan),
            _ => None,
        }
    }
}

/// Deserializers that map `null`, scalars and single strings onto the
/// empty/list shapes the records promise.
mod lenient {
    use serde::de::{DeserializeOwned, Deserializer};
    use serde::Deserialize;
    use serde_json::Value;

    fn scalar_text(value: &Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(scalar_text(&value).unwrap_or_default())
    }

    pub fn optional_string<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(scalar_text(&value).filter(|s| !s.is_empty()))
    }

    pub fn string_list<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<String>, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let items: Vec<String> = match value {
            Value::Array(items) => items.iter().filter_map(scalar_text).collect(),
            other => scalar_text(&other).into_iter().collect(),
        };
        Ok(items.into_iter().filter(|s| !s.is_empty()).collect())
    }

    /// List of objects; entries that don't decode are skipped
    pub fn list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let value = Value::deserialize(deserializer)?;
        let items = match value {
            Value::Array(items) => items,
            Value::Object(_) => vec![value],
            _ => Vec::new(),
        };
        Ok(items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect())
    }
}
