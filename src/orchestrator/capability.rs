//! Pipeline capabilities
//!
//! A capability turns one stage input (plus optional chat context) into
//! raw text through a [`Generator`], then finishes that text into the
//! content published on the stage's output topic. The five kinds differ
//! only in identity, system prompt and target shape.

use super::generator::Generator;
use super::prompts;
use crate::models::{ChatTurn, Content, CrewConfig, RecordKind};
use crate::parser::{normalize, strip_outer_fence, Diagnostic, NormalizeError, Phase};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Auxiliary stage parameters, fixed at pipeline construction
pub type StageParams = BTreeMap<String, Value>;

/// Parameter key: ordered role roster handed to the role planner
pub const PARAM_AVAILABLE_ROLES: &str = "available_roles";
/// Parameter key: role → responsibility mapping
pub const PARAM_ROLE_RESPONSIBILITIES: &str = "role_responsibilities";

// =============================================================================
// Capability Kind
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityKind {
    RolePlanner,
    ProductManager,
    Architect,
    ProjectPlanner,
    Engineer,
}

impl CapabilityKind {
    pub const ALL: [CapabilityKind; 5] = [
        CapabilityKind::RolePlanner,
        CapabilityKind::ProductManager,
        CapabilityKind::Architect,
        CapabilityKind::ProjectPlanner,
        CapabilityKind::Engineer,
    ];

    /// Stable id used in config files and stage listings
    pub fn id(&self) -> &'static str {
        match self {
            CapabilityKind::RolePlanner => "role_planner",
            CapabilityKind::ProductManager => "product_manager",
            CapabilityKind::Architect => "architect",
            CapabilityKind::ProjectPlanner => "project_planner",
            CapabilityKind::Engineer => "engineer",
        }
    }

    /// Sender name recorded on the bus
    pub fn agent_name(&self) -> &'static str {
        match self {
            CapabilityKind::RolePlanner => "TeamLeader",
            CapabilityKind::ProductManager => "PM",
            CapabilityKind::Architect => "Architect",
            CapabilityKind::ProjectPlanner => "Project",
            CapabilityKind::Engineer => "Engineer",
        }
    }

    /// Record shape the output is normalized into; `None` publishes text
    pub fn target(&self) -> Option<RecordKind> {
        match self {
            CapabilityKind::RolePlanner => Some(RecordKind::RolePlan),
            CapabilityKind::ProductManager => Some(RecordKind::Requirements),
            CapabilityKind::Architect => Some(RecordKind::PageSpec),
            CapabilityKind::ProjectPlanner => Some(RecordKind::TaskPlan),
            CapabilityKind::Engineer => None,
        }
    }

    pub fn default_prompt(&self) -> &'static str {
        match self {
            CapabilityKind::RolePlanner => prompts::ROLE_PLANNER_PROMPT,
            CapabilityKind::ProductManager => prompts::PRODUCT_MANAGER_PROMPT,
            CapabilityKind::Architect => prompts::ARCHITECT_PROMPT,
            CapabilityKind::ProjectPlanner => prompts::PROJECT_PLANNER_PROMPT,
            CapabilityKind::Engineer => prompts::ENGINEER_PROMPT,
        }
    }
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for CapabilityKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        CapabilityKind::ALL
            .into_iter()
            .find(|kind| kind.id() == s)
            .with_context(|| {
                let known: Vec<_> = CapabilityKind::ALL.iter().map(|k| k.id()).collect();
                format!("Unknown capability '{}' (expected one of: {})", s, known.join(", "))
            })
    }
}

// =============================================================================
// Stage Parameters
// =============================================================================

/// Role roster carried in stage parameters, empty when absent
pub fn roster_param(params: &StageParams) -> Vec<String> {
    params
        .get(PARAM_AVAILABLE_ROLES)
        .and_then(Value::as_array)
        .map(|roles| {
            roles
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Responsibility mapping carried in stage parameters, empty when absent
pub fn responsibilities_param(params: &StageParams) -> BTreeMap<String, String> {
    params
        .get(PARAM_ROLE_RESPONSIBILITIES)
        .and_then(Value::as_object)
        .map(|duties| {
            duties
                .iter()
                .filter_map(|(role, duty)| duty.as_str().map(|d| (role.clone(), d.to_string())))
                .collect()
        })
        .unwrap_or_default()
}

// =============================================================================
// Capability
// =============================================================================

/// Finished output of one capability call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageOutput {
    pub content: Content,
    /// Normalizer phase for record outputs
    pub phase: Option<Phase>,
    pub diagnostics: Vec<Diagnostic>,
}

/// A capability kind bound to its system prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capability {
    pub kind: CapabilityKind,
    pub system_prompt: String,
}

impl Capability {
    pub fn new(kind: CapabilityKind) -> Self {
        Self {
            kind,
            system_prompt: kind.default_prompt().to_string(),
        }
    }

    pub fn with_prompt(kind: CapabilityKind, system_prompt: impl Into<String>) -> Self {
        Self {
            kind,
            system_prompt: system_prompt.into(),
        }
    }

    /// Capability using the configured prompt override, if any
    pub fn from_config(kind: CapabilityKind, config: &CrewConfig) -> Self {
        match config.prompt_override(kind.id()) {
            Some(prompt) => Self::with_prompt(kind, prompt),
            None => Self::new(kind),
        }
    }

    /// User input text for this capability
    pub fn render_input(&self, input: Option<&Content>, params: &StageParams) -> String {
        let text = input
            .map(Content::render)
            .unwrap_or_else(|| prompts::NO_INPUT.to_string());

        match self.kind {
            CapabilityKind::RolePlanner => prompts::role_planner_input(
                &text,
                &roster_param(params),
                &responsibilities_param(params),
            ),
            _ => text,
        }
    }

    /// Invoke the generator and return its raw text
    pub async fn process(
        &self,
        generator: &dyn Generator,
        input: Option<&Content>,
        context: &[ChatTurn],
        params: &StageParams,
    ) -> Result<String> {
        let user_input = self.render_input(input, params);
        generator
            .generate(&self.system_prompt, context, &user_input)
            .await
            .with_context(|| format!("Capability '{}' failed", self.kind))
    }

    /// Turn raw output into publishable content
    ///
    /// Record kinds go through the normalizer; text output loses a
    /// surrounding code fence.
    pub fn finish(&self, raw: &str, params: &StageParams) -> Result<StageOutput, NormalizeError> {
        match self.kind.target() {
            Some(kind) => {
                let normalized = normalize(raw, kind, &roster_param(params))?;
                Ok(StageOutput {
                    content: Content::Record(normalized.record),
                    phase: Some(normalized.phase),
                    diagnostics: normalized.diagnostics,
                })
            }
            None => Ok(StageOutput {
                content: Content::Text(strip_outer_fence(raw).trim().to_string()),
                phase: None,
                diagnostics: Vec::new(),
            }),
        }
    }
}
