//! # Pipeline Shape
//!
//! Stage lists are data: [`build_stages`] is a pure function of
//! [`PipelineOptions`], and the runner only walks the list it is given.

use super::capability::{
    roster_param, CapabilityKind, StageParams, PARAM_AVAILABLE_ROLES, PARAM_ROLE_RESPONSIBILITIES,
};
use crate::models::PipelineOptions;
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;

pub const TOPIC_BRIEF: &str = "brief";
pub const TOPIC_TASKS: &str = "tasks";
pub const TOPIC_PRD: &str = "prd";
pub const TOPIC_PAGE_SPEC: &str = "page_spec";
pub const TOPIC_PLAN: &str = "plan";
pub const TOPIC_HTML: &str = "html";

/// One pipeline step: read `input_topic`, run `capability`, publish to `output_topic`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageDescriptor {
    pub input_topic: String,
    pub output_topic: String,
    pub capability: CapabilityKind,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub params: StageParams,
}

impl StageDescriptor {
    pub fn new(input_topic: &str, output_topic: &str, capability: CapabilityKind) -> Self {
        Self {
            input_topic: input_topic.to_string(),
            output_topic: output_topic.to_string(),
            capability,
            params: StageParams::new(),
        }
    }

    pub fn with_param(mut self, key: &str, value: serde_json::Value) -> Self {
        self.params.insert(key.to_string(), value);
        self
    }
}

/// Roster and responsibilities briefed to the role planner
pub fn team_roster(options: PipelineOptions) -> (Vec<String>, BTreeMap<String, String>) {
    let mut roles = vec!["TeamLeader".to_string()];
    let mut duties = BTreeMap::new();
    duties.insert(
        "TeamLeader".to_string(),
        "Split the client brief into tasks and assign them to the team".to_string(),
    );

    if options.with_design_stages {
        roles.push("PM".to_string());
        duties.insert(
            "PM".to_string(),
            "Turn the brief into a structured PRD: goals, target users, page sections".to_string(),
        );
        roles.push("Architect".to_string());
        duties.insert(
            "Architect".to_string(),
            "Design the page layout, palette and components from the PRD".to_string(),
        );
    }

    roles.push("Engineer".to_string());
    let source = if options.with_design_stages {
        "the architect's page specification"
    } else {
        "the client brief directly"
    };
    let mut engineer_duty = format!("Build the complete HTML/CSS page from {}", source);
    if options.with_shared_context {
        engineer_duty.push_str(", with the whole team conversation as context");
    }
    duties.insert("Engineer".to_string(), engineer_duty);

    (roles, duties)
}

/// Ordered stage list for `options`
///
/// Always: role planner (`brief` → `tasks`) first and the engineer
/// (→ `html`) last. Design stages insert `brief` → `prd` → `page_spec`
/// and move the engineer's input to `page_spec`.
pub fn build_stages(options: PipelineOptions) -> Vec<StageDescriptor> {
    let (roles, duties) = team_roster(options);
    let mut stages = vec![
        StageDescriptor::new(TOPIC_BRIEF, TOPIC_TASKS, CapabilityKind::RolePlanner)
            .with_param(PARAM_AVAILABLE_ROLES, json!(roles))
            .with_param(PARAM_ROLE_RESPONSIBILITIES, json!(duties)),
    ];

    let build_input = if options.with_design_stages {
        stages.push(StageDescriptor::new(
            TOPIC_BRIEF,
            TOPIC_PRD,
            CapabilityKind::ProductManager,
        ));
        stages.push(StageDescriptor::new(
            TOPIC_PRD,
            TOPIC_PAGE_SPEC,
            CapabilityKind::Architect,
        ));
        TOPIC_PAGE_SPEC
    } else {
        TOPIC_BRIEF
    };

    stages.push(StageDescriptor::new(build_input, TOPIC_HTML, CapabilityKind::Engineer));
    stages
}

/// Where a pipeline's stage list came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageSource {
    /// Produced by [`build_stages`]; rebuilt when options change
    Generated,
    /// Supplied by the caller; kept as-is
    Custom,
}

/// A stage list together with the options it was built for
#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline {
    options: PipelineOptions,
    stages: Vec<StageDescriptor>,
    source: StageSource,
}

impl Pipeline {
    pub fn new(options: PipelineOptions) -> Self {
        Self {
            options,
            stages: build_stages(options),
            source: StageSource::Generated,
        }
    }

    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// Pipeline over an explicit stage list (e.g. one with a project planner)
    pub fn from_stages(options: PipelineOptions, stages: Vec<StageDescriptor>) -> Self {
        Self {
            options,
            stages,
            source: StageSource::Custom,
        }
    }

    pub fn options(&self) -> PipelineOptions {
        self.options
    }

    pub fn stages(&self) -> &[StageDescriptor] {
        &self.stages
    }

    pub fn source(&self) -> StageSource {
        self.source
    }

    /// Roster of the first stage that carries one
    pub fn roster(&self) -> Vec<String> {
        self.stages
            .iter()
            .map(|stage| roster_param(&stage.params))
            .find(|roster| !roster.is_empty())
            .unwrap_or_default()
    }

    /// Pipeline for `options`, reusing this one when nothing changes its shape
    ///
    /// Generated stage lists are rebuilt whenever the options differ. A
    /// custom list keeps its stages and only takes the new options.
    pub fn rebuilt_for(&self, options: PipelineOptions) -> Self {
        if options == self.options {
            return self.clone();
        }
        match self.source {
            StageSource::Generated => Self::new(options),
            StageSource::Custom => {
                if options.with_design_stages != self.options.with_design_stages {
                    tracing::warn!(
                        with_design_stages = options.with_design_stages,
                        "Custom stage list ignores the design-stage override"
                    );
                }
                Self {
                    options,
                    stages: self.stages.clone(),
                    source: StageSource::Custom,
                }
            }
        }
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(PipelineOptions::default())
    }
}

/// Fluent construction of a generated pipeline
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineBuilder {
    options: PipelineOptions,
}

impl PipelineBuilder {
    pub fn options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_design_stages(mut self, enabled: bool) -> Self {
        self.options.with_design_stages = enabled;
        self
    }

    pub fn with_shared_context(mut self, enabled: bool) -> Self {
        self.options.with_shared_context = enabled;
        self
    }

    pub fn build(self) -> Pipeline {
        Pipeline::new(self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topics(stages: &[StageDescriptor]) -> Vec<(&str, &str)> {
        stages
            .iter()
            .map(|s| (s.input_topic.as_str(), s.output_topic.as_str()))
            .collect()
    }

    #[test]
    fn test_without_design_stages() {
        let stages = build_stages(PipelineOptions::new(false, false));
        assert_eq!(stages.len(), 2);
        assert_eq!(topics(&stages), vec![("brief", "tasks"), ("brief", "html")]);
        assert_eq!(stages[1].capability, CapabilityKind::Engineer);
    }

    #[test]
    fn test_with_design_stages() {
        let stages = build_stages(PipelineOptions::new(true, false));
        assert_eq!(stages.len(), 4);
        assert_eq!(
            topics(&stages),
            vec![
                ("brief", "tasks"),
                ("brief", "prd"),
                ("prd", "page_spec"),
                ("page_spec", "html")
            ]
        );
        let kinds: Vec<_> = stages.iter().map(|s| s.capability).collect();
        assert_eq!(
            kinds,
            vec![
                CapabilityKind::RolePlanner,
                CapabilityKind::ProductManager,
                CapabilityKind::Architect,
                CapabilityKind::Engineer
            ]
        );
    }

    #[test]
    fn test_roster_follows_design_flag() {
        let lean = Pipeline::builder().with_design_stages(false).build();
        assert_eq!(lean.roster(), vec!["TeamLeader", "Engineer"]);

        let full = Pipeline::builder().with_design_stages(true).build();
        assert_eq!(full.roster(), vec!["TeamLeader", "PM", "Architect", "Engineer"]);
    }

    #[test]
    fn test_shared_context_changes_responsibilities_only() {
        let (roles_a, duties_a) = team_roster(PipelineOptions::new(false, false));
        let (roles_b, duties_b) = team_roster(PipelineOptions::new(false, true));
        assert_eq!(roles_a, roles_b);
        assert_ne!(duties_a["Engineer"], duties_b["Engineer"]);
        assert_eq!(duties_a["TeamLeader"], duties_b["TeamLeader"]);
    }

    #[test]
    fn test_build_is_deterministic() {
        let options = PipelineOptions::new(true, true);
        assert_eq!(build_stages(options), build_stages(options));
    }

    #[test]
    fn test_rebuilt_for_changed_design_flag() {
        let pipeline = Pipeline::new(PipelineOptions::new(true, false));
        let rebuilt = pipeline.rebuilt_for(PipelineOptions::new(false, false));
        assert_eq!(rebuilt.stages().len(), 2);
        assert_eq!(rebuilt.stages()[1].input_topic, TOPIC_BRIEF);
    }

    #[test]
    fn test_custom_stages_survive_rebuild() {
        let stages = vec![
            StageDescriptor::new(TOPIC_BRIEF, TOPIC_PRD, CapabilityKind::ProductManager),
            StageDescriptor::new(TOPIC_PRD, TOPIC_PLAN, CapabilityKind::ProjectPlanner),
        ];
        let pipeline = Pipeline::from_stages(PipelineOptions::default(), stages.clone());
        assert!(pipeline.roster().is_empty());

        let rebuilt = pipeline.rebuilt_for(PipelineOptions::new(false, true));
        assert_eq!(rebuilt.stages(), stages.as_slice());
        assert!(rebuilt.options().with_shared_context);
    }
}
