//! Pipeline execution
//!
//! The runner owns the bus it publishes to and walks its pipeline's stage
//! list strictly in order. Every stage reads the latest message on its
//! input topic, calls its capability and publishes the finished output
//! under the capability's agent name. The first failing stage aborts the
//! run.

use super::capability::{Capability, CapabilityKind};
use super::generator::Generator;
use super::pipeline::{Pipeline, StageDescriptor, TOPIC_BRIEF, TOPIC_HTML};
use crate::bus::MessageBus;
use crate::models::{Content, CrewConfig, RunOverrides, HUMAN_SENDER};
use crate::parser::NormalizeError;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Stage failure that aborts a run
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Stage {stage} ({capability}) returned empty output")]
    EmptyCapabilityOutput {
        stage: usize,
        capability: CapabilityKind,
    },

    #[error("Stage {stage} ({capability}): {source}")]
    MalformedOutput {
        stage: usize,
        capability: CapabilityKind,
        #[source]
        source: NormalizeError,
    },

    #[error("Stage {stage} ({capability}) failed: {source}")]
    Capability {
        stage: usize,
        capability: CapabilityKind,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl PipelineError {
    /// Index of the failing stage in the pipeline
    pub fn stage(&self) -> usize {
        match self {
            PipelineError::EmptyCapabilityOutput { stage, .. }
            | PipelineError::MalformedOutput { stage, .. }
            | PipelineError::Capability { stage, .. } => *stage,
        }
    }

    pub fn capability(&self) -> CapabilityKind {
        match self {
            PipelineError::EmptyCapabilityOutput { capability, .. }
            | PipelineError::MalformedOutput { capability, .. }
            | PipelineError::Capability { capability, .. } => *capability,
        }
    }
}

pub struct PipelineRunner {
    bus: MessageBus,
    generator: Arc<dyn Generator>,
    pipeline: Pipeline,
    capabilities: HashMap<CapabilityKind, Capability>,
}

impl PipelineRunner {
    pub fn new(bus: MessageBus, generator: Arc<dyn Generator>, pipeline: Pipeline) -> Self {
        Self {
            bus,
            generator,
            pipeline,
            capabilities: HashMap::new(),
        }
    }

    /// Runner for the configured pipeline options and prompt overrides
    pub fn from_config(bus: MessageBus, generator: Arc<dyn Generator>, config: &CrewConfig) -> Self {
        let capabilities = CapabilityKind::ALL
            .into_iter()
            .map(|kind| (kind, Capability::from_config(kind, config)))
            .collect();
        Self {
            bus,
            generator,
            pipeline: Pipeline::new(config.pipeline),
            capabilities,
        }
    }

    /// Replace the capability used for its kind
    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capabilities.insert(capability.kind, capability);
        self
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn bus(&self) -> &MessageBus {
        &self.bus
    }

    /// Mutable bus access, e.g. to subscribe before a run
    pub fn bus_mut(&mut self) -> &mut MessageBus {
        &mut self.bus
    }

    pub fn into_bus(self) -> MessageBus {
        self.bus
    }

    /// Run the pipeline with its current options
    pub async fn run(&mut self, brief: &str) -> Result<String, PipelineError> {
        self.run_with(brief, RunOverrides::default()).await
    }

    /// Run with per-invocation overrides
    ///
    /// Overrides that change the options rebuild the stage list before any
    /// stage runs; the rebuilt pipeline is kept for later runs.
    #[tracing::instrument(
        name = "pipeline_run",
        skip(self, brief),
        fields(run_id = %Uuid::new_v4())
    )]
    pub async fn run_with(
        &mut self,
        brief: &str,
        overrides: RunOverrides,
    ) -> Result<String, PipelineError> {
        let options = self.pipeline.options().with_overrides(overrides);
        if options != self.pipeline.options() {
            tracing::info!(
                with_design_stages = options.with_design_stages,
                with_shared_context = options.with_shared_context,
                "Rebuilding pipeline for overridden options"
            );
            self.pipeline = self.pipeline.rebuilt_for(options);
        }

        self.bus.publish(TOPIC_BRIEF, HUMAN_SENDER, brief);

        let stages = self.pipeline.stages().to_vec();
        tracing::info!(stages = stages.len(), "Starting pipeline");
        for (index, stage) in stages.iter().enumerate() {
            self.run_stage(index, stage).await?;
        }

        let artifact = self
            .bus
            .latest(TOPIC_HTML)
            .map(|message| match &message.content {
                Content::Text(text) => text.clone(),
                record => record.render(),
            })
            .unwrap_or_default();
        if artifact.is_empty() {
            tracing::warn!("Pipeline finished without an html artifact");
        }
        Ok(artifact)
    }

    #[tracing::instrument(
        name = "stage",
        skip(self, stage),
        fields(capability = %stage.capability, input = %stage.input_topic, output = %stage.output_topic)
    )]
    async fn run_stage(&mut self, index: usize, stage: &StageDescriptor) -> Result<(), PipelineError> {
        let capability = self
            .capabilities
            .get(&stage.capability)
            .cloned()
            .unwrap_or_else(|| Capability::new(stage.capability));

        let input = self.bus.latest(&stage.input_topic);
        if input.is_none() {
            tracing::warn!(topic = %stage.input_topic, "No upstream artifact; running stage without input");
        }

        let context = if self.pipeline.options().with_shared_context {
            self.bus.chat_history()
        } else {
            Vec::new()
        };

        tracing::debug!(context_turns = context.len(), "Invoking capability");
        let raw = capability
            .process(
                self.generator.as_ref(),
                input.as_ref().map(|message| &message.content),
                &context,
                &stage.params,
            )
            .await
            .map_err(|err| PipelineError::Capability {
                stage: index,
                capability: stage.capability,
                source: err.into(),
            })?;

        if raw.trim().is_empty() {
            return Err(PipelineError::EmptyCapabilityOutput {
                stage: index,
                capability: stage.capability,
            });
        }

        let output = capability
            .finish(&raw, &stage.params)
            .map_err(|source| PipelineError::MalformedOutput {
                stage: index,
                capability: stage.capability,
                source,
            })?;

        if let Some(phase) = output.phase {
            tracing::debug!(phase = %phase, diagnostics = output.diagnostics.len(), "Normalized output");
        }

        self.bus.publish(
            &stage.output_topic,
            stage.capability.agent_name(),
            output.content,
        );
        Ok(())
    }
}
