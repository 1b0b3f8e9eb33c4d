// Agentbus - multi-agent pipeline orchestration
// Stages exchange artifacts over a topic log; model output is normalized into typed records

pub mod bus;
pub mod cli;
pub mod logging;
pub mod models;
pub mod orchestrator;
pub mod parser;

pub use anyhow::{Context, Result};
pub use colored::Colorize;

// Re-export commonly used types
pub use bus::MessageBus;
pub use models::{Content, CrewConfig, Message, PipelineOptions, RecordKind, StructuredRecord};
pub use orchestrator::{Generator, Pipeline, PipelineError, PipelineRunner};
pub use parser::{normalize, Normalized};
