pub mod capability;
pub mod cli_mapper;
pub mod generator;
pub mod http;
pub mod pipeline;
pub mod prompts;
pub mod runner;
pub mod script_runner;

pub use capability::{Capability, CapabilityKind, StageOutput, StageParams};
pub use cli_mapper::{LlmArg, LlmProvider};
pub use generator::{compose_prompt, CliGenerator, Generator};
#[cfg(feature = "api-direct")]
pub use http::HttpGenerator;
pub use pipeline::{build_stages, Pipeline, PipelineBuilder, StageDescriptor, StageSource};
pub use runner::{PipelineError, PipelineRunner};
pub use script_runner::ScriptRunner;
