//! Integration tests for configuration and the runner built from it

mod common;

use agentbus::cli::init::write_default;
use agentbus::cli::run::write_outputs;
use agentbus::models::{Backend, CrewConfig, RunOverrides};
use agentbus::orchestrator::{CapabilityKind, LlmProvider, PipelineRunner};
use agentbus::MessageBus;
use common::{ScriptedGenerator, ROLE_PLAN_JSON};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

#[test]
fn test_partial_config_fills_defaults() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("agentbus.toml"),
        r#"
log_level = "info"

[pipeline]
with_design_stages = false

[llm]
provider = "gemini"
model = "gemini-2.5-pro"

[prompts]
engineer = "Return one HTML file."
"#,
    )
    .unwrap();

    let config = CrewConfig::load(dir.path()).unwrap();
    assert_eq!(config.log_level, "info");
    assert!(!config.pipeline.with_design_stages);
    assert!(!config.pipeline.with_shared_context);
    assert_eq!(config.llm.provider, LlmProvider::Gemini);
    assert_eq!(config.llm.command(), "gemini");
    assert_eq!(config.llm.backend, Backend::Cli);
    assert_eq!(config.llm.http.api_key_env, "OPENAI_API_KEY");
    assert_eq!(config.prompt_override("engineer"), Some("Return one HTML file."));
}

#[test]
fn test_invalid_config_reports_path() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("agentbus.toml"), "[pipeline\n").unwrap();

    let err = CrewConfig::load(dir.path()).unwrap_err();
    assert!(err.to_string().contains("agentbus.toml"));
}

#[test]
fn test_init_writes_loadable_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_default(dir.path(), false).unwrap().unwrap();
    assert!(path.exists());
    assert_eq!(CrewConfig::load(dir.path()).unwrap(), CrewConfig::default());
}

#[tokio::test]
async fn test_runner_from_config_uses_prompts_and_options() {
    let mut config = CrewConfig::default();
    config.pipeline.with_design_stages = false;
    config
        .prompts
        .insert(CapabilityKind::Engineer.id().to_string(), "Only HTML.".to_string());

    let generator = Arc::new(ScriptedGenerator::new([ROLE_PLAN_JSON, "<html></html>"]));
    let mut runner = PipelineRunner::from_config(MessageBus::new(), generator.clone(), &config);
    assert_eq!(runner.pipeline().stages().len(), 2);

    runner.run_with("X", RunOverrides::default()).await.unwrap();
    let requests = generator.requests();
    assert_eq!(requests[1].system_prompt, "Only HTML.");
    assert!(requests[0].system_prompt.contains("TeamLeader"));

    let dir = TempDir::new().unwrap();
    let (html_path, messages_path) =
        write_outputs(dir.path(), "<html></html>", runner.bus()).unwrap();
    assert_eq!(fs::read_to_string(html_path).unwrap(), "<html></html>");
    assert!(fs::read_to_string(messages_path).unwrap().contains("\"TeamLeader\""));
}
