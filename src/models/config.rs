use crate::orchestrator::cli_mapper::LlmProvider;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default config file name, looked up in the working directory
pub const CONFIG_FILE: &str = "agentbus.toml";

// =============================================================================
// Pipeline Options
// =============================================================================

/// The two toggles that shape a pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineOptions {
    /// Run the requirements and architecture stages before the build stage
    #[serde(default = "default_true")]
    pub with_design_stages: bool,
    /// Hand every stage the full chronological chat history
    #[serde(default)]
    pub with_shared_context: bool,
}

fn default_true() -> bool {
    true
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            with_design_stages: true,
            with_shared_context: false,
        }
    }
}

impl PipelineOptions {
    pub fn new(with_design_stages: bool, with_shared_context: bool) -> Self {
        Self {
            with_design_stages,
            with_shared_context,
        }
    }

    /// Apply per-invocation overrides on top of these options
    pub fn with_overrides(self, overrides: RunOverrides) -> Self {
        Self {
            with_design_stages: overrides
                .with_design_stages
                .unwrap_or(self.with_design_stages),
            with_shared_context: overrides
                .with_shared_context
                .unwrap_or(self.with_shared_context),
        }
    }
}

/// Per-invocation overrides; `None` keeps the configured value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOverrides {
    pub with_design_stages: Option<bool>,
    pub with_shared_context: Option<bool>,
}

// =============================================================================
// LLM Backend
// =============================================================================

/// Which generator implementation answers capability calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Pipe prompts into an installed LLM CLI
    #[default]
    Cli,
    /// Call an OpenAI-compatible HTTP endpoint (feature `api-direct`)
    Http,
}

/// OpenAI-compatible endpoint settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_http_model")]
    pub model: String,
    /// Environment variable holding the bearer key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_http_model() -> String {
    "gpt-4.1".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_timeout_secs() -> u64 {
    300
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_http_model(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// LLM configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub backend: Backend,
    /// CLI provider used by the `cli` backend
    #[serde(default = "default_provider")]
    pub provider: LlmProvider,
    /// Override for the CLI executable (defaults to the provider's command)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default = "default_cli_model")]
    pub model: String,
    /// Reasoning level, honoured by providers that support it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    #[serde(default = "default_true")]
    pub show_progress: bool,
    #[serde(default)]
    pub http: HttpConfig,
}

fn default_provider() -> LlmProvider {
    LlmProvider::Claude
}

fn default_cli_model() -> String {
    "sonnet".to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            provider: default_provider(),
            command: None,
            model: default_cli_model(),
            reasoning: None,
            show_progress: true,
            http: HttpConfig::default(),
        }
    }
}

impl LlmConfig {
    /// Executable to spawn for the `cli` backend
    pub fn command(&self) -> &str {
        self.command
            .as_deref()
            .unwrap_or_else(|| self.provider.command())
    }
}

// =============================================================================
// Crew Configuration
// =============================================================================

/// Agentbus configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewConfig {
    #[serde(default)]
    pub pipeline: PipelineOptions,

    #[serde(default)]
    pub llm: LlmConfig,

    /// System prompt overrides keyed by capability id
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub prompts: BTreeMap<String, String>,

    /// Log filter used when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for CrewConfig {
    fn default() -> Self {
        Self {
            pipeline: PipelineOptions::default(),
            llm: LlmConfig::default(),
            prompts: BTreeMap::new(),
            log_level: default_log_level(),
        }
    }
}

impl CrewConfig {
    /// Path of the config file inside `project_root`
    pub fn path_in(project_root: &Path) -> PathBuf {
        project_root.join(CONFIG_FILE)
    }

    /// Load `agentbus.toml` from `project_root`, or defaults if absent
    pub fn load(project_root: &Path) -> anyhow::Result<Self> {
        Self::load_file(&Self::path_in(project_root))
    }

    /// Load an explicit config file; a missing file yields defaults
    pub fn load_file(config_path: &Path) -> anyhow::Result<Self> {
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        let config: CrewConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;
        Ok(config)
    }

    /// Save config to `agentbus.toml` in `project_root`
    pub fn save(&self, project_root: &Path) -> anyhow::Result<PathBuf> {
        let config_path = Self::path_in(project_root);
        std::fs::create_dir_all(project_root)?;

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
        Ok(config_path)
    }

    /// Prompt override for a capability id, if one is configured
    pub fn prompt_override(&self, capability_id: &str) -> Option<&str> {
        self.prompts.get(capability_id).map(String::as_str)
    }
}
