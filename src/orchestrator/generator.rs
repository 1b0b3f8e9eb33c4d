//! Language-model boundary
//!
//! A [`Generator`] answers one request: a system prompt, the prior
//! exchanges and the stage input. It knows nothing about stages, topics
//! or record shapes.

use super::cli_mapper::LlmArg;
use super::script_runner::ScriptRunner;
use crate::models::{ChatTurn, LlmConfig};
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(
        &self,
        system_prompt: &str,
        history: &[ChatTurn],
        user_input: &str,
    ) -> Result<String>;
}

/// Flatten a request into one prompt for tools that take a single text input
pub fn compose_prompt(system_prompt: &str, history: &[ChatTurn], user_input: &str) -> String {
    let mut prompt = String::new();
    prompt.push_str("## System\n");
    prompt.push_str(system_prompt.trim());
    prompt.push_str("\n\n");

    if !history.is_empty() {
        prompt.push_str("## Conversation So Far\n");
        for turn in history {
            prompt.push_str(&format!("### {}\n{}\n\n", turn.role, turn.text.trim_end()));
        }
    }

    prompt.push_str("## Input\n");
    prompt.push_str(user_input.trim_end());
    prompt.push('\n');
    prompt
}

/// Generator backed by an installed LLM CLI (claude, gemini, codex)
pub struct CliGenerator {
    config: LlmConfig,
    runner: ScriptRunner,
}

impl CliGenerator {
    pub fn new(config: LlmConfig) -> Self {
        let runner = ScriptRunner::new(config.show_progress);
        Self { config, runner }
    }

    fn build_args(&self) -> Vec<String> {
        let mut args = vec![LlmArg::Print, LlmArg::Model(self.config.model.clone())];
        if let Some(level) = &self.config.reasoning {
            args.push(LlmArg::Reasoning(level.clone()));
        }
        args.push(LlmArg::StdinPrompt);
        self.config.provider.build_args(&args)
    }
}

#[async_trait]
impl Generator for CliGenerator {
    async fn generate(
        &self,
        system_prompt: &str,
        history: &[ChatTurn],
        user_input: &str,
    ) -> Result<String> {
        let prompt = compose_prompt(system_prompt, history, user_input);
        let args = self.build_args();
        tracing::debug!(
            command = %self.config.command(),
            args = ?args,
            prompt_chars = prompt.chars().count(),
            "Invoking LLM CLI"
        );
        self.runner.run(self.config.command(), &args, &prompt).await
    }
}
