//! Agent-agnostic CLI argument mapping
//!
//! Maps common LLM arguments to specific CLI syntax for each tool. Every
//! call is one-shot: the prompt arrives on stdin and the answer is read
//! from stdout.

use serde::{Deserialize, Serialize};

/// Common LLM CLI arguments
#[derive(Debug, Clone)]
pub enum LlmArg {
    /// Model name/ID
    Model(String),
    /// Reasoning level (Codex-specific, but abstracted)
    Reasoning(String),
    /// Print mode (non-interactive, answer on stdout)
    Print,
    /// Read the prompt from stdin
    StdinPrompt,
}

/// LLM provider type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    Gemini,
    Codex,
    Claude,
}

impl LlmProvider {
    /// Get the CLI command name
    pub fn command(&self) -> &'static str {
        match self {
            LlmProvider::Gemini => "gemini",
            LlmProvider::Codex => "codex",
            LlmProvider::Claude => "claude",
        }
    }

    /// Build CLI arguments from common LlmArgs
    pub fn build_args(&self, args: &[LlmArg]) -> Vec<String> {
        let mut cli_args = Vec::new();

        // Codex runs one-shot prompts through the `exec` subcommand
        if *self == LlmProvider::Codex {
            cli_args.push("exec".to_string());
        }

        for arg in args {
            match arg {
                LlmArg::Model(model) => match self {
                    LlmProvider::Gemini => {
                        cli_args.push("-m".to_string());
                        cli_args.push(model.clone());
                    }
                    LlmProvider::Codex | LlmProvider::Claude => {
                        cli_args.push("--model".to_string());
                        cli_args.push(model.clone());
                    }
                },
                LlmArg::Reasoning(level) => {
                    // Only Codex supports reasoning levels (via --config)
                    if *self == LlmProvider::Codex {
                        cli_args.push("--config".to_string());
                        cli_args.push(format!("reasoning={}", level));
                    }
                }
                LlmArg::Print => {
                    // Claude -p for print/non-interactive mode
                    if *self == LlmProvider::Claude {
                        cli_args.push("-p".to_string());
                    }
                }
                LlmArg::StdinPrompt => {
                    // Codex exec takes "-" to read the prompt from stdin
                    if *self == LlmProvider::Codex {
                        cli_args.push("-".to_string());
                    }
                }
            }
        }

        cli_args
    }
}
