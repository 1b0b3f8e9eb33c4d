//! OpenAI-compatible chat completion backend
//!
//! The request mapping is always compiled; the client itself needs the
//! `api-direct` feature.

use crate::models::{ChatRole, ChatTurn};
use serde_json::{json, Value};

/// Chat messages for a completion request: system, prior turns, input
pub fn chat_messages(system_prompt: &str, history: &[ChatTurn], user_input: &str) -> Vec<Value> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(json!({"role": "system", "content": system_prompt}));
    messages.extend(history.iter().map(|turn| {
        let role = match turn.role {
            ChatRole::Human => "user",
            ChatRole::Assistant => "assistant",
        };
        json!({"role": role, "content": turn.text})
    }));
    messages.push(json!({"role": "user", "content": user_input}));
    messages
}

/// Text of the first choice in a chat completion response
pub fn completion_text(response: &Value) -> Option<String> {
    response
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(feature = "api-direct")]
pub use client::HttpGenerator;

#[cfg(feature = "api-direct")]
mod client {
    use super::{chat_messages, completion_text};
    use crate::models::{ChatTurn, HttpConfig};
    use crate::orchestrator::generator::Generator;
    use anyhow::{Context, Result};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::time::Duration;

    /// Generator calling `POST {base_url}/chat/completions`
    pub struct HttpGenerator {
        client: reqwest::Client,
        config: HttpConfig,
        api_key: String,
    }

    impl HttpGenerator {
        pub fn new(config: HttpConfig) -> Result<Self> {
            let api_key = std::env::var(&config.api_key_env)
                .with_context(|| format!("Environment variable {} is not set", config.api_key_env))?;
            let client = reqwest::Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .context("Failed to build HTTP client")?;
            Ok(Self {
                client,
                config,
                api_key,
            })
        }
    }

    #[async_trait]
    impl Generator for HttpGenerator {
        async fn generate(
            &self,
            system_prompt: &str,
            history: &[ChatTurn],
            user_input: &str,
        ) -> Result<String> {
            let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
            let body = json!({
                "model": self.config.model,
                "messages": chat_messages(system_prompt, history, user_input),
            });

            tracing::debug!(url = %url, model = %self.config.model, "Requesting chat completion");
            let response = self
                .client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await
                .with_context(|| format!("Request to {} failed", url))?;

            let status = response.status();
            let payload: Value = response
                .json()
                .await
                .context("Failed to decode completion response")?;
            if !status.is_success() {
                anyhow::bail!("Completion request failed with status {}: {}", status, payload);
            }

            completion_text(&payload).context("Completion response has no message content")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_messages_map_roles() {
        let history = vec![
            ChatTurn {
                role: ChatRole::Human,
                text: "brief".to_string(),
            },
            ChatTurn {
                role: ChatRole::Assistant,
                text: "prd".to_string(),
            },
        ];
        let messages = chat_messages("sys", &history, "input");
        let roles: Vec<_> = messages.iter().map(|m| m["role"].as_str().unwrap()).collect();
        assert_eq!(roles, vec!["system", "user", "assistant", "user"]);
        assert_eq!(messages[3]["content"], "input");
    }

    #[test]
    fn test_completion_text() {
        let response = json!({"choices": [{"message": {"role": "assistant", "content": "<html></html>"}}]});
        assert_eq!(completion_text(&response).as_deref(), Some("<html></html>"));
        assert_eq!(completion_text(&json!({"choices": []})), None);
    }
}
