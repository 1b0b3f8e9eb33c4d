//! Shared helpers for integration tests

#![allow(dead_code)]

use agentbus::models::ChatTurn;
use agentbus::orchestrator::Generator;
use agentbus::Result;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// One request as the generator saw it
#[derive(Debug, Clone)]
pub struct Request {
    pub system_prompt: String,
    pub history: Vec<ChatTurn>,
    pub user_input: String,
}

/// Generator answering from a fixed queue of replies, in call order
#[derive(Default)]
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<std::result::Result<String, String>>>,
    requests: Mutex<Vec<Request>>,
}

impl ScriptedGenerator {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(|r| Ok(r.into())).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a failure after the current replies
    pub fn then_fail(self, message: &str) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
        self
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(
        &self,
        system_prompt: &str,
        history: &[ChatTurn],
        user_input: &str,
    ) -> Result<String> {
        self.requests.lock().unwrap().push(Request {
            system_prompt: system_prompt.to_string(),
            history: history.to_vec(),
            user_input: user_input.to_string(),
        });

        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => Err(anyhow::anyhow!(message)),
            None => anyhow::bail!("scripted generator ran out of replies"),
        }
    }
}

pub const ROLE_PLAN_JSON: &str =
    r#"{"available_roles":["TeamLeader","Engineer"],"tasks":[{"role":"TeamLeader","tasks":["t1"]}]}"#;

pub const PRD_JSON: &str = r#"{
  "product": "Xinjiang sunflower seeds",
  "goals": ["Lift conversion", "Spring festival mood"],
  "target_users": ["Families"],
  "page_sections": [
    {"id": "hero", "purpose": "Headline and price", "success_metric": "CTR"},
    {"id": "story", "purpose": "Origin story"}
  ]
}"#;

pub const PAGE_SPEC_JSON: &str = r##"```json
{
  "layout": "single column",
  "colors": ["#c62828", "#ffd54f"],
  "components": [
    {"id": "hero", "html": "header", "children": [{"tag": "h1", "content_hint": "Product name"}]}
  ]
}
```"##;
