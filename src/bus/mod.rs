//! Topic-addressed message bus
//!
//! Append-only log of every exchange in a pipeline run. Messages are
//! indexed both per topic and chronologically; a single log-wide sequence
//! counter gives a total order across topics. Subscribers registered on a
//! topic first receive the topic's history, then every later publish.

use crate::models::{ChatTurn, Content, Message};
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Callback invoked synchronously for each message on a subscribed topic
pub type Handler = Box<dyn FnMut(&Message) + Send>;

/// In-process, append-only message log
#[derive(Default)]
pub struct MessageBus {
    /// Every message in publish order
    log: Vec<Arc<Message>>,
    /// Per-topic view, sequence-ordered
    topics: HashMap<String, Vec<Arc<Message>>>,
    /// Topic names in first-publish order
    topic_order: Vec<String>,
    subscribers: HashMap<String, Vec<Handler>>,
    last_sequence: u64,
}

impl MessageBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message to `topic` and notify the topic's subscribers
    pub fn publish(
        &mut self,
        topic: &str,
        sender: &str,
        content: impl Into<Content>,
    ) -> Arc<Message> {
        self.last_sequence += 1;
        let message = Arc::new(Message {
            topic: topic.to_string(),
            sender: sender.to_string(),
            content: content.into(),
            sequence: self.last_sequence,
            published_at: Utc::now(),
        });

        self.log.push(Arc::clone(&message));
        match self.topics.get_mut(topic) {
            Some(messages) => messages.push(Arc::clone(&message)),
            None => {
                self.topic_order.push(topic.to_string());
                self.topics
                    .insert(topic.to_string(), vec![Arc::clone(&message)]);
            }
        }

        tracing::debug!(
            topic = %topic,
            sender = %sender,
            sequence = message.sequence,
            "Published message"
        );

        if let Some(handlers) = self.subscribers.get_mut(topic) {
            for handler in handlers.iter_mut() {
                handler(&message);
            }
        }

        message
    }

    /// Register `handler` on `topic`, replaying the topic's history first
    ///
    /// Returns the number of messages replayed.
    pub fn subscribe<F>(&mut self, topic: &str, mut handler: F) -> usize
    where
        F: FnMut(&Message) + Send + 'static,
    {
        let mut replayed = 0;
        if let Some(messages) = self.topics.get(topic) {
            for message in messages {
                handler(message);
                replayed += 1;
            }
        }

        self.subscribers
            .entry(topic.to_string())
            .or_default()
            .push(Box::new(handler));
        replayed
    }

    /// Highest-sequence message on `topic`, or `None` for an unknown topic
    pub fn latest(&self, topic: &str) -> Option<Arc<Message>> {
        self.topics
            .get(topic)
            .and_then(|messages| messages.last())
            .cloned()
    }

    /// Chronological history, across the whole log or one topic
    pub fn history(&self, topic: Option<&str>) -> Vec<Arc<Message>> {
        match topic {
            Some(topic) => self.topics.get(topic).cloned().unwrap_or_default(),
            None => self.log.clone(),
        }
    }

    /// Whole log projected as human/assistant chat turns
    pub fn chat_history(&self) -> Vec<ChatTurn> {
        self.log.iter().map(|message| ChatTurn::from(message.as_ref())).collect()
    }

    /// Topics in the order they were first published to
    pub fn topics(&self) -> &[String] {
        &self.topic_order
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    /// Full log keyed by topic, each message as plain JSON
    pub fn dump(&self) -> BTreeMap<String, Vec<serde_json::Value>> {
        self.topics
            .iter()
            .map(|(topic, messages)| {
                let entries = messages
                    .iter()
                    .map(|message| {
                        serde_json::to_value(message.as_ref()).unwrap_or(serde_json::Value::Null)
                    })
                    .collect();
                (topic.clone(), entries)
            })
            .collect()
    }

    /// Pretty-printed `dump()`
    pub fn dump_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(&self.dump())?)
    }
}

impl std::fmt::Debug for MessageBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageBus")
            .field("messages", &self.log.len())
            .field("topics", &self.topic_order)
            .field("last_sequence", &self.last_sequence)
            .finish()
    }
}
