//! Fenced code block extraction (AST-based)
//!
//! Model responses often wrap the requested payload in a Markdown fence
//! (```json ... ``` or ```html ... ```). Blocks are found with the
//! pulldown-cmark event stream so fences nested in prose are handled.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

/// A fenced code block and its info string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FencedBlock {
    /// Info string after the opening fence ("json", "html", "")
    pub info_string: String,
    pub content: String,
}

impl FencedBlock {
    /// Language tag: first word of the info string, lowercased
    pub fn language(&self) -> String {
        self.info_string
            .split_whitespace()
            .next()
            .unwrap_or("")
            .to_lowercase()
    }
}

/// Extract every fenced code block in document order
pub fn extract_fenced_blocks(content: &str) -> Vec<FencedBlock> {
    let parser = Parser::new_ext(content, Options::empty());
    let mut blocks = Vec::new();
    let mut current: Option<FencedBlock> = None;

    for event in parser {
        match event {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))) => {
                current = Some(FencedBlock {
                    info_string: info.to_string(),
                    content: String::new(),
                });
            }
            Event::Text(text) => {
                if let Some(ref mut block) = current {
                    block.content.push_str(&text);
                }
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some(block) = current.take() {
                    blocks.push(block);
                }
            }
            _ => {}
        }
    }

    blocks
}

/// Strip a fence that wraps the whole response; other text is returned as-is
pub fn strip_outer_fence(content: &str) -> String {
    let trimmed = content.trim();
    if !trimmed.starts_with("```") {
        return content.to_string();
    }

    match extract_fenced_blocks(trimmed).into_iter().next() {
        Some(block) => block.content.trim_end().to_string(),
        None => content.to_string(),
    }
}
