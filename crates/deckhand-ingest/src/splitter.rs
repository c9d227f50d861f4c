//! Heading-based chunking.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use deckhand_core::{ChunkSplitter, ModelResult};

static HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(#{1,6})\s+(.*)$").unwrap());

/// Ordered raw heading lines, skipping fenced code blocks.
pub fn collect_headings(markdown: &str) -> Vec<String> {
    let mut headings = Vec::new();
    let mut in_fence = false;
    for line in markdown.lines() {
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
            continue;
        }
        if !in_fence && HEADING.is_match(line) {
            headings.push(line.to_string());
        }
    }
    headings
}

/// Heading titles as an indented tree, one line per heading.
pub fn heading_outline(markdown: &str) -> String {
    collect_headings(markdown)
        .iter()
        .filter_map(|line| {
            HEADING.captures(line).map(|caps| {
                let depth = caps[1].len() - 1;
                format!("{}{}", "\t".repeat(depth), caps[2].trim())
            })
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Deterministic splitter that starts a new chunk at every heading whose
/// level equals the shallowest level in the document. Deeper headings stay
/// inside their chunk for the structurer to turn into subsections; a
/// non-blank preamble before the first heading forms its own chunk.
#[derive(Debug, Clone, Default)]
pub struct HeadingSplitter;

impl HeadingSplitter {
    pub fn new() -> Self {
        Self
    }

    fn split_at_top_level(markdown: &str) -> Vec<String> {
        let Some(top) = shallowest_level(markdown) else {
            let trimmed = markdown.trim();
            return if trimmed.is_empty() {
                Vec::new()
            } else {
                vec![trimmed.to_string()]
            };
        };

        let mut chunks: Vec<Vec<&str>> = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        let mut in_fence = false;

        for line in markdown.lines() {
            if line.trim_start().starts_with("```") {
                in_fence = !in_fence;
                current.push(line);
                continue;
            }
            if !in_fence {
                if let Some(caps) = HEADING.captures(line) {
                    if caps[1].len() == top {
                        if !current.is_empty() {
                            chunks.push(std::mem::take(&mut current));
                        }
                        current.push(line);
                        continue;
                    }
                }
            }
            current.push(line);
        }
        if !current.is_empty() {
            chunks.push(current);
        }

        chunks
            .into_iter()
            .map(|lines| lines.join("\n").trim().to_string())
            .filter(|chunk| !chunk.is_empty())
            .collect()
    }
}

fn shallowest_level(markdown: &str) -> Option<usize> {
    collect_headings(markdown)
        .iter()
        .filter_map(|line| HEADING.captures(line).map(|caps| caps[1].len()))
        .min()
}

#[async_trait]
impl ChunkSplitter for HeadingSplitter {
    async fn split(
        &self,
        markdown: &str,
        _headings: &[String],
        _outline: &str,
    ) -> ModelResult<Vec<String>> {
        Ok(Self::split_at_top_level(markdown))
    }
}
