//! Linking extracted media to the most related subsection.

use std::collections::HashSet;

use tracing::debug;

use deckhand_core::{ContentItem, Media, Section, Table};

use crate::extract::MediaRef;

/// Scores how related two pieces of text are, in `[0.0, 1.0]`.
///
/// Implementations must be deterministic: the same inputs always produce
/// the same score, so re-running a pipeline reproduces the same layout.
pub trait TextSimilarity: Send + Sync {
    fn score(&self, a: &str, b: &str) -> f64;
}

/// Jaccard overlap of lowercased alphanumeric token sets.
#[derive(Debug, Clone, Default)]
pub struct LexicalSimilarity;

impl TextSimilarity for LexicalSimilarity {
    fn score(&self, a: &str, b: &str) -> f64 {
        let ta = tokens(a);
        let tb = tokens(b);
        if ta.is_empty() || tb.is_empty() {
            return 0.0;
        }
        let intersection = ta.intersection(&tb).count();
        let union = ta.len() + tb.len() - intersection;
        intersection as f64 / union as f64
    }
}

fn tokens(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

/// Insert each media reference into `section.content` directly after its
/// best-scoring subsection, behind any media already attached there, so
/// earlier references stay ahead of later ones. On a score tie the earliest
/// subsection wins. A section with no subsections gets its media appended
/// at the end.
pub fn link_media(section: &mut Section, refs: Vec<MediaRef>, similarity: &dyn TextSimilarity) {
    for media_ref in refs {
        let item = into_item(media_ref);
        match best_subsection(section, &item, similarity) {
            Some(sub_idx) => {
                let mut insert_at = sub_idx + 1;
                while insert_at < section.content.len() && section.content[insert_at].is_media() {
                    insert_at += 1;
                }
                debug!(section = %section.title, position = insert_at, "media linked");
                section.content.insert(insert_at, item);
            }
            None => {
                debug!(section = %section.title, "no subsection to bind, media appended");
                section.content.push(item);
            }
        }
    }
}

fn best_subsection(
    section: &Section,
    item: &ContentItem,
    similarity: &dyn TextSimilarity,
) -> Option<usize> {
    let text = scoring_text(item);
    let mut best: Option<(usize, f64)> = None;
    for (idx, candidate) in section.content.iter().enumerate() {
        let ContentItem::SubSection(sub) = candidate else {
            continue;
        };
        let score = similarity.score(&text, &format!("{}\n{}", sub.title, sub.content));
        // strictly greater keeps the earliest subsection on ties
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((idx, score));
        }
    }
    best.map(|(idx, _)| idx)
}

fn scoring_text(item: &ContentItem) -> String {
    match item {
        ContentItem::Media(media) => media.context.clone(),
        ContentItem::Table(table) => format!("{}\n{}", table.context, table.body),
        ContentItem::SubSection(_) => String::new(),
    }
}

fn into_item(media_ref: MediaRef) -> ContentItem {
    match media_ref {
        MediaRef::Image { path, context } => Media::new(path, context).into(),
        MediaRef::Table {
            body,
            snapshot,
            context,
        } => {
            let table = Table::new(body, context);
            match snapshot {
                Some(path) => table.with_path(path).into(),
                None => table.into(),
            }
        }
    }
}
