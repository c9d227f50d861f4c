//! Media extraction from markdown chunks.
//!
//! Pulls `![alt](path)` markers and pipe tables out of one chunk, leaving
//! cleaned prose behind. Extraction never fails: anything malformed stays
//! in the prose, and fenced code blocks are passed through untouched.

use std::path::PathBuf;

use once_cell::sync::Lazy;
use regex::Regex;

static IMAGE_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"!\[([^\]]*)\]\(([^)\s]+)(?:\s+"[^"]*")?\)"#).unwrap());

/// A media reference pulled out of a chunk, not yet linked into a section.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaRef {
    /// An `![alt](path)` marker.
    Image { path: PathBuf, context: String },
    /// A pipe table, plus the snapshot image PDF extractors emit next to
    /// the table when one was adjacent.
    Table {
        body: String,
        snapshot: Option<PathBuf>,
        context: String,
    },
}

/// A chunk after media extraction.
#[derive(Debug, Clone)]
pub struct ExtractedChunk {
    /// Prose with media markers and table blocks removed.
    pub text: String,
    /// Media references in source order.
    pub refs: Vec<MediaRef>,
}

/// Strip media markers and tables out of one markdown chunk.
pub fn extract_media(chunk: &str) -> ExtractedChunk {
    assemble(segment(chunk))
}

enum Seg {
    /// A prose line, inline image markers already removed.
    Prose {
        line: String,
        inline: Vec<(String, String)>,
    },
    /// A line that was nothing but one image marker.
    Image { alt: String, path: String },
    /// A contiguous pipe table block.
    Table { body: String },
}

fn segment(chunk: &str) -> Vec<Seg> {
    let lines: Vec<&str> = chunk.lines().collect();
    let mut segs = Vec::new();
    let mut in_fence = false;
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        let trimmed = line.trim();

        if trimmed.starts_with("```") {
            in_fence = !in_fence;
            segs.push(Seg::Prose {
                line: line.to_string(),
                inline: Vec::new(),
            });
            i += 1;
            continue;
        }
        if in_fence {
            segs.push(Seg::Prose {
                line: line.to_string(),
                inline: Vec::new(),
            });
            i += 1;
            continue;
        }

        // a pipe row directly above a separator row opens a table block
        if is_table_row(line) && i + 1 < lines.len() && is_table_separator(lines[i + 1]) {
            let mut rows = vec![lines[i], lines[i + 1]];
            let mut j = i + 2;
            while j < lines.len() && is_table_row(lines[j]) {
                rows.push(lines[j]);
                j += 1;
            }
            segs.push(Seg::Table {
                body: rows.join("\n"),
            });
            i = j;
            continue;
        }

        // a line that is exactly one image marker
        if let Some(caps) = IMAGE_MARKER.captures(trimmed) {
            let whole = caps.get(0).map(|m| (m.start(), m.end()));
            if whole == Some((0, trimmed.len())) {
                segs.push(Seg::Image {
                    alt: caps[1].to_string(),
                    path: caps[2].to_string(),
                });
                i += 1;
                continue;
            }
        }

        // prose, possibly with inline markers to strip
        let mut inline = Vec::new();
        let cleaned = IMAGE_MARKER
            .replace_all(line, |caps: &regex::Captures<'_>| {
                inline.push((caps[1].to_string(), caps[2].to_string()));
                ""
            })
            .to_string();
        segs.push(Seg::Prose {
            line: cleaned,
            inline,
        });
        i += 1;
    }

    segs
}

fn assemble(segs: Vec<Seg>) -> ExtractedChunk {
    let mut consumed = vec![false; segs.len()];
    let mut snapshots: Vec<Option<PathBuf>> = vec![None; segs.len()];

    // pair each table with an adjacent standalone image marker
    for idx in 0..segs.len() {
        if !matches!(segs[idx], Seg::Table { .. }) {
            continue;
        }
        if let Some(img_idx) = adjacent_image(&segs, &consumed, idx) {
            if let Seg::Image { path, .. } = &segs[img_idx] {
                snapshots[idx] = Some(PathBuf::from(path));
                consumed[img_idx] = true;
            }
        }
    }

    let mut refs = Vec::new();
    let mut text_lines: Vec<&str> = Vec::new();
    for (idx, seg) in segs.iter().enumerate() {
        match seg {
            Seg::Prose { line, inline } => {
                for (alt, path) in inline {
                    refs.push(MediaRef::Image {
                        path: PathBuf::from(path),
                        context: join_context(alt, line.trim()),
                    });
                }
                text_lines.push(line);
            }
            Seg::Image { alt, path } => {
                if consumed[idx] {
                    continue;
                }
                refs.push(MediaRef::Image {
                    path: PathBuf::from(path),
                    context: join_context(alt, &nearest_prose(&segs, idx)),
                });
            }
            Seg::Table { body } => {
                refs.push(MediaRef::Table {
                    body: body.clone(),
                    snapshot: snapshots[idx].take(),
                    context: nearest_prose(&segs, idx),
                });
            }
        }
    }

    ExtractedChunk {
        text: text_lines.join("\n").trim().to_string(),
        refs,
    }
}

/// Nearest non-blank prose line before `idx`, falling back to after.
fn nearest_prose(segs: &[Seg], idx: usize) -> String {
    segs[..idx]
        .iter()
        .rev()
        .find_map(prose_line)
        .or_else(|| segs[idx + 1..].iter().find_map(prose_line))
        .unwrap_or_default()
}

fn prose_line(seg: &Seg) -> Option<String> {
    match seg {
        Seg::Prose { line, .. } if !line.trim().is_empty() => Some(line.trim().to_string()),
        _ => None,
    }
}

/// Standalone image marker next to the table at `table_idx`, if one exists.
/// Blank lines in between are skipped; the side before the table is tried
/// first.
fn adjacent_image(segs: &[Seg], consumed: &[bool], table_idx: usize) -> Option<usize> {
    let candidates = [
        (0..table_idx).rev().find(|&i| !is_blank(&segs[i])),
        (table_idx + 1..segs.len()).find(|&i| !is_blank(&segs[i])),
    ];
    for idx in candidates.into_iter().flatten() {
        if matches!(segs[idx], Seg::Image { .. }) && !consumed[idx] {
            return Some(idx);
        }
    }
    None
}

fn is_blank(seg: &Seg) -> bool {
    matches!(seg, Seg::Prose { line, .. } if line.trim().is_empty())
}

fn is_table_row(line: &str) -> bool {
    line.trim().contains('|')
}

fn is_table_separator(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty()
        && trimmed.contains('-')
        && trimmed.contains('|')
        && trimmed
            .chars()
            .all(|c| matches!(c, '|' | '-' | ':' | ' ' | '\t'))
}

fn join_context(alt: &str, prose: &str) -> String {
    let alt = alt.trim();
    let prose = prose.trim();
    match (alt.is_empty(), prose.is_empty()) {
        (true, _) => prose.to_string(),
        (false, true) => alt.to_string(),
        (false, false) => format!("{} {}", alt, prose),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standalone_image_is_extracted() {
        let chunk = "Some intro text.\n\n![revenue chart](images/chart.png)\n\nMore text.";
        let extracted = extract_media(chunk);
        assert_eq!(extracted.text, "Some intro text.\n\n\nMore text.");
        assert_eq!(extracted.refs.len(), 1);
        match &extracted.refs[0] {
            MediaRef::Image { path, context } => {
                assert_eq!(path, &PathBuf::from("images/chart.png"));
                assert_eq!(context, "revenue chart Some intro text.");
            }
            other => panic!("expected image ref, got {:?}", other),
        }
    }

    #[test]
    fn test_inline_image_keeps_surrounding_prose() {
        let chunk = "Results are shown in ![](fig.png) above.";
        let extracted = extract_media(chunk);
        assert_eq!(extracted.text, "Results are shown in  above.");
        match &extracted.refs[0] {
            MediaRef::Image { path, context } => {
                assert_eq!(path, &PathBuf::from("fig.png"));
                assert_eq!(context, "Results are shown in  above.");
            }
            other => panic!("expected image ref, got {:?}", other),
        }
    }

    #[test]
    fn test_fenced_code_is_untouched() {
        let chunk = "Example:\n```markdown\n![not media](x.png)\n| a | b |\n|---|---|\n```\nDone.";
        let extracted = extract_media(chunk);
        assert!(extracted.refs.is_empty());
        assert!(extracted.text.contains("![not media](x.png)"));
        assert!(extracted.text.contains("|---|---|"));
    }

    #[test]
    fn test_table_block_is_extracted() {
        let chunk = "Quarterly revenue:\n\n| Region | Q1 |\n| --- | --- |\n| EMEA | 12 |\n\nNotes follow.";
        let extracted = extract_media(chunk);
        assert!(!extracted.text.contains('|'));
        assert_eq!(extracted.refs.len(), 1);
        match &extracted.refs[0] {
            MediaRef::Table {
                body,
                snapshot,
                context,
            } => {
                assert!(body.starts_with("| Region | Q1 |"));
                assert_eq!(body.lines().count(), 3);
                assert!(snapshot.is_none());
                assert_eq!(context, "Quarterly revenue:");
            }
            other => panic!("expected table ref, got {:?}", other),
        }
    }

    #[test]
    fn test_adjacent_marker_becomes_table_snapshot() {
        let chunk =
            "Revenue by region:\n![](images/table_1.png)\n| Region | Q1 |\n| --- | --- |\n| EMEA | 12 |";
        let extracted = extract_media(chunk);
        assert_eq!(extracted.refs.len(), 1);
        match &extracted.refs[0] {
            MediaRef::Table { snapshot, .. } => {
                assert_eq!(snapshot.as_deref(), Some(std::path::Path::new("images/table_1.png")));
            }
            other => panic!("expected table ref, got {:?}", other),
        }
    }

    #[test]
    fn test_separated_marker_stays_an_image() {
        let chunk = "![](shot.png)\n\nUnrelated paragraph.\n\n| a | b |\n| --- | --- |\n| 1 | 2 |";
        let extracted = extract_media(chunk);
        assert_eq!(extracted.refs.len(), 2);
        assert!(matches!(extracted.refs[0], MediaRef::Image { .. }));
        assert!(matches!(
            extracted.refs[1],
            MediaRef::Table { snapshot: None, .. }
        ));
    }

    #[test]
    fn test_malformed_marker_stays_prose() {
        let chunk = "A broken ![marker](unclosed and a | lone pipe.";
        let extracted = extract_media(chunk);
        assert!(extracted.refs.is_empty());
        assert_eq!(extracted.text, chunk);
    }

    #[test]
    fn test_header_without_separator_is_not_a_table() {
        let chunk = "| looks | tabular |\nbut has no separator row.";
        let extracted = extract_media(chunk);
        assert!(extracted.refs.is_empty());
        assert!(extracted.text.contains("| looks | tabular |"));
    }

    #[test]
    fn test_refs_keep_source_order() {
        let chunk =
            "![first](a.png)\n\nText.\n\n| x |\n| --- |\n| 1 |\n\nTrailing words.\n\n![second](b.png)";
        let extracted = extract_media(chunk);
        let kinds: Vec<&str> = extracted
            .refs
            .iter()
            .map(|r| match r {
                MediaRef::Image { .. } => "image",
                MediaRef::Table { .. } => "table",
            })
            .collect();
        assert_eq!(kinds, vec!["image", "table", "image"]);
    }
}
