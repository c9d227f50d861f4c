//! The document aggregate and its flattened content space.
//!
//! The flattened space is the concatenation, in section order, of each
//! section's content list; all indexed access goes through it.

mod media;
mod section;

pub use media::{ContentId, Media, Table};
pub use section::{ContentItem, Section, SubSection};

use std::collections::BTreeMap;
use std::ops::Range;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DocumentError, DocumentResult};
use crate::language::Language;

/// A structured document produced by ingestion.
///
/// Once validated, every media path under `sections` resolves to an existing
/// file, with `image_dir` as the fallback root for bare filenames.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    /// Directory media paths fall back to.
    pub image_dir: PathBuf,
    /// Detected (or overridden) language of the source text.
    #[serde(default)]
    pub language: Language,
    /// Consolidated document-wide metadata.
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    /// Sections in source order.
    pub sections: Vec<Section>,
}

impl Document {
    /// Create an empty document rooted at `image_dir`.
    pub fn new(image_dir: impl Into<PathBuf>) -> Self {
        Self {
            image_dir: image_dir.into(),
            language: Language::default(),
            metadata: BTreeMap::new(),
            sections: Vec::new(),
        }
    }

    /// Iterate (owning section, content item) pairs in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&Section, &ContentItem)> {
        self.sections
            .iter()
            .flat_map(|section| section.content.iter().map(move |item| (section, item)))
    }

    /// Total content items across all sections.
    pub fn len(&self) -> usize {
        self.sections.iter().map(|s| s.content.len()).sum()
    }

    /// Whether the document holds no content items.
    pub fn is_empty(&self) -> bool {
        self.sections.iter().all(|s| s.content.is_empty())
    }

    /// Flattened position of the item carrying `id`.
    pub fn position(&self, id: ContentId) -> DocumentResult<usize> {
        self.iter()
            .position(|(_, item)| item.id() == id)
            .ok_or(DocumentError::NotFound)
    }

    /// Item at flattened position `index`.
    pub fn get(&self, index: usize) -> DocumentResult<&ContentItem> {
        self.iter()
            .nth(index)
            .map(|(_, item)| item)
            .ok_or_else(|| DocumentError::IndexOutOfRange {
                index,
                len: self.len(),
            })
    }

    /// Items in the flattened span, clamped like a slice range.
    pub fn get_range(&self, range: Range<usize>) -> Vec<&ContentItem> {
        let count = range.end.saturating_sub(range.start);
        self.iter()
            .skip(range.start)
            .take(count)
            .map(|(_, item)| item)
            .collect()
    }

    /// Remove and return the item at flattened position `index`.
    pub fn pop(&mut self, index: usize) -> DocumentResult<ContentItem> {
        let len = self.len();
        let mut remaining = index;
        for section in &mut self.sections {
            if remaining < section.content.len() {
                return Ok(section.content.remove(remaining));
            }
            remaining -= section.content.len();
        }
        Err(DocumentError::IndexOutOfRange { index, len })
    }

    /// Insert `item` immediately before the item at flattened `position`,
    /// inside that item's owning section.
    ///
    /// A position at or past the end appends to the last section. Fails only
    /// when the document has no sections to hold the item.
    pub fn insert(&mut self, item: ContentItem, position: usize) -> DocumentResult<()> {
        let mut remaining = position;
        for section in &mut self.sections {
            if remaining < section.content.len() {
                section.content.insert(remaining, item);
                return Ok(());
            }
            remaining -= section.content.len();
        }
        match self.sections.last_mut() {
            Some(section) => {
                section.content.push(item);
                Ok(())
            }
            None => Err(DocumentError::IndexOutOfRange {
                index: position,
                len: 0,
            }),
        }
    }

    /// Remove the item carrying `id`.
    pub fn remove(&mut self, id: ContentId) -> DocumentResult<ContentItem> {
        for section in &mut self.sections {
            if let Some(pos) = section.content.iter().position(|item| item.id() == id) {
                return Ok(section.content.remove(pos));
            }
        }
        Err(DocumentError::NotFound)
    }

    /// First section titled `title`. Subsection titles never match.
    pub fn section_by_title(&self, title: &str) -> DocumentResult<&Section> {
        self.sections
            .iter()
            .find(|s| s.title == title)
            .ok_or_else(|| DocumentError::SectionNotFound {
                title: title.to_string(),
            })
    }

    /// Whether any section carries `title`.
    pub fn contains_section(&self, title: &str) -> bool {
        self.sections.iter().any(|s| s.title == title)
    }

    /// Every media-like item (images and tables) in document order.
    pub fn iter_medias(&self) -> impl Iterator<Item = &ContentItem> {
        self.iter()
            .map(|(_, item)| item)
            .filter(|item| item.is_media())
    }

    /// Mutable variant of [`iter_medias`](Self::iter_medias).
    pub fn iter_medias_mut(&mut self) -> impl Iterator<Item = &mut ContentItem> {
        self.sections
            .iter_mut()
            .flat_map(|section| section.content.iter_mut())
            .filter(|item| item.is_media())
    }

    /// First media item matching `caption` or `path`.
    pub fn find_media(
        &self,
        caption: Option<&str>,
        path: Option<&Path>,
    ) -> DocumentResult<&ContentItem> {
        self.iter_medias()
            .find(|item| {
                caption.is_some_and(|c| item.caption() == Some(c))
                    || path.is_some_and(|p| item.media_path() == Some(p))
            })
            .ok_or(DocumentError::NotFound)
    }

    /// Re-resolve every media path, optionally against a new image dir.
    ///
    /// Fails with [`DocumentError::ImageDirNotFound`] when the effective
    /// directory is missing, or [`DocumentError::MediaNotFound`] on the first
    /// unresolvable path. Running it twice with the same directory changes
    /// nothing the second time.
    pub fn validate_medias(&mut self, image_dir: Option<&Path>) -> DocumentResult<()> {
        if let Some(dir) = image_dir {
            self.image_dir = dir.to_path_buf();
        }
        if !self.image_dir.is_dir() {
            return Err(DocumentError::ImageDirNotFound {
                path: self.image_dir.clone(),
            });
        }
        let dir = self.image_dir.clone();
        for item in self.iter_medias_mut() {
            item.resolve(&dir)?;
        }
        Ok(())
    }

    /// Plain-text outline of the document.
    ///
    /// One `<section>` line per section and a `<subsection>` line per prose
    /// unit; `include_summary` adds the section summaries, `include_images`
    /// adds `<image>path: caption</image>` lines for media.
    pub fn overview(&self, include_summary: bool, include_images: bool) -> String {
        let mut out = String::new();
        for section in &self.sections {
            out.push_str(&format!("<section>{}</section>\n", section.title));
            if include_summary {
                out.push_str(&format!("\tSummary: {}\n", section.summary));
            }
            for item in &section.content {
                match item {
                    ContentItem::SubSection(sub) => {
                        out.push_str(&format!("\t<subsection>{}</subsection>\n", sub.title));
                    }
                    other if include_images => {
                        let path = other
                            .media_path()
                            .map(|p| p.display().to_string())
                            .unwrap_or_default();
                        out.push_str(&format!(
                            "\t<image>{}: {}</image>\n",
                            path,
                            other.caption().unwrap_or("")
                        ));
                    }
                    _ => {}
                }
            }
        }
        out
    }

    /// Metadata rendered as `key: value` lines.
    pub fn metainfo(&self) -> String {
        self.metadata
            .iter()
            .map(|(k, v)| format!("{}: {}", k, v))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
