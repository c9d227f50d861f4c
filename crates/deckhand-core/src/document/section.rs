//! Sections and their ordered mixed content.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::DocumentResult;

use super::media::{ContentId, Media, Table};

/// A titled block of prose inside a section. Atomic: subsections never nest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubSection {
    /// Stable identity within the document.
    #[serde(default)]
    pub id: ContentId,
    /// Subsection title.
    pub title: String,
    /// Prose content.
    pub content: String,
}

impl SubSection {
    /// Create a new subsection.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: ContentId::new(),
            title: title.into(),
            content: content.into(),
        }
    }
}

/// One element of a section's ordered content list.
///
/// Order inside the list reflects document flow: prose units interleaved with
/// the media linked next to them. Consumers match exhaustively.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ContentItem {
    /// A titled prose unit.
    SubSection(SubSection),
    /// An image.
    Media(Media),
    /// A markdown table.
    Table(Table),
}

impl ContentItem {
    /// Identity of the wrapped item.
    pub fn id(&self) -> ContentId {
        match self {
            ContentItem::SubSection(sub) => sub.id,
            ContentItem::Media(media) => media.id,
            ContentItem::Table(table) => table.id,
        }
    }

    /// Whether this is an image or table rather than prose.
    pub fn is_media(&self) -> bool {
        !matches!(self, ContentItem::SubSection(_))
    }

    /// Caption of a media-like item. None for prose and uncaptioned media.
    pub fn caption(&self) -> Option<&str> {
        match self {
            ContentItem::SubSection(_) => None,
            ContentItem::Media(media) => media.caption.as_deref(),
            ContentItem::Table(table) => table.caption.as_deref(),
        }
    }

    /// Backing file path of a media-like item, when it has one.
    pub fn media_path(&self) -> Option<&Path> {
        match self {
            ContentItem::SubSection(_) => None,
            ContentItem::Media(media) => Some(&media.path),
            ContentItem::Table(table) => table.path.as_deref(),
        }
    }

    /// Set the caption of a media-like item. No-op for prose.
    pub fn set_caption(&mut self, caption: impl Into<String>) {
        match self {
            ContentItem::SubSection(_) => {}
            ContentItem::Media(media) => media.caption = Some(caption.into()),
            ContentItem::Table(table) => table.caption = Some(caption.into()),
        }
    }

    /// Resolve a media-like item's path against `image_dir`. No-op for prose.
    pub fn resolve(&mut self, image_dir: &Path) -> DocumentResult<()> {
        match self {
            ContentItem::SubSection(_) => Ok(()),
            ContentItem::Media(media) => media.resolve(image_dir),
            ContentItem::Table(table) => table.resolve(image_dir),
        }
    }
}

impl From<SubSection> for ContentItem {
    fn from(sub: SubSection) -> Self {
        ContentItem::SubSection(sub)
    }
}

impl From<Media> for ContentItem {
    fn from(media: Media) -> Self {
        ContentItem::Media(media)
    }
}

impl From<Table> for ContentItem {
    fn from(table: Table) -> Self {
        ContentItem::Table(table)
    }
}

/// One heading-bounded region of the source document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    /// Section title.
    pub title: String,
    /// Model-written summary of the section.
    pub summary: String,
    /// Raw markdown of the chunk this section was built from, kept for audit.
    #[serde(
        rename = "markdown_content",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub markdown: String,
    /// Ordered mixed content in document flow.
    pub content: Vec<ContentItem>,
}

impl Section {
    /// Create an empty section.
    pub fn new(title: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            summary: summary.into(),
            markdown: String::new(),
            content: Vec::new(),
        }
    }

    /// Attach the source markdown of the chunk.
    pub fn with_markdown(mut self, markdown: impl Into<String>) -> Self {
        self.markdown = markdown.into();
        self
    }

    /// Prose units in order.
    pub fn subsections(&self) -> impl Iterator<Item = &SubSection> {
        self.content.iter().filter_map(|item| match item {
            ContentItem::SubSection(sub) => Some(sub),
            _ => None,
        })
    }

    /// Media-like items (images and tables) in order.
    pub fn medias(&self) -> impl Iterator<Item = &ContentItem> {
        self.content.iter().filter(|item| item.is_media())
    }
}
