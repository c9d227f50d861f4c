//! Media and table content items.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DocumentError, DocumentResult};

/// Stable identity of one content item.
///
/// Minted once at construction; two items never share an id no matter how
/// equal their fields look.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(Uuid);

impl ContentId {
    /// Mint a fresh identity.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ContentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ContentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// An image reference extracted from the source markdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Media {
    /// Stable identity within the document.
    #[serde(default)]
    pub id: ContentId,
    /// Image file path. Starts as the raw marker path and is rewritten to a
    /// resolved location by validation.
    pub path: PathBuf,
    /// Model-generated description, populated once by the captioner.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    /// Alt text plus nearby prose, used for linking and captioning prompts.
    pub context: String,
}

impl Media {
    /// Create a media item from a raw marker path.
    pub fn new(path: impl Into<PathBuf>, context: impl Into<String>) -> Self {
        Self {
            id: ContentId::new(),
            path: path.into(),
            caption: None,
            context: context.into(),
        }
    }

    /// Resolve `path` against `image_dir`.
    ///
    /// Keeps the path when it already exists, otherwise retries by bare
    /// filename under `image_dir` and rewrites it on a hit.
    pub fn resolve(&mut self, image_dir: &Path) -> DocumentResult<()> {
        self.path = resolve_path(&self.path, image_dir)?;
        Ok(())
    }
}

/// A table extracted from tabular markdown.
///
/// Markdown produced by PDF extraction usually pairs each table with a
/// snapshot image; when present that image's path rides along here. The
/// table body, not the snapshot, is what the captioner describes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    /// Stable identity within the document.
    #[serde(default)]
    pub id: ContentId,
    /// Snapshot image accompanying the table, when the source provides one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Model-generated description, populated once by the captioner.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    /// The table's own markdown.
    pub body: String,
    /// Nearby prose, used for linking and captioning prompts.
    pub context: String,
}

impl Table {
    /// Create a table item from its markdown body.
    pub fn new(body: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            id: ContentId::new(),
            path: None,
            caption: None,
            body: body.into(),
            context: context.into(),
        }
    }

    /// Attach a snapshot image path.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Resolve the snapshot path against `image_dir`, if there is one.
    pub fn resolve(&mut self, image_dir: &Path) -> DocumentResult<()> {
        if let Some(path) = &self.path {
            self.path = Some(resolve_path(path, image_dir)?);
        }
        Ok(())
    }
}

/// Accept a path verbatim when it exists, otherwise retry by filename under
/// `image_dir`.
fn resolve_path(path: &Path, image_dir: &Path) -> DocumentResult<PathBuf> {
    if path.exists() {
        return Ok(path.to_path_buf());
    }
    if let Some(name) = path.file_name() {
        let fallback = image_dir.join(name);
        if fallback.exists() {
            debug!(
                original = %path.display(),
                resolved = %fallback.display(),
                "media path resolved by filename fallback"
            );
            return Ok(fallback);
        }
    }
    Err(DocumentError::MediaNotFound {
        path: path.to_path_buf(),
    })
}
