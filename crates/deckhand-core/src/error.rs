//! Error types for deckhand operations.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for document operations.
pub type DocumentResult<T> = Result<T, DocumentError>;

/// Errors from document accessors and media validation.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// No content item carries the requested identity.
    #[error("content item not found")]
    NotFound,

    /// A flattened index past the end of the content space.
    #[error("content index {index} out of range for {len} items")]
    IndexOutOfRange { index: usize, len: usize },

    /// No section carries the requested title.
    #[error("section not found: {title}")]
    SectionNotFound { title: String },

    /// A media path that resolves to no file, even by filename fallback.
    #[error("media file not found: {}", path.display())]
    MediaNotFound { path: PathBuf },

    /// The image directory itself is missing.
    #[error("image directory not found: {}", path.display())]
    ImageDirNotFound { path: PathBuf },
}

/// Result type alias for model calls.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors from language/vision model backends.
#[derive(Error, Debug)]
pub enum ModelError {
    /// The call itself failed (provider, transport, timeout).
    #[error("model request failed: {0}")]
    Request(String),

    /// The model returned no usable text.
    #[error("model returned an empty response")]
    EmptyResponse,

    /// Vision input sent to a text-only model.
    #[error("model '{model}' does not support vision input")]
    VisionUnsupported { model: String },
}

impl ModelError {
    /// Create a request error.
    pub fn request(message: impl Into<String>) -> Self {
        Self::Request(message.into())
    }
}
