//! Error types for the ingestion pipeline.

use thiserror::Error;

use deckhand_core::DocumentError;

/// Result type for ingestion operations.
pub type IngestResult<T> = Result<T, IngestError>;

/// Errors that can occur while ingesting a markdown document.
///
/// A batch is all-or-nothing: the first chunk to fail cancels its siblings
/// and its error becomes the error of the whole run.
#[derive(Error, Debug)]
pub enum IngestError {
    /// Chunk splitting failed.
    #[error("chunk splitting failed: {0}")]
    Split(String),

    /// The model produced an unusable structuring response.
    #[error("chunk structuring failed: {0}")]
    Structure(String),

    /// A media item could not be captioned.
    #[error("captioning failed: {0}")]
    Caption(String),

    /// Metadata consolidation failed.
    #[error("metadata merge failed: {0}")]
    Merge(String),

    /// Document-level failure, media resolution included.
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// The chunk was abandoned because a sibling already failed.
    #[error("chunk processing was cancelled")]
    Cancelled,

    /// A chunk task panicked or was aborted.
    #[error("chunk task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_document_error_is_transparent() {
        let err: IngestError = DocumentError::MediaNotFound {
            path: PathBuf::from("images/fig1.png"),
        }
        .into();
        assert_eq!(err.to_string(), "media file not found: images/fig1.png");
        assert!(matches!(err, IngestError::Document(_)));
    }

    #[test]
    fn test_phase_errors_name_their_phase() {
        let err = IngestError::Structure("invalid section JSON".to_string());
        assert!(err.to_string().starts_with("chunk structuring failed"));
        let err = IngestError::Caption("blank caption".to_string());
        assert!(err.to_string().starts_with("captioning failed"));
    }
}
