//! Chunk splitter trait.

use async_trait::async_trait;

use crate::error::ModelResult;

/// Splits raw markdown into ordered heading-bounded chunks.
///
/// `headings` lists the raw heading lines in document order and `outline` is
/// an indented rendering of the heading tree; both ride through opaquely so
/// model-backed splitters can use them. Deterministic splitters may ignore
/// them and are infallible in practice.
#[async_trait]
pub trait ChunkSplitter: Send + Sync {
    /// Split `markdown` into ordered chunks.
    async fn split(
        &self,
        markdown: &str,
        headings: &[String],
        outline: &str,
    ) -> ModelResult<Vec<String>>;
}
