//! The ingestion pipeline.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use deckhand_core::{ChunkSplitter, Document, LanguageModel, Section};

use crate::caption;
use crate::error::{IngestError, IngestResult};
use crate::extract;
use crate::language::detect_language;
use crate::linker::{self, LexicalSimilarity, TextSimilarity};
use crate::merge;
use crate::options::PipelineOptions;
use crate::splitter::{collect_headings, heading_outline, HeadingSplitter};
use crate::structurer;

type Fragment = BTreeMap<String, String>;

/// Markdown-to-document ingestion pipeline.
///
/// Drives split, extract, structure, link and caption per chunk, each chunk
/// on its own task under an optional concurrency cap, then consolidates
/// metadata and assembles the [`Document`]. The batch is all-or-nothing:
/// the first chunk to fail cancels the rest and fails the run.
pub struct DocumentPipeline {
    language_model: Arc<dyn LanguageModel>,
    vision_model: Arc<dyn LanguageModel>,
    splitter: Arc<dyn ChunkSplitter>,
    similarity: Arc<dyn TextSimilarity>,
    options: PipelineOptions,
}

impl DocumentPipeline {
    /// Create a pipeline with the default heading splitter and lexical
    /// similarity metric.
    pub fn new(
        language_model: Arc<dyn LanguageModel>,
        vision_model: Arc<dyn LanguageModel>,
    ) -> Self {
        Self {
            language_model,
            vision_model,
            splitter: Arc::new(HeadingSplitter::new()),
            similarity: Arc::new(LexicalSimilarity),
            options: PipelineOptions::default(),
        }
    }

    /// Replace the chunk splitter.
    pub fn with_splitter(mut self, splitter: Arc<dyn ChunkSplitter>) -> Self {
        self.splitter = splitter;
        self
    }

    /// Replace the similarity metric used for media linking.
    pub fn with_similarity(mut self, similarity: Arc<dyn TextSimilarity>) -> Self {
        self.similarity = similarity;
        self
    }

    /// Apply pipeline options.
    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    /// Ingest `markdown` into a document rooted at `image_dir`.
    ///
    /// Sections come back in chunk order whatever order the tasks finish
    /// in, and rerunning the same input yields the same layout.
    pub async fn ingest(
        &self,
        markdown: &str,
        image_dir: impl Into<PathBuf>,
    ) -> IngestResult<Document> {
        let image_dir = image_dir.into();
        let headings = collect_headings(markdown);
        let outline = heading_outline(markdown);
        let chunks = self
            .splitter
            .split(markdown, &headings, &outline)
            .await
            .map_err(|e| IngestError::Split(e.to_string()))?;

        info!(
            chunks = chunks.len(),
            image_dir = %image_dir.display(),
            "ingestion started"
        );

        let limiter = self
            .options
            .max_concurrent
            .map(|n| Arc::new(Semaphore::new(n.max(1))));
        let cancel = CancellationToken::new();

        let mut handles: Vec<JoinHandle<IngestResult<(Fragment, Section)>>> =
            Vec::with_capacity(chunks.len());
        for (index, chunk) in chunks.into_iter().enumerate() {
            let language_model = self.language_model.clone();
            let vision_model = self.vision_model.clone();
            let similarity = self.similarity.clone();
            let limiter = limiter.clone();
            let cancel = cancel.clone();
            let image_dir = image_dir.clone();

            handles.push(tokio::spawn(async move {
                let result = process_chunk(
                    index,
                    chunk,
                    image_dir,
                    language_model,
                    vision_model,
                    similarity,
                    limiter,
                    cancel.clone(),
                )
                .await;
                if let Err(ref err) = result {
                    if !matches!(err, IngestError::Cancelled) {
                        warn!(chunk = index, error = %err, "chunk failed, cancelling batch");
                        cancel.cancel();
                    }
                }
                result
            }));
        }

        // settle every task in submission order so sections and fragments
        // come out in chunk order and the first real failure wins
        let mut sections = Vec::with_capacity(handles.len());
        let mut fragments = Vec::with_capacity(handles.len());
        let mut failure: Option<IngestError> = None;
        for handle in handles {
            match handle.await {
                Ok(Ok((fragment, section))) => {
                    fragments.push(fragment);
                    sections.push(section);
                }
                Ok(Err(err)) => {
                    if failure.is_none() && !matches!(err, IngestError::Cancelled) {
                        failure = Some(err);
                    }
                }
                Err(join_err) => {
                    if failure.is_none() {
                        failure = Some(IngestError::Join(join_err));
                    }
                }
            }
        }
        if let Some(err) = failure {
            return Err(err);
        }

        let metadata = merge::merge_metadata(self.language_model.as_ref(), &fragments).await?;

        let language = match &self.options.language_override {
            Some(language) => language.clone(),
            None => detect_language(markdown),
        };

        let mut document = Document::new(image_dir);
        document.language = language;
        document.metadata = metadata;
        document.sections = sections;

        info!(
            sections = document.sections.len(),
            medias = document.iter_medias().count(),
            language = %document.language,
            "ingestion complete"
        );
        Ok(document)
    }
}

/// Process one chunk end to end.
///
/// Extraction and linking are deterministic and run outside the limiter;
/// the permit brackets only the phases that call a model. Cancellation is
/// checked before each model phase, so an in-flight call is abandoned
/// rather than interrupted.
#[allow(clippy::too_many_arguments)]
async fn process_chunk(
    index: usize,
    chunk: String,
    image_dir: PathBuf,
    language_model: Arc<dyn LanguageModel>,
    vision_model: Arc<dyn LanguageModel>,
    similarity: Arc<dyn TextSimilarity>,
    limiter: Option<Arc<Semaphore>>,
    cancel: CancellationToken,
) -> IngestResult<(Fragment, Section)> {
    if cancel.is_cancelled() {
        return Err(IngestError::Cancelled);
    }

    let extracted = extract::extract_media(&chunk);
    debug!(chunk = index, refs = extracted.refs.len(), "media extracted");

    let _permit = match &limiter {
        Some(semaphore) => Some(tokio::select! {
            permit = semaphore.acquire() => permit.map_err(|_| IngestError::Cancelled)?,
            _ = cancel.cancelled() => return Err(IngestError::Cancelled),
        }),
        None => None,
    };

    let (mut section, fragment) = tokio::select! {
        result = structurer::structure_chunk(language_model.as_ref(), &extracted.text) => result?,
        _ = cancel.cancelled() => return Err(IngestError::Cancelled),
    };
    section.markdown = chunk;

    linker::link_media(&mut section, extracted.refs, similarity.as_ref());

    caption::resolve_media(&mut section, &image_dir)?;

    tokio::select! {
        result = caption::caption_media(
            &mut section,
            language_model.as_ref(),
            vision_model.as_ref(),
        ) => result?,
        _ = cancel.cancelled() => return Err(IngestError::Cancelled),
    }

    debug!(chunk = index, title = %section.title, "chunk complete");
    Ok((fragment, section))
}
