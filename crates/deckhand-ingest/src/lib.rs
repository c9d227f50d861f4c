//! deckhand-ingest - Markdown ingestion pipeline for deckhand.
//!
//! Converts a flat markdown document plus its directory of extracted
//! images into a structured [`deckhand_core::Document`]. Heading-bounded
//! chunks are structured by a language model, embedded images and tables
//! are linked to their most related subsection and captioned, and
//! per-chunk metadata is consolidated in a single merge call. Chunks run
//! concurrently; the output order and layout stay deterministic.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use deckhand_ingest::{DocumentPipeline, PipelineOptions};
//!
//! let pipeline = DocumentPipeline::new(language_model, vision_model)
//!     .with_options(PipelineOptions::new().with_max_concurrent(4));
//! let document = pipeline.ingest(&markdown, "paper/images").await?;
//! println!("{}", document.overview(true, true));
//! ```

mod caption;
mod error;
mod extract;
mod language;
mod linker;
mod merge;
mod options;
mod pipeline;
mod prompts;
mod response;
mod splitter;
mod structurer;

pub use error::{IngestError, IngestResult};
pub use extract::{extract_media, ExtractedChunk, MediaRef};
pub use language::detect_language;
pub use linker::{LexicalSimilarity, TextSimilarity};
pub use options::PipelineOptions;
pub use pipeline::DocumentPipeline;
pub use splitter::{collect_headings, heading_outline, HeadingSplitter};
