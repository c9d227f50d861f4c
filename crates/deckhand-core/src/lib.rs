//! deckhand-core - Core library for deckhand.
//!
//! This crate provides the document model produced by ingestion (sections,
//! subsections, media, tables), flattened indexed access over mixed content,
//! and the collaborator traits the pipeline is generic over.
//!
//! # Example
//!
//! ```ignore
//! use deckhand_core::Document;
//!
//! let mut doc: Document = serde_json::from_str(&json)?;
//! doc.validate_medias(Some(new_image_dir))?;
//! for (section, item) in doc.iter() {
//!     println!("{} -> {:?}", section.title, item.id());
//! }
//! ```

pub mod document;
pub mod error;
pub mod language;
pub mod traits;

// Re-export commonly used types
pub use document::{ContentId, ContentItem, Document, Media, Section, SubSection, Table};
pub use error::{DocumentError, DocumentResult, ModelError, ModelResult};
pub use language::Language;
pub use traits::{ChunkSplitter, LanguageModel, ResponseFormat};
