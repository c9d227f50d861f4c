//! Collaborator traits the ingestion pipeline is generic over.

mod model;
mod splitter;

pub use model::*;
pub use splitter::*;
