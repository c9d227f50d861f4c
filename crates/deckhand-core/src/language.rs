//! Language tag for ingested documents.

use serde::{Deserialize, Serialize};

/// ISO 639-3 code of the source text's natural language.
///
/// Falls back to `eng` when detection cannot tell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Language(String);

impl Language {
    /// Wrap a raw ISO 639-3 code.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// English, the fallback for undetectable input.
    pub fn english() -> Self {
        Self("eng".to_string())
    }

    /// The raw code.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Language {
    fn default() -> Self {
        Self::english()
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Language {
    fn from(code: &str) -> Self {
        Self(code.to_string())
    }
}
