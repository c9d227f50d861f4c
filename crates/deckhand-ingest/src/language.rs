//! Source language detection.

use deckhand_core::Language;

/// Detect the natural language of `text` as an ISO 639-3 code, falling
/// back to English when detection has nothing to work with.
pub fn detect_language(text: &str) -> Language {
    whatlang::detect(text)
        .map(|info| Language::new(info.lang().code()))
        .unwrap_or_default()
}
