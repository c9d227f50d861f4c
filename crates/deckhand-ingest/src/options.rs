//! Pipeline configuration.

use deckhand_core::Language;

/// Tunables for a [`DocumentPipeline`](crate::DocumentPipeline) run.
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    /// Cap on chunks running their model phase at once. `None` means
    /// unbounded.
    pub max_concurrent: Option<usize>,
    /// Pin the document language instead of detecting it.
    pub language_override: Option<Language>,
}

impl PipelineOptions {
    /// Options with no concurrency cap and detected language.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap concurrent model phases at `limit`, clamped to at least 1.
    pub fn with_max_concurrent(mut self, limit: usize) -> Self {
        self.max_concurrent = Some(limit.max(1));
        self
    }

    /// Pin the document language instead of detecting it.
    pub fn with_language(mut self, language: Language) -> Self {
        self.language_override = Some(language);
        self
    }

    /// Build options from environment variables.
    ///
    /// Reads:
    /// - `DECKHAND_MAX_CONCURRENT` (default: unbounded)
    /// - `DECKHAND_LANGUAGE` (default: detect from the source text)
    pub fn from_env() -> Self {
        let mut options = Self::default();
        if let Ok(value) = std::env::var("DECKHAND_MAX_CONCURRENT") {
            if let Ok(limit) = value.parse::<usize>() {
                options.max_concurrent = Some(limit.max(1));
            }
        }
        if let Ok(code) = std::env::var("DECKHAND_LANGUAGE") {
            let code = code.trim();
            if !code.is_empty() {
                options.language_override = Some(Language::new(code));
            }
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_unbounded_and_detected() {
        let options = PipelineOptions::new();
        assert!(options.max_concurrent.is_none());
        assert!(options.language_override.is_none());
    }

    #[test]
    fn test_builders_set_fields() {
        let options = PipelineOptions::new()
            .with_max_concurrent(4)
            .with_language(Language::new("deu"));
        assert_eq!(options.max_concurrent, Some(4));
        assert_eq!(
            options.language_override.as_ref().map(Language::as_str),
            Some("deu")
        );
    }

    #[test]
    fn test_zero_limit_is_clamped() {
        let options = PipelineOptions::new().with_max_concurrent(0);
        assert_eq!(options.max_concurrent, Some(1));
    }
}
