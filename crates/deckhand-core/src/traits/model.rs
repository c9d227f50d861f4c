//! Language model trait and related types.

use std::path::Path;

use async_trait::async_trait;

use crate::error::{ModelError, ModelResult};

/// Response format for model output.
#[derive(Debug, Clone)]
pub enum ResponseFormat {
    /// Plain text response.
    Text,
    /// JSON constrained by the given schema.
    JsonSchema(serde_json::Value),
}

/// A text-generation backend, optionally vision-capable.
///
/// The ingestion pipeline drives all of its model calls through this seam:
/// structuring and metadata consolidation use [`ResponseFormat::JsonSchema`],
/// captioning uses [`ResponseFormat::Text`] or [`invoke_vision`]. Deterministic
/// fakes implement it in tests.
///
/// [`invoke_vision`]: LanguageModel::invoke_vision
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generate text for `prompt` under the given response format.
    async fn invoke(&self, prompt: &str, format: ResponseFormat) -> ModelResult<String>;

    /// Generate text for `prompt` about the image at `image`.
    ///
    /// Text-only models keep the default, which refuses.
    async fn invoke_vision(&self, _prompt: &str, _image: &Path) -> ModelResult<String> {
        Err(ModelError::VisionUnsupported {
            model: self.model_name().to_string(),
        })
    }

    /// Get the model name.
    fn model_name(&self) -> &str;

    /// Check if this model accepts image input.
    fn supports_vision(&self) -> bool {
        false
    }
}
