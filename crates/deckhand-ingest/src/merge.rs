//! Document-wide metadata consolidation.

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::debug;

use deckhand_core::{LanguageModel, ResponseFormat};

use crate::error::{IngestError, IngestResult};
use crate::prompts;
use crate::response;

#[derive(Debug, Deserialize)]
struct MetadataResponse {
    #[serde(default)]
    metadata: Vec<MetadataRecord>,
}

#[derive(Debug, Deserialize)]
struct MetadataRecord {
    name: String,
    value: String,
}

/// Consolidate per-chunk metadata fragments into one canonical mapping.
///
/// A single model call sees every fragment and reconciles collisions. When
/// the response still repeats a name, the last occurrence wins. Fragments
/// with nothing in them skip the call and yield an empty mapping.
pub async fn merge_metadata(
    model: &dyn LanguageModel,
    fragments: &[BTreeMap<String, String>],
) -> IngestResult<BTreeMap<String, String>> {
    if fragments.iter().all(|fragment| fragment.is_empty()) {
        return Ok(BTreeMap::new());
    }

    let rendered = fragments
        .iter()
        .enumerate()
        .filter(|(_, fragment)| !fragment.is_empty())
        .map(|(i, fragment)| {
            let lines = fragment
                .iter()
                .map(|(key, value)| format!("  {}: {}", key, value))
                .collect::<Vec<_>>()
                .join("\n");
            format!("Fragment {}:\n{}", i + 1, lines)
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    let prompt = prompts::merge_metadata_prompt(&rendered);
    let raw = model
        .invoke(
            &prompt,
            ResponseFormat::JsonSchema(prompts::METADATA_SCHEMA.clone()),
        )
        .await
        .map_err(|e| IngestError::Merge(e.to_string()))?;

    let json = response::extract_json(&raw);
    let parsed: MetadataResponse = serde_json::from_str(&json)
        .map_err(|e| IngestError::Merge(format!("invalid metadata JSON: {}", e)))?;

    let mut merged = BTreeMap::new();
    for record in parsed.metadata {
        merged.insert(record.name, record.value);
    }
    debug!(keys = merged.len(), "metadata merged");
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use deckhand_core::{ModelError, ModelResult};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Scripted {
        response: &'static str,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn new(response: &'static str) -> Self {
            Self {
                response,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl LanguageModel for Scripted {
        async fn invoke(&self, _prompt: &str, _format: ResponseFormat) -> ModelResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.response.is_empty() {
                return Err(ModelError::request("should not have been called"));
            }
            Ok(self.response.to_string())
        }

        fn model_name(&self) -> &str {
            "scripted"
        }
    }

    fn fragment(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_single_call_merges_fragments() {
        let model = Scripted::new(
            "{\"metadata\": [{\"name\": \"author\", \"value\": \"Lee\"}, {\"name\": \"year\", \"value\": \"2024\"}]}",
        );
        let fragments = vec![
            fragment(&[("author", "Lee")]),
            fragment(&[("year", "2024")]),
        ];
        let merged = merge_metadata(&model, &fragments).await.unwrap();
        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.get("author").map(String::as_str), Some("Lee"));
    }

    #[tokio::test]
    async fn test_repeated_name_keeps_last_value() {
        let model = Scripted::new(
            "{\"metadata\": [{\"name\": \"author\", \"value\": \"Lee\"}, {\"name\": \"author\", \"value\": \"Kim\"}]}",
        );
        let fragments = vec![fragment(&[("author", "Lee")])];
        let merged = merge_metadata(&model, &fragments).await.unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged.get("author").map(String::as_str), Some("Kim"));
    }

    #[tokio::test]
    async fn test_empty_fragments_skip_the_call() {
        let model = Scripted::new("");
        let merged = merge_metadata(&model, &[]).await.unwrap();
        assert!(merged.is_empty());
        let merged = merge_metadata(&model, &[BTreeMap::new(), BTreeMap::new()])
            .await
            .unwrap();
        assert!(merged.is_empty());
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_bad_json_is_a_merge_error() {
        let model = Scripted::new("no structure at all");
        let fragments = vec![fragment(&[("author", "Lee")])];
        let err = merge_metadata(&model, &fragments).await.unwrap_err();
        assert!(matches!(err, IngestError::Merge(_)));
    }
}
