//! Chunk structuring via a language model.

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::debug;

use deckhand_core::{LanguageModel, ResponseFormat, Section, SubSection};

use crate::error::{IngestError, IngestResult};
use crate::prompts;
use crate::response;

#[derive(Debug, Deserialize)]
struct SectionResponse {
    title: String,
    summary: String,
    #[serde(default)]
    metadata: BTreeMap<String, String>,
    #[serde(default)]
    subsections: Vec<SubSectionResponse>,
}

#[derive(Debug, Deserialize)]
struct SubSectionResponse {
    title: String,
    content: String,
}

/// Ask the model to structure one cleaned chunk.
///
/// Returns the section, prose only at this point, and whatever
/// document-level metadata the model spotted in the chunk.
pub async fn structure_chunk(
    model: &dyn LanguageModel,
    text: &str,
) -> IngestResult<(Section, BTreeMap<String, String>)> {
    let prompt = prompts::structure_prompt(text);
    let raw = model
        .invoke(
            &prompt,
            ResponseFormat::JsonSchema(prompts::SECTION_SCHEMA.clone()),
        )
        .await
        .map_err(|e| IngestError::Structure(e.to_string()))?;

    let json = response::extract_json(&raw);
    let parsed: SectionResponse = serde_json::from_str(&json)
        .map_err(|e| IngestError::Structure(format!("invalid section JSON: {}", e)))?;

    debug!(
        title = %parsed.title,
        subsections = parsed.subsections.len(),
        "chunk structured"
    );

    let mut section = Section::new(parsed.title, parsed.summary);
    section.content = parsed
        .subsections
        .into_iter()
        .map(|sub| SubSection::new(sub.title, sub.content).into())
        .collect();

    Ok((section, parsed.metadata))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use deckhand_core::{ContentItem, ModelResult};

    struct Scripted(&'static str);

    #[async_trait]
    impl LanguageModel for Scripted {
        async fn invoke(&self, _prompt: &str, _format: ResponseFormat) -> ModelResult<String> {
            Ok(self.0.to_string())
        }

        fn model_name(&self) -> &str {
            "scripted"
        }
    }

    #[tokio::test]
    async fn test_parses_fenced_section_json() {
        let model = Scripted(
            "```json\n{\"title\": \"Intro\", \"summary\": \"Opens the paper.\", \"metadata\": {\"author\": \"Lee\"}, \"subsections\": [{\"title\": \"Motivation\", \"content\": \"Why this matters.\"}]}\n```",
        );
        let (section, metadata) = structure_chunk(&model, "some chunk").await.unwrap();
        assert_eq!(section.title, "Intro");
        assert_eq!(section.summary, "Opens the paper.");
        assert_eq!(section.content.len(), 1);
        match &section.content[0] {
            ContentItem::SubSection(sub) => assert_eq!(sub.title, "Motivation"),
            other => panic!("expected subsection, got {:?}", other),
        }
        assert_eq!(metadata.get("author").map(String::as_str), Some("Lee"));
    }

    #[tokio::test]
    async fn test_missing_optional_fields_default() {
        let model = Scripted("{\"title\": \"Bare\", \"summary\": \"No extras.\", \"subsections\": []}");
        let (section, metadata) = structure_chunk(&model, "x").await.unwrap();
        assert!(section.content.is_empty());
        assert!(metadata.is_empty());
    }

    #[tokio::test]
    async fn test_unparseable_output_is_a_structure_error() {
        let model = Scripted("the fragment discusses three topics");
        let err = structure_chunk(&model, "x").await.unwrap_err();
        assert!(matches!(err, IngestError::Structure(_)));
        assert!(err.to_string().contains("invalid section JSON"));
    }
}
