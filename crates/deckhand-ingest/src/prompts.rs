//! Prompt builders and response schemas for ingestion model calls.

use once_cell::sync::Lazy;
use serde_json::{json, Value};

/// Schema constraining the chunk structuring response.
pub static SECTION_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "properties": {
            "title": { "type": "string" },
            "summary": { "type": "string" },
            "metadata": {
                "type": "object",
                "additionalProperties": { "type": "string" }
            },
            "subsections": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "title": { "type": "string" },
                        "content": { "type": "string" }
                    },
                    "required": ["title", "content"]
                }
            }
        },
        "required": ["title", "summary", "subsections"]
    })
});

/// Schema constraining the metadata consolidation response.
pub static METADATA_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "properties": {
            "metadata": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "value": { "type": "string" }
                    },
                    "required": ["name", "value"]
                }
            }
        },
        "required": ["metadata"]
    })
});

/// Generate the chunk structuring prompt.
pub fn structure_prompt(text: &str) -> String {
    format!(
        r#"You are a document analyst. Structure the following document fragment into titled subsections.

Output JSON in this exact format:
{{
  "title": "short title for this fragment",
  "summary": "summary of the fragment in two or three sentences",
  "metadata": {{"key": "value"}},
  "subsections": [
    {{"title": "subsection title", "content": "subsection prose"}}
  ]
}}

Rules:
1. Keep subsections in the order the text presents them
2. Every piece of prose belongs to exactly one subsection
3. Record document-level facts in metadata (title, author, date, organization) only when the fragment states them
4. Do not invent content that is not in the fragment

Return ONLY valid JSON, no other text.

Fragment:
{}"#,
        text
    )
}

/// Generate the image captioning prompt.
pub fn image_caption_prompt(context: &str) -> String {
    format!(
        r#"Describe this image in one or two sentences for a reader who cannot see it.
Focus on what the image shows, not on its style. Use the surrounding text for terminology.

Surrounding text:
{}"#,
        context
    )
}

/// Generate the table captioning prompt.
pub fn table_caption_prompt(body: &str, context: &str) -> String {
    format!(
        r#"Summarize what this table shows in one or two sentences.
Name the quantities being compared, not the formatting. Use the surrounding text for terminology.

Table:
{}

Surrounding text:
{}"#,
        body, context
    )
}

/// Generate the metadata consolidation prompt.
pub fn merge_metadata_prompt(fragments: &str) -> String {
    format!(
        r#"You are a document analyst. The following metadata fragments were collected from different parts of one document. Consolidate them into a single list.

Output JSON in this exact format:
{{
  "metadata": [
    {{"name": "key", "value": "value"}}
  ]
}}

Rules:
1. Merge keys that mean the same thing under one canonical name
2. When fragments disagree on a value, keep the one the document states most directly
3. Drop keys whose value is unknown or empty
4. Use lowercase snake_case names

Return ONLY valid JSON, no other text.

Fragments:
{}"#,
        fragments
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schemas_are_valid_json_objects() {
        assert!(SECTION_SCHEMA.is_object());
        assert!(METADATA_SCHEMA.is_object());
        assert_eq!(SECTION_SCHEMA["required"][0], "title");
        assert_eq!(METADATA_SCHEMA["properties"]["metadata"]["type"], "array");
    }

    #[test]
    fn test_structure_prompt_embeds_fragment() {
        let prompt = structure_prompt("# Intro\nSome text");
        assert!(prompt.contains("# Intro"));
        assert!(prompt.contains("Return ONLY valid JSON"));
    }

    #[test]
    fn test_caption_prompts_embed_inputs() {
        let prompt = image_caption_prompt("quarterly results chart");
        assert!(prompt.contains("quarterly results chart"));
        let prompt = table_caption_prompt("| a | b |", "revenue by region");
        assert!(prompt.contains("| a | b |"));
        assert!(prompt.contains("revenue by region"));
    }
}
