//! Lenient unwrapping of model JSON output.
//!
//! Schema-constrained calls still come back wrapped in markdown fences or
//! preceded by reasoning text often enough that every structured response
//! goes through here before parsing.

use once_cell::sync::Lazy;
use regex::Regex;

static CODE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^```[a-zA-Z0-9]*\n?([\s\S]*?)\n?```$").unwrap());

static THINK_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<think>.*?</think>").unwrap());

/// Strip a wrapping markdown code fence, if any.
pub fn strip_code_fence(content: &str) -> &str {
    let content = content.trim();
    CODE_FENCE
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .unwrap_or(content)
}

/// Extract the outermost JSON value from free-form model output.
///
/// Removes `<think>` blocks and a wrapping code fence, then takes the span
/// from the first opening brace or bracket to its matching last closer.
/// Text without any JSON-looking span is returned as-is and left to the
/// parser to reject.
pub fn extract_json(content: &str) -> String {
    let without_think = THINK_TAGS.replace_all(content, "");
    let inner = strip_code_fence(without_think.trim());

    let object = inner.find('{').zip(inner.rfind('}'));
    let array = inner.find('[').zip(inner.rfind(']'));
    let span = match (object, array) {
        (Some((obj_start, obj_end)), Some((arr_start, arr_end))) => {
            if arr_start < obj_start {
                (arr_start, arr_end)
            } else {
                (obj_start, obj_end)
            }
        }
        (Some(span), None) => span,
        (None, Some(span)) => span,
        (None, None) => return inner.to_string(),
    };

    if span.0 < span.1 {
        inner[span.0..=span.1].to_string()
    } else {
        inner.to_string()
    }
}
