//! Best-effort parsing of the model's error-detection answer.
//!
//! The model is asked for pure JSON but often wraps it in prose or code fences.
//! Parsing tries the whole answer, then the first balanced `{...}` span, and
//! finally degrades to a summary-only result. It never fails.

use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedError {
    #[serde(default)]
    pub original: String,
    #[serde(default)]
    pub corrected: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetectionResult {
    #[serde(default)]
    pub errors: Vec<DetectedError>,
    #[serde(default)]
    pub summary: String,
}

impl ErrorDetectionResult {
    pub fn unstructured(summary: impl Into<String>) -> Self {
        Self {
            errors: Vec::new(),
            summary: summary.into(),
        }
    }

    pub fn parse(raw: &str) -> Self {
        if let Ok(result) = serde_json::from_str::<Self>(raw.trim()) {
            return result;
        }

        if let Some(span) = first_object_span(raw) {
            match serde_json::from_str::<Self>(span) {
                Ok(result) => return result,
                Err(e) => debug!("Embedded JSON object did not parse: {}", e),
            }
        }

        debug!("Falling back to unstructured error-detection summary");
        Self::unstructured(raw)
    }
}

/// First top-level `{...}` span, with braces inside string literals ignored.
fn first_object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    None
}
