//! Fixed prompt templates keyed by [`PromptKind`].
//!
//! Rendering is plain placeholder substitution: `{input_text}` and `{tone}` in the
//! template body are replaced in a single pass, so placeholder-looking text inside
//! user input is copied through untouched.

mod templates;

use crate::llm::ChatMessage;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt};

/// Tone value asking the model to infer the style from the text.
pub const DEFAULT_TONE: &str = "auto-detect";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PromptKind {
    Generate,
    Suggestion,
    Question,
    Correction,
    ErrorDetection,
    Prediction,
}

impl PromptKind {
    pub const ALL: [PromptKind; 6] = [
        PromptKind::Generate,
        PromptKind::Suggestion,
        PromptKind::Question,
        PromptKind::Correction,
        PromptKind::ErrorDetection,
        PromptKind::Prediction,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PromptKind::Generate => "generate",
            PromptKind::Suggestion => "suggestion",
            PromptKind::Question => "question",
            PromptKind::Correction => "correction",
            PromptKind::ErrorDetection => "error-detection",
            PromptKind::Prediction => "prediction",
        }
    }
}

impl fmt::Display for PromptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User text plus the style hint it should be answered in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub input_text: String,
    pub tone: String,
}

impl GenerationRequest {
    /// A missing or blank tone falls back to [`DEFAULT_TONE`].
    pub fn new(input_text: impl Into<String>, tone: Option<String>) -> Self {
        let tone = tone
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_TONE.to_string());

        Self {
            input_text: input_text.into(),
            tone,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.input_text.trim().is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct PromptTemplate {
    pub kind: PromptKind,
    pub system: String,
    pub body: String,
    pub temperature: f32,
}

impl PromptTemplate {
    pub fn render(&self, input_text: &str, tone: &str) -> String {
        substitute(&self.body, |name| match name {
            "input_text" => Some(input_text),
            "tone" => Some(tone),
            _ => None,
        })
    }

    pub fn messages(&self, request: &GenerationRequest) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(self.system.clone()),
            ChatMessage::user(self.render(&request.input_text, &request.tone)),
        ]
    }
}

/// Load-once, read-only set of templates.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    templates: HashMap<PromptKind, PromptTemplate>,
}

impl TemplateStore {
    pub fn new() -> Self {
        let templates = PromptKind::ALL
            .into_iter()
            .map(|kind| {
                let template = PromptTemplate {
                    kind,
                    system: templates::system_for(kind).to_string(),
                    body: templates::body_for(kind),
                    temperature: templates::temperature_for(kind),
                };
                (kind, template)
            })
            .collect();

        Self { templates }
    }

    /// Replaces the system message of the free-form `generate` template.
    pub fn with_generate_system(mut self, system: impl Into<String>) -> Self {
        if let Some(template) = self.templates.get_mut(&PromptKind::Generate) {
            template.system = system.into();
        }
        self
    }

    pub fn get(&self, kind: PromptKind) -> &PromptTemplate {
        // Every kind is inserted in `new`.
        &self.templates[&kind]
    }

    pub fn render(&self, kind: PromptKind, input_text: &str, tone: &str) -> String {
        self.get(kind).render(input_text, tone)
    }
}

impl Default for TemplateStore {
    fn default() -> Self {
        Self::new()
    }
}

fn substitute<'a>(body: &str, lookup: impl Fn(&str) -> Option<&'a str>) -> String {
    let mut out = String::with_capacity(body.len());
    let mut rest = body;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let replaced = after.find('}').and_then(|close| {
            let name = &after[..close];
            lookup(name).map(|value| (value, close))
        });

        match replaced {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(PromptKind::Suggestion)]
    #[case(PromptKind::Question)]
    #[case(PromptKind::Correction)]
    #[case(PromptKind::ErrorDetection)]
    #[case(PromptKind::Prediction)]
    fn styled_templates_embed_text_and_tone(#[case] kind: PromptKind) {
        let store = TemplateStore::new();
        let prompt = store.render(kind, "The weather is nice today", "formal");

        assert!(prompt.contains("The weather is nice today"));
        assert!(prompt.contains("Requested tone: formal."));
        assert!(!prompt.contains("{input_text}"));
        assert!(!prompt.contains("{tone}"));
    }

    #[rstest]
    #[case(PromptKind::Suggestion)]
    #[case(PromptKind::Prediction)]
    fn empty_text_still_renders(#[case] kind: PromptKind) {
        let prompt = TemplateStore::new().render(kind, "", DEFAULT_TONE);
        assert!(prompt.contains("auto-detect"));
    }

    #[test]
    fn generate_template_is_the_raw_text() {
        let store = TemplateStore::new();
        assert_eq!(store.render(PromptKind::Generate, "hello", DEFAULT_TONE), "hello");
        assert_eq!(
            store.get(PromptKind::Generate).system,
            templates::WRITING_ASSISTANT_SYSTEM
        );
    }

    #[test]
    fn generate_system_can_be_overridden() {
        let store = TemplateStore::new().with_generate_system("Be brief.");
        assert_eq!(store.get(PromptKind::Generate).system, "Be brief.");
        assert_ne!(store.get(PromptKind::Suggestion).system, "Be brief.");
    }

    #[test]
    fn placeholders_inside_user_text_are_not_expanded() {
        let prompt = TemplateStore::new().render(PromptKind::Generate, "say {tone} and {x", "calm");
        assert_eq!(prompt, "say {tone} and {x");
    }

    #[test]
    fn error_detection_template_keeps_json_braces() {
        let prompt = TemplateStore::new().render(PromptKind::ErrorDetection, "teh cat", "casual");
        assert!(prompt.contains(r#"{"errors": [{"original": "...""#));
        assert!(prompt.ends_with("teh cat"));
    }

    #[test]
    fn messages_pair_system_and_rendered_user_prompt() {
        let store = TemplateStore::new();
        let request = GenerationRequest::new("draft", None);
        let messages = store.get(PromptKind::Correction).messages(&request);

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1].role, "user");
        assert!(messages[1].content.contains("auto-detect"));
    }

    #[test]
    fn blank_tone_defaults_to_auto_detect() {
        assert_eq!(GenerationRequest::new("a", Some("  ".into())).tone, DEFAULT_TONE);
        assert_eq!(GenerationRequest::new("a", Some("playful".into())).tone, "playful");
        assert!(GenerationRequest::new(" \n", None).is_blank());
    }
}
