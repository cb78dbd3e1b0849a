use crate::{
    bridge::{BlockingBridge, Outcome, TokenReceiver, streaming},
    config::{LlmConfig, RelayConfig},
    detection::ErrorDetectionResult,
    llm::{ChatCompletionRequest, LlmClient, OpenAiClient},
    prompt::{GenerationRequest, PromptKind, TemplateStore},
};
use std::sync::Arc;
use tracing::{debug, info};

/// Which extra sections a suggestion request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuggestOptions {
    pub questions: bool,
    pub corrections: bool,
}

impl Default for SuggestOptions {
    fn default() -> Self {
        Self {
            questions: true,
            corrections: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Suggestions {
    pub suggestions: Outcome,
    pub questions: Option<Outcome>,
    pub corrections: Option<Outcome>,
}

pub struct WritingAssistant {
    llm_client: Arc<dyn LlmClient>,
    templates: TemplateStore,
    blocking: BlockingBridge,
    model: String,
    default_temperature: f32,
    max_tokens: Option<u32>,
}

impl WritingAssistant {
    pub fn new(llm_config: &LlmConfig, relay_config: &RelayConfig) -> Self {
        info!(
            "Initializing writing assistant with model {} (timeout {}s)",
            llm_config.model, relay_config.timeout_secs
        );

        let llm_client: Arc<dyn LlmClient> = Arc::new(OpenAiClient::new(llm_config.clone()));
        let mut assistant = Self::with_client(llm_client, llm_config.model.clone())
            .with_timeout(relay_config.timeout())
            .with_temperature(llm_config.temperature)
            .with_max_tokens(llm_config.max_tokens);

        if let Some(system_prompt) = &llm_config.system_prompt {
            assistant.templates = assistant.templates.with_generate_system(system_prompt.clone());
        }

        assistant
    }

    pub fn with_client(llm_client: Arc<dyn LlmClient>, model: impl Into<String>) -> Self {
        Self {
            llm_client,
            templates: TemplateStore::new(),
            blocking: BlockingBridge::default(),
            model: model.into(),
            default_temperature: 0.7,
            max_tokens: None,
        }
    }

    pub fn with_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.blocking = BlockingBridge::new(timeout);
        self
    }

    /// Sampling temperature for free-form generation; styled templates keep their own.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.default_temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn templates(&self) -> &TemplateStore {
        &self.templates
    }

    pub fn build_request(
        &self,
        kind: PromptKind,
        request: &GenerationRequest,
    ) -> ChatCompletionRequest {
        let template = self.templates.get(kind);
        let temperature = match kind {
            PromptKind::Generate => self.default_temperature,
            _ => template.temperature,
        };

        ChatCompletionRequest {
            model: self.model.clone(),
            messages: template.messages(request),
            max_tokens: self.max_tokens,
            temperature: Some(temperature),
        }
    }

    pub async fn run(&self, kind: PromptKind, request: &GenerationRequest) -> Outcome {
        debug!("Running {} prompt (tone: {})", kind, request.tone);
        let completion = self.build_request(kind, request);
        self.blocking
            .call(Arc::clone(&self.llm_client), completion, kind)
            .await
    }

    pub async fn generate(&self, text: &str) -> Outcome {
        self.run(PromptKind::Generate, &GenerationRequest::new(text, None))
            .await
    }

    /// Suggestions, questions and corrections are requested concurrently.
    pub async fn suggest(&self, request: &GenerationRequest, options: SuggestOptions) -> Suggestions {
        let questions = async {
            if options.questions {
                Some(self.run(PromptKind::Question, request).await)
            } else {
                None
            }
        };
        let corrections = async {
            if options.corrections {
                Some(self.run(PromptKind::Correction, request).await)
            } else {
                None
            }
        };

        let (suggestions, questions, corrections) = tokio::join!(
            self.run(PromptKind::Suggestion, request),
            questions,
            corrections
        );

        Suggestions {
            suggestions,
            questions,
            corrections,
        }
    }

    /// A failed model call is reported as the summary of an empty result.
    pub async fn detect_errors(&self, request: &GenerationRequest) -> ErrorDetectionResult {
        match self.run(PromptKind::ErrorDetection, request).await {
            Outcome::Completed(answer) => ErrorDetectionResult::parse(&answer),
            failure => ErrorDetectionResult::unstructured(failure.into_wire()),
        }
    }

    /// Blank input produces a stream holding only the terminal marker.
    pub fn stream(&self, kind: PromptKind, request: &GenerationRequest) -> TokenReceiver {
        if request.is_blank() {
            debug!("Blank input for {} stream, nothing to generate", kind);
            return TokenReceiver::finished();
        }

        debug!("Opening {} stream (tone: {})", kind, request.tone);
        let completion = self.build_request(kind, request);
        streaming::spawn(Arc::clone(&self.llm_client), completion, kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Error, Result,
        bridge::StreamToken,
        llm::{ChatCompletionResponse, ChatMessage, Choice, TokenStream},
    };
    use async_trait::async_trait;
    use futures_util::stream;
    use mockall::{mock, predicate::always};
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    mock! {
        pub Llm {}

        #[async_trait]
        impl LlmClient for Llm {
            async fn create_chat_completion(
                &self,
                request: ChatCompletionRequest,
            ) -> Result<ChatCompletionResponse>;

            async fn create_chat_completion_stream(
                &self,
                request: ChatCompletionRequest,
            ) -> Result<TokenStream>;
        }
    }

    fn response(content: &str) -> ChatCompletionResponse {
        ChatCompletionResponse {
            id: "chatcmpl-test".to_string(),
            model: "gpt-4o-mini".to_string(),
            choices: vec![Choice {
                index: 0,
                message: ChatMessage::assistant(content),
                finish_reason: Some("Stop".to_string()),
            }],
            usage: None,
        }
    }

    fn assistant(mock: MockLlm) -> WritingAssistant {
        WritingAssistant::with_client(Arc::new(mock), "gpt-4o-mini")
            .with_timeout(Duration::from_secs(5))
    }

    #[tokio::test]
    async fn generate_trims_the_model_answer() {
        let mut mock = MockLlm::new();
        mock.expect_create_chat_completion()
            .with(always())
            .times(1)
            .returning(|_| Ok(response("  Extended text.\n")));

        let outcome = assistant(mock).generate("Extend this").await;
        assert_eq!(outcome, Outcome::Completed("Extended text.".to_string()));
    }

    #[tokio::test]
    async fn configured_max_tokens_reach_the_request() {
        let mut mock = MockLlm::new();
        mock.expect_create_chat_completion()
            .withf(|request| request.max_tokens == Some(128))
            .times(1)
            .returning(|_| Ok(response("Shorter.")));

        let outcome = assistant(mock)
            .with_max_tokens(Some(128))
            .run(PromptKind::Correction, &GenerationRequest::new("Long text", None))
            .await;

        assert_eq!(outcome, Outcome::Completed("Shorter.".to_string()));
    }

    #[test]
    fn max_tokens_default_to_provider_limit() {
        let request = assistant(MockLlm::new())
            .build_request(PromptKind::Generate, &GenerationRequest::new("x", None));
        assert_eq!(request.max_tokens, None);
    }

    #[tokio::test]
    async fn detect_errors_reports_failure_in_summary() {
        let mut mock = MockLlm::new();
        mock.expect_create_chat_completion()
            .returning(|_| Err(Error::llm("invalid api key")));

        let result = assistant(mock)
            .detect_errors(&GenerationRequest::new("teh cat", None))
            .await;

        assert!(result.errors.is_empty());
        assert!(result.summary.starts_with("[ERROR] error-detection failed"));
        assert!(result.summary.contains("invalid api key"));
    }

    #[tokio::test]
    async fn suggest_skips_sections_that_were_not_requested() {
        let mut mock = MockLlm::new();
        mock.expect_create_chat_completion()
            .times(1)
            .returning(|_| Ok(response("1. Add an example.")));

        let suggestions = assistant(mock)
            .suggest(
                &GenerationRequest::new("draft", None),
                SuggestOptions {
                    questions: false,
                    corrections: false,
                },
            )
            .await;

        assert_eq!(
            suggestions.suggestions,
            Outcome::Completed("1. Add an example.".to_string())
        );
        assert_eq!(suggestions.questions, None);
        assert_eq!(suggestions.corrections, None);
    }

    #[tokio::test]
    async fn stream_relays_tokens_then_done() {
        let mut mock = MockLlm::new();
        mock.expect_create_chat_completion_stream().returning(|_| {
            let tokens: TokenStream = Box::pin(stream::iter(vec![
                Ok("It".to_string()),
                Ok(" rains".to_string()),
            ]));
            Ok(tokens)
        });

        let tokens = assistant(mock)
            .stream(PromptKind::Prediction, &GenerationRequest::new("Today", None))
            .collect()
            .await;

        assert_eq!(
            tokens,
            vec![
                StreamToken::Token("It".into()),
                StreamToken::Token(" rains".into()),
                StreamToken::Done
            ]
        );
    }

    #[tokio::test]
    async fn blank_stream_input_never_calls_the_model() {
        let mock = MockLlm::new();
        let tokens = assistant(mock)
            .stream(PromptKind::Prediction, &GenerationRequest::new("   ", None))
            .collect()
            .await;

        assert_eq!(tokens, vec![StreamToken::Done]);
    }

    #[test]
    fn build_request_uses_template_temperature_except_for_generate() {
        let assistant = assistant(MockLlm::new()).with_temperature(0.9);
        let request = GenerationRequest::new("text", Some("calm".into()));

        let generate = assistant.build_request(PromptKind::Generate, &request);
        assert_eq!(generate.temperature, Some(0.9));
        assert_eq!(generate.model, "gpt-4o-mini");

        let detect = assistant.build_request(PromptKind::ErrorDetection, &request);
        assert_eq!(detect.temperature, Some(0.2));
        assert!(detect.messages[1].content.contains("calm"));
    }
}
