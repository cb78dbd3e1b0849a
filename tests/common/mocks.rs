use async_trait::async_trait;
use futures_util::stream;
use scribe_relay::{
    Error, Result,
    llm::{
        ChatCompletionRequest, ChatCompletionResponse, ChatMessage, Choice, LlmClient, TokenStream,
    },
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mock LLM client for testing
#[derive(Debug)]
pub struct MockLlmClient {
    pub requests: Arc<Mutex<Vec<ChatCompletionRequest>>>,
    pub reply: String,
    pub error: Option<String>,
    pub delay: Option<Duration>,
    pub tokens: Vec<String>,
    pub stream_error: Option<String>,
    pub open_error: Option<String>,
}

impl MockLlmClient {
    pub fn new() -> Self {
        Self {
            requests: Arc::new(Mutex::new(Vec::new())),
            reply: "mock response".to_string(),
            error: None,
            delay: None,
            tokens: Vec::new(),
            stream_error: None,
            open_error: None,
        }
    }

    pub fn with_reply(mut self, reply: &str) -> Self {
        self.reply = reply.to_string();
        self
    }

    pub fn with_error(mut self, error: &str) -> Self {
        self.error = Some(error.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_tokens(mut self, tokens: &[&str]) -> Self {
        self.tokens = tokens.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_stream_error(mut self, error: &str) -> Self {
        self.stream_error = Some(error.to_string());
        self
    }

    pub fn with_open_error(mut self, error: &str) -> Self {
        self.open_error = Some(error.to_string());
        self
    }

    pub fn get_requests(&self) -> Vec<ChatCompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// User prompts of every recorded request, in call order.
    pub fn user_prompts(&self) -> Vec<String> {
        self.get_requests()
            .into_iter()
            .filter_map(|r| r.messages.into_iter().find(|m| m.role == "user"))
            .map(|m| m.content)
            .collect()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn create_chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse> {
        self.requests.lock().unwrap().push(request);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(ref error) = self.error {
            return Err(Error::llm(error.clone()));
        }

        Ok(create_mock_chat_response(&self.reply))
    }

    async fn create_chat_completion_stream(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<TokenStream> {
        self.requests.lock().unwrap().push(request);

        if let Some(ref error) = self.open_error {
            return Err(Error::llm(error.clone()));
        }

        let mut items: Vec<Result<String>> = self.tokens.iter().cloned().map(Ok).collect();
        if let Some(ref error) = self.stream_error {
            items.push(Err(Error::llm(error.clone())));
        }

        Ok(Box::pin(stream::iter(items)))
    }
}

impl Default for MockLlmClient {
    fn default() -> Self {
        Self::new()
    }
}

pub fn create_mock_chat_response(content: &str) -> ChatCompletionResponse {
    ChatCompletionResponse {
        id: "test-id".to_string(),
        model: "test-model".to_string(),
        choices: vec![Choice {
            index: 0,
            message: ChatMessage::assistant(content),
            finish_reason: Some("Stop".to_string()),
        }],
        usage: None,
    }
}
