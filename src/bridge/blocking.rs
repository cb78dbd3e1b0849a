use super::Outcome;
use crate::{
    llm::{ChatCompletionRequest, LlmClient},
    prompt::PromptKind,
};
use std::{sync::Arc, time::Duration};
use tokio::time;
use tracing::{debug, warn};

/// Runs a full (non-streaming) completion on its own task and gives up after a
/// fixed timeout. Never returns an error: every failure becomes an [`Outcome`].
#[derive(Debug, Clone, Copy)]
pub struct BlockingBridge {
    timeout: Duration,
}

impl BlockingBridge {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn call(
        &self,
        client: Arc<dyn LlmClient>,
        request: ChatCompletionRequest,
        operation: PromptKind,
    ) -> Outcome {
        let worker = tokio::spawn(async move { client.create_chat_completion(request).await });
        let abort = worker.abort_handle();

        match time::timeout(self.timeout, worker).await {
            Ok(Ok(Ok(response))) => match response.first_content() {
                Some(content) => {
                    debug!("{} completed with {} bytes", operation, content.len());
                    Outcome::Completed(content.trim().to_string())
                }
                None => Outcome::Failed {
                    operation,
                    reason: "model returned no choices".to_string(),
                },
            },
            Ok(Ok(Err(e))) => {
                warn!("{} failed: {}", operation, e);
                Outcome::Failed {
                    operation,
                    reason: e.to_string(),
                }
            }
            Ok(Err(join_error)) => {
                warn!("{} worker did not finish: {}", operation, join_error);
                Outcome::Failed {
                    operation,
                    reason: format!("worker stopped unexpectedly: {join_error}"),
                }
            }
            Err(_) => {
                // The answer could only be discarded now.
                abort.abort();
                warn!("{} timed out after {:?}", operation, self.timeout);
                Outcome::TimedOut { operation }
            }
        }
    }
}

impl Default for BlockingBridge {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TIMEOUT)
    }
}
