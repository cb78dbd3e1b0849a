use super::StreamToken;
use crate::{
    llm::{ChatCompletionRequest, LlmClient},
    prompt::PromptKind,
};
use futures_util::{Stream, StreamExt, stream};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Producer half: receives provider tokens and queues them for the consumer.
///
/// `finish` and `fail` consume the sink, so the terminal `Done` is pushed at
/// most once per stream.
pub struct TokenSink {
    tx: mpsc::UnboundedSender<StreamToken>,
    pushed: usize,
}

impl TokenSink {
    fn new(tx: mpsc::UnboundedSender<StreamToken>) -> Self {
        Self { tx, pushed: 0 }
    }

    /// Returns `false` once the consumer has gone away.
    pub fn push(&mut self, token: String) -> bool {
        let delivered = self.tx.send(StreamToken::Token(token)).is_ok();
        if delivered {
            self.pushed += 1;
        }
        delivered
    }

    pub fn pushed(&self) -> usize {
        self.pushed
    }

    pub fn finish(self) {
        let _ = self.tx.send(StreamToken::Done);
    }

    pub fn fail(self, message: impl Into<String>) {
        let _ = self.tx.send(StreamToken::Error(message.into()));
        let _ = self.tx.send(StreamToken::Done);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReceiverState {
    Open,
    Draining,
    Finished,
}

/// Consumer half: yields tokens in producer order and then exactly one `Done`.
///
/// If the producer disappears without finishing, an `Error` followed by `Done`
/// is synthesized so the terminal marker is never missing.
pub struct TokenReceiver {
    rx: mpsc::UnboundedReceiver<StreamToken>,
    state: ReceiverState,
}

impl TokenReceiver {
    fn new(rx: mpsc::UnboundedReceiver<StreamToken>) -> Self {
        Self {
            rx,
            state: ReceiverState::Open,
        }
    }

    /// A stream with nothing to say: its only item is `Done`.
    pub fn finished() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        TokenSink::new(tx).finish();
        Self::new(rx)
    }

    pub async fn next(&mut self) -> Option<StreamToken> {
        match self.state {
            ReceiverState::Finished => None,
            ReceiverState::Draining => {
                self.state = ReceiverState::Finished;
                Some(StreamToken::Done)
            }
            ReceiverState::Open => match self.rx.recv().await {
                Some(StreamToken::Done) => {
                    self.state = ReceiverState::Finished;
                    self.rx.close();
                    Some(StreamToken::Done)
                }
                Some(token) => Some(token),
                None => {
                    self.state = ReceiverState::Draining;
                    Some(StreamToken::Error(
                        "stream worker ended without completing".to_string(),
                    ))
                }
            },
        }
    }

    pub fn into_stream(self) -> impl Stream<Item = StreamToken> + Send + 'static {
        stream::unfold(self, |mut receiver| async move {
            receiver.next().await.map(|token| (token, receiver))
        })
    }

    /// Drains the whole stream. Mostly useful for tests and batch callers.
    pub async fn collect(self) -> Vec<StreamToken> {
        self.into_stream().collect().await
    }
}

/// Starts a streaming completion on a detached task and returns the consumer.
pub fn spawn(
    client: Arc<dyn LlmClient>,
    request: ChatCompletionRequest,
    operation: PromptKind,
) -> TokenReceiver {
    let (tx, rx) = mpsc::unbounded_channel();
    let sink = TokenSink::new(tx);

    tokio::spawn(async move {
        produce(client, request, operation, sink).await;
    });

    TokenReceiver::new(rx)
}

async fn produce(
    client: Arc<dyn LlmClient>,
    request: ChatCompletionRequest,
    operation: PromptKind,
    mut sink: TokenSink,
) {
    let mut tokens = match client.create_chat_completion_stream(request).await {
        Ok(tokens) => tokens,
        Err(e) => {
            warn!("{} stream could not be opened: {}", operation, e);
            sink.fail(format!("{operation} failed: {e}"));
            return;
        }
    };

    while let Some(item) = tokens.next().await {
        match item {
            Ok(token) => {
                if !sink.push(token) {
                    debug!(
                        "{} consumer dropped after {} tokens, stopping",
                        operation,
                        sink.pushed()
                    );
                    return;
                }
            }
            Err(e) => {
                warn!(
                    "{} stream failed after {} tokens: {}",
                    operation,
                    sink.pushed(),
                    e
                );
                sink.fail(format!("{operation} failed: {e}"));
                return;
            }
        }
    }

    debug!("{} stream completed with {} tokens", operation, sink.pushed());
    sink.finish();
}
