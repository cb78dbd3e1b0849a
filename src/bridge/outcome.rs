use crate::prompt::PromptKind;

/// Prefix marking in-band failure text on the wire.
pub const ERROR_MARKER: &str = "[ERROR]";
/// Terminal payload of every event stream.
pub const DONE_MARKER: &str = "[DONE]";

/// Result of a blocking model call. Only [`Outcome::into_wire`] knows about the
/// string-prefix convention.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Completed(String),
    TimedOut { operation: PromptKind },
    Failed { operation: PromptKind, reason: String },
}

impl Outcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed(_))
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Outcome::Completed(text) => Some(text),
            _ => None,
        }
    }

    pub fn into_wire(self) -> String {
        match self {
            Outcome::Completed(text) => text,
            Outcome::TimedOut { operation } => {
                format!("{ERROR_MARKER} {operation}: no response from the model (timed out)")
            }
            Outcome::Failed { operation, reason } => {
                format!("{ERROR_MARKER} {operation} failed: {reason}")
            }
        }
    }
}

/// One item delivered by the streaming bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamToken {
    Token(String),
    Error(String),
    Done,
}

impl StreamToken {
    pub fn is_done(&self) -> bool {
        matches!(self, StreamToken::Done)
    }

    pub fn into_payload(self) -> String {
        match self {
            StreamToken::Token(value) => value,
            StreamToken::Error(message) => format!("{ERROR_MARKER} {message}"),
            StreamToken::Done => DONE_MARKER.to_string(),
        }
    }
}
