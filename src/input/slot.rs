use crate::prompt::{DEFAULT_TONE, GenerationRequest};
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestInput {
    pub message: String,
    pub tone: String,
}

impl Default for LatestInput {
    fn default() -> Self {
        Self {
            message: String::new(),
            tone: DEFAULT_TONE.to_string(),
        }
    }
}

impl From<LatestInput> for GenerationRequest {
    fn from(input: LatestInput) -> Self {
        GenerationRequest::new(input.message, Some(input.tone))
    }
}

/// Process-wide, last-write-wins record of the most recent submission.
///
/// Shared by every client of the process: two browser tabs submitting at once
/// will read each other's text. Clients that need isolation use the stream id
/// handed out by [`super::PendingInputs`].
#[derive(Debug, Default)]
pub struct LatestInputSlot {
    inner: RwLock<LatestInput>,
}

impl LatestInputSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, message: impl Into<String>, tone: impl Into<String>) {
        let value = LatestInput {
            message: message.into(),
            tone: tone.into(),
        };
        // A poisoned lock only means a writer panicked; the pair is still whole.
        match self.inner.write() {
            Ok(mut guard) => *guard = value,
            Err(poisoned) => *poisoned.into_inner() = value,
        }
    }

    pub fn get(&self) -> LatestInput {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}
