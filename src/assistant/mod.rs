mod service;

pub use service::{SuggestOptions, Suggestions, WritingAssistant};
