use super::MockLlmClient;
use axum::Router;
use scribe_relay::{
    assistant::WritingAssistant,
    config::{Config, LlmConfig, LogsConfig, RelayConfig, ServerConfig},
    server::{self, AppState},
};
use std::{sync::Arc, time::Duration};

/// Create a test configuration with sensible defaults
pub fn create_test_config() -> Config {
    Config {
        llm: LlmConfig {
            api_key: "test-key".to_string(),
            ..LlmConfig::default()
        },
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 5000,
            logs: LogsConfig {
                level: "debug".to_string(),
            },
            ..ServerConfig::default()
        },
        relay: RelayConfig {
            timeout_secs: 5,
            ..RelayConfig::default()
        },
    }
}

pub fn create_test_state(mock: Arc<MockLlmClient>, timeout: Duration) -> AppState {
    let config = create_test_config();
    let assistant = WritingAssistant::with_client(mock, config.llm.model.clone()).with_timeout(timeout);
    AppState::with_assistant(assistant, &config)
}

/// Router backed by the given mock, returned together with the shared mock.
pub fn create_test_app(mock: MockLlmClient) -> (Router, Arc<MockLlmClient>) {
    create_test_app_with_timeout(mock, Duration::from_secs(5))
}

pub fn create_test_app_with_timeout(
    mock: MockLlmClient,
    timeout: Duration,
) -> (Router, Arc<MockLlmClient>) {
    let mock = Arc::new(mock);
    let state = create_test_state(Arc::clone(&mock), timeout);
    (server::router(state), mock)
}

/// Decodes an SSE body the way a browser `EventSource` would: one payload per
/// event, multi-line data joined with `\n`, comments ignored.
pub fn parse_sse_payloads(body: &str) -> Vec<String> {
    body.split("\n\n")
        .filter_map(|block| {
            let lines: Vec<&str> = block
                .lines()
                .filter_map(|line| line.strip_prefix("data:"))
                .map(|value| value.strip_prefix(' ').unwrap_or(value))
                .collect();
            (!lines.is_empty()).then(|| lines.join("\n"))
        })
        .collect()
}
