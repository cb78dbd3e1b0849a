use super::{sse::event_stream, types::*};
use crate::{
    assistant::{SuggestOptions, WritingAssistant},
    Error,
    config::Config,
    detection::ErrorDetectionResult,
    input::{LatestInputSlot, PendingInputs},
    prompt::{GenerationRequest, PromptKind},
};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{
        Json,
        sse::{Event, Sse},
    },
};
use futures_util::Stream;
use std::{convert::Infallible, sync::Arc};
use tracing::{info, warn};
use uuid::Uuid;

type ApiError = (StatusCode, Json<ErrorResponse>);

#[derive(Clone)]
pub struct AppState {
    pub assistant: Arc<WritingAssistant>,
    pub latest: Arc<LatestInputSlot>,
    pub pending: Arc<PendingInputs>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        let assistant = WritingAssistant::new(&config.llm, &config.relay);
        Self::with_assistant(assistant, config)
    }

    pub fn with_assistant(assistant: WritingAssistant, config: &Config) -> Self {
        Self {
            assistant: Arc::new(assistant),
            latest: Arc::new(LatestInputSlot::new()),
            pending: Arc::new(PendingInputs::new(
                config.relay.pending_ttl(),
                config.relay.max_pending,
            )),
        }
    }

    /// With an id, the matching submission is consumed; without one, the latest
    /// submission of any client is used.
    fn resolve_input(&self, stream_id: Option<Uuid>) -> Result<GenerationRequest, ApiError> {
        match stream_id {
            Some(id) => self.pending.take(&id).ok_or_else(|| {
                warn!("Stream requested for unknown or expired id {}", id);
                api_error(Error::not_found(format!(
                    "Unknown or expired stream id: {id}"
                )))
            }),
            None => Ok(self.latest.get().into()),
        }
    }

    fn open_stream(
        &self,
        kind: PromptKind,
        query: StreamQuery,
    ) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>> + Send + use<>>, ApiError>
    {
        let request = self.resolve_input(query.stream_id)?;
        info!(
            "Opening {} event stream ({} chars, tone: {})",
            kind,
            request.input_text.chars().count(),
            request.tone
        );
        Ok(event_stream(self.assistant.stream(kind, &request)))
    }
}

fn api_error(error: Error) -> ApiError {
    let status = match &error {
        Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
}

fn require_text(text: &str) -> Result<(), ApiError> {
    if text.trim().is_empty() {
        return Err(api_error(Error::invalid_input("No input text provided")));
    }
    Ok(())
}

pub async fn test_connection() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "Rust backend connected!".to_string(),
    })
}

pub async fn generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    require_text(&request.text)?;
    info!("Received generate request ({} chars)", request.text.chars().count());

    let outcome = state.assistant.generate(&request.text).await;
    Ok(Json(GenerateResponse {
        response: outcome.into_wire(),
    }))
}

pub async fn submit_stream(
    State(state): State<AppState>,
    Json(request): Json<MessageRequest>,
) -> Json<SubmitResponse> {
    let request = GenerationRequest::new(request.message, request.tone);
    state
        .latest
        .set(request.input_text.clone(), request.tone.clone());
    let stream_id = state.pending.submit(request);

    info!("Stored submission {} for streaming", stream_id);
    Json(SubmitResponse {
        status: "ready".to_string(),
        stream_id,
    })
}

pub async fn stream_events(
    State(state): State<AppState>,
    Query(query): Query<StreamQuery>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>> + Send + 'static>, ApiError> {
    state.open_stream(PromptKind::Prediction, query)
}

pub async fn suggest_stream(
    State(state): State<AppState>,
    Query(query): Query<StreamQuery>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>> + Send + 'static>, ApiError> {
    state.open_stream(PromptKind::Suggestion, query)
}

pub async fn suggest_streamed(
    State(state): State<AppState>,
    Query(query): Query<StreamQuery>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>> + Send + 'static>, ApiError> {
    state.open_stream(PromptKind::Question, query)
}

pub async fn suggest(
    State(state): State<AppState>,
    Json(request): Json<SuggestRequest>,
) -> Result<Json<SuggestResponse>, ApiError> {
    require_text(&request.message)?;
    let options = SuggestOptions {
        questions: request.questions,
        corrections: request.corrections,
    };
    let request = GenerationRequest::new(request.message, request.tone);
    info!("Received suggest request (tone: {})", request.tone);

    let suggestions = state.assistant.suggest(&request, options).await;
    Ok(Json(SuggestResponse {
        suggestions: suggestions.suggestions.into_wire(),
        questions: suggestions.questions.map(|o| o.into_wire()),
        corrections: suggestions.corrections.map(|o| o.into_wire()),
    }))
}

pub async fn detect(
    State(state): State<AppState>,
    Json(request): Json<MessageRequest>,
) -> Result<Json<ErrorDetectionResult>, ApiError> {
    require_text(&request.message)?;
    let request = GenerationRequest::new(request.message, request.tone);
    info!("Received detect request (tone: {})", request.tone);

    let result = state.assistant.detect_errors(&request).await;
    info!("Detected {} errors", result.errors.len());
    Ok(Json(result))
}
