use super::state::AppState;
use crate::backend::{BackendClient, BackendError};
use crate::controller::{ControllerError, SessionPhase};
use crate::model::{Conversation, ConversationId, TranscriptKey, TranscriptMode};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct RecordingResponse {
    pub conversation_id: ConversationId,
    pub phase: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// 1-based page number
    pub page: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ConversationListResponse {
    pub conversations: Vec<Conversation>,
    pub is_loading: bool,
    pub is_error: bool,
}

#[derive(Debug, Deserialize)]
pub struct TranscriptQuery {
    pub mode: TranscriptMode,
}

#[derive(Debug, Serialize)]
pub struct TranscriptResponse {
    /// `None` until the first fetch for this key has completed.
    pub segments: Option<Vec<String>>,
    pub is_loading: bool,
    pub is_error: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
        .into_response()
}

fn backend_error_status(e: &BackendError) -> StatusCode {
    match e {
        BackendError::Unavailable(_) => StatusCode::BAD_GATEWAY,
        BackendError::NotFound(_) => StatusCode::NOT_FOUND,
        BackendError::DeviceUnavailable(_)
        | BackendError::AlreadyRecording
        | BackendError::NotRecording => StatusCode::CONFLICT,
        BackendError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn controller_error_response(e: ControllerError) -> Response {
    let status = match &e {
        ControllerError::Precondition { .. } => StatusCode::CONFLICT,
        ControllerError::Backend(backend) => backend_error_status(backend),
    };
    error_response(status, e.to_string())
}

/// Fetcher closure for transcript polling; clones the backend handle per call.
fn transcript_fetcher(
    backend: Arc<dyn BackendClient>,
) -> impl Fn(TranscriptKey) -> std::pin::Pin<
    Box<dyn std::future::Future<Output = Result<crate::model::Transcript, BackendError>> + Send>,
> + Send
       + Sync
       + 'static {
    move |key: TranscriptKey| {
        let backend = Arc::clone(&backend);
        Box::pin(async move { backend.fetch_transcript(key.conversation_id, key.mode).await })
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /recordings/start
/// Begin a recording session: create a conversation, start the recorder
pub async fn start_recording(State(state): State<AppState>) -> Response {
    match state.controller.start().await {
        Ok(conversation_id) => {
            // Live transcript polling follows the session
            let key = TranscriptKey {
                conversation_id,
                mode: TranscriptMode::Live,
            };
            state
                .transcripts
                .enable(key, transcript_fetcher(Arc::clone(&state.backend)))
                .await;

            info!("Recording started for conversation {}", conversation_id);

            (
                StatusCode::OK,
                Json(RecordingResponse {
                    conversation_id,
                    phase: "recording",
                }),
            )
                .into_response()
        }
        Err(e) => controller_error_response(e),
    }
}

/// POST /recordings/stop
/// End the recording session
pub async fn stop_recording(State(state): State<AppState>) -> Response {
    match state.controller.stop().await {
        Ok(conversation_id) => {
            // The live poll is meaningless once the session is idle
            let key = TranscriptKey {
                conversation_id,
                mode: TranscriptMode::Live,
            };
            state.transcripts.disable(&key).await;

            info!("Recording stopped for conversation {}", conversation_id);

            (
                StatusCode::OK,
                Json(RecordingResponse {
                    conversation_id,
                    phase: "idle",
                }),
            )
                .into_response()
        }
        Err(e) => controller_error_response(e),
    }
}

/// GET /recordings/status
/// Current session phase and timing
pub async fn get_status(State(state): State<AppState>) -> Response {
    (StatusCode::OK, Json(state.controller.status().await)).into_response()
}

/// GET /conversations?page=1
/// Conversation list, refreshed through the polling cache
pub async fn list_conversations(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Response {
    let page = query.page.unwrap_or(1);
    let page_size = state.page_size;

    let backend = Arc::clone(&state.backend);
    state
        .conversations
        .enable(page, move |page| {
            let backend = Arc::clone(&backend);
            async move { backend.list_conversations(page, page_size).await }
        })
        .await;

    let snapshot = state.conversations.snapshot(&page).await;

    (
        StatusCode::OK,
        Json(ConversationListResponse {
            conversations: snapshot.data.unwrap_or_default(),
            is_loading: snapshot.is_loading,
            is_error: snapshot.is_error,
        }),
    )
        .into_response()
}

/// DELETE /conversations/:id
/// Delete a conversation and stop any transcript polls for it
pub async fn delete_conversation(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Response {
    let conversation_id = ConversationId(id);

    if let Err(e) = state.backend.delete_conversation(conversation_id).await {
        return error_response(backend_error_status(&e), e.to_string());
    }

    for mode in [TranscriptMode::Live, TranscriptMode::Complete] {
        state
            .transcripts
            .disable(&TranscriptKey {
                conversation_id,
                mode,
            })
            .await;
    }

    info!("Deleted conversation {}", conversation_id);

    StatusCode::NO_CONTENT.into_response()
}

/// GET /conversations/:id/transcript?mode=live|complete
/// Snapshot of the polled transcript for a conversation
pub async fn get_transcript(
    State(state): State<AppState>,
    Path(id): Path<u32>,
    Query(query): Query<TranscriptQuery>,
) -> Response {
    let conversation_id = ConversationId(id);

    // Live transcripts only exist while this conversation's session is
    // starting or recording.
    if query.mode == TranscriptMode::Live {
        let phase = state.controller.phase();
        let live_for = match phase {
            SessionPhase::Starting { conversation_id } | SessionPhase::Recording { conversation_id } => {
                Some(conversation_id)
            }
            _ => None,
        };
        if live_for != Some(conversation_id) {
            return error_response(
                StatusCode::CONFLICT,
                format!(
                    "no live transcript for conversation {} (session is {})",
                    conversation_id, phase
                ),
            );
        }
    }

    let key = TranscriptKey {
        conversation_id,
        mode: query.mode,
    };

    state
        .transcripts
        .enable(key, transcript_fetcher(Arc::clone(&state.backend)))
        .await;

    let snapshot = state.transcripts.snapshot(&key).await;

    (
        StatusCode::OK,
        Json(TranscriptResponse {
            segments: snapshot.data.map(|t| t.segments),
            is_loading: snapshot.is_loading,
            is_error: snapshot.is_error,
        }),
    )
        .into_response()
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
