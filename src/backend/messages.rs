//! JSON wire messages for the NATS request/reply boundary.

use crate::backend::BackendError;
use crate::model::{Conversation, ConversationId, TranscriptMode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request envelope: every request carries a correlation id so backend logs
/// can be matched to client logs.
#[derive(Debug, Serialize, Deserialize)]
pub struct Request<T> {
    pub request_id: Uuid,
    #[serde(flatten)]
    pub body: T,
}

impl<T> Request<T> {
    pub fn new(body: T) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            body,
        }
    }
}

/// Reply envelope sent by the backend.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "status", content = "body", rename_all = "snake_case")]
pub enum Reply<T> {
    Ok(T),
    Error(WireError),
}

/// Error payload inside an error reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireError {
    pub kind: WireErrorKind,
    pub message: String,
}

/// Error kinds the backend reports on the wire.
///
/// Transport failures (connection refused, timeout) never appear here; the
/// client maps those to `BackendError::Unavailable` itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireErrorKind {
    DeviceUnavailable,
    AlreadyRecording,
    NotRecording,
    NotFound,
    Internal,
}

impl WireError {
    /// Map a wire error to the client-side taxonomy. `conversation_id` is
    /// the id the failed request referred to, when it referred to one.
    pub fn into_backend_error(self, conversation_id: Option<ConversationId>) -> BackendError {
        match self.kind {
            WireErrorKind::DeviceUnavailable => BackendError::DeviceUnavailable(self.message),
            WireErrorKind::AlreadyRecording => BackendError::AlreadyRecording,
            WireErrorKind::NotRecording => BackendError::NotRecording,
            // A not_found with no conversation in the request has no id to
            // report; surface the wire message instead of inventing one.
            WireErrorKind::NotFound => match conversation_id {
                Some(id) => BackendError::NotFound(id),
                None => BackendError::Internal(self.message),
            },
            WireErrorKind::Internal => BackendError::Internal(self.message),
        }
    }
}

// ============================================================================
// Request bodies
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateConversationRequest {}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecorderRequest {
    pub conversation_id: ConversationId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TranscriptRequest {
    pub conversation_id: ConversationId,
    pub mode: TranscriptMode,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListConversationsRequest {
    pub page: u32,
    pub page_size: u32,
}

// ============================================================================
// Reply bodies
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct ConversationReply {
    pub id: ConversationId,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<ConversationReply> for Conversation {
    fn from(reply: ConversationReply) -> Self {
        Conversation {
            id: reply.id,
            created_at: reply.created_at,
        }
    }
}

/// Recorder start/stop acknowledgement carries no data.
#[derive(Debug, Serialize, Deserialize)]
pub struct Ack {}

/// Transcript reply; the field is named `full_text` on the wire.
#[derive(Debug, Serialize, Deserialize)]
pub struct TranscriptReply {
    pub full_text: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConversationListReply {
    pub conversations: Vec<ConversationReply>,
}
