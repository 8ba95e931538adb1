use crate::model::{Conversation, ConversationId, Transcript, TranscriptMode};
use async_trait::async_trait;
use thiserror::Error;

/// Failures the backend service can report, plus transport-level failures
/// the client maps into the same taxonomy.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    /// The service could not be reached, or a request timed out.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// The recorder's audio device could not be opened.
    #[error("audio device unavailable: {0}")]
    DeviceUnavailable(String),

    /// The backend already has an active recorder.
    #[error("recorder is already active")]
    AlreadyRecording,

    /// Stop was requested but no recorder is active.
    #[error("no active recorder")]
    NotRecording,

    /// The referenced conversation does not exist.
    #[error("conversation {0} not found")]
    NotFound(ConversationId),

    /// Unclassified backend failure.
    #[error("internal backend error: {0}")]
    Internal(String),
}

/// Client interface to the backend transcription service.
///
/// Each operation is a single request/response pair; the client performs no
/// retries of its own. The controller and the polling cache decide what a
/// failure means for session state.
#[async_trait]
pub trait BackendClient: Send + Sync {
    /// Create a new conversation row; the backend assigns the id.
    async fn create_conversation(&self) -> Result<Conversation, BackendError>;

    /// Start the recorder, attaching captured audio to `conversation_id`.
    async fn start_recorder(&self, conversation_id: ConversationId) -> Result<(), BackendError>;

    /// Stop the recorder for `conversation_id`.
    ///
    /// Idempotent on the backend side; a second stop reports `NotRecording`
    /// rather than corrupting state.
    async fn stop_recorder(&self, conversation_id: ConversationId) -> Result<(), BackendError>;

    /// Fetch the live (partial) or complete transcript for a conversation.
    async fn fetch_transcript(
        &self,
        conversation_id: ConversationId,
        mode: TranscriptMode,
    ) -> Result<Transcript, BackendError>;

    /// List conversations, newest first. Pages are 1-based.
    async fn list_conversations(
        &self,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<Conversation>, BackendError>;

    /// Delete a conversation and its stored transcript.
    async fn delete_conversation(&self, conversation_id: ConversationId)
        -> Result<(), BackendError>;
}
