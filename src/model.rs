use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Backend-assigned conversation identifier.
///
/// The client never invents ids; every `ConversationId` in the system
/// originates from a `create_conversation` reply.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ConversationId(pub u32);

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A conversation row as the backend stores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub created_at: DateTime<Utc>,
}

/// Which transcript view to fetch.
///
/// Live transcripts are partial and only meaningful while a recording
/// session for the conversation is active; complete transcripts are the
/// finalized text for a finished conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscriptMode {
    Live,
    Complete,
}

impl fmt::Display for TranscriptMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranscriptMode::Live => write!(f, "live"),
            TranscriptMode::Complete => write!(f, "complete"),
        }
    }
}

/// Cache key for transcript polling: one entry per conversation and mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TranscriptKey {
    pub conversation_id: ConversationId,
    pub mode: TranscriptMode,
}

/// Ordered transcript segments for one conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub segments: Vec<String>,
}

impl Transcript {
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}
