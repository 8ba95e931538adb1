use crate::model::ConversationId;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Discrete lifecycle phase of the (single) recording session.
///
/// The conversation id is carried inside the non-idle variants, so "phase
/// left Idle without a conversation" is unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum SessionPhase {
    Idle,
    Starting { conversation_id: ConversationId },
    Recording { conversation_id: ConversationId },
    Stopping { conversation_id: ConversationId },
}

impl SessionPhase {
    /// The conversation this session is attached to, if any.
    pub fn conversation_id(&self) -> Option<ConversationId> {
        match self {
            SessionPhase::Idle => None,
            SessionPhase::Starting { conversation_id }
            | SessionPhase::Recording { conversation_id }
            | SessionPhase::Stopping { conversation_id } => Some(*conversation_id),
        }
    }

    /// True for every phase except `Idle`.
    pub fn is_active(&self) -> bool {
        !matches!(self, SessionPhase::Idle)
    }

    pub fn label(&self) -> &'static str {
        match self {
            SessionPhase::Idle => "idle",
            SessionPhase::Starting { .. } => "starting",
            SessionPhase::Recording { .. } => "recording",
            SessionPhase::Stopping { .. } => "stopping",
        }
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.conversation_id() {
            Some(id) => write!(f, "{}({})", self.label(), id),
            None => write!(f, "{}", self.label()),
        }
    }
}

/// Snapshot of the controller for the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    #[serde(flatten)]
    pub phase: SessionPhase,

    /// When the current session entered `Recording`, if it is active.
    pub started_at: Option<DateTime<Utc>>,

    /// Seconds spent recording so far, if a session is active.
    pub duration_secs: Option<f64>,

    /// The conversation of the most recently completed session, retained so
    /// the caller can navigate to its finished transcript.
    pub last_conversation_id: Option<ConversationId>,
}
