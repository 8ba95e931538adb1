use super::phase::{SessionPhase, SessionStatus};
use crate::backend::{BackendClient, BackendError};
use crate::model::ConversationId;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{watch, Mutex, RwLock};
use tracing::{info, warn};

/// Errors reported to callers of `start`/`stop`.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// The requested transition is not valid in the current phase, or an
    /// earlier intent is still resolving. Callers treat this as a bug in the
    /// calling layer, not a backend fault.
    #[error("cannot {intent} while session is {phase}")]
    Precondition {
        intent: &'static str,
        phase: SessionPhase,
    },

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Single authority for recording session phase transitions.
///
/// Exactly one logical actor drives transitions: `start` and `stop` both run
/// under the transition lock, and an intent arriving while another is still
/// resolving is rejected immediately rather than queued. The phase itself is
/// published through a watch channel so readers never contend with an
/// in-flight transition.
pub struct RecordingController {
    backend: Arc<dyn BackendClient>,
    phase_tx: watch::Sender<SessionPhase>,
    transition: Mutex<()>,
    started_at: RwLock<Option<DateTime<Utc>>>,
    last_completed: RwLock<Option<ConversationId>>,
}

impl RecordingController {
    pub fn new(backend: Arc<dyn BackendClient>) -> Self {
        let (phase_tx, _) = watch::channel(SessionPhase::Idle);
        Self {
            backend,
            phase_tx,
            transition: Mutex::new(()),
            started_at: RwLock::new(None),
            last_completed: RwLock::new(None),
        }
    }

    /// Current phase (read-only projection).
    pub fn phase(&self) -> SessionPhase {
        *self.phase_tx.borrow()
    }

    /// Subscribe to phase changes.
    pub fn watch_phase(&self) -> watch::Receiver<SessionPhase> {
        self.phase_tx.subscribe()
    }

    /// The conversation of the most recently completed session.
    pub async fn last_conversation(&self) -> Option<ConversationId> {
        *self.last_completed.read().await
    }

    /// Full status snapshot for the presentation layer.
    pub async fn status(&self) -> SessionStatus {
        let phase = self.phase();
        let started_at = *self.started_at.read().await;
        let duration_secs = started_at.map(|t| {
            Utc::now().signed_duration_since(t).num_milliseconds() as f64 / 1000.0
        });

        SessionStatus {
            phase,
            started_at,
            duration_secs,
            last_conversation_id: *self.last_completed.read().await,
        }
    }

    /// Begin a recording session.
    ///
    /// Only valid from `Idle`. Creates a conversation, then starts the
    /// recorder for it. If the recorder fails to start, the phase returns to
    /// `Idle` and the recorder's own error is reported; the created
    /// conversation is left in place as an audit record, not rolled back.
    pub async fn start(&self) -> Result<ConversationId, ControllerError> {
        let _guard = self.transition.try_lock().map_err(|_| {
            warn!("start rejected: another intent is still resolving");
            ControllerError::Precondition {
                intent: "start",
                phase: self.phase(),
            }
        })?;

        let phase = self.phase();
        if phase != SessionPhase::Idle {
            return Err(ControllerError::Precondition {
                intent: "start",
                phase,
            });
        }

        info!("Starting recording session");

        let conversation = match self.backend.create_conversation().await {
            Ok(c) => c,
            Err(e) => {
                warn!("Conversation creation failed, staying idle: {}", e);
                return Err(e.into());
            }
        };

        let id = conversation.id;
        self.set_phase(SessionPhase::Starting {
            conversation_id: id,
        });

        match self.backend.start_recorder(id).await {
            Ok(()) => {
                *self.started_at.write().await = Some(Utc::now());
                self.set_phase(SessionPhase::Recording {
                    conversation_id: id,
                });
                info!("Recording session started for conversation {}", id);
                Ok(id)
            }
            Err(e) => {
                // The conversation row stays behind; creation and recorder
                // start are independent backend resources.
                warn!(
                    "Recorder start failed for conversation {}, returning to idle: {}",
                    id, e
                );
                self.set_phase(SessionPhase::Idle);
                Err(e.into())
            }
        }
    }

    /// End the recording session.
    ///
    /// Only valid from `Recording`. On success the phase returns to `Idle`
    /// and the conversation id is retained as the last completed session. If
    /// the backend reports `NotRecording` the recorder is already stopped, so
    /// the session is finished all the same. Any other failure reverts to
    /// `Recording` so the caller can retry stop.
    pub async fn stop(&self) -> Result<ConversationId, ControllerError> {
        let _guard = self.transition.try_lock().map_err(|_| {
            warn!("stop rejected: another intent is still resolving");
            ControllerError::Precondition {
                intent: "stop",
                phase: self.phase(),
            }
        })?;

        let phase = self.phase();
        let SessionPhase::Recording { conversation_id } = phase else {
            return Err(ControllerError::Precondition {
                intent: "stop",
                phase,
            });
        };

        info!("Stopping recording session for conversation {}", conversation_id);
        self.set_phase(SessionPhase::Stopping { conversation_id });

        match self.backend.stop_recorder(conversation_id).await {
            Ok(()) => {
                self.finish(conversation_id).await;
                Ok(conversation_id)
            }
            Err(BackendError::NotRecording) => {
                warn!(
                    "Backend reports no active recorder for conversation {}; treating stop as complete",
                    conversation_id
                );
                self.finish(conversation_id).await;
                Ok(conversation_id)
            }
            Err(e) => {
                warn!(
                    "Recorder stop failed for conversation {}, still recording: {}",
                    conversation_id, e
                );
                self.set_phase(SessionPhase::Recording { conversation_id });
                Err(e.into())
            }
        }
    }

    async fn finish(&self, conversation_id: ConversationId) {
        *self.started_at.write().await = None;
        *self.last_completed.write().await = Some(conversation_id);
        self.set_phase(SessionPhase::Idle);
        info!("Recording session stopped for conversation {}", conversation_id);
    }

    fn set_phase(&self, phase: SessionPhase) {
        self.phase_tx.send_replace(phase);
    }
}
