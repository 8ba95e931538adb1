pub mod backend;
pub mod cache;
pub mod config;
pub mod controller;
pub mod http;
pub mod model;

pub use backend::{BackendClient, BackendError, NatsBackendClient, NatsBackendConfig};
pub use cache::{CacheSnapshot, PollingCache};
pub use config::Config;
pub use controller::{ControllerError, RecordingController, SessionPhase, SessionStatus};
pub use http::{create_router, AppState};
pub use model::{Conversation, ConversationId, Transcript, TranscriptKey, TranscriptMode};
