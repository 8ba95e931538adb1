use crate::backend::BackendClient;
use crate::cache::PollingCache;
use crate::controller::RecordingController;
use crate::model::{Conversation, Transcript, TranscriptKey};
use std::sync::Arc;
use std::time::Duration;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Single source of truth for session phase
    pub controller: Arc<RecordingController>,

    /// Backend service client (also used by the cache fetchers)
    pub backend: Arc<dyn BackendClient>,

    /// Transcript polls, keyed by conversation id + mode
    pub transcripts: Arc<PollingCache<TranscriptKey, Transcript>>,

    /// Conversation list polls, keyed by page number
    pub conversations: Arc<PollingCache<u32, Vec<Conversation>>>,

    /// Page size for conversation list fetches
    pub page_size: u32,
}

impl AppState {
    pub fn new(
        backend: Arc<dyn BackendClient>,
        transcript_interval: Duration,
        conversation_interval: Duration,
        idle_ttl: Duration,
        page_size: u32,
    ) -> Self {
        Self {
            controller: Arc::new(RecordingController::new(Arc::clone(&backend))),
            backend,
            transcripts: Arc::new(PollingCache::new(transcript_interval, idle_ttl)),
            conversations: Arc::new(PollingCache::new(conversation_interval, idle_ttl)),
            page_size,
        }
    }
}
