//! Programmable in-memory backend for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use convoscribe::{
    BackendClient, BackendError, Conversation, ConversationId, Transcript, TranscriptMode,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Mock backend with a call log, programmable one-shot failures, and gates
/// that hold a call open until the test releases it.
pub struct MockBackend {
    next_id: AtomicU32,
    calls: Mutex<Vec<String>>,
    conversations: Mutex<Vec<Conversation>>,
    transcripts: Mutex<HashMap<(ConversationId, TranscriptMode), Transcript>>,
    fail_create: Mutex<Option<BackendError>>,
    fail_start: Mutex<Option<BackendError>>,
    fail_stop: Mutex<Option<BackendError>>,
    gate_create: Mutex<Option<Arc<Notify>>>,
    gate_start: Mutex<Option<Arc<Notify>>>,
    gate_stop: Mutex<Option<Arc<Notify>>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU32::new(1),
            calls: Mutex::new(Vec::new()),
            conversations: Mutex::new(Vec::new()),
            transcripts: Mutex::new(HashMap::new()),
            fail_create: Mutex::new(None),
            fail_start: Mutex::new(None),
            fail_stop: Mutex::new(None),
            gate_create: Mutex::new(None),
            gate_start: Mutex::new(None),
            gate_stop: Mutex::new(None),
        }
    }

    /// Force the id the next created conversation will get.
    pub fn set_next_id(&self, id: u32) {
        self.next_id.store(id, Ordering::SeqCst);
    }

    pub fn fail_next_create(&self, err: BackendError) {
        *self.fail_create.lock().unwrap() = Some(err);
    }

    pub fn fail_next_start(&self, err: BackendError) {
        *self.fail_start.lock().unwrap() = Some(err);
    }

    pub fn fail_next_stop(&self, err: BackendError) {
        *self.fail_stop.lock().unwrap() = Some(err);
    }

    /// Make the next `create_conversation` call block until the returned
    /// notify is triggered. The call is logged before it blocks.
    pub fn hold_next_create(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.gate_create.lock().unwrap() = Some(Arc::clone(&notify));
        notify
    }

    pub fn hold_next_start(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.gate_start.lock().unwrap() = Some(Arc::clone(&notify));
        notify
    }

    pub fn hold_next_stop(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.gate_stop.lock().unwrap() = Some(Arc::clone(&notify));
        notify
    }

    pub fn set_transcript(&self, id: ConversationId, mode: TranscriptMode, segments: &[&str]) {
        self.transcripts.lock().unwrap().insert(
            (id, mode),
            Transcript {
                segments: segments.iter().map(|s| s.to_string()).collect(),
            },
        );
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, op: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with(op))
            .count()
    }

    pub fn conversation_count(&self) -> usize {
        self.conversations.lock().unwrap().len()
    }

    fn log(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn take(&self, slot: &Mutex<Option<BackendError>>) -> Option<BackendError> {
        slot.lock().unwrap().take()
    }

    async fn wait_gate(&self, gate: &Mutex<Option<Arc<Notify>>>) {
        let pending = gate.lock().unwrap().take();
        if let Some(notify) = pending {
            notify.notified().await;
        }
    }
}

#[async_trait]
impl BackendClient for MockBackend {
    async fn create_conversation(&self) -> Result<Conversation, BackendError> {
        self.log("create".to_string());
        self.wait_gate(&self.gate_create).await;

        if let Some(err) = self.take(&self.fail_create) {
            return Err(err);
        }

        let conversation = Conversation {
            id: ConversationId(self.next_id.fetch_add(1, Ordering::SeqCst)),
            created_at: Utc::now(),
        };
        self.conversations.lock().unwrap().push(conversation.clone());
        Ok(conversation)
    }

    async fn start_recorder(&self, conversation_id: ConversationId) -> Result<(), BackendError> {
        self.log(format!("start {}", conversation_id));
        self.wait_gate(&self.gate_start).await;

        match self.take(&self.fail_start) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn stop_recorder(&self, conversation_id: ConversationId) -> Result<(), BackendError> {
        self.log(format!("stop {}", conversation_id));
        self.wait_gate(&self.gate_stop).await;

        match self.take(&self.fail_stop) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn fetch_transcript(
        &self,
        conversation_id: ConversationId,
        mode: TranscriptMode,
    ) -> Result<Transcript, BackendError> {
        self.log(format!("transcript {} {}", conversation_id, mode));

        self.transcripts
            .lock()
            .unwrap()
            .get(&(conversation_id, mode))
            .cloned()
            .ok_or(BackendError::NotFound(conversation_id))
    }

    async fn list_conversations(
        &self,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<Conversation>, BackendError> {
        self.log(format!("list {} {}", page, page_size));

        let conversations = self.conversations.lock().unwrap();
        let start = (page.saturating_sub(1) * page_size) as usize;
        Ok(conversations
            .iter()
            .rev()
            .skip(start)
            .take(page_size as usize)
            .cloned()
            .collect())
    }

    async fn delete_conversation(
        &self,
        conversation_id: ConversationId,
    ) -> Result<(), BackendError> {
        self.log(format!("delete {}", conversation_id));

        let mut conversations = self.conversations.lock().unwrap();
        let before = conversations.len();
        conversations.retain(|c| c.id != conversation_id);
        if conversations.len() == before {
            return Err(BackendError::NotFound(conversation_id));
        }
        Ok(())
    }
}

/// Poll until `predicate` holds, or panic after ~1s. The controller's
/// transitions run on spawned tasks in several tests, so assertions on
/// intermediate phases need a grace period.
pub async fn wait_until<F>(mut predicate: F, what: &str)
where
    F: FnMut() -> bool,
{
    for _ in 0..100 {
        if predicate() {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for: {}", what);
}

/// `wait_until` for conditions that must be awaited.
pub async fn wait_until_async<F, Fut>(mut predicate: F, what: &str)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..100 {
        if predicate().await {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for: {}", what);
}
