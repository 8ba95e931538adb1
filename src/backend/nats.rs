use super::client::{BackendClient, BackendError};
use super::messages::{
    Ack, ConversationListReply, ConversationReply, CreateConversationRequest,
    ListConversationsRequest, RecorderRequest, Reply, Request, TranscriptReply, TranscriptRequest,
};
use crate::model::{Conversation, ConversationId, Transcript, TranscriptMode};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Connection settings for the NATS-backed client.
#[derive(Debug, Clone)]
pub struct NatsBackendConfig {
    pub url: String,
    /// Subject prefix, e.g. "recorder" -> "recorder.conversation.create".
    pub subject_prefix: String,
    /// A request that has not resolved within this bound is treated as
    /// failed and reported as `Unavailable`.
    pub request_timeout: Duration,
}

impl Default for NatsBackendConfig {
    fn default() -> Self {
        Self {
            url: "nats://localhost:4222".to_string(),
            subject_prefix: "recorder".to_string(),
            request_timeout: Duration::from_secs(15),
        }
    }
}

/// Production `BackendClient` speaking JSON request/reply over NATS.
pub struct NatsBackendClient {
    client: async_nats::Client,
    config: NatsBackendConfig,
}

impl NatsBackendClient {
    /// Connect to the NATS server named in `config`.
    pub async fn connect(config: NatsBackendConfig) -> anyhow::Result<Self> {
        info!("Connecting to backend via NATS at {}", config.url);

        let client = async_nats::connect(config.url.as_str()).await?;

        info!("Connected to NATS successfully");

        Ok(Self { client, config })
    }

    fn subject(&self, op: &str) -> String {
        format!("{}.{}", self.config.subject_prefix, op)
    }

    /// Issue one request and decode the reply envelope.
    ///
    /// Transport errors, timeouts, and undecodable replies all surface as
    /// `Unavailable`/`Internal`; wire-reported errors are mapped through
    /// `WireError::into_backend_error`.
    async fn request<Req, Resp>(
        &self,
        op: &str,
        body: Req,
        conversation_id: Option<ConversationId>,
    ) -> Result<Resp, BackendError>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let subject = self.subject(op);
        let request = Request::new(body);
        let payload = serde_json::to_vec(&request)
            .map_err(|e| BackendError::Internal(format!("failed to encode request: {}", e)))?;

        debug!(%subject, request_id = %request.request_id, "Issuing backend request");

        let response = tokio::time::timeout(
            self.config.request_timeout,
            self.client.request(subject.clone(), payload.into()),
        )
        .await
        .map_err(|_| {
            warn!(%subject, request_id = %request.request_id, "Backend request timed out");
            BackendError::Unavailable(format!("request to {} timed out", subject))
        })?
        .map_err(|e| BackendError::Unavailable(e.to_string()))?;

        let reply: Reply<Resp> = serde_json::from_slice(&response.payload)
            .map_err(|e| BackendError::Internal(format!("failed to decode reply: {}", e)))?;

        match reply {
            Reply::Ok(resp) => Ok(resp),
            Reply::Error(err) => Err(err.into_backend_error(conversation_id)),
        }
    }
}

#[async_trait]
impl BackendClient for NatsBackendClient {
    async fn create_conversation(&self) -> Result<Conversation, BackendError> {
        let reply: ConversationReply = self
            .request("conversation.create", CreateConversationRequest {}, None)
            .await?;

        info!("Backend created conversation {}", reply.id);
        Ok(reply.into())
    }

    async fn start_recorder(&self, conversation_id: ConversationId) -> Result<(), BackendError> {
        let _: Ack = self
            .request(
                "recorder.start",
                RecorderRequest { conversation_id },
                Some(conversation_id),
            )
            .await?;

        info!("Backend recorder started for conversation {}", conversation_id);
        Ok(())
    }

    async fn stop_recorder(&self, conversation_id: ConversationId) -> Result<(), BackendError> {
        let _: Ack = self
            .request(
                "recorder.stop",
                RecorderRequest { conversation_id },
                Some(conversation_id),
            )
            .await?;

        info!("Backend recorder stopped for conversation {}", conversation_id);
        Ok(())
    }

    async fn fetch_transcript(
        &self,
        conversation_id: ConversationId,
        mode: TranscriptMode,
    ) -> Result<Transcript, BackendError> {
        let reply: TranscriptReply = self
            .request(
                "transcript.get",
                TranscriptRequest {
                    conversation_id,
                    mode,
                },
                Some(conversation_id),
            )
            .await?;

        Ok(Transcript {
            segments: reply.full_text,
        })
    }

    async fn list_conversations(
        &self,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<Conversation>, BackendError> {
        let reply: ConversationListReply = self
            .request(
                "conversation.list",
                ListConversationsRequest { page, page_size },
                None,
            )
            .await?;

        Ok(reply.conversations.into_iter().map(Into::into).collect())
    }

    async fn delete_conversation(
        &self,
        conversation_id: ConversationId,
    ) -> Result<(), BackendError> {
        let _: Ack = self
            .request(
                "conversation.delete",
                RecorderRequest { conversation_id },
                Some(conversation_id),
            )
            .await?;

        info!("Backend deleted conversation {}", conversation_id);
        Ok(())
    }
}
