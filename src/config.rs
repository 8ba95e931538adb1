use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub backend: BackendConfig,
    pub polling: PollingConfig,
    pub conversations: ConversationsConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct BackendConfig {
    pub nats_url: String,
    pub subject_prefix: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct PollingConfig {
    /// Transcript refresh cadence while a poll is enabled.
    pub transcript_interval_ms: u64,
    /// Conversation list refresh cadence.
    pub conversation_interval_ms: u64,
    /// A polled key nobody has read for this long stops polling.
    pub idle_ttl_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct ConversationsConfig {
    /// Page size for conversation list fetches.
    pub page_size: u32,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
