//! Backend transcription service client
//!
//! The backend is an opaque service reached over NATS request/reply. This
//! module defines the client trait the rest of the crate programs against,
//! the error taxonomy the backend can report, the JSON wire messages, and
//! the production NATS implementation.

mod client;
pub mod messages;
mod nats;

pub use client::{BackendClient, BackendError};
pub use nats::{NatsBackendClient, NatsBackendConfig};
