//! HTTP API for the presentation layer
//!
//! The UI talks to the orchestrator over this REST surface:
//! - POST /recordings/start - Begin a recording session
//! - POST /recordings/stop - End the recording session
//! - GET /recordings/status - Current session phase
//! - GET /conversations - Conversation list (via the polling cache)
//! - DELETE /conversations/:id - Delete a conversation
//! - GET /conversations/:id/transcript - Live or complete transcript snapshot
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
