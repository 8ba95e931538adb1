//! Recording session orchestration
//!
//! The `RecordingController` is the single authority over session phase
//! transitions. It turns start/stop intents into correctly sequenced backend
//! calls (conversation creation, recorder start, recorder stop) and winds the
//! state machine back to a safe phase when a call fails. The presentation
//! layer only ever sees a read-only projection of the phase.

mod controller;
mod phase;

pub use controller::{ControllerError, RecordingController};
pub use phase::{SessionPhase, SessionStatus};
