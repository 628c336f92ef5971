//! Transcript port for the answer loop.
//!
//! Every run emits, in order:
//!
//! | event             | payload                                              |
//! |-------------------|------------------------------------------------------|
//! | `retrieval`       | `query`, `passages` (count), `sources`               |
//! | `draft`           | `answer`                                             |
//! | `critique`        | `iteration`, `approved`, `degraded`, `note`          |
//! | `revision`        | `iteration`, `answer`                                |
//! | `revision_failed` | `iteration`, `error`                                 |
//! | `answer`          | `question`, `answer`, `sources`, `critique_passes`, `revisions`, `termination` |
//!
//! `critique` and `revision` repeat once per loop pass. `history_cleared`
//! (empty payload) is emitted outside any run. Operational diagnostics stay
//! on `tracing`.

use serde_json::Value;

/// One transcript entry
pub struct ConversationEvent {
    pub event_type: &'static str,
    pub payload: Value,
}

impl ConversationEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Sink for transcript entries.
///
/// Called inline from the answer loop, so `log` cannot fail or block on
/// anything slow. Implementations swallow their own write errors.
pub trait ConversationLogger: Send + Sync {
    fn log(&self, event: ConversationEvent);
}

/// Discards every event; the default when no transcript is configured.
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}
