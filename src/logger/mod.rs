//! Append-only JSONL event log with graceful degradation.
//!
//! A sink never fails the session: write problems are counted and dropped.

pub mod events;
pub mod jsonl;

pub use events::SessionEvent;
pub use jsonl::JsonlLogger;

/// Destination for session events.
pub trait EventSink {
    /// Record one event. Must not panic and must not block on user input.
    fn record(&mut self, event: &SessionEvent);

    /// Events that could not be written.
    fn dropped(&self) -> u64 {
        0
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLogger;

impl EventSink for NullLogger {
    fn record(&mut self, _event: &SessionEvent) {}
}

/// In-memory sink, handy for asserting on the event stream.
impl EventSink for Vec<SessionEvent> {
    fn record(&mut self, event: &SessionEvent) {
        self.push(event.clone());
    }
}
