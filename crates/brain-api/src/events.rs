//! Typed event bus over the engine's event surface (`SPEC_FULL.md` §6).
//!
//! Every component that wants to announce something it did — synthesis
//! finishing, a circuit tripping, an orchestration plan failing — builds an
//! `EngineEvent` and hands it to `EventBus::emit`. Emission never blocks and
//! never fails: a subscriber that falls behind simply misses older events,
//! per `tokio::sync::broadcast`'s lagged-receiver semantics.

use brain_types::domain::{EngineEvent, EventEnvelope};
use brain_types::SessionId;
use chrono::Utc;
use tokio::sync::broadcast;

const DEFAULT_CAPACITY: usize = 1024;

pub struct EventBus {
    sender: broadcast::Sender<EventEnvelope>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Wrap `event` in an envelope stamped with `source` and the current
    /// time, and broadcast it. Dropped silently if there are no subscribers.
    pub fn emit(&self, source: &str, session_id: Option<SessionId>, event: EngineEvent) {
        let envelope = EventEnvelope { timestamp: Utc::now(), session_id, source: source.to_string(), event };
        let _ = self.sender.send(envelope);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
