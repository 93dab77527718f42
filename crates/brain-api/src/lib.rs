//! Ambient stack glue for the voice collaboration engine: the typed event
//! bus and tracing/logging initialization (`SPEC_FULL.md` §2). No HTTP, CLI,
//! or TUI surface lives here — those are product decisions left to whatever
//! binary embeds this engine.

pub mod events;
pub mod logging;

pub use events::EventBus;
pub use logging::{init_tracing, LoggingConfig};
