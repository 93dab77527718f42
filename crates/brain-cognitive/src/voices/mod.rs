//! Voice archetypes, the registry holding them, and the trait that backs
//! one with a model (`SPEC_FULL.md` §4.4).

pub mod backend;
pub mod builtin;
pub mod registry;

pub use backend::{EchoBackend, VoiceBackend};
pub use builtin::default_voices;
pub use registry::VoiceRegistry;
