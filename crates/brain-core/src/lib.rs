//! Pure business logic for voice selection and response synthesis.
//!
//! This crate has no I/O dependencies; infrastructure concerns (the
//! database, the cache, network calls to MCP servers) live in
//! `brain-infra` and `brain-mcp` and are injected as trait objects where
//! `brain-cognitive` needs them.

pub mod selection;
pub mod synthesis;

pub use selection::*;
pub use synthesis::*;
