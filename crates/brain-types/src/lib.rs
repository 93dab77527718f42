//! Shared types, error definitions, and configuration for the voice
//! collaboration engine, used across all workspace crates.

pub mod common;
pub mod config;
pub mod domain;
pub mod error;

// Re-export everything for easy access
pub use common::*;
pub use config::*;
pub use domain::*;
pub use error::*;
