//! Infrastructure layer: concrete I/O-bound implementations backing the
//! pure logic in `brain-core` — the cache substrate (C1), the durable
//! memory/learning/pattern store (C2), and configuration loading.

pub mod cache;
pub mod config;
pub mod memory_store;

pub use cache::{Cache, RemoteCacheTier};
pub use config::{load_config, load_config_from_env};
pub use memory_store::MemoryStore;
