//! C7 MCP voice-tool coordinator: capability→server discovery, connection
//! pools with load balancing and affinity, a circuit breaker, and
//! retry/backoff around each dispatched request (`SPEC_FULL.md` §4.6).

pub mod circuit;
pub mod coordinator;
pub mod pool;
pub mod registry;

pub use circuit::CircuitBreaker;
pub use coordinator::{McpCoordinator, ServerCaller};
pub use pool::PoolManager;
pub use registry::DiscoveryIndex;
