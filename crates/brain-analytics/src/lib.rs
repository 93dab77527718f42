//! Rolling analytics and alerting over the engine's cache, latency, and
//! error-rate signals (C9).

pub mod metrics;

pub use metrics::{Alert, AlertSeverity, AnalyticsEngine, RollingWindow, SystemSnapshot};
