//! Configuration structures for the voice collaboration engine.
//!
//! Every component lists every recognized option explicitly with a
//! `Default` impl, rather than passing ambient duck-typed config objects
//! (`SPEC_FULL.md` §9). `brain-infra::config` merges a TOML file with
//! environment overrides into `EngineConfig`.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub cache: CacheConfig,
    pub memory: MemoryStoreConfig,
    pub approval: ApprovalConfig,
    pub selector: SelectorConfig,
    pub synthesis: SynthesisConfig,
    pub mcp: McpConfig,
    pub analytics: AnalyticsConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            memory: MemoryStoreConfig::default(),
            approval: ApprovalConfig::default(),
            selector: SelectorConfig::default(),
            synthesis: SynthesisConfig::default(),
            mcp: McpConfig::default(),
            analytics: AnalyticsConfig::default(),
        }
    }
}

/// C1 cache substrate configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub max_size: usize,
    pub default_ttl_seconds: u64,
    pub sweep_interval_seconds: u64,
    pub disk_snapshot_dir: Option<String>,
    pub disk_snapshot_interval_seconds: u64,
    pub encryption_key_hex: Option<String>,
    pub enable_compression: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: 1000,
            default_ttl_seconds: 300,
            sweep_interval_seconds: 60,
            disk_snapshot_dir: None,
            disk_snapshot_interval_seconds: 300,
            encryption_key_hex: None,
            enable_compression: false,
        }
    }
}

/// C2 memory store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryStoreConfig {
    pub database_url: String,
    pub low_value_confidence_threshold: f64,
    pub low_value_age_days: i64,
}

impl Default for MemoryStoreConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            low_value_confidence_threshold: 0.3,
            low_value_age_days: 7,
        }
    }
}

/// C3 approval engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalConfig {
    pub confirmation_timeout_seconds: u64,
}

impl Default for ApprovalConfig {
    fn default() -> Self {
        Self {
            confirmation_timeout_seconds: 30,
        }
    }
}

/// C4 voice selector configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    pub max_team_size: usize,
    pub roi_threshold: f64,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            max_team_size: 3,
            roi_threshold: 0.15,
        }
    }
}

/// C5 synthesis engine configuration (mirrors `spec.md` §4.5's per-call config).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisConfig {
    pub mode: crate::domain::SynthesisMode,
    pub quality_threshold: f64,
    pub max_iterations: u32,
    pub weighting_strategy: crate::domain::WeightingStrategy,
    pub conflict_resolution: crate::domain::ConflictResolution,
    pub enable_adaptive_synthesis: bool,
    pub timeout_ms: u64,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            mode: crate::domain::SynthesisMode::Collaborative,
            quality_threshold: 75.0,
            max_iterations: 3,
            weighting_strategy: crate::domain::WeightingStrategy::Balanced,
            conflict_resolution: crate::domain::ConflictResolution::Synthesis,
            enable_adaptive_synthesis: false,
            timeout_ms: 30_000,
        }
    }
}

/// C7/C8 MCP coordinator and orchestration planner configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpConfig {
    pub circuit_breaker_threshold: u32,
    pub half_open_delay_seconds: u64,
    pub max_pool_connections: usize,
}

impl Default for McpConfig {
    fn default() -> Self {
        Self {
            circuit_breaker_threshold: 5,
            half_open_delay_seconds: 30,
            max_pool_connections: 5,
        }
    }
}

/// C9 analytics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    pub sample_interval_seconds: u64,
    pub max_history_entries: usize,
    pub alert_thresholds: AlertThresholds,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            sample_interval_seconds: 5,
            max_history_entries: 720,
            alert_thresholds: AlertThresholds::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertThresholds {
    pub error_rate_percent: f64,
    pub response_time_ms: f64,
    pub cache_hit_rate_floor_percent: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            error_rate_percent: 5.0,
            response_time_ms: 1000.0,
            cache_hit_rate_floor_percent: 50.0,
        }
    }
}

pub fn duration_seconds(seconds: u64) -> Duration {
    Duration::from_secs(seconds)
}
