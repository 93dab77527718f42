//! Shared data model for the voice collaboration engine (see `SPEC_FULL.md` §3).
//!
//! These are plain data types with no behavior; the algorithms that operate
//! on them live in `brain-core` (pure) and `brain-cognitive`/`brain-mcp`
//! (I/O-bound orchestration).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use uuid::Uuid;

pub type Id = Uuid;
pub type VoiceId = String;
pub type SessionId = String;

// ---------------------------------------------------------------------
// Voices and responses (§3, §4.4, §4.5)
// ---------------------------------------------------------------------

/// Relative weighting of reliability/performance/cost used by the MCP
/// coordinator's server-selection strategy (§4.6).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VoiceWeights {
    pub reliability: f64,
    pub performance: f64,
    pub cost: f64,
}

impl Default for VoiceWeights {
    fn default() -> Self {
        Self {
            reliability: 0.34,
            performance: 0.33,
            cost: 0.33,
        }
    }
}

/// A specialized persona backed by a language-model backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Voice {
    pub id: VoiceId,
    pub display_name: String,
    pub domain: String,
    pub expertise_level: f64,
    pub success_rate: f64,
    pub average_quality: f64,
    pub specializations: HashSet<String>,
    pub preferred_capabilities: Vec<String>,
    pub preferred_servers: Vec<String>,
    pub avoided_servers: Vec<String>,
    pub weights: VoiceWeights,
}

impl Voice {
    /// Returns true if any specialization or the domain mentions `keyword`.
    pub fn matches_keyword(&self, keyword: &str) -> bool {
        let keyword = keyword.to_lowercase();
        self.domain.to_lowercase().contains(&keyword)
            || self
                .specializations
                .iter()
                .any(|s| s.to_lowercase().contains(&keyword))
    }
}

/// A single voice's answer to one prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResponse {
    pub voice_id: VoiceId,
    pub content: String,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    pub tokens_used: Option<u32>,
}

fn default_confidence() -> f64 {
    0.5
}

impl AgentResponse {
    pub fn new(voice_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            voice_id: voice_id.into(),
            content: content.into(),
            confidence: default_confidence(),
            tokens_used: None,
        }
    }
}

/// The fraction of a synthesis this voice's response contributed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceWeight {
    pub voice_id: VoiceId,
    pub weight: f64,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConflictSeverity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceConflict {
    pub id: Id,
    pub topic: String,
    pub voice_a_id: VoiceId,
    pub voice_b_id: VoiceId,
    pub severity: ConflictSeverity,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictAnalysis {
    pub agreement_level: f64,
    pub conflicting_topics: HashSet<String>,
    pub resolution_strategy: ConflictResolution,
    pub conflicts: Vec<VoiceConflict>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub coherence: f64,
    pub completeness: f64,
    pub accuracy: f64,
    pub innovation: f64,
    pub practicality: f64,
    pub overall: f64,
}

impl QualityMetrics {
    pub fn degraded() -> Self {
        Self {
            coherence: 50.0,
            completeness: 50.0,
            accuracy: 50.0,
            innovation: 50.0,
            practicality: 50.0,
            overall: 50.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SynthesisMode {
    Competitive,
    Collaborative,
    Consensus,
    Hierarchical,
    Dialectical,
    Adaptive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeightingStrategy {
    ConfidenceBased,
    ExpertiseBased,
    Balanced,
    PerformanceBased,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConflictResolution {
    MajorityRule,
    ExpertAuthority,
    WeightedAverage,
    Synthesis,
    Dialectical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdaptiveAdjustment {
    pub metric: String,
    pub observed: f64,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisResult {
    pub success: bool,
    pub combined_content: String,
    pub voices_used: Vec<VoiceId>,
    pub confidence: f64,
    pub strategy: SynthesisMode,
    pub quality_metrics: QualityMetrics,
    pub conflict_analysis: ConflictAnalysis,
    pub voice_weights: Vec<VoiceWeight>,
    pub adaptive_adjustments: Option<Vec<AdaptiveAdjustment>>,
    pub timestamp: DateTime<Utc>,
}

// ---------------------------------------------------------------------
// Approval engine (§3, §4.3)
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationType {
    FileRead,
    FileWrite,
    FileDelete,
    CommandExec,
    NetworkAccess,
    GitOperation,
    PackageInstall,
    CodeGeneration,
    FineTuning,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    pub op_type: OperationType,
    pub target: String,
    pub description: String,
    pub metadata: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SandboxMode {
    ReadOnly,
    WorkspaceWrite,
    FullAccess,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationContext {
    pub sandbox_mode: SandboxMode,
    pub workspace_root: String,
    pub user_intent: String,
    pub session_id: SessionId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskFactor {
    pub category: String,
    pub severity: f64,
    pub description: String,
    pub mitigation: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub level: RiskLevel,
    pub score: f64,
    pub factors: Vec<RiskFactor>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApprovalStatus {
    Approved,
    Denied,
    Pending,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalResult {
    pub status: ApprovalStatus,
    pub granted: bool,
    pub reason: String,
    pub auto_approved: Option<bool>,
    pub reviewer_id: Option<String>,
    pub suggestions: Option<Vec<String>>,
}

impl ApprovalResult {
    pub fn denied(reason: impl Into<String>) -> Self {
        Self {
            status: ApprovalStatus::Denied,
            granted: false,
            reason: reason.into(),
            auto_approved: None,
            reviewer_id: None,
            suggestions: None,
        }
    }

    pub fn auto_approved(reason: impl Into<String>) -> Self {
        Self {
            status: ApprovalStatus::Approved,
            granted: true,
            reason: reason.into(),
            auto_approved: Some(true),
            reviewer_id: None,
            suggestions: None,
        }
    }
}

// ---------------------------------------------------------------------
// Memory store (§3, §4.2, §4.7)
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Memory {
    pub id: Id,
    pub key: String,
    pub value: serde_json::Value,
    pub category: String,
    pub project_path: Option<String>,
    pub confidence: f64,
    pub access_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub tags: HashSet<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchOptions {
    pub category: Option<String>,
    pub project_path: Option<String>,
    pub min_confidence: Option<f64>,
    pub tags: Vec<String>,
    pub include_expired: bool,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Learning {
    pub id: Id,
    pub session_id: SessionId,
    pub user_input: String,
    pub intent: String,
    pub tasks_completed: Vec<String>,
    pub success: bool,
    pub duration: Duration,
    pub learnings: Vec<String>,
    pub suggestions: Vec<String>,
    pub project_path: Option<String>,
    pub confidence: f64,
    pub created_at: DateTime<Utc>,
    pub metadata: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pattern {
    pub id: Id,
    pub pattern_type: String,
    pub pattern_data: String,
    pub frequency: u64,
    pub confidence: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

/// Aggregate counts over the `learnings` table (`spec.md` §4.2
/// `getLearningStats()`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningStats {
    pub total_learnings: u64,
    pub successful_learnings: u64,
    pub success_rate: f64,
}

/// Derived analysis over `learnings`/`patterns` (`spec.md` §4.2
/// `getInsights()`): the top intents and patterns by frequency, and a
/// per-day learning count for the last 7 days.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningInsights {
    pub top_intents: Vec<(String, u64)>,
    pub top_patterns: Vec<(String, u64)>,
    pub daily_trend: Vec<(String, u64)>,
}

// ---------------------------------------------------------------------
// Cache substrate (§3, §4.1)
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub value: T,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub access_count: u64,
    pub last_accessed: DateTime<Utc>,
    pub tags: HashSet<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub size: usize,
    pub hit_rate: f64,
    pub memory_estimate_bytes: usize,
}

// ---------------------------------------------------------------------
// MCP coordinator (§3, §4.6)
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MCPConnection {
    pub connection_id: Id,
    pub server_id: String,
    pub server_name: String,
    pub health_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoolStrategy {
    WeightedByResponseTime,
    CapabilityAware,
    Hybrid,
    RoundRobin,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionPool {
    pub pool_id: String,
    pub min_connections: usize,
    pub max_connections: usize,
    pub strategy: PoolStrategy,
    pub affinity_enabled: bool,
    pub affinity_ttl: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitBreakerState {
    pub state: CircuitState,
    pub consecutive_failures: u32,
    pub opened_at: Option<DateTime<Utc>>,
}

impl Default for CircuitBreakerState {
    fn default() -> Self {
        Self {
            state: CircuitState::Closed,
            consecutive_failures: 0,
            opened_at: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackoffStrategy {
    Linear,
    Exponential,
    Adaptive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RetryOn {
    All,
    Timeout,
    ServerError,
    NetworkError,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_strategy: BackoffStrategy,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub retry_on: RetryOn,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_strategy: BackoffStrategy::Exponential,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(10),
            retry_on: RetryOn::All,
        }
    }
}

/// A server discovered by the MCP coordinator, carried in its discovery
/// index (`spec.md` §4.6 "Server selection" step 2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveredServer {
    pub server_id: String,
    pub server_name: String,
    pub capabilities: HashSet<String>,
    pub categories: HashSet<String>,
    pub tags: HashSet<String>,
    pub reliability_score: f64,
    pub performance_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Normal,
    High,
}

/// A single voice's request for one MCP capability (`spec.md` §4.6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MCPVoiceRequest {
    pub request_id: Id,
    pub voice_id: VoiceId,
    pub phase: String,
    pub capability: String,
    pub parameters: HashMap<String, serde_json::Value>,
    pub context: HashMap<String, serde_json::Value>,
    pub priority: Priority,
    pub timeout: Duration,
    pub retry_policy: RetryPolicy,
    pub min_reliability: f64,
    pub max_latency: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MCPVoiceResponse {
    pub request_id: Id,
    pub server_id: String,
    pub success: bool,
    pub result: Option<serde_json::Value>,
    pub error: Option<String>,
    pub execution_time: Duration,
    pub attempts: u32,
}

// ---------------------------------------------------------------------
// Orchestration planner (§3, §4.6)
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolStep {
    pub step_id: String,
    pub voice_id: VoiceId,
    pub capability: String,
    pub parameters: HashMap<String, serde_json::Value>,
    pub dependencies: HashSet<String>,
    pub parallel: bool,
    pub optional: bool,
    pub timeout: Duration,
    pub retry_policy: RetryPolicy,
    pub min_success_rate: f64,
    pub max_response_time: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionStrategy {
    Sequential,
    Parallel,
    Pipeline,
    Adaptive,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataFlowEdge {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FallbackStrategy {
    Retry,
    AlternativeServer,
    AlternativeCapability,
    Skip,
    Fail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestrationPlan {
    pub plan_id: String,
    pub phase: String,
    pub voices: Vec<VoiceId>,
    pub steps: Vec<ToolStep>,
    pub execution_strategy: ExecutionStrategy,
    pub data_flow: Vec<DataFlowEdge>,
    pub synchronization_points: Vec<String>,
    pub fallback_strategies: Vec<FallbackStrategy>,
    pub quality_threshold: f64,
}

// ---------------------------------------------------------------------
// Event surface (§6)
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EngineEvent {
    SynthesisStarted { voices: Vec<VoiceId> },
    ConflictDetected { conflict: VoiceConflict },
    ConflictResolved { topic: String, strategy: ConflictResolution },
    SynthesisCompleted { strategy: SynthesisMode, confidence: f64 },
    AlertCreated { name: String, severity: String },
    AlertAcknowledged { name: String },
    CacheHit { key: String },
    CacheMiss { key: String },
    OrchestrationPlanCreated { plan_id: String },
    OrchestrationPlanCompleted { plan_id: String },
    OrchestrationPlanFailed { plan_id: String, reason: String },
    VoiceMcpSuccess { voice_id: VoiceId, capability: String },
    VoiceMcpError { voice_id: VoiceId, capability: String, error: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub timestamp: DateTime<Utc>,
    pub session_id: Option<SessionId>,
    pub source: String,
    pub event: EngineEvent,
}
