//! C8 orchestration planner: builds a `ToolStep` DAG for a phase and runs
//! it under one of four execution strategies (`spec.md` §4.6). Execution
//! is generic over a `StepExecutor` trait rather than a concrete MCP
//! client — `brain-mcp::coordinator::handleRequest` is the production
//! implementation, wired in by `brain-cli`/`brain-api`, since this crate
//! does not depend on `brain-mcp` (`SPEC_FULL.md` §2 workspace layout).
//!
//! Naming follows the teacher's `AgentDAG`/`DAGExecutor` structure,
//! retargeted at `ToolStep`/`OrchestrationPlan` from the voice-tool domain.

use async_trait::async_trait;
use brain_types::domain::{
    DataFlowEdge, ExecutionStrategy, FallbackStrategy, OrchestrationPlan, ToolStep, Voice, VoiceId,
};
use brain_types::{BrainError, BrainResult};
use std::collections::{HashMap, HashSet};
use std::time::Duration;

/// A single required capability for a phase; one `ToolStep` is built per
/// entry in `requirements`.
#[derive(Debug, Clone)]
pub struct PhaseRequirement {
    pub capability: String,
    pub dependencies: HashSet<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorTolerance {
    Strict,
    Moderate,
    Lenient,
}

#[derive(Debug, Clone)]
pub struct PhaseDefinition {
    pub phase: String,
    pub requirements: Vec<PhaseRequirement>,
    pub execution_strategy: ExecutionStrategy,
    pub error_tolerance: ErrorTolerance,
    pub max_execution_time: Duration,
    pub quality_threshold: f64,
}

/// The result of dispatching one `ToolStep`, as returned by a `StepExecutor`.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub step_id: String,
    pub success: bool,
    pub output: Option<serde_json::Value>,
    pub error: Option<String>,
}

/// Executes a single `ToolStep`; production implementations route through
/// `brain-mcp`'s coordinator (capability routing, pools, circuit breaker,
/// retry/backoff all live there, per §4.6).
#[async_trait]
pub trait StepExecutor: Send + Sync {
    async fn execute(&self, step: &ToolStep) -> StepOutcome;
}

/// Build one `ToolStep` per required capability, assigning each to the
/// voice with the highest combined expertise score (`spec.md` §4.6
/// "Orchestration plan": expert > preferred > default, plus
/// `performance_weight * 30 + reliability_weight * 20`).
pub fn create_plan(definition: &PhaseDefinition, voices: &[Voice]) -> BrainResult<OrchestrationPlan> {
    if voices.is_empty() {
        return Err(BrainError::InvalidInput("cannot plan a phase with no voices".to_string()));
    }

    let per_step_deadline = definition.max_execution_time / definition.requirements.len().max(1) as u32;

    let mut steps = Vec::new();
    let mut data_flow = Vec::new();

    for requirement in &definition.requirements {
        let voice = best_voice_for_capability(&requirement.capability, voices);
        let step_id = format!("{}:{}", definition.phase, requirement.capability);

        for dep_capability in &requirement.dependencies {
            data_flow.push(DataFlowEdge {
                from: format!("{}:{}", definition.phase, dep_capability),
                to: step_id.clone(),
            });
        }

        steps.push(ToolStep {
            step_id: step_id.clone(),
            voice_id: voice.id.clone(),
            capability: requirement.capability.clone(),
            parameters: HashMap::new(),
            dependencies: requirement
                .dependencies
                .iter()
                .map(|c| format!("{}:{}", definition.phase, c))
                .collect(),
            parallel: requirement.dependencies.is_empty(),
            optional: false,
            timeout: per_step_deadline,
            retry_policy: Default::default(),
            min_success_rate: 0.0,
            max_response_time: per_step_deadline,
        });
    }

    Ok(OrchestrationPlan {
        plan_id: uuid::Uuid::new_v4().to_string(),
        phase: definition.phase.clone(),
        voices: voices.iter().map(|v| v.id.clone()).collect(),
        steps,
        execution_strategy: definition.execution_strategy,
        data_flow,
        synchronization_points: Vec::new(),
        fallback_strategies: default_fallbacks(definition.error_tolerance),
        quality_threshold: definition.quality_threshold,
    })
}

fn best_voice_for_capability<'a>(capability: &str, voices: &'a [Voice]) -> &'a Voice {
    voices
        .iter()
        .max_by(|a, b| capability_score(capability, a).partial_cmp(&capability_score(capability, b)).unwrap())
        .expect("voices is non-empty, checked by caller")
}

fn capability_score(capability: &str, voice: &Voice) -> f64 {
    let base = if voice.matches_keyword(capability) {
        voice.expertise_level
    } else if voice.preferred_capabilities.iter().any(|c| c == capability) {
        voice.expertise_level * 0.8
    } else {
        0.5
    };
    base + voice.weights.performance * 30.0 + voice.weights.reliability * 20.0
}

fn default_fallbacks(tolerance: ErrorTolerance) -> Vec<FallbackStrategy> {
    match tolerance {
        ErrorTolerance::Strict => vec![FallbackStrategy::Retry],
        ErrorTolerance::Moderate => vec![FallbackStrategy::AlternativeServer],
        ErrorTolerance::Lenient => vec![FallbackStrategy::Skip],
    }
}

/// Run `plan.steps` under `plan.execution_strategy`, returning each step's
/// outcome keyed by `step_id` (`spec.md` §4.6 "Execution strategies").
pub async fn execute_plan(
    plan: &OrchestrationPlan,
    executor: &dyn StepExecutor,
) -> BrainResult<HashMap<String, StepOutcome>> {
    let strategy = resolve_strategy(plan.execution_strategy, plan);
    let mut results = HashMap::new();

    match strategy {
        ExecutionStrategy::Sequential => {
            for step in topological_order(&plan.steps)? {
                let outcome = executor.execute(step).await;
                results.insert(outcome.step_id.clone(), outcome);
            }
        }
        ExecutionStrategy::Parallel => {
            for group in dependency_groups(&plan.steps) {
                let outcomes = futures::future::join_all(group.iter().map(|s| executor.execute(s))).await;
                for outcome in outcomes {
                    results.insert(outcome.step_id.clone(), outcome);
                }
            }
        }
        ExecutionStrategy::Pipeline | ExecutionStrategy::Adaptive => {
            results = run_pipeline(&plan.steps, executor).await;
        }
    }

    let successful = results.values().filter(|o| o.success).count();
    let success_rate = if results.is_empty() { 1.0 } else { successful as f64 / results.len() as f64 };

    if success_rate < plan.quality_threshold {
        return Err(BrainError::PlanQualityFail {
            plan_id: plan.plan_id.clone(),
            reason: format!("success rate {success_rate:.2} below quality threshold {:.2}", plan.quality_threshold),
        });
    }

    Ok(results)
}

fn resolve_strategy(requested: ExecutionStrategy, plan: &OrchestrationPlan) -> ExecutionStrategy {
    if requested != ExecutionStrategy::Adaptive {
        return requested;
    }
    // `spec.md` §4.6 "adaptive: sample recent performance"; without a live
    // performance sample this falls back to pipeline, the strategy that
    // degrades most gracefully under unknown load.
    if plan.steps.len() > 8 {
        ExecutionStrategy::Parallel
    } else {
        ExecutionStrategy::Pipeline
    }
}

fn topological_order(steps: &[ToolStep]) -> BrainResult<Vec<&ToolStep>> {
    let mut remaining: Vec<&ToolStep> = steps.iter().collect();
    let mut completed: HashSet<String> = HashSet::new();
    let mut ordered = Vec::new();

    while !remaining.is_empty() {
        let ready_idx = remaining.iter().position(|s| s.dependencies.iter().all(|d| completed.contains(d)));
        let Some(idx) = ready_idx else {
            return Err(BrainError::InvalidInput("orchestration plan has a dependency cycle".to_string()));
        };
        let step = remaining.remove(idx);
        completed.insert(step.step_id.clone());
        ordered.push(step);
    }

    Ok(ordered)
}

fn dependency_groups(steps: &[ToolStep]) -> Vec<Vec<&ToolStep>> {
    let mut groups = Vec::new();
    let mut remaining: Vec<&ToolStep> = steps.iter().collect();
    let mut completed: HashSet<String> = HashSet::new();

    while !remaining.is_empty() {
        let (ready, not_ready): (Vec<&ToolStep>, Vec<&ToolStep>) =
            remaining.into_iter().partition(|s| s.dependencies.iter().all(|d| completed.contains(d)));
        if ready.is_empty() {
            break; // cycle; stop rather than loop forever, executor sees a partial result
        }
        for step in &ready {
            completed.insert(step.step_id.clone());
        }
        groups.push(ready);
        remaining = not_ready;
    }

    groups
}

async fn run_pipeline(steps: &[ToolStep], executor: &dyn StepExecutor) -> HashMap<String, StepOutcome> {
    let mut completed: HashSet<String> = HashSet::new();
    let mut results: HashMap<String, StepOutcome> = HashMap::new();
    let mut remaining: Vec<&ToolStep> = steps.iter().collect();

    while !remaining.is_empty() {
        let (ready, not_ready): (Vec<&ToolStep>, Vec<&ToolStep>) =
            remaining.into_iter().partition(|s| s.dependencies.iter().all(|d| completed.contains(d)));
        if ready.is_empty() {
            break;
        }
        let outcomes = futures::future::join_all(ready.iter().map(|s| executor.execute(s))).await;
        for outcome in outcomes {
            completed.insert(outcome.step_id.clone());
            results.insert(outcome.step_id.clone(), outcome);
        }
        remaining = not_ready;
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voices::default_voices;

    struct AlwaysSucceeds;

    #[async_trait]
    impl StepExecutor for AlwaysSucceeds {
        async fn execute(&self, step: &ToolStep) -> StepOutcome {
            StepOutcome { step_id: step.step_id.clone(), success: true, output: None, error: None }
        }
    }

    fn phase() -> PhaseDefinition {
        PhaseDefinition {
            phase: "review".to_string(),
            requirements: vec![
                PhaseRequirement { capability: "security".to_string(), dependencies: HashSet::new() },
                PhaseRequirement {
                    capability: "implementation".to_string(),
                    dependencies: ["security".to_string()].into_iter().collect(),
                },
            ],
            execution_strategy: ExecutionStrategy::Sequential,
            error_tolerance: ErrorTolerance::Moderate,
            max_execution_time: Duration::from_secs(10),
            quality_threshold: 0.8,
        }
    }

    #[test]
    fn plan_assigns_security_capability_to_security_voice() {
        let plan = create_plan(&phase(), &default_voices()).unwrap();
        let security_step = plan.steps.iter().find(|s| s.capability == "security").unwrap();
        assert_eq!(security_step.voice_id, "security");
    }

    #[test]
    fn plan_preserves_declared_dependencies_as_data_flow_edges() {
        let plan = create_plan(&phase(), &default_voices()).unwrap();
        assert_eq!(plan.data_flow.len(), 1);
    }

    #[tokio::test]
    async fn sequential_execution_runs_every_step_to_completion() {
        let plan = create_plan(&phase(), &default_voices()).unwrap();
        let results = execute_plan(&plan, &AlwaysSucceeds).await.unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.values().all(|o| o.success));
    }
}
