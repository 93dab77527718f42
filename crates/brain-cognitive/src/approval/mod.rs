//! C3 approval engine: risk scoring, policy rules, and interactive
//! confirmation (`spec.md` §4.3).

pub mod policy;
pub mod prompt;
pub mod risk;

pub use policy::{builtin_policy, Decision, Policy, Rule, RuleAction, RuleCondition};
pub use prompt::{ConfirmationOutcome, ConfirmationPrompter, ScriptedPrompter, StdinPrompter};

use brain_types::domain::{ApprovalResult, ApprovalStatus, Operation, OperationContext, SessionId};
use brain_types::ApprovalConfig;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub struct ApprovalEngine {
    prompter: Arc<dyn ConfirmationPrompter>,
    config: ApprovalConfig,
    history: Mutex<HashMap<SessionId, Vec<ApprovalResult>>>,
}

impl ApprovalEngine {
    pub fn new(prompter: Arc<dyn ConfirmationPrompter>, config: ApprovalConfig) -> Self {
        Self {
            prompter,
            config,
            history: Mutex::new(HashMap::new()),
        }
    }

    /// `requestApproval(Operation, OperationContext) → ApprovalResult`
    /// (`spec.md` §4.3 contract). Runs the state machine
    /// `received → risk-assessed → rule-evaluated →
    /// (auto-approved | user-prompted → {approved,denied,cancelled} | denied)`.
    /// Never propagates an error: any internal failure yields `denied` with
    /// the failure surfaced, since approval must fail closed. Every outcome
    /// is appended to the session's approval history (`spec.md` S3: "history
    /// length increases by one").
    pub async fn request_approval(&self, operation: &Operation, context: &OperationContext) -> ApprovalResult {
        let assessment = risk::assess(operation, context);
        let policy = builtin_policy(context.sandbox_mode);
        let decision = policy.evaluate(operation, context, &assessment);

        let result = match decision {
            Decision::AutoApprove { reason } => ApprovalResult::auto_approved(reason),
            Decision::Deny { reason } => ApprovalResult::denied(reason),
            Decision::RequireConfirmation { reason } => {
                let deadline = Duration::from_secs(self.config.confirmation_timeout_seconds);
                match self.prompter.confirm(operation, &assessment, deadline).await {
                    ConfirmationOutcome::Approved => ApprovalResult {
                        status: ApprovalStatus::Approved,
                        granted: true,
                        reason,
                        auto_approved: Some(false),
                        reviewer_id: None,
                        suggestions: if assessment.recommendations.is_empty() {
                            None
                        } else {
                            Some(assessment.recommendations.clone())
                        },
                    },
                    ConfirmationOutcome::Denied => ApprovalResult::denied(format!("{reason} (user denied)")),
                    ConfirmationOutcome::Cancelled => ApprovalResult::denied("cancelled"),
                }
            }
        };

        self.record(&context.session_id, result.clone());
        result
    }

    fn record(&self, session_id: &str, result: ApprovalResult) {
        let mut history = self.history.lock().expect("approval history poisoned");
        history.entry(session_id.to_string()).or_default().push(result);
    }

    /// The approval history recorded so far for `session_id`, oldest first.
    pub fn history_for(&self, session_id: &str) -> Vec<ApprovalResult> {
        let history = self.history.lock().expect("approval history poisoned");
        history.get(session_id).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brain_types::domain::{OperationType, SandboxMode};
    use std::collections::HashMap;

    fn op(op_type: OperationType, target: &str) -> Operation {
        Operation {
            op_type,
            target: target.to_string(),
            description: String::new(),
            metadata: HashMap::new(),
        }
    }

    fn ctx(mode: SandboxMode) -> OperationContext {
        OperationContext {
            sandbox_mode: mode,
            workspace_root: "/workspace".to_string(),
            user_intent: "test".to_string(),
            session_id: "s1".to_string(),
        }
    }

    #[tokio::test]
    async fn low_risk_read_is_auto_approved() {
        let engine = ApprovalEngine::new(Arc::new(ScriptedPrompter(ConfirmationOutcome::Denied)), ApprovalConfig::default());
        let result = engine
            .request_approval(&op(OperationType::FileRead, "/workspace/a.rs"), &ctx(SandboxMode::WorkspaceWrite))
            .await;
        assert_eq!(result.status, ApprovalStatus::Approved);
        assert_eq!(result.auto_approved, Some(true));
    }

    #[tokio::test]
    async fn cancelled_confirmation_denies_with_reason() {
        let engine = ApprovalEngine::new(Arc::new(ScriptedPrompter(ConfirmationOutcome::Cancelled)), ApprovalConfig::default());
        let result = engine
            .request_approval(
                &op(OperationType::CommandExec, "/workspace/run.sh"),
                &ctx(SandboxMode::WorkspaceWrite),
            )
            .await;
        assert_eq!(result.status, ApprovalStatus::Denied);
    }

    #[tokio::test]
    async fn rm_rf_etc_passwd_is_denied_and_recorded_in_history() {
        let engine = ApprovalEngine::new(Arc::new(ScriptedPrompter(ConfirmationOutcome::Approved)), ApprovalConfig::default());
        let result = engine
            .request_approval(
                &op(OperationType::CommandExec, "rm -rf /etc/passwd"),
                &ctx(SandboxMode::WorkspaceWrite),
            )
            .await;
        assert_eq!(result.status, ApprovalStatus::Denied);
        assert!(!result.granted);
        assert_eq!(engine.history_for("s1").len(), 1);
    }

    #[tokio::test]
    async fn read_only_write_is_denied_without_prompting() {
        let engine = ApprovalEngine::new(Arc::new(ScriptedPrompter(ConfirmationOutcome::Approved)), ApprovalConfig::default());
        let result = engine
            .request_approval(&op(OperationType::FileWrite, "/workspace/a.rs"), &ctx(SandboxMode::ReadOnly))
            .await;
        assert_eq!(result.status, ApprovalStatus::Denied);
    }
}
