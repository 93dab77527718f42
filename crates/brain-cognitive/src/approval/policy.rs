//! Sandboxed rule-condition language and the three built-in sandbox-mode
//! policies (`spec.md` §4.3 "Policy"). `RuleCondition` is a closed predicate
//! AST, never a general `eval`, so a malformed or adversarial rule can only
//! fail to match — it can never execute arbitrary code.

use brain_types::domain::{Operation, OperationContext, OperationType, RiskAssessment, RiskLevel, SandboxMode};
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleAction {
    AutoApprove,
    RequireConfirmation,
    Deny,
}

/// A safe expression over `{operation, context, riskAssessment}`
/// (`spec.md` §4.3 step 2).
#[derive(Debug, Clone)]
pub enum RuleCondition {
    RiskAtLeast(RiskLevel),
    RiskBelow(RiskLevel),
    OperationTypeIs(OperationType),
    SandboxModeIs(SandboxMode),
    TargetMatches(Regex),
    And(Box<RuleCondition>, Box<RuleCondition>),
    Or(Box<RuleCondition>, Box<RuleCondition>),
    Not(Box<RuleCondition>),
    Always,
}

impl RuleCondition {
    /// Evaluate this condition. Evaluation can never fail — there is no
    /// variant that performs I/O or can panic on well-formed input, so the
    /// "failure to evaluate is treated as non-match and logged" clause in
    /// §4.3 only applies at the rule-lookup layer above this, not here.
    pub fn eval(&self, operation: &Operation, context: &OperationContext, risk: &RiskAssessment) -> bool {
        match self {
            RuleCondition::RiskAtLeast(level) => risk.level >= *level,
            RuleCondition::RiskBelow(level) => risk.level < *level,
            RuleCondition::OperationTypeIs(op_type) => operation.op_type == *op_type,
            RuleCondition::SandboxModeIs(mode) => context.sandbox_mode == *mode,
            RuleCondition::TargetMatches(regex) => regex.is_match(&operation.target),
            RuleCondition::And(a, b) => a.eval(operation, context, risk) && b.eval(operation, context, risk),
            RuleCondition::Or(a, b) => a.eval(operation, context, risk) || b.eval(operation, context, risk),
            RuleCondition::Not(a) => !a.eval(operation, context, risk),
            RuleCondition::Always => true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Rule {
    pub operation_type: OperationType,
    pub condition: RuleCondition,
    pub action: RuleAction,
    pub reason: String,
    pub priority: i32,
}

#[derive(Debug, Clone)]
pub struct Policy {
    pub auto_approve_threshold: f64,
    pub require_confirmation_threshold: f64,
    pub rules: Vec<Rule>,
}

/// Evaluation outcome before the confirmation step is actually run.
pub enum Decision {
    AutoApprove { reason: String },
    RequireConfirmation { reason: String },
    Deny { reason: String },
}

impl Policy {
    /// `spec.md` §4.3 "Policy" evaluation steps 1-3.
    pub fn evaluate(&self, operation: &Operation, context: &OperationContext, risk: &RiskAssessment) -> Decision {
        let mut matching: Vec<&Rule> = self.rules.iter().filter(|r| r.operation_type == operation.op_type).collect();
        matching.sort_by(|a, b| b.priority.cmp(&a.priority));

        for rule in matching {
            if rule.condition.eval(operation, context, risk) {
                return match rule.action {
                    RuleAction::AutoApprove => Decision::AutoApprove { reason: rule.reason.clone() },
                    RuleAction::RequireConfirmation => Decision::RequireConfirmation { reason: rule.reason.clone() },
                    RuleAction::Deny => Decision::Deny { reason: rule.reason.clone() },
                };
            }
        }

        if risk.score <= self.auto_approve_threshold {
            Decision::AutoApprove {
                reason: format!("score {:.1} within auto-approve threshold {:.1}", risk.score, self.auto_approve_threshold),
            }
        } else if risk.score <= self.require_confirmation_threshold {
            Decision::RequireConfirmation {
                reason: format!("score {:.1} requires confirmation (threshold {:.1})", risk.score, self.require_confirmation_threshold),
            }
        } else {
            Decision::Deny {
                reason: format!("score {:.1} exceeds confirmation threshold {:.1}", risk.score, self.require_confirmation_threshold),
            }
        }
    }
}

/// The three built-in policies keyed by sandbox mode (`spec.md` §4.3 "Policy").
pub fn builtin_policy(mode: SandboxMode) -> Policy {
    match mode {
        SandboxMode::ReadOnly => Policy {
            auto_approve_threshold: 10.0,
            require_confirmation_threshold: 14.0,
            rules: vec![Rule {
                operation_type: OperationType::FileWrite,
                condition: RuleCondition::Always,
                action: RuleAction::Deny,
                reason: "read-only sandbox forbids writes".to_string(),
                priority: 100,
            }],
        },
        SandboxMode::WorkspaceWrite => Policy {
            auto_approve_threshold: 8.0,
            require_confirmation_threshold: 20.0,
            rules: vec![Rule {
                operation_type: OperationType::FileDelete,
                condition: RuleCondition::TargetMatches(Regex::new(r"^/(etc|bin|usr/bin|System)").unwrap()),
                action: RuleAction::Deny,
                reason: "deletes under a system path are never allowed".to_string(),
                priority: 100,
            }],
        },
        SandboxMode::FullAccess => Policy {
            auto_approve_threshold: 7.0,
            require_confirmation_threshold: 24.0,
            rules: vec![Rule {
                operation_type: OperationType::CommandExec,
                condition: RuleCondition::RiskAtLeast(RiskLevel::Critical),
                action: RuleAction::RequireConfirmation,
                reason: "critical-risk commands always prompt, even with full access".to_string(),
                priority: 100,
            }],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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

    fn risk(level: RiskLevel, score: f64) -> RiskAssessment {
        RiskAssessment { level, score, factors: vec![], recommendations: vec![] }
    }

    #[test]
    fn read_only_policy_denies_writes_regardless_of_threshold() {
        let policy = builtin_policy(SandboxMode::ReadOnly);
        let decision = policy.evaluate(
            &op(OperationType::FileWrite, "/workspace/a.rs"),
            &ctx(SandboxMode::ReadOnly),
            &risk(RiskLevel::Low, 2.0),
        );
        assert!(matches!(decision, Decision::Deny { .. }));
    }

    #[test]
    fn low_score_falls_back_to_auto_approve() {
        let policy = builtin_policy(SandboxMode::WorkspaceWrite);
        let decision = policy.evaluate(
            &op(OperationType::FileRead, "/workspace/a.rs"),
            &ctx(SandboxMode::WorkspaceWrite),
            &risk(RiskLevel::Low, 3.0),
        );
        assert!(matches!(decision, Decision::AutoApprove { .. }));
    }

    #[test]
    fn deleting_system_path_under_workspace_write_is_denied_by_rule() {
        let policy = builtin_policy(SandboxMode::WorkspaceWrite);
        let decision = policy.evaluate(
            &op(OperationType::FileDelete, "/etc/hosts"),
            &ctx(SandboxMode::WorkspaceWrite),
            &risk(RiskLevel::Critical, 30.0),
        );
        assert!(matches!(decision, Decision::Deny { .. }));
    }
}
