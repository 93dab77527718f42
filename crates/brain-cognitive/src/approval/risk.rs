//! Risk scoring for the approval engine (`spec.md` §4.3 "Risk scoring"):
//! four additive severity factor sources summed into a score, then mapped
//! onto a `RiskLevel` by fixed thresholds.

use brain_types::domain::{Operation, OperationContext, OperationType, RiskAssessment, RiskFactor, RiskLevel, SandboxMode};
use brain_types::{DANGEROUS_COMMAND_TOKENS, NETWORK_COMMAND_TOKENS, SCRIPT_EXECUTOR_TOKENS, SYSTEM_PATH_PREFIXES};

fn operation_type_severity(op_type: OperationType) -> f64 {
    match op_type {
        OperationType::FileRead => 2.0,
        OperationType::FileWrite => 5.0,
        OperationType::FileDelete => 8.0,
        OperationType::CommandExec => 7.0,
        OperationType::NetworkAccess => 6.0,
        OperationType::GitOperation => 4.0,
        OperationType::PackageInstall => 7.0,
        OperationType::CodeGeneration => 3.0,
        OperationType::FineTuning => 6.0,
    }
}

fn sandbox_mode_base(mode: SandboxMode) -> f64 {
    match mode {
        SandboxMode::ReadOnly => 1.0,
        SandboxMode::WorkspaceWrite => 3.0,
        SandboxMode::FullAccess => 6.0,
    }
}

fn target_path_factors(target: &str, workspace_root: &str) -> Vec<RiskFactor> {
    let mut factors = Vec::new();

    if SYSTEM_PATH_PREFIXES.iter().any(|p| target.contains(p)) {
        factors.push(RiskFactor {
            category: "target-path".to_string(),
            severity: 9.0,
            description: format!("target '{target}' is under a system path"),
            mitigation: Some("confirm the operation is not touching OS-owned files".to_string()),
        });
    }

    if !workspace_root.is_empty() && !target.starts_with(workspace_root) {
        factors.push(RiskFactor {
            category: "target-path".to_string(),
            severity: 6.0,
            description: format!("target '{target}' is outside workspace root '{workspace_root}'"),
            mitigation: None,
        });
    }

    if target.contains("/.") || target.contains("\\.") {
        factors.push(RiskFactor {
            category: "target-path".to_string(),
            severity: 4.0,
            description: format!("target '{target}' touches a hidden or config segment"),
            mitigation: None,
        });
    }

    factors
}

fn command_content_factors(operation: &Operation) -> Vec<RiskFactor> {
    if operation.op_type != OperationType::CommandExec {
        return Vec::new();
    }

    let lower = format!("{} {}", operation.target, operation.description).to_lowercase();
    let tokens: Vec<&str> = lower.split_whitespace().collect();
    let mut factors = Vec::new();

    for token in DANGEROUS_COMMAND_TOKENS {
        let hits = tokens.iter().filter(|t| *t == token).count();
        for _ in 0..hits {
            factors.push(RiskFactor {
                category: "command-content".to_string(),
                severity: 9.0,
                description: format!("command contains dangerous token '{token}'"),
                mitigation: None,
            });
        }
    }
    for token in NETWORK_COMMAND_TOKENS {
        let hits = tokens.iter().filter(|t| *t == token).count();
        for _ in 0..hits {
            factors.push(RiskFactor {
                category: "command-content".to_string(),
                severity: 6.0,
                description: format!("command contains network token '{token}'"),
                mitigation: None,
            });
        }
    }
    for token in SCRIPT_EXECUTOR_TOKENS {
        let hits = tokens.iter().filter(|t| *t == token).count();
        for _ in 0..hits {
            factors.push(RiskFactor {
                category: "command-content".to_string(),
                severity: 5.0,
                description: format!("command invokes script executor '{token}'"),
                mitigation: None,
            });
        }
    }

    factors
}

fn level_for_score(score: f64) -> RiskLevel {
    if score >= 25.0 {
        RiskLevel::Critical
    } else if score >= 15.0 {
        RiskLevel::High
    } else if score >= 8.0 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// Assess the risk of `operation` under `context` (`spec.md` §4.3).
pub fn assess(operation: &Operation, context: &OperationContext) -> RiskAssessment {
    let mut factors = vec![RiskFactor {
        category: "operation-type".to_string(),
        severity: operation_type_severity(operation.op_type),
        description: format!("{:?} base severity", operation.op_type),
        mitigation: None,
    }];
    factors.extend(target_path_factors(&operation.target, &context.workspace_root));
    factors.push(RiskFactor {
        category: "sandbox-mode".to_string(),
        severity: sandbox_mode_base(context.sandbox_mode),
        description: format!("{:?} sandbox base", context.sandbox_mode),
        mitigation: None,
    });
    factors.extend(command_content_factors(operation));

    let score: f64 = factors.iter().map(|f| f.severity).sum();
    let level = level_for_score(score);

    let recommendations = match level {
        RiskLevel::Critical | RiskLevel::High => {
            vec!["require explicit user confirmation before proceeding".to_string()]
        }
        RiskLevel::Medium => vec!["review the target path and command content".to_string()],
        RiskLevel::Low => Vec::new(),
    };

    RiskAssessment {
        level,
        score,
        factors,
        recommendations,
    }
}
