//! Interactive confirmation (`spec.md` §4.3 "User confirmation"). The
//! prompter is a trait so tests can script a response instead of reading
//! stdin; the real `StdinPrompter` enforces the deadline from §5.

use async_trait::async_trait;
use brain_types::domain::{Operation, RiskAssessment};
use std::io::Write;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationOutcome {
    Approved,
    Denied,
    /// Stream closed or the deadline elapsed; treated as deny by the caller.
    Cancelled,
}

#[async_trait]
pub trait ConfirmationPrompter: Send + Sync {
    async fn confirm(&self, operation: &Operation, risk: &RiskAssessment, deadline: Duration) -> ConfirmationOutcome;
}

/// Reads `{y,n,s,q}` from stdin; `s` reprints full detail and reprompts,
/// `q` cancels. Timeout or a closed stream is treated as deny, per §4.3
/// "Failure semantics" (approval must fail closed).
pub struct StdinPrompter;

#[async_trait]
impl ConfirmationPrompter for StdinPrompter {
    async fn confirm(&self, operation: &Operation, risk: &RiskAssessment, deadline: Duration) -> ConfirmationOutcome {
        let prompt_loop = async {
            let mut reader = BufReader::new(tokio::io::stdin());
            loop {
                print_operation(operation, risk);
                print!("Approve? [y/n/s/q] ");
                let _ = std::io::stdout().flush();

                let mut line = String::new();
                match reader.read_line(&mut line).await {
                    Ok(0) => return ConfirmationOutcome::Cancelled, // stream closed
                    Ok(_) => match line.trim().to_lowercase().as_str() {
                        "y" => return ConfirmationOutcome::Approved,
                        "n" => return ConfirmationOutcome::Denied,
                        "q" => return ConfirmationOutcome::Cancelled,
                        "s" => continue, // detail already printed above; reprompt
                        _ => continue,
                    },
                    Err(_) => return ConfirmationOutcome::Cancelled,
                }
            }
        };

        tokio::time::timeout(deadline, prompt_loop)
            .await
            .unwrap_or(ConfirmationOutcome::Cancelled)
    }
}

fn print_operation(operation: &Operation, risk: &RiskAssessment) {
    println!("Operation: {:?} on '{}'", operation.op_type, operation.target);
    println!("  {}", operation.description);
    println!("Risk: {:?} (score {:.1})", risk.level, risk.score);
    for factor in &risk.factors {
        println!("  - {} (+{:.1}): {}", factor.category, factor.severity, factor.description);
    }
}

/// A prompter that returns a fixed outcome, for tests and for non-interactive
/// callers that have already decided policy out-of-band.
pub struct ScriptedPrompter(pub ConfirmationOutcome);

#[async_trait]
impl ConfirmationPrompter for ScriptedPrompter {
    async fn confirm(&self, _operation: &Operation, _risk: &RiskAssessment, _deadline: Duration) -> ConfirmationOutcome {
        self.0
    }
}
