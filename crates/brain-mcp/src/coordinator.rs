//! C7 MCP voice-tool coordinator: `handleRequest` ties together server
//! selection, the circuit breaker, and retry/backoff (`spec.md` §4.6).

use crate::circuit::CircuitBreaker;
use crate::pool::PoolManager;
use crate::registry::{build_query, DiscoveryIndex};
use async_trait::async_trait;
use brain_types::domain::{BackoffStrategy, CircuitState, MCPConnection, MCPVoiceRequest, MCPVoiceResponse, RetryOn, Voice};
use brain_types::{BrainError, BrainResult};
use std::time::{Duration, Instant};

/// Executes one capability call against a chosen connection. Production
/// callers implement this over an actual MCP client transport; tests
/// supply a scripted responder.
#[async_trait]
pub trait ServerCaller: Send + Sync {
    async fn call(&self, connection: &MCPConnection, request: &MCPVoiceRequest) -> Result<serde_json::Value, String>;
}

pub struct McpCoordinator {
    discovery: DiscoveryIndex,
    pools: PoolManager,
    breaker: CircuitBreaker,
    caller: Box<dyn ServerCaller>,
}

impl McpCoordinator {
    pub fn new(discovery: DiscoveryIndex, breaker: CircuitBreaker, caller: Box<dyn ServerCaller>) -> Self {
        Self { discovery, pools: PoolManager::new(), breaker, caller }
    }

    pub fn discovery(&self) -> &DiscoveryIndex {
        &self.discovery
    }

    /// `handleRequest(MCPVoiceRequest) → MCPVoiceResponse` (`spec.md` §4.6).
    pub async fn handle_request(&self, request: &MCPVoiceRequest, voice: &Voice) -> BrainResult<MCPVoiceResponse> {
        let query = build_query(&request.capability, voice);
        let candidates = self.discovery.select_candidates(&query, voice)?;
        let connection = self
            .pools
            .get_connection(voice, &request.capability, &candidates)
            .ok_or_else(|| BrainError::NoSuitableServer(request.capability.clone()))?;

        match self.breaker.current_state(&connection.connection_id.to_string()) {
            CircuitState::Open => return Err(BrainError::ServerCircuitOpen(connection.connection_id.to_string())),
            CircuitState::HalfOpen | CircuitState::Closed => {}
        }

        self.dispatch_with_retry(request, &connection).await
    }

    async fn dispatch_with_retry(&self, request: &MCPVoiceRequest, connection: &MCPConnection) -> BrainResult<MCPVoiceResponse> {
        let policy = &request.retry_policy;
        let mut attempt = 0;
        let started = Instant::now();

        loop {
            attempt += 1;
            let outcome = tokio::time::timeout(request.timeout, self.caller.call(connection, request)).await;

            match outcome {
                Ok(Ok(result)) => {
                    self.breaker.record_success(&connection.connection_id.to_string());
                    return Ok(MCPVoiceResponse {
                        request_id: request.request_id,
                        server_id: connection.server_id.clone(),
                        success: true,
                        result: Some(result),
                        error: None,
                        execution_time: started.elapsed(),
                        attempts: attempt,
                    });
                }
                Ok(Err(error)) => {
                    if attempt > policy.max_retries || !retriable(policy.retry_on, &error, false) {
                        self.breaker.record_failure(&connection.connection_id.to_string());
                        return Ok(MCPVoiceResponse {
                            request_id: request.request_id,
                            server_id: connection.server_id.clone(),
                            success: false,
                            result: None,
                            error: Some(error),
                            execution_time: started.elapsed(),
                            attempts: attempt,
                        });
                    }
                    tokio::time::sleep(backoff_delay(policy.backoff_strategy, attempt, policy.base_delay, policy.max_delay, 0.0)).await;
                }
                Err(_elapsed) => {
                    if attempt > policy.max_retries || !retriable(policy.retry_on, "timeout", true) {
                        self.breaker.record_failure(&connection.connection_id.to_string());
                        return Err(BrainError::RequestTimeout(request.timeout));
                    }
                    tokio::time::sleep(backoff_delay(policy.backoff_strategy, attempt, policy.base_delay, policy.max_delay, 0.0)).await;
                }
            }
        }
    }
}

fn retriable(retry_on: RetryOn, error: &str, was_timeout: bool) -> bool {
    match retry_on {
        RetryOn::All => true,
        RetryOn::Timeout => was_timeout,
        RetryOn::ServerError => error.to_lowercase().contains("server"),
        RetryOn::NetworkError => error.to_lowercase().contains("network") || error.to_lowercase().contains("connection"),
    }
}

/// `spec.md` §4.6 "wait backoff(attempt) ... adaptive multiplies
/// exponential by 1 + systemLoad/100, cap at maxDelay".
pub fn backoff_delay(strategy: BackoffStrategy, attempt: u32, base: Duration, max: Duration, system_load_percent: f64) -> Duration {
    let raw = match strategy {
        BackoffStrategy::Linear => base * attempt,
        BackoffStrategy::Exponential => base * 2u32.saturating_pow(attempt.saturating_sub(1)),
        BackoffStrategy::Adaptive => {
            let exponential = base * 2u32.saturating_pow(attempt.saturating_sub(1));
            exponential.mul_f64(1.0 + system_load_percent / 100.0)
        }
    };
    raw.min(max)
}
