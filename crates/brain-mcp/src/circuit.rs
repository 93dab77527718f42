//! Circuit breaker state machine (`spec.md` §4.6 "Execution": closed /
//! open / half-open, tripped by consecutive failures, recovered after a
//! half-open delay).

use brain_types::domain::{CircuitBreakerState, CircuitState};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;

pub struct CircuitBreaker {
    states: Mutex<HashMap<String, CircuitBreakerState>>,
    trip_threshold: u32,
    half_open_delay_seconds: u64,
}

impl CircuitBreaker {
    pub fn new(trip_threshold: u32, half_open_delay_seconds: u64) -> Self {
        Self {
            states: Mutex::new(HashMap::new()),
            trip_threshold,
            half_open_delay_seconds,
        }
    }

    /// Read the current state for `connection_id`, transitioning
    /// `open → half-open` first if the recovery delay has elapsed.
    pub fn current_state(&self, connection_id: &str) -> CircuitState {
        let mut states = self.states.lock().unwrap_or_else(|e| e.into_inner());
        let entry = states.entry(connection_id.to_string()).or_default();

        if entry.state == CircuitState::Open {
            if let Some(opened_at) = entry.opened_at {
                let elapsed = (Utc::now() - opened_at).num_seconds();
                if elapsed >= self.half_open_delay_seconds as i64 {
                    entry.state = CircuitState::HalfOpen;
                }
            }
        }
        entry.state
    }

    /// `spec.md` §4.6 "On success: ... transition half-open → closed".
    pub fn record_success(&self, connection_id: &str) {
        let mut states = self.states.lock().unwrap_or_else(|e| e.into_inner());
        let entry = states.entry(connection_id.to_string()).or_default();
        entry.state = CircuitState::Closed;
        entry.consecutive_failures = 0;
        entry.opened_at = None;
    }

    /// `spec.md` §4.6 "On final failure, record failure, increment
    /// consecutive-failure counter; if counter crosses the breaker
    /// threshold, transition to open and schedule half-open recovery."
    pub fn record_failure(&self, connection_id: &str) {
        let mut states = self.states.lock().unwrap_or_else(|e| e.into_inner());
        let entry = states.entry(connection_id.to_string()).or_default();
        entry.consecutive_failures += 1;
        if entry.consecutive_failures >= self.trip_threshold {
            entry.state = CircuitState::Open;
            entry.opened_at = Some(Utc::now());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breaker_stays_closed_below_threshold() {
        let breaker = CircuitBreaker::new(3, 30);
        breaker.record_failure("conn-a");
        breaker.record_failure("conn-a");
        assert_eq!(breaker.current_state("conn-a"), CircuitState::Closed);
    }

    #[test]
    fn breaker_trips_open_at_threshold() {
        let breaker = CircuitBreaker::new(3, 30);
        for _ in 0..3 {
            breaker.record_failure("conn-a");
        }
        assert_eq!(breaker.current_state("conn-a"), CircuitState::Open);
    }

    #[test]
    fn success_resets_a_tripped_breaker() {
        let breaker = CircuitBreaker::new(2, 30);
        breaker.record_failure("conn-a");
        breaker.record_failure("conn-a");
        assert_eq!(breaker.current_state("conn-a"), CircuitState::Open);
        breaker.record_success("conn-a");
        assert_eq!(breaker.current_state("conn-a"), CircuitState::Closed);
    }

    #[test]
    fn breaker_moves_to_half_open_once_delay_elapses() {
        let breaker = CircuitBreaker::new(1, 0);
        breaker.record_failure("conn-a");
        assert_eq!(breaker.current_state("conn-a"), CircuitState::HalfOpen);
    }
}
