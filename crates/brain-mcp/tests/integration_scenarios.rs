//! End-to-end scenario S4 (`spec.md` §8): a circuit breaker trips after
//! 5 consecutive failures and recovers to half-open after its delay.

use brain_mcp::CircuitBreaker;
use brain_types::domain::CircuitState;

#[test]
fn s4_five_consecutive_failures_trip_the_breaker() {
    let breaker = CircuitBreaker::new(5, 30);

    for _ in 0..4 {
        breaker.record_failure("conn-1");
        assert_eq!(breaker.current_state("conn-1"), CircuitState::Closed);
    }

    breaker.record_failure("conn-1");
    assert_eq!(breaker.current_state("conn-1"), CircuitState::Open);
}

#[test]
fn s4_breaker_recovers_to_half_open_once_the_delay_elapses() {
    let breaker = CircuitBreaker::new(5, 0);
    for _ in 0..5 {
        breaker.record_failure("conn-1");
    }

    // half_open_delay_seconds = 0, so the probe is permitted immediately.
    assert_eq!(breaker.current_state("conn-1"), CircuitState::HalfOpen);
}
