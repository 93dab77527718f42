//! Connection pools and load-balancing strategies (`spec.md` §4.6 "Server
//! selection" step 5). One pool is created lazily per `(voiceId,
//! capability)`, sized `minConnections=1, maxConnections=min(5,
//! |candidates|)`, using a strategy dictated by the voice's weights.

use brain_types::domain::{ConnectionPool, DiscoveredServer, MCPConnection, PoolStrategy, Voice};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

fn pool_key(voice_id: &str, capability: &str) -> String {
    format!("{voice_id}:{capability}")
}

/// Pick the load-balancing strategy a voice's weights imply
/// (`spec.md` §4.6 step 5: "high reliability → weighted-by-response-time;
/// high performance → capability-aware; otherwise hybrid").
pub fn strategy_for_voice(voice: &Voice) -> PoolStrategy {
    if voice.weights.reliability >= 0.4 {
        PoolStrategy::WeightedByResponseTime
    } else if voice.weights.performance >= 0.4 {
        PoolStrategy::CapabilityAware
    } else {
        PoolStrategy::Hybrid
    }
}

struct Affinity {
    connection_id: String,
    bound_at: DateTime<Utc>,
}

pub struct PoolManager {
    pools: Mutex<HashMap<String, ConnectionPool>>,
    connections: Mutex<HashMap<String, Vec<MCPConnection>>>,
    affinity: Mutex<HashMap<String, Affinity>>,
}

impl PoolManager {
    pub fn new() -> Self {
        Self {
            pools: Mutex::new(HashMap::new()),
            connections: Mutex::new(HashMap::new()),
            affinity: Mutex::new(HashMap::new()),
        }
    }

    /// Get or lazily create the pool for `(voice_id, capability)` over
    /// `candidates`, and return the connection this call should use.
    pub fn get_connection(
        &self,
        voice: &Voice,
        capability: &str,
        candidates: &[DiscoveredServer],
    ) -> Option<MCPConnection> {
        let key = pool_key(&voice.id, capability);
        let strategy = strategy_for_voice(voice);

        {
            let mut pools = self.pools.lock().unwrap_or_else(|e| e.into_inner());
            pools.entry(key.clone()).or_insert_with(|| ConnectionPool {
                pool_id: key.clone(),
                min_connections: 1,
                max_connections: candidates.len().clamp(1, 5),
                strategy,
                affinity_enabled: true,
                affinity_ttl: Duration::from_secs(60),
            });
        }

        {
            let mut conns = self.connections.lock().unwrap_or_else(|e| e.into_inner());
            let pool_conns = conns.entry(key.clone()).or_insert_with(Vec::new);
            if pool_conns.is_empty() {
                *pool_conns = candidates
                    .iter()
                    .map(|c| MCPConnection {
                        connection_id: uuid::Uuid::new_v4(),
                        server_id: c.server_id.clone(),
                        server_name: c.server_name.clone(),
                        health_score: c.reliability_score,
                    })
                    .collect();
            }
        }

        if let Some(bound) = self.affinity_hit(&key) {
            let conns = self.connections.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(conn) = conns.get(&key).and_then(|cs| cs.iter().find(|c| c.connection_id.to_string() == bound)) {
                return Some(conn.clone());
            }
        }

        let conns = self.connections.lock().unwrap_or_else(|e| e.into_inner());
        let pool_conns = conns.get(&key)?;
        let chosen = select_by_strategy(strategy, pool_conns)?;
        self.bind_affinity(&key, &chosen.connection_id.to_string());
        Some(chosen.clone())
    }

    fn affinity_hit(&self, key: &str) -> Option<String> {
        let affinity = self.affinity.lock().unwrap_or_else(|e| e.into_inner());
        let entry = affinity.get(key)?;
        if (Utc::now() - entry.bound_at).num_seconds() <= 60 {
            Some(entry.connection_id.clone())
        } else {
            None
        }
    }

    fn bind_affinity(&self, key: &str, connection_id: &str) {
        let mut affinity = self.affinity.lock().unwrap_or_else(|e| e.into_inner());
        affinity.insert(
            key.to_string(),
            Affinity { connection_id: connection_id.to_string(), bound_at: Utc::now() },
        );
    }
}

impl Default for PoolManager {
    fn default() -> Self {
        Self::new()
    }
}

fn select_by_strategy(strategy: PoolStrategy, connections: &[MCPConnection]) -> Option<&MCPConnection> {
    match strategy {
        PoolStrategy::WeightedByResponseTime | PoolStrategy::Hybrid => {
            connections.iter().max_by(|a, b| a.health_score.partial_cmp(&b.health_score).unwrap())
        }
        PoolStrategy::CapabilityAware => connections.first(),
        PoolStrategy::RoundRobin => connections.first(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brain_types::domain::VoiceWeights;
    use std::collections::HashSet;

    fn voice(reliability: f64, performance: f64) -> Voice {
        Voice {
            id: "developer".to_string(),
            display_name: "Developer".to_string(),
            domain: "implementation".to_string(),
            expertise_level: 0.8,
            success_rate: 0.9,
            average_quality: 80.0,
            specializations: HashSet::new(),
            preferred_capabilities: vec![],
            preferred_servers: vec![],
            avoided_servers: vec![],
            weights: VoiceWeights { reliability, performance, cost: 1.0 - reliability - performance },
        }
    }

    fn candidate(id: &str, reliability: f64) -> DiscoveredServer {
        DiscoveredServer {
            server_id: id.to_string(),
            server_name: id.to_string(),
            capabilities: ["search".to_string()].into_iter().collect(),
            categories: HashSet::new(),
            tags: HashSet::new(),
            reliability_score: reliability,
            performance_score: 50.0,
        }
    }

    #[test]
    fn high_reliability_voice_uses_weighted_by_response_time() {
        assert_eq!(strategy_for_voice(&voice(0.6, 0.2)), PoolStrategy::WeightedByResponseTime);
    }

    #[test]
    fn high_performance_voice_uses_capability_aware() {
        assert_eq!(strategy_for_voice(&voice(0.2, 0.6)), PoolStrategy::CapabilityAware);
    }

    #[test]
    fn repeated_calls_reuse_the_same_connection_via_affinity() {
        let manager = PoolManager::new();
        let voice = voice(0.6, 0.2);
        let candidates = vec![candidate("s1", 0.9), candidate("s2", 0.5)];
        let first = manager.get_connection(&voice, "search", &candidates).unwrap();
        let second = manager.get_connection(&voice, "search", &candidates).unwrap();
        assert_eq!(first.connection_id, second.connection_id);
    }
}
