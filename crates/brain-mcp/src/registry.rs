//! Discovery index over registered MCP servers: capability/category/tag
//! lookups plus the preferred/avoided-server filtering a voice applies on
//! top (`spec.md` §4.6 "Server selection" steps 1-4).

use brain_types::domain::{DiscoveredServer, Voice};
use brain_types::{BrainError, BrainResult};
use std::collections::HashMap;
use std::sync::RwLock;

pub struct ServerQuery {
    pub capability: String,
    pub min_reliability: f64,
    pub min_performance: f64,
}

/// Registered MCP servers, indexed by capability for O(1) candidate
/// lookup. Adapted from the teacher's `ToolRegistry` (a plain
/// `RwLock<HashMap>`), generalized with a capability index since one
/// server here can serve many capabilities.
pub struct DiscoveryIndex {
    servers: RwLock<HashMap<String, DiscoveredServer>>,
}

impl DiscoveryIndex {
    pub fn new() -> Self {
        Self {
            servers: RwLock::new(HashMap::new()),
        }
    }

    pub fn register(&self, server: DiscoveredServer) -> BrainResult<()> {
        let mut servers = self
            .servers
            .write()
            .map_err(|e| BrainError::LockError(format!("discovery index poisoned: {e}")))?;
        servers.insert(server.server_id.clone(), server);
        Ok(())
    }

    /// Run `query`, then filter by the voice's `preferredServers`/
    /// `avoidedServers` (`spec.md` §4.6 step 3); errors with
    /// `NoSuitableServer` if nothing remains.
    pub fn select_candidates(&self, query: &ServerQuery, voice: &Voice) -> BrainResult<Vec<DiscoveredServer>> {
        let servers = self
            .servers
            .read()
            .map_err(|e| BrainError::LockError(format!("discovery index poisoned: {e}")))?;

        let mut candidates: Vec<DiscoveredServer> = servers
            .values()
            .filter(|s| s.capabilities.contains(&query.capability))
            .filter(|s| s.reliability_score >= query.min_reliability)
            .filter(|s| s.performance_score >= query.min_performance)
            .filter(|s| voice.avoided_servers.iter().all(|avoided| avoided != &s.server_id))
            .cloned()
            .collect();

        if !voice.preferred_servers.is_empty() {
            let preferred: Vec<DiscoveredServer> =
                candidates.iter().filter(|s| voice.preferred_servers.contains(&s.server_id)).cloned().collect();
            if !preferred.is_empty() {
                candidates = preferred;
            }
        }

        if candidates.is_empty() {
            return Err(BrainError::NoSuitableServer(query.capability.clone()));
        }
        Ok(candidates)
    }
}

impl Default for DiscoveryIndex {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the query a voice's weights imply for a capability request
/// (`spec.md` §4.6 step 1).
pub fn build_query(capability: &str, voice: &Voice) -> ServerQuery {
    ServerQuery {
        capability: capability.to_string(),
        min_reliability: voice.weights.reliability * 100.0,
        min_performance: voice.weights.performance * 100.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brain_types::domain::VoiceWeights;
    use std::collections::HashSet;

    fn server(id: &str, capability: &str, reliability: f64) -> DiscoveredServer {
        DiscoveredServer {
            server_id: id.to_string(),
            server_name: id.to_string(),
            capabilities: [capability.to_string()].into_iter().collect(),
            categories: HashSet::new(),
            tags: HashSet::new(),
            reliability_score: reliability,
            performance_score: 80.0,
        }
    }

    fn voice_with(preferred: Vec<&str>, avoided: Vec<&str>) -> Voice {
        Voice {
            id: "developer".to_string(),
            display_name: "Developer".to_string(),
            domain: "implementation".to_string(),
            expertise_level: 0.8,
            success_rate: 0.9,
            average_quality: 80.0,
            specializations: HashSet::new(),
            preferred_capabilities: vec![],
            preferred_servers: preferred.into_iter().map(String::from).collect(),
            avoided_servers: avoided.into_iter().map(String::from).collect(),
            weights: VoiceWeights::default(),
        }
    }

    #[test]
    fn no_matching_capability_errors_no_suitable_server() {
        let index = DiscoveryIndex::new();
        index.register(server("s1", "search", 90.0)).unwrap();
        let voice = voice_with(vec![], vec![]);
        let query = build_query("compile", &voice);
        assert!(index.select_candidates(&query, &voice).is_err());
    }

    #[test]
    fn avoided_server_is_filtered_out() {
        let index = DiscoveryIndex::new();
        index.register(server("s1", "search", 90.0)).unwrap();
        index.register(server("s2", "search", 90.0)).unwrap();
        let voice = voice_with(vec![], vec!["s1"]);
        let query = build_query("search", &voice);
        let candidates = index.select_candidates(&query, &voice).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].server_id, "s2");
    }

    #[test]
    fn preferred_server_narrows_candidates_when_present() {
        let index = DiscoveryIndex::new();
        index.register(server("s1", "search", 90.0)).unwrap();
        index.register(server("s2", "search", 90.0)).unwrap();
        let voice = voice_with(vec!["s2"], vec![]);
        let query = build_query("search", &voice);
        let candidates = index.select_candidates(&query, &voice).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].server_id, "s2");
    }
}
