//! In-memory registry of `Voice` archetypes.
//!
//! Adapted from the teacher's `AgentRegistry`: a `RwLock<HashMap>` of
//! records plus secondary indices, kept as `std::sync::RwLock` rather than
//! `tokio::sync::RwLock` since registration and lookup never cross an
//! `.await` point (the teacher's own non-async registry accessors use the
//! same pattern). Unlike `AgentRegistry`, entries are plain `Voice` data,
//! not `Arc<dyn BrainAgent>` trait objects — the behavior lives in
//! `VoiceBackend`, injected separately by the caller.

use brain_types::domain::Voice;
use brain_types::{BrainError, BrainResult};
use std::collections::HashMap;
use std::sync::RwLock;

pub struct VoiceRegistry {
    voices: RwLock<HashMap<String, Voice>>,
}

impl VoiceRegistry {
    pub fn new() -> Self {
        Self {
            voices: RwLock::new(HashMap::new()),
        }
    }

    pub fn register(&self, voice: Voice) -> BrainResult<()> {
        let mut voices = self
            .voices
            .write()
            .map_err(|e| BrainError::LockError(format!("voice registry poisoned: {e}")))?;
        voices.insert(voice.id.clone(), voice);
        Ok(())
    }

    pub fn get(&self, voice_id: &str) -> BrainResult<Option<Voice>> {
        let voices = self
            .voices
            .read()
            .map_err(|e| BrainError::LockError(format!("voice registry poisoned: {e}")))?;
        Ok(voices.get(voice_id).cloned())
    }

    pub fn all(&self) -> BrainResult<Vec<Voice>> {
        let voices = self
            .voices
            .read()
            .map_err(|e| BrainError::LockError(format!("voice registry poisoned: {e}")))?;
        Ok(voices.values().cloned().collect())
    }

    /// Voices whose domain or specializations mention `keyword`, case-insensitively.
    pub fn matching(&self, keyword: &str) -> BrainResult<Vec<Voice>> {
        let voices = self
            .voices
            .read()
            .map_err(|e| BrainError::LockError(format!("voice registry poisoned: {e}")))?;
        Ok(voices
            .values()
            .filter(|v| v.matches_keyword(keyword))
            .cloned()
            .collect())
    }

    pub fn len(&self) -> BrainResult<usize> {
        Ok(self
            .voices
            .read()
            .map_err(|e| BrainError::LockError(format!("voice registry poisoned: {e}")))?
            .len())
    }

    pub fn is_empty(&self) -> BrainResult<bool> {
        Ok(self.len()? == 0)
    }
}

impl Default for VoiceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voices::builtin::default_voices;

    #[test]
    fn registered_voices_are_retrievable_by_id() {
        let registry = VoiceRegistry::new();
        for voice in default_voices() {
            registry.register(voice).unwrap();
        }
        let developer = registry.get("developer").unwrap();
        assert!(developer.is_some());
    }

    #[test]
    fn matching_finds_security_voice_by_keyword() {
        let registry = VoiceRegistry::new();
        for voice in default_voices() {
            registry.register(voice).unwrap();
        }
        let matches = registry.matching("security").unwrap();
        assert!(matches.iter().any(|v| v.id == "security"));
    }
}
