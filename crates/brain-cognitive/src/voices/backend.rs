//! The seam between a `Voice` persona and whatever language-model backend
//! actually answers for it.
//!
//! Grounded on the teacher's `BrainAgent::execute` async trait object
//! pattern, stripped of `CognitiveContext`/`MetaMemoryRepository` (this
//! engine's context is the plain `&[AgentResponse]` history, not a
//! full cognitive-memory session) and retargeted at `Voice`/`AgentResponse`
//! (`SPEC_FULL.md` §4.4).

use async_trait::async_trait;
use brain_types::domain::{AgentResponse, Voice};
use brain_types::BrainResult;

/// Generates one voice's answer to a prompt, given the other responses
/// already collected in this round (so a backend can see what peers said
/// when `context` is non-empty, e.g. for a dialectical second pass).
#[async_trait]
pub trait VoiceBackend: Send + Sync {
    async fn generate(
        &self,
        voice: &Voice,
        prompt: &str,
        context: &[AgentResponse],
    ) -> BrainResult<AgentResponse>;
}

/// A backend that echoes a deterministic canned answer, used by tests and
/// by `brain-cli`'s worked example when no real model backend is wired in.
pub struct EchoBackend;

#[async_trait]
impl VoiceBackend for EchoBackend {
    async fn generate(
        &self,
        voice: &Voice,
        prompt: &str,
        _context: &[AgentResponse],
    ) -> BrainResult<AgentResponse> {
        let mut response = AgentResponse::new(
            voice.id.clone(),
            format!("[{}] perspective on: {}", voice.display_name, prompt),
        );
        response.confidence = voice.average_quality / 100.0;
        Ok(response)
    }
}
