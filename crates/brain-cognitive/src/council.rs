//! C6 council orchestrator: the single entry point that ties together
//! voice selection (C4), concurrent voice dispatch, and synthesis (C5)
//! into one call (`spec.md` §4.4-§4.5 orchestration, per `SPEC_FULL.md`
//! §4.4 "built on ... the registry of built-in voice archetypes").

use crate::selector::select_team;
use crate::synthesis::synthesize;
use crate::voices::{VoiceBackend, VoiceRegistry};
use brain_core::selection::{SelectionResult, TaskContext};
use brain_types::domain::{AgentResponse, SynthesisResult};
use brain_types::{BrainResult, SelectorConfig, SynthesisConfig};
use std::sync::Arc;
use std::time::Duration;

/// One full council round: select a team, dispatch it concurrently against
/// `backend`, and synthesize the responses.
pub struct Council {
    registry: Arc<VoiceRegistry>,
    backend: Arc<dyn VoiceBackend>,
    selector_config: SelectorConfig,
    synthesis_config: SynthesisConfig,
}

impl Council {
    pub fn new(
        registry: Arc<VoiceRegistry>,
        backend: Arc<dyn VoiceBackend>,
        selector_config: SelectorConfig,
        synthesis_config: SynthesisConfig,
    ) -> Self {
        Self {
            registry,
            backend,
            selector_config,
            synthesis_config,
        }
    }

    /// Select and dispatch the team, returning both raw responses and the
    /// final `SynthesisResult`. Voice dispatch runs concurrently; per §5,
    /// dispatch is bounded by `timeout_ms` and synthesis proceeds with
    /// whatever responses actually arrived.
    pub async fn deliberate(&self, ctx: &TaskContext) -> BrainResult<(SelectionResult, SynthesisResult)> {
        let (selection, team) = select_team(ctx, &self.registry, &self.selector_config)?;

        let deadline = Duration::from_millis(self.synthesis_config.timeout_ms);
        let calls = team.iter().map(|voice| {
            let backend = Arc::clone(&self.backend);
            let voice = voice.clone();
            let prompt = ctx.prompt.clone();
            async move {
                tokio::time::timeout(deadline, backend.generate(&voice, &prompt, &[]))
                    .await
                    .ok()
                    .and_then(|r| r.ok())
            }
        });

        let responses: Vec<AgentResponse> = futures::future::join_all(calls).await.into_iter().flatten().collect();

        let synthesis = synthesize(&responses, &team, &self.synthesis_config);
        Ok((selection, synthesis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voices::{default_voices, EchoBackend};

    fn registry() -> Arc<VoiceRegistry> {
        let registry = VoiceRegistry::new();
        for voice in default_voices() {
            registry.register(voice).unwrap();
        }
        Arc::new(registry)
    }

    #[tokio::test]
    async fn single_voice_deliberation_produces_a_confident_answer() {
        let council = Council::new(
            registry(),
            Arc::new(EchoBackend),
            SelectorConfig::default(),
            SynthesisConfig::default(),
        );
        let ctx = TaskContext {
            prompt: "Print hello world".to_string(),
            category: "implementation".to_string(),
            estimated_tokens: 20,
            user_preference: None,
            time_constraint: None,
        };
        let (selection, synthesis) = council.deliberate(&ctx).await.unwrap();
        assert_eq!(selection.voices.len(), 1);
        assert!(synthesis.success);
    }

    #[tokio::test]
    async fn multi_voice_deliberation_synthesizes_every_response() {
        let council = Council::new(
            registry(),
            Arc::new(EchoBackend),
            SelectorConfig::default(),
            SynthesisConfig::default(),
        );
        let ctx = TaskContext {
            prompt: "Design a scalable, secure, concurrent architecture and integrate the security layer.".to_string(),
            category: "architecture".to_string(),
            estimated_tokens: 200,
            user_preference: None,
            time_constraint: None,
        };
        let (selection, synthesis) = council.deliberate(&ctx).await.unwrap();
        assert!(selection.voices.len() > 1);
        assert_eq!(synthesis.voices_used.len(), selection.voices.len());
    }
}
