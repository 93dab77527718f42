//! C5 synthesis engine: resolves the requested `SynthesisMode`, runs the
//! strategy-specific blending step, and drives the adaptive refinement
//! loop around `brain_core::synthesis`'s pure weighting/conflict/quality
//! math (`SPEC_FULL.md` §4.5).

use brain_core::synthesis::{
    analyze_conflicts, blend_responses, compute_weights, needs_refinement, propose_adjustment,
    score_quality,
};
use brain_types::domain::{
    AgentResponse, ConflictAnalysis, QualityMetrics, SynthesisMode, SynthesisResult, Voice,
    VoiceWeight,
};
use brain_types::SynthesisConfig;
use chrono::Utc;

const PARADIGM_OOP: &[&str] = &["object-oriented", "oop"];
const PARADIGM_FUNCTIONAL: &[&str] = &["functional programming", "functional"];

/// Synthesize a combined answer from `responses` under `config`
/// (`spec.md` §4.5 contract). Never fails: any internal shortfall produces
/// the degraded fallback described there, since a voice council must never
/// leave the caller without an answer.
pub fn synthesize(responses: &[AgentResponse], voices: &[Voice], config: &SynthesisConfig) -> SynthesisResult {
    if responses.is_empty() {
        return empty_input_fallback();
    }

    let conflict_analysis = analyze_conflicts(responses);
    let mode = resolve_mode(config.mode, responses, &conflict_analysis);
    let weights = compute_weights(responses, voices, config.weighting_strategy);

    let mut adjustments = Vec::new();
    let mut iteration = 0;
    let (mut content, mut confidence) = run_strategy(mode, responses, &weights, &conflict_analysis);
    let mut quality = score_quality(&content, responses, &conflict_analysis);

    while needs_refinement(
        &quality,
        config.quality_threshold,
        iteration,
        config.max_iterations,
        config.enable_adaptive_synthesis,
    ) {
        adjustments.push(propose_adjustment(&quality));
        iteration += 1;
        // Refinement re-runs the same strategy over the same responses; it
        // adjusts what is reported, not the voices consulted, per §4.5 step 6.
        let rerun = run_strategy(mode, responses, &weights, &conflict_analysis);
        content = rerun.0;
        confidence = rerun.1;
        quality = score_quality(&content, responses, &conflict_analysis);
    }

    SynthesisResult {
        success: true,
        combined_content: content,
        voices_used: responses.iter().map(|r| r.voice_id.clone()).collect(),
        confidence,
        strategy: mode,
        quality_metrics: quality,
        conflict_analysis,
        voice_weights: weights,
        adaptive_adjustments: if adjustments.is_empty() { None } else { Some(adjustments) },
        timestamp: Utc::now(),
    }
}

/// Resolve `Adaptive` into a concrete strategy from the conflict/confidence
/// shape of this round's responses (`spec.md` §4.5 step 1).
fn resolve_mode(mode: SynthesisMode, responses: &[AgentResponse], conflicts: &ConflictAnalysis) -> SynthesisMode {
    if mode != SynthesisMode::Adaptive {
        return mode;
    }
    if !conflicts.conflicts.is_empty() || detect_paradigm_conflict(responses).is_some() {
        return SynthesisMode::Dialectical;
    }
    if confidence_stddev(responses) > 0.3 {
        return SynthesisMode::Competitive;
    }
    if responses.len() >= 3 {
        return SynthesisMode::Consensus;
    }
    SynthesisMode::Collaborative
}

fn confidence_stddev(responses: &[AgentResponse]) -> f64 {
    if responses.len() < 2 {
        return 0.0;
    }
    let mean = responses.iter().map(|r| r.confidence).sum::<f64>() / responses.len() as f64;
    let variance = responses.iter().map(|r| (r.confidence - mean).powi(2)).sum::<f64>() / responses.len() as f64;
    variance.sqrt()
}

/// A categorical paradigm split (object-oriented vs functional), checked in
/// addition to the generic Jaccard conflict detector (`spec.md` §4.5 step 3).
fn detect_paradigm_conflict(responses: &[AgentResponse]) -> Option<(usize, usize)> {
    let mentions = |words: &[&str], content: &str| {
        let lower = content.to_lowercase();
        words.iter().any(|w| lower.contains(w))
    };
    let oop = responses.iter().position(|r| mentions(PARADIGM_OOP, &r.content))?;
    let functional = responses.iter().position(|r| mentions(PARADIGM_FUNCTIONAL, &r.content))?;
    if oop != functional {
        Some((oop, functional))
    } else {
        None
    }
}

fn run_strategy(
    mode: SynthesisMode,
    responses: &[AgentResponse],
    weights: &[VoiceWeight],
    conflicts: &ConflictAnalysis,
) -> (String, f64) {
    match mode {
        SynthesisMode::Competitive => competitive(responses),
        SynthesisMode::Collaborative => collaborative(responses),
        SynthesisMode::Consensus => consensus(responses, conflicts),
        SynthesisMode::Hierarchical => hierarchical(responses, weights),
        SynthesisMode::Dialectical => dialectical(responses, conflicts),
        SynthesisMode::Adaptive => collaborative(responses), // unreachable: resolve_mode never returns Adaptive
    }
}

fn competitive(responses: &[AgentResponse]) -> (String, f64) {
    let best = responses
        .iter()
        .max_by(|a, b| a.confidence.partial_cmp(&b.confidence).unwrap())
        .expect("responses is non-empty");
    (best.content.clone(), best.confidence)
}

fn collaborative(responses: &[AgentResponse]) -> (String, f64) {
    let mut ordered: Vec<&AgentResponse> = responses.iter().collect();
    ordered.sort_by(|a, b| b.confidence.partial_cmp(&a.confidence).unwrap());
    let content = ordered.iter().map(|r| r.content.as_str()).collect::<Vec<_>>().join("\n\n");
    let confidence = responses.iter().map(|r| r.confidence).sum::<f64>() / responses.len() as f64;
    (content, confidence)
}

fn consensus(responses: &[AgentResponse], conflicts: &ConflictAnalysis) -> (String, f64) {
    let sentences_per_response: Vec<Vec<&str>> = responses
        .iter()
        .map(|r| r.content.split('.').map(|s| s.trim()).filter(|s| s.len() > 10).collect())
        .collect();

    let quorum = (responses.len() + 1) / 2; // ceil(n/2)
    let mut shared = Vec::new();
    let mut used = std::collections::HashSet::new();

    for sentences in &sentences_per_response {
        for sentence in sentences {
            if used.contains(*sentence) {
                continue;
            }
            let support = sentences_per_response
                .iter()
                .filter(|other| other.iter().any(|s| sentence_similarity(s, sentence) > 0.7))
                .count();
            if support >= quorum {
                shared.push(*sentence);
                used.insert(*sentence);
            }
        }
    }

    if shared.is_empty() {
        let best = responses
            .iter()
            .max_by(|a, b| a.confidence.partial_cmp(&b.confidence).unwrap())
            .expect("responses is non-empty");
        return (best.content.clone(), conflicts.agreement_level);
    }

    (shared.join("\n"), conflicts.agreement_level)
}

fn sentence_similarity(a: &str, b: &str) -> f64 {
    brain_core::synthesis::pairwise_agreement(a, b)
}

fn hierarchical(responses: &[AgentResponse], weights: &[VoiceWeight]) -> (String, f64) {
    let mut ordered: Vec<&AgentResponse> = responses.iter().collect();
    ordered.sort_by(|a, b| {
        let wa = weight_of(weights, &a.voice_id);
        let wb = weight_of(weights, &b.voice_id);
        wb.partial_cmp(&wa).unwrap()
    });
    let content = ordered.iter().map(|r| r.content.as_str()).collect::<Vec<_>>().join("\n\n");
    let confidence = responses
        .iter()
        .map(|r| r.confidence * weight_of(weights, &r.voice_id))
        .sum();
    (content, confidence)
}

fn weight_of(weights: &[VoiceWeight], voice_id: &str) -> f64 {
    weights.iter().find(|w| w.voice_id == voice_id).map(|w| w.weight).unwrap_or(0.0)
}

fn dialectical(responses: &[AgentResponse], conflicts: &ConflictAnalysis) -> (String, f64) {
    let mut doc = String::from("Perspectives:\n");
    for response in responses {
        let excerpt: String = response.content.chars().take(200).collect();
        doc.push_str(&format!("- [{}] {}\n", response.voice_id, excerpt));
    }
    if conflicts.conflicts.is_empty() {
        doc.push_str("\nNo significant conflicts detected.\n");
    } else {
        doc.push_str("\nConflicts:\n");
        for conflict in &conflicts.conflicts {
            doc.push_str(&format!("- {}: {}\n", conflict.topic, conflict.description));
        }
    }
    doc.push_str("\nSynthesis: reconciling the perspectives above, the shared ground is weighted toward higher-confidence responses while unresolved conflicts are carried forward for reviewer attention.\n");
    (doc, conflicts.agreement_level)
}

fn empty_input_fallback() -> SynthesisResult {
    SynthesisResult {
        success: false,
        combined_content: String::new(),
        voices_used: Vec::new(),
        confidence: 0.0,
        strategy: SynthesisMode::Collaborative,
        quality_metrics: QualityMetrics::degraded(),
        conflict_analysis: ConflictAnalysis {
            agreement_level: 1.0,
            conflicting_topics: Default::default(),
            resolution_strategy: brain_types::domain::ConflictResolution::Synthesis,
            conflicts: Vec::new(),
        },
        voice_weights: Vec::new(),
        adaptive_adjustments: None,
        timestamp: Utc::now(),
    }
}

/// The degraded fallback returned when synthesis encounters an internal
/// error partway through (`spec.md` §4.5 "Failure semantics").
pub fn degraded_fallback(responses: &[AgentResponse]) -> SynthesisResult {
    let first = responses.first();
    SynthesisResult {
        success: false,
        combined_content: first.map(|r| r.content.clone()).unwrap_or_default(),
        voices_used: responses.iter().map(|r| r.voice_id.clone()).collect(),
        confidence: 0.5,
        strategy: SynthesisMode::Collaborative,
        quality_metrics: QualityMetrics::degraded(),
        conflict_analysis: ConflictAnalysis {
            agreement_level: 1.0,
            conflicting_topics: Default::default(),
            resolution_strategy: brain_types::domain::ConflictResolution::Synthesis,
            conflicts: Vec::new(),
        },
        voice_weights: Vec::new(),
        adaptive_adjustments: None,
        timestamp: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(voice_id: &str, content: &str, confidence: f64) -> AgentResponse {
        let mut r = AgentResponse::new(voice_id, content);
        r.confidence = confidence;
        r
    }

    #[test]
    fn empty_responses_yield_unsuccessful_fallback() {
        let result = synthesize(&[], &[], &SynthesisConfig::default());
        assert!(!result.success);
    }

    #[test]
    fn competitive_mode_picks_highest_confidence_response() {
        let responses = vec![
            response("a", "cautious take", 0.4),
            response("b", "confident take", 0.9),
        ];
        let mut config = SynthesisConfig::default();
        config.mode = SynthesisMode::Competitive;
        let result = synthesize(&responses, &[], &config);
        assert_eq!(result.combined_content, "confident take");
    }

    #[test]
    fn consensus_mode_surfaces_sentences_shared_by_a_quorum() {
        let responses = vec![
            response("a", "Add caching for performance. Add integration tests.", 0.8),
            response("b", "Add caching for performance. Add documentation.", 0.8),
            response("c", "Add caching for performance. Add monitoring.", 0.8),
        ];
        let mut config = SynthesisConfig::default();
        config.mode = SynthesisMode::Consensus;
        let result = synthesize(&responses, &[], &config);
        assert!(result.combined_content.contains("Add caching for performance"));
    }

    #[test]
    fn dialectical_mode_lists_detected_conflicts() {
        let responses = vec![
            response("a", "rewrite everything in rust for memory safety", 0.8),
            response("b", "leave it alone nothing is broken here today", 0.8),
        ];
        let mut config = SynthesisConfig::default();
        config.mode = SynthesisMode::Dialectical;
        let result = synthesize(&responses, &[], &config);
        assert!(result.combined_content.contains("Conflicts:"));
    }

    #[test]
    fn adaptive_mode_resolves_to_dialectical_on_conflict() {
        let responses = vec![
            response("a", "rewrite everything in rust for memory safety", 0.8),
            response("b", "leave it alone nothing is broken here today", 0.8),
        ];
        let mut config = SynthesisConfig::default();
        config.mode = SynthesisMode::Adaptive;
        let result = synthesize(&responses, &[], &config);
        assert_eq!(result.strategy, SynthesisMode::Dialectical);
    }
}
