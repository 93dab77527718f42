//! Synthesis math (C5), pure and I/O-free.
//!
//! `brain-cognitive::synthesis` drives the adaptive refinement loop around
//! these functions; everything here is deterministic given its inputs so it
//! can be unit-tested without spinning up voices (`spec.md` §4.5).

use brain_types::domain::{
    AdaptiveAdjustment, AgentResponse, ConflictAnalysis, ConflictResolution, ConflictSeverity,
    QualityMetrics, Voice, VoiceConflict, VoiceWeight, WeightingStrategy,
};
use brain_types::{lowercase_words, INNOVATION_WORDS, PRACTICALITY_WORDS, SHARED_DOMAIN_BOOST_WORDS};
use std::collections::HashSet;

/// Compute normalized per-voice weights for a set of responses under a
/// weighting strategy (`spec.md` §4.5 step 1). Weights always sum to 1.0
/// across `responses` (barring an empty input, which returns an empty vec).
pub fn compute_weights(
    responses: &[AgentResponse],
    voices: &[Voice],
    strategy: WeightingStrategy,
) -> Vec<VoiceWeight> {
    if responses.is_empty() {
        return Vec::new();
    }

    let raw: Vec<f64> = responses
        .iter()
        .map(|r| {
            let voice = voices.iter().find(|v| v.id == r.voice_id);
            match strategy {
                WeightingStrategy::ConfidenceBased => r.confidence,
                WeightingStrategy::ExpertiseBased => {
                    voice.map(|v| v.expertise_level).unwrap_or(0.5)
                }
                WeightingStrategy::Balanced => {
                    let expertise = voice.map(|v| v.expertise_level).unwrap_or(0.5);
                    (r.confidence + expertise) / 2.0
                }
                WeightingStrategy::PerformanceBased => {
                    voice.map(|v| v.success_rate).unwrap_or(0.5)
                }
            }
        })
        .collect();

    let total: f64 = raw.iter().sum();
    let total = if total <= f64::EPSILON { raw.len() as f64 } else { total };

    responses
        .iter()
        .zip(raw.iter())
        .map(|(r, w)| VoiceWeight {
            voice_id: r.voice_id.clone(),
            weight: if total > 0.0 { w / total } else { 1.0 / responses.len() as f64 },
            reason: format!("{:?}", strategy),
        })
        .collect()
}

/// Jaccard similarity between two responses' lowercase word sets, boosted
/// when both mention a shared domain term (`spec.md` §4.5 step 3).
pub fn pairwise_agreement(a: &str, b: &str) -> f64 {
    let words_a: HashSet<String> = lowercase_words(a).into_iter().collect();
    let words_b: HashSet<String> = lowercase_words(b).into_iter().collect();

    if words_a.is_empty() || words_b.is_empty() {
        return 0.0;
    }

    let intersection = words_a.intersection(&words_b).count() as f64;
    let union = words_a.union(&words_b).count() as f64;
    let jaccard = if union > 0.0 { intersection / union } else { 0.0 };

    let shared_domain_boost = SHARED_DOMAIN_BOOST_WORDS
        .iter()
        .filter(|w| words_a.contains(**w) && words_b.contains(**w))
        .count() as f64
        * 0.05;

    (jaccard + shared_domain_boost).min(1.0)
}

/// Detect pairwise conflicts among responses and summarize agreement level.
///
/// A pair is flagged as a conflict when its agreement falls below 0.3.
/// Severity escalates the further below the threshold the pair falls.
pub fn analyze_conflicts(responses: &[AgentResponse]) -> ConflictAnalysis {
    let mut conflicts = Vec::new();
    let mut conflicting_topics = HashSet::new();
    let mut agreements = Vec::new();

    for i in 0..responses.len() {
        for j in (i + 1)..responses.len() {
            let agreement = pairwise_agreement(&responses[i].content, &responses[j].content);
            agreements.push(agreement);

            if agreement < 0.3 {
                let severity = if agreement < 0.1 {
                    ConflictSeverity::High
                } else if agreement < 0.2 {
                    ConflictSeverity::Medium
                } else {
                    ConflictSeverity::Low
                };
                let topic = format!("{}-vs-{}", responses[i].voice_id, responses[j].voice_id);
                conflicting_topics.insert(topic.clone());
                conflicts.push(VoiceConflict {
                    id: uuid::Uuid::new_v4(),
                    topic,
                    voice_a_id: responses[i].voice_id.clone(),
                    voice_b_id: responses[j].voice_id.clone(),
                    severity,
                    description: format!(
                        "agreement {:.2} below threshold between {} and {}",
                        agreement, responses[i].voice_id, responses[j].voice_id
                    ),
                });
            }
        }
    }

    let agreement_level = if agreements.is_empty() {
        1.0
    } else {
        agreements.iter().sum::<f64>() / agreements.len() as f64
    };

    let resolution_strategy = if conflicts.iter().any(|c| c.severity == ConflictSeverity::High) {
        ConflictResolution::ExpertAuthority
    } else if !conflicts.is_empty() {
        ConflictResolution::WeightedAverage
    } else {
        ConflictResolution::Synthesis
    };

    ConflictAnalysis {
        agreement_level,
        conflicting_topics,
        resolution_strategy,
        conflicts,
    }
}

/// Score the six quality sub-metrics for a combined synthesis (`spec.md` §4.5
/// step 5). Each sub-metric is a 0-100 scale; `overall` is their mean.
pub fn score_quality(
    combined_content: &str,
    responses: &[AgentResponse],
    conflict_analysis: &ConflictAnalysis,
) -> QualityMetrics {
    let coherence = (conflict_analysis.agreement_level * 100.0).clamp(0.0, 100.0);

    let completeness = if responses.is_empty() {
        0.0
    } else {
        let avg_len: f64 =
            responses.iter().map(|r| r.content.len() as f64).sum::<f64>() / responses.len() as f64;
        (combined_content.len() as f64 / avg_len.max(1.0) * 50.0).clamp(0.0, 100.0)
    };

    let accuracy = if responses.is_empty() {
        50.0
    } else {
        (responses.iter().map(|r| r.confidence).sum::<f64>() / responses.len() as f64 * 100.0)
            .clamp(0.0, 100.0)
    };

    let lower = combined_content.to_lowercase();
    let innovation_hits = INNOVATION_WORDS.iter().filter(|w| lower.contains(*w)).count();
    let innovation = (50.0 + innovation_hits as f64 * 10.0).clamp(0.0, 100.0);

    let practicality_hits = PRACTICALITY_WORDS.iter().filter(|w| lower.contains(*w)).count();
    let practicality = (50.0 + practicality_hits as f64 * 10.0).clamp(0.0, 100.0);

    let overall = (coherence + completeness + accuracy + innovation + practicality) / 5.0;

    QualityMetrics {
        coherence,
        completeness,
        accuracy,
        innovation,
        practicality,
        overall,
    }
}

/// Decide whether the adaptive refinement loop should run another pass
/// (`spec.md` §4.5 step 6): only when adaptive synthesis is enabled, quality
/// is below threshold, and the iteration budget isn't exhausted.
pub fn needs_refinement(
    quality: &QualityMetrics,
    quality_threshold: f64,
    iteration: u32,
    max_iterations: u32,
    adaptive_enabled: bool,
) -> bool {
    adaptive_enabled && quality.overall < quality_threshold && iteration < max_iterations
}

/// Describe the adjustment the next refinement pass should apply, targeting
/// whichever sub-metric scored lowest.
pub fn propose_adjustment(quality: &QualityMetrics) -> AdaptiveAdjustment {
    let candidates = [
        ("coherence", quality.coherence),
        ("completeness", quality.completeness),
        ("accuracy", quality.accuracy),
        ("innovation", quality.innovation),
        ("practicality", quality.practicality),
    ];
    let (metric, observed) = candidates
        .iter()
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap())
        .copied()
        .unwrap_or(("overall", quality.overall));

    AdaptiveAdjustment {
        metric: metric.to_string(),
        observed,
        description: format!("{} scored {:.1}, below target; re-weighting toward it", metric, observed),
    }
}

/// Blend weighted responses into a single combined string (`spec.md` §4.5
/// step 4, collaborative/consensus path): sentences present in at least two
/// responses' word sets are kept once; the rest are appended by descending
/// weight.
pub fn blend_responses(responses: &[AgentResponse], weights: &[VoiceWeight]) -> String {
    let mut ordered: Vec<&AgentResponse> = responses.iter().collect();
    ordered.sort_by(|a, b| {
        let wa = weights.iter().find(|w| w.voice_id == a.voice_id).map(|w| w.weight).unwrap_or(0.0);
        let wb = weights.iter().find(|w| w.voice_id == b.voice_id).map(|w| w.weight).unwrap_or(0.0);
        wb.partial_cmp(&wa).unwrap()
    });

    let mut seen_sentences: HashSet<String> = HashSet::new();
    let mut out = String::new();
    for response in ordered {
        for sentence in response.content.split(". ") {
            let trimmed = sentence.trim();
            if trimmed.is_empty() {
                continue;
            }
            let key = trimmed.to_lowercase();
            if seen_sentences.insert(key) {
                if !out.is_empty() {
                    out.push_str(". ");
                }
                out.push_str(trimmed);
            }
        }
    }
    if !out.ends_with('.') {
        out.push('.');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voice(id: &str, expertise: f64, success: f64) -> Voice {
        Voice {
            id: id.to_string(),
            display_name: id.to_string(),
            domain: "implementation".to_string(),
            expertise_level: expertise,
            success_rate: success,
            average_quality: 80.0,
            specializations: HashSet::new(),
            preferred_capabilities: vec![],
            preferred_servers: vec![],
            avoided_servers: vec![],
            weights: Default::default(),
        }
    }

    #[test]
    fn weights_sum_to_one() {
        let responses = vec![
            AgentResponse::new("a", "uses caching for performance"),
            AgentResponse::new("b", "adds tests for correctness"),
        ];
        let voices = vec![voice("a", 0.8, 0.9), voice("b", 0.6, 0.7)];
        let weights = compute_weights(&responses, &voices, WeightingStrategy::Balanced);
        let sum: f64 = weights.iter().map(|w| w.weight).sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn identical_responses_fully_agree() {
        let agreement = pairwise_agreement("use a cache for performance", "use a cache for performance");
        assert!(agreement > 0.9);
    }

    #[test]
    fn disjoint_responses_conflict() {
        let responses = vec![
            AgentResponse::new("a", "rewrite everything in rust for memory safety"),
            AgentResponse::new("b", "leave it alone nothing is broken here today"),
        ];
        let analysis = analyze_conflicts(&responses);
        assert!(analysis.agreement_level < 0.3);
        assert_eq!(analysis.conflicts.len(), 1);
    }

    #[test]
    fn no_responses_means_perfect_agreement() {
        let analysis = analyze_conflicts(&[]);
        assert_eq!(analysis.agreement_level, 1.0);
        assert!(analysis.conflicts.is_empty());
    }

    #[test]
    fn blend_deduplicates_shared_sentences() {
        let responses = vec![
            AgentResponse::new("a", "Add caching. Add tests"),
            AgentResponse::new("b", "Add caching. Add docs"),
        ];
        let weights = vec![
            VoiceWeight { voice_id: "a".into(), weight: 0.6, reason: "x".into() },
            VoiceWeight { voice_id: "b".into(), weight: 0.4, reason: "x".into() },
        ];
        let blended = blend_responses(&responses, &weights);
        assert_eq!(blended.matches("Add caching").count(), 1);
    }

    #[test]
    fn refinement_stops_at_iteration_budget() {
        let quality = QualityMetrics::degraded();
        assert!(!needs_refinement(&quality, 75.0, 3, 3, true));
        assert!(needs_refinement(&quality, 75.0, 1, 3, true));
        assert!(!needs_refinement(&quality, 75.0, 1, 3, false));
    }
}
