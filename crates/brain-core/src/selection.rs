//! Voice selection heuristics (C4), pure and I/O-free.
//!
//! `brain-cognitive::selector` wraps this module with the actual
//! `VoiceRegistry` lookup; everything here operates on plain data so it can
//! be unit-tested without an async runtime (`spec.md` §4.4).

use brain_types::domain::{Voice, VoiceId};
use brain_types::SelectorConfig;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Complexity {
    Simple,
    Moderate,
    Complex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPreference {
    Single,
    Multi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    Single,
    Multi,
}

#[derive(Debug, Clone)]
pub struct TaskContext {
    pub prompt: String,
    pub category: String,
    pub estimated_tokens: u32,
    pub user_preference: Option<SelectionPreference>,
    pub time_constraint: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct SelectionResult {
    pub voices: Vec<VoiceId>,
    pub mode: SelectionMode,
    pub expected_quality_gain: f64,
    pub estimated_overhead: f64,
    pub roi_score: f64,
    pub reasoning: String,
}

/// Domain calibration table from `spec.md` §4.4 (immutable).
#[derive(Debug, Clone, Copy)]
pub struct RoiProfile {
    pub expected_quality_gain_percent: f64,
    pub estimated_overhead_percent: f64,
}

impl RoiProfile {
    pub fn roi(&self) -> f64 {
        self.expected_quality_gain_percent / self.estimated_overhead_percent
    }
}

pub fn roi_profile(complexity: Complexity) -> RoiProfile {
    match complexity {
        Complexity::Simple => RoiProfile {
            expected_quality_gain_percent: 14.3,
            estimated_overhead_percent: 183.3,
        },
        Complexity::Moderate => RoiProfile {
            expected_quality_gain_percent: 25.0,
            estimated_overhead_percent: 154.5,
        },
        Complexity::Complex => RoiProfile {
            expected_quality_gain_percent: 35.0,
            estimated_overhead_percent: 151.6,
        },
    }
}

/// Classify a prompt's complexity per the weighted keyword-bag heuristic.
pub fn classify_complexity(prompt: &str) -> Complexity {
    let lower = prompt.to_lowercase();
    let word_count = lower.split_whitespace().count();

    let simple_hits = brain_types::SIMPLE_KEYWORDS
        .iter()
        .filter(|k| lower.contains(*k))
        .count();
    let moderate_hits = brain_types::MODERATE_KEYWORDS
        .iter()
        .filter(|k| lower.contains(*k))
        .count();
    let complex_hits = brain_types::COMPLEX_KEYWORDS
        .iter()
        .filter(|k| lower.contains(*k))
        .count();

    let score = 3 * complex_hits + 2 * moderate_hits + simple_hits;

    let has_multi_requirement_connector = brain_types::MULTI_REQUIREMENT_CONNECTORS
        .iter()
        .any(|c| lower.contains(c));

    if score >= 5 || word_count > 50 || has_multi_requirement_connector {
        Complexity::Complex
    } else if score >= 2 || word_count > 20 {
        Complexity::Moderate
    } else {
        Complexity::Simple
    }
}

/// Pick the single best-matching voice by specialization keyword, falling
/// back to the voice with the highest expertise level.
pub fn best_single_voice<'a>(prompt: &str, available: &'a [Voice]) -> Option<&'a Voice> {
    let lower = prompt.to_lowercase();
    for keyword in brain_types::COMPLEX_KEYWORDS
        .iter()
        .chain(brain_types::MODERATE_KEYWORDS.iter())
    {
        if lower.contains(keyword) {
            if let Some(v) = available.iter().find(|v| v.matches_keyword(keyword)) {
                return Some(v);
            }
        }
    }
    available
        .iter()
        .max_by(|a, b| a.expertise_level.partial_cmp(&b.expertise_level).unwrap())
}

/// Category bias pairs used to compose a multi-voice team (`spec.md` §4.4).
const CATEGORY_PAIRS: &[(&str, [&str; 2])] = &[
    ("security", ["security", "implementation"]),
    ("design", ["analysis", "design"]),
];

const DEFAULT_MODERATE_PAIR: [&str; 2] = ["implementation", "quality"];
const DEFAULT_BALANCED_TEAM: [&str; 3] = ["developer", "architect", "maintainer"];

fn category_bias(prompt_lower: &str) -> Option<[&'static str; 2]> {
    CATEGORY_PAIRS
        .iter()
        .find(|(keyword, _)| prompt_lower.contains(keyword))
        .map(|(_, pair)| *pair)
}

fn voice_for_category<'a>(category: &str, available: &'a [Voice]) -> Option<&'a Voice> {
    available
        .iter()
        .find(|v| v.matches_keyword(category) || v.id == category)
}

/// Compose a multi-voice team for a moderate or complex task, capped at
/// `config.max_team_size` and never exceeding `available.len()`.
pub fn compose_team<'a>(
    complexity: Complexity,
    prompt: &str,
    available: &'a [Voice],
    config: &SelectorConfig,
) -> Vec<&'a Voice> {
    let lower = prompt.to_lowercase();
    let cap = config.max_team_size.min(available.len());
    let mut team: Vec<&Voice> = Vec::new();

    let names: Vec<&str> = match complexity {
        Complexity::Simple => vec![],
        Complexity::Moderate => category_bias(&lower)
            .map(|p| p.to_vec())
            .unwrap_or_else(|| DEFAULT_MODERATE_PAIR.to_vec()),
        Complexity::Complex => {
            if let Some(pair) = category_bias(&lower) {
                let mut v = pair.to_vec();
                v.push(if pair.contains(&"design") {
                    "architect"
                } else {
                    "architecture"
                });
                v
            } else {
                DEFAULT_BALANCED_TEAM.to_vec()
            }
        }
    };

    for name in names {
        if team.len() >= cap {
            break;
        }
        if let Some(v) = voice_for_category(name, available) {
            if !team.iter().any(|t| t.id == v.id) {
                team.push(v);
            }
        }
    }

    // Top up with the highest-expertise remaining voices if the bias didn't
    // find enough distinct matches (small registries, synonyms missing).
    if team.len() < cap {
        let mut rest: Vec<&Voice> = available
            .iter()
            .filter(|v| !team.iter().any(|t| t.id == v.id))
            .collect();
        rest.sort_by(|a, b| b.expertise_level.partial_cmp(&a.expertise_level).unwrap());
        for v in rest {
            if team.len() >= cap {
                break;
            }
            team.push(v);
        }
    }

    team
}

/// Run the full ROI gate and return a selection decision.
pub fn select(ctx: &TaskContext, available: &[Voice], config: &SelectorConfig) -> SelectionResult {
    let complexity = classify_complexity(&ctx.prompt);
    let profile = roi_profile(complexity);
    let roi = profile.roi();

    let wants_single = ctx.user_preference == Some(SelectionPreference::Single);
    let below_threshold = roi <= config.roi_threshold;
    let force_single = wants_single || below_threshold || complexity == Complexity::Simple;

    if force_single {
        let voice = best_single_voice(&ctx.prompt, available);
        let voices = voice.map(|v| vec![v.id.clone()]).unwrap_or_default();
        return SelectionResult {
            voices,
            mode: SelectionMode::Single,
            expected_quality_gain: profile.expected_quality_gain_percent,
            estimated_overhead: profile.estimated_overhead_percent,
            roi_score: roi,
            reasoning: format!(
                "complexity={:?} roi={:.3} <= threshold {:.3} or single preference/simple task",
                complexity, roi, config.roi_threshold
            ),
        };
    }

    let team = compose_team(complexity, &ctx.prompt, available, config);
    SelectionResult {
        voices: team.iter().map(|v| v.id.clone()).collect(),
        mode: SelectionMode::Multi,
        expected_quality_gain: profile.expected_quality_gain_percent,
        estimated_overhead: profile.estimated_overhead_percent,
        roi_score: roi,
        reasoning: format!(
            "complexity={:?} roi={:.3} > threshold {:.3}, team size {}",
            complexity,
            roi,
            config.roi_threshold,
            team.len()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voice(id: &str, domain: &str, specializations: &[&str], expertise: f64) -> Voice {
        Voice {
            id: id.to_string(),
            display_name: id.to_string(),
            domain: domain.to_string(),
            expertise_level: expertise,
            success_rate: 0.9,
            average_quality: 80.0,
            specializations: specializations.iter().map(|s| s.to_string()).collect(),
            preferred_capabilities: vec![],
            preferred_servers: vec![],
            avoided_servers: vec![],
            weights: Default::default(),
        }
    }

    fn five_voices() -> Vec<Voice> {
        vec![
            voice("developer", "implementation", &["implementation"], 0.8),
            voice("architect", "design", &["design", "architecture"], 0.85),
            voice("security", "security", &["security"], 0.9),
            voice("analyzer", "analysis", &["analysis", "quality"], 0.7),
            voice("maintainer", "quality", &["quality", "maintenance"], 0.75),
        ]
    }

    #[test]
    fn s1_simple_prompt_is_single_voice_full_roi() {
        let ctx = TaskContext {
            prompt: "Write a hello world function in TypeScript.".to_string(),
            category: "implementation".to_string(),
            estimated_tokens: 50,
            user_preference: None,
            time_constraint: None,
        };
        let voices = five_voices();
        let config = SelectorConfig::default();
        let result = select(&ctx, &voices, &config);
        assert_eq!(result.mode, SelectionMode::Single);
        assert_eq!(result.voices, vec!["developer".to_string()]);
    }

    #[test]
    fn complex_security_prompt_selects_multi_voice_team() {
        let ctx = TaskContext {
            prompt: "Design a scalable, secure, concurrent architecture and integrate the security layer.".to_string(),
            category: "architecture".to_string(),
            estimated_tokens: 200,
            user_preference: None,
            time_constraint: None,
        };
        let voices = five_voices();
        let config = SelectorConfig::default();
        let result = select(&ctx, &voices, &config);
        assert_eq!(result.mode, SelectionMode::Multi);
        assert!(result.voices.len() <= config.max_team_size);
        assert!(result.voices.contains(&"security".to_string()));
    }

    #[test]
    fn team_size_never_exceeds_available_voices() {
        let ctx = TaskContext {
            prompt: "architecture security scalable distributed concurrent comprehensive migrate".to_string(),
            category: "architecture".to_string(),
            estimated_tokens: 300,
            user_preference: None,
            time_constraint: None,
        };
        let voices = vec![voice("solo", "implementation", &["implementation"], 0.9)];
        let config = SelectorConfig::default();
        let team = compose_team(classify_complexity(&ctx.prompt), &ctx.prompt, &voices, &config);
        assert!(team.len() <= voices.len());
    }

    #[test]
    fn user_preference_single_overrides_complex_classification() {
        let ctx = TaskContext {
            prompt: "Design a scalable, secure, concurrent architecture and integrate everything.".to_string(),
            category: "architecture".to_string(),
            estimated_tokens: 200,
            user_preference: Some(SelectionPreference::Single),
            time_constraint: None,
        };
        let voices = five_voices();
        let config = SelectorConfig::default();
        let result = select(&ctx, &voices, &config);
        assert_eq!(result.mode, SelectionMode::Single);
    }

    #[test]
    fn moderate_roi_threshold_matches_spec_table() {
        let profile = roi_profile(Complexity::Moderate);
        assert!((profile.roi() - 0.1618).abs() < 0.001);
        assert!(profile.roi() > 0.15);
    }
}
