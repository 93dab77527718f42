//! Built-in voice archetypes (`SPEC_FULL.md` §4.4): developer, architect,
//! security, analyzer, maintainer, designer. Domains and specializations
//! line up with the category-bias keywords in `brain_core::selection`
//! (`security`→security/implementation, `design`→analysis/design) and the
//! expertise-based weighting table in `spec.md` §4.5 step 2
//! (security=0.9, architect=0.85, developer=0.8, analyzer=0.7, default=0.5).

use brain_types::domain::{Voice, VoiceWeights};
use std::collections::HashSet;

fn specs(words: &[&str]) -> HashSet<String> {
    words.iter().map(|s| s.to_string()).collect()
}

fn voice(id: &str, display_name: &str, domain: &str, expertise: f64, specializations: &[&str]) -> Voice {
    Voice {
        id: id.to_string(),
        display_name: display_name.to_string(),
        domain: domain.to_string(),
        expertise_level: expertise,
        success_rate: 0.9,
        average_quality: 80.0,
        specializations: specs(specializations),
        preferred_capabilities: vec![],
        preferred_servers: vec![],
        avoided_servers: vec![],
        weights: VoiceWeights::default(),
    }
}

pub fn default_voices() -> Vec<Voice> {
    vec![
        voice("developer", "Developer", "implementation", 0.8, &["implementation"]),
        voice("architect", "Architect", "design", 0.85, &["design", "architecture"]),
        voice("security", "Security Reviewer", "security", 0.9, &["security"]),
        voice("analyzer", "Analyzer", "analysis", 0.7, &["analysis", "quality"]),
        voice("maintainer", "Maintainer", "quality", 0.5, &["quality", "maintenance"]),
        voice("designer", "Designer", "design", 0.5, &["design", "ui", "ux"]),
    ]
}
