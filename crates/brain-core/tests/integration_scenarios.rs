//! End-to-end scenario S1 (`spec.md` §8): a simple prompt against five
//! available voices resolves to a single-voice, full-ROI selection.

use brain_core::{select, SelectionMode};
use brain_types::domain::Voice;
use brain_types::SelectorConfig;

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
fn s1_simple_prompt_selects_single_voice_with_full_roi() {
    let ctx = brain_core::TaskContext {
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
