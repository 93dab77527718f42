//! Small shared lexical tables used by the selector (C4) and synthesis (C5)
//! heuristics. These are plain data so both `brain-core`'s pure math and
//! `brain-cognitive`'s orchestration can see the same wordlists without
//! duplicating them (`SPEC_FULL.md` §9: "quality metric bags ... are
//! lexical"; non-goal to fix semantically).

/// Keywords that bias the complexity heuristic toward "simple" (`spec.md` §4.4).
pub const SIMPLE_KEYWORDS: &[&str] = &[
    "hello", "simple", "basic", "quick", "small", "print", "show",
];

/// Keywords that bias the complexity heuristic toward "moderate".
pub const MODERATE_KEYWORDS: &[&str] = &[
    "implement", "refactor", "design", "integrate", "optimize", "test",
];

/// Keywords that bias the complexity heuristic toward "complex".
pub const COMPLEX_KEYWORDS: &[&str] = &[
    "architecture", "scalable", "distributed", "security", "migrate",
    "concurrent", "comprehensive",
];

/// Multi-requirement connectors that push a prompt toward "complex" regardless of score.
pub const MULTI_REQUIREMENT_CONNECTORS: &[&str] = &[" and ", ", "];

/// Lexical bag used to nudge the "innovation" quality sub-metric (§4.5).
pub const INNOVATION_WORDS: &[&str] = &[
    "innovative", "novel", "creative", "original", "unique", "breakthrough",
];

/// Lexical bag used to nudge the "practicality" quality sub-metric (§4.5).
pub const PRACTICALITY_WORDS: &[&str] = &[
    "practical", "actionable", "implementable", "proven", "production-ready", "maintainable",
];

/// Domain tokens that boost pairwise agreement when shared by two responses (§4.5 step 3).
pub const SHARED_DOMAIN_BOOST_WORDS: &[&str] = &[
    "performance", "security", "scalability", "maintainability", "testing", "architecture",
];

/// System path prefixes that make a target high risk regardless of sandbox mode (§4.3).
pub const SYSTEM_PATH_PREFIXES: &[&str] =
    &["/etc", "/bin", "/usr/bin", "/System", "C:\\Windows", "C:\\Program Files"];

/// Dangerous command tokens (§4.3 factor 4).
pub const DANGEROUS_COMMAND_TOKENS: &[&str] = &["rm", "del", "format", "sudo", "chmod", "chown"];

/// Network command tokens (§4.3 factor 4).
pub const NETWORK_COMMAND_TOKENS: &[&str] = &["curl", "wget", "nc", "netcat"];

/// Script executor tokens (§4.3 factor 4).
pub const SCRIPT_EXECUTOR_TOKENS: &[&str] = &["python", "node", "powershell", "bash", "sh"];

/// Lowercase-and-split-on-whitespace helper shared by the selector, synthesis,
/// and memory-store lexical heuristics.
pub fn lowercase_words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_string())
        .filter(|w| !w.is_empty())
        .collect()
}
