//! Tracing/logging initialization (`SPEC_FULL.md` §2, ambient stack).
//!
//! The engine itself never configures a subscriber — libraries log through
//! `tracing` and leave initialization to the binary that embeds them. This
//! module is that one seam, adapted from the teacher's `logging::initialize_tracing`.

use brain_types::BrainResult;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub log_level: String,
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { log_level: "info".to_string(), json_format: false }
    }
}

/// Install a global `tracing` subscriber from `config`. Safe to call more
/// than once in a test binary: a subscriber already set is logged as a
/// warning rather than returned as an error.
pub fn init_tracing(config: &LoggingConfig) -> BrainResult<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let result = if config.json_format {
        tracing_subscriber::registry().with(env_filter).with(fmt::layer().json()).try_init()
    } else {
        tracing_subscriber::registry().with(env_filter).with(fmt::layer()).try_init()
    };

    match result {
        Ok(()) => tracing::info!("tracing initialized at level {}", config.log_level),
        Err(_) => eprintln!("warning: global tracing subscriber already initialized"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_info_level_plain_text() {
        let config = LoggingConfig::default();
        assert_eq!(config.log_level, "info");
        assert!(!config.json_format);
    }
}
