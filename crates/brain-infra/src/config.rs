//! Configuration loading: merges a TOML file with `BRAIN_`-prefixed
//! environment overrides into `brain_types::EngineConfig`, the way the
//! teacher's `BrainConfig::from_env`/`from_file` did by hand — except layered
//! through the `config` crate so overrides compose instead of being
//! re-implemented per field (`SPEC_FULL.md` ambient stack).

use brain_types::{BrainError, BrainResult, EngineConfig};

/// Load `EngineConfig`, starting from defaults, then layering:
/// 1. `path` (a TOML file), if it exists.
/// 2. Environment variables prefixed `BRAIN__`, double-underscore separated
///    (e.g. `BRAIN__CACHE__MAX_SIZE=2000`, `BRAIN__MCP__CIRCUIT_BREAKER_THRESHOLD=3`).
pub fn load_config(path: Option<&str>) -> BrainResult<EngineConfig> {
    let defaults = EngineConfig::default();
    let defaults_value = serde_json::to_value(&defaults).map_err(BrainError::from)?;

    let mut builder = config::Config::builder().add_source(config::Config::try_from(&defaults_value).map_err(|e| {
        BrainError::ConfigError(format!("failed to seed config defaults: {e}"))
    })?);

    if let Some(path) = path {
        if std::path::Path::new(path).exists() {
            builder = builder.add_source(config::File::with_name(path));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("BRAIN")
            .separator("__")
            .try_parsing(true),
    );

    let built = builder
        .build()
        .map_err(|e| BrainError::ConfigError(format!("failed to build config: {e}")))?;

    let engine_config: EngineConfig = built
        .try_deserialize()
        .map_err(|e| BrainError::ConfigError(format!("failed to deserialize config: {e}")))?;

    validate(&engine_config)?;
    Ok(engine_config)
}

/// Load configuration purely from defaults plus environment, with no file.
pub fn load_config_from_env() -> BrainResult<EngineConfig> {
    load_config(None)
}

fn validate(config: &EngineConfig) -> BrainResult<()> {
    if config.cache.max_size == 0 {
        return Err(BrainError::ConfigError("cache.max_size must be > 0".to_string()));
    }
    if config.memory.database_url.is_empty() {
        return Err(BrainError::ConfigError("memory.database_url cannot be empty".to_string()));
    }
    if !(0.0..=1.0).contains(&config.memory.low_value_confidence_threshold) {
        return Err(BrainError::ConfigError(
            "memory.low_value_confidence_threshold must be between 0.0 and 1.0".to_string(),
        ));
    }
    if config.selector.max_team_size == 0 {
        return Err(BrainError::ConfigError("selector.max_team_size must be > 0".to_string()));
    }
    if !(0.0..=100.0).contains(&config.synthesis.quality_threshold) {
        return Err(BrainError::ConfigError(
            "synthesis.quality_threshold must be between 0.0 and 100.0".to_string(),
        ));
    }
    if config.mcp.max_pool_connections == 0 {
        return Err(BrainError::ConfigError("mcp.max_pool_connections must be > 0".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_validation() {
        let config = load_config(None).unwrap();
        assert_eq!(config.selector.max_team_size, 3);
    }

    #[test]
    fn env_override_applies_on_top_of_defaults() {
        std::env::set_var("BRAIN__CACHE__MAX_SIZE", "5000");
        let config = load_config(None).unwrap();
        assert_eq!(config.cache.max_size, 5000);
        std::env::remove_var("BRAIN__CACHE__MAX_SIZE");
    }

    #[test]
    fn missing_file_path_is_not_an_error() {
        let config = load_config(Some("/nonexistent/path/brain.toml"));
        assert!(config.is_ok());
    }
}
