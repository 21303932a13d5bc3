use crate::*;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info, instrument};

#[instrument(skip(path))]
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CallTrackConfig> {
    let path = path.as_ref();
    info!("Loading configuration from: {:?}", path);

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    debug!("Config file content length: {} bytes", content.len());
    parse_config(&content)
}

/// Parse YAML text after environment substitution
pub fn parse_config(content: &str) -> Result<CallTrackConfig> {
    let substituted = substitution::substitute_env_vars(content)?;

    // An empty file means all defaults
    if substituted.trim().is_empty() {
        return Ok(CallTrackConfig::default());
    }

    let config: CallTrackConfig = serde_yaml::from_str(&substituted)
        .with_context(|| "Failed to parse YAML configuration")?;

    info!("Configuration loaded successfully");
    Ok(config)
}

/// Load `path` if given, otherwise use defaults
pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<CallTrackConfig> {
    match path {
        Some(path) => load_config(path),
        None => Ok(generate_default_config()),
    }
}

pub fn generate_default_config() -> CallTrackConfig {
    CallTrackConfig::default()
}

#[instrument(skip(config))]
pub fn save_config<P: AsRef<Path> + std::fmt::Debug>(config: &CallTrackConfig, path: P) -> Result<()> {
    let path = path.as_ref();
    info!("Saving configuration to: {:?}", path);

    let yaml = serde_yaml::to_string(config)
        .with_context(|| "Failed to serialize configuration to YAML")?;

    fs::write(path, yaml)
        .with_context(|| format!("Failed to write config file: {:?}", path))?;

    info!("Configuration saved successfully");
    Ok(())
}
