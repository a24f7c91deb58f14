//! Settings file loading

use anyhow::{Context, Result};
use prism_core::Settings;
use std::path::Path;

/// Load settings from a TOML file. A missing file yields defaults.
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let Some(path) = path else {
        return Ok(Settings::default());
    };
    if !path.exists() {
        eprintln!("Settings file {:?} not found, using defaults", path);
        return Ok(Settings::default());
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings: {:?}", path))?;
    parse_settings(&text).with_context(|| format!("Invalid settings file: {:?}", path))
}

/// Parse TOML settings text
pub fn parse_settings(text: &str) -> Result<Settings> {
    Ok(toml::from_str(text)?)
}
