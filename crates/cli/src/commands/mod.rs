//! Subcommand implementations.

pub mod ask;
pub mod chat;
pub mod config_cmd;
pub mod doctor;
pub mod serve;

use std::path::Path;

use threadline_config::{AppConfig, AuditMode};

/// Load from `path`, or the default location, with environment overrides.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(p) => AppConfig::load_path(p),
        None => AppConfig::load(),
    };
    config.map_err(|e| format!("Failed to load config: {e}").into())
}

/// Config for one-shot and interactive use: the process may exit right after
/// an answer, so audit publication is awaited instead of spawned.
pub fn load_interactive_config(
    path: Option<&Path>,
) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let mut config = load_config(path)?;
    config.audit.mode = AuditMode::Inline;
    Ok(config)
}

/// Refuse to start without a generation key, unless the backend needs none.
pub fn require_api_key(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    if config.has_api_key() || config.generation.provider == "ollama" {
        return Ok(());
    }

    eprintln!();
    eprintln!("  ERROR: No API key configured!");
    eprintln!();
    eprintln!("  Set one of these environment variables:");
    eprintln!("    THREADLINE_API_KEY = 'sk-...'");
    eprintln!("    OPENAI_API_KEY     = 'sk-...'");
    eprintln!();
    eprintln!("  Or add generation.api_key to your config file:");
    eprintln!("    {}", AppConfig::config_path().display());
    eprintln!();
    Err("No API key found. See above for setup instructions.".into())
}
