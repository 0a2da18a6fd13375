//! `threadline config`: Configuration helpers.

use std::path::Path;

use threadline_config::AppConfig;

use super::load_config;

pub fn print_default() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", AppConfig::default_toml());
    Ok(())
}

pub fn path(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(AppConfig::config_path);
    println!("{}", path.display());
    Ok(())
}

pub fn validate(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    println!("Validating configuration...");

    let config = match load_config(config_path) {
        Ok(config) => {
            println!("   ✅ Config parsed and validated");
            config
        }
        Err(e) => {
            println!("   ❌ {e}");
            return Err(e);
        }
    };

    let warnings = warnings(&config);
    if warnings.is_empty() {
        println!("   ✅ All checks passed");
    } else {
        println!();
        for w in &warnings {
            println!("   ⚠️  {w}");
        }
    }

    println!();
    println!("   Provider:  {}", config.generation.provider);
    println!("   Model:     {}", config.generation.model);
    println!("   Retrieval: {} ({})", config.retrieval.backend, config.retrieval.table);
    println!("   Audit:     {}", config.audit.backend);
    println!("   Gateway:   {}:{}", config.gateway.host, config.gateway.port);

    Ok(())
}

/// Settings that load fine but will likely fail at query time.
fn warnings(config: &AppConfig) -> Vec<&'static str> {
    let mut warnings = Vec::new();
    if !config.has_api_key() && config.generation.provider != "ollama" {
        warnings.push("No API key set (set THREADLINE_API_KEY or OPENAI_API_KEY)");
    }
    if config.retrieval.backend == "postgres" && config.retrieval.database_url.is_none() {
        warnings.push("Postgres retrieval without database_url (set THREADLINE_DATABASE_URL)");
    }
    if config.retrieval.backend == "memory" && config.retrieval.passages_path.is_none() {
        warnings.push("Memory retrieval without passages_path: every answer has empty context");
    }
    if config.state.signing_key.is_none() {
        warnings.push("State tokens are unsigned (set THREADLINE_STATE_KEY to sign them)");
    }
    warnings
}
