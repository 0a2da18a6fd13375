//! `threadline doctor`: Diagnose configuration and backend readiness.

use std::path::Path;

use threadline_config::AppConfig;

use super::load_config;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 Threadline Doctor: System Diagnostics");
    println!("========================================\n");

    let mut issues = 0;

    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(AppConfig::config_path);
    if path.exists() {
        println!("  ✅ Config file found at {}", path.display());
    } else {
        println!("  ⚠️  No config file at {}, using defaults", path.display());
    }

    let config = match load_config(config_path) {
        Ok(config) => {
            println!("  ✅ Config valid");
            config
        }
        Err(e) => {
            println!("  ❌ {e}");
            println!();
            println!("  ⚠️  1 issue(s) found. See above for details.");
            return Ok(());
        }
    };

    if config.has_api_key() {
        println!("  ✅ API key configured");
    } else if config.generation.provider != "ollama" {
        println!("  ❌ No API key: set THREADLINE_API_KEY or generation.api_key");
        issues += 1;
    }

    if config.state.signing_key.is_some() {
        println!("  ✅ State tokens signed");
    } else {
        println!("  ⚠️  State tokens unsigned");
    }

    match threadline_agent::build_orchestrator(&config).await {
        Ok(orchestrator) => {
            let provider = orchestrator.provider();
            match provider.health_check().await {
                Ok(true) => println!("  ✅ Generation backend '{}' reachable", provider.name()),
                Ok(false) => {
                    println!("  ❌ Generation backend '{}' not ready", provider.name());
                    issues += 1;
                }
                Err(e) => {
                    println!("  ❌ Generation backend '{}': {e}", provider.name());
                    issues += 1;
                }
            }

            let retriever = orchestrator.retriever();
            match retriever.health_check().await {
                Ok(true) => println!("  ✅ Retrieval backend '{}' reachable", retriever.name()),
                Ok(false) => {
                    println!("  ❌ Retrieval backend '{}' not ready", retriever.name());
                    issues += 1;
                }
                Err(e) => {
                    println!("  ❌ Retrieval backend '{}': {e}", retriever.name());
                    issues += 1;
                }
            }

            println!("  ✅ Audit publisher: {}", orchestrator.publisher().name());
        }
        Err(e) => {
            println!("  ❌ Could not assemble the query pipeline: {e}");
            issues += 1;
        }
    }

    // Summary
    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
