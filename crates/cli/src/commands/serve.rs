//! `threadline serve`: Start the HTTP API server.

use std::path::Path;

use super::{load_config, require_api_key};

pub async fn run(
    config_path: Option<&Path>,
    port_override: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_config(config_path)?;
    require_api_key(&config)?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("Threadline Gateway");
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    println!("   Model:     {}", config.generation.model);
    println!("   Retrieval: {}", config.retrieval.backend);
    println!(
        "   Audit:     {}",
        if config.audit.enabled { config.audit.backend.as_str() } else { "disabled" }
    );

    threadline_gateway::start(config).await?;

    Ok(())
}
