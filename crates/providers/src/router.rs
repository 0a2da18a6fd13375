//! Selects the LLM and embedding backends named in config.

use std::sync::Arc;

use crate::anthropic::AnthropicProvider;
use crate::openai_compat::OpenAiCompatProvider;
use threadline_config::AppConfig;
use threadline_core::error::Error;
use threadline_core::provider::Provider;
use threadline_core::retrieval::Embedder;

/// Build the generation provider named by `generation.provider`.
///
/// `anthropic` gets the Messages API client; every other name is treated as
/// an OpenAI-compatible endpoint.
pub fn build_provider(config: &AppConfig) -> Arc<dyn Provider> {
    let gen_cfg = &config.generation;
    let api_key = gen_cfg.api_key.clone().unwrap_or_default();
    let base_url = gen_cfg
        .api_url
        .clone()
        .unwrap_or_else(|| default_base_url(&gen_cfg.provider));

    if gen_cfg.provider == "anthropic" {
        let mut p = AnthropicProvider::new(&api_key);
        if gen_cfg.api_url.is_some() {
            p = p.with_base_url(&base_url);
        }
        Arc::new(p)
    } else {
        Arc::new(OpenAiCompatProvider::new(
            &gen_cfg.provider,
            &base_url,
            &api_key,
        ))
    }
}

/// Build the query embedder from `retrieval.embedding_*` settings.
///
/// Embeddings always go through an OpenAI-compatible `/embeddings` endpoint;
/// the generation API key is reused.
pub fn build_embedder(config: &AppConfig) -> Result<Arc<dyn Embedder>, Error> {
    let ret = &config.retrieval;
    if ret.embedding_provider == "anthropic" {
        return Err(Error::Config {
            message: "retrieval.embedding_provider 'anthropic' has no embeddings endpoint".into(),
        });
    }

    let base_url = ret
        .embedding_api_url
        .clone()
        .unwrap_or_else(|| default_base_url(&ret.embedding_provider));
    let api_key = config.generation.api_key.clone().unwrap_or_default();

    Ok(Arc::new(
        OpenAiCompatProvider::new(&ret.embedding_provider, base_url, api_key)
            .with_embedding_model(&ret.embedding_model),
    ))
}

/// Get the default base URL for well-known providers.
fn default_base_url(provider_name: &str) -> String {
    match provider_name {
        "openrouter" => "https://openrouter.ai/api/v1".into(),
        "openai" => "https://api.openai.com/v1".into(),
        "anthropic" => "https://api.anthropic.com".into(),
        "ollama" => "http://localhost:11434/v1".into(),
        "together" => "https://api.together.xyz/v1".into(),
        "vllm" => "http://localhost:8000/v1".into(),
        _ => format!("https://{provider_name}.api.example.com/v1"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_base_urls() {
        assert!(default_base_url("openrouter").contains("openrouter.ai"));
        assert!(default_base_url("openai").contains("api.openai.com"));
        assert!(default_base_url("ollama").contains("localhost:11434"));
    }

    #[test]
    fn build_from_default_config() {
        let config = AppConfig::default();
        assert_eq!(build_provider(&config).name(), "openai");
    }

    #[test]
    fn build_anthropic_from_config() {
        let mut config = AppConfig::default();
        config.generation.provider = "anthropic".into();
        assert_eq!(build_provider(&config).name(), "anthropic");
    }

    #[test]
    fn embedder_uses_configured_model() {
        let mut config = AppConfig::default();
        config.retrieval.embedding_model = "text-embedding-3-large".into();
        let embedder = build_embedder(&config).unwrap();
        assert_eq!(embedder.model(), "text-embedding-3-large");
    }

    #[test]
    fn anthropic_embedder_rejected() {
        let mut config = AppConfig::default();
        config.retrieval.embedding_provider = "anthropic".into();
        assert!(build_embedder(&config).is_err());
    }
}
