//! `threadline ask`: Answer one question.
//!
//! Prints the answer, its sources, and the state token to pass back with
//! `--state` for a follow-up.

use std::path::Path;

use threadline_agent::{QueryRequest, QueryResponse};

use super::{load_interactive_config, require_api_key};

pub async fn run(
    config_path: Option<&Path>,
    question: String,
    state: Option<String>,
    no_audit: bool,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if question.trim().is_empty() {
        return Err("question must not be empty".into());
    }

    let config = load_interactive_config(config_path)?;
    require_api_key(&config)?;
    let orchestrator = threadline_agent::build_orchestrator(&config).await?;

    let mut request = QueryRequest::new(question).suppress_audit(no_audit);
    if let Some(token) = state {
        request = request.with_prior_state(token.into());
    }

    eprint!("  Thinking...");
    let result = orchestrator.query(request).await;
    eprint!("\r              \r");
    let response = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print!("{}", render(&response));
    }

    Ok(())
}

fn render(response: &QueryResponse) -> String {
    let mut out = format!("{}\n", response.answer);
    if !response.sources.is_empty() {
        out.push_str(&format!("\nSources: {}\n", response.sources.join(", ")));
    }
    out.push_str(&format!("\nState: {}\n", response.next_state));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_lists_sources_and_state() {
        let response = QueryResponse {
            answer: "Use a hash distribution.".into(),
            next_state: "v1.abc".into(),
            sources: vec!["doc1".into(), "doc2".into()],
        };
        let text = render(&response);
        assert!(text.starts_with("Use a hash distribution.\n"));
        assert!(text.contains("Sources: doc1, doc2"));
        assert!(text.ends_with("State: v1.abc\n"));
    }

    #[test]
    fn render_omits_empty_sources() {
        let response = QueryResponse {
            answer: "I think so.".into(),
            next_state: "v1.abc".into(),
            sources: vec![],
        };
        assert!(!render(&response).contains("Sources"));
    }
}
