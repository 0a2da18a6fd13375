//! `threadline chat`: Interactive conversation.
//!
//! The server side stays stateless here too: the loop holds the latest
//! state token and sends it with each question.

use std::io::Write;
use std::path::Path;

use threadline_agent::QueryRequest;
use threadline_core::error::Error;
use threadline_core::state::StateToken;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::{load_interactive_config, require_api_key};

pub async fn run(
    config_path: Option<&Path>,
    no_audit: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_interactive_config(config_path)?;
    require_api_key(&config)?;
    let orchestrator = threadline_agent::build_orchestrator(&config).await?;

    println!();
    println!("  Threadline: Interactive Mode");
    println!();
    println!("  Provider:  {}", config.generation.provider);
    println!("  Model:     {}", config.generation.model);
    println!("  Retrieval: {} (top {})", config.retrieval.backend, config.retrieval.top_k);
    println!("  Audit:     {}", if no_audit { "off" } else { orchestrator.publisher().name() });
    println!();
    println!("  Type your question and press Enter.");
    println!("  Type '/reset' to start over, 'exit' or Ctrl+C to quit.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut state: Option<StateToken> = None;

    loop {
        print!("  You > ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let question = line.trim();
        match question {
            "" => continue,
            "exit" | "quit" => break,
            "/reset" => {
                state = None;
                println!("  (new conversation)");
                println!();
                continue;
            }
            _ => {}
        }

        let mut request = QueryRequest::new(question).suppress_audit(no_audit);
        request.prior_state = state.clone();

        eprint!("  ...");
        match orchestrator.query(request).await {
            Ok(response) => {
                eprint!("\r     \r");
                println!();
                for line in response.answer.lines() {
                    println!("  Assistant > {line}");
                }
                if !response.sources.is_empty() {
                    println!("  Sources   > {}", response.sources.join(", "));
                }
                println!();
                state = Some(response.next_state);
            }
            Err(e) => {
                eprint!("\r     \r");
                eprintln!("  [Error] {e}");
                if matches!(e, Error::StateDecode(_)) {
                    state = None;
                    eprintln!("  (conversation reset)");
                }
                println!();
            }
        }
    }

    println!();
    println!("  Goodbye!");
    println!();

    Ok(())
}
