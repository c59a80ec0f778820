//! `parley chat` — send one message through the gateway.

use parley_config::AppConfig;
use parley_orchestrator::StreamEvent;

pub async fn run(
    message: String,
    session: Option<String>,
    offline: bool,
    stream: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let orchestrator = super::build_orchestrator(config);

    let session_id = session.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    if stream {
        let mut rx = orchestrator.process_stream(&message, &session_id, offline);
        let mut model_used = String::from("none");
        while let Some(event) = rx.recv().await {
            match event {
                StreamEvent::Fragment { content } => {
                    print!("{content}");
                    use std::io::Write;
                    std::io::stdout().flush()?;
                }
                StreamEvent::Done { model_used: model } => {
                    model_used = model;
                }
                StreamEvent::Error { message } => {
                    println!();
                    return Err(format!("Stream failed: {message}").into());
                }
            }
        }
        println!();
        eprintln!("  [model: {model_used}]");
    } else {
        let outcome = orchestrator.process_message(&message, &session_id, offline).await;
        println!("{}", outcome.response);
        eprintln!(
            "  [model: {} | {}s]",
            outcome.model_used, outcome.response_time
        );
    }

    Ok(())
}
