//! Interactive session demo: each line you type is treated as one
//! finalized speech fragment.
//!
//! ```bash
//! OPENAI_API_KEY=sk-... cargo run -p session-core --example repl
//! ```
//!
//! Try: "add 5 pounds of" then "coffee", or "add 5 gallons of milk"
//! followed by "5 more".

use tally_command_interface::TextFragment;
use tally_interpret_openai::OpenAiProvider;
use session_core::{PipelineConfig, SessionEvent, SessionManager};

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let api_key = std::env::var("OPENAI_API_KEY")?;
    let provider = OpenAiProvider::builder().api_key(api_key).build();

    let (event_tx, mut event_rx) = mpsc::channel(32);
    let mut manager = SessionManager::new(PipelineConfig::default(), event_tx);

    let session_id = uuid::Uuid::new_v4().to_string();
    manager.open(session_id.clone(), Box::new(provider)).await;

    let printer = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            match event {
                SessionEvent::CommandCompleted { command, .. } => {
                    println!(
                        ">> {} {} {} {} (confidence {:.2})",
                        command.action.as_str(),
                        command.quantity.map(|q| q.to_string()).unwrap_or_default(),
                        command.unit.as_deref().unwrap_or_default(),
                        command.item.as_deref().unwrap_or_default(),
                        command.confidence,
                    );
                }
                SessionEvent::PartialUpdate { partial, .. } => {
                    println!(".. partial: {partial:?}");
                }
                SessionEvent::SessionClosed { session_id } => {
                    println!("session {session_id} closed");
                }
            }
        }
    });

    println!("speak (type) inventory commands, ctrl-d to quit");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }
        manager
            .feed(&session_id, TextFragment::final_text(line))
            .await?;
    }

    manager.close(&session_id).await?;
    drop(manager);
    let _ = printer.await;
    Ok(())
}
