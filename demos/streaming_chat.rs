//! Streaming example: print fragments as they arrive.
//!
//! ```bash
//! GATEWAY_PROVIDER=claude ANTHROPIC_API_KEY=sk-ant-... cargo run --example streaming_chat
//! RUST_LOG=prompt_gateway=debug cargo run --example streaming_chat
//! ```

use futures::StreamExt;
use prompt_gateway::{ChatMessage, Gateway, ModelConfiguration};
use std::io::Write;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let config = ModelConfiguration::from_env()?;
    let gateway = Gateway::new()?;

    if !gateway.supports_streaming(&config.provider) {
        eprintln!(
            "note: '{}' does not stream natively, the answer arrives in one piece",
            config.provider
        );
    }

    let messages = vec![ChatMessage::user(
        "Tell me a short story about a robot learning to paint.",
    )];

    let mut stream = gateway.send_message_streaming(&messages, &config).await?;
    let mut stdout = std::io::stdout();
    let mut fragments = 0usize;

    while let Some(fragment) = stream.next().await {
        match fragment {
            Ok(text) => {
                print!("{text}");
                stdout.flush()?;
                fragments += 1;
            }
            Err(e) => {
                eprintln!("\nstream failed: {e}");
                return Err(e.into());
            }
        }
    }

    println!();
    eprintln!("[{fragments} fragments]");
    Ok(())
}
