//! Minimal example: send one conversation and print the reply.
//!
//! The provider comes from the environment (see `ModelConfiguration::from_env`):
//!
//! ```bash
//! GATEWAY_PROVIDER=openai OPENAI_API_KEY=sk-... cargo run --example simple_chat
//! ```
//!
//! Without any variables set the offline `mock` provider answers.

use prompt_gateway::{ChatMessage, Gateway, ModelConfiguration};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let config = ModelConfiguration::from_env()?;
    let gateway = Gateway::new()?;

    let messages = vec![
        ChatMessage::system("You are a helpful assistant that responds concisely."),
        ChatMessage::user("What is the capital of France?"),
    ];

    let response = gateway.send_message(&messages, &config).await?;
    println!("{} ({}, {} ms):", response.provider, response.model, response.latency_ms);
    println!("{}", response.text);

    Ok(())
}
