pub mod cli;
pub mod config;
pub mod llm;
pub mod models;
pub mod shell;

use cli::Args;
use config::{ ClientConfig, SessionOptions };
use llm::chat::{ new_client, ContentObserver };
use log::info;
use std::error::Error;
use std::io::Write;
use std::sync::Arc;
use tokio::io::BufReader;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = ClientConfig::from_args(&args);
    let options = SessionOptions::from_args(&args);

    info!("--- Chat Configuration ---");
    info!("Endpoint: {}", config.base_url);
    info!("Deployment: {}", config.deployment);
    info!("Connect Timeout: {:?}", config.connect_timeout);
    info!("Streaming: {}", options.stream);
    info!("-------------------------");

    let observer: ContentObserver = Arc::new(|text: &str| {
        let mut stdout = std::io::stdout();
        let _ = stdout.write_all(text.as_bytes());
        let _ = stdout.flush();
    });
    let client = new_client(&config, Some(observer))?;

    let stdin = BufReader::new(tokio::io::stdin());
    let conversation = shell::run_session(
        client.as_ref(),
        &options,
        stdin,
        tokio::io::stdout(),
        tokio::io::stderr()
    ).await?;

    info!("Chat session {} ended with {} messages", conversation.id(), conversation.len());
    Ok(())
}
