pub mod cli;
pub mod client;
pub mod llm;
pub mod models;
pub mod relay;
pub mod server;

use cli::{ Args, ChatArgs, Command, ServeArgs };
use llm::chat::new_client as new_chat_client;
use llm::LlmConfig;
use log::info;
use relay::Relay;
use server::Server;
use std::error::Error;
use std::sync::Arc;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    match args.command {
        Command::Serve(serve) => run_relay(serve).await,
        Command::Chat(chat) => run_chat(chat).await,
    }
}

async fn run_relay(args: ServeArgs) -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = LlmConfig {
        base_url: args.provider_url.clone(),
        completion_model: args.model.clone(),
        ..Default::default()
    };

    let provider = new_chat_client(&config)?;

    info!("--- Relay Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("Provider URL: {}", provider.get_base_url());
    info!("Model: {}", config.model());
    info!("Temperature: {}", config.temperature);
    info!("Max Tokens: {}", config.max_tokens);
    info!("TLS Enabled: {}", args.enable_tls);
    info!("---------------------------");

    let relay = Arc::new(Relay::new(provider, &config));
    let server = Server::new(args.server_addr.clone(), relay, args);
    server.run().await
}

async fn run_chat(args: ChatArgs) -> Result<(), Box<dyn Error + Send + Sync>> {
    client::terminal::run(args).await
}
