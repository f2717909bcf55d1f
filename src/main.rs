use clap::Parser;
use dotenv::dotenv;
use grok_relay::cli::{ Args, Command };
use std::error::Error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    dotenv().ok();
    let args = Args::parse();

    // Chat prints its transcript to the same terminal as the log.
    let default_filter = match (&args.command, args.debug) {
        (_, true) => "debug",
        (Command::Chat(_), false) => "warn",
        (Command::Serve(_), false) => "info",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    grok_relay::run(args).await
}
