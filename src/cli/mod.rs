use clap::{ Parser, Subcommand };
use std::path::PathBuf;
use url::Url;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable debug logging/output
    #[arg(long, env = "DEBUG", default_value = "false", global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the relay endpoint that forwards conversations to xAI.
    Serve(ServeArgs),
    /// Open an interactive chat session against a running relay.
    Chat(ChatArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct ServeArgs {
    /// Host address and port for the relay to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "127.0.0.1:3000")]
    pub server_addr: String,

    /// Chat-completions endpoint of the provider. Defaults to the public xAI API.
    #[arg(long, env = "XAI_BASE_URL")]
    pub provider_url: Option<Url>,

    /// Model name sent with every completion request (default: grok-3-latest).
    #[arg(long, env = "XAI_MODEL")]
    pub model: Option<String>,

    /// Optional path to the TLS certificate file (PEM format). Requires --tls-key-path.
    #[arg(long, env = "TLS_CERT_PATH")]
    pub tls_cert_path: Option<String>,

    /// Optional path to the TLS private key file (PEM format). Requires --tls-cert-path.
    #[arg(long, env = "TLS_KEY_PATH")]
    pub tls_key_path: Option<String>,

    #[arg(long, env = "ENABLE_TLS", default_value = "false")]
    pub enable_tls: bool,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ChatArgs {
    /// Full URL of the relay's chat endpoint.
    #[arg(long, env = "RELAY_URL", default_value = "http://127.0.0.1:3000/api/chat")]
    pub relay_url: Url,

    /// File holding the saved API key. Defaults to <config dir>/grok-relay/settings.json.
    #[arg(long, env = "GROK_SETTINGS_PATH")]
    pub settings_path: Option<PathBuf>,
}
