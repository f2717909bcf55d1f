pub mod relay_client;
pub mod render;
pub mod session;
pub mod settings;
pub mod terminal;

pub use relay_client::{ ClientError, HttpRelayClient, RelayClient };
pub use session::{ ChatSession, Key, View };
pub use settings::SettingsStore;
