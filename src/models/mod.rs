pub mod chat;

pub use chat::{ RelayRequest, RelayResponse, Role, Turn };
