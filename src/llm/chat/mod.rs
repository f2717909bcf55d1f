pub mod xai;

use async_trait::async_trait;
use serde::Serialize;
use std::error::Error as StdError;
use std::sync::Arc;
use super::LlmConfig;
use self::xai::XAIChatClient;
use crate::models::Turn;

/// Payload of an OpenAI-style chat-completions call.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Turn>,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Raw provider reply. Status interpretation is left to the caller.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl CompletionResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Sends `request` authorized by `api_key`. An `Err` means no HTTP reply
    /// was obtained at all; non-success statuses come back as `Ok`.
    async fn complete(
        &self,
        api_key: &str,
        request: &CompletionRequest
    ) -> Result<CompletionResponse, Box<dyn StdError + Send + Sync>>;

    fn get_base_url(&self) -> String;
}

pub fn new_client(
    config: &LlmConfig
) -> Result<Arc<dyn ChatClient>, Box<dyn StdError + Send + Sync>> {
    let client = XAIChatClient::from_config(config)?;
    Ok(Arc::new(client))
}
