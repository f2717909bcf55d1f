use serde_json::{ json, Value };
use std::sync::Arc;
use thiserror::Error;

use crate::llm::chat::{ ChatClient, CompletionRequest };
use crate::llm::LlmConfig;
use crate::models::{ RelayRequest, Turn };

pub const SYSTEM_PROMPT: &str =
    "You are Grok, a witty and helpful AI assistant created by xAI. You aim to be maximally helpful while being entertaining when appropriate. You have a sense of humor but know when to be serious. You strive to give accurate, thoughtful responses.";

pub const NO_RESPONSE_PLACEHOLDER: &str = "No response generated";

/// Failure of a relay call. `Display` is the message shown to the client.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("API key is required. Get one at console.x.ai")]
    MissingCredential,
    #[error("Messages are required")]
    EmptyConversation,
    #[error("Invalid API key. Please check your xAI API key at console.x.ai")]
    InvalidCredential,
    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,
    #[error("{message}")]
    ProviderError {
        status: u16,
        message: String,
    },
    /// The cause is for the log only.
    #[error("An error occurred while processing your request")]
    InternalError(String),
}

impl RelayError {
    pub fn status_code(&self) -> u16 {
        match self {
            RelayError::MissingCredential | RelayError::EmptyConversation => 400,
            RelayError::InvalidCredential => 401,
            RelayError::RateLimited => 429,
            RelayError::ProviderError { status, .. } => *status,
            RelayError::InternalError(_) => 500,
        }
    }
}

#[derive(Clone)]
pub struct Relay {
    provider: Arc<dyn ChatClient>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl Relay {
    pub fn new(provider: Arc<dyn ChatClient>, config: &LlmConfig) -> Self {
        Self {
            provider,
            model: config.model(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    pub async fn handle(&self, request: RelayRequest) -> Result<String, RelayError> {
        if request.api_key.is_empty() {
            return Err(RelayError::MissingCredential);
        }
        if request.messages.is_empty() {
            return Err(RelayError::EmptyConversation);
        }

        let outbound = CompletionRequest {
            model: self.model.clone(),
            messages: build_outbound(&request.messages),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let reply = self.provider
            .complete(&request.api_key, &outbound)
            .await
            .map_err(|e| RelayError::InternalError(format!("provider call failed: {}", e)))?;

        if !reply.is_success() {
            return Err(map_provider_failure(reply.status, &reply.body));
        }

        let body: Value = serde_json::from_slice(&reply.body)
            .map_err(|e| RelayError::InternalError(format!("malformed provider response: {}", e)))?;

        Ok(extract_content(&body))
    }
}

pub fn build_outbound(conversation: &[Turn]) -> Vec<Turn> {
    let mut messages = Vec::with_capacity(conversation.len() + 1);
    messages.push(Turn::system(SYSTEM_PROMPT));
    messages.extend_from_slice(conversation);
    messages
}

/// 401 and 429 get fixed wording; anything else keeps its status and the
/// provider's `error.message`.
pub fn map_provider_failure(status: u16, body: &[u8]) -> RelayError {
    match status {
        401 => RelayError::InvalidCredential,
        429 => RelayError::RateLimited,
        _ => {
            let parsed: Value = serde_json::from_slice(body).unwrap_or_else(|_| json!({}));
            let message = parsed
                .get("error")
                .and_then(|e| e.get("message"))
                .and_then(Value::as_str)
                .filter(|m| !m.is_empty())
                .map(str::to_owned)
                .unwrap_or_else(|| format!("API request failed with status {}", status));
            RelayError::ProviderError { status, message }
        }
    }
}

/// Content of the first choice, or [`NO_RESPONSE_PLACEHOLDER`] when the
/// reply has none.
pub fn extract_content(body: &Value) -> String {
    body.pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .filter(|c| !c.is_empty())
        .unwrap_or(NO_RESPONSE_PLACEHOLDER)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::chat::CompletionResponse;
    use crate::models::Role;
    use async_trait::async_trait;
    use std::error::Error as StdError;
    use std::sync::Mutex;

    struct CannedProvider {
        reply: Option<CompletionResponse>,
        calls: Mutex<Vec<(String, CompletionRequest)>>,
    }

    impl CannedProvider {
        fn replying(status: u16, body: Value) -> Arc<Self> {
            Arc::new(Self {
                reply: Some(CompletionResponse { status, body: body.to_string().into_bytes() }),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn unreachable() -> Arc<Self> {
            Arc::new(Self { reply: None, calls: Mutex::new(Vec::new()) })
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ChatClient for CannedProvider {
        async fn complete(
            &self,
            api_key: &str,
            request: &CompletionRequest
        ) -> Result<CompletionResponse, Box<dyn StdError + Send + Sync>> {
            self.calls.lock().unwrap().push((api_key.to_string(), request.clone()));
            self.reply.clone().ok_or_else(|| "connection refused".into())
        }

        fn get_base_url(&self) -> String {
            "http://canned.invalid".into()
        }
    }

    fn request(messages: Vec<Turn>, api_key: &str) -> RelayRequest {
        RelayRequest { messages, api_key: api_key.into() }
    }

    fn success(content: &str) -> Value {
        json!({ "choices": [{ "message": { "role": "assistant", "content": content } }] })
    }

    #[test]
    fn outbound_prepends_persona_and_preserves_order() {
        let conversation = vec![
            Turn::user("first"),
            Turn::assistant("second"),
            Turn::user("first")
        ];
        let outbound = build_outbound(&conversation);
        assert_eq!(outbound.len(), conversation.len() + 1);
        assert_eq!(outbound[0], Turn::system(SYSTEM_PROMPT));
        assert_eq!(&outbound[1..], conversation.as_slice());
    }

    #[test]
    fn unauthorized_ignores_provider_body() {
        let body = json!({ "error": { "message": "bad key xai-123" } }).to_string();
        let err = map_provider_failure(401, body.as_bytes());
        assert!(matches!(err, RelayError::InvalidCredential));
        assert_eq!(err.status_code(), 401);
        assert_eq!(err.to_string(), "Invalid API key. Please check your xAI API key at console.x.ai");
    }

    #[test]
    fn throttled_gets_fixed_message() {
        let err = map_provider_failure(429, b"not json");
        assert_eq!(err.status_code(), 429);
        assert_eq!(err.to_string(), "Rate limit exceeded. Please try again later.");
    }

    #[test]
    fn other_failures_pass_provider_message_through() {
        let body = json!({ "error": { "message": "model overloaded" } }).to_string();
        let err = map_provider_failure(503, body.as_bytes());
        assert_eq!(err.status_code(), 503);
        assert_eq!(err.to_string(), "model overloaded");
    }

    #[test]
    fn unparseable_failure_body_synthesizes_message() {
        let err = map_provider_failure(502, b"<html>Bad Gateway</html>");
        assert_eq!(err.status_code(), 502);
        assert_eq!(err.to_string(), "API request failed with status 502");

        let err = map_provider_failure(400, br#"{"error":"flat string"}"#);
        assert_eq!(err.to_string(), "API request failed with status 400");
    }

    #[test]
    fn missing_content_yields_placeholder() {
        assert_eq!(extract_content(&json!({})), NO_RESPONSE_PLACEHOLDER);
        assert_eq!(extract_content(&json!({ "choices": [] })), NO_RESPONSE_PLACEHOLDER);
        assert_eq!(
            extract_content(&json!({ "choices": [{ "message": { "content": null } }] })),
            NO_RESPONSE_PLACEHOLDER
        );
        assert_eq!(extract_content(&success("")), NO_RESPONSE_PLACEHOLDER);
        assert_eq!(extract_content(&success("hi there")), "hi there");
    }

    #[tokio::test]
    async fn missing_credential_is_checked_before_messages() {
        let provider = CannedProvider::replying(200, success("unused"));
        let relay = Relay::new(provider.clone(), &LlmConfig::default());

        let err = relay.handle(request(vec![], "")).await.unwrap_err();
        assert!(matches!(err, RelayError::MissingCredential));
        assert_eq!(err.status_code(), 400);

        let err = relay.handle(request(vec![Turn::user("hi")], "")).await.unwrap_err();
        assert!(matches!(err, RelayError::MissingCredential));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn empty_conversation_is_rejected() {
        let provider = CannedProvider::replying(200, success("unused"));
        let relay = Relay::new(provider.clone(), &LlmConfig::default());

        let err = relay.handle(request(vec![], "xai-key")).await.unwrap_err();
        assert!(matches!(err, RelayError::EmptyConversation));
        assert_eq!(err.to_string(), "Messages are required");
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn forwards_credential_and_fixed_sampling() {
        let provider = CannedProvider::replying(200, success("Hi!"));
        let relay = Relay::new(provider.clone(), &LlmConfig::default());

        let content = relay.handle(request(vec![Turn::user("Hello")], "xai-key")).await.unwrap();
        assert_eq!(content, "Hi!");

        let calls = provider.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let (api_key, sent) = &calls[0];
        assert_eq!(api_key, "xai-key");
        assert_eq!(sent.model, "grok-3-latest");
        assert_eq!(sent.temperature, 0.7);
        assert_eq!(sent.max_tokens, 4096);
        assert_eq!(sent.messages.len(), 2);
        assert_eq!(sent.messages[0].role, Role::System);
        assert_eq!(sent.messages[1], Turn::user("Hello"));
    }

    #[tokio::test]
    async fn transport_failure_becomes_internal_error() {
        let relay = Relay::new(CannedProvider::unreachable(), &LlmConfig::default());
        let err = relay.handle(request(vec![Turn::user("hi")], "xai-key")).await.unwrap_err();
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.to_string(), "An error occurred while processing your request");
        match err {
            RelayError::InternalError(cause) => assert!(cause.contains("connection refused")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn malformed_success_body_becomes_internal_error() {
        let provider = Arc::new(CannedProvider {
            reply: Some(CompletionResponse { status: 200, body: b"{ truncated".to_vec() }),
            calls: Mutex::new(Vec::new()),
        });
        let relay = Relay::new(provider, &LlmConfig::default());
        let err = relay.handle(request(vec![Turn::user("hi")], "xai-key")).await.unwrap_err();
        assert!(matches!(err, RelayError::InternalError(_)));
    }
}
