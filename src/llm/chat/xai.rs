use async_trait::async_trait;
use std::error::Error as StdError;
use log::debug;
use reqwest::Client as HttpClient;
use reqwest::header::{ HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION };
use url::Url;

use super::{ ChatClient, CompletionRequest, CompletionResponse };
use crate::llm::{ LlmConfig, XAI_CHAT_COMPLETIONS_URL };

#[derive(Debug)]
pub struct XAIChatClient {
    http: HttpClient,
    base_url: Url,
}

impl XAIChatClient {
    pub fn new(base_url: Option<Url>) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        let url = match base_url {
            Some(url) => url,
            None => Url::parse(XAI_CHAT_COMPLETIONS_URL)?,
        };

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http_client = HttpClient::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| Box::new(e) as Box<dyn StdError + Send + Sync>)?;

        Ok(Self::with_client(url, http_client))
    }

    pub fn with_client(base_url: Url, http: HttpClient) -> Self {
        Self { http, base_url }
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        Self::new(config.base_url.clone())
    }
}

#[async_trait]
impl ChatClient for XAIChatClient {
    async fn complete(
        &self,
        api_key: &str,
        request: &CompletionRequest
    ) -> Result<CompletionResponse, Box<dyn StdError + Send + Sync>> {
        let auth_header = format!("Bearer {}", api_key);

        let resp = self.http
            .post(self.base_url.clone())
            .header(AUTHORIZATION, auth_header)
            .json(request)
            .send()
            .await?;

        let status = resp.status().as_u16();
        let body = resp.bytes().await?.to_vec();
        debug!("XAI responded with status {} ({} bytes)", status, body.len());

        Ok(CompletionResponse { status, body })
    }

    fn get_base_url(&self) -> String {
        self.base_url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Turn;
    use serde_json::json;

    #[test]
    fn defaults_to_xai_endpoint() {
        let client = XAIChatClient::from_config(&LlmConfig::default()).unwrap();
        assert_eq!(client.get_base_url(), XAI_CHAT_COMPLETIONS_URL);
    }

    #[test]
    fn honours_base_url_override() {
        let config = LlmConfig {
            base_url: Some(Url::parse("http://127.0.0.1:9000/v1/chat/completions").unwrap()),
            ..Default::default()
        };
        let client = XAIChatClient::from_config(&config).unwrap();
        assert_eq!(client.get_base_url(), "http://127.0.0.1:9000/v1/chat/completions");
    }

    #[test]
    fn request_serializes_to_provider_shape() {
        let req = CompletionRequest {
            model: "grok-3-latest".into(),
            messages: vec![Turn::system("persona"), Turn::user("hi")],
            temperature: 0.7,
            max_tokens: 4096,
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["model"], "grok-3-latest");
        assert_eq!(value["max_tokens"], 4096);
        assert_eq!(
            value["messages"],
            json!([
                { "role": "system", "content": "persona" },
                { "role": "user", "content": "hi" }
            ])
        );
        let temperature = value["temperature"].as_f64().unwrap();
        assert!((temperature - 0.7).abs() < 1e-6);
    }
}
