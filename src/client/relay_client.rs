use async_trait::async_trait;
use log::debug;
use reqwest::Client as HttpClient;
use thiserror::Error;
use url::Url;

use crate::models::{ RelayRequest, RelayResponse };

#[derive(Debug, Error)]
pub enum ClientError {
    /// The relay answered with its own `{ error }` envelope.
    #[error("{0}")]
    Relay(String),
    #[error("unrecognized relay response (status {0})")]
    Unrecognized(u16),
    #[error("relay unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

#[async_trait]
pub trait RelayClient: Send + Sync {
    async fn send(&self, request: &RelayRequest) -> Result<String, ClientError>;
}

pub struct HttpRelayClient {
    http: HttpClient,
    url: Url,
}

impl HttpRelayClient {
    pub fn new(url: Url) -> Result<Self, ClientError> {
        Ok(Self::with_client(url, HttpClient::builder().build()?))
    }

    pub fn with_client(url: Url, http: HttpClient) -> Self {
        Self { http, url }
    }
}

#[async_trait]
impl RelayClient for HttpRelayClient {
    async fn send(&self, request: &RelayRequest) -> Result<String, ClientError> {
        let resp = self.http.post(self.url.clone()).json(request).send().await?;
        let status = resp.status();
        let body = resp.bytes().await?;
        debug!("Relay responded with status {}", status);

        match serde_json::from_slice::<RelayResponse>(&body) {
            Ok(RelayResponse::Success { content }) if status.is_success() => Ok(content),
            Ok(RelayResponse::Failure { error }) if !status.is_success() => {
                Err(ClientError::Relay(error))
            }
            _ => Err(ClientError::Unrecognized(status.as_u16())),
        }
    }
}
