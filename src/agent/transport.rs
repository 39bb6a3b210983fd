//! Outbound request and the byte stream that answers it

use std::pin::Pin;
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use futures::Stream;
use futures::StreamExt;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;
use tracing::warn;

use super::frames::excerpt;
use crate::config::API_TOKEN_ENV;
use crate::errors::FolioChatError;
use crate::errors::Result;
use crate::AppConfig;

/// Bytes read from a rejected response body
const ERROR_BODY_LIMIT: usize = 4096;

/// Longest slice of a rejected response body quoted in the log
const LOGGED_BODY_CHARS: usize = 200;

/// Raw response body, chunked however the network delivered it
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>>>>>;

/// Body of a chat request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub bot_id: String,
    pub user: String,
    pub query: String,
    pub stream: bool,
}

impl ChatRequest {
    pub fn streaming(
        bot_id: impl Into<String>,
        user: impl Into<String>,
        query: impl Into<String>,
    ) -> Self {
        Self {
            bot_id: bot_id.into(),
            user: user.into(),
            query: query.into(),
            stream: true,
        }
    }
}

/// Opens one streamed exchange with the agent
#[async_trait(?Send)]
pub trait AgentTransport {
    async fn open(&self, request: &ChatRequest) -> Result<ByteStream>;
}

#[async_trait(?Send)]
impl<T: AgentTransport + ?Sized> AgentTransport for Rc<T> {
    async fn open(&self, request: &ChatRequest) -> Result<ByteStream> {
        (**self).open(request).await
    }
}

/// HTTP transport for the hosted agent API
pub struct HttpTransport {
    client: Client,
    endpoint: String,
    api_token: Option<String>,
}

impl HttpTransport {
    /// Create a new HTTP transport
    ///
    /// # Errors
    /// - HTTP client build errors (invalid TLS backend configuration)
    pub fn new(
        endpoint: impl Into<String>,
        api_token: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            endpoint: endpoint.into(),
            api_token,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(
            config.agent_endpoint(),
            config.api_token().map(str::to_string),
            config.request_timeout(),
        )
    }
}

#[async_trait(?Send)]
impl AgentTransport for HttpTransport {
    async fn open(&self, request: &ChatRequest) -> Result<ByteStream> {
        let token = self.api_token.as_deref().ok_or_else(|| {
            FolioChatError::ConfigError(format!(
                "agent API token not configured (set {API_TOKEN_ENV} or agent.api_token)"
            ))
        })?;

        debug!(endpoint = %self.endpoint, user = %request.user, "Opening agent stream");
        let mut response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(token)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let mut body = Vec::new();
            while body.len() < ERROR_BODY_LIMIT {
                match response.chunk().await {
                    Ok(Some(chunk)) => body.extend_from_slice(&chunk),
                    _ => break,
                }
            }
            let body = String::from_utf8_lossy(&body);
            warn!(
                status = status.as_u16(),
                body = %excerpt(&body, LOGGED_BODY_CHARS),
                "Agent API rejected the request"
            );
            return Err(FolioChatError::ApiStatus(status.as_u16()));
        }

        let stream = response.bytes_stream().map(|chunk| {
            chunk
                .map(|bytes| bytes.to_vec())
                .map_err(|e| FolioChatError::StreamRead(e.to_string()))
        });
        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let request = ChatRequest::streaming("bot-1", "user_1_abc", "Who are you?");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "bot_id": "bot-1",
                "user": "user_1_abc",
                "query": "Who are you?",
                "stream": true,
            })
        );
    }

    #[tokio::test]
    async fn test_missing_token_fails_before_network() {
        let transport = HttpTransport::new("http://127.0.0.1:9/chat", None, None).unwrap();
        let request = ChatRequest::streaming("bot", "user", "hi");

        let err = match transport.open(&request).await {
            Ok(_) => panic!("expected a configuration error"),
            Err(err) => err,
        };
        assert!(matches!(err, FolioChatError::ConfigError(_)));
        assert!(err.to_string().contains(API_TOKEN_ENV));
    }
}
