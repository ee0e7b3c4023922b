//! HTTP transport
//!
//! Issues exactly one request per descriptor and reports either the raw
//! response or the reason no response was received

use crate::config::Settings;
use crate::models::{Payload, RequestDescriptor};
use crate::utils::error::AppResult;
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Status and body of a received response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport-level failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Nothing came back: DNS, refused connection, timeout
    #[error("no response: {0}")]
    NoResponse(String),

    /// The request could not be built, so nothing was sent
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Status line arrived but the body could not be read
    #[error("unreadable body (status {status}): {reason}")]
    BodyUnreadable { status: u16, reason: String },
}

/// One request in, one raw response (or failure) out
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: RequestDescriptor) -> Result<RawResponse, TransportError>;
}

/// reqwest-backed transport bound to a base URL
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    /// Create a transport from settings
    pub fn new(settings: &Settings) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.api.timeout))
            .user_agent(settings.api.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            base_url: settings.base_url().to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the request URL
    fn build_url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: RequestDescriptor) -> Result<RawResponse, TransportError> {
        let url = self.build_url(&request.path);
        debug!("{} {}", request.method, url);

        let mut builder = self.client.request(request.method.clone(), &url);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        if let Some(credential) = &request.credential {
            builder = builder.header(AUTHORIZATION, credential.bearer());
        }

        builder = match request.payload {
            Payload::Empty => builder,
            Payload::Json(value) => builder.json(&value),
            Payload::Multipart(form) => {
                let form = form
                    .into_form()
                    .map_err(|e| TransportError::InvalidRequest(format!("invalid multipart body: {}", e)))?;
                builder.multipart(form)
            }
        };

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::NoResponse(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::BodyUnreadable {
                status,
                reason: e.to_string(),
            })?;

        Ok(RawResponse {
            status,
            body: body.to_vec(),
        })
    }
}
