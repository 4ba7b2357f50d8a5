use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client as ReqwestClient;

/// Error type reported by a [`Transport`] when no response could be obtained.
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

/// Status and body of a completed GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body, decoded as text.
    pub body: String,
}

/// The HTTP collaborator used for every outbound request.
///
/// Implementations issue exactly one GET and report whatever status came back.
/// Timeouts, redirects and retries are theirs to configure. Classifying the status is
/// left to the fetcher.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issues a GET for `url` with the given extra headers.
    async fn get(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
    ) -> std::result::Result<RawResponse, TransportError>;
}

/// [`Transport`] backed by a [`reqwest::Client`].
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    http: ReqwestClient,
}

impl ReqwestTransport {
    /// Wraps an already configured `reqwest` client.
    pub fn new(http: ReqwestClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
    ) -> std::result::Result<RawResponse, TransportError> {
        let mut builder = self.http.get(url);
        for (name, value) in headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(RawResponse { status, body })
    }
}
