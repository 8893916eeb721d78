use async_trait::async_trait;
use reqwest::Client;
use std::fmt::Debug;

use crate::error::Error;

/// Raw outcome of one HTTP round-trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// The HTTP collaborator the client dispatches through.
///
/// One GET with a query-pair list, one response. Timeouts, pooling and TLS
/// are whatever the implementation provides; the client adds no transport
/// semantics of its own.
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    async fn get(&self, url: &str, query: &[(String, String)]) -> Result<RawResponse, Error>;
}

/// Production transport backed by a `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self { http: Client::new() }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str, query: &[(String, String)]) -> Result<RawResponse, Error> {
        tracing::debug!(url, pairs = query.len(), "dispatching GET");

        let res = self.http.get(url).query(query).send().await?;

        let status = res.status().as_u16();
        let body = res.text().await?;

        tracing::debug!(status, bytes = body.len(), "response received");

        Ok(RawResponse { status, body })
    }
}
