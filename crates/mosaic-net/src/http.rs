//! HTTP transport
//!
//! reqwest's blocking client driven from smol's blocking thread pool, so the
//! transport works from any executor without pulling in a second runtime.

use crate::{FetchResponse, NetError, Response, Transport};
use futures::future::{FutureExt, LocalBoxFuture};
use std::time::Duration;

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// User agent string
    pub user_agent: String,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Request timeout
    pub request_timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("mosaic-shell/{}", env!("CARGO_PKG_VERSION")),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Transport for `http:` and `https:` URLs
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(config: HttpConfig) -> Result<Self, NetError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent)
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| NetError::Network(e.to_string()))?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn fetch(&self, url: &str) -> LocalBoxFuture<'static, Result<FetchResponse, NetError>> {
        let client = self.client.clone();
        let url = url.to_string();
        async move {
            tracing::info!(%url, "HTTP GET");
            let target = url.clone();
            let response = smol::unblock(move || -> Result<Response, NetError> {
                let resp = client.get(&target).send()
                    .map_err(|e| NetError::Network(e.to_string()))?;
                let status = resp.status().as_u16();
                let headers = resp.headers().iter()
                    .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), v.to_string())))
                    .collect();
                let body = resp.bytes()
                    .map_err(|e| NetError::Network(e.to_string()))?
                    .to_vec();
                Ok(Response { status, headers, body })
            }).await?;
            tracing::debug!(%url, status = response.status, bytes = response.body.len(), "HTTP response");
            Ok(FetchResponse::new(&url, response))
        }
        .boxed_local()
    }
}
