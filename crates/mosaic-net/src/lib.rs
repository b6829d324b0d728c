//! Mosaic Networking
//!
//! Resource transports the shell fetches page configurations and component
//! scripts through. Every transport hands back a `'static` local future so
//! callers can keep it across suspension points without borrowing the
//! transport.

mod fetch;
mod http;
mod file;
mod memory;
mod dispatch;

pub use fetch::FetchResponse;
pub use http::{HttpTransport, HttpConfig};
pub use file::FileTransport;
pub use memory::MemoryTransport;
pub use dispatch::SchemeTransport;
pub use url::Url;

use futures::future::LocalBoxFuture;

/// HTTP Response
#[derive(Debug, Clone, Default)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    /// 200 response with a body
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self { status: 200, headers: Vec::new(), body: body.into() }
    }

    /// Empty response with the given status
    pub fn status(status: u16) -> Self {
        Self { status, ..Default::default() }
    }
}

/// Network error
#[derive(Debug, Clone, thiserror::Error)]
pub enum NetError {
    #[error("HTTP error: {status}")]
    HttpError { status: u16 },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Decode error: {0}")]
    Decode(String),
}

/// Something that can GET a resource by URL
pub trait Transport {
    fn fetch(&self, url: &str) -> LocalBoxFuture<'static, Result<FetchResponse, NetError>>;
}
