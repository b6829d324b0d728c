//! Fetch response
//!
//! JavaScript-style `fetch()` response with convenience accessors.

use crate::{NetError, Response};

/// Fetch response with convenience methods
#[derive(Debug, Clone)]
pub struct FetchResponse {
    url: String,
    inner: Response,
}

impl FetchResponse {
    pub fn new(url: &str, inner: Response) -> Self {
        Self { url: url.to_string(), inner }
    }

    /// URL the response was fetched from
    pub fn url(&self) -> &str {
        &self.url
    }

    /// HTTP status code
    pub fn status(&self) -> u16 {
        self.inner.status
    }

    /// Check if response is OK (2xx)
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.inner.status)
    }

    /// Turn a non-2xx response into an error
    pub fn error_for_status(self) -> Result<Self, NetError> {
        if self.ok() {
            Ok(self)
        } else {
            Err(NetError::HttpError { status: self.status() })
        }
    }

    /// Get header value (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.inner.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Get body as text
    pub fn text(&self) -> Result<String, NetError> {
        String::from_utf8(self.inner.body.clone())
            .map_err(|e| NetError::Decode(e.to_string()))
    }

    /// Get body as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, NetError> {
        serde_json::from_slice(&self.inner.body)
            .map_err(|e| NetError::Decode(e.to_string()))
    }

    /// Get raw body bytes
    pub fn bytes(&self) -> &[u8] {
        &self.inner.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_range() {
        assert!(FetchResponse::new("/a", Response::status(204)).ok());
        assert!(!FetchResponse::new("/a", Response::status(304)).ok());
        assert!(!FetchResponse::new("/a", Response::status(404)).ok());
    }

    #[test]
    fn test_error_for_status() {
        let err = FetchResponse::new("/a", Response::status(500)).error_for_status().unwrap_err();
        assert!(matches!(err, NetError::HttpError { status: 500 }));
    }

    #[test]
    fn test_json_decode_error() {
        let resp = FetchResponse::new("/a", Response::ok("{not json"));
        assert!(matches!(resp.json::<serde_json::Value>(), Err(NetError::Decode(_))));
    }

    #[test]
    fn test_header_lookup() {
        let resp = FetchResponse::new("/a", Response {
            status: 200,
            headers: vec![("Content-Type".into(), "application/json".into())],
            body: Vec::new(),
        });
        assert_eq!(resp.header("content-type"), Some("application/json"));
    }
}
