//! Scheme dispatch
//!
//! Absolute `http(s)` URLs go to the network, everything else (site-relative
//! paths and `file:` URLs) is served from the asset root.

use crate::{FetchResponse, FileTransport, HttpTransport, NetError, Transport};
use futures::future::{self, FutureExt, LocalBoxFuture};
use url::Url;

/// Transport choosing HTTP or file access per URL
#[derive(Debug, Clone)]
pub struct SchemeTransport {
    http: HttpTransport,
    files: FileTransport,
}

impl SchemeTransport {
    pub fn new(http: HttpTransport, files: FileTransport) -> Self {
        Self { http, files }
    }
}

impl Transport for SchemeTransport {
    fn fetch(&self, url: &str) -> LocalBoxFuture<'static, Result<FetchResponse, NetError>> {
        match Url::parse(url) {
            Ok(parsed) => match parsed.scheme() {
                "http" | "https" => self.http.fetch(url),
                "file" => match parsed.to_file_path() {
                    Ok(path) => FileTransport::new(path).fetch(""),
                    Err(()) => future::ready(Err(NetError::InvalidUrl(url.to_string()))).boxed_local(),
                },
                other => future::ready(Err(NetError::InvalidUrl(format!(
                    "unsupported scheme '{other}' in {url}"
                ))))
                .boxed_local(),
            },
            Err(url::ParseError::RelativeUrlWithoutBase) => self.files.fetch(url),
            Err(e) => future::ready(Err(NetError::InvalidUrl(format!("{url}: {e}")))).boxed_local(),
        }
    }
}
