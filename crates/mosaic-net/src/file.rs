//! File transport
//!
//! Serves URL paths out of a local directory the way a static file server
//! would: missing files become 404 responses, not errors.

use crate::{FetchResponse, NetError, Response, Transport};
use futures::future::{FutureExt, LocalBoxFuture};
use std::path::{Component, Path, PathBuf};

/// Transport reading resources from an asset root
#[derive(Debug, Clone)]
pub struct FileTransport {
    root: PathBuf,
}

impl FileTransport {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Asset root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a URL path onto the asset root, refusing anything that escapes it
    pub fn resolve(&self, url_path: &str) -> Result<PathBuf, NetError> {
        let path = url_path.split(['?', '#']).next().unwrap_or_default();
        let relative = Path::new(path.trim_start_matches('/'));
        let mut resolved = self.root.clone();
        for component in relative.components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                _ => return Err(NetError::InvalidUrl(url_path.to_string())),
            }
        }
        Ok(resolved)
    }
}

impl Transport for FileTransport {
    fn fetch(&self, url: &str) -> LocalBoxFuture<'static, Result<FetchResponse, NetError>> {
        let resolved = self.resolve(url);
        let url = url.to_string();
        async move {
            let path = resolved?;
            tracing::debug!(%url, path = %path.display(), "file fetch");
            let response = match smol::fs::read(&path).await {
                Ok(body) => Response::ok(body),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Response::status(404),
                Err(e) => return Err(NetError::Network(e.to_string())),
            };
            Ok(FetchResponse::new(&url, response))
        }
        .boxed_local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_strips_leading_slash() {
        let transport = FileTransport::new("/srv/shell");
        assert_eq!(
            transport.resolve("/assets/page-configs/home.json").unwrap(),
            PathBuf::from("/srv/shell/assets/page-configs/home.json")
        );
    }

    #[test]
    fn test_resolve_ignores_query() {
        let transport = FileTransport::new("/srv");
        assert_eq!(transport.resolve("/a.js?v=2").unwrap(), PathBuf::from("/srv/a.js"));
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let transport = FileTransport::new("/srv/shell");
        assert!(transport.resolve("/assets/../../etc/passwd").is_err());
    }
}
