//! Layout Config Resolver
//!
//! Page id → layout description. The id check runs before any transport
//! access: ids end up in a URL path, so anything outside `[A-Za-z0-9_-]`
//! is refused outright.

use crate::error::ResolveError;
use crate::model::LayoutDescription;
use mosaic_net::Transport;
use regex::Regex;
use std::rc::Rc;
use std::sync::LazyLock;

static PAGE_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_-]+$").expect("page id pattern is valid")
});

/// Whether `page_id` may be used to address a layout resource
pub fn is_valid_page_id(page_id: &str) -> bool {
    PAGE_ID.is_match(page_id)
}

/// Fetches and validates page layouts
#[derive(Clone)]
pub struct ConfigResolver {
    transport: Rc<dyn Transport>,
    base_path: String,
}

impl ConfigResolver {
    pub fn new(transport: Rc<dyn Transport>, base_path: impl Into<String>) -> Self {
        let base_path = base_path.into().trim_end_matches('/').to_string();
        Self { transport, base_path }
    }

    /// Resource location for a page id
    pub fn config_url(&self, page_id: &str) -> String {
        format!("{}/{}.json", self.base_path, page_id)
    }

    /// Resolve a page id
    ///
    /// Every failure after the id check collapses to
    /// [`ResolveError::ConfigNotFound`]; the cause is only logged.
    pub async fn resolve(&self, page_id: &str) -> Result<LayoutDescription, ResolveError> {
        if !is_valid_page_id(page_id) {
            tracing::error!(page_id, "invalid page id format");
            return Err(ResolveError::InvalidIdentifier(page_id.to_string()));
        }

        let url = self.config_url(page_id);
        tracing::debug!(page_id, %url, "fetching layout config");

        let response = match self.transport.fetch(&url).await {
            Ok(response) => response,
            Err(err) => {
                tracing::error!(page_id, %url, error = %err, "layout config fetch failed");
                return Err(ResolveError::ConfigNotFound);
            }
        };
        if !response.ok() {
            tracing::error!(page_id, %url, status = response.status(), "layout config fetch returned error status");
            return Err(ResolveError::ConfigNotFound);
        }

        match LayoutDescription::from_slice(response.bytes()) {
            Ok(description) => {
                tracing::debug!(
                    page_id,
                    layout = %description.layout_mode,
                    components = description.components.len(),
                    "layout config parsed"
                );
                Ok(description)
            }
            Err(err) => {
                tracing::error!(page_id, %url, error = %err, "invalid layout config structure");
                Err(ResolveError::ConfigNotFound)
            }
        }
    }
}
