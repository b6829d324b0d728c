//! Shell Configuration

use crate::error::ConfigError;
use crate::wrapper::WrapperConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Static route rendering a single wrapped component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteConfig {
    /// Path without leading slash, e.g. `mfe1`
    pub path: String,
    /// Component mounted at this path
    pub component: WrapperConfig,
}

/// Shell configuration options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShellConfig {
    /// Location page layouts are fetched from (`{base}/{pageId}.json`)
    pub config_base_path: String,

    /// Upper bound for one script or module load, in milliseconds
    pub load_timeout_ms: u64,

    /// Federation manifest: remote name to remote entry URL
    pub remotes: BTreeMap<String, String>,

    /// Static single-component routes
    pub routes: Vec<RouteConfig>,

    /// URL of the shell document
    pub document_url: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            config_base_path: "/assets/page-configs".to_string(),
            load_timeout_ms: 30_000,
            remotes: BTreeMap::from([(
                "mfe2".to_string(),
                "http://localhost:4202/remoteEntry.json".to_string(),
            )]),
            routes: vec![
                RouteConfig {
                    path: "mfe1".to_string(),
                    component: WrapperConfig::script(
                        "my-angular-element",
                        "http://127.0.0.1:8080/my-angular-element.js",
                    ),
                },
                RouteConfig {
                    path: "mfe2".to_string(),
                    component: WrapperConfig::remote("mfe2-root", "mfe2", "./web-component"),
                },
            ],
            document_url: "http://localhost:4200/".to_string(),
        }
    }
}

impl ShellConfig {
    /// Parse a JSON configuration; absent keys take their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a JSON configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_json(&json)?;
        tracing::debug!(path = %path.display(), routes = config.routes.len(), "shell configuration loaded");
        Ok(config)
    }

    /// Load timeout as a duration
    pub fn load_timeout(&self) -> Duration {
        Duration::from_millis(self.load_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ShellConfig::default();
        assert_eq!(config.config_base_path, "/assets/page-configs");
        assert_eq!(config.load_timeout(), Duration::from_secs(30));
        assert_eq!(config.routes.len(), 2);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = ShellConfig::from_json(r#"{ "loadTimeoutMs": 500 }"#).unwrap();
        assert_eq!(config.load_timeout(), Duration::from_millis(500));
        assert_eq!(config.config_base_path, "/assets/page-configs");
    }

    #[test]
    fn test_routes_from_json() {
        let config = ShellConfig::from_json(r#"{
            "routes": [
                { "path": "orders", "component": { "elementName": "orders-app", "scriptUrl": "/orders.js" } }
            ],
            "remotes": { "billing": "https://billing.example.com/remoteEntry.json" }
        }"#).unwrap();

        assert_eq!(config.routes.len(), 1);
        assert_eq!(config.routes[0].component.element_name, "orders-app");
        assert_eq!(config.remotes.len(), 1);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(ShellConfig::from_json("{"), Err(ConfigError::Parse(_))));
    }
}
