//! Shell errors
//!
//! Load-time errors ([`ResolveError`], [`LoadError`]) are fatal to a page.
//! [`ElementConfigurationError`] only ever skips one element.

use mosaic_dom::DomError;
use mosaic_net::NetError;
use std::time::Duration;

/// Page configuration could not be resolved
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// Page id does not match `[A-Za-z0-9_-]+`; nothing was fetched
    #[error("invalid page identifier '{0}'")]
    InvalidIdentifier(String),

    /// Transport failure, bad status, parse failure or malformed shape
    #[error("configuration not found or invalid")]
    ConfigNotFound,
}

/// Why a single resource failed to load
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadFailure {
    #[error("{0}")]
    Failed(String),

    #[error("timed out after {0:?}")]
    TimedOut(Duration),
}

impl From<NetError> for LoadFailure {
    fn from(err: NetError) -> Self {
        LoadFailure::Failed(err.to_string())
    }
}

/// A component definition could not be loaded
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to load <{element_name}> from {resource_locator}: {cause}")]
pub struct LoadError {
    pub element_name: String,
    pub resource_locator: String,
    pub cause: LoadFailure,
}

/// Applying configuration to one created element failed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot configure <{element_name}>: {source}")]
pub struct ElementConfigurationError {
    pub element_name: String,
    #[source]
    pub source: DomError,
}

/// Shell configuration file errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid shell configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Top-level error for hosts embedding the shell
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Net(#[from] NetError),

    #[error(transparent)]
    Dom(#[from] DomError),
}
