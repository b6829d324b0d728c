//! Route table
//!
//! | path           | view                     |
//! |----------------|--------------------------|
//! | (empty)        | home                     |
//! | `page/:pageId` | dynamic page             |
//! | configured     | single wrapped component |
//! | anything else  | not found                |

use crate::config::{RouteConfig, ShellConfig};
use crate::wrapper::WrapperConfig;

const PAGE_PREFIX: &str = "page";

/// Outcome of matching a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteMatch {
    Home,
    DynamicPage { page_id: String },
    Wrapper(WrapperConfig),
    NotFound,
}

/// Matches paths against the shell's routes, first match wins
#[derive(Debug, Clone, Default)]
pub struct Router {
    routes: Vec<RouteConfig>,
}

impl Router {
    pub fn new(routes: Vec<RouteConfig>) -> Self {
        let routes = routes
            .into_iter()
            .map(|mut route| {
                route.path = normalize(&route.path).to_string();
                route
            })
            .collect();
        Self { routes }
    }

    pub fn from_config(config: &ShellConfig) -> Self {
        Self::new(config.routes.clone())
    }

    /// Match a path; slashes at either end, query and fragment are ignored
    pub fn resolve(&self, path: &str) -> RouteMatch {
        let path = normalize(path);
        if path.is_empty() {
            return RouteMatch::Home;
        }

        let mut segments = path.split('/');
        if let (Some(PAGE_PREFIX), Some(page_id), None) = (segments.next(), segments.next(), segments.next()) {
            if !page_id.is_empty() {
                return RouteMatch::DynamicPage { page_id: page_id.to_string() };
            }
        }

        match self.routes.iter().find(|route| route.path == path) {
            Some(route) => RouteMatch::Wrapper(route.component.clone()),
            None => {
                tracing::debug!(path, "no route matched");
                RouteMatch::NotFound
            }
        }
    }
}

fn normalize(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    path[..end].trim_matches('/')
}
