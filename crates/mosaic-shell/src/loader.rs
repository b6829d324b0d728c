//! Component Definition Loader
//!
//! Ensures the custom element definitions a page references are present
//! before the page is rendered. Each distinct resource (script URL or
//! `remote:module` pair) is loaded at most once per registry: completed
//! loads are remembered, and loads still in flight are shared, so two
//! references to the same unloaded bundle never trigger two fetches.

use crate::error::{LoadError, LoadFailure};
use crate::model::{ComponentReference, ResourceKey};
use futures::future::{self, FutureExt, LocalBoxFuture, Shared};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::{Rc, Weak};
use std::time::Duration;

/// Outcome of one underlying load
pub type LoadResult = Result<(), LoadFailure>;

type SharedLoad = Shared<LocalBoxFuture<'static, LoadResult>>;

/// Injects a script by URL and settles on its load or error event
pub trait ScriptLoader {
    fn load_script(&self, url: &str) -> LocalBoxFuture<'static, LoadResult>;
}

/// Imports an exposed module from a federated remote
pub trait ModuleLoader {
    fn load_module(&self, remote_name: &str, exposed_module: &str) -> LocalBoxFuture<'static, LoadResult>;
}

/// Resources loaded (or loading) within one page lifecycle
#[derive(Default)]
pub struct LoadedResourceRegistry {
    loaded: HashSet<ResourceKey>,
    in_flight: HashMap<ResourceKey, SharedLoad>,
    /// Bumped on reset; loads started under an older epoch don't record
    epoch: u64,
}

impl LoadedResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a resource finished loading successfully
    pub fn is_loaded(&self, key: &ResourceKey) -> bool {
        self.loaded.contains(key)
    }

    /// Whether a load for the resource is still pending
    pub fn is_in_flight(&self, key: &ResourceKey) -> bool {
        self.in_flight.contains_key(key)
    }

    /// Number of resources loaded
    pub fn loaded_count(&self) -> usize {
        self.loaded.len()
    }

    /// Forget everything, including loads still in flight
    pub fn reset(&mut self) {
        self.loaded.clear();
        self.in_flight.clear();
        self.epoch += 1;
    }
}

impl std::fmt::Debug for LoadedResourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedResourceRegistry")
            .field("loaded", &self.loaded)
            .field("in_flight", &self.in_flight.keys().collect::<Vec<_>>())
            .field("epoch", &self.epoch)
            .finish()
    }
}

/// Loads component definitions through the injected side effects
#[derive(Clone)]
pub struct ComponentLoader {
    registry: Rc<RefCell<LoadedResourceRegistry>>,
    scripts: Rc<dyn ScriptLoader>,
    modules: Rc<dyn ModuleLoader>,
    timeout: Duration,
}

impl ComponentLoader {
    pub fn new(scripts: Rc<dyn ScriptLoader>, modules: Rc<dyn ModuleLoader>, timeout: Duration) -> Self {
        Self {
            registry: Rc::new(RefCell::new(LoadedResourceRegistry::new())),
            scripts,
            modules,
            timeout,
        }
    }

    /// Registry backing this loader
    pub fn registry(&self) -> &Rc<RefCell<LoadedResourceRegistry>> {
        &self.registry
    }

    /// Forget loaded resources; called when the owning lifecycle ends
    pub fn reset(&self) {
        self.registry.borrow_mut().reset();
    }

    /// Make sure every referenced definition is loaded
    ///
    /// All distinct loads run concurrently. The call settles once every one
    /// of them has settled and reports the first failure in reference order.
    pub async fn ensure_loaded(&self, refs: &[ComponentReference]) -> Result<(), LoadError> {
        let mut seen = HashSet::new();
        let mut pending: Vec<(&str, ResourceKey, SharedLoad)> = Vec::new();

        for component in refs {
            let Some(key) = component.resource_key() else { continue };
            if !seen.insert(key.clone()) {
                continue;
            }
            if let Some(load) = self.load_for(&key) {
                pending.push((component.element_name.as_str(), key, load));
            }
        }

        if pending.is_empty() {
            return Ok(());
        }

        tracing::debug!(count = pending.len(), "waiting for component definitions");
        let results = future::join_all(pending.iter().map(|(_, _, load)| load.clone())).await;

        let mut first_error = None;
        for ((element_name, key, _), result) in pending.into_iter().zip(results) {
            if let Err(cause) = result {
                tracing::error!(element = element_name, resource = %key, error = %cause, "component definition failed to load");
                first_error.get_or_insert(LoadError {
                    element_name: element_name.to_string(),
                    resource_locator: key.to_string(),
                    cause,
                });
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => {
                tracing::debug!("all component definitions loaded");
                Ok(())
            }
        }
    }

    /// Load handle for a resource, or `None` if it's already loaded
    fn load_for(&self, key: &ResourceKey) -> Option<SharedLoad> {
        let mut registry = self.registry.borrow_mut();
        if registry.loaded.contains(key) {
            return None;
        }
        if let Some(load) = registry.in_flight.get(key) {
            tracing::debug!(resource = %key, "joining in-flight load");
            return Some(load.clone());
        }

        tracing::info!(resource = %key, "loading component definition");
        let started = self.start(key);
        let tracked = track(started, key.clone(), Rc::downgrade(&self.registry), registry.epoch)
            .boxed_local()
            .shared();
        registry.in_flight.insert(key.clone(), tracked.clone());
        Some(tracked)
    }

    fn start(&self, key: &ResourceKey) -> LocalBoxFuture<'static, LoadResult> {
        let load = match key {
            ResourceKey::Script(url) => self.scripts.load_script(url),
            ResourceKey::Module { remote_name, exposed_module } => {
                self.modules.load_module(remote_name, exposed_module)
            }
        };
        with_timeout(load, self.timeout)
    }
}

/// Record the outcome of a load in the registry it was started from
async fn track(
    load: LocalBoxFuture<'static, LoadResult>,
    key: ResourceKey,
    registry: Weak<RefCell<LoadedResourceRegistry>>,
    epoch: u64,
) -> LoadResult {
    let result = load.await;
    if let Some(registry) = registry.upgrade() {
        let mut registry = registry.borrow_mut();
        if registry.epoch == epoch {
            registry.in_flight.remove(&key);
            if result.is_ok() {
                registry.loaded.insert(key);
            }
        } else {
            tracing::debug!(resource = %key, "discarding load result from a reset registry");
        }
    }
    result
}

fn with_timeout(load: LocalBoxFuture<'static, LoadResult>, timeout: Duration) -> LocalBoxFuture<'static, LoadResult> {
    smol::future::or(load, async move {
        smol::Timer::after(timeout).await;
        Err(LoadFailure::TimedOut(timeout))
    })
    .boxed_local()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Counts calls; URLs containing "fail" fail, "hang" never settle
    #[derive(Default)]
    struct CountingLoader {
        scripts: RefCell<Vec<String>>,
        modules: Cell<usize>,
    }

    impl ScriptLoader for CountingLoader {
        fn load_script(&self, url: &str) -> LocalBoxFuture<'static, LoadResult> {
            self.scripts.borrow_mut().push(url.to_string());
            let url = url.to_string();
            async move {
                smol::Timer::after(Duration::from_millis(5)).await;
                if url.contains("hang") {
                    future::pending::<()>().await;
                }
                if url.contains("fail") {
                    Err(LoadFailure::Failed(format!("Failed to load script {url}")))
                } else {
                    Ok(())
                }
            }
            .boxed_local()
        }
    }

    impl ModuleLoader for CountingLoader {
        fn load_module(&self, _remote_name: &str, _exposed_module: &str) -> LocalBoxFuture<'static, LoadResult> {
            self.modules.set(self.modules.get() + 1);
            future::ready(Ok(())).boxed_local()
        }
    }

    fn loader(stub: &Rc<CountingLoader>) -> ComponentLoader {
        ComponentLoader::new(stub.clone(), stub.clone(), Duration::from_secs(5))
    }

    #[test]
    fn test_second_call_is_noop() {
        let stub = Rc::new(CountingLoader::default());
        let loader = loader(&stub);
        let refs = [ComponentReference::new("foo-bar").with_script("/s.js")];

        smol::block_on(async {
            loader.ensure_loaded(&refs).await.unwrap();
            loader.ensure_loaded(&refs).await.unwrap();
        });

        assert_eq!(stub.scripts.borrow().len(), 1);
        assert!(loader.registry().borrow().is_loaded(&ResourceKey::Script("/s.js".into())));
    }

    #[test]
    fn test_shared_url_loads_once() {
        let stub = Rc::new(CountingLoader::default());
        let loader = loader(&stub);
        let refs = [
            ComponentReference::new("x-a").with_script("/bundle.js"),
            ComponentReference::new("x-b").with_script("/bundle.js"),
            ComponentReference::new("x-c").with_remote("mfe", "./c"),
            ComponentReference::new("x-d").with_remote("mfe", "./c"),
            ComponentReference::new("div"),
        ];

        smol::block_on(loader.ensure_loaded(&refs)).unwrap();

        assert_eq!(*stub.scripts.borrow(), vec!["/bundle.js".to_string()]);
        assert_eq!(stub.modules.get(), 1);
    }

    #[test]
    fn test_concurrent_calls_share_in_flight_load() {
        let stub = Rc::new(CountingLoader::default());
        let loader = loader(&stub);
        let refs = [ComponentReference::new("x-a").with_script("/slow.js")];

        let (a, b) = smol::block_on(future::join(loader.ensure_loaded(&refs), loader.ensure_loaded(&refs)));

        assert!(a.is_ok() && b.is_ok());
        assert_eq!(stub.scripts.borrow().len(), 1);
    }

    #[test]
    fn test_failure_reports_first_in_order_after_all_settle() {
        let stub = Rc::new(CountingLoader::default());
        let loader = loader(&stub);
        let refs = [
            ComponentReference::new("x-ok").with_script("/ok.js"),
            ComponentReference::new("x-bad").with_script("/fail-1.js"),
            ComponentReference::new("x-worse").with_script("/fail-2.js"),
        ];

        let err = smol::block_on(loader.ensure_loaded(&refs)).unwrap_err();

        assert_eq!(err.element_name, "x-bad");
        assert_eq!(err.resource_locator, "/fail-1.js");
        let registry = loader.registry().borrow();
        assert!(registry.is_loaded(&ResourceKey::Script("/ok.js".into())));
        assert!(!registry.is_loaded(&ResourceKey::Script("/fail-1.js".into())));
        assert!(!registry.is_in_flight(&ResourceKey::Script("/fail-1.js".into())));
    }

    #[test]
    fn test_failed_load_is_retried() {
        let stub = Rc::new(CountingLoader::default());
        let loader = loader(&stub);
        let refs = [ComponentReference::new("x-bad").with_script("/fail.js")];

        smol::block_on(async {
            assert!(loader.ensure_loaded(&refs).await.is_err());
            assert!(loader.ensure_loaded(&refs).await.is_err());
        });

        assert_eq!(stub.scripts.borrow().len(), 2);
    }

    #[test]
    fn test_timeout_surfaces_as_load_error() {
        let stub = Rc::new(CountingLoader::default());
        let loader = ComponentLoader::new(stub.clone(), stub.clone(), Duration::from_millis(30));
        let refs = [ComponentReference::new("x-slow").with_script("/hang.js")];

        let err = smol::block_on(loader.ensure_loaded(&refs)).unwrap_err();

        assert_eq!(err.cause, LoadFailure::TimedOut(Duration::from_millis(30)));
    }

    #[test]
    fn test_reset_discards_late_results() {
        let stub = Rc::new(CountingLoader::default());
        let loader = loader(&stub);
        let refs = [ComponentReference::new("x-a").with_script("/a.js")];

        smol::block_on(async {
            let pending = loader.ensure_loaded(&refs);
            futures::pin_mut!(pending);
            // Start the load, then reset while it is in flight
            assert!(futures::poll!(pending.as_mut()).is_pending());
            loader.reset();
            pending.await.unwrap();
        });

        assert_eq!(loader.registry().borrow().loaded_count(), 0);
    }

    #[test]
    fn test_preloaded_components_need_nothing() {
        let stub = Rc::new(CountingLoader::default());
        let loader = loader(&stub);
        smol::block_on(loader.ensure_loaded(&[ComponentReference::new("div")])).unwrap();
        assert!(stub.scripts.borrow().is_empty());
        assert_eq!(stub.modules.get(), 0);
    }
}
