//! Single-Component Wrapper
//!
//! Mounts one statically configured custom element into its own host node.
//! Used by routes that show a single micro-frontend instead of a layout.

use crate::error::LoadError;
use crate::loader::ComponentLoader;
use crate::model::ComponentReference;
use crate::SharedDom;
use mosaic_dom::{DomError, DomOps, ElementDefinitions, NodeId};
use serde::{Deserialize, Serialize};
use std::cell::Cell;

/// Route-level component descriptor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WrapperConfig {
    pub element_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exposed_module: Option<String>,
}

impl WrapperConfig {
    /// Element defined by a classic script
    pub fn script(element_name: impl Into<String>, script_url: impl Into<String>) -> Self {
        Self {
            element_name: element_name.into(),
            script_url: Some(script_url.into()),
            ..Default::default()
        }
    }

    /// Element exposed by a federated remote
    pub fn remote(
        element_name: impl Into<String>,
        remote_name: impl Into<String>,
        exposed_module: impl Into<String>,
    ) -> Self {
        Self {
            element_name: element_name.into(),
            remote_name: Some(remote_name.into()),
            exposed_module: Some(exposed_module.into()),
            ..Default::default()
        }
    }

    /// Reference carrying the strategy this wrapper loads with
    ///
    /// A script URL takes precedence here, unlike page layouts; `None` when
    /// neither strategy is configured.
    pub fn as_reference(&self) -> Option<ComponentReference> {
        let reference = ComponentReference::new(self.element_name.clone());
        let non_empty = |v: &Option<String>| v.as_deref().filter(|s| !s.is_empty()).map(str::to_string);

        if let Some(url) = non_empty(&self.script_url) {
            return Some(reference.with_script(url));
        }
        match (non_empty(&self.remote_name), non_empty(&self.exposed_module)) {
            (Some(remote), Some(module)) => Some(reference.with_remote(remote, module)),
            _ => None,
        }
    }
}

/// Wrapper errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WrapperError {
    #[error("invalid wrapper configuration for <{0}>: no script URL or remote module")]
    InvalidConfig(String),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Dom(#[from] DomError),
}

/// Hosts exactly one custom element
pub struct ComponentWrapper {
    dom: SharedDom,
    host: NodeId,
    loader: ComponentLoader,
    created: Cell<Option<NodeId>>,
}

impl ComponentWrapper {
    pub fn new(dom: SharedDom, host: NodeId, loader: ComponentLoader) -> Self {
        Self { dom, host, loader, created: Cell::new(None) }
    }

    /// Host node the element is mounted under
    pub fn host(&self) -> NodeId {
        self.host
    }

    /// Currently mounted element
    pub fn element(&self) -> Option<NodeId> {
        self.created.get()
    }

    /// Load the configured definition and mount the element
    ///
    /// Failures are logged and leave nothing rendered.
    pub async fn mount(&self, config: &WrapperConfig) -> Result<NodeId, WrapperError> {
        let Some(reference) = config.as_reference() else {
            tracing::error!(?config, "invalid wrapper configuration");
            return Err(WrapperError::InvalidConfig(config.element_name.clone()));
        };

        if let Err(err) = self.loader.ensure_loaded(std::slice::from_ref(&reference)).await {
            tracing::error!(element = %config.element_name, error = %err, "wrapped component failed to load");
            return Err(err.into());
        }

        self.render(&config.element_name).inspect_err(|err| {
            tracing::error!(element = %config.element_name, error = %err, "wrapped component failed to render");
        })
    }

    fn render(&self, element_name: &str) -> Result<NodeId, WrapperError> {
        self.unmount();

        let mut dom = self.dom.borrow_mut();
        if !dom.is_defined(element_name) {
            tracing::warn!(element = element_name, "custom element not defined before creation");
        }
        let element = dom.create_element(element_name)?;
        dom.append_child(self.host, element)?;
        self.created.set(Some(element));
        tracing::debug!(element = element_name, node = %element, "wrapped component mounted");
        Ok(element)
    }

    /// Remove the mounted element, if any
    pub fn unmount(&self) {
        let Some(element) = self.created.take() else { return };
        let mut dom = self.dom.borrow_mut();
        if let Err(err) = dom.remove_child(self.host, element) {
            tracing::debug!(node = %element, error = %err, "wrapped component already detached");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoadFailure;
    use crate::loader::{LoadResult, ModuleLoader, ScriptLoader};
    use futures::future::{self, FutureExt, LocalBoxFuture};
    use mosaic_dom::{Document, DomOps};
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    #[derive(Default)]
    struct Recorder {
        calls: RefCell<Vec<String>>,
    }

    impl ScriptLoader for Recorder {
        fn load_script(&self, url: &str) -> LocalBoxFuture<'static, LoadResult> {
            self.calls.borrow_mut().push(format!("script {url}"));
            let result = if url.contains("fail") {
                Err(LoadFailure::Failed("script error".into()))
            } else {
                Ok(())
            };
            future::ready(result).boxed_local()
        }
    }

    impl ModuleLoader for Recorder {
        fn load_module(&self, remote_name: &str, exposed_module: &str) -> LocalBoxFuture<'static, LoadResult> {
            self.calls.borrow_mut().push(format!("module {remote_name}:{exposed_module}"));
            future::ready(Ok(())).boxed_local()
        }
    }

    fn setup() -> (Rc<RefCell<Document>>, Rc<Recorder>, ComponentWrapper) {
        let doc = Rc::new(RefCell::new(Document::default()));
        let host = {
            let mut d = doc.borrow_mut();
            let host = d.create_element("app-wrapper").unwrap();
            let body = d.body();
            d.append_child(body, host).unwrap();
            host
        };
        let recorder = Rc::new(Recorder::default());
        let loader = ComponentLoader::new(recorder.clone(), recorder.clone(), Duration::from_secs(1));
        let wrapper = ComponentWrapper::new(doc.clone(), host, loader);
        (doc, recorder, wrapper)
    }

    #[test]
    fn test_script_takes_precedence() {
        let config = WrapperConfig {
            element_name: "x-el".into(),
            script_url: Some("/el.js".into()),
            remote_name: Some("mfe".into()),
            exposed_module: Some("./el".into()),
        };
        let reference = config.as_reference().unwrap();
        assert_eq!(reference.script_url.as_deref(), Some("/el.js"));
        assert!(reference.remote_name.is_none());
    }

    #[test]
    fn test_config_from_json() {
        let config: WrapperConfig = serde_json::from_str(
            r#"{"elementName": "mfe2-root", "remoteName": "mfe2", "exposedModule": "./web-component"}"#,
        )
        .unwrap();
        assert_eq!(config, WrapperConfig::remote("mfe2-root", "mfe2", "./web-component"));
    }

    #[test]
    fn test_mount_script_component() {
        let (doc, recorder, wrapper) = setup();
        let element = smol::block_on(wrapper.mount(&WrapperConfig::script("my-element", "/my.js"))).unwrap();

        assert_eq!(doc.borrow().child_ids(wrapper.host()), vec![element]);
        assert_eq!(*recorder.calls.borrow(), vec!["script /my.js".to_string()]);
    }

    #[test]
    fn test_mount_remote_component() {
        let (doc, recorder, wrapper) = setup();
        smol::block_on(wrapper.mount(&WrapperConfig::remote("mfe2-root", "mfe2", "./web-component"))).unwrap();

        let d = doc.borrow();
        let children = d.child_ids(wrapper.host());
        assert_eq!(d.element(children[0]).unwrap().tag, "mfe2-root");
        assert_eq!(*recorder.calls.borrow(), vec!["module mfe2:./web-component".to_string()]);
    }

    #[test]
    fn test_remount_replaces_element() {
        let (doc, _, wrapper) = setup();
        smol::block_on(async {
            wrapper.mount(&WrapperConfig::script("first-el", "/a.js")).await.unwrap();
            wrapper.mount(&WrapperConfig::script("second-el", "/b.js")).await.unwrap();
        });

        let d = doc.borrow();
        let children = d.child_ids(wrapper.host());
        assert_eq!(children.len(), 1);
        assert_eq!(d.element(children[0]).unwrap().tag, "second-el");
    }

    #[test]
    fn test_invalid_config_renders_nothing() {
        let (doc, recorder, wrapper) = setup();
        let result = smol::block_on(wrapper.mount(&WrapperConfig {
            element_name: "lonely-el".into(),
            remote_name: Some("mfe".into()),
            ..Default::default()
        }));

        assert_eq!(result, Err(WrapperError::InvalidConfig("lonely-el".into())));
        assert!(doc.borrow().child_ids(wrapper.host()).is_empty());
        assert!(recorder.calls.borrow().is_empty());
    }

    #[test]
    fn test_load_failure_renders_nothing() {
        let (doc, _, wrapper) = setup();
        let result = smol::block_on(wrapper.mount(&WrapperConfig::script("x-el", "/fail.js")));

        assert!(matches!(result, Err(WrapperError::Load(_))));
        assert!(doc.borrow().child_ids(wrapper.host()).is_empty());
    }

    #[test]
    fn test_unmount() {
        let (doc, _, wrapper) = setup();
        smol::block_on(wrapper.mount(&WrapperConfig::script("x-el", "/x.js"))).unwrap();

        wrapper.unmount();
        wrapper.unmount();

        assert!(doc.borrow().child_ids(wrapper.host()).is_empty());
        assert!(wrapper.element().is_none());
    }
}
