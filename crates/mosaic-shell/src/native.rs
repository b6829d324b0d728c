//! Load side effects against a `mosaic-dom` document
//!
//! Scripts are injected as `<script>` elements into the body and fetched
//! through a [`Transport`]. Running a script amounts to registering the
//! custom elements it declares with `customElements.define(...)`.
//! Federated modules are found through each remote's `remoteEntry.json`
//! and then loaded as scripts.

use crate::error::LoadFailure;
use crate::loader::{LoadResult, ModuleLoader, ScriptLoader};
use futures::future::{FutureExt, LocalBoxFuture};
use mosaic_dom::{CustomElementError, CustomElementOptions, Document, DomOps, DomResult, NodeId};
use mosaic_net::{FetchResponse, Transport};
use regex::Regex;
use serde::Deserialize;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use std::sync::LazyLock;
use url::Url;

static DEFINE_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"customElements\s*\.\s*define\s*\(\s*(?:"([^"]+)"|'([^']+)'|`([^`]+)`)"#)
        .expect("define pattern is valid")
});

/// Element names a script registers, in source order, without duplicates
pub fn declared_custom_elements(source: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in DEFINE_CALL.captures_iter(source) {
        let Some(name) = caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3)) else { continue };
        if !names.iter().any(|n| n == name.as_str()) {
            names.push(name.as_str().to_string());
        }
    }
    names
}

/// Attribute set on a script tag once its load succeeded
pub const LOADED_ATTR: &str = "data-loaded";

/// Stable element id for the script tag loading `url`
pub fn script_element_id(url: &str) -> String {
    let slug: String = url
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    format!("script-{slug}")
}

/// [`ScriptLoader`] that injects script tags into a document
#[derive(Clone)]
pub struct DocumentScriptLoader {
    document: Rc<RefCell<Document>>,
    transport: Rc<dyn Transport>,
}

impl DocumentScriptLoader {
    pub fn new(document: Rc<RefCell<Document>>, transport: Rc<dyn Transport>) -> Self {
        Self { document, transport }
    }
}

impl ScriptLoader for DocumentScriptLoader {
    fn load_script(&self, url: &str) -> LocalBoxFuture<'static, LoadResult> {
        let document = self.document.clone();
        let transport = self.transport.clone();
        let url = url.to_string();
        async move { run_script(document, transport, url).await }.boxed_local()
    }
}

async fn run_script(document: Rc<RefCell<Document>>, transport: Rc<dyn Transport>, url: String) -> LoadResult {
    let id = script_element_id(&url);
    let pending = {
        let mut doc = document.borrow_mut();
        if let Some(existing) = doc.get_element_by_id(&id) {
            if doc.element(existing).is_some_and(|e| e.get_attr(LOADED_ATTR).is_some()) {
                tracing::debug!(%url, "script already loaded");
                return Ok(());
            }
            tracing::debug!(%url, "replacing unfinished script tag");
            detach_script(&mut doc, existing, &url);
        }
        let node = insert_script_tag(&mut doc, &id, &url)
            .map_err(|err| LoadFailure::Failed(format!("cannot insert script for {url}: {err}")))?;
        PendingScript { document: document.clone(), node, url: url.clone(), settled: false }
    };

    let source = transport
        .fetch(&url)
        .await
        .and_then(FetchResponse::error_for_status)
        .and_then(|response| response.text());

    let mut doc = document.borrow_mut();
    match source {
        Ok(source) => {
            for name in declared_custom_elements(&source) {
                let options = CustomElementOptions { source: Some(url.clone()), ..Default::default() };
                match doc.custom_elements.define(&name, options) {
                    Ok(()) => tracing::info!(element = %name, %url, "custom element registered"),
                    Err(CustomElementError::AlreadyDefined(_)) => {
                        tracing::debug!(element = %name, "custom element already registered");
                    }
                    Err(err) => tracing::warn!(element = %name, error = %err, "script declares an invalid element"),
                }
            }
            pending.settle(&mut doc, true);
            tracing::debug!(%url, "script loaded");
            Ok(())
        }
        Err(err) => {
            tracing::error!(%url, error = %err, "error loading script");
            pending.settle(&mut doc, false);
            Err(LoadFailure::Failed(format!("Failed to load script {url}: {err}")))
        }
    }
}

/// Script tag whose load has not settled yet
///
/// Detached again when dropped before settling, so an abandoned load
/// never looks like a finished one.
struct PendingScript {
    document: Rc<RefCell<Document>>,
    node: NodeId,
    url: String,
    settled: bool,
}

impl PendingScript {
    fn settle(mut self, doc: &mut Document, loaded: bool) {
        self.settled = true;
        if !loaded {
            detach_script(doc, self.node, &self.url);
            return;
        }
        if let Err(err) = doc.set_attribute(self.node, LOADED_ATTR, "") {
            tracing::warn!(url = %self.url, error = %err, "cannot mark script as loaded");
        }
    }
}

impl Drop for PendingScript {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        match self.document.try_borrow_mut() {
            Ok(mut doc) => {
                tracing::debug!(url = %self.url, "script load abandoned");
                detach_script(&mut doc, self.node, &self.url);
            }
            // Left unmarked, so the next load replaces it
            Err(_) => tracing::debug!(url = %self.url, "document busy, abandoned script tag left in place"),
        }
    }
}

fn detach_script(doc: &mut Document, node: NodeId, url: &str) {
    let Some(parent) = doc.tree.parent(node) else { return };
    if let Err(err) = doc.remove_child(parent, node) {
        tracing::debug!(%url, error = %err, "script tag already removed");
    }
}

fn insert_script_tag(doc: &mut Document, id: &str, url: &str) -> DomResult<NodeId> {
    let script = doc.create_element("script")?;
    doc.set_attribute(script, "id", id)?;
    doc.set_attribute(script, "src", url)?;
    doc.set_attribute(script, "type", "text/javascript")?;
    doc.set_attribute(script, "async", "")?;
    let body = doc.body();
    doc.append_child(body, script)?;
    Ok(script)
}

/// Remote entry manifest published by a federated remote
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteEntry {
    #[serde(default)]
    name: String,
    #[serde(default)]
    exposes: Vec<ExposedModule>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExposedModule {
    key: String,
    out_file_name: String,
}

/// [`ModuleLoader`] for native-federation remotes
///
/// `remotes` maps a remote name to its `remoteEntry.json` URL. Manifests are
/// fetched once per remote and cached.
#[derive(Clone)]
pub struct ManifestModuleLoader {
    remotes: Rc<BTreeMap<String, String>>,
    transport: Rc<dyn Transport>,
    scripts: Rc<dyn ScriptLoader>,
    manifests: Rc<RefCell<HashMap<String, RemoteEntry>>>,
}

impl ManifestModuleLoader {
    pub fn new(remotes: BTreeMap<String, String>, transport: Rc<dyn Transport>, scripts: Rc<dyn ScriptLoader>) -> Self {
        Self {
            remotes: Rc::new(remotes),
            transport,
            scripts,
            manifests: Rc::new(RefCell::new(HashMap::new())),
        }
    }

    /// Script URL of an exposed module
    pub async fn module_url(&self, remote_name: &str, exposed_module: &str) -> Result<String, LoadFailure> {
        let entry_url = self
            .remotes
            .get(remote_name)
            .ok_or_else(|| LoadFailure::Failed(format!("unknown remote '{remote_name}'")))?;

        let manifest = self.manifest(remote_name, entry_url).await?;
        let exposed = manifest
            .exposes
            .iter()
            .find(|e| e.key == exposed_module)
            .ok_or_else(|| {
                LoadFailure::Failed(format!("remote '{remote_name}' does not expose '{exposed_module}'"))
            })?;
        Ok(resolve_against(entry_url, &exposed.out_file_name))
    }

    async fn manifest(&self, remote_name: &str, entry_url: &str) -> Result<RemoteEntry, LoadFailure> {
        if let Some(manifest) = self.manifests.borrow().get(remote_name) {
            return Ok(manifest.clone());
        }

        tracing::debug!(remote = remote_name, url = entry_url, "fetching remote entry");
        let manifest: RemoteEntry = self
            .transport
            .fetch(entry_url)
            .await
            .and_then(FetchResponse::error_for_status)
            .and_then(|response| response.json())?;
        if !manifest.name.is_empty() && manifest.name != remote_name {
            tracing::warn!(remote = remote_name, declared = %manifest.name, "remote entry declares a different name");
        }

        self.manifests.borrow_mut().insert(remote_name.to_string(), manifest.clone());
        Ok(manifest)
    }
}

impl ModuleLoader for ManifestModuleLoader {
    fn load_module(&self, remote_name: &str, exposed_module: &str) -> LocalBoxFuture<'static, LoadResult> {
        let this = self.clone();
        let remote_name = remote_name.to_string();
        let exposed_module = exposed_module.to_string();
        async move {
            let url = this.module_url(&remote_name, &exposed_module).await?;
            tracing::debug!(remote = %remote_name, module = %exposed_module, %url, "loading federated module");
            this.scripts.load_script(&url).await
        }
        .boxed_local()
    }
}

/// Resolve a file name relative to the URL of the manifest listing it
fn resolve_against(base: &str, file: &str) -> String {
    match Url::parse(base).and_then(|base| base.join(file)) {
        Ok(url) => url.into(),
        // Relative base such as `/remotes/mfe/remoteEntry.json`
        Err(_) => {
            let dir = base.rfind('/').map_or("", |i| &base[..i]);
            format!("{}/{}", dir, file.trim_start_matches("./"))
        }
    }
}
