//! Shell application
//!
//! Owns the document, the router outlet and the active view. Each route
//! gets its own view: a [`PageController`] for dynamic pages, a
//! [`ComponentWrapper`] for static single-component routes, or a plain
//! placeholder for home and not-found. Moving between two dynamic pages
//! reuses the controller, anything else tears the old view down first.

use crate::config::ShellConfig;
use crate::controller::{PageController, PageState};
use crate::error::ShellError;
use crate::loader::{ComponentLoader, ModuleLoader, ScriptLoader};
use crate::native::{DocumentScriptLoader, ManifestModuleLoader};
use crate::resolver::ConfigResolver;
use crate::router::{RouteMatch, Router};
use crate::wrapper::ComponentWrapper;
use crate::SharedDom;
use mosaic_dom::{outer_html, Document, DomOps, DomResult, NodeId};
use mosaic_net::Transport;
use std::cell::RefCell;
use std::rc::Rc;

/// Id of the element views are rendered into
pub const OUTLET_ID: &str = "router-outlet";

enum ActiveView {
    Page { controller: PageController },
    Wrapper { wrapper: Rc<ComponentWrapper> },
    Placeholder { node: NodeId },
}

/// Micro-frontend shell
pub struct Shell {
    config: ShellConfig,
    document: Rc<RefCell<Document>>,
    outlet: NodeId,
    router: Router,
    transport: Rc<dyn Transport>,
    scripts: Rc<dyn ScriptLoader>,
    modules: Rc<dyn ModuleLoader>,
    active: RefCell<Option<ActiveView>>,
}

impl Shell {
    pub fn new(config: ShellConfig, transport: Rc<dyn Transport>) -> Result<Self, ShellError> {
        let mut document = Document::new(&config.document_url);
        let outlet = document.create_element("main")?;
        document.set_attribute(outlet, "id", OUTLET_ID)?;
        let body = document.body();
        document.append_child(body, outlet)?;

        let document = Rc::new(RefCell::new(document));
        let scripts: Rc<dyn ScriptLoader> = Rc::new(DocumentScriptLoader::new(document.clone(), transport.clone()));
        let modules: Rc<dyn ModuleLoader> = Rc::new(ManifestModuleLoader::new(
            config.remotes.clone(),
            transport.clone(),
            scripts.clone(),
        ));

        tracing::debug!(url = %config.document_url, routes = config.routes.len(), "shell created");
        Ok(Self {
            router: Router::from_config(&config),
            config,
            document,
            outlet,
            transport,
            scripts,
            modules,
            active: RefCell::new(None),
        })
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub fn document(&self) -> &Rc<RefCell<Document>> {
        &self.document
    }

    pub fn outlet(&self) -> NodeId {
        self.outlet
    }

    /// State of the active dynamic page, if one is shown
    pub fn page_state(&self) -> Option<PageState> {
        match &*self.active.borrow() {
            Some(ActiveView::Page { controller }) => Some(controller.state()),
            _ => None,
        }
    }

    /// Route to `path` and settle the resulting view
    pub async fn navigate(&self, path: &str) -> Result<RouteMatch, ShellError> {
        let route = self.router.resolve(path);
        tracing::info!(path, route = ?route, "navigating");

        match &route {
            RouteMatch::DynamicPage { page_id } => {
                let controller = self.page_controller()?;
                controller.navigate(Some(page_id)).await;
            }
            RouteMatch::Wrapper(config) => {
                self.deactivate();
                let host = self.view_root("app-wrapper")?;
                let wrapper = Rc::new(ComponentWrapper::new(self.dom(), host, self.component_loader()));
                *self.active.borrow_mut() = Some(ActiveView::Wrapper { wrapper: wrapper.clone() });
                if let Err(err) = wrapper.mount(config).await {
                    tracing::debug!(element = %config.element_name, error = %err, "wrapper route left empty");
                }
            }
            RouteMatch::Home => self.show_placeholder("home", "Welcome")?,
            RouteMatch::NotFound => self.show_placeholder("not-found", "Page not found")?,
        }
        Ok(route)
    }

    /// Serialized document
    pub fn html(&self) -> String {
        let doc = self.document.borrow();
        outer_html(&doc.tree, doc.document_element())
    }

    /// Serialized router outlet
    pub fn outlet_html(&self) -> String {
        outer_html(&self.document.borrow().tree, self.outlet)
    }

    /// Tear down the active view
    pub fn close(&self) {
        self.deactivate();
    }

    fn dom(&self) -> SharedDom {
        self.document.clone()
    }

    fn component_loader(&self) -> ComponentLoader {
        ComponentLoader::new(self.scripts.clone(), self.modules.clone(), self.config.load_timeout())
    }

    fn page_controller(&self) -> Result<PageController, ShellError> {
        if let Some(ActiveView::Page { controller }) = &*self.active.borrow() {
            return Ok(controller.clone());
        }

        self.deactivate();
        let container = self.view_root("app-dynamic-page")?;
        let resolver = ConfigResolver::new(self.transport.clone(), self.config.config_base_path.clone());
        let controller = PageController::new(self.dom(), container, resolver, self.component_loader());
        *self.active.borrow_mut() = Some(ActiveView::Page { controller: controller.clone() });
        Ok(controller)
    }

    fn show_placeholder(&self, class: &str, text: &str) -> DomResult<()> {
        self.deactivate();
        let node = self.view_root("div")?;
        let mut doc = self.document.borrow_mut();
        doc.add_class(node, class)?;
        doc.set_text_content(node, text)?;
        drop(doc);
        *self.active.borrow_mut() = Some(ActiveView::Placeholder { node });
        Ok(())
    }

    /// Fresh element under the outlet for the next view
    fn view_root(&self, tag: &str) -> DomResult<NodeId> {
        let mut doc = self.document.borrow_mut();
        let node = doc.create_element(tag)?;
        doc.append_child(self.outlet, node)?;
        Ok(node)
    }

    fn deactivate(&self) {
        let Some(view) = self.active.borrow_mut().take() else { return };
        let root = match view {
            ActiveView::Page { controller } => {
                controller.teardown();
                controller.container()
            }
            ActiveView::Wrapper { wrapper } => {
                wrapper.unmount();
                wrapper.host()
            }
            ActiveView::Placeholder { node } => node,
        };
        if let Err(err) = self.document.borrow_mut().remove_child(self.outlet, root) {
            tracing::debug!(node = %root, error = %err, "view root already detached");
        }
    }
}

impl Drop for Shell {
    fn drop(&mut self) {
        self.deactivate();
    }
}
