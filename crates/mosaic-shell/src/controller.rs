//! Page Lifecycle Controller
//!
//! Drives one dynamic page: resolve the layout, load the definitions it
//! references, render it. A newer navigation supersedes the one in flight.
//! Every navigation takes a generation token and re-checks it after each
//! suspension point, so a stale pipeline never touches the DOM or the
//! visible state.

use crate::loader::ComponentLoader;
use crate::render::{CreatedNodeSet, LayoutRenderer, LOADING_CLASS};
use crate::resolver::ConfigResolver;
use crate::SharedDom;
use futures::future::{self, AbortHandle, Abortable, FusedFuture, FutureExt, LocalBoxFuture};
use futures::stream::{Stream, StreamExt};
use mosaic_dom::NodeId;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Shown when a navigation carries no page id
pub const MISSING_PAGE_ID: &str = "Page ID is missing";
/// Shown when the page id is invalid or its layout can't be resolved
pub const CONFIG_NOT_FOUND: &str = "configuration not found or invalid";
/// Shown when a referenced component definition failed to load
pub const COMPONENTS_FAILED: &str = "failed to load required page components";
/// Text of the loading indicator
pub const LOADING_MESSAGE: &str = "Loading page configuration...";

/// Visible page state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PageState {
    #[default]
    Idle,
    Loading,
    Rendered,
    Error(String),
}

impl PageState {
    pub fn is_loading(&self) -> bool {
        matches!(self, PageState::Loading)
    }

    /// Error message, if the page failed
    pub fn error(&self) -> Option<&str> {
        match self {
            PageState::Error(message) => Some(message.as_str()),
            _ => None,
        }
    }
}

struct Inner {
    dom: SharedDom,
    container: NodeId,
    resolver: ConfigResolver,
    loader: ComponentLoader,
    renderer: LayoutRenderer,
    state: RefCell<PageState>,
    created: RefCell<CreatedNodeSet>,
    generation: Cell<u64>,
    torn_down: Cell<bool>,
    subscriptions: RefCell<Vec<AbortHandle>>,
}

/// Controller for a dynamic page rendered into one container
///
/// Clones share the same page.
#[derive(Clone)]
pub struct PageController {
    inner: Rc<Inner>,
}

impl PageController {
    pub fn new(dom: SharedDom, container: NodeId, resolver: ConfigResolver, loader: ComponentLoader) -> Self {
        Self {
            inner: Rc::new(Inner {
                dom,
                container,
                resolver,
                loader,
                renderer: LayoutRenderer::new(),
                state: RefCell::new(PageState::Idle),
                created: RefCell::new(CreatedNodeSet::new()),
                generation: Cell::new(0),
                torn_down: Cell::new(false),
                subscriptions: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Container the page renders into
    pub fn container(&self) -> NodeId {
        self.inner.container
    }

    pub fn state(&self) -> PageState {
        self.inner.state.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().is_loading()
    }

    pub fn error(&self) -> Option<String> {
        self.inner.state.borrow().error().map(str::to_string)
    }

    /// Nodes the current render cycle created
    pub fn created_nodes(&self) -> CreatedNodeSet {
        self.inner.created.borrow().clone()
    }

    pub fn loader(&self) -> &ComponentLoader {
        &self.inner.loader
    }

    pub fn is_torn_down(&self) -> bool {
        self.inner.torn_down.get()
    }

    /// Navigate to a page
    ///
    /// The previous page is cleared and the state switches to
    /// [`PageState::Loading`] right away; the returned future runs the
    /// rest of the pipeline. Dropping it abandons the navigation.
    pub fn navigate(&self, page_id: Option<&str>) -> LocalBoxFuture<'static, ()> {
        if self.inner.torn_down.get() {
            tracing::warn!(?page_id, "navigation after teardown ignored");
            return future::ready(()).boxed_local();
        }

        let token = self.inner.begin();
        let inner = self.inner.clone();
        let page_id = page_id.map(str::to_string);
        async move { inner.load_page(token, page_id).await }.boxed_local()
    }

    /// Follow a stream of page ids, always switching to the latest one
    ///
    /// Completes once the stream ends and the last navigation settled, or
    /// when the controller is torn down.
    pub fn run<S>(&self, params: S) -> LocalBoxFuture<'static, ()>
    where
        S: Stream<Item = Option<String>> + 'static,
    {
        let (handle, registration) = AbortHandle::new_pair();
        self.inner.subscriptions.borrow_mut().push(handle);

        let controller = self.clone();
        let driver = async move {
            let params = params.fuse();
            futures::pin_mut!(params);
            let mut current = future::Fuse::terminated();

            loop {
                futures::select_biased! {
                    param = params.next() => match param {
                        Some(page_id) => current = controller.navigate(page_id.as_deref()).fuse(),
                        None => break,
                    },
                    () = current => {}
                }
            }
            if !current.is_terminated() {
                current.await;
            }
        };

        Abortable::new(driver, registration).map(|_| ()).boxed_local()
    }

    /// Stop the page: cancel subscriptions, drop in-flight work, remove
    /// rendered nodes and forget loaded resources
    pub fn teardown(&self) {
        let inner = &self.inner;
        if inner.torn_down.replace(true) {
            return;
        }

        for handle in inner.subscriptions.borrow_mut().drain(..) {
            handle.abort();
        }
        inner.generation.set(inner.generation.get() + 1);
        {
            let mut dom = inner.dom.borrow_mut();
            inner.created.borrow_mut().clear(&mut *dom, inner.container);
        }
        inner.loader.reset();
        *inner.state.borrow_mut() = PageState::Idle;
        tracing::debug!(container = %inner.container, "page torn down");
    }
}

impl Inner {
    /// Start a navigation and return its token
    fn begin(&self) -> u64 {
        let token = self.generation.get() + 1;
        self.generation.set(token);
        *self.state.borrow_mut() = PageState::Loading;

        let mut dom = self.dom.borrow_mut();
        let mut created = self.created.borrow_mut();
        if let Err(err) = self.renderer.render_message(LOADING_CLASS, LOADING_MESSAGE, &mut *dom, self.container, &mut created) {
            tracing::warn!(error = %err, "could not show loading indicator");
        }
        token
    }

    fn is_current(&self, token: u64) -> bool {
        !self.torn_down.get() && self.generation.get() == token
    }

    async fn load_page(&self, token: u64, page_id: Option<String>) {
        let Some(page_id) = page_id.filter(|id| !id.is_empty()) else {
            tracing::error!("navigation without a page id");
            self.fail(token, MISSING_PAGE_ID);
            return;
        };

        tracing::debug!(page_id = %page_id, token, "loading page");
        let layout = self.resolver.resolve(&page_id).await;
        if !self.is_current(token) {
            tracing::debug!(page_id = %page_id, token, "navigation superseded during resolution");
            return;
        }
        let layout = match layout {
            Ok(layout) => layout,
            Err(err) => {
                tracing::error!(page_id = %page_id, error = %err, "page configuration unavailable");
                self.fail(token, CONFIG_NOT_FOUND);
                return;
            }
        };

        let loaded = self.loader.ensure_loaded(&layout.components).await;
        if !self.is_current(token) {
            tracing::debug!(page_id = %page_id, token, "navigation superseded during loading");
            return;
        }
        if let Err(err) = loaded {
            tracing::error!(page_id = %page_id, error = %err, "page components unavailable");
            self.fail(token, COMPONENTS_FAILED);
            return;
        }

        let rendered = {
            let mut dom = self.dom.borrow_mut();
            let mut created = self.created.borrow_mut();
            self.renderer.render(&layout, &mut *dom, self.container, &mut created)
        };
        match rendered {
            Ok(()) => {
                *self.state.borrow_mut() = PageState::Rendered;
                tracing::info!(page_id = %page_id, components = layout.components.len(), "page rendered");
            }
            Err(err) => {
                tracing::error!(page_id = %page_id, error = %err, "page container rejected layout");
                self.fail(token, CONFIG_NOT_FOUND);
            }
        }
    }

    fn fail(&self, token: u64, message: &str) {
        if !self.is_current(token) {
            return;
        }
        {
            let mut dom = self.dom.borrow_mut();
            let mut created = self.created.borrow_mut();
            if let Err(err) = self.renderer.render_error(message, &mut *dom, self.container, &mut created) {
                tracing::warn!(error = %err, "could not show error message");
            }
        }
        *self.state.borrow_mut() = PageState::Error(message.to_string());
    }
}
