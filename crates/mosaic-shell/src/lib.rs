//! Mosaic Shell
//!
//! Composes pages out of independently loaded custom elements. A page is
//! described by a JSON layout; the shell resolves it, makes sure every
//! referenced element definition is loaded exactly once, and arranges the
//! elements into a grid or flex container.
//!
//! # Pipeline
//! 1. [`ConfigResolver`] turns a page id into a [`LayoutDescription`]
//! 2. [`ComponentLoader`] loads script and federated-module definitions
//! 3. [`LayoutRenderer`] groups components by placement area and builds DOM
//! 4. [`PageController`] sequences the above per navigation
//!
//! [`ComponentWrapper`] is the single-element variant used by static routes,
//! and [`Shell`] wires everything behind a [`Router`].
//!
//! # Example
//! ```rust,ignore
//! use mosaic_shell::{Shell, ShellConfig};
//!
//! let shell = Shell::new(ShellConfig::default(), transport)?;
//! smol::block_on(shell.navigate("/page/home"))?;
//! println!("{}", shell.html());
//! ```

mod error;
mod model;
mod config;
mod resolver;
mod loader;
mod render;
mod controller;
mod wrapper;
mod router;
mod native;
mod shell;

pub use error::{ShellError, ResolveError, LoadError, LoadFailure, ElementConfigurationError, ConfigError};
pub use model::{
    LayoutDescription, ComponentReference, LoadStrategy, ResourceKey, StyleMap, ElementConfig,
    LayoutError, INNER_LAYOUT_KEY, INNER_LAYOUT_STYLES_KEY, PLACEMENT_STYLE, DEFAULT_AREA,
};
pub use config::{ShellConfig, RouteConfig};
pub use resolver::{ConfigResolver, is_valid_page_id};
pub use loader::{ComponentLoader, LoadedResourceRegistry, LoadResult, ScriptLoader, ModuleLoader};
pub use render::{LayoutRenderer, CreatedNodeSet, AreaGroup, group_by_area, ERROR_CLASS, LOADING_CLASS};
pub use controller::{
    PageController, PageState, MISSING_PAGE_ID, CONFIG_NOT_FOUND, COMPONENTS_FAILED, LOADING_MESSAGE,
};
pub use wrapper::{ComponentWrapper, WrapperConfig, WrapperError};
pub use router::{Router, RouteMatch};
pub use native::{DocumentScriptLoader, LOADED_ATTR, ManifestModuleLoader, declared_custom_elements, script_element_id};
pub use shell::{Shell, OUTLET_ID};

use mosaic_dom::{DomOps, ElementDefinitions};
use std::cell::RefCell;
use std::rc::Rc;

/// DOM surface the shell renders into
pub trait HostDom: DomOps + ElementDefinitions {}

impl<T: DomOps + ElementDefinitions + ?Sized> HostDom for T {}

/// DOM shared between the controller, wrappers and load side effects
pub type SharedDom = Rc<RefCell<dyn HostDom>>;

/// Shell version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
