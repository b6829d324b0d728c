//! Mosaic DOM - Document Object Model
//!
//! Arena-based DOM tree the shell composes pages into. Nodes are addressed
//! by [`NodeId`] and never freed; removing a node only detaches it.

mod node;
mod tree;
mod document;
mod operations;
mod custom_elements;
mod serialize;

pub use node::{Node, NodeData, ElementData, Attribute};
pub use tree::DomTree;
pub use document::Document;
pub use operations::{DomOps, DomError, DomResult, css_property_name};
pub use custom_elements::{
    CustomElementRegistry, CustomElementDefinition, CustomElementOptions,
    CustomElementError, ElementDefinitions, is_known_html_tag,
};
pub use serialize::outer_html;

/// Value assigned to an element property
pub type PropertyValue = serde_json::Value;

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root (document) node ID
    pub const ROOT: NodeId = NodeId(0);
    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Whether this ID points at a node
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// Raw arena index
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
