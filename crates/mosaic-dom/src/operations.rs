//! DOM Node Operations
//!
//! The mutation surface a renderer needs: create, append, remove, style,
//! property, attribute. Kept as a trait so the shell can render into any
//! host that provides these primitives.

use crate::{NodeId, PropertyValue};

/// Result type for DOM operations
pub type DomResult<T> = Result<T, DomError>;

/// DOM operation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// Node not found
    #[error("node {0} not found")]
    NotFound(NodeId),

    /// Hierarchy error (e.g., inserting an ancestor)
    #[error("hierarchy request error")]
    HierarchyRequest,

    /// Node is not a child of the given parent
    #[error("node is not a child")]
    NotAChild,

    /// Operation needs an element but got another node type
    #[error("node {0} is not an element")]
    NotAnElement(NodeId),

    /// Tag or attribute name is not a valid name
    #[error("invalid character in name '{0}'")]
    InvalidCharacter(String),

    /// Property assignment refused by the element
    #[error("property '{name}' cannot be set on <{tag}>")]
    PropertyRejected { tag: String, name: String },
}

/// Node operations trait
pub trait DomOps {
    /// Create a detached element
    fn create_element(&mut self, tag: &str) -> DomResult<NodeId>;

    /// Append a child node, moving it if already attached
    fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()>;

    /// Remove a child node
    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()>;

    /// Inclusive descendant check
    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool;

    /// Set one inline style declaration
    fn set_style(&mut self, node: NodeId, name: &str, value: &str) -> DomResult<()>;

    /// Assign an IDL property; fails with [`DomError::PropertyRejected`]
    /// when the element refuses it
    fn set_property(&mut self, node: NodeId, name: &str, value: &PropertyValue) -> DomResult<()>;

    /// Set a content attribute
    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> DomResult<()>;

    /// Add a class to the class list
    fn add_class(&mut self, node: NodeId, class: &str) -> DomResult<()>;

    /// Replace all children with one text node
    fn set_text_content(&mut self, node: NodeId, text: &str) -> DomResult<()>;
}

/// Validate an element or attribute name
pub(crate) fn validate_name(name: &str) -> DomResult<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            first.is_ascii_alphabetic()
                && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':'))
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(DomError::InvalidCharacter(name.to_string()))
    }
}

/// Convert a camelCase style property to its kebab-case CSS name
///
/// Names that already contain a dash, or custom properties, pass through.
pub fn css_property_name(name: &str) -> String {
    if name.starts_with("--") {
        return name.to_string();
    }
    if name.contains('-') {
        return name.to_ascii_lowercase();
    }
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
