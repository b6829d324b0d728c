//! Document - High-level document API

use crate::operations::validate_name;
use crate::{
    css_property_name, is_known_html_tag, CustomElementRegistry, DomError, DomOps, DomResult,
    DomTree, ElementData, ElementDefinitions, NodeId, PropertyValue,
};

/// Properties every element exposes as read-only
const READONLY_PROPERTIES: &[&str] = &[
    "attributes", "childElementCount", "childNodes", "children", "classList",
    "firstChild", "lastChild", "localName", "nodeName", "nodeType",
    "ownerDocument", "parentElement", "parentNode", "shadowRoot", "tagName",
];

/// HTML Document
#[derive(Debug)]
pub struct Document {
    /// The DOM tree
    pub tree: DomTree,
    /// Custom element definitions
    pub custom_elements: CustomElementRegistry,
    /// Document URL
    url: String,
    html_element: NodeId,
    head_element: NodeId,
    body_element: NodeId,
}

impl Document {
    /// Create a new document with `<html><head></head><body></body></html>`
    pub fn new(url: &str) -> Self {
        let mut tree = DomTree::new();

        let html = tree.create_element("html");
        let head = tree.create_element("head");
        let body = tree.create_element("body");

        // Freshly created nodes under a fresh root cannot violate hierarchy rules
        let _ = tree.append_child(tree.root(), html);
        let _ = tree.append_child(html, head);
        let _ = tree.append_child(html, body);

        Self {
            tree,
            custom_elements: CustomElementRegistry::new(),
            url: url.to_string(),
            html_element: html,
            head_element: head,
            body_element: body,
        }
    }

    /// Get document URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get <html> element
    pub fn document_element(&self) -> NodeId {
        self.html_element
    }

    /// Get <head> element
    pub fn head(&self) -> NodeId {
        self.head_element
    }

    /// Get <body> element
    pub fn body(&self) -> NodeId {
        self.body_element
    }

    /// Get element by its `id` attribute
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        let mut stack = vec![self.tree.root()];
        while let Some(current) = stack.pop() {
            if let Some(elem) = self.tree.get(current).and_then(|n| n.as_element()) {
                if elem.get_attr("id") == Some(id) {
                    return Some(current);
                }
            }
            let mut kids: Vec<NodeId> = self.tree.child_ids(current).collect();
            kids.reverse();
            stack.extend(kids);
        }
        None
    }

    /// Element data for a node
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.tree.get(id).and_then(|n| n.as_element())
    }

    /// Direct children of a node
    pub fn child_ids(&self, id: NodeId) -> Vec<NodeId> {
        self.tree.child_ids(id).collect()
    }

    /// Concatenated text content below a node
    pub fn text_content(&self, id: NodeId) -> String {
        self.tree.text_content(id)
    }

    /// Access the DOM tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Access the DOM tree mutably
    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }

    fn element_mut(&mut self, id: NodeId) -> DomResult<&mut ElementData> {
        let node = self.tree.get_mut(id).ok_or(DomError::NotFound(id))?;
        node.as_element_mut().ok_or(DomError::NotAnElement(id))
    }

    fn property_is_readonly(&self, tag: &str, name: &str) -> bool {
        READONLY_PROPERTIES.contains(&name)
            || self.custom_elements
                .get(tag)
                .is_some_and(|def| def.readonly_properties.iter().any(|p| p == name))
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("about:blank")
    }
}

impl DomOps for Document {
    fn create_element(&mut self, tag: &str) -> DomResult<NodeId> {
        validate_name(tag)?;
        Ok(self.tree.create_element(tag))
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        self.tree.append_child(parent, child)
    }

    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        self.tree.remove_child(parent, child)
    }

    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.tree.contains(ancestor, node)
    }

    fn set_style(&mut self, node: NodeId, name: &str, value: &str) -> DomResult<()> {
        let name = css_property_name(name.trim());
        if name.is_empty() {
            return Err(DomError::InvalidCharacter(name));
        }
        self.element_mut(node)?.set_style(name, value.trim().to_string());
        Ok(())
    }

    fn set_property(&mut self, node: NodeId, name: &str, value: &PropertyValue) -> DomResult<()> {
        let tag = self.element_mut(node)?.tag.clone();
        if self.property_is_readonly(&tag, name) {
            return Err(DomError::PropertyRejected { tag, name: name.to_string() });
        }

        match name {
            "textContent" => {
                let text = match value {
                    PropertyValue::String(s) => s.clone(),
                    PropertyValue::Null => String::new(),
                    other => other.to_string(),
                };
                self.set_text_content(node, &text)
            }
            "id" => {
                let id = value.as_str().map(str::to_string).unwrap_or_else(|| value.to_string());
                self.element_mut(node)?.set_attr("id", &id);
                Ok(())
            }
            "className" => {
                let classes = value.as_str().unwrap_or_default();
                let elem = self.element_mut(node)?;
                elem.classes = classes.split_whitespace().map(str::to_string).collect();
                Ok(())
            }
            _ => {
                self.element_mut(node)?.set_property(name, value.clone());
                Ok(())
            }
        }
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> DomResult<()> {
        validate_name(name)?;
        let elem = self.element_mut(node)?;
        if name.eq_ignore_ascii_case("class") {
            elem.classes = value.split_whitespace().map(str::to_string).collect();
        } else {
            elem.set_attr(&name.to_ascii_lowercase(), value);
        }
        Ok(())
    }

    fn add_class(&mut self, node: NodeId, class: &str) -> DomResult<()> {
        let elem = self.element_mut(node)?;
        if !elem.has_class(class) {
            elem.classes.push(class.to_string());
        }
        Ok(())
    }

    fn set_text_content(&mut self, node: NodeId, text: &str) -> DomResult<()> {
        self.element_mut(node)?;
        self.tree.clear_children(node)?;
        if !text.is_empty() {
            let text_node = self.tree.create_text(text);
            self.tree.append_child(node, text_node)?;
        }
        Ok(())
    }
}

impl ElementDefinitions for Document {
    fn is_defined(&self, tag: &str) -> bool {
        self.custom_elements.is_defined(tag) || is_known_html_tag(tag)
    }
}
