//! HTML serialization
//!
//! Produces markup for inspection and snapshots. IDL properties are not part
//! of markup and are therefore not emitted.

use crate::{DomTree, NodeData, NodeId};
use std::fmt::Write;

const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input", "link", "meta", "source"];

/// Serialize a node and its subtree
pub fn outer_html(tree: &DomTree, id: NodeId) -> String {
    let mut out = String::new();
    write_node(tree, id, &mut out);
    out
}

fn write_node(tree: &DomTree, id: NodeId, out: &mut String) {
    let Some(node) = tree.get(id) else { return };
    match &node.data {
        NodeData::Document => {
            for child in tree.child_ids(id) {
                write_node(tree, child, out);
            }
        }
        NodeData::Text(text) => out.push_str(&escape(text, false)),
        NodeData::Element(elem) => {
            out.push('<');
            out.push_str(&elem.tag);
            for attr in &elem.attrs {
                let _ = write!(out, " {}=\"{}\"", attr.name, escape(&attr.value, true));
            }
            if !elem.classes.is_empty() {
                let _ = write!(out, " class=\"{}\"", escape(&elem.classes.join(" "), true));
            }
            if !elem.styles.is_empty() {
                let style = elem.styles.iter()
                    .map(|(name, value)| format!("{name}: {value}"))
                    .collect::<Vec<_>>()
                    .join("; ");
                let _ = write!(out, " style=\"{}\"", escape(&style, true));
            }
            out.push('>');
            if VOID_ELEMENTS.contains(&elem.tag.as_str()) {
                return;
            }
            for child in tree.child_ids(id) {
                write_node(tree, child, out);
            }
            let _ = write!(out, "</{}>", elem.tag);
        }
    }
}

fn escape(s: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Document, DomOps};

    #[test]
    fn test_serialize_element() {
        let mut doc = Document::default();
        let div = doc.create_element("div").unwrap();
        doc.set_style(div, "display", "grid").unwrap();
        doc.add_class(div, "error-feedback").unwrap();
        doc.set_attribute(div, "data-x", "a\"b").unwrap();
        doc.set_text_content(div, "1 < 2").unwrap();

        assert_eq!(
            outer_html(doc.tree(), div),
            r#"<div data-x="a&quot;b" class="error-feedback" style="display: grid">1 &lt; 2</div>"#
        );
    }

    #[test]
    fn test_serialize_document() {
        let doc = Document::default();
        assert_eq!(
            outer_html(doc.tree(), doc.tree().root()),
            "<html><head></head><body></body></html>"
        );
    }
}
