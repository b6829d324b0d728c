//! DOM Tree (arena-based allocation)

use crate::{DomError, DomResult, Node, NodeId};

/// Arena-based DOM tree
///
/// Index 0 is always the document node.
#[derive(Debug)]
pub struct DomTree {
    nodes: Vec<Node>,
}

impl DomTree {
    /// Create a tree holding only the document node
    pub fn new() -> Self {
        Self { nodes: vec![Node::document()] }
    }

    /// Document node
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Number of nodes ever allocated (attached or not)
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the document node exists from construction
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(Node::element(tag))
    }

    /// Allocate a detached text node
    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.push(Node::text(content.to_string()))
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    fn node(&self, id: NodeId) -> DomResult<&Node> {
        self.get(id).ok_or(DomError::NotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> DomResult<&mut Node> {
        self.get_mut(id).ok_or(DomError::NotFound(id))
    }

    /// Parent of a node, if attached
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).map(|n| n.parent).filter(|p| p.is_valid())
    }

    /// Inclusive descendant check, same as `Node.contains`
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = node;
        while current.is_valid() {
            if current == ancestor {
                return true;
            }
            current = match self.get(current) {
                Some(n) => n.parent,
                None => return false,
            };
        }
        false
    }

    /// Append `child` as the last child of `parent`, detaching it first
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        self.node(parent)?;
        self.node(child)?;
        if child == NodeId::ROOT || self.contains(child, parent) {
            return Err(DomError::HierarchyRequest);
        }
        if self.node(parent)?.as_text().is_some() {
            return Err(DomError::HierarchyRequest);
        }

        self.detach(child);

        let last = self.node(parent)?.last_child;
        {
            let node = self.node_mut(child)?;
            node.parent = parent;
            node.prev_sibling = last;
        }
        if last.is_valid() {
            self.node_mut(last)?.next_sibling = child;
        } else {
            self.node_mut(parent)?.first_child = child;
        }
        self.node_mut(parent)?.last_child = child;
        Ok(())
    }

    /// Remove `child` from `parent`
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        if self.node(child)?.parent != parent {
            return Err(DomError::NotAChild);
        }
        self.detach(child);
        Ok(())
    }

    /// Remove every child of `parent`
    pub fn clear_children(&mut self, parent: NodeId) -> DomResult<()> {
        let children: Vec<NodeId> = self.child_ids(parent).collect();
        for child in children {
            self.detach(child);
        }
        Ok(())
    }

    fn detach(&mut self, id: NodeId) {
        let (parent, prev, next) = match self.get(id) {
            Some(n) => (n.parent, n.prev_sibling, n.next_sibling),
            None => return,
        };
        if !parent.is_valid() {
            return;
        }

        if prev.is_valid() {
            self.nodes[prev.index()].next_sibling = next;
        } else {
            self.nodes[parent.index()].first_child = next;
        }
        if next.is_valid() {
            self.nodes[next.index()].prev_sibling = prev;
        } else {
            self.nodes[parent.index()].last_child = prev;
        }

        let node = &mut self.nodes[id.index()];
        node.parent = NodeId::NONE;
        node.prev_sibling = NodeId::NONE;
        node.next_sibling = NodeId::NONE;
    }

    /// Iterate direct children in document order
    pub fn child_ids(&self, parent: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let first = self.get(parent).map(|n| n.first_child).unwrap_or(NodeId::NONE);
        std::iter::successors(Some(first).filter(|id| id.is_valid()), move |id| {
            self.get(*id).map(|n| n.next_sibling).filter(|next| next.is_valid())
        })
    }

    /// Iterate direct children with their nodes
    pub fn children(&self, parent: NodeId) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.child_ids(parent).filter_map(move |id| self.get(id).map(|n| (id, n)))
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        for (child_id, child) in self.children(id) {
            match child.as_text() {
                Some(text) => out.push_str(text),
                None => self.collect_text(child_id, out),
            }
        }
    }

    /// Depth-first search of the subtree below `start` for elements with `tag`
    pub fn elements_by_tag(&self, start: NodeId, tag: &str) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack: Vec<NodeId> = self.child_ids(start).collect();
        stack.reverse();
        while let Some(id) = stack.pop() {
            if let Some(elem) = self.get(id).and_then(Node::as_element) {
                if elem.tag.eq_ignore_ascii_case(tag) {
                    found.push(id);
                }
            }
            let mut kids: Vec<NodeId> = self.child_ids(id).collect();
            kids.reverse();
            stack.extend(kids);
        }
        found
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_order() {
        let mut tree = DomTree::new();
        let a = tree.create_element("a");
        let b = tree.create_element("b");
        let c = tree.create_element("c");
        tree.append_child(tree.root(), a).unwrap();
        tree.append_child(tree.root(), b).unwrap();
        tree.append_child(tree.root(), c).unwrap();

        let ids: Vec<_> = tree.child_ids(tree.root()).collect();
        assert_eq!(ids, vec![a, b, c]);
    }

    #[test]
    fn test_remove_middle_child() {
        let mut tree = DomTree::new();
        let root = tree.root();
        let ids: Vec<_> = (0..3).map(|_| tree.create_element("div")).collect();
        for id in &ids {
            tree.append_child(root, *id).unwrap();
        }

        tree.remove_child(root, ids[1]).unwrap();

        let remaining: Vec<_> = tree.child_ids(root).collect();
        assert_eq!(remaining, vec![ids[0], ids[2]]);
        assert_eq!(tree.parent(ids[1]), None);
    }

    #[test]
    fn test_remove_non_child_fails() {
        let mut tree = DomTree::new();
        let a = tree.create_element("div");
        assert_eq!(tree.remove_child(tree.root(), a), Err(DomError::NotAChild));
    }

    #[test]
    fn test_reparent_moves_node() {
        let mut tree = DomTree::new();
        let root = tree.root();
        let outer = tree.create_element("div");
        let inner = tree.create_element("span");
        tree.append_child(root, outer).unwrap();
        tree.append_child(root, inner).unwrap();
        tree.append_child(outer, inner).unwrap();

        assert_eq!(tree.child_ids(root).collect::<Vec<_>>(), vec![outer]);
        assert_eq!(tree.parent(inner), Some(outer));
    }

    #[test]
    fn test_cannot_append_ancestor() {
        let mut tree = DomTree::new();
        let outer = tree.create_element("div");
        let inner = tree.create_element("div");
        tree.append_child(tree.root(), outer).unwrap();
        tree.append_child(outer, inner).unwrap();
        assert_eq!(tree.append_child(inner, outer), Err(DomError::HierarchyRequest));
    }

    #[test]
    fn test_contains_is_inclusive() {
        let mut tree = DomTree::new();
        let outer = tree.create_element("div");
        let inner = tree.create_element("div");
        tree.append_child(tree.root(), outer).unwrap();
        tree.append_child(outer, inner).unwrap();

        assert!(tree.contains(outer, outer));
        assert!(tree.contains(tree.root(), inner));
        assert!(!tree.contains(inner, outer));
    }

    #[test]
    fn test_elements_by_tag_document_order() {
        let mut tree = DomTree::new();
        let root = tree.root();
        let wrap = tree.create_element("div");
        let x1 = tree.create_element("x-item");
        let x2 = tree.create_element("x-item");
        tree.append_child(root, wrap).unwrap();
        tree.append_child(wrap, x1).unwrap();
        tree.append_child(root, x2).unwrap();

        assert_eq!(tree.elements_by_tag(root, "x-item"), vec![x1, x2]);
    }
}
