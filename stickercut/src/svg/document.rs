use std::fmt::{Display, Formatter};

use crate::{CutlineError, Result};

/// Index of a node in an [`SvgTree`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Element of an [`SvgTree`]: tag name, attributes in document order and explicit links.
#[derive(Clone, Debug)]
pub struct SvgNode {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl SvgNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: vec![],
            parent: None,
            children: vec![],
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Attribute parsed as a number, `None` when absent or malformed
    pub fn attr_f64(&self, name: &str) -> Option<f64> {
        self.attr(name).and_then(|v| parse_length(v))
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let pos = self.attributes.iter().position(|(k, _)| k == name)?;
        Some(self.attributes.remove(pos).1)
    }
}

/// Owned element tree stored as an arena.
///
/// Nodes are never deallocated: detaching a node only unlinks it from its parent,
/// so every [`NodeId`] handed out stays valid for the lifetime of the tree.
#[derive(Clone, Debug)]
pub struct SvgTree {
    nodes: Vec<SvgNode>,
    root: NodeId,
}

impl SvgTree {
    /// Parses `text` and keeps the subtree of the first `<svg>` element.
    pub fn parse(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Err(CutlineError::Parse("empty document".into()));
        }
        let doc = roxmltree::Document::parse(text).map_err(|e| CutlineError::Parse(e.to_string()))?;
        let svg_root = doc
            .descendants()
            .find(|n| n.is_element() && n.tag_name().name() == "svg")
            .ok_or_else(|| CutlineError::Parse("no <svg> root element".into()))?;

        let mut tree = SvgTree {
            nodes: vec![],
            root: NodeId(0),
        };
        let mut stack = vec![(svg_root, None)];
        while let Some((xml_node, parent)) = stack.pop() {
            let mut node = SvgNode::new(xml_node.tag_name().name());
            node.attributes = xml_node
                .attributes()
                .map(|a| (a.name().to_string(), a.value().to_string()))
                .collect();
            let id = tree.push(node);
            if let Some(parent) = parent {
                tree.append_child(parent, id);
            }
            //reversed so children are visited, and thus linked, in document order
            let children = xml_node.children().filter(|c| c.is_element()).collect::<Vec<_>>();
            stack.extend(children.into_iter().rev().map(|c| (c, Some(id))));
        }
        Ok(tree)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &SvgNode {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut SvgNode {
        &mut self.nodes[id.0]
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Adds a detached node to the arena
    pub fn push(&mut self, node: SvgNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Links `new` into the parent of `sibling`, directly after it
    pub fn insert_after(&mut self, sibling: NodeId, new: NodeId) {
        let Some(parent) = self.nodes[sibling.0].parent else {
            return;
        };
        let siblings = &mut self.nodes[parent.0].children;
        let pos = siblings.iter().position(|c| *c == sibling).map_or(siblings.len(), |p| p + 1);
        siblings.insert(pos, new);
        self.nodes[new.0].parent = Some(parent);
    }

    /// Unlinks `id` (and with it, its subtree) from its parent
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != id);
        }
    }

    /// Replaces `id` in its parent's child list by its own children, preserving their order
    pub fn unwrap_node(&mut self, id: NodeId) {
        let Some(parent) = self.nodes[id.0].parent else {
            return;
        };
        let children = std::mem::take(&mut self.nodes[id.0].children);
        for c in children.iter() {
            self.nodes[c.0].parent = Some(parent);
        }
        let siblings = &mut self.nodes[parent.0].children;
        if let Some(pos) = siblings.iter().position(|c| *c == id) {
            siblings.splice(pos..=pos, children);
        }
        self.nodes[id.0].parent = None;
    }

    /// Attached nodes in document (pre)order, starting at the root
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut order = vec![];
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.children(id).iter().rev());
        }
        order
    }

    /// Attached nodes, children before their parent
    pub fn postorder(&self) -> Vec<NodeId> {
        let mut order = vec![];
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.children(id).iter());
        }
        order.reverse();
        order
    }
}

/// Parses a numeric attribute, ignoring a trailing unit such as `px`
pub fn parse_length(value: &str) -> Option<f64> {
    let value = value.trim();
    let end = value
        .char_indices()
        .find(|(_, c)| !(c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E')))
        .map_or(value.len(), |(i, _)| i);
    value[..end].parse::<f64>().ok()
}
