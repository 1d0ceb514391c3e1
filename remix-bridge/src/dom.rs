//! Document model for the rendered page.
//!
//! A small arena-backed node tree rooted at the `body` element. Nodes are
//! addressed by [`NodeId`]. Replacing a subtree frees its nodes and later
//! insertions reuse their slots, so an id held across an edit may come to
//! name a different node.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::markup::{self, Token};
use crate::protocol::Rect;
use crate::style::InlineStyle;

/// Handle to a node in a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in the arena.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An element node.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    tag: String,
    attributes: Vec<(String, String)>,
    rect: Option<Rect>,
}

impl Element {
    /// Create an element with no attributes.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            attributes: Vec::new(),
            rect: None,
        }
    }

    /// Lower-case local name.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Upper-case name as reported to the host.
    #[must_use]
    pub fn tag_name(&self) -> String {
        self.tag.to_ascii_uppercase()
    }

    /// Attributes in document order.
    #[must_use]
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// Value of an attribute.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Whether an attribute is present.
    #[must_use]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    /// Set an attribute, keeping its position if it already exists.
    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    /// Remove an attribute. Returns whether it was present.
    pub fn remove_attribute(&mut self, name: &str) -> bool {
        let before = self.attributes.len();
        self.attributes.retain(|(k, _)| k != name);
        self.attributes.len() != before
    }

    /// Parsed inline style.
    #[must_use]
    pub fn style(&self) -> InlineStyle {
        self.attribute("style").map(InlineStyle::parse).unwrap_or_default()
    }

    /// Replace the inline style; an empty style drops the attribute.
    pub fn set_style(&mut self, style: &InlineStyle) {
        if style.is_empty() {
            self.remove_attribute("style");
        } else {
            self.set_attribute("style", style.to_string());
        }
    }

    /// Layout rectangle supplied by the embedder.
    #[must_use]
    pub const fn rect(&self) -> Option<Rect> {
        self.rect
    }
}

/// Payload of a node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Element with attributes and children.
    Element(Element),
    /// Character data.
    Text(String),
    /// Comment body.
    Comment(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A parsed page body.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    free: Vec<NodeId>,
    root: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Element(Element::new("body")),
                parent: None,
                children: Vec::new(),
            }],
            free: Vec::new(),
            root: NodeId(0),
        }
    }
}

#[allow(clippy::len_without_is_empty)]
impl Document {
    /// Parse markup into a document.
    ///
    /// Accepts either a body fragment or a whole page. `html` and `body`
    /// tags are folded into the root and `head` content is dropped.
    #[must_use]
    pub fn parse(markup: &str) -> Self {
        let mut doc = Self::default();
        let root = doc.root;
        doc.build(root, markup);
        doc
    }

    /// The `body` element.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// Arena size, counting free slots waiting for reuse.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Node payload.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.nodes.get(id.0).map(|n| &n.kind)
    }

    /// Element payload, `None` for text, comments and unknown ids.
    #[must_use]
    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.kind(id) {
            Some(NodeKind::Element(element)) => Some(element),
            _ => None,
        }
    }

    /// Mutable element payload.
    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match self.nodes.get_mut(id.0).map(|n| &mut n.kind) {
            Some(NodeKind::Element(element)) => Some(element),
            _ => None,
        }
    }

    /// Parent node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|n| n.parent)
    }

    /// Child nodes in order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id.0).map_or(&[], |n| n.children.as_slice())
    }

    /// Whether `id` is still reachable from the root.
    #[must_use]
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == self.root {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// All attached nodes below `id` in document order, `id` excluded.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    /// Attached elements carrying `name`, in document order.
    #[must_use]
    pub fn elements_with_attribute(&self, name: &str) -> Vec<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|&id| self.element(id).is_some_and(|e| e.has_attribute(name)))
            .collect()
    }

    /// First attached element whose `name` attribute equals `value`.
    #[must_use]
    pub fn find_by_attribute(&self, name: &str, value: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|&id| self.element(id).and_then(|e| e.attribute(name)) == Some(value))
    }

    /// Follow element-child indices from the root.
    ///
    /// `[1, 0]` is the first element child of the second element child of
    /// `body`. The empty path is the root.
    #[must_use]
    pub fn element_at_path(&self, path: &[usize]) -> Option<NodeId> {
        let mut current = self.root;
        for &index in path {
            current = self
                .children(current)
                .iter()
                .copied()
                .filter(|&c| self.element(c).is_some())
                .nth(index)?;
        }
        Some(current)
    }

    /// Replace the children of `id` with parsed `markup`.
    ///
    /// The old children and everything below them are freed. Returns false
    /// when `id` is not an element.
    pub fn set_inner_markup(&mut self, id: NodeId, markup: &str) -> bool {
        if self.element(id).is_none() {
            return false;
        }
        let old = std::mem::take(&mut self.nodes[id.0].children);
        for child in old {
            self.free_subtree(child);
        }
        self.build(id, markup);
        true
    }

    /// Concatenated text of `id` and its descendants.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let Some(NodeKind::Text(text)) = self.kind(id) {
            out.push_str(text);
        }
        for node in self.descendants(id) {
            if let Some(NodeKind::Text(text)) = self.kind(node) {
                out.push_str(text);
            }
        }
        out
    }

    /// Serialized children of `id`.
    #[must_use]
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(id) {
            self.write_node(child, &mut out);
        }
        out
    }

    /// Serialized `id` including its own tag.
    #[must_use]
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(id, &mut out);
        out
    }

    /// Serialized content of the `body` element.
    #[must_use]
    pub fn body_html(&self) -> String {
        self.inner_html(self.root)
    }

    /// Record the layout rectangle of an element.
    pub fn set_rect(&mut self, id: NodeId, rect: Rect) -> bool {
        match self.element_mut(id) {
            Some(element) => {
                element.rect = Some(rect);
                true
            }
            None => false,
        }
    }

    /// Layout rectangle of an element, zero when never supplied.
    #[must_use]
    pub fn rect(&self, id: NodeId) -> Rect {
        self.element(id).and_then(Element::rect).unwrap_or_default()
    }

    fn push(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let node = Node {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        };
        let id = match self.free.pop() {
            Some(id) => {
                self.nodes[id.0] = node;
                id
            }
            None => {
                self.nodes.push(node);
                NodeId(self.nodes.len() - 1)
            }
        };
        self.nodes[parent.0].children.push(id);
        id
    }

    fn free_subtree(&mut self, top: NodeId) {
        let mut stack = vec![top];
        while let Some(id) = stack.pop() {
            let node = &mut self.nodes[id.0];
            stack.append(&mut node.children);
            node.parent = None;
            node.kind = NodeKind::Text(String::new());
            self.free.push(id);
        }
    }

    /// Append the nodes of `markup` under `parent`, closing anything left open.
    fn build(&mut self, parent: NodeId, markup: &str) {
        let mut open = vec![parent];
        let mut in_head = false;

        for token in markup::tokenize(markup) {
            let top = open.last().copied().unwrap_or(parent);
            match token {
                Token::StartTag { name, .. } if name == "head" => in_head = true,
                Token::EndTag(name) if name == "head" => in_head = false,
                _ if in_head => {}
                Token::StartTag {
                    name, attributes, ..
                } if name == "html" || name == "body" => {
                    if name == "body" && parent == self.root {
                        if let Some(root) = self.element_mut(parent) {
                            for (k, v) in attributes {
                                if !root.has_attribute(&k) {
                                    root.attributes.push((k, v));
                                }
                            }
                        }
                    }
                }
                Token::EndTag(name) if name == "html" || name == "body" => {}
                Token::StartTag {
                    name,
                    attributes,
                    self_closing,
                } => {
                    let void = markup::is_void(&name);
                    let element = Element {
                        tag: name,
                        attributes,
                        rect: None,
                    };
                    let id = self.push(top, NodeKind::Element(element));
                    if !void && !self_closing {
                        open.push(id);
                    }
                }
                Token::EndTag(name) => {
                    let matching = open
                        .iter()
                        .rposition(|&id| self.element(id).is_some_and(|e| e.tag == name));
                    match matching {
                        // never pop the element we are building into
                        Some(0) | None => {
                            tracing::debug!("Ignoring stray end tag </{name}>");
                        }
                        Some(index) => open.truncate(index),
                    }
                }
                Token::Text(text) | Token::RawText(text) => {
                    self.push(top, NodeKind::Text(text));
                }
                Token::Comment(text) => {
                    self.push(top, NodeKind::Comment(text));
                }
            }
        }
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        // explicit stack so nesting depth is bounded by the heap
        let mut stack = vec![Step::Open(id)];
        while let Some(step) = stack.pop() {
            let id = match step {
                Step::Open(id) => id,
                Step::Close(id) => {
                    if let Some(element) = self.element(id) {
                        out.push_str("</");
                        out.push_str(&element.tag);
                        out.push('>');
                    }
                    continue;
                }
            };
            match self.kind(id) {
                Some(NodeKind::Element(element)) => {
                    out.push('<');
                    out.push_str(&element.tag);
                    for (k, v) in &element.attributes {
                        let _ = write!(out, " {k}=\"{}\"", markup::escape_attribute(v));
                    }
                    out.push('>');
                    if markup::is_void(&element.tag) {
                        continue;
                    }
                    stack.push(Step::Close(id));
                    stack.extend(self.children(id).iter().rev().map(|&c| Step::Open(c)));
                }
                Some(NodeKind::Text(text)) => {
                    let raw = self
                        .parent(id)
                        .and_then(|p| self.element(p))
                        .is_some_and(|e| markup::is_raw_text(&e.tag));
                    if raw {
                        out.push_str(text);
                    } else {
                        out.push_str(&markup::escape_text(text));
                    }
                }
                Some(NodeKind::Comment(text)) => {
                    out.push_str("<!--");
                    out.push_str(text);
                    out.push_str("-->");
                }
                None => {}
            }
        }
    }
}

enum Step {
    Open(NodeId),
    Close(NodeId),
}
