// Copyright 2025 the Croquis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The document seam and an in-memory implementation.

use core::fmt::Debug;

use croquis_tokens::BoxRect;
use hashbrown::HashMap;

use crate::style::ComputedStyle;

/// The kind of a document node.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// An element with a tag name, attributes and a computed style.
    Element,
    /// A text node.
    Text,
    /// A document fragment or shadow root.
    Fragment,
    /// Comments, processing instructions and anything else.
    Other,
}

/// Read-only access to a laid-out document.
///
/// Layout is never computed here; rects and computed styles are whatever the
/// host engine reported. All rects are in the same coordinate space, usually
/// the viewport.
pub trait Document {
    /// Handle to a node of this document.
    type Node: Copy + Eq + Debug;

    /// The node's kind.
    fn kind(&self, node: Self::Node) -> NodeKind;

    /// Lowercase tag name of an element.
    fn tag_name(&self, node: Self::Node) -> Option<&str>;

    /// An attribute of an element.
    fn attribute(&self, node: Self::Node, name: &str) -> Option<&str>;

    /// Character data of a text node.
    fn text(&self, node: Self::Node) -> Option<&str>;

    /// Parent node.
    fn parent(&self, node: Self::Node) -> Option<Self::Node>;

    /// First child node.
    fn first_child(&self, node: Self::Node) -> Option<Self::Node>;

    /// Next sibling node.
    fn next_sibling(&self, node: Self::Node) -> Option<Self::Node>;

    /// The element's border-box fragments, one per line for wrapped inlines.
    ///
    /// Elements that generate no box (`display: none`, `display: contents`)
    /// report none.
    fn client_rects(&self, node: Self::Node) -> Vec<BoxRect>;

    /// The element's computed style. `None` for non-elements.
    fn computed_style(&self, node: Self::Node) -> Option<&ComputedStyle>;
}

/// Handle to a node of a [`MemoryDocument`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    const fn idx(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug)]
struct NodeData {
    kind: NodeKind,
    tag: Option<String>,
    text: Option<String>,
    attributes: HashMap<String, String>,
    style: Option<ComputedStyle>,
    rects: Vec<BoxRect>,
    parent: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
    next_sibling: Option<NodeId>,
}

impl NodeData {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            tag: None,
            text: None,
            attributes: HashMap::new(),
            style: None,
            rects: Vec::new(),
            parent: None,
            first_child: None,
            last_child: None,
            next_sibling: None,
        }
    }
}

/// An arena-backed document snapshot.
///
/// Useful for tests and for documents captured elsewhere, e.g. serialized
/// out of a browser. Nodes are never removed; [`NodeId`]s stay valid for the
/// life of the document.
///
/// Builder methods panic when handed a [`NodeId`] from another document.
#[derive(Clone, Debug, Default)]
pub struct MemoryDocument {
    nodes: Vec<NodeData>,
}

impl MemoryDocument {
    /// An empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the document has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        self.nodes.push(data);
        id
    }

    /// Creates a detached element with an empty computed style.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let mut data = NodeData::new(NodeKind::Element);
        data.tag = Some(tag.to_ascii_lowercase());
        data.style = Some(ComputedStyle::new());
        self.push(data)
    }

    /// Creates a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        let mut data = NodeData::new(NodeKind::Text);
        data.text = Some(text.to_owned());
        self.push(data)
    }

    /// Creates a detached fragment.
    pub fn create_fragment(&mut self) -> NodeId {
        self.push(NodeData::new(NodeKind::Fragment))
    }

    /// Appends `child` as the last child of `parent`.
    ///
    /// `child` must be detached.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        let prev_last = self.nodes[parent.idx()].last_child;
        match prev_last {
            Some(last) => self.nodes[last.idx()].next_sibling = Some(child),
            None => self.nodes[parent.idx()].first_child = Some(child),
        }
        self.nodes[parent.idx()].last_child = Some(child);
        self.nodes[child.idx()].parent = Some(parent);
    }

    /// Sets an attribute on an element.
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        self.nodes[node.idx()]
            .attributes
            .insert(name.to_owned(), value.to_owned());
    }

    /// Replaces an element's computed style.
    pub fn set_style(&mut self, node: NodeId, style: ComputedStyle) {
        self.nodes[node.idx()].style = Some(style);
    }

    /// Mutable access to an element's computed style.
    pub fn style_mut(&mut self, node: NodeId) -> &mut ComputedStyle {
        self.nodes[node.idx()].style.get_or_insert_with(ComputedStyle::new)
    }

    /// Replaces a node's client rects.
    pub fn set_rects(&mut self, node: NodeId, rects: impl IntoIterator<Item = BoxRect>) {
        self.nodes[node.idx()].rects = rects.into_iter().collect();
    }

    /// Creates an element with a parsed style and rects and appends it.
    ///
    /// `style` uses the [`ComputedStyle::parse`] declaration syntax.
    pub fn append_element(
        &mut self,
        parent: Option<NodeId>,
        tag: &str,
        style: &str,
        rects: &[BoxRect],
    ) -> NodeId {
        let node = self.create_element(tag);
        self.set_style(node, ComputedStyle::parse(style));
        self.set_rects(node, rects.iter().copied());
        if let Some(parent) = parent {
            self.append_child(parent, node);
        }
        node
    }

    /// Creates a text node and appends it to `parent`.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        let node = self.create_text(text);
        self.append_child(parent, node);
        node
    }

    fn get(&self, node: NodeId) -> Option<&NodeData> {
        self.nodes.get(node.idx())
    }
}

impl Document for MemoryDocument {
    type Node = NodeId;

    fn kind(&self, node: NodeId) -> NodeKind {
        self.get(node).map_or(NodeKind::Other, |n| n.kind)
    }

    fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.get(node)?.tag.as_deref()
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.get(node)?.attributes.get(name).map(String::as_str)
    }

    fn text(&self, node: NodeId) -> Option<&str> {
        self.get(node)?.text.as_deref()
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.get(node)?.parent
    }

    fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.get(node)?.first_child
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.get(node)?.next_sibling
    }

    fn client_rects(&self, node: NodeId) -> Vec<BoxRect> {
        self.get(node).map(|n| n.rects.clone()).unwrap_or_default()
    }

    fn computed_style(&self, node: NodeId) -> Option<&ComputedStyle> {
        self.get(node)?.style.as_ref()
    }
}
