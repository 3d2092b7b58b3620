//! In-memory document tree.
//!
//! A small element tree with attributes, inline styles and a click listener
//! registry. It supports the attribute equality selectors the bridge emits
//! and can simulate clicks and inject faults.
//!
//! # Example
//!
//! ```
//! use content_bridge::dom::{Document, MemoryDocument};
//!
//! let doc = MemoryDocument::new();
//! let button = doc.append_element(doc.body(), "button", &[("data-id", "b1")]);
//! assert_eq!(doc.query_selector(r#"[data-id="b1"]"#).unwrap(), Some(button));
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::collections::VecDeque;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::error::{Error, Result};
use crate::identifiers::{ListenerId, NodeId};

use super::selector::AttributeSelector;
use super::style::ScrollOptions;
use super::{ClickEvent, Document};

// ============================================================================
// Constants
// ============================================================================

/// Most recent scroll calls kept; older ones are discarded.
pub const MAX_RECORDED_SCROLLS: usize = 64;

// ============================================================================
// Types
// ============================================================================

/// One element of the tree.
#[derive(Debug, Default)]
struct Node {
    tag: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attributes: FxHashMap<String, String>,
    style: FxHashMap<String, String>,
}

/// Switches that make document calls fail.
#[derive(Debug, Default, Clone, Copy)]
struct Faults {
    listener_attach: bool,
    scroll: bool,
    style: bool,
}

/// Mutable tree state.
#[derive(Debug, Default)]
struct Tree {
    nodes: Vec<Node>,
    /// Registered listeners in registration order, with their capture flag.
    listeners: Vec<(ListenerId, bool)>,
    scrolls: VecDeque<(NodeId, ScrollOptions)>,
    faults: Faults,
}

impl Tree {
    fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes
            .get(id.as_u64() as usize)
            .ok_or_else(|| Error::internal(format!("unknown node: {id}")))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes
            .get_mut(id.as_u64() as usize)
            .ok_or_else(|| Error::internal(format!("unknown node: {id}")))
    }

    /// Returns `true` if `id` is reachable from the root.
    fn is_connected(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            if node_id == MemoryDocument::ROOT {
                return true;
            }
            current = self.nodes.get(node_id.as_u64() as usize).and_then(|n| n.parent);
        }
        false
    }

    fn matches(&self, id: NodeId, selector: &AttributeSelector) -> bool {
        self.nodes
            .get(id.as_u64() as usize)
            .and_then(|n| n.attributes.get(&selector.name))
            .is_some_and(|v| *v == selector.value)
    }
}

// ============================================================================
// MemoryDocument
// ============================================================================

/// In-memory [`Document`] implementation.
#[derive(Debug)]
pub struct MemoryDocument {
    tree: Mutex<Tree>,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    /// The `<html>` root node.
    pub const ROOT: NodeId = NodeId::new(0);

    /// The `<body>` node.
    pub const BODY: NodeId = NodeId::new(1);

    /// Creates a document containing `<html><body></body></html>`.
    #[must_use]
    pub fn new() -> Self {
        let root = Node {
            tag: "html".to_string(),
            children: vec![Self::BODY],
            ..Default::default()
        };
        let body = Node {
            tag: "body".to_string(),
            parent: Some(Self::ROOT),
            ..Default::default()
        };

        Self {
            tree: Mutex::new(Tree {
                nodes: vec![root, body],
                ..Default::default()
            }),
        }
    }

    /// Returns the `<body>` node.
    #[inline]
    #[must_use]
    pub fn body(&self) -> NodeId {
        Self::BODY
    }

    /// Appends a new element under `parent`.
    ///
    /// # Panics
    ///
    /// Panics if `parent` was not created by this document.
    pub fn append_element(&self, parent: NodeId, tag: &str, attributes: &[(&str, &str)]) -> NodeId {
        let mut tree = self.tree.lock();
        let id = NodeId::new(tree.nodes.len() as u64);

        tree.nodes.push(Node {
            tag: tag.to_string(),
            parent: Some(parent),
            attributes: attributes
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            ..Default::default()
        });
        tree.node_mut(parent)
            .expect("parent belongs to this document")
            .children
            .push(id);

        id
    }

    /// Sets an attribute on a node.
    pub fn set_attribute(&self, node: NodeId, name: &str, value: &str) -> Result<()> {
        let mut tree = self.tree.lock();
        tree.node_mut(node)?
            .attributes
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    /// Returns the element's tag name.
    #[must_use]
    pub fn tag(&self, node: NodeId) -> Option<String> {
        self.tree.lock().node(node).ok().map(|n| n.tag.clone())
    }

    /// Detaches `node` (and its subtree) from the document.
    ///
    /// The handle stays valid, but selectors no longer find it.
    pub fn remove(&self, node: NodeId) -> Result<()> {
        let mut tree = self.tree.lock();
        let parent = tree.node_mut(node)?.parent.take();
        if let Some(parent) = parent {
            tree.node_mut(parent)?.children.retain(|c| *c != node);
        }
        Ok(())
    }

    /// Returns an inline style property, or `""` when unset.
    #[must_use]
    pub fn style(&self, node: NodeId, property: &str) -> String {
        self.tree
            .lock()
            .node(node)
            .ok()
            .and_then(|n| n.style.get(property).cloned())
            .unwrap_or_default()
    }

    /// Returns `true` if the node has any inline style set.
    #[must_use]
    pub fn has_inline_style(&self, node: NodeId) -> bool {
        self.tree
            .lock()
            .node(node)
            .is_ok_and(|n| !n.style.is_empty())
    }

    /// Returns every connected node that has `property` set.
    #[must_use]
    pub fn nodes_with_style(&self, property: &str) -> Vec<NodeId> {
        let tree = self.tree.lock();
        (0..tree.nodes.len() as u64)
            .map(NodeId::new)
            .filter(|id| tree.is_connected(*id))
            .filter(|id| tree.nodes[id.as_u64() as usize].style.contains_key(property))
            .collect()
    }

    /// Returns the number of registered click listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.tree.lock().listeners.len()
    }

    /// Returns `true` if `listener` is registered.
    #[must_use]
    pub fn has_listener(&self, listener: ListenerId) -> bool {
        self.tree.lock().listeners.iter().any(|(id, _)| *id == listener)
    }

    /// Returns the recorded scroll-into-view calls, oldest first.
    ///
    /// At most [`MAX_RECORDED_SCROLLS`] are retained.
    #[must_use]
    pub fn scrolls(&self) -> Vec<(NodeId, ScrollOptions)> {
        self.tree.lock().scrolls.iter().copied().collect()
    }

    /// Drains the recorded scroll calls.
    pub fn take_scrolls(&self) -> Vec<(NodeId, ScrollOptions)> {
        self.tree.lock().scrolls.drain(..).collect()
    }

    /// Simulates a user click on `target`.
    ///
    /// Returns one event per registered listener, capture-phase listeners
    /// first, in registration order. Disconnected targets produce nothing.
    #[must_use]
    pub fn click(&self, target: NodeId) -> Vec<ClickEvent> {
        let tree = self.tree.lock();
        if !tree.is_connected(target) {
            return Vec::new();
        }

        let capture = tree.listeners.iter().filter(|(_, c)| *c);
        let bubble = tree.listeners.iter().filter(|(_, c)| !*c);

        capture
            .chain(bubble)
            .map(|(listener, _)| ClickEvent {
                listener: *listener,
                target,
            })
            .collect()
    }

    /// Makes [`Document::add_click_listener`] fail.
    pub fn fail_listener_attach(&self, fail: bool) {
        self.tree.lock().faults.listener_attach = fail;
    }

    /// Makes [`Document::scroll_into_view`] fail.
    pub fn fail_scroll(&self, fail: bool) {
        self.tree.lock().faults.scroll = fail;
    }

    /// Makes [`Document::set_style_property`] fail.
    pub fn fail_style(&self, fail: bool) {
        self.tree.lock().faults.style = fail;
    }
}

// ============================================================================
// Document Implementation
// ============================================================================

impl Document for MemoryDocument {
    fn query_selector(&self, selector: &str) -> Result<Option<NodeId>> {
        let parsed = AttributeSelector::parse(selector)
            .ok_or_else(|| Error::internal(format!("unsupported selector: {selector}")))?;
        let tree = self.tree.lock();

        // Depth-first pre-order from the root is document order.
        let mut stack = vec![MemoryDocument::ROOT];
        while let Some(id) = stack.pop() {
            if tree.matches(id, &parsed) {
                return Ok(Some(id));
            }
            let node = tree.node(id)?;
            stack.extend(node.children.iter().rev().copied());
        }

        Ok(None)
    }

    fn closest(&self, node: NodeId, selector: &str) -> Result<Option<NodeId>> {
        let parsed = AttributeSelector::parse(selector)
            .ok_or_else(|| Error::internal(format!("unsupported selector: {selector}")))?;
        let tree = self.tree.lock();

        let mut current = Some(node);
        while let Some(id) = current {
            if tree.matches(id, &parsed) {
                return Ok(Some(id));
            }
            current = tree.node(id)?.parent;
        }

        Ok(None)
    }

    fn set_style_property(&self, node: NodeId, property: &str, value: &str) -> Result<()> {
        let mut tree = self.tree.lock();
        if tree.faults.style {
            return Err(Error::internal("style write rejected"));
        }

        let style = &mut tree.node_mut(node)?.style;
        if value.is_empty() {
            style.remove(property);
        } else {
            style.insert(property.to_string(), value.to_string());
        }
        Ok(())
    }

    fn scroll_into_view(&self, node: NodeId, options: &ScrollOptions) -> Result<()> {
        let mut tree = self.tree.lock();
        if tree.faults.scroll {
            return Err(Error::internal("scroll rejected"));
        }
        tree.node(node)?;
        if tree.scrolls.len() == MAX_RECORDED_SCROLLS {
            tree.scrolls.pop_front();
        }
        tree.scrolls.push_back((node, *options));
        Ok(())
    }

    fn add_click_listener(&self, capture: bool) -> Result<ListenerId> {
        let mut tree = self.tree.lock();
        if tree.faults.listener_attach {
            return Err(Error::internal("listener registration rejected"));
        }

        let id = ListenerId::generate();
        tree.listeners.push((id, capture));
        trace!(listener = %id, capture, "Click listener added");
        Ok(id)
    }

    fn remove_click_listener(&self, listener: ListenerId) -> Result<()> {
        self.tree.lock().listeners.retain(|(id, _)| *id != listener);
        trace!(%listener, "Click listener removed");
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
