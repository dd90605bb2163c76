//! In-memory document tree.
//!
//! Provides the node model every widget renders into:
//! - Stable node identifiers via arena-based storage
//! - Parent-child ownership with cascade removal
//! - Class lists, ordered attributes and typed attached properties
//! - Event listeners with bubbling dispatch
//! - A deferred task queue drained by the host loop
//!
//! # Key Types
//!
//! - [`Document`] - Owns every node and listener
//! - [`NodeId`] - Generational handle to a node; stale after removal
//! - [`NodeKind`] - Element, text, or raw markup
//!
//! # Example
//!
//! ```
//! use dh_widgets_core::Document;
//!
//! let mut doc = Document::new();
//! let list = doc.create_element("ul");
//! doc.set_attribute(list, "id", "todo").unwrap();
//! doc.append_child(doc.body(), list).unwrap();
//!
//! let item = doc.create_element("li");
//! doc.add_class(item, "done").unwrap();
//! doc.set_text_content(item, "write docs").unwrap();
//! doc.append_child(list, item).unwrap();
//!
//! assert_eq!(doc.get_element_by_id("todo"), Some(list));
//! assert_eq!(doc.to_html(list), r#"<ul id="todo"><li class="done">write docs</li></ul>"#);
//! ```

use std::any::Any;
use std::collections::HashMap;

use slotmap::{new_key_type, SlotMap};

use crate::error::{DomError, DomResult};
use crate::event::{DomEvent, Listener, ListenerEntry, ListenerId};
use crate::logging::targets;
use crate::task::{TaskId, TaskQueue};

new_key_type! {
    /// A unique identifier for a node in a [`Document`].
    ///
    /// `NodeId`s are stable handles that remain valid while the node is part
    /// of the document's arena. They become invalid when the node is removed,
    /// and a removed ID is never reused for a different node.
    pub struct NodeId;
}

impl NodeId {
    /// Convert the NodeId to a raw u64 value.
    #[inline]
    pub fn as_raw(self) -> u64 {
        use slotmap::Key;
        self.data().as_ffi()
    }

    /// Create a NodeId from a raw u64 value.
    ///
    /// This does not check that the node exists in any document.
    #[inline]
    pub fn from_raw(raw: u64) -> Self {
        Self::from(slotmap::KeyData::from_ffi(raw))
    }
}

/// Elements that never have a closing tag when serialized.
const VOID_ELEMENTS: &[&str] = &["area", "br", "col", "hr", "img", "input", "link", "meta"];

/// What a node is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// An element with a lowercase tag name.
    Element {
        /// Tag name, e.g. `"div"`.
        tag: String,
    },
    /// A text node. Escaped when serialized.
    Text(String),
    /// Raw markup assigned as inner content. Serialized verbatim.
    Markup(String),
}

/// Internal data stored in the arena for each node.
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    classes: Vec<String>,
    /// Attributes in insertion order (excluding `class`).
    attributes: Vec<(String, String)>,
    /// Attached properties, invisible to serialization.
    properties: HashMap<String, Box<dyn Any + Send + Sync>>,
    listeners: Vec<ListenerId>,
}

impl NodeData {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            classes: Vec::new(),
            attributes: Vec::new(),
            properties: HashMap::new(),
            listeners: Vec::new(),
        }
    }

    fn is_element(&self) -> bool {
        matches!(self.kind, NodeKind::Element { .. })
    }
}

/// A document tree with `<html>`, `<head>` and `<body>` created up front.
pub struct Document {
    nodes: SlotMap<NodeId, NodeData>,
    listeners: SlotMap<ListenerId, ListenerEntry>,
    document_element: NodeId,
    head: NodeId,
    body: NodeId,
    tasks: TaskQueue,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let document_element = nodes.insert(NodeData::new(NodeKind::Element {
            tag: "html".to_string(),
        }));
        let head = nodes.insert(NodeData::new(NodeKind::Element {
            tag: "head".to_string(),
        }));
        let body = nodes.insert(NodeData::new(NodeKind::Element {
            tag: "body".to_string(),
        }));
        for id in [head, body] {
            nodes[id].parent = Some(document_element);
            nodes[document_element].children.push(id);
        }

        Self {
            nodes,
            listeners: SlotMap::with_key(),
            document_element,
            head,
            body,
            tasks: TaskQueue::new(),
        }
    }

    /// The `<html>` element.
    pub fn document_element(&self) -> NodeId {
        self.document_element
    }

    /// The `<head>` element.
    pub fn head(&self) -> NodeId {
        self.head
    }

    /// The `<body>` element.
    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Number of live nodes, including detached ones.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // =========================================================================
    // Creation and structure
    // =========================================================================

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let id = self.nodes.insert(NodeData::new(NodeKind::Element {
            tag: tag.to_ascii_lowercase(),
        }));
        tracing::trace!(target: targets::DOM, ?id, tag, "created element");
        id
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.nodes.insert(NodeData::new(NodeKind::Text(text.into())))
    }

    /// Check if a node exists (attached or detached).
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Get what kind of node this is.
    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.nodes.get(id).map(|d| &d.kind)
    }

    /// Get an element's tag name. `None` for text and markup nodes.
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        match self.kind(id)? {
            NodeKind::Element { tag } => Some(tag.as_str()),
            _ => None,
        }
    }

    /// Check if the node is an element.
    pub fn is_element(&self, id: NodeId) -> bool {
        self.nodes.get(id).is_some_and(NodeData::is_element)
    }

    /// Get the parent of a node.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|d| d.parent)
    }

    /// Get the children of a node.
    pub fn children(&self, id: NodeId) -> DomResult<&[NodeId]> {
        self.nodes
            .get(id)
            .map(|d| d.children.as_slice())
            .ok_or(DomError::InvalidNode(id))
    }

    /// Iterate from `id` up through every ancestor, starting with `id` itself.
    pub fn self_and_ancestors(&self, id: NodeId) -> SelfAndAncestors<'_> {
        SelfAndAncestors {
            doc: self,
            next: self.contains(id).then_some(id),
        }
    }

    /// Check if `node` is `ancestor` or one of its descendants.
    pub fn node_contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.self_and_ancestors(node).any(|n| n == ancestor)
    }

    /// Check if the node is attached to the document element.
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.node_contains(self.document_element, id)
    }

    /// Collect all descendants of `id` in document order, excluding `id`.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        self.collect_descendants(id, &mut result);
        result
    }

    fn collect_descendants(&self, id: NodeId, result: &mut Vec<NodeId>) {
        if let Some(data) = self.nodes.get(id) {
            for &child in &data.children {
                result.push(child);
                self.collect_descendants(child, result);
            }
        }
    }

    /// Append `child` as the last child of `parent`.
    ///
    /// The child is detached from its previous parent first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        let parent_data = self.nodes.get(parent).ok_or(DomError::InvalidNode(parent))?;
        if !parent_data.is_element() {
            return Err(DomError::NotAContainer(parent));
        }
        if !self.nodes.contains_key(child) {
            return Err(DomError::InvalidNode(child));
        }
        if self.node_contains(child, parent) {
            return Err(DomError::CircularParentage { parent, child });
        }

        self.detach(child)?;
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
        Ok(())
    }

    /// Detach a node from its parent without destroying it.
    pub fn detach(&mut self, id: NodeId) -> DomResult<()> {
        let old_parent = self
            .nodes
            .get(id)
            .ok_or(DomError::InvalidNode(id))?
            .parent;
        if let Some(parent_id) = old_parent {
            if let Some(parent_data) = self.nodes.get_mut(parent_id) {
                parent_data.children.retain(|&c| c != id);
            }
            self.nodes[id].parent = None;
        }
        Ok(())
    }

    /// Remove a node and its entire subtree, including their listeners.
    #[tracing::instrument(skip(self), target = "dh_widgets::dom", level = "trace")]
    pub fn remove(&mut self, id: NodeId) -> DomResult<()> {
        if id == self.document_element || id == self.head || id == self.body {
            return Err(DomError::StructuralNode(id));
        }
        self.detach(id)?;

        let mut doomed = self.descendants(id);
        doomed.push(id);
        tracing::trace!(target: targets::DOM, ?id, count = doomed.len(), "removing subtree");
        for node in doomed {
            if let Some(data) = self.nodes.remove(node) {
                for listener in data.listeners {
                    self.listeners.remove(listener);
                }
            }
        }
        Ok(())
    }

    /// Remove every child of a node.
    pub fn clear_children(&mut self, id: NodeId) -> DomResult<()> {
        let children = self.children(id)?.to_vec();
        for child in children {
            self.remove(child)?;
        }
        Ok(())
    }

    /// Replace a node's children with a single text node.
    pub fn set_text_content(&mut self, id: NodeId, text: impl Into<String>) -> DomResult<()> {
        self.clear_children(id)?;
        let text = text.into();
        if !text.is_empty() {
            let node = self.create_text(text);
            self.append_child(id, node)?;
        }
        Ok(())
    }

    /// Replace a node's children with raw markup, serialized verbatim.
    pub fn set_inner_markup(&mut self, id: NodeId, markup: impl Into<String>) -> DomResult<()> {
        self.clear_children(id)?;
        let node = self
            .nodes
            .insert(NodeData::new(NodeKind::Markup(markup.into())));
        self.append_child(id, node)
    }

    /// Concatenated text of every text node in the subtree.
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

    // =========================================================================
    // Classes
    // =========================================================================

    /// Add a class. Returns `true` if the class was not already present.
    pub fn add_class(&mut self, id: NodeId, class: &str) -> DomResult<bool> {
        let data = self.nodes.get_mut(id).ok_or(DomError::InvalidNode(id))?;
        if class.is_empty() || data.classes.iter().any(|c| c == class) {
            return Ok(false);
        }
        data.classes.push(class.to_string());
        Ok(true)
    }

    /// Remove a class. Returns `true` if the class was present.
    pub fn remove_class(&mut self, id: NodeId, class: &str) -> DomResult<bool> {
        let data = self.nodes.get_mut(id).ok_or(DomError::InvalidNode(id))?;
        let before = data.classes.len();
        data.classes.retain(|c| c != class);
        Ok(data.classes.len() != before)
    }

    /// Check whether a node carries a class. `false` for removed nodes.
    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.nodes
            .get(id)
            .is_some_and(|d| d.classes.iter().any(|c| c == class))
    }

    /// All classes of a node, in insertion order.
    pub fn classes(&self, id: NodeId) -> &[String] {
        self.nodes.get(id).map_or(&[], |d| d.classes.as_slice())
    }

    /// Replace the class list from a whitespace-separated class string.
    pub fn set_class_name(&mut self, id: NodeId, class_name: &str) -> DomResult<()> {
        let data = self.nodes.get_mut(id).ok_or(DomError::InvalidNode(id))?;
        data.classes.clear();
        for class in class_name.split_whitespace() {
            if !data.classes.iter().any(|c| c == class) {
                data.classes.push(class.to_string());
            }
        }
        Ok(())
    }

    /// The class list joined with spaces.
    pub fn class_name(&self, id: NodeId) -> String {
        self.classes(id).join(" ")
    }

    /// Find the nearest node, starting at `id` itself, carrying `class`.
    pub fn closest_with_class(&self, id: NodeId, class: &str) -> Option<NodeId> {
        self.self_and_ancestors(id).find(|&n| self.has_class(n, class))
    }

    // =========================================================================
    // Attributes and properties
    // =========================================================================

    /// Set an attribute. Setting `class` replaces the class list.
    pub fn set_attribute(
        &mut self,
        id: NodeId,
        name: &str,
        value: impl Into<String>,
    ) -> DomResult<()> {
        let value = value.into();
        if name == "class" {
            return self.set_class_name(id, &value);
        }
        let data = self.nodes.get_mut(id).ok_or(DomError::InvalidNode(id))?;
        match data.attributes.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = value,
            None => data.attributes.push((name.to_string(), value)),
        }
        Ok(())
    }

    /// Get an attribute value.
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.nodes
            .get(id)?
            .attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Remove an attribute. Returns `true` if it was present.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> DomResult<bool> {
        let data = self.nodes.get_mut(id).ok_or(DomError::InvalidNode(id))?;
        let before = data.attributes.len();
        data.attributes.retain(|(n, _)| n != name);
        Ok(data.attributes.len() != before)
    }

    /// The node's `id` attribute.
    pub fn element_id(&self, id: NodeId) -> Option<&str> {
        self.attribute(id, "id")
    }

    /// Find the first connected element whose `id` attribute equals `element_id`.
    pub fn get_element_by_id(&self, element_id: &str) -> Option<NodeId> {
        self.descendants(self.document_element)
            .into_iter()
            .find(|&n| self.element_id(n) == Some(element_id))
    }

    /// Attach a typed property to a node.
    pub fn set_property<T: Any + Send + Sync>(
        &mut self,
        id: NodeId,
        name: impl Into<String>,
        value: T,
    ) -> DomResult<()> {
        let data = self.nodes.get_mut(id).ok_or(DomError::InvalidNode(id))?;
        data.properties.insert(name.into(), Box::new(value));
        Ok(())
    }

    /// Read an attached property. `None` if absent or of a different type.
    pub fn property<T: Any>(&self, id: NodeId, name: &str) -> Option<&T> {
        self.nodes
            .get(id)?
            .properties
            .get(name)
            .and_then(|v| v.downcast_ref::<T>())
    }

    /// Remove an attached property. Returns `true` if it was present.
    pub fn remove_property(&mut self, id: NodeId, name: &str) -> bool {
        self.nodes
            .get_mut(id)
            .is_some_and(|d| d.properties.remove(name).is_some())
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Register a listener for `event_type` on a node.
    pub fn add_event_listener(
        &mut self,
        node: NodeId,
        event_type: &str,
        callback: Listener,
    ) -> DomResult<ListenerId> {
        if !self.nodes.contains_key(node) {
            return Err(DomError::InvalidNode(node));
        }
        let id = self.listeners.insert(ListenerEntry {
            node,
            event_type: event_type.to_string(),
            callback,
        });
        self.nodes[node].listeners.push(id);
        tracing::trace!(target: targets::EVENT, ?node, event_type, ?id, "listener added");
        Ok(id)
    }

    /// Remove a listener. Returns `true` if it was registered.
    pub fn remove_event_listener(&mut self, id: ListenerId) -> bool {
        let Some(entry) = self.listeners.remove(id) else {
            return false;
        };
        if let Some(data) = self.nodes.get_mut(entry.node) {
            data.listeners.retain(|&l| l != id);
        }
        true
    }

    /// Number of listeners of `event_type` registered directly on a node.
    pub fn listener_count(&self, node: NodeId, event_type: &str) -> usize {
        self.nodes.get(node).map_or(0, |d| {
            d.listeners
                .iter()
                .filter(|&&l| {
                    self.listeners
                        .get(l)
                        .is_some_and(|e| e.event_type == event_type)
                })
                .count()
        })
    }

    /// Total number of listeners registered on a node, of any type.
    pub fn total_listener_count(&self, node: NodeId) -> usize {
        self.nodes.get(node).map_or(0, |d| d.listeners.len())
    }

    /// Dispatch an event at its target and bubble it to the document element.
    ///
    /// The bubbling path is fixed before any listener runs. Listeners removed
    /// by an earlier listener during the same dispatch are skipped, as are
    /// nodes removed mid-dispatch.
    ///
    /// Returns the number of listeners invoked.
    pub fn dispatch_event(&mut self, event: &DomEvent) -> usize {
        let path: Vec<NodeId> = self.self_and_ancestors(event.target).collect();
        if path.is_empty() {
            tracing::warn!(target: targets::EVENT, target_node = ?event.target, event_type = %event.event_type, "dispatch to removed node ignored");
            return 0;
        }
        tracing::trace!(target: targets::EVENT, event_type = %event.event_type, depth = path.len(), "dispatching");

        let mut invoked = 0;
        for node in path {
            let callbacks: Vec<(ListenerId, Listener)> = match self.nodes.get(node) {
                Some(data) => data
                    .listeners
                    .iter()
                    .filter_map(|&l| {
                        self.listeners
                            .get(l)
                            .filter(|e| e.event_type == event.event_type)
                            .map(|e| (l, e.callback.clone()))
                    })
                    .collect(),
                None => continue,
            };
            for (id, callback) in callbacks {
                if !self.listeners.contains_key(id) {
                    continue;
                }
                callback(self, event);
                invoked += 1;
            }
        }
        invoked
    }

    // =========================================================================
    // Deferred tasks
    // =========================================================================

    /// Queue a task to run on the next [`run_pending_tasks`](Self::run_pending_tasks).
    pub fn post_task<F>(&mut self, task: F) -> TaskId
    where
        F: FnOnce(&mut Document) + Send + 'static,
    {
        self.tasks.post(task)
    }

    /// Cancel a queued task.
    pub fn cancel_task(&mut self, id: TaskId) -> bool {
        self.tasks.cancel(id)
    }

    /// Number of queued tasks.
    pub fn pending_task_count(&self) -> usize {
        self.tasks.pending_count()
    }

    /// Run queued tasks until the queue is empty, including tasks queued by
    /// the tasks themselves. Returns the number of tasks run.
    pub fn run_pending_tasks(&mut self) -> usize {
        let mut count = 0;
        while let Some(task) = self.tasks.pop() {
            task(self);
            count += 1;
        }
        count
    }

    // =========================================================================
    // Serialization
    // =========================================================================

    /// Serialize a subtree to markup.
    pub fn to_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_html(id, &mut out);
        out
    }

    fn write_html(&self, id: NodeId, out: &mut String) {
        let Some(data) = self.nodes.get(id) else {
            return;
        };
        match &data.kind {
            NodeKind::Text(text) => escape_into(text, false, out),
            NodeKind::Markup(markup) => out.push_str(markup),
            NodeKind::Element { tag } => {
                out.push('<');
                out.push_str(tag);
                if !data.classes.is_empty() {
                    out.push_str(" class=\"");
                    escape_into(&data.classes.join(" "), true, out);
                    out.push('"');
                }
                for (name, value) in &data.attributes {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    escape_into(value, true, out);
                    out.push('"');
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&tag.as_str()) {
                    return;
                }
                for &child in &data.children {
                    self.write_html(child, out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.nodes.len())
            .field("listeners", &self.listeners.len())
            .field("tasks", &self.tasks)
            .finish()
    }
}

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

/// Iterator returned by [`Document::self_and_ancestors`].
pub struct SelfAndAncestors<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for SelfAndAncestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.doc.parent(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;
    use crate::event::{event_types, listener};

    fn element_in(doc: &mut Document, parent: NodeId, tag: &str) -> NodeId {
        let node = doc.create_element(tag);
        doc.append_child(parent, node).unwrap();
        node
    }

    #[test]
    fn test_structure_nodes() {
        let doc = Document::new();
        assert_eq!(doc.tag_name(doc.document_element()), Some("html"));
        assert_eq!(doc.parent(doc.body()), Some(doc.document_element()));
        assert_eq!(doc.parent(doc.head()), Some(doc.document_element()));
        assert!(doc.is_connected(doc.body()));
    }

    #[test]
    fn test_append_moves_between_parents() {
        let mut doc = Document::new();
        let body = doc.body();
        let a = element_in(&mut doc, body, "div");
        let b = element_in(&mut doc, body, "div");
        let child = element_in(&mut doc, a, "span");

        doc.append_child(b, child).unwrap();
        assert!(doc.children(a).unwrap().is_empty());
        assert_eq!(doc.children(b).unwrap(), &[child]);
        assert_eq!(doc.parent(child), Some(b));
    }

    #[test]
    fn test_circular_parentage_rejected() {
        let mut doc = Document::new();
        let body = doc.body();
        let outer = element_in(&mut doc, body, "div");
        let inner = element_in(&mut doc, outer, "div");

        let result = doc.append_child(inner, outer);
        assert!(matches!(result, Err(DomError::CircularParentage { .. })));
        assert!(matches!(
            doc.append_child(outer, outer),
            Err(DomError::CircularParentage { .. })
        ));
    }

    #[test]
    fn test_text_nodes_cannot_have_children() {
        let mut doc = Document::new();
        let text = doc.create_text("hi");
        let span = doc.create_element("span");
        assert_eq!(doc.append_child(text, span), Err(DomError::NotAContainer(text)));
    }

    #[test]
    fn test_cascade_remove() {
        let mut doc = Document::new();
        let body = doc.body();
        let parent = element_in(&mut doc, body, "div");
        let child = element_in(&mut doc, parent, "p");
        let grandchild = element_in(&mut doc, child, "b");
        doc.add_event_listener(grandchild, event_types::CLICK, listener(|_, _| {}))
            .unwrap();

        doc.remove(parent).unwrap();
        assert!(!doc.contains(parent));
        assert!(!doc.contains(child));
        assert!(!doc.contains(grandchild));
        assert!(doc.children(doc.body()).unwrap().is_empty());
        assert!(matches!(doc.remove(parent), Err(DomError::InvalidNode(_))));
    }

    #[test]
    fn test_structural_nodes_cannot_be_removed() {
        let mut doc = Document::new();
        let body = doc.body();
        assert_eq!(doc.remove(body), Err(DomError::StructuralNode(body)));
    }

    #[test]
    fn test_classes() {
        let mut doc = Document::new();
        let node = doc.create_element("div");
        assert!(doc.add_class(node, "a").unwrap());
        assert!(!doc.add_class(node, "a").unwrap());
        assert!(!doc.add_class(node, "").unwrap());
        doc.add_class(node, "b").unwrap();
        assert_eq!(doc.class_name(node), "a b");

        assert!(doc.remove_class(node, "a").unwrap());
        assert!(!doc.remove_class(node, "a").unwrap());
        assert!(!doc.has_class(node, "a"));

        doc.set_attribute(node, "class", "  x y  x ").unwrap();
        assert_eq!(doc.classes(node), &["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn test_closest_with_class() {
        let mut doc = Document::new();
        let body = doc.body();
        let outer = element_in(&mut doc, body, "div");
        doc.add_class(outer, "item").unwrap();
        let inner = element_in(&mut doc, outer, "span");
        let leaf = element_in(&mut doc, inner, "b");

        assert_eq!(doc.closest_with_class(leaf, "item"), Some(outer));
        assert_eq!(doc.closest_with_class(outer, "item"), Some(outer));
        assert_eq!(doc.closest_with_class(leaf, "missing"), None);
    }

    #[test]
    fn test_properties_are_typed() {
        let mut doc = Document::new();
        let node = doc.create_element("li");
        doc.set_property(node, "index", 3usize).unwrap();
        assert_eq!(doc.property::<usize>(node, "index"), Some(&3));
        assert_eq!(doc.property::<i32>(node, "index"), None);
        assert!(doc.remove_property(node, "index"));
        assert_eq!(doc.property::<usize>(node, "index"), None);
    }

    #[test]
    fn test_get_element_by_id_ignores_detached() {
        let mut doc = Document::new();
        let detached = doc.create_element("div");
        doc.set_attribute(detached, "id", "root").unwrap();
        assert_eq!(doc.get_element_by_id("root"), None);

        doc.append_child(doc.body(), detached).unwrap();
        assert_eq!(doc.get_element_by_id("root"), Some(detached));
    }

    #[test]
    fn test_dispatch_bubbles_in_order() {
        let mut doc = Document::new();
        let body = doc.body();
        let outer = element_in(&mut doc, body, "div");
        let inner = element_in(&mut doc, outer, "span");
        let order = Arc::new(Mutex::new(Vec::new()));

        for (node, name) in [(outer, "outer"), (inner, "inner")] {
            let order = order.clone();
            doc.add_event_listener(
                node,
                event_types::CLICK,
                listener(move |_, _| order.lock().push(name)),
            )
            .unwrap();
        }

        let invoked = doc.dispatch_event(&DomEvent::click(inner));
        assert_eq!(invoked, 2);
        assert_eq!(*order.lock(), vec!["inner", "outer"]);

        let invoked = doc.dispatch_event(&DomEvent::new(event_types::MOUSE_OVER, inner));
        assert_eq!(invoked, 0);
    }

    #[test]
    fn test_listener_removed_mid_dispatch_is_skipped() {
        let mut doc = Document::new();
        let body = doc.body();
        let outer = element_in(&mut doc, body, "div");
        let inner = element_in(&mut doc, outer, "span");
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = hits.clone();
        let outer_listener = doc
            .add_event_listener(
                outer,
                event_types::CLICK,
                listener(move |_, _| {
                    counter.fetch_add(1, Ordering::SeqCst);
                }),
            )
            .unwrap();
        doc.add_event_listener(
            inner,
            event_types::CLICK,
            listener(move |doc, _| {
                doc.remove_event_listener(outer_listener);
            }),
        )
        .unwrap();

        assert_eq!(doc.dispatch_event(&DomEvent::click(inner)), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_remove_event_listener() {
        let mut doc = Document::new();
        let body = doc.body();
        let node = element_in(&mut doc, body, "div");
        let id = doc
            .add_event_listener(node, event_types::CLICK, listener(|_, _| {}))
            .unwrap();
        assert_eq!(doc.listener_count(node, event_types::CLICK), 1);
        assert!(doc.remove_event_listener(id));
        assert!(!doc.remove_event_listener(id));
        assert_eq!(doc.total_listener_count(node), 0);
    }

    #[test]
    fn test_tasks_run_in_order_including_nested() {
        let mut doc = Document::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let first = log.clone();
        doc.post_task(move |doc| {
            first.lock().push(1);
            let nested = first.clone();
            doc.post_task(move |_| nested.lock().push(3));
        });
        let second = log.clone();
        doc.post_task(move |_| second.lock().push(2));

        assert_eq!(doc.pending_task_count(), 2);
        assert_eq!(doc.run_pending_tasks(), 3);
        assert_eq!(*log.lock(), vec![1, 2, 3]);
    }

    #[test]
    fn test_to_html_escapes_and_keeps_markup() {
        let mut doc = Document::new();
        let body = doc.body();
        let div = element_in(&mut doc, body, "div");
        doc.set_attribute(div, "title", "a \"b\"").unwrap();
        let text = doc.create_text("1 < 2 & 3");
        doc.append_child(div, text).unwrap();
        let link = element_in(&mut doc, div, "link");
        doc.set_attribute(link, "rel", "stylesheet").unwrap();

        assert_eq!(
            doc.to_html(div),
            r#"<div title="a &quot;b&quot;">1 &lt; 2 &amp; 3<link rel="stylesheet"></div>"#
        );

        doc.set_inner_markup(div, "<em>raw</em>").unwrap();
        assert_eq!(doc.to_html(div), r#"<div title="a &quot;b&quot;"><em>raw</em></div>"#);
    }
}
