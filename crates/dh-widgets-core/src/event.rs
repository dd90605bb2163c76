//! DOM events and listener registration types.
//!
//! Events are dispatched to a target node and bubble up through every
//! ancestor to the document element. Each node on the way invokes the
//! listeners registered for the event's type.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use dh_widgets_core::{Document, DomEvent, event_types, listener};
//!
//! let mut doc = Document::new();
//! let button = doc.create_element("button");
//! doc.append_child(doc.body(), button).unwrap();
//!
//! let clicks = Arc::new(AtomicUsize::new(0));
//! let counter = clicks.clone();
//! doc.add_event_listener(doc.body(), event_types::CLICK, listener(move |_doc, _event| {
//!     counter.fetch_add(1, Ordering::SeqCst);
//! }))
//! .unwrap();
//!
//! doc.dispatch_event(&DomEvent::new(event_types::CLICK, button));
//! assert_eq!(clicks.load(Ordering::SeqCst), 1);
//! ```

use std::sync::Arc;

use slotmap::new_key_type;

use crate::dom::{Document, NodeId};

new_key_type! {
    /// Identifies a single registered event listener.
    ///
    /// Returned by [`Document::add_event_listener`] and accepted by
    /// [`Document::remove_event_listener`].
    pub struct ListenerId;
}

/// A listener callback.
///
/// Listeners receive mutable access to the document so they can update the
/// tree in response to the event.
pub type Listener = Arc<dyn Fn(&mut Document, &DomEvent) + Send + Sync>;

/// Wrap a closure as a [`Listener`].
///
/// Prefer this over `Arc::new` so the closure's argument types are inferred.
pub fn listener<F>(callback: F) -> Listener
where
    F: Fn(&mut Document, &DomEvent) + Send + Sync + 'static,
{
    Arc::new(callback)
}

/// Well-known event type names.
pub mod event_types {
    /// Primary button click.
    pub const CLICK: &str = "click";
    /// Double click.
    pub const DBL_CLICK: &str = "dblclick";
    /// Pointer moved onto a node or one of its descendants (bubbles).
    pub const MOUSE_OVER: &str = "mouseover";
    /// Pointer moved off a node or one of its descendants (bubbles).
    pub const MOUSE_OUT: &str = "mouseout";
    /// Primary button pressed.
    pub const MOUSE_DOWN: &str = "mousedown";
    /// Primary button released.
    pub const MOUSE_UP: &str = "mouseup";
    /// Key pressed while a node has focus.
    pub const KEY_DOWN: &str = "keydown";
    /// Form control value committed.
    pub const CHANGE: &str = "change";
}

/// An event dispatched through the document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomEvent {
    /// Event type name, for example `"click"`.
    pub event_type: String,
    /// The node the event was originally dispatched to.
    pub target: NodeId,
    /// For pointer transitions: the node the pointer is moving to (`mouseout`)
    /// or coming from (`mouseover`).
    pub related_target: Option<NodeId>,
}

impl DomEvent {
    /// Create an event of the given type targeted at `target`.
    pub fn new(event_type: impl Into<String>, target: NodeId) -> Self {
        Self {
            event_type: event_type.into(),
            target,
            related_target: None,
        }
    }

    /// Create a `click` event.
    pub fn click(target: NodeId) -> Self {
        Self::new(event_types::CLICK, target)
    }

    /// Create a `mouseover` event, with the node the pointer came from.
    pub fn mouse_over(target: NodeId, from: Option<NodeId>) -> Self {
        Self::new(event_types::MOUSE_OVER, target).with_related_target(from)
    }

    /// Create a `mouseout` event, with the node the pointer is moving to.
    pub fn mouse_out(target: NodeId, to: Option<NodeId>) -> Self {
        Self::new(event_types::MOUSE_OUT, target).with_related_target(to)
    }

    /// Set the related target.
    pub fn with_related_target(mut self, related: Option<NodeId>) -> Self {
        self.related_target = related;
        self
    }
}

/// Internal storage for a registered listener.
pub(crate) struct ListenerEntry {
    pub(crate) node: NodeId,
    pub(crate) event_type: String,
    pub(crate) callback: Listener,
}
