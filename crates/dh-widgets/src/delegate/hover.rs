//! Nearest-match hover highlighting.
//!
//! Two listeners at the delegation root track the pointer. The nearest
//! ancestor of the hovered node that carries the event-target marker gets
//! the active class; at most one node per root is active at a time.

use std::sync::Arc;

use parking_lot::Mutex;

use dh_widgets_core::logging::targets;
use dh_widgets_core::{Document, DomEvent, DomResult, ListenerId, NodeId, event_types, listener};

use super::{ACTIVE_CLASS, EVENT_TARGET_CLASS};

/// The active node of one root, shared by its two hover listeners.
#[derive(Debug, Clone, Default)]
pub struct HoverState {
    current: Arc<Mutex<Option<NodeId>>>,
}

impl HoverState {
    /// The currently highlighted node.
    pub fn current(&self) -> Option<NodeId> {
        *self.current.lock()
    }

    fn replace(&self, node: Option<NodeId>) -> Option<NodeId> {
        std::mem::replace(&mut *self.current.lock(), node)
    }
}

/// Listeners installed for one root.
#[derive(Debug)]
pub(crate) struct HoverBinding {
    pub(crate) over: ListenerId,
    pub(crate) out: ListenerId,
    pub(crate) state: HoverState,
}

impl HoverBinding {
    /// Remove both listeners and clear the highlight.
    pub(crate) fn release(self, doc: &mut Document) {
        doc.remove_event_listener(self.over);
        doc.remove_event_listener(self.out);
        deactivate(doc, &self.state);
    }
}

/// Register the `mouseover`/`mouseout` pair on `root`.
pub(crate) fn install(doc: &mut Document, root: NodeId) -> DomResult<HoverBinding> {
    let state = HoverState::default();

    let over_state = state.clone();
    let over = doc.add_event_listener(
        root,
        event_types::MOUSE_OVER,
        listener(move |doc, event| on_mouse_over(doc, event, root, &over_state)),
    )?;

    let out_state = state.clone();
    let out = match doc.add_event_listener(
        root,
        event_types::MOUSE_OUT,
        listener(move |doc, event| on_mouse_out(doc, event, root, &out_state)),
    ) {
        Ok(id) => id,
        Err(error) => {
            doc.remove_event_listener(over);
            return Err(error);
        }
    };

    Ok(HoverBinding { over, out, state })
}

/// Nearest marked node from `node` up to, but excluding, `root`.
fn nearest_target(doc: &Document, node: NodeId, root: NodeId) -> Option<NodeId> {
    if !doc.node_contains(root, node) {
        return None;
    }
    doc.self_and_ancestors(node)
        .take_while(|&n| n != root)
        .find(|&n| doc.has_class(n, EVENT_TARGET_CLASS))
}

fn on_mouse_over(doc: &mut Document, event: &DomEvent, root: NodeId, state: &HoverState) {
    let Some(target) = nearest_target(doc, event.target, root) else {
        return;
    };
    if state.current() == Some(target) {
        return;
    }

    deactivate(doc, state);
    if doc.add_class(target, ACTIVE_CLASS).is_ok() {
        state.replace(Some(target));
        tracing::trace!(target: targets::DELEGATE, ?root, ?target, "hover activated");
    }
}

fn on_mouse_out(doc: &mut Document, event: &DomEvent, root: NodeId, state: &HoverState) {
    let Some(current) = state.current() else {
        return;
    };

    if let Some(to) = event.related_target {
        if doc.node_contains(current, to) {
            return;
        }
        if nearest_target(doc, to, root).is_some() {
            return;
        }
    }

    deactivate(doc, state);
}

/// Clear the highlight, if any. Nodes removed in the meantime are skipped.
pub(crate) fn deactivate(doc: &mut Document, state: &HoverState) {
    if let Some(previous) = state.replace(None) {
        if doc.contains(previous) {
            let _ = doc.remove_class(previous, ACTIVE_CLASS);
        }
        tracing::trace!(target: targets::DELEGATE, ?previous, "hover deactivated");
    }
}
