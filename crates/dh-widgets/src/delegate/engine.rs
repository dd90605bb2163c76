//! The event delegation engine.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;

use dh_widgets_core::logging::targets;
use dh_widgets_core::{Document, DomError, DomEvent, ListenerId, NodeId, listener};
use dh_widgets_style::selector::{SelectorList, SelectorMatcher, parse_selector_list};

use super::hover::{self, HoverBinding};
use super::resolve::resolve_item;
use super::EVENT_TARGET_CLASS;
use crate::error::DelegateResult;

/// A delegated event handler.
pub type DelegateHandler = Arc<dyn Fn(&mut Document, &DelegateEvent<'_>) + Send + Sync>;

/// Wrap a closure as a [`DelegateHandler`].
pub fn handler<F>(callback: F) -> DelegateHandler
where
    F: Fn(&mut Document, &DelegateEvent<'_>) + Send + Sync + 'static,
{
    Arc::new(callback)
}

/// What a delegated handler is told about an interaction.
#[derive(Debug, Clone, Copy)]
pub struct DelegateEvent<'a> {
    /// The native event.
    pub event: &'a DomEvent,
    /// The nearest node matching the handler's selector, or the root for
    /// selector-less handlers.
    pub matched: NodeId,
    /// The view-data record the matched node belongs to.
    pub item: Option<&'a Value>,
    /// Index of that record, when it could be resolved.
    pub index: Option<usize>,
    /// The delegation root.
    pub root: NodeId,
}

/// One delegated binding: an event type, an optional selector and a handler.
#[derive(Clone)]
pub struct EventSpec {
    /// Event type name, for example `"click"`.
    pub event_type: String,
    /// Selector of the descendants this handler is for. `None` targets the
    /// root itself.
    pub selector: Option<String>,
    /// The callback.
    pub handler: DelegateHandler,
}

impl EventSpec {
    /// A handler for descendants of the root matching `selector`.
    pub fn new<F>(event_type: impl Into<String>, selector: impl Into<String>, callback: F) -> Self
    where
        F: Fn(&mut Document, &DelegateEvent<'_>) + Send + Sync + 'static,
    {
        Self {
            event_type: event_type.into(),
            selector: Some(selector.into()),
            handler: handler(callback),
        }
    }

    /// A handler that fires on the root when no selector matched.
    pub fn on_root<F>(event_type: impl Into<String>, callback: F) -> Self
    where
        F: Fn(&mut Document, &DelegateEvent<'_>) + Send + Sync + 'static,
    {
        Self {
            event_type: event_type.into(),
            selector: None,
            handler: handler(callback),
        }
    }
}

impl fmt::Debug for EventSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSpec")
            .field("event_type", &self.event_type)
            .field("selector", &self.selector)
            .finish_non_exhaustive()
    }
}

/// Handlers sharing one selector string.
struct SelectorGroup {
    source: String,
    selectors: SelectorList,
    handlers: Vec<DelegateHandler>,
}

/// Everything bound for one event type on one root.
struct TypeGroup {
    event_type: String,
    selector_groups: Vec<SelectorGroup>,
    root_handlers: Vec<DelegateHandler>,
}

impl TypeGroup {
    fn selector_sources(&self) -> Vec<String> {
        self.selector_groups.iter().map(|g| g.source.clone()).collect()
    }
}

/// Group specs by type, then by selector, both in first-appearance order.
/// Every selector is parsed here, so a bad one fails before anything is
/// registered.
fn group_specs(events: &[EventSpec]) -> DelegateResult<Vec<TypeGroup>> {
    let mut groups: Vec<TypeGroup> = Vec::new();

    for spec in events {
        let position = match groups.iter().position(|g| g.event_type == spec.event_type) {
            Some(position) => position,
            None => {
                groups.push(TypeGroup {
                    event_type: spec.event_type.clone(),
                    selector_groups: Vec::new(),
                    root_handlers: Vec::new(),
                });
                groups.len() - 1
            }
        };
        let group = &mut groups[position];

        let Some(selector) = &spec.selector else {
            group.root_handlers.push(spec.handler.clone());
            continue;
        };

        match group.selector_groups.iter_mut().find(|g| &g.source == selector) {
            Some(existing) => existing.handlers.push(spec.handler.clone()),
            None => group.selector_groups.push(SelectorGroup {
                source: selector.clone(),
                selectors: parse_selector_list(selector)?,
                handlers: vec![spec.handler.clone()],
            }),
        }
    }

    Ok(groups)
}

/// Run one native event through a type group.
fn dispatch(
    doc: &mut Document,
    event: &DomEvent,
    root: NodeId,
    group: &TypeGroup,
    view_data: &[Value],
) {
    let path: Vec<NodeId> = doc
        .self_and_ancestors(event.target)
        .take_while(|&n| n != root)
        .collect();

    for node in path {
        let Some(matched) = group
            .selector_groups
            .iter()
            .find(|g| SelectorMatcher::matches_any(doc, node, &g.selectors))
        else {
            continue;
        };

        let item = resolve_item(doc, node, view_data);
        tracing::trace!(
            target: targets::DELEGATE,
            event_type = %event.event_type,
            selector = %matched.source,
            ?node,
            index = ?item.index,
            "delegated match"
        );
        let delegated = DelegateEvent {
            event,
            matched: node,
            item: item.data,
            index: item.index,
            root,
        };
        for handler in &matched.handlers {
            handler(doc, &delegated);
        }
        return;
    }

    if group.root_handlers.is_empty() {
        return;
    }
    let delegated = DelegateEvent {
        event,
        matched: root,
        item: None,
        index: None,
        root,
    };
    for handler in &group.root_handlers {
        handler(doc, &delegated);
    }
}

/// One native listener registered by `bind`.
#[derive(Debug)]
struct BindingEntry {
    event_type: String,
    listener: ListenerId,
    selectors: Vec<String>,
}

/// Everything `bind` did to one root, so `unbind` can undo it.
#[derive(Debug)]
struct BindingRecord {
    entries: Vec<BindingEntry>,
    marked: Vec<NodeId>,
    hover: HoverBinding,
}

impl BindingRecord {
    fn listener_count(&self) -> usize {
        self.entries.len() + 2
    }

    fn release(self, doc: &mut Document) {
        for entry in &self.entries {
            doc.remove_event_listener(entry.listener);
        }
        for &node in &self.marked {
            if doc.contains(node) {
                let _ = doc.remove_class(node, EVENT_TARGET_CLASS);
            }
        }
        self.hover.release(doc);
    }
}

/// Binds one listener per event type on a root and routes each event to
/// the nearest matching descendant.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use parking_lot::Mutex;
/// use serde_json::{Value, json};
/// use dh_widgets::delegate::{DelegationEngine, EventSpec, mark_data_item};
/// use dh_widgets_core::{Document, DomEvent, event_types};
///
/// let mut doc = Document::new();
/// let body = doc.body();
/// let list = doc.create_element("ul");
/// doc.append_child(body, list).unwrap();
/// for index in 0..3 {
///     let item = doc.create_element("li");
///     doc.add_class(item, "row").unwrap();
///     mark_data_item(&mut doc, item, index).unwrap();
///     doc.append_child(list, item).unwrap();
/// }
///
/// let seen = Arc::new(Mutex::new(None));
/// let sink = seen.clone();
/// let engine = DelegationEngine::new();
/// let view: Arc<[Value]> = vec![json!("a"), json!("b"), json!("c")].into();
/// engine
///     .bind(&mut doc, list, &[EventSpec::new(event_types::CLICK, ".row", move |_, e| {
///         *sink.lock() = e.item.cloned();
///     })], view)
///     .unwrap();
///
/// let third = doc.children(list).unwrap()[2];
/// doc.dispatch_event(&DomEvent::click(third));
/// assert_eq!(*seen.lock(), Some(json!("c")));
/// ```
#[derive(Debug, Default)]
pub struct DelegationEngine {
    records: Mutex<HashMap<NodeId, BindingRecord>>,
}

impl DelegationEngine {
    /// An engine with no bindings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `events` on `root`, replacing any earlier binding of that root.
    ///
    /// Installs one listener per distinct event type plus the hover pair,
    /// and marks every element under `root` that matches a selector with the
    /// event-target class. Elements added later are not marked.
    ///
    /// Fails without touching the existing binding if a selector does not
    /// parse or `root` does not exist.
    #[tracing::instrument(skip(self, doc, events, view_data), target = "dh_widgets::delegate", level = "debug")]
    pub fn bind(
        &self,
        doc: &mut Document,
        root: NodeId,
        events: &[EventSpec],
        view_data: Arc<[Value]>,
    ) -> DelegateResult<()> {
        if !doc.contains(root) {
            return Err(DomError::InvalidNode(root).into());
        }
        let groups = group_specs(events)?;

        self.unbind(doc, root);

        let mut marked = Vec::new();
        for node in doc.descendants(root) {
            let matches = groups.iter().any(|group| {
                group
                    .selector_groups
                    .iter()
                    .any(|g| SelectorMatcher::matches_any(doc, node, &g.selectors))
            });
            if matches && doc.add_class(node, EVENT_TARGET_CLASS)? {
                marked.push(node);
            }
        }

        let mut entries = Vec::with_capacity(groups.len());
        for group in groups {
            let event_type = group.event_type.clone();
            let selectors = group.selector_sources();
            let group = Arc::new(group);
            let view_data = view_data.clone();
            let listener_id = doc.add_event_listener(
                root,
                &event_type,
                listener(move |doc, event| dispatch(doc, event, root, &group, &view_data)),
            )?;
            entries.push(BindingEntry {
                event_type,
                listener: listener_id,
                selectors,
            });
        }

        let hover = hover::install(doc, root)?;
        let record = BindingRecord {
            entries,
            marked,
            hover,
        };

        tracing::debug!(
            target: targets::DELEGATE,
            ?root,
            listeners = record.listener_count(),
            marked = record.marked.len(),
            "bound"
        );
        self.records.lock().insert(root, record);
        Ok(())
    }

    /// Remove everything `bind` installed on `root`.
    ///
    /// Returns `false` if `root` was not bound.
    pub fn unbind(&self, doc: &mut Document, root: NodeId) -> bool {
        let Some(record) = self.records.lock().remove(&root) else {
            return false;
        };
        let listeners = record.listener_count();
        record.release(doc);
        tracing::debug!(target: targets::DELEGATE, ?root, listeners, "unbound");
        true
    }

    /// Drop records whose root no longer exists. Returns how many were dropped.
    pub fn prune(&self, doc: &Document) -> usize {
        let mut records = self.records.lock();
        let before = records.len();
        records.retain(|&root, _| doc.contains(root));
        let pruned = before - records.len();
        if pruned > 0 {
            tracing::debug!(target: targets::DELEGATE, pruned, "pruned stale bindings");
        }
        pruned
    }

    /// Check if `root` has a binding.
    pub fn is_bound(&self, root: NodeId) -> bool {
        self.records.lock().contains_key(&root)
    }

    /// Number of native listeners installed on `root`, hover pair included.
    pub fn listener_count(&self, root: NodeId) -> usize {
        self.records
            .lock()
            .get(&root)
            .map_or(0, BindingRecord::listener_count)
    }

    /// The event types bound on `root`, in binding order.
    pub fn bound_event_types(&self, root: NodeId) -> Vec<String> {
        self.records.lock().get(&root).map_or_else(Vec::new, |record| {
            record.entries.iter().map(|e| e.event_type.clone()).collect()
        })
    }

    /// The selectors bound for `event_type` on `root`, in binding order.
    pub fn selectors(&self, root: NodeId, event_type: &str) -> Vec<String> {
        self.records
            .lock()
            .get(&root)
            .and_then(|record| record.entries.iter().find(|e| e.event_type == event_type))
            .map_or_else(Vec::new, |entry| entry.selectors.clone())
    }

    /// The node currently highlighted by hover on `root`.
    pub fn active_node(&self, root: NodeId) -> Option<NodeId> {
        self.records
            .lock()
            .get(&root)
            .and_then(|record| record.hover.state.current())
    }

    /// Number of bound roots.
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Check if no root is bound.
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}
