//! Delegated event binding.
//!
//! Rather than a listener per item, a rendered widget gets one listener per
//! event type on its root. When an event bubbles up to the root, the engine
//! walks from the event target towards the root and hands the event to the
//! handlers of the first selector that matches, together with the view-data
//! record the matched node was rendered from.
//!
//! Item nodes are tied to their records by [`mark_data_item`]. Nodes that
//! match a bound selector get [`EVENT_TARGET_CLASS`], which is also what
//! the hover sub-engine highlights.

mod engine;
pub mod hover;
mod resolve;

pub use engine::{DelegateEvent, DelegateHandler, DelegationEngine, EventSpec, handler};
pub use hover::HoverState;
pub use resolve::{ResolvedItem, mark_data_item, resolve_item};

/// Marker for elements that match a bound selector.
pub const EVENT_TARGET_CLASS: &str = "dh-event-target";
/// Marker for elements rendered from a view-data record.
pub const DATA_ITEM_CLASS: &str = "dh-data-item";
/// Class of the element under the pointer.
pub const ACTIVE_CLASS: &str = "dh-active";
/// Numeric index property on data items.
pub const INDEX_PROPERTY: &str = "dhIndex";
/// Textual index attribute on data items.
pub const INDEX_ATTRIBUTE: &str = "data-dh-index";
