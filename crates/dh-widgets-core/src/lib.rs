//! Core systems for dh-widgets.
//!
//! This crate provides the foundation every widget renders into:
//!
//! - **Document Tree**: Arena-backed nodes with classes, attributes and
//!   attached properties ([`Document`], [`NodeId`])
//! - **Events**: Listener registration and bubbling dispatch ([`DomEvent`])
//! - **Deferred Tasks**: Work queued for "later in the event loop" ([`TaskQueue`])
//! - **Logging**: `tracing` targets and a tree visualizer
//!
//! # Example
//!
//! ```
//! use dh_widgets_core::{Document, DomEvent, event_types, listener};
//!
//! let mut doc = Document::new();
//! let card = doc.create_element("div");
//! doc.append_child(doc.body(), card).unwrap();
//!
//! doc.add_event_listener(card, event_types::CLICK, listener(|doc, event| {
//!     doc.add_class(event.target, "clicked").unwrap();
//! }))
//! .unwrap();
//!
//! doc.dispatch_event(&DomEvent::click(card));
//! assert!(doc.has_class(card, "clicked"));
//! ```

pub mod dom;
mod error;
pub mod event;
pub mod logging;
mod task;

pub use dom::{Document, NodeId, NodeKind, SelfAndAncestors};
pub use error::{DomError, DomResult};
pub use event::{event_types, listener, DomEvent, Listener, ListenerId};
pub use logging::{DocumentTreeDebug, TreeStyle};
pub use task::{TaskId, TaskQueue};
