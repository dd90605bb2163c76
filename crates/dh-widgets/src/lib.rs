//! dh-widgets: schema-driven widgets with delegated events.
//!
//! Widgets render records into a [`Document`](dh_widgets_core::Document)
//! and attach behavior through a single delegated listener per event type:
//!
//! - **Options**: JSON defaults deep-merged with caller overrides ([`options`])
//! - **Schemas**: Declarative record-to-view mapping ([`schema`])
//! - **Delegation**: Nearest-match event routing and hover highlighting ([`delegate`])
//! - **Components**: Panel, list view and metric card ([`component`])
//! - **Registry**: Components created by name ([`registry`])
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use parking_lot::Mutex;
//! use serde_json::json;
//! use dh_widgets::prelude::*;
//! use dh_widgets_core::{Document, DomEvent, event_types};
//!
//! let mut doc = Document::new();
//! let body = doc.body();
//! let host = doc.create_element("div");
//! doc.set_attribute(host, "id", "todo").unwrap();
//! doc.append_child(body, host).unwrap();
//!
//! let clicked = Arc::new(Mutex::new(None));
//! let sink = clicked.clone();
//! let options = RenderOptions::new().on(EventSpec::new(
//!     event_types::CLICK,
//!     ".dh-list-item",
//!     move |_doc, event| *sink.lock() = event.index,
//! ));
//!
//! let env = Environment::new();
//! let registry = ComponentRegistry::new();
//! registry
//!     .render(
//!         "list-view",
//!         &mut doc,
//!         &env,
//!         RenderRequest::new("todo")
//!             .with_data(vec![json!({"title": "Write"}), json!({"title": "Ship"})])
//!             .with_options(options),
//!     )
//!     .unwrap();
//!
//! let items = doc.get_element_by_id("todo").map(|root| doc.descendants(root)).unwrap();
//! let ship = items
//!     .into_iter()
//!     .find(|&n| doc.text_content(n) == "Ship" && doc.has_class(n, "dh-list-title"))
//!     .unwrap();
//! doc.dispatch_event(&DomEvent::click(ship));
//! assert_eq!(*clicked.lock(), Some(1));
//! ```

pub mod component;
pub mod delegate;
pub mod options;
pub mod registry;
pub mod schema;

mod error;

pub use error::{DelegateError, DelegateResult, RenderError, Result};

/// Prelude module with commonly used types.
pub mod prelude {
    pub use crate::component::{
        Component, CustomSlots, Environment, ListView, MetricCard, Panel, RenderContext,
        RenderRequest, Renderer, SlotContent, Trend, Widget,
    };
    pub use crate::delegate::{DelegateEvent, DelegationEngine, EventSpec, handler};
    pub use crate::options::{RenderConfig, RenderOptions, deep_merge};
    pub use crate::registry::ComponentRegistry;
    pub use crate::schema::{FieldMapping, Schema};
    pub use crate::{DelegateError, RenderError};
}
