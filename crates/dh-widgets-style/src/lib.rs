//! Styling support for dh-widgets.
//!
//! This crate does not compute styles. It provides the pieces of the styling
//! layer that widgets and the event delegation engine rely on:
//!
//! - **Class names**: Namespaced class strings and OR-selectors ([`class_name`])
//! - **Selectors**: A `cssparser`-based selector parser and a matcher that
//!   runs against the document tree ([`selector`])
//! - **Stylesheets**: Idempotent `<link>` injection ([`StyleInjector`])
//! - **Icons**: Placeholders with deferred hydration ([`IconEngine`])
//!
//! # Example
//!
//! ```
//! use dh_widgets_core::Document;
//! use dh_widgets_style::prelude::*;
//!
//! let mut doc = Document::new();
//! let body = doc.body();
//! let item = doc.create_element("li");
//! doc.set_class_name(item, &make_class_name(["list-item"], ())).unwrap();
//! doc.append_child(body, item).unwrap();
//!
//! let selector = parse_selector_list(&make_selector_class_name(["list-item"], ())).unwrap();
//! assert!(SelectorMatcher::matches_any(&doc, item, &selector));
//! ```

pub mod class_name;
pub mod icon;
pub mod selector;
pub mod stylesheet;

mod error;

pub use error::{Error, Result};
pub use icon::{FontIconEngine, IconEngine, IconLoad};
pub use stylesheet::StyleInjector;

/// Prelude module with commonly used types.
pub mod prelude {
    pub use crate::class_name::{ClassNamer, ClassTokens, make_class_name, make_selector_class_name};
    pub use crate::icon::{FontIconEngine, IconEngine, IconLoad};
    pub use crate::selector::{SelectorList, SelectorMatcher, parse_selector_list};
    pub use crate::stylesheet::StyleInjector;
}
