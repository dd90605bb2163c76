//! Icon placeholders and deferred icon hydration.
//!
//! Renderers never build icon markup themselves. They ask an [`IconEngine`]
//! for a placeholder element while building the tree and call
//! [`IconEngine::after_render`] once the tree is in place. Hydration then
//! happens on the document's task queue, so a renderer returns before any
//! icon work is done.
//!
//! # Example
//!
//! ```
//! use dh_widgets_core::Document;
//! use dh_widgets_style::{FontIconEngine, IconEngine};
//!
//! let mut doc = Document::new();
//! let engine = FontIconEngine::default();
//!
//! let body = doc.body();
//! let icon = engine.get_icon(&mut doc, "star").unwrap();
//! doc.append_child(body, icon).unwrap();
//!
//! let load = engine.after_render(&mut doc, body);
//! assert!(!load.is_complete());
//!
//! doc.run_pending_tasks();
//! assert!(load.is_complete());
//! assert!(doc.has_class(icon, "dh-icon-star"));
//! ```

use std::sync::Arc;

use parking_lot::Mutex;

use dh_widgets_core::logging::targets;
use dh_widgets_core::{Document, NodeId};

use crate::Result;
use crate::class_name::prefixed;
use crate::stylesheet::StyleInjector;

/// Class carried by every icon placeholder.
pub const ICON_CLASS: &str = "dh-icon";
/// Attribute holding the icon name on a placeholder.
pub const ICON_NAME_ATTRIBUTE: &str = "data-icon";
/// Attribute set once a placeholder has been hydrated.
pub const ICON_READY_ATTRIBUTE: &str = "data-icon-ready";
/// Stylesheet of the default icon font.
pub const DEFAULT_ICON_FONT: &str = "dh-icons.css";

/// Creates icon placeholders and hydrates them after render.
pub trait IconEngine: Send + Sync {
    /// Create a detached placeholder element for the icon `name`.
    fn get_icon(&self, doc: &mut Document, name: &str) -> Result<NodeId>;

    /// Schedule hydration of every placeholder under `root`.
    fn after_render(&self, doc: &mut Document, root: NodeId) -> IconLoad;
}

#[derive(Debug, Default)]
struct IconLoadState {
    complete: bool,
    hydrated: usize,
}

/// Completion handle for a scheduled hydration.
///
/// Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct IconLoad {
    state: Arc<Mutex<IconLoadState>>,
}

impl IconLoad {
    /// A handle for a hydration that has not run yet.
    pub fn pending() -> Self {
        Self::default()
    }

    /// Whether the hydration task has run.
    pub fn is_complete(&self) -> bool {
        self.state.lock().complete
    }

    /// Number of placeholders hydrated; zero until complete.
    pub fn hydrated(&self) -> usize {
        self.state.lock().hydrated
    }

    /// Mark the hydration as done.
    pub fn finish(&self, hydrated: usize) {
        let mut state = self.state.lock();
        state.complete = true;
        state.hydrated = hydrated;
    }
}

/// Icon engine backed by an icon font stylesheet.
///
/// The font's stylesheet is injected the first time a hydration finds at
/// least one placeholder, never before.
#[derive(Debug, Clone)]
pub struct FontIconEngine {
    font_href: String,
    injector: StyleInjector,
}

impl FontIconEngine {
    /// Create an engine for the icon font at `font_href`.
    pub fn new(font_href: impl Into<String>, injector: StyleInjector) -> Self {
        Self {
            font_href: font_href.into(),
            injector,
        }
    }

    /// The icon font's stylesheet href.
    pub fn font_href(&self) -> &str {
        &self.font_href
    }

    /// Hydrate every pending placeholder under `root`. Returns how many
    /// placeholders were hydrated.
    pub fn hydrate(&self, doc: &mut Document, root: NodeId) -> Result<usize> {
        if !doc.contains(root) {
            return Ok(0);
        }

        let placeholders: Vec<(NodeId, String)> = std::iter::once(root)
            .chain(doc.descendants(root))
            .filter(|&n| doc.has_class(n, ICON_CLASS))
            .filter(|&n| doc.attribute(n, ICON_READY_ATTRIBUTE).is_none())
            .filter_map(|n| Some((n, doc.attribute(n, ICON_NAME_ATTRIBUTE)?.to_string())))
            .collect();

        if placeholders.is_empty() {
            return Ok(0);
        }

        self.injector.ensure(doc, &self.font_href)?;

        for (node, name) in &placeholders {
            doc.add_class(*node, &prefixed(&format!("icon-{name}")))?;
            doc.set_attribute(*node, ICON_READY_ATTRIBUTE, "true")?;
        }
        Ok(placeholders.len())
    }
}

impl Default for FontIconEngine {
    fn default() -> Self {
        Self::new(DEFAULT_ICON_FONT, StyleInjector::new())
    }
}

impl IconEngine for FontIconEngine {
    fn get_icon(&self, doc: &mut Document, name: &str) -> Result<NodeId> {
        let icon = doc.create_element("i");
        doc.set_class_name(icon, ICON_CLASS)?;
        doc.set_attribute(icon, ICON_NAME_ATTRIBUTE, name)?;
        Ok(icon)
    }

    fn after_render(&self, doc: &mut Document, root: NodeId) -> IconLoad {
        let load = IconLoad::pending();
        let handle = load.clone();
        let engine = self.clone();

        doc.post_task(move |doc| {
            let hydrated = match engine.hydrate(doc, root) {
                Ok(count) => count,
                Err(error) => {
                    tracing::warn!(target: targets::STYLE, ?root, %error, "icon hydration failed");
                    0
                }
            };
            tracing::debug!(target: targets::STYLE, ?root, hydrated, "hydrated icons");
            handle.finish(hydrated);
        });

        load
    }
}
