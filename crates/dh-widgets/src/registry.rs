//! Named component factories.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use dh_widgets_core::Document;

use crate::component::{Component, Environment, ListView, MetricCard, Panel, RenderRequest, Renderer, Widget};
use crate::error::{RenderError, Result};

/// Creates a fresh component.
pub type ComponentFactory = Arc<dyn Fn() -> Box<dyn Component> + Send + Sync>;

/// Maps component names to factories.
///
/// ```
/// use dh_widgets::registry::ComponentRegistry;
///
/// let registry = ComponentRegistry::default();
/// assert_eq!(registry.names(), vec!["list-view", "metric-card", "panel"]);
/// assert_eq!(registry.create("panel").unwrap().name(), "panel");
/// assert!(registry.create("chart").is_err());
/// ```
#[derive(Clone)]
pub struct ComponentRegistry {
    factories: BTreeMap<String, ComponentFactory>,
}

impl ComponentRegistry {
    /// A registry with no components.
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// A registry with the built-in components.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register_renderer::<Panel>();
        registry.register_renderer::<ListView>();
        registry.register_renderer::<MetricCard>();
        registry
    }

    /// Register `factory` under `name`, replacing any earlier factory.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn Component> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
    }

    /// Register a renderer under its own name.
    pub fn register_renderer<R>(&mut self)
    where
        R: Renderer + Default + 'static,
    {
        self.register(R::NAME, || Box::new(Widget::<R>::default()));
    }

    /// Create a new component by name.
    pub fn create(&self, name: &str) -> Result<Box<dyn Component>> {
        self.factories
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| RenderError::UnknownComponent(name.to_string()))
    }

    /// Create a component by name and render it.
    pub fn render(
        &self,
        name: &str,
        doc: &mut Document,
        env: &Environment,
        request: RenderRequest,
    ) -> Result<Box<dyn Component>> {
        let mut component = self.create(name)?;
        component.render(doc, env, request)?;
        Ok(component)
    }

    /// Check if a name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("names", &self.names())
            .finish()
    }
}
