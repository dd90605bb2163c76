//! Render options and structural option merging.
//!
//! Component options are plain JSON. Each component has defaults, the
//! caller supplies overrides, and [`deep_merge`] combines the two before the
//! result is deserialized into a typed [`RenderConfig`].
//!
//! ```
//! use dh_widgets::options::deep_merge;
//! use serde_json::json;
//!
//! let merged = deep_merge(&json!({"a": {"x": 1, "y": 2}}), &json!({"a": {"y": 9, "z": 3}}));
//! assert_eq!(merged, json!({"a": {"x": 1, "y": 9, "z": 3}}));
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::component::{AfterRender, RenderContext};
use crate::delegate::EventSpec;
use dh_widgets_core::Document;

/// Merge `source` onto a copy of `target` and return the copy.
///
/// Nested objects are merged key by key. Any other value in `source`,
/// arrays included, replaces the value in `target` wholesale. Neither input
/// is modified.
pub fn deep_merge(target: &Value, source: &Value) -> Value {
    let mut merged = target.clone();
    deep_merge_into(&mut merged, source);
    merged
}

/// In-place form of [`deep_merge`].
///
/// A `source` that is not an object has no keys to merge and leaves
/// `target` untouched.
pub fn deep_merge_into(target: &mut Value, source: &Value) {
    let Value::Object(source) = source else {
        return;
    };
    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    let Value::Object(target) = target else {
        return;
    };

    for (key, value) in source {
        if value.is_object() {
            let slot = target
                .entry(key.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            deep_merge_into(slot, value);
        } else {
            target.insert(key.clone(), value.clone());
        }
    }
}

/// Defaults shared by every component.
pub fn base_defaults() -> Value {
    json!({
        "size": RenderConfig::DEFAULT_SIZE,
        "emptyText": RenderConfig::DEFAULT_EMPTY_TEXT,
    })
}

/// Typed view of a component's merged options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderConfig {
    /// Maximum number of records rendered.
    #[serde(default = "default_size")]
    pub size: usize,
    /// Text of the empty-state node.
    #[serde(default = "default_empty_text")]
    pub empty_text: String,
    /// Component-specific keys, kept as JSON.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_size() -> usize {
    RenderConfig::DEFAULT_SIZE
}

fn default_empty_text() -> String {
    RenderConfig::DEFAULT_EMPTY_TEXT.to_string()
}

impl RenderConfig {
    /// Default `size`.
    pub const DEFAULT_SIZE: usize = 5;
    /// Default `emptyText`.
    pub const DEFAULT_EMPTY_TEXT: &'static str = "No data";

    /// Deserialize a merged options object.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Merge `overrides` over `defaults` and deserialize the result.
    pub fn resolve(defaults: &Value, overrides: &Value) -> Result<Self, serde_json::Error> {
        Self::from_value(deep_merge(defaults, overrides))
    }

    /// A component-specific key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// A component-specific boolean key; `false` when absent or not a bool.
    pub fn flag(&self, key: &str) -> bool {
        self.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    /// A component-specific unsigned integer key.
    pub fn uint(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(Value::as_u64)
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            size: Self::DEFAULT_SIZE,
            empty_text: Self::DEFAULT_EMPTY_TEXT.to_string(),
            extra: Map::new(),
        }
    }
}

/// Everything a caller can configure on a render pass besides its data.
#[derive(Clone, Default)]
pub struct RenderOptions {
    /// JSON overrides merged over the component defaults.
    pub overrides: Value,
    /// Delegated event bindings.
    pub events: Vec<EventSpec>,
    /// Hook run once the render pass has completed.
    pub after_render: Option<AfterRender>,
}

impl RenderOptions {
    /// Options with no overrides, events or hook.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the JSON overrides.
    pub fn with_overrides(mut self, overrides: Value) -> Self {
        self.overrides = overrides;
        self
    }

    /// Add a delegated event binding.
    pub fn on(mut self, spec: EventSpec) -> Self {
        self.events.push(spec);
        self
    }

    /// Set the after-render hook.
    pub fn with_after_render<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Document, &RenderContext) + Send + Sync + 'static,
    {
        self.after_render = Some(std::sync::Arc::new(hook));
        self
    }
}

impl fmt::Debug for RenderOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderOptions")
            .field("overrides", &self.overrides)
            .field("events", &self.events)
            .field("after_render", &self.after_render.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_objects_merge() {
        let merged = deep_merge(&json!({"a": {"x": 1, "y": 2}}), &json!({"a": {"y": 9, "z": 3}}));
        assert_eq!(merged, json!({"a": {"x": 1, "y": 9, "z": 3}}));
    }

    #[test]
    fn arrays_are_replaced() {
        let merged = deep_merge(&json!({"arr": [1, 2]}), &json!({"arr": [9]}));
        assert_eq!(merged, json!({"arr": [9]}));
    }

    #[test]
    fn inputs_are_not_mutated() {
        let target = json!({"a": {"x": 1}});
        let source = json!({"a": {"y": 2}});
        let _ = deep_merge(&target, &source);
        assert_eq!(target, json!({"a": {"x": 1}}));
        assert_eq!(source, json!({"a": {"y": 2}}));
    }

    #[test]
    fn absent_or_scalar_targets_become_objects() {
        let merged = deep_merge(&json!({"b": 1}), &json!({"a": {"x": 1}, "b": {"y": 2}}));
        assert_eq!(merged, json!({"a": {"x": 1}, "b": {"y": 2}}));
    }

    #[test]
    fn scalars_overwrite_objects() {
        let merged = deep_merge(&json!({"a": {"x": 1}}), &json!({"a": null}));
        assert_eq!(merged, json!({"a": null}));
    }

    #[test]
    fn non_object_source_is_ignored() {
        let target = json!({"a": 1});
        assert_eq!(deep_merge(&target, &Value::Null), target);
        assert_eq!(deep_merge(&target, &json!([1, 2])), target);
    }

    #[test]
    fn config_defaults() {
        let config = RenderConfig::resolve(&base_defaults(), &Value::Null).unwrap();
        assert_eq!(config, RenderConfig::default());
        assert_eq!(config.size, 5);
        assert_eq!(config.empty_text, "No data");
    }

    #[test]
    fn config_keeps_component_keys() {
        let config = RenderConfig::resolve(
            &base_defaults(),
            &json!({"size": 2, "emptyText": "Nothing", "ordered": true, "columns": 3}),
        )
        .unwrap();
        assert_eq!(config.size, 2);
        assert_eq!(config.empty_text, "Nothing");
        assert!(config.flag("ordered"));
        assert_eq!(config.uint("columns"), Some(3));
        assert!(!config.flag("missing"));
    }

    #[test]
    fn invalid_config_is_an_error() {
        let result = RenderConfig::resolve(&base_defaults(), &json!({"size": "many"}));
        assert!(result.is_err());
    }
}
