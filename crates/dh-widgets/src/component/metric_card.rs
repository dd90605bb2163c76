//! Grid of metric tiles.

use serde_json::{Value, json};

use dh_widgets_core::logging::targets;
use dh_widgets_core::{Document, NodeId};
use dh_widgets_style::class_name::prefixed;

use super::{Environment, RenderContext, Renderer, append_element, append_text, display_value};
use crate::delegate::mark_data_item;
use crate::error::Result;

/// Direction of a metric's change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trend {
    /// Increasing.
    Up,
    /// Decreasing.
    Down,
    /// Unchanged.
    Flat,
}

impl Trend {
    /// Parse `"up"`, `"down"` or `"flat"`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            "flat" => Some(Self::Flat),
            _ => None,
        }
    }

    /// Lowercase name, as used in class and icon names.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Flat => "flat",
        }
    }
}

/// Tiles with a `label`, a `value`, an optional `unit` and an optional
/// `trend`.
///
/// The `columns` option sets the grid width (default 2).
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricCard;

impl MetricCard {
    /// Default grid width.
    pub const DEFAULT_COLUMNS: u64 = 2;
}

impl Renderer for MetricCard {
    const NAME: &'static str = "metric-card";
    const CLASS: &'static str = "card";
    const STYLESHEET: &'static str = "dh-card.css";

    fn defaults(&self) -> Value {
        json!({ "columns": Self::DEFAULT_COLUMNS })
    }

    fn render_body(
        &self,
        doc: &mut Document,
        env: &Environment,
        body: NodeId,
        ctx: &RenderContext,
    ) -> Result<()> {
        let columns = ctx
            .config
            .uint("columns")
            .filter(|&c| c > 0)
            .unwrap_or(Self::DEFAULT_COLUMNS);
        let grid = append_element(doc, body, "div", "card-grid")?;
        doc.set_attribute(grid, "data-columns", columns.to_string())?;

        for (index, item) in ctx.view_data.iter().enumerate() {
            let tile = append_element(doc, grid, "div", "card-tile")?;
            mark_data_item(doc, tile, index)?;

            append_text(doc, tile, "div", "card-label", &display_value(&item["label"]))?;
            let value = append_text(doc, tile, "div", "card-value", &display_value(&item["value"]))?;
            if let Some(unit) = item.get("unit").filter(|u| !u.is_null()) {
                append_text(doc, value, "span", "card-unit", &display_value(unit))?;
            }

            if let Some(raw) = item.get("trend").and_then(Value::as_str) {
                match Trend::parse(raw) {
                    Some(trend) => {
                        doc.add_class(tile, &prefixed(&format!("card-trend-{}", trend.as_str())))?;
                        let icon = env.icons.get_icon(doc, &format!("trend-{}", trend.as_str()))?;
                        doc.append_child(tile, icon)?;
                    }
                    None => {
                        tracing::warn!(target: targets::RENDER, index, trend = raw, "unknown trend ignored");
                    }
                }
            }
        }
        Ok(())
    }
}
