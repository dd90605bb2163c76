//! Label/value panel.

use dh_widgets_core::{Document, NodeId};

use super::{Environment, RenderContext, Renderer, append_element, append_text, display_value};
use crate::delegate::mark_data_item;
use crate::error::Result;

/// A panel of `label`/`value` rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct Panel;

impl Renderer for Panel {
    const NAME: &'static str = "panel";
    const CLASS: &'static str = "panel";
    const STYLESHEET: &'static str = "dh-panel.css";

    fn render_body(
        &self,
        doc: &mut Document,
        _env: &Environment,
        body: NodeId,
        ctx: &RenderContext,
    ) -> Result<()> {
        for (index, item) in ctx.view_data.iter().enumerate() {
            let row = append_element(doc, body, "div", "panel-item")?;
            mark_data_item(doc, row, index)?;
            append_text(doc, row, "span", "panel-label", &display_value(&item["label"]))?;
            append_text(doc, row, "span", "panel-value", &display_value(&item["value"]))?;
        }
        Ok(())
    }
}
