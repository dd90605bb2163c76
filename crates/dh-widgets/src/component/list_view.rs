//! Ordered list of titled items.

use serde_json::{Value, json};

use dh_widgets_core::{Document, NodeId};

use super::{Environment, RenderContext, Renderer, append_element, append_text, display_value};
use crate::delegate::mark_data_item;
use crate::error::Result;

/// A list of items with a `title`, an optional `desc` and an optional
/// `icon`.
///
/// With the `ordered` option each item gets a rank badge and the list is
/// rendered as an `<ol>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListView;

impl Renderer for ListView {
    const NAME: &'static str = "list-view";
    const CLASS: &'static str = "list";
    const STYLESHEET: &'static str = "dh-list.css";

    fn defaults(&self) -> Value {
        json!({ "ordered": false })
    }

    fn render_body(
        &self,
        doc: &mut Document,
        env: &Environment,
        body: NodeId,
        ctx: &RenderContext,
    ) -> Result<()> {
        let ordered = ctx.config.flag("ordered");
        let list = append_element(doc, body, if ordered { "ol" } else { "ul" }, "list-items")?;

        for (index, item) in ctx.view_data.iter().enumerate() {
            let row = append_element(doc, list, "li", "list-item")?;
            mark_data_item(doc, row, index)?;

            if ordered {
                append_text(doc, row, "span", "list-rank", &(index + 1).to_string())?;
            }
            if let Some(name) = item.get("icon").and_then(Value::as_str).filter(|n| !n.is_empty()) {
                let icon = env.icons.get_icon(doc, name)?;
                doc.append_child(row, icon)?;
            }
            append_text(doc, row, "div", "list-title", &display_value(&item["title"]))?;
            if let Some(desc) = item.get("desc").filter(|d| !d.is_null()) {
                append_text(doc, row, "div", "list-desc", &display_value(desc))?;
            }
        }
        Ok(())
    }
}
