//! Mapping rendered nodes back to view-data records.

use serde_json::Value;

use dh_widgets_core::logging::targets;
use dh_widgets_core::{Document, DomResult, NodeId};

use super::{DATA_ITEM_CLASS, INDEX_ATTRIBUTE, INDEX_PROPERTY};

/// The record an interaction resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ResolvedItem<'a> {
    /// Index into the view data, if one could be read.
    pub index: Option<usize>,
    /// The record at `index`; `None` when out of range.
    pub data: Option<&'a Value>,
}

/// Mark `node` as the rendered form of `view_data[index]`.
///
/// Sets the data-item marker class, the numeric index property and the
/// textual index attribute.
pub fn mark_data_item(doc: &mut Document, node: NodeId, index: usize) -> DomResult<()> {
    doc.add_class(node, DATA_ITEM_CLASS)?;
    doc.set_property(node, INDEX_PROPERTY, index)?;
    doc.set_attribute(node, INDEX_ATTRIBUTE, index.to_string())
}

/// Find the data item `node` belongs to.
///
/// Looks for the nearest data-item ancestor (inclusive), reads its index
/// (property first, then attribute) and looks the index up in `view_data`.
pub fn resolve_item<'a>(doc: &Document, node: NodeId, view_data: &'a [Value]) -> ResolvedItem<'a> {
    let Some(item) = doc.closest_with_class(node, DATA_ITEM_CLASS) else {
        return ResolvedItem::default();
    };

    let index = match doc.property::<usize>(item, INDEX_PROPERTY) {
        Some(&index) => Some(index),
        None => doc
            .attribute(item, INDEX_ATTRIBUTE)
            .and_then(|raw| match raw.trim().parse::<usize>() {
                Ok(index) => Some(index),
                Err(_) => {
                    tracing::warn!(target: targets::DELEGATE, ?item, raw, "unparsable item index");
                    None
                }
            }),
    };

    match index {
        Some(index) => ResolvedItem {
            index: Some(index),
            data: view_data.get(index),
        },
        None => ResolvedItem::default(),
    }
}
