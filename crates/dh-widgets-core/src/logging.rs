//! Logging and debugging facilities.
//!
//! dh-widgets uses the `tracing` crate for instrumentation. The library never
//! installs a subscriber; applications and tests choose their own:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("dh_widgets::delegate=debug")
//!     .init();
//! ```
//!
//! Use [`DocumentTreeDebug`] to print a document subtree while debugging.

use std::fmt::Write as FmtWrite;

use crate::dom::{Document, NodeId, NodeKind};

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Document tree mutations.
    pub const DOM: &str = "dh_widgets::dom";
    /// Event listener registration and dispatch.
    pub const EVENT: &str = "dh_widgets::event";
    /// Delegated event binding.
    pub const DELEGATE: &str = "dh_widgets::delegate";
    /// Component rendering.
    pub const RENDER: &str = "dh_widgets::render";
    /// Stylesheet and icon assets.
    pub const STYLE: &str = "dh_widgets::style";
}

/// Style options for tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
}

/// Debug utility for visualizing a document subtree.
#[derive(Debug, Clone, Default)]
pub struct DocumentTreeDebug {
    style: TreeStyle,
    show_ids: bool,
}

impl DocumentTreeDebug {
    /// Create a visualizer with Unicode branches and no node IDs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the given branch style.
    pub fn with_style(mut self, style: TreeStyle) -> Self {
        self.style = style;
        self
    }

    /// Append each node's arena ID.
    pub fn with_ids(mut self, show_ids: bool) -> Self {
        self.show_ids = show_ids;
        self
    }

    /// Format the subtree rooted at `root`, one node per line.
    pub fn format_subtree(&self, doc: &Document, root: NodeId) -> String {
        let mut output = String::new();
        self.format_into(doc, root, "", true, true, &mut output);
        output
    }

    fn format_into(
        &self,
        doc: &Document,
        id: NodeId,
        indent: &str,
        is_last: bool,
        is_root: bool,
        output: &mut String,
    ) {
        let Some(kind) = doc.kind(id) else {
            return;
        };
        let (tee, corner, pipe) = match self.style {
            TreeStyle::Ascii => ("+-- ", "`-- ", "|   "),
            TreeStyle::Unicode => ("\u{251c}\u{2500}\u{2500} ", "\u{2514}\u{2500}\u{2500} ", "\u{2502}   "),
        };

        if !is_root {
            output.push_str(indent);
            output.push_str(if is_last { corner } else { tee });
        }
        match kind {
            NodeKind::Element { tag } => {
                output.push_str(tag);
                if let Some(element_id) = doc.element_id(id) {
                    let _ = write!(output, "#{element_id}");
                }
                for class in doc.classes(id) {
                    let _ = write!(output, ".{class}");
                }
            }
            NodeKind::Text(text) => {
                let _ = write!(output, "{text:?}");
            }
            NodeKind::Markup(markup) => {
                let _ = write!(output, "<markup {} bytes>", markup.len());
            }
        }
        if self.show_ids {
            let _ = write!(output, " [{id:?}]");
        }
        output.push('\n');

        let child_indent = if is_root {
            String::new()
        } else if is_last {
            format!("{indent}    ")
        } else {
            format!("{indent}{pipe}")
        };
        let children = doc.children(id).map(<[NodeId]>::to_vec).unwrap_or_default();
        let count = children.len();
        for (i, child) in children.into_iter().enumerate() {
            self.format_into(doc, child, &child_indent, i + 1 == count, false, output);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_ascii_tree() {
        let mut doc = Document::new();
        let body = doc.body();
        let list = doc.create_element("ul");
        doc.set_attribute(list, "id", "items").unwrap();
        doc.append_child(body, list).unwrap();
        for label in ["a", "b"] {
            let item = doc.create_element("li");
            doc.add_class(item, "row").unwrap();
            doc.set_text_content(item, label).unwrap();
            doc.append_child(list, item).unwrap();
        }

        let tree = DocumentTreeDebug::new()
            .with_style(TreeStyle::Ascii)
            .format_subtree(&doc, list);
        assert_eq!(
            tree,
            "ul#items\n+-- li.row\n|   `-- \"a\"\n`-- li.row\n    `-- \"b\"\n"
        );
    }
}
