//! Selector matching against a [`Document`].

use dh_widgets_core::{Document, NodeId};

use super::{Combinator, PseudoClass, Selector, SelectorList, SelectorPart, TypeSelector};

/// Everything a compound selector needs to know about one element.
#[derive(Debug, Clone, Default)]
pub struct ElementMatchContext<'a> {
    /// Lowercase tag name.
    pub tag: &'a str,
    /// The element's `id` attribute.
    pub element_id: Option<&'a str>,
    /// The element's classes.
    pub classes: &'a [String],
    /// Position among element siblings.
    pub sibling_info: Option<SiblingInfo>,
    /// Number of child nodes of any kind (for :empty).
    pub child_count: usize,
}

impl<'a> ElementMatchContext<'a> {
    /// Build the context for `node`. `None` for text/markup and removed nodes.
    pub fn from_document(doc: &'a Document, node: NodeId) -> Option<Self> {
        let tag = doc.tag_name(node)?;
        let child_count = doc.children(node).map_or(0, <[NodeId]>::len);
        let sibling_info = doc.parent(node).and_then(|parent| {
            let siblings: Vec<NodeId> = doc
                .children(parent)
                .ok()?
                .iter()
                .copied()
                .filter(|&n| doc.is_element(n))
                .collect();
            let index = siblings.iter().position(|&n| n == node)?;
            Some(SiblingInfo {
                index,
                count: siblings.len(),
            })
        });

        Some(Self {
            tag,
            element_id: doc.element_id(node),
            classes: doc.classes(node),
            sibling_info,
            child_count,
        })
    }
}

/// Sibling position information.
#[derive(Debug, Clone, Copy)]
pub struct SiblingInfo {
    /// Zero-based index among element siblings.
    pub index: usize,
    /// Total number of element siblings (including self).
    pub count: usize,
}

impl SiblingInfo {
    /// Returns true if this is the first sibling.
    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    /// Returns true if this is the last sibling.
    pub fn is_last(&self) -> bool {
        self.index + 1 == self.count
    }

    /// Returns true if this is the only child.
    pub fn is_only(&self) -> bool {
        self.count == 1
    }
}

/// Selector matching engine.
pub struct SelectorMatcher;

impl SelectorMatcher {
    /// Check if a compound selector matches an element context.
    pub fn part_matches(part: &SelectorPart, context: &ElementMatchContext<'_>) -> bool {
        if let Some(TypeSelector::Type(name)) = &part.type_selector {
            if !name.eq_ignore_ascii_case(context.tag) {
                return false;
            }
        }

        if let Some(id) = &part.id {
            if context.element_id != Some(id.as_str()) {
                return false;
            }
        }

        // All classes must be present
        for class in &part.classes {
            if !context.classes.iter().any(|c| c == class) {
                return false;
            }
        }

        part.pseudo_classes
            .iter()
            .all(|pseudo| Self::pseudo_matches(pseudo, context))
    }

    fn pseudo_matches(pseudo: &PseudoClass, context: &ElementMatchContext<'_>) -> bool {
        match pseudo {
            PseudoClass::FirstChild => context.sibling_info.is_some_and(|s| s.is_first()),
            PseudoClass::LastChild => context.sibling_info.is_some_and(|s| s.is_last()),
            PseudoClass::OnlyChild => context.sibling_info.is_some_and(|s| s.is_only()),
            PseudoClass::NthChild(expr) => {
                context.sibling_info.is_some_and(|s| expr.matches(s.index))
            }
            PseudoClass::Empty => context.child_count == 0,
            PseudoClass::Not(inner) => !Self::part_matches(inner, context),
        }
    }

    /// Check if a full selector, including combinators, matches `node`.
    pub fn matches(doc: &Document, node: NodeId, selector: &Selector) -> bool {
        match selector.parts.len() {
            0 => false,
            len => Self::matches_from(doc, node, selector, len - 1),
        }
    }

    /// Check if any selector in the list matches `node`.
    pub fn matches_any(doc: &Document, node: NodeId, list: &SelectorList) -> bool {
        list.selectors()
            .iter()
            .any(|selector| Self::matches(doc, node, selector))
    }

    /// Every element under `root` (inclusive) matching the list, in document order.
    pub fn select_all(doc: &Document, root: NodeId, list: &SelectorList) -> Vec<NodeId> {
        std::iter::once(root)
            .chain(doc.descendants(root))
            .filter(|&node| Self::matches_any(doc, node, list))
            .collect()
    }

    /// Match `selector.parts[index]` against `node`, then walk left through
    /// the combinators. Descendant and general-sibling steps backtrack.
    fn matches_from(doc: &Document, node: NodeId, selector: &Selector, index: usize) -> bool {
        let Some(context) = ElementMatchContext::from_document(doc, node) else {
            return false;
        };
        if !Self::part_matches(&selector.parts[index], &context) {
            return false;
        }
        if index == 0 {
            return true;
        }

        let next = index - 1;
        match selector.combinators[next] {
            Combinator::Descendant => doc
                .self_and_ancestors(node)
                .skip(1)
                .any(|ancestor| Self::matches_from(doc, ancestor, selector, next)),
            Combinator::Child => doc
                .parent(node)
                .is_some_and(|parent| Self::matches_from(doc, parent, selector, next)),
            Combinator::AdjacentSibling => previous_element_siblings(doc, node)
                .first()
                .is_some_and(|&sibling| Self::matches_from(doc, sibling, selector, next)),
            Combinator::GeneralSibling => previous_element_siblings(doc, node)
                .into_iter()
                .any(|sibling| Self::matches_from(doc, sibling, selector, next)),
        }
    }
}

/// Element siblings before `node`, nearest first.
fn previous_element_siblings(doc: &Document, node: NodeId) -> Vec<NodeId> {
    let Some(parent) = doc.parent(node) else {
        return Vec::new();
    };
    let Ok(siblings) = doc.children(parent) else {
        return Vec::new();
    };
    let position = siblings.iter().position(|&n| n == node).unwrap_or(0);
    siblings[..position]
        .iter()
        .rev()
        .copied()
        .filter(|&n| doc.is_element(n))
        .collect()
}
