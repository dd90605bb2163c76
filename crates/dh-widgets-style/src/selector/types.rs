//! The parsed form of event selectors.
//!
//! Only what [`parse_selector_list`](super::parse_selector_list) produces and
//! [`SelectorMatcher`](super::SelectorMatcher) consumes lives here. Values
//! print back as normalized CSS, which is what error messages and
//! diagnostics show.

use std::fmt;

/// Comma-separated alternatives. Matches when any member matches.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SelectorList(pub Vec<Selector>);

impl SelectorList {
    /// The alternatives in source order.
    pub fn selectors(&self) -> &[Selector] {
        &self.0
    }
}

impl fmt::Display for SelectorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut separator = "";
        for selector in &self.0 {
            write!(f, "{separator}{selector}")?;
            separator = ", ";
        }
        Ok(())
    }
}

/// Compound selectors joined by combinators, written left to right.
///
/// `combinators[i]` sits between `parts[i]` and `parts[i + 1]`, so a
/// well-formed selector has one combinator fewer than it has parts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Selector {
    pub parts: Vec<SelectorPart>,
    pub combinators: Vec<Combinator>,
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some((first, rest)) = self.parts.split_first() else {
            return Ok(());
        };
        write!(f, "{first}")?;
        for (combinator, part) in self.combinators.iter().zip(rest) {
            write!(f, "{}{part}", combinator.as_css())?;
        }
        Ok(())
    }
}

/// One compound selector such as `li.dh-list-item:first-child`.
///
/// Every present constraint must hold for an element to match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SelectorPart {
    pub type_selector: Option<TypeSelector>,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub pseudo_classes: Vec<PseudoClass>,
}

impl SelectorPart {
    /// Whether nothing has been parsed into this part yet.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl fmt::Display for SelectorPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(type_selector) = &self.type_selector {
            f.write_str(match type_selector {
                TypeSelector::Universal => "*",
                TypeSelector::Type(tag) => tag,
            })?;
        }
        if let Some(id) = &self.id {
            write!(f, "#{id}")?;
        }
        self.classes.iter().try_for_each(|class| write!(f, ".{class}"))?;
        self.pseudo_classes
            .iter()
            .try_for_each(|pseudo| write!(f, ":{pseudo}"))
    }
}

/// Tag constraint of a compound selector.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeSelector {
    /// `*`
    Universal,
    /// A lowercase tag name.
    Type(String),
}

/// How two adjacent compound selectors relate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Combinator {
    /// Whitespace: the left part matches some ancestor.
    Descendant,
    /// `>`: the left part matches the parent.
    Child,
    /// `+`: the left part matches the previous element sibling.
    AdjacentSibling,
    /// `~`: the left part matches any earlier element sibling.
    GeneralSibling,
}

impl Combinator {
    fn as_css(self) -> &'static str {
        match self {
            Self::Descendant => " ",
            Self::Child => " > ",
            Self::AdjacentSibling => " + ",
            Self::GeneralSibling => " ~ ",
        }
    }
}

/// Pseudo-classes that depend only on tree position.
///
/// Pointer state is tracked with the active class instead, so `:hover` and
/// friends are rejected by the parser.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PseudoClass {
    FirstChild,
    LastChild,
    OnlyChild,
    Empty,
    NthChild(NthExpr),
    Not(Box<SelectorPart>),
}

impl PseudoClass {
    /// Look up a pseudo-class that takes no argument. Case-insensitive.
    pub fn from_css(name: &str) -> Option<Self> {
        const SIMPLE: [(&str, PseudoClass); 4] = [
            ("first-child", PseudoClass::FirstChild),
            ("last-child", PseudoClass::LastChild),
            ("only-child", PseudoClass::OnlyChild),
            ("empty", PseudoClass::Empty),
        ];
        SIMPLE
            .into_iter()
            .find_map(|(css, pseudo)| name.eq_ignore_ascii_case(css).then_some(pseudo))
    }
}

impl fmt::Display for PseudoClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FirstChild => f.write_str("first-child"),
            Self::LastChild => f.write_str("last-child"),
            Self::OnlyChild => f.write_str("only-child"),
            Self::Empty => f.write_str("empty"),
            Self::NthChild(expr) => write!(f, "nth-child({expr})"),
            Self::Not(inner) => write!(f, "not({inner})"),
        }
    }
}

/// The `An+B` argument of `:nth-child`, with 1-based positions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NthExpr {
    pub a: i32,
    pub b: i32,
}

impl NthExpr {
    pub fn new(a: i32, b: i32) -> Self {
        Self { a, b }
    }

    /// Whether the element at zero-based `index` is selected, i.e. whether
    /// `index + 1 == a*n + b` for some `n >= 0`.
    pub fn matches(&self, index: usize) -> bool {
        let Ok(position) = i32::try_from(index + 1) else {
            return false;
        };
        let offset = position - self.b;
        match self.a {
            0 => offset == 0,
            a => offset % a == 0 && offset / a >= 0,
        }
    }
}

impl fmt::Display for NthExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.a, self.b) {
            (0, b) => write!(f, "{b}"),
            (a, 0) => write!(f, "{a}n"),
            (a, b) => write!(f, "{a}n{b:+}"),
        }
    }
}
