//! Namespaced class-name generation.
//!
//! Widgets describe their parts with short semantic tokens (`"panel"`,
//! `"panel-item"`) and this module turns them into namespaced class names
//! (`"dh-panel"`) or OR-selectors (`".dh-panel,.dh-panel-item"`).
//!
//! ```
//! use dh_widgets_style::class_name::{make_class_name, make_selector_class_name};
//!
//! assert_eq!(make_class_name(["panel"], ["active"]), "dh-panel active");
//! assert_eq!(
//!     make_selector_class_name(["panel-item", "panel-header"], ()),
//!     ".dh-panel-item,.dh-panel-header"
//! );
//! ```

use std::borrow::Cow;

/// Namespace prefix applied to every library class.
pub const CLASS_PREFIX: &str = "dh-";

/// A single token or an ordered sequence of class tokens.
///
/// Empty tokens are kept here and dropped when the class name is built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassTokens<'a>(Vec<&'a str>);

impl<'a> ClassTokens<'a> {
    /// No tokens.
    pub fn none() -> Self {
        Self(Vec::new())
    }

    /// Iterate over the non-empty tokens.
    pub fn iter(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.0.iter().copied().filter(|t| !t.trim().is_empty())
    }
}

impl From<()> for ClassTokens<'_> {
    fn from(_: ()) -> Self {
        Self::none()
    }
}

impl<'a> From<&'a str> for ClassTokens<'a> {
    fn from(token: &'a str) -> Self {
        Self(vec![token])
    }
}

impl<'a> From<&'a String> for ClassTokens<'a> {
    fn from(token: &'a String) -> Self {
        Self(vec![token.as_str()])
    }
}

impl<'a> From<Option<&'a str>> for ClassTokens<'a> {
    fn from(token: Option<&'a str>) -> Self {
        Self(token.into_iter().collect())
    }
}

impl<'a, const N: usize> From<[&'a str; N]> for ClassTokens<'a> {
    fn from(tokens: [&'a str; N]) -> Self {
        Self(tokens.to_vec())
    }
}

impl<'a> From<&'a [&'a str]> for ClassTokens<'a> {
    fn from(tokens: &'a [&'a str]) -> Self {
        Self(tokens.to_vec())
    }
}

impl<'a> From<Vec<&'a str>> for ClassTokens<'a> {
    fn from(tokens: Vec<&'a str>) -> Self {
        Self(tokens)
    }
}

impl<'a> From<&'a [String]> for ClassTokens<'a> {
    fn from(tokens: &'a [String]) -> Self {
        Self(tokens.iter().map(String::as_str).collect())
    }
}

/// Builds class names and selectors under a fixed namespace prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassNamer {
    prefix: Cow<'static, str>,
}

impl ClassNamer {
    /// The library's own namer, using [`CLASS_PREFIX`].
    pub const DEFAULT: ClassNamer = ClassNamer {
        prefix: Cow::Borrowed(CLASS_PREFIX),
    };

    /// Create a namer with a custom prefix (e.g. `"acme-"`).
    pub fn new(prefix: impl Into<Cow<'static, str>>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// The namespace prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Prefix a single token.
    pub fn prefixed(&self, token: &str) -> String {
        format!("{}{}", self.prefix, token.trim())
    }

    fn tokens<'a>(
        &'a self,
        prefixed: &'a ClassTokens<'a>,
        raw: &'a ClassTokens<'a>,
    ) -> impl Iterator<Item = String> + 'a {
        prefixed
            .iter()
            .map(|t| self.prefixed(t))
            .chain(raw.iter().map(|t| t.trim().to_string()))
    }

    /// Space-joined class string: prefixed tokens first, then raw tokens.
    pub fn class_name<'a>(
        &self,
        prefixed: impl Into<ClassTokens<'a>>,
        raw: impl Into<ClassTokens<'a>>,
    ) -> String {
        let (prefixed, raw) = (prefixed.into(), raw.into());
        self.tokens(&prefixed, &raw).collect::<Vec<_>>().join(" ")
    }

    /// Comma-joined OR-selector of `.class` fragments.
    pub fn selector<'a>(
        &self,
        prefixed: impl Into<ClassTokens<'a>>,
        raw: impl Into<ClassTokens<'a>>,
    ) -> String {
        let (prefixed, raw) = (prefixed.into(), raw.into());
        self.tokens(&prefixed, &raw)
            .map(|class| format!(".{class}"))
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl Default for ClassNamer {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Prefix a single token with [`CLASS_PREFIX`].
pub fn prefixed(token: &str) -> String {
    ClassNamer::DEFAULT.prefixed(token)
}

/// Build a class string from prefixed and raw tokens.
pub fn make_class_name<'a>(
    prefixed: impl Into<ClassTokens<'a>>,
    raw: impl Into<ClassTokens<'a>>,
) -> String {
    ClassNamer::DEFAULT.class_name(prefixed, raw)
}

/// Build an OR-selector from prefixed and raw tokens.
pub fn make_selector_class_name<'a>(
    prefixed: impl Into<ClassTokens<'a>>,
    raw: impl Into<ClassTokens<'a>>,
) -> String {
    ClassNamer::DEFAULT.selector(prefixed, raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_name_prefixes_only_prefixed_tokens() {
        assert_eq!(make_class_name(["panel"], ["active"]), "dh-panel active");
        assert_eq!(make_class_name("panel", ()), "dh-panel");
        assert_eq!(make_class_name((), "raw"), "raw");
        assert_eq!(make_class_name(["a", "b"], ["c", "d"]), "dh-a dh-b c d");
    }

    #[test]
    fn empty_tokens_are_dropped() {
        assert_eq!(make_class_name(["", "panel", "  "], [""]), "dh-panel");
        assert_eq!(make_class_name(Option::<&str>::None, ()), "");
        assert_eq!(make_selector_class_name((), ()), "");
    }

    #[test]
    fn selector_joins_with_commas() {
        assert_eq!(
            make_selector_class_name(["panel-item", "panel-header"], ()),
            ".dh-panel-item,.dh-panel-header"
        );
        assert_eq!(make_selector_class_name("row", ["x"]), ".dh-row,.x");
    }

    #[test]
    fn custom_prefix() {
        let namer = ClassNamer::new("acme-");
        assert_eq!(namer.class_name(["card"], ()), "acme-card");
        assert_eq!(namer.selector(["card"], ()), ".acme-card");
        assert_eq!(namer.prefix(), "acme-");
    }

    #[test]
    fn owned_tokens() {
        let owned = vec!["panel".to_string(), "wide".to_string()];
        assert_eq!(make_class_name(owned.as_slice(), ()), "dh-panel dh-wide");
    }
}
