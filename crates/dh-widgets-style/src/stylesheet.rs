//! Stylesheet injection.
//!
//! Components ship their CSS as external files. [`StyleInjector::ensure`]
//! adds a `<link rel="stylesheet">` for a file to the document's `<head>`
//! the first time it is requested; later requests find the existing tag by
//! its derived id and do nothing.

use dh_widgets_core::logging::targets;
use dh_widgets_core::{Document, NodeId};

use crate::Result;
use crate::class_name::prefixed;

/// Adds component stylesheets to a document, once per file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleInjector {
    base_url: Option<String>,
}

impl StyleInjector {
    /// An injector that uses hrefs exactly as given.
    pub fn new() -> Self {
        Self::default()
    }

    /// An injector that resolves relative hrefs against `base_url`.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: Some(base_url.into()),
        }
    }

    /// The configured base URL.
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Resolve `href` against the base URL.
    ///
    /// Absolute URLs (with a scheme, or starting with `/`) are returned as-is.
    pub fn resolve(&self, href: &str) -> String {
        match &self.base_url {
            Some(base) if !is_absolute(href) => {
                format!("{}/{}", base.trim_end_matches('/'), href.trim_start_matches("./"))
            }
            _ => href.to_string(),
        }
    }

    /// The element id used for the `<link>` tag of `href`.
    ///
    /// ```
    /// use dh_widgets_style::StyleInjector;
    ///
    /// assert_eq!(StyleInjector::stylesheet_key("css/Panel.css"), "dh-css-css-panel-css");
    /// ```
    pub fn stylesheet_key(href: &str) -> String {
        let mut slug = String::with_capacity(href.len());
        for c in href.chars() {
            if c.is_ascii_alphanumeric() {
                slug.push(c.to_ascii_lowercase());
            } else if !slug.is_empty() && !slug.ends_with('-') {
                slug.push('-');
            }
        }
        while slug.ends_with('-') {
            slug.pop();
        }
        prefixed(&format!("css-{slug}"))
    }

    /// Check whether the stylesheet for `href` is already in the document.
    pub fn is_injected(&self, doc: &Document, href: &str) -> bool {
        self.find(doc, &self.resolve(href)).is_some()
    }

    /// Make sure a `<link>` for `href` exists in `<head>`.
    ///
    /// Returns the link element, whether it was just created or already present.
    pub fn ensure(&self, doc: &mut Document, href: &str) -> Result<NodeId> {
        let resolved = self.resolve(href);
        if let Some(existing) = self.find(doc, &resolved) {
            return Ok(existing);
        }

        let link = doc.create_element("link");
        doc.set_attribute(link, "id", Self::stylesheet_key(&resolved))?;
        doc.set_attribute(link, "rel", "stylesheet")?;
        doc.set_attribute(link, "href", resolved.as_str())?;
        doc.append_child(doc.head(), link)?;

        tracing::debug!(target: targets::STYLE, href = %resolved, "injected stylesheet");
        Ok(link)
    }

    fn find(&self, doc: &Document, resolved: &str) -> Option<NodeId> {
        let key = Self::stylesheet_key(resolved);
        doc.children(doc.head())
            .ok()?
            .iter()
            .copied()
            .find(|&n| doc.element_id(n) == Some(key.as_str()))
    }
}

fn is_absolute(href: &str) -> bool {
    href.starts_with('/') || href.contains("://") || href.starts_with("data:")
}
