//! Components and the shared render pass.
//!
//! Every widget renders the same frame into its root element: a header with
//! the title, a body with one node per view-data record (or an empty-state
//! node), and a footer. The widget-specific part is the body, supplied by a
//! [`Renderer`]. [`Widget`] runs the rest of the pass: option merging,
//! schema mapping, custom slots, event binding, stylesheet injection, icon
//! hydration and the after-render hook.
//!
//! # Example
//!
//! ```
//! use dh_widgets::prelude::*;
//! use dh_widgets_core::Document;
//! use serde_json::json;
//!
//! let mut doc = Document::new();
//! let body = doc.body();
//! let host = doc.create_element("div");
//! doc.set_attribute(host, "id", "stats").unwrap();
//! doc.append_child(body, host).unwrap();
//!
//! let env = Environment::new();
//! let mut panel = Widget::new(Panel);
//! panel
//!     .render(
//!         &mut doc,
//!         &env,
//!         RenderRequest::new("stats")
//!             .with_title("Latency")
//!             .with_data(vec![json!({"label": "p50", "value": 12})]),
//!     )
//!     .unwrap();
//!
//! assert_eq!(panel.context().unwrap().view_data.len(), 1);
//! assert!(doc.to_html(host).contains("p50"));
//! ```

mod list_view;
mod metric_card;
mod panel;

use std::fmt;
use std::sync::Arc;

use serde_json::{Value, json};

use dh_widgets_core::logging::targets;
use dh_widgets_core::{Document, NodeId};
use dh_widgets_style::class_name::{ClassTokens, make_class_name, prefixed};
use dh_widgets_style::{FontIconEngine, IconEngine, IconLoad, StyleInjector};

use crate::delegate::DelegationEngine;
use crate::error::{RenderError, Result};
use crate::options::{RenderConfig, RenderOptions, base_defaults, deep_merge};
use crate::schema::{Schema, build_view_data};

pub use list_view::ListView;
pub use metric_card::{MetricCard, Trend};
pub use panel::Panel;

/// Class of the empty-state node.
pub const EMPTY_CLASS: &str = "dh-empty";

/// Hook run after a render pass.
pub type AfterRender = Arc<dyn Fn(&mut Document, &RenderContext) + Send + Sync>;

/// Produces the content of a header, body or footer slot.
pub type SlotRenderer = Arc<dyn Fn(&mut Document, NodeId, &RenderContext) -> SlotContent + Send + Sync>;

/// What a custom slot produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotContent {
    /// An element to append to the slot container.
    Node(NodeId),
    /// Raw markup to use as the container's content.
    Markup(String),
}

/// Optional replacements for the default header, body and footer.
#[derive(Clone, Default)]
pub struct CustomSlots {
    /// Replaces the title.
    pub header: Option<SlotRenderer>,
    /// Replaces the item list and empty state.
    pub body: Option<SlotRenderer>,
    /// Fills the footer.
    pub footer: Option<SlotRenderer>,
}

fn slot<F>(render: F) -> SlotRenderer
where
    F: Fn(&mut Document, NodeId, &RenderContext) -> SlotContent + Send + Sync + 'static,
{
    Arc::new(render)
}

impl CustomSlots {
    /// No custom slots.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the header slot.
    pub fn with_header<F>(mut self, render: F) -> Self
    where
        F: Fn(&mut Document, NodeId, &RenderContext) -> SlotContent + Send + Sync + 'static,
    {
        self.header = Some(slot(render));
        self
    }

    /// Set the body slot.
    pub fn with_body<F>(mut self, render: F) -> Self
    where
        F: Fn(&mut Document, NodeId, &RenderContext) -> SlotContent + Send + Sync + 'static,
    {
        self.body = Some(slot(render));
        self
    }

    /// Set the footer slot.
    pub fn with_footer<F>(mut self, render: F) -> Self
    where
        F: Fn(&mut Document, NodeId, &RenderContext) -> SlotContent + Send + Sync + 'static,
    {
        self.footer = Some(slot(render));
        self
    }
}

impl fmt::Debug for CustomSlots {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomSlots")
            .field("header", &self.header.is_some())
            .field("body", &self.body.is_some())
            .field("footer", &self.footer.is_some())
            .finish()
    }
}

/// Input of one render pass.
#[derive(Debug, Clone, Default)]
pub struct RenderRequest {
    /// `id` attribute of the root element.
    pub root_id: String,
    /// Header title.
    pub title: String,
    /// Records before schema mapping.
    pub raw_data: Vec<Value>,
    /// Mapping from raw records to view data.
    pub schema: Option<Schema>,
    /// Overrides, events and hook.
    pub options: RenderOptions,
    /// Slot replacements.
    pub custom: CustomSlots,
}

impl RenderRequest {
    /// A request targeting the element with id `root_id`.
    pub fn new(root_id: impl Into<String>) -> Self {
        Self {
            root_id: root_id.into(),
            ..Self::default()
        }
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the raw records.
    pub fn with_data(mut self, raw_data: Vec<Value>) -> Self {
        self.raw_data = raw_data;
        self
    }

    /// Set the schema.
    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Set the options.
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the slot replacements.
    pub fn with_custom(mut self, custom: CustomSlots) -> Self {
        self.custom = custom;
        self
    }
}

/// Read-only description of a completed (or in-progress) render pass.
#[derive(Debug, Clone)]
pub struct RenderContext {
    /// `id` attribute of the root element.
    pub id: String,
    /// The root element.
    pub root: NodeId,
    /// Header title.
    pub title: String,
    /// Records before schema mapping.
    pub raw_data: Arc<[Value]>,
    /// Records actually rendered.
    pub view_data: Arc<[Value]>,
    /// The schema used, if any.
    pub schema: Option<Schema>,
    /// Merged options.
    pub config: RenderConfig,
    /// Registry name of the component.
    pub component: &'static str,
}

/// Services shared by every component.
pub struct Environment {
    /// Event delegation for all rendered roots.
    pub delegation: DelegationEngine,
    /// Stylesheet injection.
    pub styles: StyleInjector,
    /// Icon placeholders and hydration.
    pub icons: Arc<dyn IconEngine>,
}

impl Environment {
    /// Default services: hrefs used as given, font icons.
    pub fn new() -> Self {
        Self::with_styles(StyleInjector::new())
    }

    /// Default services with a custom stylesheet injector, which the icon
    /// engine also uses for its font.
    pub fn with_styles(styles: StyleInjector) -> Self {
        let icons = FontIconEngine::new(dh_widgets_style::icon::DEFAULT_ICON_FONT, styles.clone());
        Self {
            delegation: DelegationEngine::new(),
            styles,
            icons: Arc::new(icons),
        }
    }

    /// Replace the icon engine.
    pub fn with_icons(mut self, icons: Arc<dyn IconEngine>) -> Self {
        self.icons = icons;
        self
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("delegation", &self.delegation)
            .field("styles", &self.styles)
            .finish_non_exhaustive()
    }
}

/// A renderable, re-renderable widget.
pub trait Component: Send {
    /// Registry name, for example `"panel"`.
    fn name(&self) -> &'static str;

    /// Render into the element named by `request.root_id`.
    ///
    /// A missing root or invalid options fail before anything changes. A
    /// failure while building or binding leaves the root empty and
    /// [`context`](Self::context) returning `None`.
    fn render(&mut self, doc: &mut Document, env: &Environment, request: RenderRequest) -> Result<()>;

    /// Render again with the last request.
    fn redraw(&mut self, doc: &mut Document, env: &Environment) -> Result<()>;

    /// Unbind events and clear the root. The root element itself stays.
    fn destroy(&mut self, doc: &mut Document, env: &Environment) -> Result<()>;

    /// Context of the last successful render.
    fn context(&self) -> Option<&RenderContext>;

    /// Icon hydration handle of the last successful render.
    fn icon_load(&self) -> Option<&IconLoad>;
}

/// The widget-specific part of a render pass.
pub trait Renderer: Send + Sync {
    /// Registry name.
    const NAME: &'static str;
    /// Class token of the root and its parts (`"panel"` gives `dh-panel`,
    /// `dh-panel-header`, ...).
    const CLASS: &'static str;
    /// Stylesheet injected on render.
    const STYLESHEET: &'static str;

    /// Component-specific option defaults, merged over the shared ones.
    fn defaults(&self) -> Value {
        json!({})
    }

    /// Fill `body` with one node per view-data record. Only called when
    /// there is at least one record.
    fn render_body(
        &self,
        doc: &mut Document,
        env: &Environment,
        body: NodeId,
        ctx: &RenderContext,
    ) -> Result<()>;
}

struct Rendered {
    request: RenderRequest,
    context: RenderContext,
    icons: IconLoad,
}

/// A [`Component`] driven by a [`Renderer`].
pub struct Widget<R> {
    renderer: R,
    rendered: Option<Rendered>,
}

impl<R: Renderer> Widget<R> {
    /// Wrap a renderer.
    pub fn new(renderer: R) -> Self {
        Self {
            renderer,
            rendered: None,
        }
    }

    /// The wrapped renderer.
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    fn part_class(part: &str) -> String {
        format!("{}-{}", R::CLASS, part)
    }

    fn build_frame(
        &self,
        doc: &mut Document,
        env: &Environment,
        ctx: &RenderContext,
        custom: &CustomSlots,
    ) -> Result<()> {
        let header = append_element(doc, ctx.root, "div", Self::part_class("header").as_str())?;
        let body = append_element(doc, ctx.root, "div", Self::part_class("body").as_str())?;
        let footer = append_element(doc, ctx.root, "div", Self::part_class("footer").as_str())?;

        match &custom.header {
            Some(render) => fill_slot(doc, header, "header", render, ctx)?,
            None => {
                append_text(doc, header, "div", Self::part_class("title").as_str(), &ctx.title)?;
            }
        }

        match &custom.body {
            Some(render) => fill_slot(doc, body, "body", render, ctx)?,
            None if ctx.view_data.is_empty() => {
                let empty = doc.create_element("div");
                doc.set_class_name(empty, EMPTY_CLASS)?;
                doc.set_text_content(empty, ctx.config.empty_text.as_str())?;
                doc.append_child(body, empty)?;
            }
            None => self.renderer.render_body(doc, env, body, ctx)?,
        }

        if let Some(render) = &custom.footer {
            fill_slot(doc, footer, "footer", render, ctx)?;
        }
        Ok(())
    }
}

impl<R: Renderer> Widget<R> {
    /// Replace the root's content with a fresh frame and bind it.
    fn mount(
        &self,
        doc: &mut Document,
        env: &Environment,
        ctx: &RenderContext,
        request: &RenderRequest,
    ) -> Result<IconLoad> {
        doc.clear_children(ctx.root)?;
        doc.add_class(ctx.root, &prefixed(R::CLASS))?;

        self.build_frame(doc, env, ctx, &request.custom)?;
        env.delegation
            .bind(doc, ctx.root, &request.options.events, ctx.view_data.clone())?;
        env.styles.ensure(doc, R::STYLESHEET)?;
        Ok(env.icons.after_render(doc, ctx.root))
    }
}

impl<R: Renderer + Default> Default for Widget<R> {
    fn default() -> Self {
        Self::new(R::default())
    }
}

impl<R: Renderer + fmt::Debug> fmt::Debug for Widget<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Widget")
            .field("renderer", &self.renderer)
            .field("context", &self.rendered.as_ref().map(|r| &r.context))
            .finish()
    }
}

impl<R: Renderer> Component for Widget<R> {
    fn name(&self) -> &'static str {
        R::NAME
    }

    #[tracing::instrument(skip_all, target = "dh_widgets::render", level = "debug", fields(component = R::NAME, root_id = %request.root_id))]
    fn render(&mut self, doc: &mut Document, env: &Environment, request: RenderRequest) -> Result<()> {
        let root = doc
            .get_element_by_id(&request.root_id)
            .ok_or_else(|| RenderError::RootNotFound {
                id: request.root_id.clone(),
            })?;

        let defaults = deep_merge(&base_defaults(), &self.renderer.defaults());
        let config = RenderConfig::resolve(&defaults, &request.options.overrides)?;

        let raw_data: Arc<[Value]> = request.raw_data.iter().cloned().collect();
        let view_data = build_view_data(&raw_data, request.schema.as_ref(), config.size);

        let context = RenderContext {
            id: request.root_id.clone(),
            root,
            title: request.title.clone(),
            raw_data,
            view_data,
            schema: request.schema.clone(),
            config,
            component: R::NAME,
        };

        env.delegation.unbind(doc, root);
        let icons = match self.mount(doc, env, &context, &request) {
            Ok(icons) => icons,
            Err(error) => {
                // drop the half-built pass
                self.rendered = None;
                env.delegation.unbind(doc, root);
                if doc.contains(root) {
                    let _ = doc.clear_children(root);
                    let _ = doc.remove_class(root, &prefixed(R::CLASS));
                }
                tracing::warn!(target: targets::RENDER, component = R::NAME, ?root, %error, "render failed, root cleared");
                return Err(error);
            }
        };

        if let Some(hook) = &request.options.after_render {
            hook(doc, &context);
        }

        tracing::debug!(
            target: targets::RENDER,
            component = R::NAME,
            ?root,
            items = context.view_data.len(),
            "rendered"
        );
        self.rendered = Some(Rendered {
            request,
            context,
            icons,
        });
        Ok(())
    }

    fn redraw(&mut self, doc: &mut Document, env: &Environment) -> Result<()> {
        let request = self
            .rendered
            .as_ref()
            .map(|r| r.request.clone())
            .ok_or(RenderError::NotRendered(R::NAME))?;
        self.render(doc, env, request)
    }

    fn destroy(&mut self, doc: &mut Document, env: &Environment) -> Result<()> {
        let Some(rendered) = self.rendered.take() else {
            return Ok(());
        };
        let root = rendered.context.root;
        env.delegation.unbind(doc, root);
        if doc.contains(root) {
            doc.clear_children(root)?;
            doc.remove_class(root, &prefixed(R::CLASS))?;
        }
        tracing::debug!(target: targets::RENDER, component = R::NAME, ?root, "destroyed");
        Ok(())
    }

    fn context(&self) -> Option<&RenderContext> {
        self.rendered.as_ref().map(|r| &r.context)
    }

    fn icon_load(&self) -> Option<&IconLoad> {
        self.rendered.as_ref().map(|r| &r.icons)
    }
}

fn fill_slot(
    doc: &mut Document,
    container: NodeId,
    slot: &'static str,
    render: &SlotRenderer,
    ctx: &RenderContext,
) -> Result<()> {
    match render(doc, container, ctx) {
        SlotContent::Node(node) => {
            if !doc.contains(node) {
                tracing::warn!(target: targets::RENDER, slot, ?node, "slot returned a stale node");
                return Err(RenderError::invalid_slot(slot, "returned node is not in the document"));
            }
            doc.append_child(container, node)
                .map_err(|e| RenderError::invalid_slot(slot, e.to_string()))
        }
        SlotContent::Markup(markup) => Ok(doc.set_inner_markup(container, markup)?),
    }
}

/// Create an element with prefixed classes and append it to `parent`.
pub(crate) fn append_element<'a>(
    doc: &mut Document,
    parent: NodeId,
    tag: &str,
    classes: impl Into<ClassTokens<'a>>,
) -> Result<NodeId> {
    let node = doc.create_element(tag);
    doc.set_class_name(node, &make_class_name(classes, ()))?;
    doc.append_child(parent, node)?;
    Ok(node)
}

/// [`append_element`] with text content.
pub(crate) fn append_text<'a>(
    doc: &mut Document,
    parent: NodeId,
    tag: &str,
    classes: impl Into<ClassTokens<'a>>,
    text: &str,
) -> Result<NodeId> {
    let node = append_element(doc, parent, tag, classes)?;
    doc.set_text_content(node, text)?;
    Ok(node)
}

/// Text shown for a record field. Strings are shown unquoted and missing
/// fields as nothing.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
