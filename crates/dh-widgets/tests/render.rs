//! Integration tests for the render cycle.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use serde_json::{Value, json};

use dh_widgets::component::EMPTY_CLASS;
use dh_widgets::delegate::EVENT_TARGET_CLASS;
use dh_widgets::prelude::*;
use dh_widgets_core::{Document, DomEvent, NodeId, event_types};
use dh_widgets_style::StyleInjector;
use dh_widgets_style::icon::{DEFAULT_ICON_FONT, ICON_READY_ATTRIBUTE};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn host(doc: &mut Document, id: &str) -> NodeId {
    let body = doc.body();
    let host = doc.create_element("div");
    doc.set_attribute(host, "id", id).unwrap();
    doc.append_child(body, host).unwrap();
    host
}

fn find(doc: &Document, root: NodeId, class: &str) -> Vec<NodeId> {
    doc.descendants(root)
        .into_iter()
        .filter(|&n| doc.has_class(n, class))
        .collect()
}

fn links(doc: &Document) -> usize {
    let head = doc.head();
    doc.children(head)
        .unwrap()
        .iter()
        .filter(|&&n| doc.tag_name(n) == Some("link"))
        .count()
}

fn rows(n: usize) -> Vec<Value> {
    (0..n)
        .map(|i| json!({"label": format!("row {i}"), "value": i}))
        .collect()
}

#[test]
fn empty_data_shows_one_empty_state() {
    init_tracing();
    for name in ["panel", "list-view", "metric-card"] {
        let mut doc = Document::new();
        let root = host(&mut doc, "w");
        let env = Environment::new();
        ComponentRegistry::new()
            .render(name, &mut doc, &env, RenderRequest::new("w"))
            .unwrap();

        let empty = find(&doc, root, EMPTY_CLASS);
        assert_eq!(empty.len(), 1, "{name}");
        assert_eq!(doc.text_content(empty[0]), "No data");
    }
}

#[test]
fn empty_text_override() {
    let mut doc = Document::new();
    let root = host(&mut doc, "w");
    let env = Environment::new();
    let mut panel = Widget::new(Panel);
    panel
        .render(
            &mut doc,
            &env,
            RenderRequest::new("w")
                .with_options(RenderOptions::new().with_overrides(json!({"emptyText": "Nothing yet"}))),
        )
        .unwrap();

    let empty = find(&doc, root, EMPTY_CLASS);
    assert_eq!(empty.len(), 1);
    assert_eq!(doc.text_content(empty[0]), "Nothing yet");
}

#[test]
fn size_caps_rendered_items() {
    let mut doc = Document::new();
    let root = host(&mut doc, "w");
    let env = Environment::new();
    let mut panel = Widget::new(Panel);

    panel
        .render(&mut doc, &env, RenderRequest::new("w").with_data(rows(8)))
        .unwrap();
    assert_eq!(find(&doc, root, "dh-panel-item").len(), 5);

    panel
        .render(
            &mut doc,
            &env,
            RenderRequest::new("w")
                .with_data(rows(8))
                .with_options(RenderOptions::new().with_overrides(json!({"size": 2}))),
        )
        .unwrap();
    let ctx = panel.context().unwrap();
    assert_eq!(ctx.raw_data.len(), 8);
    assert_eq!(ctx.view_data.len(), 2);
    assert_eq!(find(&doc, root, "dh-panel-item").len(), 2);
}

#[test]
fn missing_root_fails_fast() {
    let mut doc = Document::new();
    let env = Environment::new();
    let mut panel = Widget::new(Panel);
    let err = panel
        .render(&mut doc, &env, RenderRequest::new("nowhere"))
        .unwrap_err();
    assert!(matches!(err, RenderError::RootNotFound { ref id } if id == "nowhere"));
    assert!(panel.context().is_none());
    assert_eq!(links(&doc), 0);
}

#[test]
fn invalid_options_are_rejected() {
    let mut doc = Document::new();
    host(&mut doc, "w");
    let env = Environment::new();
    let mut panel = Widget::new(Panel);
    let err = panel
        .render(
            &mut doc,
            &env,
            RenderRequest::new("w")
                .with_options(RenderOptions::new().with_overrides(json!({"size": "lots"}))),
        )
        .unwrap_err();
    assert!(matches!(err, RenderError::InvalidOptions(_)));
}

#[test]
fn invalid_selector_surfaces_as_delegate_error() {
    let mut doc = Document::new();
    host(&mut doc, "w");
    let env = Environment::new();
    let mut list = Widget::new(ListView);
    let err = list
        .render(
            &mut doc,
            &env,
            RenderRequest::new("w").with_options(
                RenderOptions::new().on(EventSpec::new(event_types::CLICK, "li >", |_, _| {})),
            ),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        RenderError::Delegate(DelegateError::InvalidSelector { .. })
    ));
}

#[test]
fn custom_slots() {
    let mut doc = Document::new();
    let root = host(&mut doc, "w");
    let env = Environment::new();
    let mut panel = Widget::new(Panel);
    panel
        .render(
            &mut doc,
            &env,
            RenderRequest::new("w")
                .with_title("ignored")
                .with_data(rows(1))
                .with_custom(
                    CustomSlots::new()
                        .with_header(|doc, _, ctx| {
                            let h = doc.create_element("h2");
                            doc.set_text_content(h, format!("{} rows", ctx.view_data.len()))
                                .unwrap();
                            SlotContent::Node(h)
                        })
                        .with_footer(|_, _, _| SlotContent::Markup("<em>end</em>".into())),
                ),
        )
        .unwrap();

    let header = find(&doc, root, "dh-panel-header")[0];
    assert_eq!(doc.to_html(header), r#"<div class="dh-panel-header"><h2>1 rows</h2></div>"#);
    let footer = find(&doc, root, "dh-panel-footer")[0];
    assert_eq!(doc.to_html(footer), r#"<div class="dh-panel-footer"><em>end</em></div>"#);
    assert_eq!(find(&doc, root, "dh-panel-item").len(), 1);
}

#[test]
fn stale_slot_node_is_rejected() {
    let mut doc = Document::new();
    host(&mut doc, "w");
    let stale = doc.create_element("p");
    doc.remove(stale).unwrap();

    let env = Environment::new();
    let mut panel = Widget::new(Panel);
    let err = panel
        .render(
            &mut doc,
            &env,
            RenderRequest::new("w").with_custom(
                CustomSlots::new().with_body(move |_, _, _| SlotContent::Node(stale)),
            ),
        )
        .unwrap_err();
    assert!(matches!(err, RenderError::InvalidSlot { slot: "body", .. }));
}

#[test]
fn failed_rerender_clears_previous_state() {
    let mut doc = Document::new();
    let root = host(&mut doc, "w");
    let count = Arc::new(AtomicUsize::new(0));
    let counter = count.clone();
    let clicks = RenderOptions::new().on(EventSpec::new(
        event_types::CLICK,
        ".dh-panel-item",
        move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
        },
    ));

    let env = Environment::new();
    let mut panel = Widget::new(Panel);
    panel
        .render(
            &mut doc,
            &env,
            RenderRequest::new("w")
                .with_data(vec![json!({"label": "x"})])
                .with_options(clicks.clone()),
        )
        .unwrap();
    assert!(env.delegation.is_bound(root));

    let stale = doc.create_element("p");
    doc.remove(stale).unwrap();
    let err = panel
        .render(
            &mut doc,
            &env,
            RenderRequest::new("w")
                .with_data(vec![json!({"label": "y"})])
                .with_options(clicks)
                .with_custom(CustomSlots::new().with_footer(move |_, _, _| SlotContent::Node(stale))),
        )
        .unwrap_err();
    assert!(matches!(err, RenderError::InvalidSlot { slot: "footer", .. }));

    assert!(panel.context().is_none());
    assert!(panel.icon_load().is_none());
    assert!(!env.delegation.is_bound(root));
    assert_eq!(doc.total_listener_count(root), 0);
    assert!(doc.children(root).unwrap().is_empty());
    assert!(!doc.has_class(root, "dh-panel"));
    assert!(!doc.to_html(root).contains("dh-panel-label"));

    doc.dispatch_event(&DomEvent::click(root));
    assert_eq!(count.load(Ordering::SeqCst), 0);
    assert!(matches!(
        panel.redraw(&mut doc, &env).unwrap_err(),
        RenderError::NotRendered("panel")
    ));
}

#[test]
fn failed_option_resolution_keeps_previous_render() {
    let mut doc = Document::new();
    let root = host(&mut doc, "w");
    let env = Environment::new();
    let mut panel = Widget::new(Panel);
    panel
        .render(&mut doc, &env, RenderRequest::new("w").with_data(rows(2)))
        .unwrap();

    let err = panel
        .render(
            &mut doc,
            &env,
            RenderRequest::new("w")
                .with_data(rows(1))
                .with_options(RenderOptions::new().with_overrides(json!({"size": -1}))),
        )
        .unwrap_err();
    assert!(matches!(err, RenderError::InvalidOptions(_)));
    assert_eq!(panel.context().unwrap().view_data.len(), 2);
    assert_eq!(find(&doc, root, "dh-panel-item").len(), 2);
}

#[test]
fn after_render_receives_context() {
    let mut doc = Document::new();
    let root = host(&mut doc, "w");
    let seen = Arc::new(Mutex::new(None));
    let sink = seen.clone();

    let env = Environment::new();
    let mut card = Widget::new(MetricCard);
    card.render(
        &mut doc,
        &env,
        RenderRequest::new("w")
            .with_title("KPIs")
            .with_data(rows(3))
            .with_options(RenderOptions::new().with_after_render(move |doc, ctx| {
                // the tree is complete when the hook runs
                let tiles = doc
                    .descendants(ctx.root)
                    .into_iter()
                    .filter(|&n| doc.has_class(n, "dh-card-tile"))
                    .count();
                *sink.lock() = Some((ctx.id.clone(), ctx.title.clone(), ctx.component, tiles));
            })),
    )
    .unwrap();

    assert_eq!(
        *seen.lock(),
        Some(("w".to_string(), "KPIs".to_string(), "metric-card", 3))
    );
    assert_eq!(card.context().unwrap().root, root);
    assert_eq!(card.context().unwrap().config.uint("columns"), Some(2));
}

#[test]
fn stylesheet_injected_once() {
    let mut doc = Document::new();
    host(&mut doc, "a");
    host(&mut doc, "b");
    let env = Environment::with_styles(StyleInjector::with_base_url("/static"));
    let registry = ComponentRegistry::new();

    registry.render("panel", &mut doc, &env, RenderRequest::new("a")).unwrap();
    registry.render("panel", &mut doc, &env, RenderRequest::new("b")).unwrap();
    assert_eq!(links(&doc), 1);
    assert!(env.styles.is_injected(&doc, "dh-panel.css"));

    registry.render("list-view", &mut doc, &env, RenderRequest::new("a")).unwrap();
    assert_eq!(links(&doc), 2);
}

#[test]
fn icons_hydrate_after_pending_tasks() {
    let mut doc = Document::new();
    let root = host(&mut doc, "w");
    let env = Environment::new();
    let mut list = Widget::new(ListView);
    list.render(
        &mut doc,
        &env,
        RenderRequest::new("w").with_data(vec![
            json!({"title": "Inbox", "icon": "mail"}),
            json!({"title": "Plain"}),
        ]),
    )
    .unwrap();

    let load = list.icon_load().unwrap().clone();
    assert!(!load.is_complete());
    assert!(!env.styles.is_injected(&doc, DEFAULT_ICON_FONT));

    doc.run_pending_tasks();
    assert!(load.is_complete());
    assert_eq!(load.hydrated(), 1);
    assert!(env.styles.is_injected(&doc, DEFAULT_ICON_FONT));

    let icons = find(&doc, root, "dh-icon-mail");
    assert_eq!(icons.len(), 1);
    assert_eq!(doc.attribute(icons[0], ICON_READY_ATTRIBUTE), Some("true"));
}

#[test]
fn trend_icons_on_metric_cards() {
    let mut doc = Document::new();
    let root = host(&mut doc, "w");
    let env = Environment::new();
    let mut card = Widget::new(MetricCard);
    card.render(
        &mut doc,
        &env,
        RenderRequest::new("w").with_data(vec![
            json!({"label": "Sales", "value": 10, "trend": "up"}),
            json!({"label": "Churn", "value": 2, "trend": "sideways"}),
        ]),
    )
    .unwrap();

    assert_eq!(find(&doc, root, "dh-card-trend-up").len(), 1);
    doc.run_pending_tasks();
    assert_eq!(card.icon_load().unwrap().hydrated(), 1);
    assert_eq!(find(&doc, root, "dh-icon-trend-up").len(), 1);
}

#[test]
fn redraw_rebinds_once() {
    let mut doc = Document::new();
    let root = host(&mut doc, "w");
    let count = Arc::new(AtomicUsize::new(0));
    let counter = count.clone();

    let env = Environment::new();
    let mut panel = Widget::new(Panel);
    panel
        .render(
            &mut doc,
            &env,
            RenderRequest::new("w").with_data(rows(2)).with_options(RenderOptions::new().on(
                EventSpec::new(event_types::CLICK, ".dh-panel-item", move |_, _| {
                    counter.fetch_add(1, Ordering::SeqCst);
                }),
            )),
        )
        .unwrap();
    panel.redraw(&mut doc, &env).unwrap();
    panel.redraw(&mut doc, &env).unwrap();

    assert_eq!(doc.listener_count(root, event_types::CLICK), 1);
    assert_eq!(find(&doc, root, "dh-panel-item").len(), 2);

    let item = find(&doc, root, "dh-panel-item")[0];
    doc.dispatch_event(&DomEvent::click(item));
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn redraw_before_render_fails() {
    let mut doc = Document::new();
    let env = Environment::new();
    let mut panel = Widget::new(Panel);
    let err = panel.redraw(&mut doc, &env).unwrap_err();
    assert!(matches!(err, RenderError::NotRendered("panel")));
}

#[test]
fn destroy_unbinds_and_clears() {
    let mut doc = Document::new();
    let root = host(&mut doc, "w");
    let count = Arc::new(AtomicUsize::new(0));
    let counter = count.clone();

    let env = Environment::new();
    let mut list = Widget::new(ListView);
    list.render(
        &mut doc,
        &env,
        RenderRequest::new("w")
            .with_data(vec![json!({"title": "a"})])
            .with_options(RenderOptions::new().on(EventSpec::on_root(
                event_types::CLICK,
                move |_, _| {
                    counter.fetch_add(1, Ordering::SeqCst);
                },
            ))),
    )
    .unwrap();
    assert!(env.delegation.is_bound(root));

    list.destroy(&mut doc, &env).unwrap();
    assert!(doc.contains(root));
    assert!(!doc.has_class(root, "dh-list"));
    assert!(doc.children(root).unwrap().is_empty());
    assert_eq!(doc.total_listener_count(root), 0);
    assert!(!env.delegation.is_bound(root));
    assert!(list.context().is_none());

    doc.dispatch_event(&DomEvent::click(root));
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

#[test]
fn removed_roots_are_pruned() {
    let mut doc = Document::new();
    let root = host(&mut doc, "w");
    let env = Environment::new();
    ComponentRegistry::new()
        .render(
            "panel",
            &mut doc,
            &env,
            RenderRequest::new("w")
                .with_data(rows(1))
                .with_options(RenderOptions::new().on(EventSpec::new(
                    event_types::CLICK,
                    ".dh-panel-item",
                    |_, _| {},
                ))),
        )
        .unwrap();
    assert_eq!(find(&doc, root, EVENT_TARGET_CLASS).len(), 1);

    doc.remove(root).unwrap();
    assert_eq!(env.delegation.prune(&doc), 1);
    assert!(env.delegation.is_empty());
}

#[test]
fn unknown_component() {
    let mut doc = Document::new();
    host(&mut doc, "w");
    let env = Environment::new();
    let err = ComponentRegistry::new()
        .render("gauge", &mut doc, &env, RenderRequest::new("w"))
        .err()
        .unwrap();
    assert!(matches!(err, RenderError::UnknownComponent(ref name) if name == "gauge"));
}

#[test]
fn merge_examples() {
    assert_eq!(
        deep_merge(&json!({"a": {"x": 1, "y": 2}}), &json!({"a": {"y": 9, "z": 3}})),
        json!({"a": {"x": 1, "y": 9, "z": 3}})
    );
    assert_eq!(
        deep_merge(&json!({"arr": [1, 2]}), &json!({"arr": [9]})),
        json!({"arr": [9]})
    );
}
