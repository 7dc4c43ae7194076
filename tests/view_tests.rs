//! Tests for the view renderers and the container-storable view slot.

use serde_json::json;
use shunt::view::{JsonView, SimpleView, View, ViewSlot};

#[test]
fn test_simple_view_substitutes_markers() {
    let mut view = SimpleView::new();
    view.prepare("Hello {name}, you are visitor {n}.", json!({ "name": "ada", "n": 7 }));
    assert_eq!(view.render(), "Hello ada, you are visitor 7.");
}

#[test]
fn test_simple_view_value_forms() {
    let mut view = SimpleView::new();
    view.prepare(
        "s={s} n={n} b={b} null={z} list={l}",
        json!({ "s": "text", "n": 1.5, "b": true, "z": null, "l": [1, 2] }),
    );
    assert_eq!(view.render(), "s=text n=1.5 b=true null= list=[1,2]");
}

#[test]
fn test_simple_view_leaves_unknown_markers() {
    let mut view = SimpleView::new();
    view.prepare("{known} and {unknown}", json!({ "known": "yes" }));
    assert_eq!(view.render(), "yes and {unknown}");
}

#[test]
fn test_simple_view_without_params_renders_template_verbatim() {
    let mut view = SimpleView::new();
    view.prepare("static text", json!({}));
    assert_eq!(view.render(), "static text");
}

#[test]
fn test_json_view_ignores_template() {
    let mut view = JsonView::new();
    view.prepare("<ignored>", json!({ "a": 1, "b": [true, null] }));
    assert_eq!(view.render(), r#"{"a":1,"b":[true,null]}"#);
}

#[test]
fn test_prepared_flag_and_reset() {
    let mut view = JsonView::new();
    assert!(!view.is_prepared());
    view.prepare("", json!({ "a": 1 }));
    assert!(view.is_prepared());
    view.reset();
    assert!(!view.is_prepared());
}

#[test]
fn test_view_slot_shares_one_renderer() {
    let slot = ViewSlot::new(SimpleView::new());
    assert!(!slot.is_prepared());

    slot.prepare("count: {count}", json!({ "count": 3 }));
    assert!(slot.is_prepared());
    assert_eq!(slot.render(), "count: 3");

    slot.reset();
    assert!(!slot.is_prepared());
}

#[test]
fn test_last_prepare_wins() {
    let slot = ViewSlot::new(JsonView::new());
    slot.prepare("", json!({ "v": 1 }));
    slot.prepare("", json!({ "v": 2 }));
    assert_eq!(slot.render(), r#"{"v":2}"#);
}
