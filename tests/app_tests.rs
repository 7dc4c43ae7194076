//! Tests for the application façade: the full request flow, fallback and
//! error routes, view rendering, redirects and reconfiguration.

use anyhow::anyhow;
use http::Method;
use serde_json::{json, Value};
use shunt::view::{JsonView, SimpleView, ViewSlot};
use shunt::{App, HandlerSpec, Params, RouteDef};
use std::collections::HashMap;
use std::sync::Arc;

use tracing_util::TestTracing;

fn noop() -> HandlerSpec {
    HandlerSpec::func(|_ctx, _params, _prev| Ok(Value::Null))
}

#[test]
fn test_run_returns_handler_output_as_body() {
    let mut app = App::new();
    app.set_routing(vec![(
        "hi".to_string(),
        RouteDef::pattern(
            "/hi",
            HandlerSpec::func(|_ctx, _params, _prev| Ok(json!("hello"))),
        ),
    )])
    .expect("valid routing");

    let outcome = app.run(&Method::GET, "/hi").expect("run");
    assert_eq!(outcome.body, "hello");
    assert!(outcome.redirect.is_none());
}

#[test]
fn test_run_unmatched_falls_back_to_default_route() {
    let _tracing = TestTracing::init();
    let mut app = App::new();
    app.set_routing(vec![("hi".to_string(), RouteDef::pattern("/hi", noop()))])
        .expect("valid routing");

    let outcome = app.run(&Method::GET, "/nowhere").expect("run");
    assert_eq!(outcome.body, "Not found.");
}

#[test]
fn test_default_route_handler_is_overridable() {
    let mut app = App::new();
    app.set_routing(vec![(
        "default".to_string(),
        RouteDef::handler(HandlerSpec::func(|_ctx, _params, _prev| {
            Ok(json!("custom fallback"))
        })),
    )])
    .expect("valid routing");

    let outcome = app.run(&Method::GET, "/nowhere").expect("run");
    assert_eq!(outcome.body, "custom fallback");
}

#[test]
fn test_run_passes_extracted_params_to_handlers() {
    let mut app = App::new();
    app.set_routing(vec![(
        "user".to_string(),
        RouteDef::pattern(
            "/user/{id}",
            HandlerSpec::func(|_ctx, params: &Params, _prev| {
                Ok(json!(format!("user={}", params["id"])))
            }),
        ),
    )])
    .expect("valid routing");

    let outcome = app.run(&Method::GET, "/user/42").expect("run");
    assert_eq!(outcome.body, "user=42");
}

#[test]
fn test_prepared_view_renders_the_body() {
    let mut app = App::new();
    app.container()
        .set_value("view", Arc::new(ViewSlot::new(JsonView::new())));
    app.set_routing(vec![(
        "page".to_string(),
        RouteDef::pattern(
            "/page",
            HandlerSpec::func(|ctx, _params, _prev| {
                ctx.prepare_view("", json!({ "title": "home" }))?;
                Ok(json!("ignored in favor of the view"))
            }),
        ),
    )])
    .expect("valid routing");

    let outcome = app.run(&Method::GET, "/page").expect("run");
    assert_eq!(outcome.body, r#"{"title":"home"}"#);
}

#[test]
fn test_simple_view_template_substitution() {
    let mut app = App::new();
    app.container()
        .set_value("view", Arc::new(ViewSlot::new(SimpleView::new())));
    app.set_routing(vec![(
        "greet".to_string(),
        RouteDef::pattern(
            "/greet/{name}",
            HandlerSpec::func(|ctx, params: &Params, _prev| {
                ctx.prepare_view("Hello {name}!", json!({ "name": params["name"] }))?;
                Ok(Value::Null)
            }),
        ),
    )])
    .expect("valid routing");

    let outcome = app.run(&Method::GET, "/greet/rust").expect("run");
    assert_eq!(outcome.body, "Hello rust!");
}

#[test]
fn test_view_state_resets_between_runs() {
    let mut app = App::new();
    app.container()
        .set_value("view", Arc::new(ViewSlot::new(JsonView::new())));
    app.set_routing(vec![
        (
            "page".to_string(),
            RouteDef::pattern(
                "/page",
                HandlerSpec::func(|ctx, _params, _prev| {
                    ctx.prepare_view("", json!({ "page": 1 }))?;
                    Ok(Value::Null)
                }),
            ),
        ),
        (
            "plain".to_string(),
            RouteDef::pattern(
                "/plain",
                HandlerSpec::func(|_ctx, _params, _prev| Ok(json!("plain"))),
            ),
        ),
    ])
    .expect("valid routing");

    let first = app.run(&Method::GET, "/page").expect("run");
    assert_eq!(first.body, r#"{"page":1}"#);

    // The second request never prepares the view; the stale preparation
    // from the first request must not leak into its body.
    let second = app.run(&Method::GET, "/plain").expect("run");
    assert_eq!(second.body, "plain");
}

#[test]
fn test_error_route_receives_original_params_plus_error() {
    let mut app = App::new();
    app.set_error_route("error");
    app.set_routing(vec![
        (
            "boom".to_string(),
            RouteDef::pattern(
                "/boom/{id}",
                HandlerSpec::func(|_ctx, _params, _prev| Err(anyhow!("kaput"))),
            ),
        ),
        (
            "error".to_string(),
            RouteDef::pattern(
                "/error",
                HandlerSpec::func(|_ctx, params: &Params, _prev| {
                    Ok(json!(format!(
                        "recovered id={} error={}",
                        params["id"], params["error"]
                    )))
                }),
            ),
        ),
    ])
    .expect("valid routing");

    let outcome = app.run(&Method::GET, "/boom/9").expect("run");
    assert_eq!(outcome.body, "recovered id=9 error=kaput");
}

#[test]
fn test_without_error_route_errors_propagate() {
    let mut app = App::new();
    app.set_routing(vec![(
        "boom".to_string(),
        RouteDef::pattern(
            "/boom",
            HandlerSpec::func(|_ctx, _params, _prev| Err(anyhow!("kaput"))),
        ),
    )])
    .expect("valid routing");

    let err = app.run(&Method::GET, "/boom").expect_err("should fail");
    assert!(err.to_string().contains("kaput"));
}

#[test]
fn test_failing_error_route_propagates_original_error() {
    let mut app = App::new();
    app.set_error_route("error");
    app.set_routing(vec![
        (
            "boom".to_string(),
            RouteDef::pattern(
                "/boom",
                HandlerSpec::func(|_ctx, _params, _prev| Err(anyhow!("original"))),
            ),
        ),
        (
            "error".to_string(),
            RouteDef::pattern(
                "/error",
                HandlerSpec::func(|_ctx, _params, _prev| Err(anyhow!("secondary"))),
            ),
        ),
    ])
    .expect("valid routing");

    let err = app.run(&Method::GET, "/boom").expect_err("should fail");
    assert!(err.to_string().contains("original"), "{err}");
}

#[test]
fn test_redirect_halts_pipeline_and_reports_location() {
    let mut app = App::new();
    app.set_routing(vec![
        (
            "jump".to_string(),
            RouteDef::pattern(
                "/jump",
                HandlerSpec::seq([
                    HandlerSpec::func(|ctx, _params, _prev| {
                        ctx.redirect_to("target", &Params::new(), &[])?;
                        Ok(Value::Null)
                    }),
                    HandlerSpec::func(|_ctx, _params, _prev| {
                        Ok(json!("must never run"))
                    }),
                ]),
            ),
        ),
        ("target".to_string(), RouteDef::pattern("/t", noop())),
    ])
    .expect("valid routing");

    let outcome = app.run(&Method::GET, "/jump").expect("run");
    assert_eq!(outcome.redirect.as_deref(), Some("/t"));
    assert_eq!(outcome.body, "");
}

#[test]
fn test_query_string_is_ignored_for_matching_and_stored() {
    let mut app = App::new();
    app.set_routing(vec![(
        "q".to_string(),
        RouteDef::pattern(
            "/q",
            HandlerSpec::func(|ctx, _params, _prev| {
                let query = ctx
                    .app
                    .container()
                    .get_as::<HashMap<String, String>>("request.query")
                    .ok_or_else(|| anyhow!("query missing"))?;
                Ok(json!(query.get("x").cloned()))
            }),
        ),
    )])
    .expect("valid routing");

    let outcome = app.run(&Method::GET, "/q?x=1&y=2").expect("run");
    assert_eq!(outcome.body, "1");
}

#[test]
fn test_reconfiguration_invalidates_dispatch_structure() {
    let mut app = App::new();
    app.set_routing(vec![("a".to_string(), RouteDef::pattern("/one", noop()))])
        .expect("valid routing");
    assert!(app.route(&Method::GET, "/one").is_some());

    app.set_routing(vec![("a".to_string(), RouteDef::pattern("/two", noop()))])
        .expect("valid routing");
    assert!(app.route(&Method::GET, "/one").is_none());
    assert!(app.route(&Method::GET, "/two").is_some());
}

#[test]
fn test_base_path_applies_to_match_and_generation() {
    let mut app = App::new();
    app.container().set_string("base_path", "/api");
    app.set_routing(vec![(
        "user".to_string(),
        RouteDef::pattern("/user/{id}", noop()),
    )])
    .expect("valid routing");

    let m = app.route(&Method::GET, "/api/user/3").expect("match");
    assert_eq!(m.get_param("id"), Some("3"));

    let mut params = Params::new();
    params.insert("id".to_string(), "3".to_string());
    assert_eq!(
        app.route_path("user", &params, &[]).expect("generate"),
        "/api/user/3"
    );
}

#[test]
fn test_run_as_is_callable_for_any_named_route() {
    let mut app = App::new();
    app.set_routing(vec![(
        "named".to_string(),
        RouteDef::pattern(
            "/whatever/{x}",
            HandlerSpec::func(|_ctx, params: &Params, _prev| Ok(json!(params["x"]))),
        ),
    )])
    .expect("valid routing");

    let mut params = Params::new();
    params.insert("x".to_string(), "direct".to_string());
    let output = app.run_as("named", &params).expect("run");
    assert_eq!(output, json!("direct"));
}

#[test]
fn test_run_as_default_route_by_name() {
    let mut app = App::new();
    app.set_routing(vec![]).expect("valid routing");
    let output = app.run_as("default", &Params::new()).expect("run");
    assert_eq!(output, json!("Not found."));
}
