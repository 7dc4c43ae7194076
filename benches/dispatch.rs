use criterion::{black_box, criterion_group, criterion_main, Criterion};
use http::Method;
use serde_json::{json, Value};
use shunt::{App, HandlerSpec, Params, RouteDef};

fn noop() -> HandlerSpec {
    HandlerSpec::func(|_ctx, _params, _prev| Ok(Value::Null))
}

fn build_app() -> App {
    let mut app = App::new();
    app.set_routing(vec![
        ("root".to_string(), RouteDef::pattern("/", noop())),
        ("animals".to_string(), RouteDef::pattern("/zoo/animals", noop())),
        (
            "animal".to_string(),
            RouteDef::pattern(r"/zoo/animals/{id:\d+}", noop()),
        ),
        (
            "toy".to_string(),
            RouteDef::pattern("/zoo/animals/{id}/toys/{toy_id}", noop()),
        ),
        (
            "section".to_string(),
            RouteDef::pattern(
                "/zoo/{category}/animals/{id}/habitats/{habitat_id}[/{section_id}]",
                noop(),
            ),
        ),
        (
            "echo".to_string(),
            RouteDef::pattern(
                "/echo/{word}",
                HandlerSpec::func(|_ctx, params: &Params, _prev| {
                    Ok(json!(params.get("word")))
                }),
            ),
        ),
    ])
    .expect("valid routing");
    app
}

fn bench_route_match(c: &mut Criterion) {
    let mut app = build_app();
    // Warm the compiled dispatch structure before timing.
    let _ = app.route(&Method::GET, "/");

    c.bench_function("match_static", |b| {
        b.iter(|| black_box(app.route(&Method::GET, black_box("/zoo/animals"))))
    });
    c.bench_function("match_params", |b| {
        b.iter(|| black_box(app.route(&Method::GET, black_box("/zoo/animals/42/toys/7"))))
    });
    c.bench_function("match_optional_tail", |b| {
        b.iter(|| {
            black_box(app.route(
                &Method::GET,
                black_box("/zoo/cats/animals/42/habitats/9/3"),
            ))
        })
    });
    c.bench_function("match_miss", |b| {
        b.iter(|| black_box(app.route(&Method::GET, black_box("/does/not/exist"))))
    });
}

fn bench_full_run(c: &mut Criterion) {
    let mut app = build_app();
    c.bench_function("run_echo", |b| {
        b.iter(|| black_box(app.run(&Method::GET, black_box("/echo/hello"))))
    });
}

fn bench_reverse(c: &mut Criterion) {
    let mut app = build_app();
    let mut params = Params::new();
    params.insert("id".to_string(), "42".to_string());
    params.insert("toy_id".to_string(), "7".to_string());
    c.bench_function("route_path", |b| {
        b.iter(|| black_box(app.route_path("toy", &params, &[])))
    });
}

criterion_group!(benches, bench_route_match, bench_full_run, bench_reverse);
criterion_main!(benches);
