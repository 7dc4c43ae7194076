use clap::Parser;
use http::Method;
use serde_json::{json, Value};
use shunt::view::{JsonView, ViewSlot};
use shunt::{App, Context, Controller, Error, HandlerSpec, Params, RouteDef};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Dispatch one simulated request against a demo routing table.
#[derive(Parser)]
#[command(name = "shunt", about = "shunt demo dispatcher", long_about = None)]
struct Cli {
    /// HTTP method of the simulated request
    #[arg(short, long, default_value = "GET")]
    method: String,

    /// Request URI (path, optionally with a query string)
    #[arg(default_value = "/")]
    uri: String,

    /// Base-path prefix stripped before matching
    #[arg(long)]
    base_path: Option<String>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let method = Method::from_bytes(cli.method.as_bytes())?;

    let mut app = demo_app()?;
    if let Some(base_path) = cli.base_path {
        app.container().set_string("base_path", base_path);
    }

    let outcome = app.run(&method, &cli.uri)?;
    println!("{}", outcome.body);
    if let Some(location) = outcome.redirect {
        println!("redirect -> {location}");
    }
    Ok(())
}

fn demo_app() -> anyhow::Result<App> {
    let mut app = App::new();

    app.container()
        .set_value("view", Arc::new(ViewSlot::new(JsonView::new())));

    app.handlers_mut().set_alias("it_works", HandlerSpec::func(it_works));
    app.handlers_mut()
        .register_controller("Example", || Box::new(ExampleController));

    app.set_routing(vec![
        ("root".to_string(), RouteDef::pattern("/", "it_works")),
        // Path inferred from the route name: /basic
        ("basic".to_string(), RouteDef::handler("it_works")),
        (
            "params".to_string(),
            RouteDef::pattern(r"/p/{b1:\d+}[/{b2}]", "it_works"),
        ),
        (
            "controller".to_string(),
            RouteDef::pattern("/c/{action}", "Example:looking_for"),
        ),
        (
            "redirect".to_string(),
            RouteDef::pattern(
                "/r/{name}",
                HandlerSpec::func(|ctx, params, _prev| {
                    let target = params["name"].clone();
                    ctx.redirect_to(&target, &Params::new(), &[])?;
                    Ok(Value::Null)
                }),
            ),
        ),
    ])?;

    Ok(app)
}

fn it_works(ctx: &mut Context<'_>, params: &Params, _prev: Value) -> anyhow::Result<Value> {
    ctx.prepare_view(
        "",
        json!({
            "message": "It works!",
            "params": serde_json::to_value(params)?,
            "try": ["/basic", "/p/12345/second", "/c/peace", "/r/basic", "/not_found"],
        }),
    )?;
    Ok(Value::Null)
}

struct ExampleController;

impl Controller for ExampleController {
    fn invoke(
        &self,
        action: &str,
        ctx: &mut Context<'_>,
        params: &Params,
        _prev: Value,
    ) -> Result<Value, Error> {
        match action {
            "looking_for" => {
                ctx.prepare_view(
                    "",
                    json!({
                        "you_are_looking_for": params.get("action"),
                    }),
                )?;
                Ok(Value::Null)
            }
            other => Err(Error::HandlerResolution {
                reason: format!("controller 'Example' has no action '{other}'"),
            }),
        }
    }
}
