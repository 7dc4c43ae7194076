//! # shunt
//!
//! **shunt** is a minimal, synchronous request-routing and handler-execution
//! core: named routes with optional segments and regex-constrained
//! placeholders, reverse path generation, and a per-request handler pipeline
//! whose queue can be mutated while it drains.
//!
//! ## Overview
//!
//! Given an incoming method+path, shunt selects a named route, extracts its
//! path parameters and executes an ordered chain of handlers against them,
//! threading each handler's return value into the next. The same route
//! table drives reverse mapping: a route name plus parameter values yields
//! a concrete path.
//!
//! Transport concerns (status codes, headers, sockets) stay outside: the
//! host hands in a method and a URI and gets back a rendered body plus an
//! optional redirect location.
//!
//! ## Architecture
//!
//! - **[`pattern`]** - pattern compilation: `{name}`, `{name:regex}` and
//!   trailing `[...]` optional segments become ordered token alternatives
//! - **[`router`]** - the ordered routing table and the compiled dispatch
//!   structure, matched first-route-wins in registration order
//! - **[`reverse`]** - longest-satisfiable reverse path generation
//! - **[`dispatcher`]** - handler resolution (closures, aliases,
//!   `"Controller:action"` pairs, nested lists) and the per-request queue
//!   with front/back insertion and cooperative stop
//! - **[`container`]** - lazy memoizing dependency container
//! - **[`view`]** - response renderers (template substitution, JSON)
//! - **[`session`]** - flash vs persistent key-value session store
//! - **[`app`]** - the façade tying the pieces together
//!
//! ## Quick Start
//!
//! ```
//! use http::Method;
//! use serde_json::json;
//! use shunt::{App, HandlerSpec, RouteDef};
//!
//! let mut app = App::new();
//! app.set_routing(vec![(
//!     "hello".to_string(),
//!     RouteDef::pattern(
//!         "/hello/{name}",
//!         HandlerSpec::func(|_ctx, params, _prev| {
//!             Ok(json!({ "greeting": format!("Hello, {}!", params["name"]) }))
//!         }),
//!     ),
//! )])?;
//!
//! let outcome = app.run(&Method::GET, "/hello/world")?;
//! assert_eq!(outcome.body, r#"{"greeting":"Hello, world!"}"#);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Execution Model
//!
//! Strictly synchronous and cooperative: one request per
//! [`App::run`]/[`App::run_as`] call, every handler a direct blocking call.
//! The handler queue is owned exclusively by the in-flight execution, so
//! nested or subsequent runs cannot interfere with each other. The compiled
//! dispatch structure is read-only during matching and rebuilt only on
//! reconfiguration; both paths take `&mut App`, which enforces the
//! single-writer discipline at compile time.

pub mod app;
pub mod container;
pub mod dispatcher;
pub mod error;
pub mod ids;
pub mod pattern;
pub mod reverse;
pub mod router;
pub mod runtime_config;
pub mod session;
pub mod view;

pub use app::{App, RunOutcome};
pub use dispatcher::{Context, Controller, HandlerFn, HandlerRegistry, HandlerSpec};
pub use error::{Error, PatternError};
pub use ids::RunId;
pub use router::{MethodSet, RouteDef, RouteMatch, RouteTable, DEFAULT_ROUTE};
pub use runtime_config::RuntimeConfig;

/// Named path parameters extracted by the matcher, as handlers consume them.
pub type Params = std::collections::HashMap<String, String>;
