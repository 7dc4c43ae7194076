//! Application façade: routing configuration, dispatch entry points and
//! reverse routing.

use crate::container::Container;
use crate::dispatcher::{self, HandlerRegistry};
use crate::error::{Error, PatternError};
use crate::reverse;
use crate::router::{RouteDef, RouteMatch, RouteTable, Router, DEFAULT_ROUTE};
use crate::runtime_config::RuntimeConfig;
use crate::view::ViewSlot;
use crate::Params;
use http::Method;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};
use url::Url;

/// Result of one full request run, handed to the transport layer.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Rendered response body: the prepared view's output if any handler
    /// prepared one, otherwise the final pipeline output stringified
    pub body: String,
    /// Redirect location recorded by a handler, if any
    pub redirect: Option<String>,
}

/// The application: container, routing table, handler registry and the
/// cached dispatch structure.
///
/// One request is processed per [`App::run`]/[`App::run_as`] call; the
/// compiled dispatch structure is read-only during matching and rebuilt
/// only on reconfiguration (both require `&mut self`, so the single-writer
/// discipline is enforced by the borrow checker).
#[derive(Default)]
pub struct App {
    container: Container,
    routes: RouteTable,
    registry: HandlerRegistry,
    /// Compiled dispatch structure; `None` until first use or after
    /// reconfiguration
    router: Option<Router>,
    error_route: Option<String>,
    redirect: Option<String>,
}

impl App {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `new()` plus [`RuntimeConfig::from_env`] applied.
    #[must_use]
    pub fn from_env() -> Self {
        let mut app = Self::new();
        app.apply_config(&RuntimeConfig::from_env());
        app
    }

    /// Apply runtime configuration to the container and registry.
    pub fn apply_config(&mut self, config: &RuntimeConfig) {
        if let Some(base_path) = &config.base_path {
            self.container.set_string("base_path", base_path.clone());
            self.router = None;
        }
        if let Some(prefix) = &config.controller_prefix {
            self.registry.set_controller_prefix(prefix.clone());
        }
        if let Some(error_route) = &config.error_route {
            self.error_route = Some(error_route.clone());
        }
    }

    /// The dependency container (`get`/`set` service access).
    pub fn container(&mut self) -> &mut Container {
        &mut self.container
    }

    /// The alias table and controller registry.
    #[must_use]
    pub fn handlers(&self) -> &HandlerRegistry {
        &self.registry
    }

    pub fn handlers_mut(&mut self) -> &mut HandlerRegistry {
        &mut self.registry
    }

    /// The routing table (read-only; configure via [`App::set_routing`]).
    #[must_use]
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Designate the route run as the second stage when a request
    /// pipeline raises (see [`App::run`]).
    pub fn set_error_route(&mut self, name: impl Into<String>) {
        self.error_route = Some(name.into());
    }

    /// Merge route definitions into the table and invalidate the cached
    /// dispatch structure. Malformed patterns fail the whole call.
    pub fn set_routing(&mut self, defs: Vec<(String, RouteDef)>) -> Result<(), PatternError> {
        self.router = None;
        self.routes.set_routing(defs)
    }

    /// Determine which route handles `method` + `uri`.
    ///
    /// Pure with respect to the routing table; the query string portion of
    /// `uri` is ignored and the configured base path is stripped. Returns
    /// `None` when nothing but the fallback route applies.
    pub fn route(&mut self, method: &Method, uri: &str) -> Option<RouteMatch> {
        let (path, _query) = split_uri(uri);
        self.ensure_router();
        self.router.as_ref()?.route(method, path)
    }

    /// Execute a named route's handler pipeline with the given params and
    /// return the final output.
    pub fn run_as(&mut self, name: &str, params: &Params) -> Result<Value, Error> {
        let spec = self
            .routes
            .get(name)
            .ok_or_else(|| Error::RouteNotFound {
                name: name.to_string(),
            })?
            .handler
            .clone();
        dispatcher::execute(self, spec, params)
    }

    /// Handle one request end to end.
    ///
    /// Matches `method` + `uri` (falling back to the `default` route),
    /// runs the matched route's pipeline, then renders: if a view renderer
    /// (container key `view`) was prepared during the run its output is
    /// the body, otherwise the final pipeline value is stringified.
    ///
    /// Two-stage dispatch: when an error route is designated and the first
    /// pipeline raises, the error route runs with the original params plus
    /// an `error` param carrying the failure text; a failing error route
    /// propagates the original error.
    pub fn run(&mut self, method: &Method, uri: &str) -> Result<RunOutcome, Error> {
        self.redirect = None;
        if let Some(slot) = self.container.get_as::<ViewSlot>("view") {
            slot.reset();
        }

        let (_path, query) = split_uri(uri);
        let query_map: HashMap<String, String> = url::form_urlencoded::parse(
            query.unwrap_or_default().as_bytes(),
        )
        .into_owned()
        .collect();
        self.container.set_value("request.query", Arc::new(query_map));

        let (name, params) = match self.route(method, uri) {
            Some(m) => (m.route_name.to_string(), m.params_map()),
            None => (DEFAULT_ROUTE.to_string(), Params::new()),
        };
        info!(method = %method, uri = %uri, route = %name, "request dispatched");

        let output = match self.run_as(&name, &params) {
            Ok(value) => value,
            Err(err) => self.dispatch_error_route(&name, params, err)?,
        };

        let body = self.render_body(output);
        Ok(RunOutcome {
            body,
            redirect: self.redirect.take(),
        })
    }

    /// Generate a concrete path for a named route, base path prepended and
    /// query pairs appended.
    pub fn route_path(
        &mut self,
        name: &str,
        params: &Params,
        query: &[(&str, &str)],
    ) -> Result<String, Error> {
        let base_path = self.base_path();
        let route = self.routes.get(name).ok_or_else(|| Error::RouteNotFound {
            name: name.to_string(),
        })?;
        let mut path = format!("{}{}", base_path, reverse::generate_path(route, params)?);
        if !query.is_empty() {
            path.push('?');
            path.push_str(&reverse::build_query(query));
        }
        Ok(path)
    }

    /// [`App::route_path`] as an absolute URL, using the request scheme and
    /// host from the container (`scheme` defaults to `http`; a missing
    /// `host` is an error).
    pub fn route_full_path(
        &mut self,
        name: &str,
        params: &Params,
        query: &[(&str, &str)],
    ) -> Result<String, Error> {
        let scheme = self
            .container
            .get_str("scheme")
            .unwrap_or_else(|| "http".to_string());
        let host = self
            .container
            .get_str("host")
            .ok_or_else(|| Error::MissingService {
                key: "host".to_string(),
            })?;
        let path = self.route_path(name, params, query)?;
        let url = Url::parse(&format!("{scheme}://{host}/"))?.join(&path)?;
        Ok(url.to_string())
    }

    /// Record a redirect to a named route and return the computed
    /// location. During a run the recorded location surfaces through
    /// [`RunOutcome::redirect`]; handlers should prefer
    /// [`crate::dispatcher::Context::redirect_to`], which also halts the
    /// remaining queue.
    pub fn redirect_to(
        &mut self,
        name: &str,
        params: &Params,
        query: &[(&str, &str)],
    ) -> Result<String, Error> {
        let location = self.route_path(name, params, query)?;
        self.redirect = Some(location.clone());
        Ok(location)
    }

    fn dispatch_error_route(
        &mut self,
        failed_route: &str,
        mut params: Params,
        err: Error,
    ) -> Result<Value, Error> {
        let Some(error_route) = self.error_route.clone() else {
            return Err(err);
        };
        if error_route == failed_route || self.routes.get(&error_route).is_none() {
            return Err(err);
        }

        warn!(
            route = %failed_route,
            error_route = %error_route,
            error = %err,
            "pipeline raised; dispatching error route"
        );
        params.insert("error".to_string(), err.to_string());
        match self.run_as(&error_route, &params) {
            Ok(value) => Ok(value),
            // A broken error route must not mask the original failure.
            Err(_) => Err(err),
        }
    }

    fn render_body(&mut self, output: Value) -> String {
        if let Some(slot) = self.container.get_as::<ViewSlot>("view") {
            if slot.is_prepared() {
                return slot.render();
            }
        }
        match output {
            Value::Null => String::new(),
            Value::String(text) => text,
            other => other.to_string(),
        }
    }

    fn base_path(&mut self) -> String {
        self.container.get_str("base_path").unwrap_or_default()
    }

    fn ensure_router(&mut self) {
        if self.router.is_none() {
            let base_path = self.base_path();
            self.router = Some(Router::new(&self.routes, &base_path));
        }
    }
}

fn split_uri(uri: &str) -> (&str, Option<&str>) {
    match uri.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (uri, None),
    }
}
