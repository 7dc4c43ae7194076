//! Routing table: ordered named route definitions and their normalization.

use crate::dispatcher::HandlerSpec;
use crate::error::PatternError;
use crate::pattern::RoutePattern;
use http::Method;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info};

/// Name of the synthetic fallback route. Always present, never removed;
/// its handler may be overridden by registering a route under this name.
pub const DEFAULT_ROUTE: &str = "default";

/// Set of HTTP methods a route accepts.
#[derive(Debug, Clone)]
pub enum MethodSet {
    /// Accept any method (`"*"`)
    Any,
    /// Accept exactly these methods
    Of(Vec<Method>),
}

impl MethodSet {
    #[must_use]
    pub fn allows(&self, method: &Method) -> bool {
        match self {
            MethodSet::Any => true,
            MethodSet::Of(methods) => methods.contains(method),
        }
    }

    /// The shorthand default when a definition supplies only pattern+handler.
    #[must_use]
    pub fn get_or_post() -> Self {
        MethodSet::Of(vec![Method::GET, Method::POST])
    }
}

impl fmt::Display for MethodSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodSet::Any => write!(f, "*"),
            MethodSet::Of(methods) => {
                for (i, m) in methods.iter().enumerate() {
                    if i > 0 {
                        write!(f, "|")?;
                    }
                    write!(f, "{m}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<Method> for MethodSet {
    fn from(method: Method) -> Self {
        MethodSet::Of(vec![method])
    }
}

impl From<Vec<Method>> for MethodSet {
    fn from(methods: Vec<Method>) -> Self {
        MethodSet::Of(methods)
    }
}

/// A fully normalized, compiled route.
#[derive(Debug, Clone)]
pub struct Route {
    pub name: String,
    pub methods: MethodSet,
    pub pattern: RoutePattern,
    pub handler: HandlerSpec,
}

/// One route definition as supplied to `set_routing`, before normalization.
///
/// Three shapes exist, mirroring the configuration contract:
/// handler only (path inferred from the route name), pattern+handler
/// (methods default to GET|POST), and methods+pattern+handler.
#[derive(Debug, Clone)]
pub struct RouteDef {
    methods: Option<MethodSet>,
    pattern: Option<String>,
    handler: HandlerSpec,
}

impl RouteDef {
    /// `[handler]` shorthand: the path becomes `"/" + route name`.
    pub fn handler(handler: impl Into<HandlerSpec>) -> Self {
        Self {
            methods: None,
            pattern: None,
            handler: handler.into(),
        }
    }

    /// `[pattern, handler]` shorthand: methods default to GET|POST.
    pub fn pattern(pattern: impl Into<String>, handler: impl Into<HandlerSpec>) -> Self {
        Self {
            methods: None,
            pattern: Some(pattern.into()),
            handler: handler.into(),
        }
    }

    /// Fully specified `[methods, pattern, handler]` definition.
    pub fn full(
        methods: impl Into<MethodSet>,
        pattern: impl Into<String>,
        handler: impl Into<HandlerSpec>,
    ) -> Self {
        Self {
            methods: Some(methods.into()),
            pattern: Some(pattern.into()),
            handler: handler.into(),
        }
    }
}

/// Ordered mapping from route name to compiled route.
///
/// Registration order is match priority. The synthetic [`DEFAULT_ROUTE`]
/// lives outside the ordered list: it never participates in forward matching
/// and is only consulted as the fallback when nothing else matched.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
    index: HashMap<String, usize>,
    default_route: Route,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteTable {
    #[must_use]
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            index: HashMap::new(),
            default_route: Self::synthetic_default(),
        }
    }

    fn synthetic_default() -> Route {
        #[allow(clippy::expect_used)]
        let pattern = RoutePattern::compile("*").expect("static fallback pattern is valid");
        Route {
            name: DEFAULT_ROUTE.to_string(),
            methods: MethodSet::Any,
            pattern,
            handler: HandlerSpec::func(|_ctx, _params, _prev| {
                Ok(Value::String("Not found.".to_string()))
            }),
        }
    }

    /// Merge route definitions into the table.
    ///
    /// New definitions take precedence over existing ones with the same
    /// name; an existing route keeps its registration position, unknown
    /// names append. Patterns are compiled here, so a malformed pattern
    /// fails the whole call immediately and leaves the table unchanged.
    pub fn set_routing(
        &mut self,
        defs: Vec<(String, RouteDef)>,
    ) -> Result<(), PatternError> {
        let mut normalized = Vec::with_capacity(defs.len());
        for (name, def) in defs {
            normalized.push(Self::normalize(name, def)?);
        }

        for route in normalized {
            if route.name == DEFAULT_ROUTE {
                debug!(route = %route.name, "fallback route handler overridden");
                self.default_route = route;
            } else if let Some(&i) = self.index.get(&route.name) {
                debug!(route = %route.name, position = i, "route definition replaced");
                self.routes[i] = route;
            } else {
                self.index.insert(route.name.clone(), self.routes.len());
                self.routes.push(route);
            }
        }

        info!(routes_count = self.routes.len(), "routing table updated");
        Ok(())
    }

    fn normalize(name: String, def: RouteDef) -> Result<Route, PatternError> {
        let pattern_str = def
            .pattern
            .unwrap_or_else(|| format!("/{}", name.trim_start_matches('/')));
        let methods = def.methods.unwrap_or_else(MethodSet::get_or_post);
        let pattern = RoutePattern::compile(&pattern_str)?;
        Ok(Route {
            name,
            methods,
            pattern,
            handler: def.handler,
        })
    }

    /// Look up a route by name, the fallback route included.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Route> {
        if name == DEFAULT_ROUTE {
            return Some(&self.default_route);
        }
        self.index.get(name).map(|&i| &self.routes[i])
    }

    /// Routes in registration order, fallback route excluded.
    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    #[must_use]
    pub fn default_route(&self) -> &Route {
        &self.default_route
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
