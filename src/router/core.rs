//! Router core module - hot path for request matching.

use crate::pattern::{Alternative, Token};
use crate::router::table::RouteTable;
use http::Method;
use regex::Regex;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Maximum number of path parameters before heap allocation.
/// Most routes have well under 8 placeholders.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated parameter storage for the match hot path.
///
/// Param names use `Arc<str>` because they come from the static route
/// table (known at configuration time); values are per-request data
/// captured from the URL and stay `String`.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Result of successfully matching a request path to a route.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    /// Name of the matched route
    pub route_name: Arc<str>,
    /// Path parameters extracted from the URL (e.g. `{id}` → `("id", "123")`)
    pub params: ParamVec,
}

impl RouteMatch {
    /// Get an extracted parameter by name.
    #[inline]
    #[must_use]
    pub fn get_param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Convert params to a HashMap for handler-facing code.
    /// Note: this allocates - use `get_param()` in hot paths instead.
    #[must_use]
    pub fn params_map(&self) -> HashMap<String, String> {
        self.params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }
}

struct CompiledAlternative {
    regex: Regex,
    param_names: Vec<Arc<str>>,
}

struct CompiledRoute {
    name: Arc<str>,
    methods: crate::router::MethodSet,
    /// Longest alternative first, mirroring the pattern's own ordering
    alternatives: Vec<CompiledAlternative>,
}

/// Compiled dispatch structure built from the routing table.
///
/// One anchored regex per pattern alternative. Routes are tested in
/// registration order (the fallback route is excluded entirely); within a
/// route, alternatives are tested longest first. Read-only once built;
/// reconfiguration replaces the whole structure.
pub struct Router {
    routes: Vec<CompiledRoute>,
    base_path: String,
}

impl Router {
    /// Build the dispatch structure from every non-fallback route.
    #[must_use]
    pub fn new(table: &RouteTable, base_path: &str) -> Self {
        let routes: Vec<CompiledRoute> = table
            .iter()
            .map(|route| CompiledRoute {
                name: Arc::from(route.name.as_str()),
                methods: route.methods.clone(),
                alternatives: route
                    .pattern
                    .alternatives()
                    .iter()
                    .map(compile_alternative)
                    .collect(),
            })
            .collect();

        info!(
            routes_count = routes.len(),
            base_path = %base_path,
            "dispatch structure compiled"
        );

        Self {
            routes,
            base_path: base_path.to_string(),
        }
    }

    /// Match an HTTP request against the table.
    ///
    /// `path` is the path portion only (no query string); a configured
    /// base-path prefix is stripped before matching. Returns `None` when
    /// nothing but the fallback route applies.
    #[must_use]
    pub fn route(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        let path = self.strip_base_path(path);

        debug!(method = %method, path = %path, "route match attempt");
        let match_start = std::time::Instant::now();

        for route in &self.routes {
            if !route.methods.allows(method) {
                continue;
            }
            for alt in &route.alternatives {
                let Some(caps) = alt.regex.captures(path) else {
                    continue;
                };
                let mut params = ParamVec::new();
                for (i, name) in alt.param_names.iter().enumerate() {
                    if let Some(m) = caps.name(&group_name(i)) {
                        params.push((Arc::clone(name), m.as_str().to_string()));
                    }
                }
                info!(
                    method = %method,
                    path = %path,
                    route = %route.name,
                    params = ?params,
                    duration_us = match_start.elapsed().as_micros() as u64,
                    "route matched"
                );
                return Some(RouteMatch {
                    route_name: Arc::clone(&route.name),
                    params,
                });
            }
        }

        warn!(
            method = %method,
            path = %path,
            duration_us = match_start.elapsed().as_micros() as u64,
            "no route matched"
        );
        None
    }

    fn strip_base_path<'p>(&self, path: &'p str) -> &'p str {
        if self.base_path.is_empty() {
            return path;
        }
        match path.strip_prefix(&self.base_path) {
            Some("") => "/",
            Some(rest) => rest,
            None => path,
        }
    }
}

fn group_name(index: usize) -> String {
    format!("p{index}")
}

/// Convert one pattern alternative to an anchored regex plus the ordered
/// parameter-name list. Placeholders become named groups `p0..pn` so inline
/// constraint groups cannot shift capture indices.
fn compile_alternative(alt: &Alternative) -> CompiledAlternative {
    let mut pattern = String::with_capacity(32);
    pattern.push('^');
    let mut param_names: Vec<Arc<str>> = Vec::new();

    for token in alt.tokens() {
        match token {
            Token::Literal(text) => pattern.push_str(&regex::escape(text)),
            Token::Placeholder { name, constraint } => {
                let inner = constraint.as_deref().unwrap_or("[^/]+");
                pattern.push_str(&format!("(?P<p{}>(?:{}))", param_names.len(), inner));
                param_names.push(Arc::from(name.as_str()));
            }
        }
    }

    pattern.push('$');
    // Constraints were validated at pattern-compile time in this same
    // anchored, non-capturing embedding.
    #[allow(clippy::expect_used)]
    let regex = Regex::new(&pattern).expect("failed to compile route regex");

    CompiledAlternative { regex, param_names }
}
