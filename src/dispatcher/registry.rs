//! Handler registry: alias table and named controller constructors.

use crate::dispatcher::core::Context;
use crate::error::Error;
use crate::Params;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Aliases may point at other aliases; chains longer than this are
/// treated as cycles.
const MAX_ALIAS_DEPTH: usize = 32;

/// A directly invocable handler unit.
///
/// Handlers receive the execution context (through which they can mutate
/// the in-flight queue, reach the container, or redirect), the extracted
/// route parameters, and the previous handler's output; their return value
/// becomes the next handler's `prev`.
pub type HandlerFn =
    Arc<dyn Fn(&mut Context<'_>, &Params, Value) -> anyhow::Result<Value> + Send + Sync>;

/// A controller: a named bundle of actions addressable as `"Name:action"`.
///
/// A fresh instance is constructed (via its registered constructor) each
/// time a `"Name:action"` handler string is resolved. Implementations
/// return [`Error::HandlerResolution`] for actions they do not know.
pub trait Controller: Send + Sync {
    fn invoke(
        &self,
        action: &str,
        ctx: &mut Context<'_>,
        params: &Params,
        prev: Value,
    ) -> Result<Value, Error>;
}

type ControllerCtor = Box<dyn Fn() -> Box<dyn Controller> + Send + Sync>;

/// A route's handler specification.
///
/// Resolved lazily at execution time, never at configuration time, so
/// routes may reference aliases registered later.
#[derive(Clone)]
pub enum HandlerSpec {
    /// A directly invocable handler
    Func(HandlerFn),
    /// An alias name or a `"Controller:action"` reference
    Name(String),
    /// An ordered list of handler specs, flattened into the queue at
    /// insertion time
    Seq(Vec<HandlerSpec>),
}

impl HandlerSpec {
    /// Wrap a closure or fn as a handler spec.
    pub fn func(
        f: impl Fn(&mut Context<'_>, &Params, Value) -> anyhow::Result<Value> + Send + Sync + 'static,
    ) -> Self {
        HandlerSpec::Func(Arc::new(f))
    }

    pub fn name(name: impl Into<String>) -> Self {
        HandlerSpec::Name(name.into())
    }

    pub fn seq(specs: impl IntoIterator<Item = HandlerSpec>) -> Self {
        HandlerSpec::Seq(specs.into_iter().collect())
    }
}

impl fmt::Debug for HandlerSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerSpec::Func(_) => f.write_str("Func(<handler>)"),
            HandlerSpec::Name(name) => write!(f, "Name({name:?})"),
            HandlerSpec::Seq(items) => f.debug_tuple("Seq").field(items).finish(),
        }
    }
}

impl From<&str> for HandlerSpec {
    fn from(name: &str) -> Self {
        HandlerSpec::Name(name.to_string())
    }
}

impl From<String> for HandlerSpec {
    fn from(name: String) -> Self {
        HandlerSpec::Name(name)
    }
}

impl From<Vec<HandlerSpec>> for HandlerSpec {
    fn from(specs: Vec<HandlerSpec>) -> Self {
        HandlerSpec::Seq(specs)
    }
}

/// A spec resolved to something the run loop can act on.
pub(crate) enum Resolution {
    /// Invoke this unit
    Action(ResolvedHandler),
    /// The name resolved to a list; expand it at the front of the queue
    Expand(Vec<HandlerSpec>),
}

/// An invocable resolution product.
pub(crate) enum ResolvedHandler {
    Func(HandlerFn),
    Bound {
        controller: Box<dyn Controller>,
        action: String,
    },
}

impl ResolvedHandler {
    pub(crate) fn call(
        &self,
        ctx: &mut Context<'_>,
        params: &Params,
        prev: Value,
    ) -> Result<Value, Error> {
        match self {
            ResolvedHandler::Func(f) => f(ctx, params, prev).map_err(Error::from),
            ResolvedHandler::Bound { controller, action } => {
                controller.invoke(action, ctx, params, prev)
            }
        }
    }
}

/// Registry consulted when string handlers are resolved.
///
/// The alias table is checked first; a string that is no alias must be a
/// `"Controller:action"` pair whose controller name (after the configured
/// prefix is applied) has a registered constructor.
#[derive(Default)]
pub struct HandlerRegistry {
    aliases: HashMap<String, HandlerSpec>,
    controllers: HashMap<String, ControllerCtor>,
    controller_prefix: String,
}

impl HandlerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or override) an alias. Later registrations win.
    pub fn set_alias(&mut self, name: impl Into<String>, spec: impl Into<HandlerSpec>) {
        let name = name.into();
        if self.aliases.insert(name.clone(), spec.into()).is_some() {
            debug!(alias = %name, "handler alias overridden");
        } else {
            debug!(alias = %name, "handler alias registered");
        }
    }

    /// Register a controller constructor under `name`.
    pub fn register_controller(
        &mut self,
        name: impl Into<String>,
        ctor: impl Fn() -> Box<dyn Controller> + Send + Sync + 'static,
    ) {
        let name = name.into();
        debug!(controller = %name, "controller registered");
        self.controllers.insert(name, Box::new(ctor));
    }

    /// Prefix applied to controller names before registry lookup.
    pub fn set_controller_prefix(&mut self, prefix: impl Into<String>) {
        self.controller_prefix = prefix.into();
    }

    pub(crate) fn resolve(&self, spec: &HandlerSpec) -> Result<Resolution, Error> {
        match spec {
            HandlerSpec::Func(f) => Ok(Resolution::Action(ResolvedHandler::Func(Arc::clone(f)))),
            HandlerSpec::Seq(_) => Err(Error::HandlerResolution {
                reason: "handler list reached resolution unflattened".to_string(),
            }),
            HandlerSpec::Name(name) => self.resolve_name(name, 0),
        }
    }

    fn resolve_name(&self, name: &str, depth: usize) -> Result<Resolution, Error> {
        if depth > MAX_ALIAS_DEPTH {
            return Err(Error::HandlerResolution {
                reason: format!("alias chain starting at '{name}' is too deep or cyclic"),
            });
        }

        if let Some(target) = self.aliases.get(name) {
            return match target {
                HandlerSpec::Func(f) => {
                    Ok(Resolution::Action(ResolvedHandler::Func(Arc::clone(f))))
                }
                HandlerSpec::Name(next) => self.resolve_name(next, depth + 1),
                HandlerSpec::Seq(items) => Ok(Resolution::Expand(items.clone())),
            };
        }

        let Some((controller_name, action)) = name.split_once(':') else {
            return Err(Error::HandlerSyntax {
                handler: name.to_string(),
            });
        };

        let key = format!("{}{}", self.controller_prefix, controller_name);
        let ctor = self.controllers.get(&key).ok_or_else(|| Error::HandlerResolution {
            reason: format!("no controller registered as '{key}'"),
        })?;

        Ok(Resolution::Action(ResolvedHandler::Bound {
            controller: ctor(),
            action: action.to_string(),
        }))
    }
}
