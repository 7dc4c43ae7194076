//! Lazy, memoizing dependency container.
//!
//! A key→value store in which a stored setting may be a direct value, a
//! zero-argument factory invoked exactly once, or the name of a registered
//! constructor run exactly once. Resolution happens on first `get` and the
//! result is cached thereafter; re-`set`ting a key discards its cached
//! resolution.
//!
//! The dispatch core itself consults only a handful of conventional keys
//! (`view`, `base_path`, `scheme`, `host`); everything else is application
//! state.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// A resolved container entry. Shared, type-erased, thread-friendly.
pub type Service = Arc<dyn Any + Send + Sync>;

/// Factory form of a setting; invoked exactly once, result cached.
pub type ServiceFactory = Box<dyn Fn() -> Service + Send + Sync>;

/// A named constructor. Registered up front so settings can refer to
/// constructible services by name without any runtime reflection.
pub type ServiceCtor = fn() -> Service;

enum Setting {
    Value(Service),
    Factory(ServiceFactory),
    Constructor(String),
}

/// The container itself. See the module docs for resolution semantics.
#[derive(Default)]
pub struct Container {
    settings: HashMap<String, Setting>,
    resolved: HashMap<String, Service>,
    constructors: HashMap<String, ServiceCtor>,
}

impl Container {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a ready value under `name`.
    pub fn set_value(&mut self, name: impl Into<String>, value: Service) {
        let name = name.into();
        self.resolved.remove(&name);
        self.settings.insert(name, Setting::Value(value));
    }

    /// Convenience for plain string values (`base_path`, `host`, ...).
    pub fn set_string(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.set_value(name, Arc::new(value.into()));
    }

    /// Store a factory; it runs once, on first `get`, and never again.
    pub fn set_factory(
        &mut self,
        name: impl Into<String>,
        factory: impl Fn() -> Service + Send + Sync + 'static,
    ) {
        let name = name.into();
        self.resolved.remove(&name);
        self.settings.insert(name, Setting::Factory(Box::new(factory)));
    }

    /// Store a reference to a named constructor (see [`Container::register_constructor`]).
    pub fn set_constructor(&mut self, name: impl Into<String>, ctor_name: impl Into<String>) {
        let name = name.into();
        self.resolved.remove(&name);
        self.settings
            .insert(name, Setting::Constructor(ctor_name.into()));
    }

    /// Register a constructor under a name, so settings can point at it.
    pub fn register_constructor(&mut self, ctor_name: impl Into<String>, ctor: ServiceCtor) {
        self.constructors.insert(ctor_name.into(), ctor);
    }

    /// Resolve an entry, memoizing the result.
    ///
    /// Returns `None` for unknown keys and for constructor settings whose
    /// constructor was never registered.
    pub fn get(&mut self, name: &str) -> Option<Service> {
        if let Some(service) = self.resolved.get(name) {
            return Some(Arc::clone(service));
        }

        let service = match self.settings.get(name)? {
            Setting::Value(value) => Arc::clone(value),
            Setting::Factory(factory) => {
                debug!(item = %name, "container factory invoked");
                factory()
            }
            Setting::Constructor(ctor_name) => {
                let ctor = self.constructors.get(ctor_name)?;
                debug!(item = %name, constructor = %ctor_name, "container constructor invoked");
                ctor()
            }
        };

        self.resolved.insert(name.to_string(), Arc::clone(&service));
        Some(service)
    }

    /// Typed [`Container::get`]: downcast the resolved entry to `T`.
    pub fn get_as<T: Any + Send + Sync>(&mut self, name: &str) -> Option<Arc<T>> {
        self.get(name)?.downcast::<T>().ok()
    }

    /// String [`Container::get`] for entries stored via [`Container::set_string`].
    pub fn get_str(&mut self, name: &str) -> Option<String> {
        self.get_as::<String>(name).map(|s| (*s).clone())
    }

    /// Whether an entry (resolved or not) exists for `name`.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.settings.contains_key(name) || self.resolved.contains_key(name)
    }
}
