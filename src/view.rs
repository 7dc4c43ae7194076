//! View rendering collaborators.
//!
//! Handlers *prepare* a view during pipeline execution; the run loop calls
//! *render* exactly once after the pipeline completes to produce the
//! response body. Two renderers ship with the core: plain `{key}` template
//! substitution and JSON serialization of the prepared params.

use serde_json::Value;
use std::sync::Mutex;

/// A response renderer.
pub trait View: Send {
    /// Stage template/data for rendering. May be called more than once;
    /// the last call wins.
    fn prepare(&mut self, template: &str, params: Value);

    /// Render the prepared state to the response body text.
    fn render(&self) -> String;

    /// Whether `prepare` has been called since the last reset.
    fn is_prepared(&self) -> bool;

    /// Forget any prepared state (called at the start of each request).
    fn reset(&mut self);
}

/// Template renderer substituting `{key}` markers with param values.
///
/// Strings substitute verbatim; numbers and booleans via their display
/// form; `null` as the empty string; arrays and objects as their JSON text.
#[derive(Debug, Default)]
pub struct SimpleView {
    template: String,
    params: Value,
    prepared: bool,
}

impl SimpleView {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl View for SimpleView {
    fn prepare(&mut self, template: &str, params: Value) {
        self.template = template.to_string();
        self.params = params;
        self.prepared = true;
    }

    fn render(&self) -> String {
        let mut out = self.template.clone();
        if let Value::Object(map) = &self.params {
            for (key, value) in map {
                out = out.replace(&format!("{{{key}}}"), &scalar_text(value));
            }
        }
        out
    }

    fn is_prepared(&self) -> bool {
        self.prepared
    }

    fn reset(&mut self) {
        self.template.clear();
        self.params = Value::Null;
        self.prepared = false;
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Renderer emitting the prepared params as a JSON document.
/// The template argument is ignored.
#[derive(Debug, Default)]
pub struct JsonView {
    params: Value,
    prepared: bool,
}

impl JsonView {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl View for JsonView {
    fn prepare(&mut self, _template: &str, params: Value) {
        self.params = params;
        self.prepared = true;
    }

    fn render(&self) -> String {
        self.params.to_string()
    }

    fn is_prepared(&self) -> bool {
        self.prepared
    }

    fn reset(&mut self) {
        self.params = Value::Null;
        self.prepared = false;
    }
}

/// Container-storable cell around a boxed renderer.
///
/// Handlers reach the slot through a shared `Arc`, so preparation goes
/// through interior mutability while the run loop renders once afterwards.
pub struct ViewSlot {
    inner: Mutex<Box<dyn View>>,
}

impl ViewSlot {
    pub fn new(view: impl View + 'static) -> Self {
        Self {
            inner: Mutex::new(Box::new(view)),
        }
    }

    pub fn prepare(&self, template: &str, params: Value) {
        self.lock().prepare(template, params);
    }

    #[must_use]
    pub fn render(&self) -> String {
        self.lock().render()
    }

    #[must_use]
    pub fn is_prepared(&self) -> bool {
        self.lock().is_prepared()
    }

    pub fn reset(&self) {
        self.lock().reset();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Box<dyn View>> {
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
