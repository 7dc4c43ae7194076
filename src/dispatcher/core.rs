//! Dispatcher core module - the per-request handler pipeline.
//!
//! Each `run`/`run_as` invocation owns exactly one [`Context`] and its
//! queue; no two executions ever share a queue. Handlers run sequentially
//! as direct blocking calls, each receiving the previous handler's output,
//! and may mutate the remaining queue (front/back insertion, full clear)
//! while they execute.

use crate::app::App;
use crate::dispatcher::registry::{HandlerSpec, Resolution};
use crate::error::Error;
use crate::ids::RunId;
use crate::view::ViewSlot;
use crate::Params;
use serde_json::Value;
use std::collections::VecDeque;
use tracing::{debug, info};

/// Execution context handed to every handler invocation.
///
/// Owns the in-flight handler queue and borrows the [`App`] so handlers
/// can reach the container, reverse routing and the registry.
pub struct Context<'a> {
    /// The application this pipeline runs against
    pub app: &'a mut App,
    queue: VecDeque<HandlerSpec>,
    run_id: RunId,
    stopped: bool,
}

impl<'a> Context<'a> {
    pub(crate) fn new(app: &'a mut App) -> Self {
        Self {
            app,
            queue: VecDeque::new(),
            run_id: RunId::new(),
            stopped: false,
        }
    }

    /// Identifier of this pipeline run, for log correlation.
    #[must_use]
    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Number of units still pending.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Enqueue a handler spec at the back of the queue.
    ///
    /// List-shaped specs are flattened into individual units here, at
    /// insertion time.
    pub fn append_handler_queue(&mut self, spec: impl Into<HandlerSpec>) {
        let mut units = Vec::new();
        flatten(spec.into(), &mut units);
        debug!(run_id = %self.run_id, appended = units.len(), "handler queue append");
        self.queue.extend(units);
    }

    /// Enqueue a handler spec at the front of the queue.
    ///
    /// A multi-unit list keeps its internal order at the front: its first
    /// element will execute first among the inserted units.
    pub fn prepend_handler_queue(&mut self, spec: impl Into<HandlerSpec>) {
        let mut units = Vec::new();
        flatten(spec.into(), &mut units);
        debug!(run_id = %self.run_id, prepended = units.len(), "handler queue prepend");
        for unit in units.into_iter().rev() {
            self.queue.push_front(unit);
        }
    }

    /// Discard every pending unit.
    ///
    /// Takes effect at the next dequeue: the currently executing handler
    /// finishes normally, and anything it enqueues *after* this call still
    /// runs. There is no sticky stopped state.
    pub fn stop(&mut self) {
        let discarded = self.queue.len();
        self.queue.clear();
        self.stopped = true;
        debug!(run_id = %self.run_id, discarded, "handler queue stopped");
    }

    /// Record a redirect to a named route and halt the remaining queue.
    ///
    /// The location lands in the run outcome for the transport layer;
    /// the pipeline itself carries no HTTP semantics.
    pub fn redirect_to(
        &mut self,
        name: &str,
        params: &Params,
        query: &[(&str, &str)],
    ) -> Result<(), Error> {
        let location = self.app.redirect_to(name, params, query)?;
        info!(run_id = %self.run_id, route = %name, location = %location, "redirect recorded");
        self.stop();
        Ok(())
    }

    /// Prepare the container's view renderer (conventional key `view`)
    /// with template/data for the post-pipeline render step.
    pub fn prepare_view(&mut self, template: &str, params: Value) -> Result<(), Error> {
        let slot = self
            .app
            .container()
            .get_as::<ViewSlot>("view")
            .ok_or_else(|| Error::MissingService {
                key: "view".to_string(),
            })?;
        slot.prepare(template, params);
        Ok(())
    }

    fn pop_unit(&mut self) -> Option<HandlerSpec> {
        self.queue.pop_front()
    }
}

fn flatten(spec: HandlerSpec, out: &mut Vec<HandlerSpec>) {
    match spec {
        HandlerSpec::Seq(items) => {
            for item in items {
                flatten(item, out);
            }
        }
        other => out.push(other),
    }
}

/// Drive one pipeline execution to completion.
///
/// Seeds the queue with `spec`, then repeatedly pops the front unit,
/// resolves it through the registry and invokes it with
/// `(ctx, params, previous_output)`. Resolution and invocation errors
/// propagate unchanged; the pipeline never catches or retries.
pub(crate) fn execute(app: &mut App, spec: HandlerSpec, params: &Params) -> Result<Value, Error> {
    let mut ctx = Context::new(app);
    debug!(run_id = %ctx.run_id, spec = ?spec, "pipeline run start");
    ctx.append_handler_queue(spec);

    let mut output = Value::Null;
    let mut executed = 0usize;
    while let Some(unit) = ctx.pop_unit() {
        match ctx.app.handlers().resolve(&unit)? {
            Resolution::Expand(items) => {
                debug!(run_id = %ctx.run_id, expanded = items.len(), "alias expanded into queue");
                ctx.prepend_handler_queue(HandlerSpec::Seq(items));
            }
            Resolution::Action(action) => {
                executed += 1;
                output = action.call(&mut ctx, params, output)?;
            }
        }
    }

    info!(
        run_id = %ctx.run_id,
        handlers_executed = executed,
        stopped = ctx.stopped,
        "pipeline run finished"
    );
    Ok(output)
}
