//! # Router Module
//!
//! Path matching and route resolution. The router owns two concerns:
//!
//! - **[`table`]** - the ordered routing table: named route definitions,
//!   shorthand normalization and the always-present `default` fallback route.
//! - **[`core`]** - the compiled dispatch structure built from the table:
//!   one anchored regex per pattern alternative, matched in registration
//!   order with first-route-wins semantics.
//!
//! ## Architecture
//!
//! Matching is a two-phase affair:
//!
//! 1. **Compilation**: pattern strings are parsed into alternatives at
//!    configuration time (`set_routing`); the regex dispatch structure is
//!    built lazily on first match and cached until the table changes.
//!
//! 2. **Matching**: for each request the compiled routes are tested in
//!    registration order; within a route, alternatives are tested longest
//!    first. The first whole-string match wins and its placeholders become
//!    the extracted parameters.

mod core;
mod table;

pub use core::{ParamVec, RouteMatch, Router, MAX_INLINE_PARAMS};
pub use table::{MethodSet, Route, RouteDef, RouteTable, DEFAULT_ROUTE};
