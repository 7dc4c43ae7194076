//! # Runtime Configuration Module
//!
//! Environment variable-based configuration for the dispatch core.
//!
//! ## Environment Variables
//!
//! - `SHUNT_BASE_PATH` - path prefix stripped before matching and
//!   prepended to generated paths (e.g. `/api/v1`)
//! - `SHUNT_CONTROLLER_PREFIX` - prefix applied to controller names
//!   before registry lookup
//! - `SHUNT_ERROR_ROUTE` - name of the route run as the second stage when
//!   a request pipeline raises

use std::env;

/// Runtime configuration loaded from environment variables.
///
/// Apply at startup with [`crate::app::App::apply_config`].
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    /// Base-path prefix for matching and generation, if any
    pub base_path: Option<String>,
    /// Controller-name prefix for handler resolution, if any
    pub controller_prefix: Option<String>,
    /// Designated error route for two-stage dispatch, if any
    pub error_route: Option<String>,
}

impl RuntimeConfig {
    /// Load configuration from environment variables. Unset or empty
    /// variables leave the corresponding field unset.
    #[must_use]
    pub fn from_env() -> Self {
        RuntimeConfig {
            base_path: non_empty(env::var("SHUNT_BASE_PATH")),
            controller_prefix: non_empty(env::var("SHUNT_CONTROLLER_PREFIX")),
            error_route: non_empty(env::var("SHUNT_ERROR_ROUTE")),
        }
    }
}

fn non_empty(var: Result<String, env::VarError>) -> Option<String> {
    var.ok().filter(|v| !v.is_empty())
}
