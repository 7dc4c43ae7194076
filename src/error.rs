//! Error types for route compilation, matching, reverse routing and dispatch.

use thiserror::Error;

/// Route pattern compilation error
///
/// Returned by [`crate::pattern::RoutePattern::compile`] (and therefore by
/// `set_routing`) when a pattern string is malformed. Pattern errors are
/// fatal and surface at configuration time, never during matching.
#[derive(Debug, Error)]
pub enum PatternError {
    /// Number of opening `[` and closing `]` brackets does not match
    #[error("unbalanced optional brackets in route pattern '{pattern}'")]
    UnbalancedBrackets {
        /// The offending pattern string
        pattern: String,
    },
    /// An optional segment contains no characters (`/a[]`)
    #[error("empty optional segment in route pattern '{pattern}'")]
    EmptyOptional { pattern: String },
    /// Optional segments must form one nested chain at the tail of the pattern
    #[error("optional segments must form a trailing chain in route pattern '{pattern}'")]
    MisplacedOptional { pattern: String },
    /// Placeholder name is empty or not `[A-Za-z_][A-Za-z0-9_]*`
    #[error("malformed placeholder name '{name}' in route pattern '{pattern}'")]
    BadPlaceholder { pattern: String, name: String },
    /// A `{` was never closed by a matching `}`
    #[error("unterminated placeholder in route pattern '{pattern}'")]
    UnterminatedPlaceholder { pattern: String },
    /// The same placeholder name appears twice in one alternative
    #[error("duplicate placeholder '{name}' in route pattern '{pattern}'")]
    DuplicatePlaceholder { pattern: String, name: String },
    /// The inline constraint does not compile as a regular expression
    #[error("invalid constraint for placeholder '{name}' in route pattern '{pattern}': {source}")]
    BadConstraint {
        pattern: String,
        name: String,
        #[source]
        source: regex::Error,
    },
}

/// Runtime error raised by matching, reverse routing and handler dispatch.
///
/// Handler bodies report their own failures as [`anyhow::Error`]; those
/// propagate out of a pipeline run through the [`Error::Handler`] variant.
/// The core itself never catches or retries - the only recovery path is the
/// two-stage error-route dispatch in [`crate::app::App::run`].
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed route pattern (see [`PatternError`])
    #[error(transparent)]
    Pattern(#[from] PatternError),
    /// A route name was used that is not present in the routing table
    #[error("route '{name}' not found")]
    RouteNotFound { name: String },
    /// No pattern alternative could be fully populated from the given params
    #[error("cannot generate path for route '{route}' from pattern '{pattern}' using params [{params}]")]
    PathGeneration {
        route: String,
        pattern: String,
        /// Comma-separated names of the params that were supplied
        params: String,
    },
    /// A handler reference could not be resolved to something invocable
    #[error("cannot resolve handler: {reason}")]
    HandlerResolution { reason: String },
    /// A string handler is neither a registered alias nor `Controller:action`
    #[error("cannot parse handler '{handler}': not a registered alias and no ':' controller/action separator")]
    HandlerSyntax { handler: String },
    /// A conventional container entry required by the operation is absent
    #[error("required container entry '{key}' is missing")]
    MissingService { key: String },
    /// Absolute URL assembly failed
    #[error("failed to assemble absolute url: {0}")]
    Url(#[from] url::ParseError),
    /// A handler body returned an error; propagated unchanged to the caller
    #[error(transparent)]
    Handler(#[from] anyhow::Error),
}
