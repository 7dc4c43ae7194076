//! Reverse routing: generate a concrete path from a route and parameters.

use crate::error::Error;
use crate::pattern::{Alternative, Token};
use crate::router::Route;
use crate::Params;
use tracing::debug;

/// Generate a path for `route` from the supplied parameters.
///
/// Alternatives are tried from most to least specific; an alternative is
/// abandoned the moment any placeholder it requires has no supplied value,
/// and the first fully substitutable one wins. Placeholder values are
/// emitted verbatim - generation does not re-validate against the
/// placeholder's matching constraint.
pub fn generate_path(route: &Route, params: &Params) -> Result<String, Error> {
    for alt in route.pattern.alternatives() {
        if let Some(path) = substitute(alt, params) {
            debug!(route = %route.name, path = %path, "reverse path generated");
            return Ok(path);
        }
    }

    let mut supplied: Vec<&str> = params.keys().map(String::as_str).collect();
    supplied.sort_unstable();
    Err(Error::PathGeneration {
        route: route.name.clone(),
        pattern: route.pattern.raw().to_string(),
        params: supplied.join(", "),
    })
}

fn substitute(alt: &Alternative, params: &Params) -> Option<String> {
    let mut out = String::new();
    for token in alt.tokens() {
        match token {
            Token::Literal(text) => out.push_str(text),
            Token::Placeholder { name, .. } => out.push_str(params.get(name)?),
        }
    }
    Some(out)
}

/// Percent-encode query pairs into a `k=v&k2=v2` suffix (no leading `?`).
#[must_use]
pub fn build_query(pairs: &[(&str, &str)]) -> String {
    let mut out = String::new();
    for (i, (key, value)) in pairs.iter().enumerate() {
        if i > 0 {
            out.push('&');
        }
        out.push_str(&urlencoding::encode(key));
        out.push('=');
        out.push_str(&urlencoding::encode(value));
    }
    out
}
