//! Route pattern compiler.
//!
//! Parses a declarative pattern string into one or more concrete
//! *alternatives*: flat sequences of literal text and named placeholders.
//! The grammar is deliberately small:
//!
//! - `{name}` - placeholder capturing one path segment (`[^/]+`)
//! - `{name:regex}` - placeholder constrained by an inline regular expression
//! - `[...]` - optional trailing segment, may nest (`/b/{a}[/{b}[/{c}]]`)
//!
//! A pattern with N nested optional segments compiles to exactly N+1
//! alternatives, ordered from most specific (longest) to least specific.
//! Compilation is pure and deterministic; the same string always yields the
//! same alternative list in the same order.

use crate::error::PatternError;
use once_cell::sync::Lazy;
use regex::Regex;

static PLACEHOLDER_NAME: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::expect_used)]
    let re = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("placeholder name regex is valid");
    re
});

/// One element of a pattern alternative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Fixed text, matched and emitted verbatim
    Literal(String),
    /// Named capturing segment, optionally constrained by an inline regex
    Placeholder {
        name: String,
        /// Raw constraint source (`\d+`); `None` means "one path segment"
        constraint: Option<String>,
    },
}

/// One concrete token sequence derived from a pattern's optional segments.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Alternative {
    tokens: Vec<Token>,
}

impl Alternative {
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Names of every placeholder this alternative requires, in order.
    pub fn placeholder_names(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().filter_map(|t| match t {
            Token::Placeholder { name, .. } => Some(name.as_str()),
            Token::Literal(_) => None,
        })
    }
}

/// Compiled route pattern: ordered set of alternatives, longest first.
#[derive(Debug, Clone)]
pub struct RoutePattern {
    raw: String,
    alternatives: Vec<Alternative>,
}

impl RoutePattern {
    /// Compile a pattern string into its alternatives.
    ///
    /// Fails with a [`PatternError`] when brackets are unbalanced, an
    /// optional segment is empty or not part of the trailing chain, a
    /// placeholder is malformed or duplicated, or an inline constraint does
    /// not compile as a regex.
    pub fn compile(pattern: &str) -> Result<Self, PatternError> {
        let parts = split_optionals(pattern)?;

        let mut alternatives = Vec::with_capacity(parts.len());
        let mut acc = Alternative::default();
        let mut seen_names: Vec<String> = Vec::new();
        for part in &parts {
            tokenize_into(part, pattern, &mut acc.tokens, &mut seen_names)?;
            alternatives.push(acc.clone());
        }

        // Most specific (longest) alternative first.
        alternatives.reverse();

        Ok(Self {
            raw: pattern.to_string(),
            alternatives,
        })
    }

    /// The original pattern source string.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Alternatives ordered from most to least specific.
    pub fn alternatives(&self) -> &[Alternative] {
        &self.alternatives
    }
}

/// Split a pattern into its required part plus one string per nested
/// optional segment: `/b/{a}[/{b}[/{c}]]` → `["/b/{a}", "/{b}", "/{c}"]`.
///
/// Optional segments must form a single nested chain at the tail, so once a
/// `]` has been seen the only characters still allowed are further `]`s.
/// Brackets inside placeholder braces (`{id:[0-9]+}`) are not structural.
fn split_optionals(pattern: &str) -> Result<Vec<String>, PatternError> {
    let mut parts = vec![String::new()];
    let mut depth = 0usize;
    let mut brace = 0usize;
    let mut seen_close = false;

    for ch in pattern.chars() {
        if brace > 0 {
            match ch {
                '{' => brace += 1,
                '}' => brace -= 1,
                _ => {}
            }
            parts[depth].push(ch);
            continue;
        }
        if seen_close && ch != ']' {
            return Err(PatternError::MisplacedOptional {
                pattern: pattern.to_string(),
            });
        }
        match ch {
            '{' => {
                brace = 1;
                parts[depth].push(ch);
            }
            '[' => {
                depth += 1;
                parts.push(String::new());
            }
            ']' => {
                if depth == 0 {
                    return Err(PatternError::UnbalancedBrackets {
                        pattern: pattern.to_string(),
                    });
                }
                if parts[depth].is_empty() {
                    return Err(PatternError::EmptyOptional {
                        pattern: pattern.to_string(),
                    });
                }
                depth -= 1;
                seen_close = true;
            }
            _ => parts[depth].push(ch),
        }
    }

    if brace > 0 {
        return Err(PatternError::UnterminatedPlaceholder {
            pattern: pattern.to_string(),
        });
    }
    if depth != 0 {
        return Err(PatternError::UnbalancedBrackets {
            pattern: pattern.to_string(),
        });
    }

    Ok(parts)
}

/// Tokenize one optional-chain part, appending to `tokens`.
///
/// `seen_names` accumulates placeholder names across parts so a duplicate
/// anywhere in the chain is rejected (params are a unique-key map).
fn tokenize_into(
    part: &str,
    pattern: &str,
    tokens: &mut Vec<Token>,
    seen_names: &mut Vec<String>,
) -> Result<(), PatternError> {
    let mut chars = part.chars();
    let mut literal = String::new();

    while let Some(ch) = chars.next() {
        if ch != '{' {
            literal.push(ch);
            continue;
        }
        if !literal.is_empty() {
            tokens.push(Token::Literal(std::mem::take(&mut literal)));
        }

        let mut name = String::new();
        let mut constraint = None;
        loop {
            match chars.next() {
                None => {
                    return Err(PatternError::UnterminatedPlaceholder {
                        pattern: pattern.to_string(),
                    })
                }
                Some('}') => break,
                Some(':') => {
                    constraint = Some(read_constraint(&mut chars, pattern)?);
                    break;
                }
                Some(c) => name.push(c),
            }
        }

        if !PLACEHOLDER_NAME.is_match(&name) {
            return Err(PatternError::BadPlaceholder {
                pattern: pattern.to_string(),
                name,
            });
        }
        if seen_names.iter().any(|n| n == &name) {
            return Err(PatternError::DuplicatePlaceholder {
                pattern: pattern.to_string(),
                name,
            });
        }
        if let Some(ref c) = constraint {
            // Validated in the same anchored, non-capturing form the matcher
            // embeds it in, so matching never sees a regex compile failure.
            if let Err(source) = Regex::new(&format!("^(?:{c})$")) {
                return Err(PatternError::BadConstraint {
                    pattern: pattern.to_string(),
                    name,
                    source,
                });
            }
        }

        seen_names.push(name.clone());
        tokens.push(Token::Placeholder { name, constraint });
    }

    if !literal.is_empty() {
        tokens.push(Token::Literal(literal));
    }
    Ok(())
}

/// Read an inline constraint up to the placeholder's closing `}`, tracking
/// brace depth so quantifiers like `\d{2}` survive intact.
fn read_constraint(
    chars: &mut std::str::Chars<'_>,
    pattern: &str,
) -> Result<String, PatternError> {
    let mut depth = 1usize;
    let mut out = String::new();
    for c in chars.by_ref() {
        match c {
            '{' => {
                depth += 1;
                out.push(c);
            }
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(out);
                }
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    Err(PatternError::UnterminatedPlaceholder {
        pattern: pattern.to_string(),
    })
}
