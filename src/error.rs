//! Errors surfaced at the engine boundary.
//!
//! Pointwise evaluation failures are not represented here: a point that fails to evaluate is
//! dropped from the series, never reported.

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// Failure of a call into the engine.
#[derive(Debug, Clone, Error, Diagnostic)]
pub enum Error {
    /// The text does not conform to the expression grammar.
    #[error("invalid expression: {msg}")]
    #[diagnostic(code(graphme::parse))]
    Parse {
        msg: String,
        #[source_code]
        src: String,
        #[label("here")]
        at: Option<SourceSpan>,
    },

    /// A name that is neither the free variable nor a builtin.
    #[error("unknown identifier '{name}'")]
    #[diagnostic(code(graphme::unknown_identifier))]
    UnknownIdentifier {
        name: String,
        #[help]
        help: Option<String>,
    },

    /// The expression cannot be evaluated at all, whatever the value of `x`.
    #[error("cannot evaluate expression: {0}")]
    #[diagnostic(code(graphme::evaluation))]
    Evaluation(String),

    /// Degenerate sample domain.
    #[error("invalid range: [{start}, {end}] with {steps} steps")]
    #[diagnostic(
        code(graphme::invalid_range),
        help("the range needs finite bounds with start < end, and at least one step")
    )]
    InvalidRange { start: f64, end: f64, steps: usize },
}

impl Error {
    pub(crate) fn parse(msg: impl Into<String>, src: &str, at: Option<(usize, usize)>) -> Self {
        Error::Parse {
            msg: msg.into(),
            src: src.to_string(),
            at: at.map(SourceSpan::from),
        }
    }

    /// The error is a grammar violation.
    pub fn is_parse(&self) -> bool {
        matches!(self, Error::Parse { .. })
    }
}
