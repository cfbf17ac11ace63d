//! Mathematical expression parsing, validation and typesetting.

use super::*;
use log::debug;
use serde::*;

pub mod builtins;
pub mod lex;
pub mod tex;
pub mod v1;

pub use builtins::VAR;
pub use lex::Source;

/// The value of `x` an expression must evaluate at to be considered valid.
pub const PROBE: f64 = 1.0;

/// Parse, check and solve a mathematical expression in the free variable `x`.
///
/// This is the seam between the engine and the expression-math library doing the heavy
/// lifting. Implementations receive text which has already been cleaned and normalised (see
/// [`Source`]).
pub trait Equation: Sized {
    /// Parse a normalised source into an expression.
    ///
    /// Only the syntax is checked, identifiers are not resolved.
    fn parse(src: Source) -> Result<Self, Error>;

    /// Resolve every identifier and function arity against the builtins.
    ///
    /// A failure here does not depend on the value of `x`.
    fn check(&self) -> Result<(), Error>;

    /// Evaluate the expression with `x` bound to a single value.
    ///
    /// Returns `None` if the evaluation fails. Non-finite results are returned as is.
    fn solve(&self, x: f64) -> Option<f64>;

    /// Render the expression as LaTeX.
    fn tex(&self) -> Result<String, Error>;

    /// The text the expression was parsed from.
    fn source(&self) -> &Source;
}

/// Parse user text, which may carry a leading `y =`, into an expression.
pub fn parse<E: Equation>(text: &str) -> Result<E, Error> {
    E::parse(Source::new(text)?)
}

/// Parse the text and make sure the result evaluates at [`PROBE`].
///
/// A `NaN` result is still a successful evaluation.
pub fn validate<E: Equation>(text: &str) -> bool {
    match parse::<E>(text).and_then(|eq| probe(&eq)) {
        Ok(()) => true,
        Err(e) => {
            debug!("'{}' is not valid: {}", text, e);
            false
        }
    }
}

pub(crate) fn probe<E: Equation>(eq: &E) -> Result<(), Error> {
    eq.check()?;
    eq.solve(PROBE)
        .map(|_| ())
        .ok_or_else(|| Error::Evaluation(format!("evaluation at x = {PROBE} failed")))
}

/// Render the expression for display, falling back to the text as the user supplied it.
pub fn to_display_notation<E: Equation>(eq: &E) -> String {
    eq.tex().unwrap_or_else(|e| {
        debug!("falling back to source text for display: {}", e);
        eq.source().raw.clone()
    })
}

/// Everything the caller needs to show an expression before plotting it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Description {
    /// Passes [`validate`].
    pub valid: bool,
    /// The expression without any `y =` prefix.
    pub expression: String,
    /// Display notation, if the expression parses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latex: Option<String>,
    /// Why the expression is not valid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Parse, validate and typeset in one go.
pub fn describe<E: Equation>(text: &str) -> Description {
    let expression = lex::clean(text).to_string();

    let eq = match parse::<E>(text) {
        Ok(eq) => eq,
        Err(e) => {
            return Description {
                valid: false,
                expression,
                latex: None,
                error: Some(e.to_string()),
            }
        }
    };

    let latex = Some(to_display_notation(&eq));
    let error = probe(&eq).err().map(|e| e.to_string());

    Description {
        valid: error.is_none(),
        expression,
        latex,
        error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use v1::Eq;

    #[test]
    fn validation() {
        assert!(validate::<Eq>("x^2 + 1"));
        assert!(validate::<Eq>("y = 2*x^2 + 3*x - 4"));
        assert!(validate::<Eq>("2x"));
        assert!(validate::<Eq>("x**2"));
        assert!(validate::<Eq>("7"));
        assert!(validate::<Eq>("sqrt(x - 5)")); // NaN at the probe is fine

        assert!(!validate::<Eq>(""));
        assert!(!validate::<Eq>("   "));
        assert!(!validate::<Eq>("y ="));
        assert!(!validate::<Eq>("foo(x)"));
        assert!(!validate::<Eq>("x + t"));
        assert!(!validate::<Eq>("sin(x, x)"));
        assert!(!validate::<Eq>("(x"));
        assert!(!validate::<Eq>("x @ 2"));
    }

    #[test]
    fn implicit_and_explicit_forms_agree() {
        for (a, b) in [("2x", "2*x"), ("x**2", "x^2"), ("3(x+1)", "3*(x+1)")] {
            let a = parse::<Eq>(a).unwrap();
            let b = parse::<Eq>(b).unwrap();
            for x in [-2.5, 0.0, 1.0, 7.25] {
                assert_eq!(a.solve(x), b.solve(x));
            }
        }
    }

    #[test]
    fn display_notation_is_stable() {
        let a = to_display_notation(&parse::<Eq>("y = x^2/(x+1)").unwrap());
        let b = to_display_notation(&parse::<Eq>("y = x^2/(x+1)").unwrap());
        assert_eq!(a, b);
        assert_eq!(a, "\\frac{{x}^{2}}{x+1}");
    }

    #[test]
    fn describing() {
        assert_eq!(
            describe::<Eq>("y = 2x"),
            Description {
                valid: true,
                expression: "2x".into(),
                latex: Some("2x".into()),
                error: None,
            }
        );

        let d = describe::<Eq>("foo(x)");
        assert!(!d.valid);
        assert_eq!(d.latex.as_deref(), Some("\\mathrm{foo}\\left(x\\right)"));
        assert_eq!(d.error.as_deref(), Some("unknown identifier 'foo'"));

        let d = describe::<Eq>("2 +");
        assert!(!d.valid);
        assert!(d.latex.is_none());
        assert!(d.error.is_some());
    }
}
