use super::*;
use expr::{to_display_notation, Equation};
use log::{debug, trace, warn};
use rayon::prelude::*;
use serde::*;

/// The plottable points of an expression.
///
/// `x` and `y` are index aligned and always the same length. Only points which evaluated to a
/// finite number are present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl Series {
    fn with_capacity(n: usize) -> Self {
        Self {
            x: Vec::with_capacity(n),
            y: Vec::with_capacity(n),
        }
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Iterate the `(x, y)` pairs.
    pub fn points(&self) -> impl ExactSizeIterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }
}

/// One expression's contribution to a redraw.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plot {
    /// The expression as supplied.
    pub expr: String,
    /// Display notation, or the expression itself if it could not be typeset.
    pub latex: String,
    /// The sampled points. Empty if `error` is set.
    #[serde(flatten)]
    pub series: Series,
    /// Why the expression could not be evaluated at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Evaluate an expression at each point of the domain.
///
/// The expression is checked once up front; failing that is the only error. After that each
/// point is independent: a point which fails to evaluate, or evaluates to something that is not
/// a finite number, is left out of the series and evaluation carries on with the next point.
///
/// An empty series is a success. It means every point failed numerically.
pub fn evaluate<E: Equation>(eq: &E, domain: &[f64]) -> Result<Series, Error> {
    eq.check()?;

    let mut series = Series::with_capacity(domain.len());

    for &x in domain {
        match eq.solve(x) {
            Some(y) if y.is_finite() => {
                series.x.push(x);
                series.y.push(y);
            }
            y => trace!("dropping x = {x}: {y:?}"),
        }
    }

    debug_assert_eq!(series.x.len(), series.y.len());

    debug!(
        "sampled '{}': kept {} of {} points",
        eq.source().text,
        series.len(),
        domain.len()
    );

    Ok(series)
}

/// Evaluate several expressions over one domain, in parallel.
///
/// Each expression is parsed and evaluated in its own task. Expressions which cannot be
/// evaluated carry an error and an empty series. Output order matches input order.
pub fn evaluate_many<E, S>(texts: &[S], domain: &[f64]) -> Vec<Plot>
where
    E: Equation,
    S: AsRef<str> + Sync,
{
    texts
        .par_iter()
        .map(|text| plot::<E>(text.as_ref(), domain))
        .collect()
}

/// Like [`evaluate_many`] but keeps each failure as the [`Error`] it is.
pub fn try_evaluate_many<E, S>(texts: &[S], domain: &[f64]) -> Vec<Result<Plot, Error>>
where
    E: Equation,
    S: AsRef<str> + Sync,
{
    texts
        .par_iter()
        .map(|text| try_plot::<E>(text.as_ref(), domain))
        .collect()
}

fn try_plot<E: Equation>(text: &str, domain: &[f64]) -> Result<Plot, Error> {
    let eq = expr::parse::<E>(text)?;
    let series = evaluate(&eq, domain)?;

    Ok(Plot {
        expr: text.to_string(),
        latex: to_display_notation(&eq),
        series,
        error: None,
    })
}

fn plot<E: Equation>(text: &str, domain: &[f64]) -> Plot {
    let eq = match expr::parse::<E>(text) {
        Ok(eq) => eq,
        Err(e) => {
            warn!("cannot plot '{}': {}", text, e);
            return Plot {
                expr: text.to_string(),
                latex: text.to_string(),
                series: Series::default(),
                error: Some(e.to_string()),
            };
        }
    };

    let latex = to_display_notation(&eq);
    let (series, error) = match evaluate(&eq, domain) {
        Ok(s) => (s, None),
        Err(e) => {
            warn!("cannot plot '{}': {}", text, e);
            (Series::default(), Some(e.to_string()))
        }
    };

    Plot {
        expr: text.to_string(),
        latex,
        series,
        error,
    }
}
