use super::*;
use serde::*;

/// Sampling settings for a plot.
///
/// Defaults to the range `[-10, 10]` split into 500 steps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sampling {
    /// The first x-value.
    pub start: f64,
    /// The last x-value.
    pub end: f64,
    /// Number of subdivisions. There is one more point than steps.
    pub steps: usize,
}

impl Default for Sampling {
    fn default() -> Self {
        Self {
            start: -10.0,
            end: 10.0,
            steps: 500,
        }
    }
}

impl Sampling {
    /// The x-values to sample. See [`generate_domain`].
    pub fn domain(&self) -> Result<Vec<f64>, Error> {
        generate_domain(self.start, self.end, self.steps)
    }
}

/// Uniformly subdivide `[start, end]` into `steps` intervals.
///
/// Returns `steps + 1` strictly increasing values, the first being `start` and the last being
/// `end`.
///
/// # Errors
/// [`Error::InvalidRange`] if `start >= end`, `steps == 0` or a bound is not finite. Also if
/// the range is too narrow for `steps` distinct values.
///
/// # Example
/// ```rust
/// let d = graphme::generate_domain(-1.0, 1.0, 4).unwrap();
/// assert_eq!(d, [-1.0, -0.5, 0.0, 0.5, 1.0]);
///
/// assert!(graphme::generate_domain(0.0, 10.0, 0).is_err());
/// ```
pub fn generate_domain(start: f64, end: f64, steps: usize) -> Result<Vec<f64>, Error> {
    if !(start.is_finite() && end.is_finite() && start < end && steps > 0) {
        return Err(Error::InvalidRange { start, end, steps });
    }

    // interpolate rather than step so `end - start` cannot overflow
    let mut values = (0..steps)
        .map(|i| {
            let t = i as f64 / steps as f64;
            start * (1.0 - t) + end * t
        })
        .collect::<Vec<_>>();
    values.push(end);

    if !values.windows(2).all(|w| w[0] < w[1]) {
        return Err(Error::InvalidRange { start, end, steps });
    }

    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_and_length() {
        let d = generate_domain(-10.0, 10.0, 500).unwrap();
        assert_eq!(d.len(), 501);
        assert_eq!(d[0], -10.0);
        assert_eq!(d[500], 10.0);
        assert!(d[250].abs() < 1e-12);
        assert!(d.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn single_step() {
        assert_eq!(generate_domain(2.0, 3.0, 1).unwrap(), [2.0, 3.0]);
    }

    #[test]
    fn degenerate_ranges() {
        for (s, e, n) in [
            (0.0, -1.0, 10),
            (0.0, 10.0, 0),
            (1.0, 1.0, 10),
            (f64::NAN, 1.0, 10),
            (0.0, f64::INFINITY, 10),
            (1.0, 1.0 + 1e-15, 100),
        ] {
            assert!(
                matches!(generate_domain(s, e, n), Err(Error::InvalidRange { .. })),
                "({s}, {e}, {n})"
            );
        }
    }

    #[test]
    fn widest_range() {
        let d = generate_domain(-1e308, 1e308, 4).unwrap();
        assert_eq!(d.len(), 5);
        assert_eq!((d[0], d[2], d[4]), (-1e308, 0.0, 1e308));
        assert!(d.windows(2).all(|w| w[0] < w[1]));

        let d = generate_domain(f64::MIN, f64::MAX, 1_000).unwrap();
        assert_eq!(d.len(), 1_001);
        assert!(d.iter().all(|v| v.is_finite()));
        assert!(d.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn random_ranges() {
        let mut rng = fastrand::Rng::with_seed(7);
        for _ in 0..200 {
            let start = rng.f64() * 200.0 - 100.0;
            let end = start + rng.f64() * 50.0 + 1e-3;
            let steps = rng.usize(1..2000);

            let d = generate_domain(start, end, steps).unwrap();
            assert_eq!(d.len(), steps + 1);
            assert_eq!(d[0], start);
            assert_eq!(*d.last().unwrap(), end);
            assert!(d.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn sampling_defaults() {
        let s: Sampling = serde_json::from_str(r#"{ "steps": 4 }"#).unwrap();
        assert_eq!(
            s,
            Sampling {
                start: -10.0,
                end: 10.0,
                steps: 4
            }
        );
        assert_eq!(s.domain().unwrap(), [-10.0, -5.0, 0.0, 5.0, 10.0]);
    }
}
