//! One-dimensional interpolation
//!
//! Interpolators work on a strictly increasing abscissa with finite ordinates.
//! Queries outside the abscissa range are resolved by a [`BoundsPolicy`].

use serde::{Deserialize, Serialize};

use crate::error::TfError;

/// Interpolation method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationMethod {
    Nearest,
    /// Piecewise linear ("slinear")
    #[default]
    Linear,
    /// Piecewise cubic Hermite, monotone (Fritsch-Carlson)
    Pchip,
}

/// What to do with queries outside the source range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundsPolicy {
    /// Return an error
    Fail,
    /// Return NaN
    #[default]
    Nan,
    /// Continue the edge segment
    Extrapolate,
}

/// Interpolator over borrowed samples
#[derive(Debug, Clone)]
pub struct Interpolator<'a> {
    x: &'a [f64],
    y: &'a [f64],
    method: InterpolationMethod,
    /// Node derivatives, only for Pchip
    slopes: Vec<f64>,
}

impl<'a> Interpolator<'a> {
    /// Build an interpolator.
    ///
    /// `x` must be strictly increasing and the same length as `y`.
    pub fn new(x: &'a [f64], y: &'a [f64], method: InterpolationMethod) -> Self {
        debug_assert_eq!(x.len(), y.len());
        debug_assert!(x.windows(2).all(|w| w[0] < w[1]));

        let slopes = match method {
            InterpolationMethod::Pchip => pchip_slopes(x, y),
            _ => Vec::new(),
        };

        Self {
            x,
            y,
            method,
            slopes,
        }
    }

    /// Number of samples
    #[inline]
    pub fn len(&self) -> usize {
        self.x.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Evaluate at `xq`
    pub fn eval(&self, xq: f64, bounds: BoundsPolicy) -> Result<f64, TfError> {
        let n = self.len();
        if n == 0 {
            return match bounds {
                BoundsPolicy::Fail => Err(TfError::EmptyAxis),
                _ => Ok(f64::NAN),
            };
        }
        if xq.is_nan() {
            return Ok(f64::NAN);
        }

        let (lo, hi) = (self.x[0], self.x[n - 1]);
        if xq < lo || xq > hi {
            match bounds {
                BoundsPolicy::Fail => {
                    return Err(TfError::OutOfBounds {
                        value: xq,
                        min: lo,
                        max: hi,
                    })
                }
                BoundsPolicy::Nan => return Ok(f64::NAN),
                BoundsPolicy::Extrapolate => {}
            }
        }

        if n == 1 {
            return Ok(self.y[0]);
        }

        // Exact node hit
        let pos = self.x.partition_point(|&v| v < xq);
        if pos < n && self.x[pos] == xq {
            return Ok(self.y[pos]);
        }

        // Interval [idx, idx + 1], clamped to the edge segments
        let idx = pos.saturating_sub(1).min(n - 2);

        let value = match self.method {
            InterpolationMethod::Nearest => {
                if xq <= lo {
                    self.y[0]
                } else if xq >= hi {
                    self.y[n - 1]
                } else if xq - self.x[idx] <= self.x[idx + 1] - xq {
                    self.y[idx]
                } else {
                    self.y[idx + 1]
                }
            }
            InterpolationMethod::Linear => {
                let t = (xq - self.x[idx]) / (self.x[idx + 1] - self.x[idx]);
                self.y[idx] * (1.0 - t) + self.y[idx + 1] * t
            }
            InterpolationMethod::Pchip => {
                let h = self.x[idx + 1] - self.x[idx];
                let t = (xq - self.x[idx]) / h;
                let t2 = t * t;
                let t3 = t2 * t;
                let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
                let h10 = t3 - 2.0 * t2 + t;
                let h01 = -2.0 * t3 + 3.0 * t2;
                let h11 = t3 - t2;
                h00 * self.y[idx]
                    + h10 * h * self.slopes[idx]
                    + h01 * self.y[idx + 1]
                    + h11 * h * self.slopes[idx + 1]
            }
        };

        Ok(value)
    }
}

/// Node derivatives for monotone piecewise cubic Hermite interpolation
fn pchip_slopes(x: &[f64], y: &[f64]) -> Vec<f64> {
    let n = x.len();
    if n < 2 {
        return vec![0.0; n];
    }

    let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();
    let m: Vec<f64> = (0..n - 1).map(|k| (y[k + 1] - y[k]) / h[k]).collect();

    if n == 2 {
        return vec![m[0], m[0]];
    }

    let mut d = vec![0.0; n];
    for k in 1..n - 1 {
        let (m0, m1) = (m[k - 1], m[k]);
        if m0 == 0.0 || m1 == 0.0 || m0.signum() != m1.signum() {
            d[k] = 0.0;
        } else {
            // Weighted harmonic mean
            let w1 = 2.0 * h[k] + h[k - 1];
            let w2 = h[k] + 2.0 * h[k - 1];
            d[k] = (w1 + w2) / (w1 / m0 + w2 / m1);
        }
    }

    d[0] = pchip_edge_slope(h[0], h[1], m[0], m[1]);
    d[n - 1] = pchip_edge_slope(h[n - 2], h[n - 3], m[n - 2], m[n - 3]);
    d
}

/// One-sided three-point slope at an end node, limited to keep monotonicity
fn pchip_edge_slope(h0: f64, h1: f64, m0: f64, m1: f64) -> f64 {
    let d = ((2.0 * h0 + h1) * m0 - h0 * m1) / (h0 + h1);
    if d.signum() != m0.signum() || m0 == 0.0 {
        0.0
    } else if m0.signum() != m1.signum() && d.abs() > 3.0 * m0.abs() {
        3.0 * m0
    } else {
        d
    }
}
