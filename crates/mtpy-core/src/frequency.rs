//! Frequency module - represents the frequency/period axis of a transfer function
//!
//! Frequency (Hz) and period (s) are stored side by side. Whichever one a
//! constructor receives is kept verbatim and the other is derived as its
//! reciprocal, so reading back the value that was set is always exact.

use tracing::warn;

use crate::error::TfError;

/// Sweep type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SweepType {
    #[default]
    Linear,
    Log,
    /// Arbitrary points supplied by the caller
    Custom,
}

/// A frequency axis with its reciprocal period axis
#[derive(Debug, Clone, PartialEq)]
pub struct Frequency {
    /// Frequency vector in Hz
    f: Vec<f64>,
    /// Period vector in s
    period: Vec<f64>,
    /// Sweep type (linear, log or custom)
    sweep_type: SweepType,
}

impl Frequency {
    /// Create a new Frequency with start/stop/npoints in Hz
    ///
    /// # Arguments
    /// * `start` - Start frequency in Hz
    /// * `stop` - Stop frequency in Hz
    /// * `npoints` - Number of frequency points
    /// * `sweep_type` - Linear or logarithmic sweep
    ///
    /// # Example
    /// ```
    /// use mtpy_core::frequency::{Frequency, SweepType};
    /// let freq = Frequency::new(1e-3, 1e3, 61, SweepType::Log);
    /// assert_eq!(freq.npoints(), 61);
    /// ```
    pub fn new(start: f64, stop: f64, npoints: usize, sweep_type: SweepType) -> Self {
        let f = match (npoints, sweep_type) {
            (0, _) => Vec::new(),
            (1, _) => vec![start],
            (_, SweepType::Log) => {
                let log_start = start.log10();
                let log_stop = stop.log10();
                let log_step = (log_stop - log_start) / (npoints - 1) as f64;
                (0..npoints)
                    .map(|i| 10f64.powf(log_start + i as f64 * log_step))
                    .collect()
            }
            _ => {
                let step = (stop - start) / (npoints - 1) as f64;
                (0..npoints).map(|i| start + i as f64 * step).collect()
            }
        };

        let period = reciprocal(&f);
        Self {
            f,
            period,
            sweep_type,
        }
    }

    /// Create from a frequency vector in Hz
    pub fn from_f(f: Vec<f64>) -> Result<Self, TfError> {
        validate_axis(&f, "frequency")?;
        let period = reciprocal(&f);
        Ok(Self {
            f,
            period,
            sweep_type: SweepType::Custom,
        })
    }

    /// Create from a period vector in s
    pub fn from_period(period: Vec<f64>) -> Result<Self, TfError> {
        validate_axis(&period, "period")?;
        let f = reciprocal(&period);
        Ok(Self {
            f,
            period,
            sweep_type: SweepType::Custom,
        })
    }

    /// Default axis for `n` points: periods 1, 2, ..., n
    pub fn default_for(n: usize) -> Self {
        let period: Vec<f64> = (1..=n).map(|p| p as f64).collect();
        let f = reciprocal(&period);
        Self {
            f,
            period,
            sweep_type: SweepType::Custom,
        }
    }

    /// Check that every point is positive and finite
    pub fn validate(&self) -> Result<(), TfError> {
        validate_axis(&self.f, "frequency")
    }

    /// Get frequency vector in Hz
    #[inline]
    pub fn f(&self) -> &[f64] {
        &self.f
    }

    /// Get period vector in s
    #[inline]
    pub fn period(&self) -> &[f64] {
        &self.period
    }

    /// Get the number of frequency points
    #[inline]
    pub fn npoints(&self) -> usize {
        self.f.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.f.is_empty()
    }

    /// Lowest frequency in Hz (NaN when empty)
    pub fn min(&self) -> f64 {
        self.f.iter().copied().fold(f64::NAN, f64::min)
    }

    /// Highest frequency in Hz (NaN when empty)
    pub fn max(&self) -> f64 {
        self.f.iter().copied().fold(f64::NAN, f64::max)
    }

    /// Get the sweep type
    #[inline]
    pub fn sweep_type(&self) -> SweepType {
        self.sweep_type
    }
}

/// Validate a frequency or period axis
pub(crate) fn validate_axis(values: &[f64], name: &'static str) -> Result<(), TfError> {
    match values
        .iter()
        .enumerate()
        .find(|(_, v)| !(v.is_finite() && **v > 0.0))
    {
        Some((index, &value)) => Err(TfError::InvalidAxis { name, index, value }),
        None => Ok(()),
    }
}

/// Fit a period axis to `n` points.
///
/// Shorter axes are extended by repeating the ratio of the last two points,
/// which keeps every period positive. A single value is extended with unit
/// steps. Longer axes are rejected.
pub(crate) fn fit_period_axis(
    mut period: Vec<f64>,
    n: usize,
    name: &'static str,
) -> Result<Vec<f64>, TfError> {
    if period.len() > n {
        return Err(TfError::LengthMismatch {
            name,
            expected: n,
            actual: period.len(),
        });
    }
    if period.is_empty() {
        return Ok(Frequency::default_for(n).period);
    }
    if period.len() < n {
        warn!(
            given = period.len(),
            expected = n,
            "extending {} axis to match the number of tensors",
            name
        );
        if let [single] = period[..] {
            period.extend((1..n).map(|k| single + k as f64));
        } else {
            let len = period.len();
            let ratio = period[len - 1] / period[len - 2];
            while period.len() < n {
                let next = period[period.len() - 1] * ratio;
                period.push(next);
            }
        }
    }
    Ok(period)
}

#[inline]
fn reciprocal(values: &[f64]) -> Vec<f64> {
    values.iter().map(|&v| 1.0 / v).collect()
}
