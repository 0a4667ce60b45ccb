//! Station averaging
//!
//! Several series are resampled onto a common log-spaced grid and averaged
//! element by element.

use anyhow::{bail, Result};
use ndarray::Array3;
use num_complex::Complex64;
use num_traits::Zero;
use tracing::debug;

use super::base::TfBase;
use super::interpolation::InterpolationOptions;
use crate::frequency::{Frequency, SweepType};
use crate::math::interp::BoundsPolicy;

/// Average `series` on `n_frequencies` log-spaced points
///
/// The grid spans the union of all input frequencies. Each series is
/// interpolated with `options.method` (bounds always `Nan`), exact complex
/// zeros count as missing, and the NaN-ignoring mean is taken per element.
/// Real and imaginary parts are averaged over the same stations. Values
/// missing everywhere come out as 0. The result carries no rotation.
///
/// # Arguments
/// * `series` - Series of identical tensor shape
/// * `n_frequencies` - Number of points of the output grid
/// * `options` - Interpolation method and log-space flag
pub fn average(
    series: &[TfBase],
    n_frequencies: usize,
    options: &InterpolationOptions,
) -> Result<TfBase> {
    let Some(first) = series.first() else {
        bail!("Cannot average an empty list of transfer functions");
    };
    if n_frequencies == 0 {
        bail!("Averaging grid needs at least one frequency");
    }
    let shape = first.shape();
    if let Some(other) = series.iter().find(|s| s.shape() != shape) {
        bail!(
            "Cannot average {}x{} with {}x{} transfer functions",
            shape.rows,
            shape.cols,
            other.shape().rows,
            other.shape().cols
        );
    }

    let (f_min, f_max) = series
        .iter()
        .flat_map(|s| s.frequency().iter().copied())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), f| {
            (lo.min(f), hi.max(f))
        });
    let grid = common_grid(f_min, f_max, n_frequencies)?;

    let options = InterpolationOptions {
        bounds: BoundsPolicy::Nan,
        ..*options
    };
    let resampled = series
        .iter()
        .map(|s| s.interpolate_onto(grid.clone(), &options))
        .collect::<Result<Vec<_>, _>>()?;

    let dims = (n_frequencies, shape.rows, shape.cols);
    let tf = Array3::from_shape_fn(dims, |(f, i, j)| {
        nan_mean_complex(resampled.iter().map(|s| s.transfer_function()[[f, i, j]]))
    });
    let tf_error = Array3::from_shape_fn(dims, |(f, i, j)| {
        nan_mean(resampled.iter().map(|s| s.transfer_function_error()[[f, i, j]]))
    });
    let tf_model_error = Array3::from_shape_fn(dims, |(f, i, j)| {
        nan_mean(
            resampled
                .iter()
                .map(|s| s.transfer_function_model_error()[[f, i, j]]),
        )
    });

    debug!(
        n_series = series.len(),
        n_frequencies,
        f_min,
        f_max,
        "averaged transfer functions"
    );

    let mut averaged = TfBase::from_arrays(shape, grid, tf, tf_error, tf_model_error)?;
    averaged.nan_to_zero();
    Ok(averaged)
}

/// Log-spaced grid whose end points are exactly `f_min` and `f_max`
fn common_grid(f_min: f64, f_max: f64, n: usize) -> Result<Frequency> {
    let mut f = Frequency::new(f_min, f_max, n, SweepType::Log).f().to_vec();
    if n > 1 {
        f[n - 1] = f_max;
    }
    Ok(Frequency::from_f(f)?)
}

/// Mean over complex values with no NaN part that are not exactly zero
fn nan_mean_complex(values: impl Iterator<Item = Complex64>) -> Complex64 {
    let (sum, count) = values
        .filter(|v| !v.is_nan() && !v.is_zero())
        .fold((Complex64::zero(), 0usize), |(sum, count), v| {
            (sum + v, count + 1)
        });
    if count == 0 {
        Complex64::new(f64::NAN, f64::NAN)
    } else {
        sum / count as f64
    }
}

/// Mean over values that are neither NaN nor exactly zero; NaN when none are
fn nan_mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .filter(|v| !v.is_nan() && *v != 0.0)
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transfer_function::TfInputs;
    use approx::assert_relative_eq;

    fn constant(value: f64, frequency: Vec<f64>) -> TfBase {
        let n = frequency.len();
        TfBase::new(
            TfInputs::default()
                .tf(Array3::from_elem((n, 2, 2), Complex64::new(value, -value)))
                .tf_error(Array3::from_elem((n, 2, 2), 0.1 * value))
                .frequency(frequency),
        )
        .unwrap()
    }

    #[test]
    fn test_average_of_overlapping_series() {
        let a = constant(1.0, vec![1.0, 10.0, 100.0]);
        let b = constant(3.0, vec![1.0, 10.0, 100.0]);
        let avg = average(&[a, b], 5, &InterpolationOptions::default()).unwrap();
        assert_eq!(avg.n_frequencies(), 5);
        assert_relative_eq!(avg.frequency()[0], 1.0);
        assert_relative_eq!(avg.frequency()[4], 100.0);
        for v in avg.transfer_function().iter() {
            assert_relative_eq!(v.re, 2.0, epsilon = 1e-12);
            assert_relative_eq!(v.im, -2.0, epsilon = 1e-12);
        }
        for e in avg.transfer_function_error().iter() {
            assert_relative_eq!(*e, 0.2, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_missing_coverage_uses_available_series() {
        let low = constant(1.0, vec![1.0, 20.0]);
        let high = constant(5.0, vec![50.0, 1000.0]);
        let avg = average(&[low, high], 4, &InterpolationOptions::default()).unwrap();
        // Grid is 1, 10, 100, 1000; each point is covered by one series
        assert_relative_eq!(avg.transfer_function()[[0, 0, 0]].re, 1.0, epsilon = 1e-9);
        assert_relative_eq!(avg.transfer_function()[[1, 0, 0]].re, 1.0, epsilon = 1e-9);
        assert_relative_eq!(avg.transfer_function()[[2, 0, 0]].re, 5.0, epsilon = 1e-9);
        assert_relative_eq!(avg.transfer_function()[[3, 0, 0]].re, 5.0, epsilon = 1e-9);
        assert!(avg.rotation_angle().iter().all(|a| *a == 0.0));
    }

    #[test]
    fn test_zeros_are_missing() {
        let full = constant(2.0, vec![1.0, 10.0]);
        let empty = TfBase::new(TfInputs::default().frequency(vec![1.0, 10.0])).unwrap();
        let avg = average(&[full, empty], 2, &InterpolationOptions::default()).unwrap();
        assert_relative_eq!(avg.transfer_function()[[0, 1, 1]].re, 2.0, epsilon = 1e-12);
        assert!(!avg.has_tf_model_error());
    }

    #[test]
    fn test_purely_imaginary_value_keeps_its_station() {
        let frequency = vec![1.0, 10.0];
        let series = [Complex64::new(0.0, 2.0), Complex64::new(2.0, 2.0)].map(|v| {
            TfBase::new(
                TfInputs::default()
                    .tf(Array3::from_elem((2, 2, 2), v))
                    .frequency(frequency.clone()),
            )
            .unwrap()
        });
        let avg = average(&series, 2, &InterpolationOptions::default()).unwrap();
        for v in avg.transfer_function().iter() {
            assert_relative_eq!(v.re, 1.0, epsilon = 1e-12);
            assert_relative_eq!(v.im, 2.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_average_rejects_bad_input() {
        assert!(average(&[], 10, &InterpolationOptions::default()).is_err());
        let a = constant(1.0, vec![1.0, 2.0]);
        assert!(average(&[a.clone()], 0, &InterpolationOptions::default()).is_err());
        let tipper = TfBase::with_shape(
            crate::transfer_function::TensorShape::TIPPER,
            TfInputs::default().frequency(vec![1.0, 2.0]),
        )
        .unwrap();
        let err = average(&[a, tipper], 4, &InterpolationOptions::default()).unwrap_err();
        assert!(err.to_string().contains("2x2"));
    }
}
