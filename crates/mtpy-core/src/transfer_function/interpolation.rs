//! Frequency interpolation
//!
//! Provides methods for resampling a transfer-function series onto a new
//! frequency (or period) axis. Real and imaginary parts of every element are
//! interpolated independently; errors and model errors use the same method.

use ndarray::{Array1, Array3};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::base::TfBase;
use crate::error::TfError;
use crate::frequency::{validate_axis, Frequency};
use crate::math::interp::{BoundsPolicy, InterpolationMethod, Interpolator};

/// Options controlling [`TfBase::interpolate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpolationOptions {
    pub method: InterpolationMethod,
    pub bounds: BoundsPolicy,
    /// Interpolate against log10(frequency)
    pub log_space: bool,
}

impl InterpolationOptions {
    pub fn new(method: InterpolationMethod, bounds: BoundsPolicy) -> Self {
        Self {
            method,
            bounds,
            log_space: false,
        }
    }

    pub fn log_space(mut self, log_space: bool) -> Self {
        self.log_space = log_space;
        self
    }
}

impl TfBase {
    /// Interpolate onto new frequencies (Hz)
    ///
    /// # Example
    /// ```
    /// use mtpy_core::transfer_function::{InterpolationOptions, TfBase, TfInputs};
    /// use ndarray::Array3;
    ///
    /// let tf = TfBase::new(
    ///     TfInputs::default()
    ///         .tf_real(Array3::<f64>::ones((3, 2, 2)))
    ///         .frequency(vec![1.0, 2.0, 3.0]),
    /// )
    /// .unwrap();
    /// let resampled = tf.interpolate(&[1.5, 2.5], &InterpolationOptions::default()).unwrap();
    /// assert_eq!(resampled.n_frequencies(), 2);
    /// ```
    pub fn interpolate(
        &self,
        new_frequency: &[f64],
        options: &InterpolationOptions,
    ) -> Result<TfBase, TfError> {
        let axis = Frequency::from_f(new_frequency.to_vec())?;
        self.interpolate_onto(axis, options)
    }

    /// Interpolate onto new periods (s)
    pub fn interpolate_periods(
        &self,
        new_period: &[f64],
        options: &InterpolationOptions,
    ) -> Result<TfBase, TfError> {
        let axis = Frequency::from_period(new_period.to_vec())?;
        self.interpolate_onto(axis, options)
    }

    /// Interpolate onto an existing frequency axis
    pub fn interpolate_onto(
        &self,
        axis: Frequency,
        options: &InterpolationOptions,
    ) -> Result<TfBase, TfError> {
        validate_axis(axis.f(), "frequency")?;
        let shape = self.shape();
        let to_x = |f: f64| if options.log_space { f.log10() } else { f };

        // Source order by increasing frequency, duplicates dropped
        let src_f = self.frequency();
        let mut order: Vec<usize> = (0..src_f.len()).collect();
        order.sort_by(|&a, &b| src_f[a].total_cmp(&src_f[b]));
        order.dedup_by(|a, b| src_f[*a] == src_f[*b]);
        if order.is_empty() {
            return Err(TfError::EmptyAxis);
        }
        let x_src: Vec<f64> = order.iter().map(|&i| to_x(src_f[i])).collect();
        let x_new: Vec<f64> = axis.f().iter().map(|&f| to_x(f)).collect();

        let (f_min, f_max) = (src_f[order[0]], src_f[order[order.len() - 1]]);
        let outside = axis
            .f()
            .iter()
            .filter(|&&f| f < f_min || f > f_max)
            .count();
        if outside > 0 {
            match options.bounds {
                BoundsPolicy::Fail => {
                    let value = axis
                        .f()
                        .iter()
                        .copied()
                        .find(|&f| f < f_min || f > f_max)
                        .unwrap_or(f64::NAN);
                    return Err(TfError::OutOfBounds {
                        value,
                        min: f_min,
                        max: f_max,
                    });
                }
                policy => warn!(
                    outside,
                    ?policy,
                    "interpolation targets outside the source frequency range"
                ),
            }
        }

        // The global range is checked; gaps left by NaN samples become NaN
        let bounds = match options.bounds {
            BoundsPolicy::Fail => BoundsPolicy::Nan,
            other => other,
        };

        let m = axis.npoints();
        let dims = (m, shape.rows, shape.cols);
        let mut tf = Array3::<Complex64>::zeros(dims);
        let mut tf_error = Array3::<f64>::zeros(dims);
        let mut tf_model_error = Array3::<f64>::zeros(dims);

        let sample = Sampler {
            x_src: &x_src,
            x_new: &x_new,
            method: options.method,
            bounds,
        };

        let (has_tf, has_err, has_model_err) = (
            self.has_tf(),
            self.has_tf_error(),
            self.has_tf_model_error(),
        );
        for i in 0..shape.rows {
            for j in 0..shape.cols {
                if has_tf {
                    let values = self.transfer_function();
                    let re = sample.run(order.iter().map(|&k| values[[k, i, j]].re))?;
                    let im = sample.run(order.iter().map(|&k| values[[k, i, j]].im))?;
                    for (fi, (r, c)) in re.into_iter().zip(im).enumerate() {
                        tf[[fi, i, j]] = Complex64::new(r, c);
                    }
                }
                if has_err {
                    let values = self.transfer_function_error();
                    let err = sample.run(order.iter().map(|&k| values[[k, i, j]]))?;
                    for (fi, e) in err.into_iter().enumerate() {
                        tf_error[[fi, i, j]] = e;
                    }
                }
                if has_model_err {
                    let values = self.transfer_function_model_error();
                    let err = sample.run(order.iter().map(|&k| values[[k, i, j]]))?;
                    for (fi, e) in err.into_iter().enumerate() {
                        tf_model_error[[fi, i, j]] = e;
                    }
                }
            }
        }

        // Rotation angle follows the nearest source frequency
        let angle_sampler = Sampler {
            x_src: &x_src,
            x_new: &x_new,
            method: InterpolationMethod::Nearest,
            bounds: BoundsPolicy::Extrapolate,
        };
        let rotation_angle = Array1::from(
            angle_sampler.run(order.iter().map(|&k| self.rotation_angle()[k]))?,
        );

        debug!(
            from = self.n_frequencies(),
            to = m,
            method = ?options.method,
            "interpolated transfer function"
        );

        Ok(TfBase::from_parts(
            shape,
            axis,
            tf,
            tf_error,
            tf_model_error,
            rotation_angle,
        ))
    }
}

/// Shared abscissae for interpolating one component at a time
struct Sampler<'a> {
    x_src: &'a [f64],
    x_new: &'a [f64],
    method: InterpolationMethod,
    bounds: BoundsPolicy,
}

impl Sampler<'_> {
    /// Interpolate one component given in source order; NaN samples are dropped
    fn run(&self, y: impl Iterator<Item = f64>) -> Result<Vec<f64>, TfError> {
        let mut xs = Vec::with_capacity(self.x_src.len());
        let mut ys = Vec::with_capacity(self.x_src.len());
        for (&x, v) in self.x_src.iter().zip(y) {
            if !v.is_nan() {
                xs.push(x);
                ys.push(v);
            }
        }
        if xs.len() < self.x_src.len() {
            warn!(
                dropped = self.x_src.len() - xs.len(),
                "dropping NaN samples before interpolation"
            );
        }

        let interp = Interpolator::new(&xs, &ys, self.method);
        self.x_new
            .iter()
            .map(|&x| interp.eval(x, self.bounds))
            .collect()
    }
}
