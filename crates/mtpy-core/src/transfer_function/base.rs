//! Core TfBase struct and constructors
//!
//! A `TfBase` is a frequency-indexed series of small complex tensors together
//! with their measurement errors and model errors. Missing tensors are stored
//! as zeros; "empty" is a predicate on the values, never a separate state.

use ndarray::{Array, Array1, Array3, ArrayD, Dimension};
use num_complex::Complex64;
use num_traits::Zero;
use tracing::debug;

use crate::constants::RECIPROCAL_TOL;
use crate::error::TfError;
use crate::frequency::{fit_period_axis, validate_axis, Frequency};

/// Shape of each tensor in a series
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TensorShape {
    pub rows: usize,
    pub cols: usize,
}

impl TensorShape {
    /// 2x2 impedance tensor
    pub const IMPEDANCE: TensorShape = TensorShape { rows: 2, cols: 2 };
    /// 1x2 tipper vector
    pub const TIPPER: TensorShape = TensorShape { rows: 1, cols: 2 };

    /// Number of elements in one tensor
    #[inline]
    pub fn size(&self) -> usize {
        self.rows * self.cols
    }
}

impl Default for TensorShape {
    fn default() -> Self {
        TensorShape::IMPEDANCE
    }
}

/// Construction inputs; every field is optional
///
/// # Example
/// ```
/// use mtpy_core::transfer_function::{TfBase, TfInputs};
/// use ndarray::Array3;
///
/// let tf = TfBase::new(
///     TfInputs::default()
///         .tf_real(Array3::<f64>::ones((3, 2, 2)))
///         .period(vec![0.1, 1.0, 10.0]),
/// )
/// .unwrap();
/// assert_eq!(tf.n_frequencies(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TfInputs {
    pub tf: Option<ArrayD<Complex64>>,
    pub tf_error: Option<ArrayD<f64>>,
    pub tf_model_error: Option<ArrayD<f64>>,
    pub frequency: Option<Vec<f64>>,
    pub period: Option<Vec<f64>>,
}

impl TfInputs {
    pub fn tf<D: Dimension>(mut self, tf: Array<Complex64, D>) -> Self {
        self.tf = Some(tf.into_dyn());
        self
    }

    /// Real-valued transfer function, promoted to complex
    pub fn tf_real<D: Dimension>(mut self, tf: Array<f64, D>) -> Self {
        self.tf = Some(tf.mapv(Complex64::from).into_dyn());
        self
    }

    pub fn tf_error<D: Dimension>(mut self, tf_error: Array<f64, D>) -> Self {
        self.tf_error = Some(tf_error.into_dyn());
        self
    }

    pub fn tf_model_error<D: Dimension>(mut self, tf_model_error: Array<f64, D>) -> Self {
        self.tf_model_error = Some(tf_model_error.into_dyn());
        self
    }

    pub fn frequency(mut self, frequency: Vec<f64>) -> Self {
        self.frequency = Some(frequency);
        self
    }

    pub fn period(mut self, period: Vec<f64>) -> Self {
        self.period = Some(period);
        self
    }
}

/// A frequency-indexed series of transfer-function tensors
#[derive(Debug, Clone, PartialEq)]
pub struct TfBase {
    shape: TensorShape,
    frequency: Frequency,
    /// Transfer function [nfreq, rows, cols]
    tf: Array3<Complex64>,
    /// Measurement error [nfreq, rows, cols]
    tf_error: Array3<f64>,
    /// Model error [nfreq, rows, cols]
    tf_model_error: Array3<f64>,
    /// Accumulated rotation per frequency in degrees, within [0, 360)
    rotation_angle: Array1<f64>,
}

impl TfBase {
    /// Create a 2x2 series from any subset of inputs
    pub fn new(inputs: TfInputs) -> Result<Self, TfError> {
        Self::with_shape(TensorShape::IMPEDANCE, inputs)
    }

    /// Create a series of `shape` tensors from any subset of inputs
    ///
    /// Missing tensors are zero-filled at the largest known length, and a
    /// missing axis defaults to periods 1..=N.
    pub fn with_shape(shape: TensorShape, inputs: TfInputs) -> Result<Self, TfError> {
        let tf = inputs
            .tf
            .map(|a| validate_array_input(a, shape))
            .transpose()?;
        let tf_error = inputs
            .tf_error
            .map(|a| validate_array_input(a, shape))
            .transpose()?;
        let tf_model_error = inputs
            .tf_model_error
            .map(|a| validate_array_input(a, shape))
            .transpose()?;

        let n = [
            tf.as_ref().map(|a| a.shape()[0]),
            tf_error.as_ref().map(|a| a.shape()[0]),
            tf_model_error.as_ref().map(|a| a.shape()[0]),
            inputs.frequency.as_ref().map(Vec::len),
            inputs.period.as_ref().map(Vec::len),
        ]
        .into_iter()
        .flatten()
        .max()
        .unwrap_or(0)
        .max(1);

        let frequency = match (inputs.frequency, inputs.period) {
            (Some(f), Some(p)) => {
                check_reciprocal(&f, &p)?;
                Self::validate_frequency(f, n)?
            }
            (Some(f), None) => Self::validate_frequency(f, n)?,
            (None, Some(p)) => Self::validate_period(p, n)?,
            (None, None) => Frequency::default_for(n),
        };

        let dims = (n, shape.rows, shape.cols);
        let tf = fill_or_check(tf, dims, "transfer_function")?;
        let tf_error = fill_or_check(tf_error, dims, "transfer_function_error")?;
        let tf_model_error = fill_or_check(tf_model_error, dims, "transfer_function_model_error")?;

        debug!(
            n_frequencies = n,
            rows = shape.rows,
            cols = shape.cols,
            "initialized transfer function"
        );

        Ok(Self {
            shape,
            frequency,
            tf,
            tf_error,
            tf_model_error,
            rotation_angle: Array1::zeros(n),
        })
    }

    /// Create from complete arrays on a given axis
    pub fn from_arrays(
        shape: TensorShape,
        frequency: Frequency,
        tf: Array3<Complex64>,
        tf_error: Array3<f64>,
        tf_model_error: Array3<f64>,
    ) -> Result<Self, TfError> {
        frequency.validate()?;
        let dims = (frequency.npoints(), shape.rows, shape.cols);
        let tf = fill_or_check(Some(tf), dims, "transfer_function")?;
        let tf_error = fill_or_check(Some(tf_error), dims, "transfer_function_error")?;
        let tf_model_error =
            fill_or_check(Some(tf_model_error), dims, "transfer_function_model_error")?;
        let n = frequency.npoints();

        Ok(Self {
            shape,
            frequency,
            tf,
            tf_error,
            tf_model_error,
            rotation_angle: Array1::zeros(n),
        })
    }

    /// An empty series of one frequency (period 1 s)
    pub fn empty(shape: TensorShape) -> Self {
        let dims = (1, shape.rows, shape.cols);
        Self {
            shape,
            frequency: Frequency::default_for(1),
            tf: Array3::zeros(dims),
            tf_error: Array3::zeros(dims),
            tf_model_error: Array3::zeros(dims),
            rotation_angle: Array1::zeros(1),
        }
    }

    /// Internal: assemble already-validated parts
    pub(crate) fn from_parts(
        shape: TensorShape,
        frequency: Frequency,
        tf: Array3<Complex64>,
        tf_error: Array3<f64>,
        tf_model_error: Array3<f64>,
        rotation_angle: Array1<f64>,
    ) -> Self {
        debug_assert_eq!(tf.dim(), (frequency.npoints(), shape.rows, shape.cols));
        debug_assert_eq!(tf.dim(), tf_error.dim());
        debug_assert_eq!(tf.dim(), tf_model_error.dim());
        debug_assert_eq!(rotation_angle.len(), frequency.npoints());
        Self {
            shape,
            frequency,
            tf,
            tf_error,
            tf_model_error,
            rotation_angle,
        }
    }

    /// Validate a frequency axis for `n` tensors
    ///
    /// A shorter axis is extended in the period domain (see
    /// [`TfBase::validate_period`]); a longer one is rejected.
    pub fn validate_frequency(frequency: Vec<f64>, n: usize) -> Result<Frequency, TfError> {
        if frequency.len() == n {
            return Frequency::from_f(frequency);
        }
        validate_axis(&frequency, "frequency")?;
        let period = frequency.iter().map(|f| 1.0 / f).collect();
        Frequency::from_period(fit_period_axis(period, n, "frequency")?)
    }

    /// Validate a period axis for `n` tensors
    ///
    /// A shorter axis is extended by repeating the ratio of its last two
    /// points, or with unit steps when it holds a single value. A longer one
    /// is rejected.
    pub fn validate_period(period: Vec<f64>, n: usize) -> Result<Frequency, TfError> {
        if period.len() == n {
            return Frequency::from_period(period);
        }
        validate_axis(&period, "period")?;
        Frequency::from_period(fit_period_axis(period, n, "period")?)
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    #[inline]
    pub fn shape(&self) -> TensorShape {
        self.shape
    }

    /// Get the number of frequency points
    #[inline]
    pub fn n_frequencies(&self) -> usize {
        self.frequency.npoints()
    }

    /// Frequency in Hz
    #[inline]
    pub fn frequency(&self) -> &[f64] {
        self.frequency.f()
    }

    /// Period in s
    #[inline]
    pub fn period(&self) -> &[f64] {
        self.frequency.period()
    }

    #[inline]
    pub fn frequency_axis(&self) -> &Frequency {
        &self.frequency
    }

    #[inline]
    pub fn transfer_function(&self) -> &Array3<Complex64> {
        &self.tf
    }

    #[inline]
    pub fn transfer_function_error(&self) -> &Array3<f64> {
        &self.tf_error
    }

    #[inline]
    pub fn transfer_function_model_error(&self) -> &Array3<f64> {
        &self.tf_model_error
    }

    /// Accumulated rotation angle per frequency (degrees)
    #[inline]
    pub fn rotation_angle(&self) -> &Array1<f64> {
        &self.rotation_angle
    }

    // ------------------------------------------------------------------------
    // Predicates
    // ------------------------------------------------------------------------

    /// True when values, errors and model errors are all zero
    pub fn is_empty(&self) -> bool {
        !self.has_tf() && !self.has_tf_error() && !self.has_tf_model_error()
    }

    pub fn has_tf(&self) -> bool {
        self.tf.iter().any(|v| !v.is_zero())
    }

    pub fn has_tf_error(&self) -> bool {
        self.tf_error.iter().any(|v| *v != 0.0)
    }

    pub fn has_tf_model_error(&self) -> bool {
        self.tf_model_error.iter().any(|v| *v != 0.0)
    }

    // ------------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------------

    /// Replace the frequency axis; period is derived from it
    ///
    /// An empty series takes the length of the new axis.
    pub fn set_frequency(&mut self, frequency: Vec<f64>) -> Result<(), TfError> {
        validate_axis(&frequency, "frequency")?;
        self.resize_if_empty(frequency.len());
        self.frequency = Self::validate_frequency(frequency, self.n_frequencies())?;
        Ok(())
    }

    /// Replace the period axis; frequency is derived from it
    ///
    /// An empty series takes the length of the new axis.
    pub fn set_period(&mut self, period: Vec<f64>) -> Result<(), TfError> {
        validate_axis(&period, "period")?;
        self.resize_if_empty(period.len());
        self.frequency = Self::validate_period(period, self.n_frequencies())?;
        Ok(())
    }

    pub fn set_transfer_function<D: Dimension>(
        &mut self,
        tf: Array<Complex64, D>,
    ) -> Result<(), TfError> {
        let tf = validate_array_input(tf.into_dyn(), self.shape)?;
        self.resize_if_empty(tf.shape()[0]);
        self.tf = fill_or_check(Some(tf), self.tf.dim(), "transfer_function")?;
        Ok(())
    }

    pub fn set_transfer_function_error<D: Dimension>(
        &mut self,
        tf_error: Array<f64, D>,
    ) -> Result<(), TfError> {
        let tf_error = validate_array_input(tf_error.into_dyn(), self.shape)?;
        self.resize_if_empty(tf_error.shape()[0]);
        self.tf_error = fill_or_check(Some(tf_error), self.tf.dim(), "transfer_function_error")?;
        Ok(())
    }

    pub fn set_transfer_function_model_error<D: Dimension>(
        &mut self,
        tf_model_error: Array<f64, D>,
    ) -> Result<(), TfError> {
        let tf_model_error = validate_array_input(tf_model_error.into_dyn(), self.shape)?;
        self.resize_if_empty(tf_model_error.shape()[0]);
        self.tf_model_error = fill_or_check(
            Some(tf_model_error),
            self.tf.dim(),
            "transfer_function_model_error",
        )?;
        Ok(())
    }

    /// Replace NaN with zero in values (real and imaginary parts) and errors
    pub fn nan_to_zero(&mut self) {
        self.tf.mapv_inplace(|v| Complex64::new(nan_to_zero(v.re), nan_to_zero(v.im)));
        self.tf_error.mapv_inplace(nan_to_zero);
        self.tf_model_error.mapv_inplace(nan_to_zero);
    }

    /// Internal: an empty series takes the length of the first tensor or axis set on it
    fn resize_if_empty(&mut self, n: usize) {
        if n > 0 && n != self.n_frequencies() && self.is_empty() {
            debug!(
                from = self.n_frequencies(),
                to = n,
                "re-initializing empty transfer function"
            );
            *self = Self::from_parts(
                self.shape,
                Frequency::default_for(n),
                Array3::zeros((n, self.shape.rows, self.shape.cols)),
                Array3::zeros((n, self.shape.rows, self.shape.cols)),
                Array3::zeros((n, self.shape.rows, self.shape.cols)),
                Array1::zeros(n),
            );
        }
    }
}

/// Reshape an array-like into (n, rows, cols)
///
/// Any array whose element count is a multiple of `rows * cols` is accepted;
/// a single tensor becomes a series of length one.
pub fn validate_array_input<T: Clone>(
    input: ArrayD<T>,
    shape: TensorShape,
) -> Result<Array3<T>, TfError> {
    let size = input.len();
    if size == 0 || size % shape.size() != 0 {
        return Err(TfError::Shape {
            size,
            rows: shape.rows,
            cols: shape.cols,
        });
    }

    let n = size / shape.size();
    let input = if input.is_standard_layout() {
        input
    } else {
        input.as_standard_layout().into_owned()
    };
    input
        .into_shape_with_order((n, shape.rows, shape.cols))
        .map_err(|_| TfError::Shape {
            size,
            rows: shape.rows,
            cols: shape.cols,
        })
}

/// Zero-fill a missing tensor or check the length of a supplied one
fn fill_or_check<T: Clone + Zero>(
    array: Option<Array3<T>>,
    dims: (usize, usize, usize),
    name: &'static str,
) -> Result<Array3<T>, TfError> {
    match array {
        None => Ok(Array3::zeros(dims)),
        Some(a) if a.dim() == dims => Ok(a),
        Some(a) if a.shape()[1..] != [dims.1, dims.2] => Err(TfError::Shape {
            size: a.len(),
            rows: dims.1,
            cols: dims.2,
        }),
        Some(a) => Err(TfError::LengthMismatch {
            name,
            expected: dims.0,
            actual: a.shape()[0],
        }),
    }
}

fn check_reciprocal(frequency: &[f64], period: &[f64]) -> Result<(), TfError> {
    if frequency.len() != period.len() {
        return Err(TfError::LengthMismatch {
            name: "period",
            expected: frequency.len(),
            actual: period.len(),
        });
    }
    match frequency
        .iter()
        .zip(period)
        .position(|(f, p)| !((f * p - 1.0).abs() <= RECIPROCAL_TOL))
    {
        Some(index) => Err(TfError::NotReciprocal(index)),
        None => Ok(()),
    }
}

#[inline]
fn nan_to_zero(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, IxDyn};

    #[test]
    fn test_empty_series() {
        let tf = TfBase::empty(TensorShape::IMPEDANCE);
        assert!(tf.is_empty());
        assert!(!tf.has_tf());
        assert!(!tf.has_tf_error());
        assert!(!tf.has_tf_model_error());
        assert_eq!(tf.n_frequencies(), 1);
        assert_eq!(tf.period(), &[1.0]);
    }

    #[test]
    fn test_validate_array_input_single_tensor() {
        let a = ArrayD::<f64>::zeros(IxDyn(&[2, 2]));
        let out = validate_array_input(a, TensorShape::IMPEDANCE).unwrap();
        assert_eq!(out.dim(), (1, 2, 2));
    }

    #[test]
    fn test_validate_array_input_flat() {
        let a = ArrayD::from_shape_vec(IxDyn(&[8]), (0..8).map(|v| v as f64).collect()).unwrap();
        let out = validate_array_input(a, TensorShape::IMPEDANCE).unwrap();
        assert_eq!(out.dim(), (2, 2, 2));
        assert_eq!(out[[1, 0, 1]], 5.0);
    }

    #[test]
    fn test_validate_array_input_bad_size() {
        let a = ArrayD::<f64>::zeros(IxDyn(&[3]));
        assert!(matches!(
            validate_array_input(a, TensorShape::IMPEDANCE),
            Err(TfError::Shape { size: 3, .. })
        ));
    }

    #[test]
    fn test_validate_array_input_transposed_layout() {
        let a = Array2::from_shape_vec((2, 2), vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let t = a.reversed_axes().into_dyn();
        let out = validate_array_input(t, TensorShape::IMPEDANCE).unwrap();
        assert_eq!(out[[0, 0, 1]], 3.0);
        assert_eq!(out[[0, 1, 0]], 2.0);
    }

    #[test]
    fn test_validate_frequency_pads() {
        let f = TfBase::validate_frequency(vec![1.0], 10).unwrap();
        assert_eq!(f.npoints(), 10);
    }

    #[test]
    fn test_set_tf_on_empty_resizes() {
        let mut tf = TfBase::empty(TensorShape::IMPEDANCE);
        tf.set_transfer_function(Array3::from_elem((4, 2, 2), Complex64::new(1.0, 0.0)))
            .unwrap();
        assert_eq!(tf.n_frequencies(), 4);
        assert_eq!(tf.period(), &[1.0, 2.0, 3.0, 4.0]);
        assert!(tf.has_tf());
        assert!(!tf.has_tf_error());
    }

    #[test]
    fn test_set_tf_length_mismatch() {
        let mut tf = TfBase::new(TfInputs::default().tf_real(Array3::<f64>::ones((3, 2, 2))))
            .unwrap();
        let err = tf
            .set_transfer_function_error(Array3::<f64>::ones((2, 2, 2)))
            .unwrap_err();
        assert_eq!(
            err,
            TfError::LengthMismatch {
                name: "transfer_function_error",
                expected: 3,
                actual: 2
            }
        );
    }

    #[test]
    fn test_set_axis_on_empty_resizes() {
        let mut tf = TfBase::empty(TensorShape::IMPEDANCE);
        tf.set_frequency(vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(tf.n_frequencies(), 3);
        assert_eq!(tf.frequency(), &[1.0, 2.0, 3.0]);
        assert_eq!(tf.transfer_function().dim(), (3, 2, 2));

        let mut tf = TfBase::empty(TensorShape::TIPPER);
        tf.set_period(vec![10.0, 100.0]).unwrap();
        assert_eq!(tf.n_frequencies(), 2);
        assert_eq!(tf.period(), &[10.0, 100.0]);
        assert!(tf.is_empty());
    }

    #[test]
    fn test_set_axis_keeps_length_of_filled_series() {
        let mut tf = TfBase::new(TfInputs::default().tf_real(Array3::<f64>::ones((3, 2, 2))))
            .unwrap();
        assert!(matches!(
            tf.set_frequency(vec![1.0, 2.0, 3.0, 4.0]),
            Err(TfError::LengthMismatch { .. })
        ));
        assert_eq!(tf.n_frequencies(), 3);
    }

    #[test]
    fn test_nan_to_zero() {
        let mut values = Array3::from_elem((2, 2, 2), Complex64::new(1.0, 1.0));
        values[[0, 0, 0]] = Complex64::new(f64::NAN, 2.0);
        let mut tf = TfBase::new(TfInputs::default().tf(values)).unwrap();
        tf.nan_to_zero();
        assert_eq!(tf.transfer_function()[[0, 0, 0]], Complex64::new(0.0, 2.0));
    }
}
