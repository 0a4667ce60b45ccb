//! Coordinate rotation of a transfer-function series
//!
//! Every tensor is rotated by its frequency's angle, and measurement and
//! model errors are propagated alongside. Angles accumulate in
//! `rotation_angle` modulo 360.

use ndarray::{s, Array1};
use tracing::debug;

use super::base::{TensorShape, TfBase};
use crate::error::TfError;
use crate::math::rotation::{
    rotate_matrix_error, rotate_matrix_with_errors, rotate_vector_error, rotate_vector_with_errors,
};

impl TfBase {
    /// Rotate every tensor by `angle` degrees (clockwise positive)
    ///
    /// Returns a new series; NaN entries stay NaN.
    pub fn rotate(&self, angle: f64) -> Result<TfBase, TfError> {
        let angles = vec![angle; self.n_frequencies()];
        self.rotate_each(&angles)
    }

    /// Rotate each frequency by its own angle in degrees
    pub fn rotate_each(&self, angles: &[f64]) -> Result<TfBase, TfError> {
        let mut rotated = self.clone();
        rotated.rotate_each_in_place(angles)?;
        Ok(rotated)
    }

    /// Rotate in place by `angle` degrees
    pub fn rotate_in_place(&mut self, angle: f64) -> Result<(), TfError> {
        let angles = vec![angle; self.n_frequencies()];
        self.rotate_each_in_place(&angles)
    }

    /// Rotate in place, one angle per frequency
    pub fn rotate_each_in_place(&mut self, angles: &[f64]) -> Result<(), TfError> {
        let n = self.n_frequencies();
        if angles.len() != n {
            return Err(TfError::LengthMismatch {
                name: "rotation angle",
                expected: n,
                actual: angles.len(),
            });
        }
        if let Some(&bad) = angles.iter().find(|a| !a.is_finite()) {
            return Err(TfError::InvalidAngle(bad));
        }

        let shape = self.shape();
        if shape != TensorShape::IMPEDANCE && shape != TensorShape::TIPPER {
            return Err(TfError::UnsupportedShape {
                expected_rows: 2,
                expected_cols: 2,
                rows: shape.rows,
                cols: shape.cols,
            });
        }

        let angles: Vec<f64> = angles.iter().map(|a| a.rem_euclid(360.0)).collect();
        let (has_tf, has_err, has_model_err) = (
            self.has_tf(),
            self.has_tf_error(),
            self.has_tf_model_error(),
        );

        let mut tf = self.transfer_function().clone();
        let mut tf_error = self.transfer_function_error().clone();
        let mut tf_model_error = self.transfer_function_model_error().clone();

        for (index, &angle) in angles.iter().enumerate() {
            if shape == TensorShape::IMPEDANCE {
                if has_tf {
                    let value = self.transfer_function().slice(s![index, .., ..]);
                    let (rot, _) = rotate_matrix_with_errors(value, angle, None);
                    tf.slice_mut(s![index, .., ..]).assign(&rot);
                }
                if has_err {
                    let err = self.transfer_function_error().slice(s![index, .., ..]);
                    tf_error
                        .slice_mut(s![index, .., ..])
                        .assign(&rotate_matrix_error(err, angle));
                }
                if has_model_err {
                    let err = self.transfer_function_model_error().slice(s![index, .., ..]);
                    tf_model_error
                        .slice_mut(s![index, .., ..])
                        .assign(&rotate_matrix_error(err, angle));
                }
            } else {
                if has_tf {
                    let value = self.transfer_function().slice(s![index, 0, ..]);
                    let (rot, _) = rotate_vector_with_errors(value, angle, None);
                    tf.slice_mut(s![index, 0, ..]).assign(&rot);
                }
                if has_err {
                    let err = self.transfer_function_error().slice(s![index, 0, ..]);
                    tf_error
                        .slice_mut(s![index, 0, ..])
                        .assign(&rotate_vector_error(err, angle));
                }
                if has_model_err {
                    let err = self.transfer_function_model_error().slice(s![index, 0, ..]);
                    tf_model_error
                        .slice_mut(s![index, 0, ..])
                        .assign(&rotate_vector_error(err, angle));
                }
            }
        }

        let rotation_angle: Array1<f64> = self
            .rotation_angle()
            .iter()
            .zip(angles.iter())
            .map(|(current, added)| (current + added).rem_euclid(360.0))
            .collect();

        debug!(
            n_frequencies = n,
            first_angle = angles.first().copied().unwrap_or(0.0),
            "rotated transfer function"
        );

        *self = TfBase::from_parts(
            shape,
            self.frequency_axis().clone(),
            tf,
            tf_error,
            tf_model_error,
            rotation_angle,
        );
        Ok(())
    }
}
