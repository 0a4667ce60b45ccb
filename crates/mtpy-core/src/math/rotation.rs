//! Rotation of tensors with error propagation
//!
//! Angles are in degrees, positive clockwise from x (north) towards y (east).
//! The rotation matrix is R = [[cos, sin], [-sin, cos]]; a 2x2 tensor rotates
//! as R * M * R^T and a 1x2 vector as R * v.
//!
//! Errors are propagated linearly: every rotated element is a weighted sum of
//! the input elements, and its error combines the absolute weights times the
//! input errors in quadrature.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use num_complex::Complex64;

use super::conversions::degree_2_radian;

/// Rotation matrix for `angle` degrees
pub fn rotation_matrix(angle: f64) -> [[f64; 2]; 2] {
    let phi = degree_2_radian(angle.rem_euclid(360.0));
    let (s, c) = phi.sin_cos();
    [[c, s], [-s, c]]
}

/// Rotate a 2x2 complex matrix and optionally its 2x2 error matrix
pub fn rotate_matrix_with_errors(
    matrix: ArrayView2<Complex64>,
    angle: f64,
    error: Option<ArrayView2<f64>>,
) -> (Array2<Complex64>, Option<Array2<f64>>) {
    let r = rotation_matrix(angle);

    // M'_ij = sum_kl R_ik R_jl M_kl
    let rotated = Array2::from_shape_fn((2, 2), |(i, j)| {
        let mut acc = Complex64::new(0.0, 0.0);
        for k in 0..2 {
            for l in 0..2 {
                acc += matrix[[k, l]] * (r[i][k] * r[j][l]);
            }
        }
        acc
    });

    (rotated, error.map(|err| rotate_matrix_error(err, angle)))
}

/// Propagate a 2x2 error matrix through a rotation of `angle` degrees
///
/// sigma'_ij = sqrt(sum_kl (R_ik R_jl sigma_kl)^2)
pub fn rotate_matrix_error(error: ArrayView2<f64>, angle: f64) -> Array2<f64> {
    let r = rotation_matrix(angle);
    Array2::from_shape_fn((2, 2), |(i, j)| {
        let mut acc = 0.0;
        for k in 0..2 {
            for l in 0..2 {
                let term = (r[i][k] * r[j][l]).abs() * error[[k, l]];
                acc += term * term;
            }
        }
        acc.sqrt()
    })
}

/// Rotate a 2-element complex vector and optionally its errors
pub fn rotate_vector_with_errors(
    vector: ArrayView1<Complex64>,
    angle: f64,
    error: Option<ArrayView1<f64>>,
) -> (Array1<Complex64>, Option<Array1<f64>>) {
    let r = rotation_matrix(angle);

    let rotated = Array1::from_shape_fn(2, |i| vector[0] * r[i][0] + vector[1] * r[i][1]);

    (rotated, error.map(|err| rotate_vector_error(err, angle)))
}

/// Propagate the errors of a 2-element vector through a rotation
pub fn rotate_vector_error(error: ArrayView1<f64>, angle: f64) -> Array1<f64> {
    let r = rotation_matrix(angle);
    Array1::from_shape_fn(2, |i| {
        let a = r[i][0].abs() * error[0];
        let b = r[i][1].abs() * error[1];
        (a * a + b * b).sqrt()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{arr1, arr2};

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    #[test]
    fn test_rotation_matrix_orthogonal() {
        let r = rotation_matrix(37.0);
        let det = r[0][0] * r[1][1] - r[0][1] * r[1][0];
        assert_relative_eq!(det, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rotate_ones_by_30() {
        let m = Array2::from_elem((2, 2), c(1.0, 0.0));
        let e = Array2::from_elem((2, 2), 0.25);
        let (rot, err) = rotate_matrix_with_errors(m.view(), 30.0, Some(e.view()));

        let (s, co) = degree_2_radian(30.0).sin_cos();
        assert_relative_eq!(rot[[0, 0]].re, (co + s).powi(2), epsilon = 1e-12);
        assert_relative_eq!(rot[[0, 1]].re, (co + s) * (co - s), epsilon = 1e-12);
        assert_relative_eq!(rot[[1, 0]].re, (co + s) * (co - s), epsilon = 1e-12);
        assert_relative_eq!(rot[[1, 1]].re, (co - s).powi(2), epsilon = 1e-12);

        // Uniform errors are unchanged: c^4 + 2c^2s^2 + s^4 = 1
        let err = err.unwrap();
        for v in err.iter() {
            assert_relative_eq!(*v, 0.25, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_rotate_90_swaps_diagonal() {
        let m = arr2(&[[c(1.0, 1.0), c(2.0, 0.0)], [c(-3.0, 0.5), c(4.0, -1.0)]]);
        let (rot, _) = rotate_matrix_with_errors(m.view(), 90.0, None);
        assert_relative_eq!(rot[[0, 0]].re, 4.0, epsilon = 1e-12);
        assert_relative_eq!(rot[[0, 0]].im, -1.0, epsilon = 1e-12);
        assert_relative_eq!(rot[[1, 1]].re, 1.0, epsilon = 1e-12);
        assert_relative_eq!(rot[[0, 1]].re, 3.0, epsilon = 1e-12);
        assert_relative_eq!(rot[[1, 0]].re, -2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rotate_vector() {
        let v = arr1(&[c(1.0, 0.0), c(0.0, 0.0)]);
        let e = arr1(&[0.1, 0.2]);
        let (rot, err) = rotate_vector_with_errors(v.view(), 90.0, Some(e.view()));
        assert_relative_eq!(rot[0].re, 0.0, epsilon = 1e-12);
        assert_relative_eq!(rot[1].re, -1.0, epsilon = 1e-12);
        let err = err.unwrap();
        assert_relative_eq!(err[0], 0.2, epsilon = 1e-12);
        assert_relative_eq!(err[1], 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_error_helper_matches_combined_rotation() {
        let m = arr2(&[[c(1.0, 2.0), c(-3.0, 0.5)], [c(0.2, 0.0), c(4.0, -1.0)]]);
        let e = arr2(&[[0.1, 0.2], [0.3, 0.4]]);
        let (_, combined) = rotate_matrix_with_errors(m.view(), 47.0, Some(e.view()));
        assert_eq!(rotate_matrix_error(e.view(), 47.0), combined.unwrap());

        let ev = arr1(&[0.3, 0.7]);
        let v = arr1(&[c(1.0, 0.0), c(2.0, 1.0)]);
        let (_, combined) = rotate_vector_with_errors(v.view(), 47.0, Some(ev.view()));
        assert_eq!(rotate_vector_error(ev.view(), 47.0), combined.unwrap());
    }

    #[test]
    fn test_nan_propagates() {
        let mut m = Array2::from_elem((2, 2), c(1.0, 0.0));
        m[[0, 1]] = c(f64::NAN, 0.0);
        let (rot, _) = rotate_matrix_with_errors(m.view(), 10.0, None);
        assert!(rot[[0, 0]].re.is_nan());
    }
}
