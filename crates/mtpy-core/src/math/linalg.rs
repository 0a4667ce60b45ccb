//! Linear algebra operations on 2x2 real tensors
//!
//! Uses nalgebra as the backend. All ndarray<->nalgebra conversions are
//! contained here so callers only ever see ndarray views.

use nalgebra::Matrix2;
use ndarray::{Array2, ArrayView2};

use crate::constants::NEAR_ZERO;

/// Convert an ndarray 2x2 view to nalgebra Matrix2
#[inline]
pub(crate) fn to_na2(a: ArrayView2<f64>) -> Matrix2<f64> {
    Matrix2::new(a[[0, 0]], a[[0, 1]], a[[1, 0]], a[[1, 1]])
}

/// Convert nalgebra Matrix2 to ndarray Array2
#[inline]
pub(crate) fn from_na2(m: &Matrix2<f64>) -> Array2<f64> {
    Array2::from_shape_fn((2, 2), |(i, j)| m[(i, j)])
}

/// Singular relative to the matrix scale: |det| < NEAR_ZERO * ||m||_F^2
#[inline]
fn is_singular(m: &Matrix2<f64>) -> bool {
    let scale = m.norm_squared();
    scale == 0.0 || !(m.determinant().abs() >= NEAR_ZERO * scale)
}

/// Invert a 2x2 real matrix, None when singular
pub fn invert_2x2(a: ArrayView2<f64>) -> Option<Array2<f64>> {
    let m = to_na2(a);
    if is_singular(&m) {
        return None;
    }
    m.try_inverse().map(|inv| from_na2(&inv))
}

/// Solve X * P = Y for P (P = X^-1 Y), None when X is singular
pub fn left_divide_2x2(x: ArrayView2<f64>, y: ArrayView2<f64>) -> Option<Array2<f64>> {
    let xm = to_na2(x);
    if is_singular(&xm) {
        return None;
    }
    xm.try_inverse().map(|inv| from_na2(&(inv * to_na2(y))))
}
