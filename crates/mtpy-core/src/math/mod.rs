//! Mathematical functions module
//!
//! Provides the numeric building blocks for transfer-function processing:
//! unit conversions, rotation with error propagation, 1-D interpolation and
//! 2x2 linear algebra.

pub mod conversions;
pub mod interp;
pub mod linalg;
pub mod rotation;

pub use conversions::*;
pub use interp::{BoundsPolicy, InterpolationMethod, Interpolator};
pub use rotation::{
    rotate_matrix_error, rotate_matrix_with_errors, rotate_vector_error, rotate_vector_with_errors,
    rotation_matrix,
};
