//! Transfer-function module
//!
//! Provides the frequency-indexed tensor series [`TfBase`] and the
//! impedance, tipper and phase tensor types built on it.
//!
//! Operations are split by concern:
//! - `base` - construction, validation, accessors
//! - `rotation` - coordinate rotation with error propagation
//! - `interpolation` - resampling onto a new frequency axis
//! - `z`, `tipper`, `phase_tensor` - derived quantities
//! - `average` - station averaging

mod average;
mod base;
mod interpolation;
mod phase_tensor;
mod rotation;
mod tipper;
mod z;

pub use average::average;
pub use base::{validate_array_input, TensorShape, TfBase, TfInputs};
pub use interpolation::InterpolationOptions;
pub use phase_tensor::{EllipseGeometry, PhaseTensor};
pub use tipper::{Arrow, InductionArrows, Tipper};
pub use z::Z;

pub use crate::math::interp::{BoundsPolicy, InterpolationMethod};
