//! Impedance tensor
//!
//! `Z` is a 2x2 [`TfBase`] in mV/km/nT with the derived quantities
//! magnetotellurics reads off it: apparent resistivity, phase, their errors,
//! static-shift correction and the phase tensor.

use std::ops::Deref;

use ndarray::{s, Array3};
use num_complex::Complex64;
use tracing::debug;

use super::base::{TensorShape, TfBase, TfInputs};
use super::interpolation::InterpolationOptions;
use super::phase_tensor::PhaseTensor;
use crate::error::TfError;
use crate::frequency::Frequency;
use crate::math::conversions::{
    complex_2_degree, resistivity_phase_2_z, z_2_resistivity, z_error_2_resistivity_phase_error,
};

/// Impedance tensor series `[nfreq, 2, 2]`
#[derive(Debug, Clone, PartialEq)]
pub struct Z {
    base: TfBase,
}

impl Z {
    pub fn new(inputs: TfInputs) -> Result<Self, TfError> {
        Ok(Self {
            base: TfBase::with_shape(TensorShape::IMPEDANCE, inputs)?,
        })
    }

    /// Wrap an existing series; it must hold 2x2 tensors
    pub fn from_base(base: TfBase) -> Result<Self, TfError> {
        let shape = base.shape();
        if shape != TensorShape::IMPEDANCE {
            return Err(TfError::UnsupportedShape {
                expected_rows: 2,
                expected_cols: 2,
                rows: shape.rows,
                cols: shape.cols,
            });
        }
        Ok(Self { base })
    }

    /// Build from apparent resistivity (Ohm m) and phase (degrees)
    ///
    /// Both arrays are `[nfreq, 2, 2]` on `frequency`.
    pub fn from_resistivity_phase(
        resistivity: &Array3<f64>,
        phase: &Array3<f64>,
        frequency: Frequency,
    ) -> Result<Self, TfError> {
        let dims = (frequency.npoints(), 2, 2);
        for (name, array) in [("resistivity", resistivity), ("phase", phase)] {
            if array.dim() != dims {
                return Err(TfError::LengthMismatch {
                    name,
                    expected: frequency.npoints(),
                    actual: array.dim().0,
                });
            }
        }

        let period = frequency.period().to_vec();
        let z = Array3::from_shape_fn(dims, |(f, i, j)| {
            resistivity_phase_2_z(resistivity[[f, i, j]], phase[[f, i, j]], period[f])
        });
        Ok(Self {
            base: TfBase::from_arrays(
                TensorShape::IMPEDANCE,
                frequency,
                z,
                Array3::zeros(dims),
                Array3::zeros(dims),
            )?,
        })
    }

    pub fn into_inner(self) -> TfBase {
        self.base
    }

    pub fn z(&self) -> &Array3<Complex64> {
        self.base.transfer_function()
    }

    pub fn z_error(&self) -> &Array3<f64> {
        self.base.transfer_function_error()
    }

    pub fn z_model_error(&self) -> &Array3<f64> {
        self.base.transfer_function_model_error()
    }

    /// Apparent resistivity in Ohm m
    pub fn resistivity(&self) -> Array3<f64> {
        let period = self.base.period();
        Array3::from_shape_fn(self.z().dim(), |(f, i, j)| {
            z_2_resistivity(self.z()[[f, i, j]], period[f])
        })
    }

    /// Impedance phase in degrees
    pub fn phase(&self) -> Array3<f64> {
        self.z().mapv(complex_2_degree)
    }

    /// Apparent resistivity error from the measurement error
    pub fn resistivity_error(&self) -> Array3<f64> {
        self.resistivity_phase_error().0
    }

    /// Phase error in degrees from the measurement error
    pub fn phase_error(&self) -> Array3<f64> {
        self.resistivity_phase_error().1
    }

    pub fn resistivity_model_error(&self) -> Array3<f64> {
        self.propagate(self.z_model_error()).0
    }

    pub fn phase_model_error(&self) -> Array3<f64> {
        self.propagate(self.z_model_error()).1
    }

    fn resistivity_phase_error(&self) -> (Array3<f64>, Array3<f64>) {
        self.propagate(self.z_error())
    }

    fn propagate(&self, error: &Array3<f64>) -> (Array3<f64>, Array3<f64>) {
        let period = self.base.period();
        let dims = self.z().dim();
        let mut res_err = Array3::zeros(dims);
        let mut phase_err = Array3::zeros(dims);
        for ((f, i, j), &z) in self.z().indexed_iter() {
            let (r, p) = z_error_2_resistivity_phase_error(z, error[[f, i, j]], period[f]);
            res_err[[f, i, j]] = r;
            phase_err[[f, i, j]] = p;
        }
        (res_err, phase_err)
    }

    /// Remove static shift
    ///
    /// Row x is divided by sqrt(`ss_x`) and row y by sqrt(`ss_y`); errors are
    /// scaled the same way.
    pub fn remove_static_shift(&self, ss_x: f64, ss_y: f64) -> Result<Z, TfError> {
        for factor in [ss_x, ss_y] {
            if !(factor.is_finite() && factor > 0.0) {
                return Err(TfError::InvalidAxis {
                    name: "static shift factor",
                    index: 0,
                    value: factor,
                });
            }
        }

        let scale = [ss_x.sqrt(), ss_y.sqrt()];
        let mut z = self.z().clone();
        let mut z_error = self.z_error().clone();
        let mut z_model_error = self.z_model_error().clone();
        for (row, s) in scale.iter().enumerate() {
            z.slice_mut(s![.., row, ..]).mapv_inplace(|v| v / *s);
            z_error.slice_mut(s![.., row, ..]).mapv_inplace(|v| v / *s);
            z_model_error
                .slice_mut(s![.., row, ..])
                .mapv_inplace(|v| v / *s);
        }
        debug!(ss_x, ss_y, "removed static shift");

        Ok(Z {
            base: TfBase::from_parts(
                TensorShape::IMPEDANCE,
                self.base.frequency_axis().clone(),
                z,
                z_error,
                z_model_error,
                self.base.rotation_angle().clone(),
            ),
        })
    }

    pub fn rotate(&self, angle: f64) -> Result<Z, TfError> {
        Ok(Z {
            base: self.base.rotate(angle)?,
        })
    }

    pub fn rotate_each(&self, angles: &[f64]) -> Result<Z, TfError> {
        Ok(Z {
            base: self.base.rotate_each(angles)?,
        })
    }

    pub fn interpolate(
        &self,
        new_frequency: &[f64],
        options: &InterpolationOptions,
    ) -> Result<Z, TfError> {
        Ok(Z {
            base: self.base.interpolate(new_frequency, options)?,
        })
    }

    /// Phase tensor of every frequency
    pub fn phase_tensor(&self) -> PhaseTensor {
        PhaseTensor::from_z(self)
    }
}

impl Deref for Z {
    type Target = TfBase;

    fn deref(&self) -> &TfBase {
        &self.base
    }
}

impl TryFrom<TfBase> for Z {
    type Error = TfError;

    fn try_from(base: TfBase) -> Result<Self, Self::Error> {
        Z::from_base(base)
    }
}
