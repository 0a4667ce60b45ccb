//! Tipper and induction arrows

use std::ops::Deref;

use ndarray::{s, Array1, Array3, Zip};
use num_complex::Complex64;

use super::base::{TensorShape, TfBase, TfInputs};
use super::interpolation::InterpolationOptions;
use crate::config::{ArrowDirection, ArrowOptions};
use crate::error::TfError;
use crate::math::conversions::{degree_2_radian, radian_2_degree};

/// Tipper series `[nfreq, 1, 2]` holding `[Tzx, Tzy]`
#[derive(Debug, Clone, PartialEq)]
pub struct Tipper {
    base: TfBase,
}

/// One induction arrow in map units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arrow {
    /// East component
    pub dx: f64,
    /// North component
    pub dy: f64,
    pub magnitude: f64,
    /// Degrees clockwise from north
    pub angle: f64,
}

/// Real and imaginary arrows of one frequency; None when above threshold
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InductionArrows {
    pub real: Option<Arrow>,
    pub imag: Option<Arrow>,
}

impl Tipper {
    pub fn new(inputs: TfInputs) -> Result<Self, TfError> {
        Ok(Self {
            base: TfBase::with_shape(TensorShape::TIPPER, inputs)?,
        })
    }

    /// Wrap an existing series; it must hold 1x2 tensors
    pub fn from_base(base: TfBase) -> Result<Self, TfError> {
        let shape = base.shape();
        if shape != TensorShape::TIPPER {
            return Err(TfError::UnsupportedShape {
                expected_rows: 1,
                expected_cols: 2,
                rows: shape.rows,
                cols: shape.cols,
            });
        }
        Ok(Self { base })
    }

    pub fn into_inner(self) -> TfBase {
        self.base
    }

    pub fn tipper(&self) -> &Array3<Complex64> {
        self.base.transfer_function()
    }

    pub fn tipper_error(&self) -> &Array3<f64> {
        self.base.transfer_function_error()
    }

    fn component(&self, col: usize, part: fn(&Complex64) -> f64) -> Array1<f64> {
        self.base
            .transfer_function()
            .slice(s![.., 0, col])
            .map(part)
    }

    pub fn mag_real(&self) -> Array1<f64> {
        let tx = self.component(0, |v| v.re);
        let ty = self.component(1, |v| v.re);
        magnitude(&tx, &ty)
    }

    pub fn mag_imag(&self) -> Array1<f64> {
        let tx = self.component(0, |v| v.im);
        let ty = self.component(1, |v| v.im);
        magnitude(&tx, &ty)
    }

    /// Angle of the real arrow in degrees, atan2(Re Ty, Re Tx)
    pub fn angle_real(&self) -> Array1<f64> {
        let tx = self.component(0, |v| v.re);
        let ty = self.component(1, |v| v.re);
        angle(&tx, &ty)
    }

    pub fn angle_imag(&self) -> Array1<f64> {
        let tx = self.component(0, |v| v.im);
        let ty = self.component(1, |v| v.im);
        angle(&tx, &ty)
    }

    /// Induction arrows for frequency `index`, None when out of range
    pub fn arrows(&self, index: usize, options: &ArrowOptions) -> Option<InductionArrows> {
        if index >= self.base.n_frequencies() {
            return None;
        }
        let sign = match options.direction {
            ArrowDirection::Parkinson => -1.0,
            ArrowDirection::Wiese => 1.0,
        };
        let build = |magnitude: f64, angle: f64| {
            if !(magnitude <= options.threshold) {
                return None;
            }
            let theta = degree_2_radian(angle);
            Some(Arrow {
                dx: sign * options.size * magnitude * theta.sin(),
                dy: sign * options.size * magnitude * theta.cos(),
                magnitude,
                angle,
            })
        };

        Some(InductionArrows {
            real: build(self.mag_real()[index], self.angle_real()[index]),
            imag: build(self.mag_imag()[index], self.angle_imag()[index]),
        })
    }

    pub fn rotate(&self, angle: f64) -> Result<Tipper, TfError> {
        Ok(Tipper {
            base: self.base.rotate(angle)?,
        })
    }

    pub fn interpolate(
        &self,
        new_frequency: &[f64],
        options: &InterpolationOptions,
    ) -> Result<Tipper, TfError> {
        Ok(Tipper {
            base: self.base.interpolate(new_frequency, options)?,
        })
    }
}

impl Deref for Tipper {
    type Target = TfBase;

    fn deref(&self) -> &TfBase {
        &self.base
    }
}

impl TryFrom<TfBase> for Tipper {
    type Error = TfError;

    fn try_from(base: TfBase) -> Result<Self, Self::Error> {
        Tipper::from_base(base)
    }
}

fn magnitude(tx: &Array1<f64>, ty: &Array1<f64>) -> Array1<f64> {
    Zip::from(tx).and(ty).map_collect(|x, y| x.hypot(*y))
}

fn angle(tx: &Array1<f64>, ty: &Array1<f64>) -> Array1<f64> {
    Zip::from(tx)
        .and(ty)
        .map_collect(|x, y| radian_2_degree(y.atan2(*x)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn tipper(tx: Complex64, ty: Complex64) -> Tipper {
        let mut values = Array3::<Complex64>::zeros((2, 1, 2));
        for f in 0..2 {
            values[[f, 0, 0]] = tx;
            values[[f, 0, 1]] = ty;
        }
        Tipper::new(TfInputs::default().tf(values)).unwrap()
    }

    #[test]
    fn test_magnitude_and_angle() {
        let t = tipper(Complex64::new(0.3, 0.0), Complex64::new(0.4, -0.1));
        assert_relative_eq!(t.mag_real()[0], 0.5, epsilon = 1e-12);
        assert_relative_eq!(t.angle_real()[0], 0.4f64.atan2(0.3).to_degrees(), epsilon = 1e-12);
        assert_relative_eq!(t.mag_imag()[1], 0.1, epsilon = 1e-12);
        assert_relative_eq!(t.angle_imag()[1], -90.0, epsilon = 1e-12);
    }

    #[test]
    fn test_parkinson_points_opposite_to_wiese() {
        let t = tipper(Complex64::new(0.0, 0.0), Complex64::new(0.2, 0.0));
        let parkinson = t.arrows(0, &ArrowOptions::default()).unwrap();
        let wiese = t
            .arrows(
                0,
                &ArrowOptions {
                    direction: ArrowDirection::Wiese,
                    ..ArrowOptions::default()
                },
            )
            .unwrap();

        let p = parkinson.real.unwrap();
        let w = wiese.real.unwrap();
        // Ty only: arrow lies along east
        assert_relative_eq!(w.dx, 2.5 * 0.2, epsilon = 1e-12);
        assert_relative_eq!(w.dy, 0.0, epsilon = 1e-12);
        assert_relative_eq!(p.dx, -w.dx, epsilon = 1e-12);
        assert_relative_eq!(p.dy, -w.dy, epsilon = 1e-12);
    }

    #[test]
    fn test_threshold_drops_arrows() {
        let t = tipper(Complex64::new(3.0, 0.1), Complex64::new(0.0, 0.0));
        let arrows = t.arrows(1, &ArrowOptions::default()).unwrap();
        assert!(arrows.real.is_none());
        assert!(arrows.imag.is_some());
        assert!(t.arrows(2, &ArrowOptions::default()).is_none());
    }

    #[test]
    fn test_rotation_by_90_swaps_components() {
        let t = tipper(Complex64::new(0.5, 0.0), Complex64::new(0.0, 0.0));
        let rotated = t.rotate(90.0).unwrap();
        assert_relative_eq!(rotated.mag_real()[0], 0.5, epsilon = 1e-12);
        assert_relative_eq!(rotated.angle_real()[0], -90.0, epsilon = 1e-9);
    }
}
