//! Phase tensor
//!
//! Φ = X⁻¹Y with X and Y the real and imaginary parts of the impedance.
//! The phase tensor is unaffected by galvanic distortion, so its invariants
//! (phimin, phimax, skew) describe the regional structure and its azimuth
//! gives the strike.

use ndarray::{s, Array1, Array2, Array3, ArrayView2};

use super::z::Z;
use crate::config::{EllipseColorBy, EllipseOptions};
use crate::constants::{DOT_ELLIPSE_SCALE, PHI_PHYSICAL_MAX};
use crate::frequency::Frequency;
use crate::math::conversions::radian_2_degree;
use crate::math::linalg::{invert_2x2, left_divide_2x2};

/// Phase tensor series `[nfreq, 2, 2]`
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseTensor {
    frequency: Frequency,
    pt: Array3<f64>,
    pt_error: Array3<f64>,
}

/// Ellipse geometry in map units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EllipseGeometry {
    pub width: f64,
    pub height: f64,
    /// Rotation of the ellipse in degrees
    pub angle: f64,
    /// Value of the property chosen by [`EllipseOptions::colorby`]
    pub color_value: f64,
}

impl PhaseTensor {
    /// Compute the phase tensor and its error from an impedance series
    ///
    /// Frequencies where Re Z is singular give NaN.
    pub fn from_z(z: &Z) -> Self {
        let n = z.n_frequencies();
        let mut pt = Array3::from_elem((n, 2, 2), f64::NAN);
        let mut pt_error = Array3::zeros((n, 2, 2));
        let has_error = z.has_tf_error();

        for f in 0..n {
            let zf = z.z().slice(s![f, .., ..]);
            let x = zf.mapv(|v| v.re);
            let y = zf.mapv(|v| v.im);
            let (Some(phi), Some(x_inv)) = (
                left_divide_2x2(x.view(), y.view()),
                invert_2x2(x.view()),
            ) else {
                pt_error.slice_mut(s![f, .., ..]).fill(f64::NAN);
                continue;
            };

            if has_error {
                let sigma = z.z_error().slice(s![f, .., ..]);
                pt_error
                    .slice_mut(s![f, .., ..])
                    .assign(&propagate_error(phi.view(), x_inv.view(), sigma));
            }
            pt.slice_mut(s![f, .., ..]).assign(&phi);
        }

        Self {
            frequency: z.frequency_axis().clone(),
            pt,
            pt_error,
        }
    }

    pub fn frequency(&self) -> &[f64] {
        self.frequency.f()
    }

    pub fn period(&self) -> &[f64] {
        self.frequency.period()
    }

    pub fn n_frequencies(&self) -> usize {
        self.frequency.npoints()
    }

    pub fn pt(&self) -> &Array3<f64> {
        &self.pt
    }

    pub fn pt_error(&self) -> &Array3<f64> {
        &self.pt_error
    }

    /// Π₁ = ½√((Φ₁₁−Φ₂₂)² + (Φ₁₂+Φ₂₁)²)
    fn pi1(&self) -> Array1<f64> {
        self.map_tensor(|p| 0.5 * (p[0][0] - p[1][1]).hypot(p[0][1] + p[1][0]))
    }

    /// Π₂ = ½√((Φ₁₁+Φ₂₂)² + (Φ₁₂−Φ₂₁)²)
    fn pi2(&self) -> Array1<f64> {
        self.map_tensor(|p| 0.5 * (p[0][0] + p[1][1]).hypot(p[0][1] - p[1][0]))
    }

    /// Minimum phase in degrees
    pub fn phimin(&self) -> Array1<f64> {
        let pi1 = self.pi1();
        let pi2 = self.pi2();
        (&pi2 - &pi1).mapv(|v| radian_2_degree(v.atan()))
    }

    /// Maximum phase in degrees
    pub fn phimax(&self) -> Array1<f64> {
        let pi1 = self.pi1();
        let pi2 = self.pi2();
        (&pi2 + &pi1).mapv(|v| radian_2_degree(v.atan()))
    }

    /// Angle of the symmetric part in degrees
    pub fn alpha(&self) -> Array1<f64> {
        self.map_tensor(|p| {
            0.5 * radian_2_degree((p[0][1] + p[1][0]).atan2(p[0][0] - p[1][1]))
        })
    }

    /// Skew angle in degrees
    pub fn beta(&self) -> Array1<f64> {
        self.map_tensor(|p| {
            0.5 * radian_2_degree((p[0][1] - p[1][0]).atan2(p[0][0] + p[1][1]))
        })
    }

    pub fn skew(&self) -> Array1<f64> {
        self.beta()
    }

    /// Strike of the major axis in degrees: alpha − beta
    pub fn azimuth(&self) -> Array1<f64> {
        &self.alpha() - &self.beta()
    }

    /// (phimax − phimin) / (phimax + phimin)
    pub fn ellipticity(&self) -> Array1<f64> {
        let min = self.phimin();
        let max = self.phimax();
        (&max - &min) / (&max + &min)
    }

    pub fn trace(&self) -> Array1<f64> {
        self.map_tensor(|p| p[0][0] + p[1][1])
    }

    pub fn det(&self) -> Array1<f64> {
        self.map_tensor(|p| p[0][0] * p[1][1] - p[0][1] * p[1][0])
    }

    /// Values of the property used to colour ellipses
    pub fn color_values(&self, colorby: EllipseColorBy) -> Array1<f64> {
        match colorby {
            EllipseColorBy::Phimin => self.phimin(),
            EllipseColorBy::Phimax => self.phimax(),
            EllipseColorBy::Skew => self.skew(),
            EllipseColorBy::Ellipticity => self.ellipticity(),
            EllipseColorBy::Azimuth => self.azimuth(),
        }
    }

    /// Ellipse for frequency `index`, None when out of range
    ///
    /// NaN invariants count as 0. Unphysical ellipses (phimin or phimax of
    /// 0 or above 100 degrees) shrink to a dot.
    pub fn ellipse(&self, index: usize, options: &EllipseOptions) -> Option<EllipseGeometry> {
        if index >= self.n_frequencies() {
            return None;
        }
        let clean = |v: f64| if v.is_nan() { 0.0 } else { v };
        let phimin = clean(self.phimin()[index]);
        let phimax = clean(self.phimax()[index]);
        let azimuth = clean(self.azimuth()[index]);
        let color_value = clean(self.color_values(options.colorby)[index]);

        let degenerate = |v: f64| v == 0.0 || v > PHI_PHYSICAL_MAX;
        let (width, height) = if degenerate(phimin) || degenerate(phimax) {
            let dot = options.size * DOT_ELLIPSE_SCALE;
            (dot, dot)
        } else {
            (options.size, options.size * phimin / phimax)
        };

        Some(EllipseGeometry {
            width,
            height,
            angle: 90.0 - azimuth,
            color_value,
        })
    }

    fn map_tensor<F>(&self, f: F) -> Array1<f64>
    where
        F: Fn([[f64; 2]; 2]) -> f64,
    {
        Array1::from_shape_fn(self.n_frequencies(), |k| {
            let p = &self.pt;
            f([
                [p[[k, 0, 0]], p[[k, 0, 1]]],
                [p[[k, 1, 0]], p[[k, 1, 1]]],
            ])
        })
    }
}

/// First-order propagation of the impedance error into Φ
///
/// The same σ applies to the real and imaginary part of each element:
/// σ²(Φᵢⱼ) = Σₖₗ σ²ₖₗ (X⁻¹)ᵢₖ² (Φₗⱼ² + δₗⱼ)
fn propagate_error(
    phi: ArrayView2<f64>,
    x_inv: ArrayView2<f64>,
    sigma: ArrayView2<f64>,
) -> Array2<f64> {
    Array2::from_shape_fn((2, 2), |(i, j)| {
        let mut var = 0.0;
        for k in 0..2 {
            for l in 0..2 {
                let delta = if l == j { 1.0 } else { 0.0 };
                var += sigma[[k, l]].powi(2) * x_inv[[i, k]].powi(2) * (phi[[l, j]].powi(2) + delta);
            }
        }
        var.sqrt()
    })
}
