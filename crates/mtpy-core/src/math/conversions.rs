//! Unit conversion functions
//!
//! Conversions between impedance and apparent resistivity/phase, plus
//! angle helpers.

use num_complex::Complex64;
use std::f64::consts::PI;

use crate::constants::RHO_FACTOR;

/// Convert complex number to phase in degrees
pub fn complex_2_degree(z: Complex64) -> f64 {
    z.arg() * 180.0 / PI
}

/// Convert radians to degrees
pub fn radian_2_degree(rad: f64) -> f64 {
    rad * 180.0 / PI
}

/// Convert degrees to radians
pub fn degree_2_radian(deg: f64) -> f64 {
    deg * PI / 180.0
}

/// Apparent resistivity (Ohm m) of an impedance element in mV/km/nT
///
/// rho = 0.2 * T * |Z|^2
pub fn z_2_resistivity(z: Complex64, period: f64) -> f64 {
    RHO_FACTOR * period * z.norm_sqr()
}

/// Errors of apparent resistivity and phase (degrees) from an impedance error
///
/// Returns NaN for both when |Z| is zero.
pub fn z_error_2_resistivity_phase_error(z: Complex64, z_err: f64, period: f64) -> (f64, f64) {
    let amp = z.norm();
    if amp == 0.0 {
        return (f64::NAN, f64::NAN);
    }
    let res_err = 2.0 * RHO_FACTOR * period * amp * z_err;
    let phase_err = radian_2_degree((z_err / amp).atan());
    (res_err, phase_err)
}

/// Impedance element from apparent resistivity (Ohm m) and phase (degrees)
pub fn resistivity_phase_2_z(resistivity: f64, phase_deg: f64, period: f64) -> Complex64 {
    let amp = (resistivity / (RHO_FACTOR * period)).sqrt();
    Complex64::from_polar(amp, degree_2_radian(phase_deg))
}
