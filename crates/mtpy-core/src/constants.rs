//! Numerical constants for MT transfer-function calculations
//!
//! Provides standardized tolerance values and physical factors
//! used throughout the library.

/// Tolerance for detecting near-zero values in division and singularity checks.
pub const NEAR_ZERO: f64 = 1e-15;

/// Relative tolerance when checking that a supplied frequency and period
/// are reciprocal.
pub const RECIPROCAL_TOL: f64 = 1e-9;

/// Apparent resistivity factor for impedance in mV/km/nT:
/// rho = 0.2 * T * |Z|^2.
pub const RHO_FACTOR: f64 = 0.2;

/// Phase tensor invariants above this (degrees) are not physical and are
/// drawn as a dot.
pub const PHI_PHYSICAL_MAX: f64 = 100.0;

/// Scale applied to the ellipse size for a degenerate (dot) ellipse.
pub const DOT_ELLIPSE_SCALE: f64 = 0.0000001;

/// Default number of frequencies for station averaging.
pub const DEFAULT_AVERAGE_NFREQ: usize = 48;
