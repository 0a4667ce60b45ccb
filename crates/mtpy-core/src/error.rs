//! Error types
//!
//! `TfError` covers validation of transfer-function data; `ConfigError`
//! covers loading of `MtConfig`.

use thiserror::Error;

/// Transfer-function validation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TfError {
    #[error("Cannot reshape array of {size} elements into (n, {rows}, {cols})")]
    Shape {
        size: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Length mismatch for {name}: expected {expected}, got {actual}")]
    LengthMismatch {
        name: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid {name} at index {index}: {value} (must be positive and finite)")]
    InvalidAxis {
        name: &'static str,
        index: usize,
        value: f64,
    },

    #[error("Frequency and period are not reciprocal at index {0}")]
    NotReciprocal(usize),

    #[error("Invalid rotation angle: {0}")]
    InvalidAngle(f64),

    #[error("Operation requires a {expected_rows}x{expected_cols} tensor, got {rows}x{cols}")]
    UnsupportedShape {
        expected_rows: usize,
        expected_cols: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Interpolation target {value} outside source range [{min}, {max}]")]
    OutOfBounds { value: f64, min: f64, max: f64 },

    #[error("Cannot interpolate from an empty frequency axis")]
    EmptyAxis,
}

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}
