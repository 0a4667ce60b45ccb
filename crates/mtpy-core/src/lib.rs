//! mtpy-core: Core magnetotelluric transfer-function library
//!
//! Rust implementation of the numeric core of MTpy: transfer-function
//! series with errors, rotation, interpolation and the derived impedance,
//! tipper and phase tensor quantities.
//!
//! ## Modules
//!
//! - `frequency` - Frequency/period axis representation
//! - `math` - Mathematical functions (conversions, rotation, interpolation)
//! - `transfer_function` - Transfer-function series, impedance, tipper, phase tensor
//! - `config` - TOML configuration
//! - `error` - Error types

pub mod config;
pub mod constants;
pub mod error;
pub mod frequency;
pub mod math;
pub mod transfer_function;

pub use config::MtConfig;
pub use error::{ConfigError, TfError};
pub use frequency::Frequency;
pub use transfer_function::{PhaseTensor, TfBase, TfInputs, Tipper, Z};
