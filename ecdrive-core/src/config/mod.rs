//! Configuration types
//!
//! Panel drive parameters, refresh and startup policies, and the
//! calibration of refresh limits against the supply voltage.

pub mod calibration;
pub mod types;

pub use calibration::*;
pub use types::*;
