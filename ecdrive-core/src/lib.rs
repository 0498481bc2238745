//! Board-agnostic core logic for electrochromic display driving
//!
//! This crate contains everything that does not depend on a specific board:
//!
//! - Display configuration and refresh/startup policies
//! - Voltage-to-ADC calibration of the refresh limits
//! - Segment state store (current, target, refresh flag)
//! - Engine phase machine and cooperative stop flag
//! - Execution engine (bleach phase, then color phase)
//! - Refresh engine (measure, bleach correction, color correction)
//! - The electrode actuator trait the engines drive

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod engine;
pub mod state;
pub mod traits;

pub use config::{DisplayConfig, RefreshLimits, RefreshPolicy, RetryBudget, StartupPolicy};
pub use engine::{
    CorrectionReport, DriverError, EcDisplay, Outcome, RefreshOutcome, SegmentMask, StopFlag,
};
pub use state::{EnginePhase, SegmentState};
pub use traits::ElectrodeActuator;
