//! Sensor implementations

pub mod supply;

pub use supply::{SupplyError, SupplyMonitor};
