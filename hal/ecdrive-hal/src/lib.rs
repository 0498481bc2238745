//! ecdrive Hardware Abstraction Layer
//!
//! This crate defines the pin-level traits an electrochromic display needs
//! from a chip HAL. Board crates implement them once; the drivers in
//! `ecdrive-drivers` and the engines in `ecdrive-core` are written against
//! these traits only.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (digit rendering, UI)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  ecdrive-core (execute / refresh)       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  ecdrive-drivers (PinElectrodes, ...)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  ecdrive-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::FlexPin`] - Work-electrode pin (digital out / analog in / high-Z)
//! - [`analog::AnalogOutput`] - Counter electrode DAC or filtered PWM output
//! - [`analog::AdcChannel`] - Single-ended analog input channel

#![no_std]
#![deny(unsafe_code)]

pub mod analog;
pub mod gpio;

// Re-export key traits at crate root for convenience
pub use analog::{AdcChannel, AnalogOutput};
pub use gpio::{FlexPin, PinMode};
