//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in ecdrive-core on top of the pin traits in ecdrive-hal:
//!
//! - Electrode actuator over a counter electrode output and segment pins
//! - Supply voltage monitor (resistor divider into an ADC channel)

#![no_std]
#![deny(unsafe_code)]

pub mod electrode;
pub mod sensor;
