//! Electrode actuator implementations

pub mod pins;
pub mod pwm;

pub use pins::PinElectrodes;
pub use pwm::PwmCounter;
