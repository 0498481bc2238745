//! Hardware abstraction traits
//!
//! These traits define the interface between the engines and the
//! board-specific electrode wiring.

pub mod electrode;

pub use electrode::ElectrodeActuator;
