//! Engine phase events
//!
//! Events move the [`EnginePhase`](super::EnginePhase) machine between the
//! steps of an execute or refresh call.

/// Events raised by the execution and refresh engines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PhaseEvent {
    /// `execute_display()` called
    StartExecute,
    /// A bulk phase finished its hold and released its pins
    PhaseHeld,
    /// `refresh_display()` called, or execution handing over to refresh
    StartRefresh,
    /// Measurement pass complete
    Measured {
        /// At least one bleached segment drifted
        bleach: bool,
        /// At least one colored segment faded
        color: bool,
    },
    /// Bleach correction loop finished
    BleachCorrected {
        /// Color correction still to run
        color_pending: bool,
    },
    /// Color correction loop finished
    ColorCorrected,
    /// Stop flag observed at a checkpoint
    Stopped,
}
