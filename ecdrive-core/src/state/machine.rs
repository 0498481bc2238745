//! Engine phase machine
//!
//! Every cancellation checkpoint in the engines falls inside one of these
//! phases, so the current phase tells a caller exactly where a stopped
//! sequence was cut short.

use super::events::PhaseEvent;

/// Engine phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EnginePhase {
    /// No call in flight, or the last call was stopped
    #[default]
    Idle,
    /// Counter electrode at bleaching voltage, bleach targets asserted
    BleachPhase,
    /// Counter electrode at the coloring level, color targets asserted
    ColorPhase,
    /// Counter electrode at mid-supply, sampling segments
    Measuring,
    /// Corrective bleach pulses with re-measurement
    BleachCorrecting,
    /// Corrective color pulses with re-measurement
    ColorCorrecting,
    /// Last call ran to completion
    Done,
}

impl EnginePhase {
    /// Process an event and return the next phase
    ///
    /// Events that do not apply to the current phase leave it unchanged.
    pub fn transition(self, event: PhaseEvent) -> Self {
        use EnginePhase::*;
        use PhaseEvent::*;

        match (self, event) {
            // Any checkpoint may stop the sequence
            (_, Stopped) => Idle,

            // Entry points
            (Idle | Done, StartExecute) => BleachPhase,
            (Idle | Done, StartRefresh) => Measuring,

            // Execution
            (BleachPhase, PhaseHeld) => ColorPhase,
            (ColorPhase, PhaseHeld) => Measuring,

            // Refresh
            (Measuring, Measured { bleach: true, .. }) => BleachCorrecting,
            (Measuring, Measured { bleach: false, color: true }) => ColorCorrecting,
            (Measuring, Measured { bleach: false, color: false }) => Done,
            (BleachCorrecting, BleachCorrected { color_pending: true }) => ColorCorrecting,
            (BleachCorrecting, BleachCorrected { color_pending: false }) => Done,
            (ColorCorrecting, ColorCorrected) => Done,

            // Invalid transitions - stay in current phase
            (phase, _) => phase,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execute_path() {
        let phase = EnginePhase::Idle.transition(PhaseEvent::StartExecute);
        assert_eq!(phase, EnginePhase::BleachPhase);

        let phase = phase.transition(PhaseEvent::PhaseHeld);
        assert_eq!(phase, EnginePhase::ColorPhase);

        let phase = phase.transition(PhaseEvent::PhaseHeld);
        assert_eq!(phase, EnginePhase::Measuring);

        let phase = phase.transition(PhaseEvent::Measured {
            bleach: false,
            color: false,
        });
        assert_eq!(phase, EnginePhase::Done);
    }

    #[test]
    fn test_refresh_corrections() {
        let phase = EnginePhase::Done.transition(PhaseEvent::StartRefresh);
        assert_eq!(phase, EnginePhase::Measuring);

        let phase = phase.transition(PhaseEvent::Measured {
            bleach: true,
            color: true,
        });
        assert_eq!(phase, EnginePhase::BleachCorrecting);

        let phase = phase.transition(PhaseEvent::BleachCorrected {
            color_pending: true,
        });
        assert_eq!(phase, EnginePhase::ColorCorrecting);

        let phase = phase.transition(PhaseEvent::ColorCorrected);
        assert_eq!(phase, EnginePhase::Done);
    }

    #[test]
    fn test_color_only_correction() {
        let phase = EnginePhase::Measuring.transition(PhaseEvent::Measured {
            bleach: false,
            color: true,
        });
        assert_eq!(phase, EnginePhase::ColorCorrecting);
    }

    #[test]
    fn test_stop_from_any_phase() {
        for phase in [
            EnginePhase::BleachPhase,
            EnginePhase::ColorPhase,
            EnginePhase::Measuring,
            EnginePhase::BleachCorrecting,
            EnginePhase::ColorCorrecting,
        ] {
            assert_eq!(phase.transition(PhaseEvent::Stopped), EnginePhase::Idle);
        }
    }

    #[test]
    fn test_invalid_transition() {
        // Can't jump to correction without measuring
        let phase = EnginePhase::BleachPhase.transition(PhaseEvent::ColorCorrected);
        assert_eq!(phase, EnginePhase::BleachPhase);

        // A new call can't start while one is in flight
        let phase = EnginePhase::ColorPhase.transition(PhaseEvent::StartRefresh);
        assert_eq!(phase, EnginePhase::ColorPhase);
    }
}
