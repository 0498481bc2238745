//! Execution engine
//!
//! Applies staged targets in two bulk phases. The bleach phase always runs
//! to the end of its hold before the color phase touches a pin.

use embedded_hal::delay::DelayNs;

use super::{Cancelled, EcDisplay, Outcome};
use crate::state::{PhaseEvent, SegmentMask, SegmentState};
use crate::traits::ElectrodeActuator;

impl<A, D> EcDisplay<'_, A, D>
where
    A: ElectrodeActuator,
    D: DelayNs,
{
    /// Commit staged targets, then verify them with a refresh pass
    ///
    /// Segments whose target equals their current state are skipped, so
    /// re-executing an unchanged stage toggles no segment pin. On a stop
    /// request the call returns at the next checkpoint; segments not yet
    /// held for their full dwell keep their previous state.
    pub fn execute_display(&mut self) -> Outcome {
        self.touched = false;
        match self.run_execute() {
            Ok(()) => Outcome::Applied(self.refresh_display()),
            Err(Cancelled) => {
                self.park();
                Outcome::Cancelled
            }
        }
    }

    fn run_execute(&mut self) -> Result<(), Cancelled> {
        self.checkpoint()?;
        self.advance(PhaseEvent::StartExecute);

        #[cfg(feature = "defmt")]
        defmt::info!("Bleaching display @ {} mV", self.config.bleaching_mv);
        self.run_phase(SegmentState::Bleached)?;

        #[cfg(feature = "defmt")]
        defmt::info!("Coloring display @ {} mV", self.config.coloring_mv);
        self.run_phase(SegmentState::Colored)?;

        self.disable_counter_electrode();
        Ok(())
    }

    /// One bulk phase: counter electrode, assert targets, hold, release
    fn run_phase(&mut self, target: SegmentState) -> Result<(), Cancelled> {
        let (counter_mv, dwell_ms) = match target {
            SegmentState::Colored => (
                self.supply_mv.saturating_sub(self.config.coloring_mv),
                self.config.coloring_time_ms,
            ),
            _ => (self.config.bleaching_mv, self.config.bleaching_time_ms),
        };

        self.set_counter_electrode(counter_mv);

        let mut asserted = SegmentMask::EMPTY;
        for index in 0..self.segments.len() {
            self.checkpoint()?;
            if self.segments.is_pending(index, target) {
                self.drive_segment(index, target);
                asserted.insert(index);

                #[cfg(feature = "defmt")]
                defmt::debug!("Segment {} set to {}", index, target);
            }
        }

        if !asserted.is_empty() {
            self.hold(dwell_ms)?;
            // Full dwell applied
            self.segments.commit(asserted, target);
            self.checkpoint()?;
        }

        self.release_all_segments();
        self.advance(PhaseEvent::PhaseHeld);
        Ok(())
    }
}
