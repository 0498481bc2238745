//! Refresh engine
//!
//! Measures every segment at mid-supply, flags the ones that drifted, and
//! pulses them back with bounded retries: bleach correction first, then
//! color correction. Running out of attempts is not an error; the
//! unconverged segments stay flagged and are reported.

use embedded_hal::delay::DelayNs;

use super::{Cancelled, CorrectionReport, EcDisplay, RefreshOutcome};
use crate::config::RetryBudget;
use crate::state::{PhaseEvent, SegmentMask, SegmentState};
use crate::traits::ElectrodeActuator;

impl<A, D> EcDisplay<'_, A, D>
where
    A: ElectrodeActuator,
    D: DelayNs,
{
    /// Verify every segment and correct the ones that drifted
    ///
    /// Callable on its own, e.g. after waking from low power. Returns
    /// [`RefreshOutcome::Clean`] on a healthy panel without pulsing anything.
    pub fn refresh_display(&mut self) -> RefreshOutcome {
        self.touched = false;
        match self.run_refresh() {
            Ok(outcome) => outcome,
            Err(Cancelled) => {
                self.park();
                RefreshOutcome::Cancelled
            }
        }
    }

    fn run_refresh(&mut self) -> Result<RefreshOutcome, Cancelled> {
        self.checkpoint()?;
        self.advance(PhaseEvent::StartRefresh);

        let (bleach, color) = self.measure()?;
        self.checkpoint()?;
        self.advance(PhaseEvent::Measured {
            bleach: !bleach.is_empty(),
            color: !color.is_empty(),
        });

        if bleach.is_empty() && color.is_empty() {
            #[cfg(feature = "defmt")]
            defmt::info!("No refresh needed");
            self.disable_counter_electrode();
            return Ok(RefreshOutcome::Clean);
        }

        let mut report = CorrectionReport::default();
        let max = self.policy.max_retries;

        if !bleach.is_empty() {
            let (attempts, left) = self.correct(SegmentState::Bleached, max)?;
            report.bleach_attempts = attempts;
            report.bleach_unconverged = left;
            self.advance(PhaseEvent::BleachCorrected {
                color_pending: !color.is_empty(),
            });
        }

        if !color.is_empty() {
            let budget = match self.policy.budget {
                RetryBudget::PerDirection => max,
                RetryBudget::Shared => max.saturating_sub(report.bleach_attempts),
            };
            let (attempts, left) = self.correct(SegmentState::Colored, budget)?;
            report.color_attempts = attempts;
            report.color_unconverged = left;
            self.advance(PhaseEvent::ColorCorrected);
        }

        self.disable_counter_electrode();
        Ok(RefreshOutcome::Corrected(report))
    }

    /// Sample every segment against the counter electrode at mid-supply
    ///
    /// Returns the bleached and colored segments that need correction.
    /// Every segment's refresh flag is rewritten from this pass.
    fn measure(&mut self) -> Result<(SegmentMask, SegmentMask), Cancelled> {
        self.set_counter_electrode(self.supply_mv / 2);
        self.release_all_segments();

        let mut bleach = SegmentMask::EMPTY;
        let mut color = SegmentMask::EMPTY;

        for index in 0..self.segments.len() {
            self.checkpoint()?;
            let reading = self.actuator.read_segment(index);
            let state = self
                .segments
                .get(index)
                .map(|seg| seg.current)
                .unwrap_or_default();

            let flagged = match state {
                SegmentState::Colored => self.limits.color_faded(reading),
                SegmentState::Bleached => self.limits.bleach_drifted(reading),
                SegmentState::Undefined => false,
            };
            self.segments.set_needs_refresh(index, flagged);

            #[cfg(feature = "defmt")]
            defmt::trace!("Segment {} reads {} LSB ({}), flagged: {}", index, reading, state, flagged);

            if flagged {
                match state {
                    SegmentState::Colored => color.insert(index),
                    _ => bleach.insert(index),
                }
            }
        }

        Ok((bleach, color))
    }

    /// Corrective pulse loop for one direction
    ///
    /// Returns the attempts used and the segments still flagged.
    fn correct(
        &mut self,
        state: SegmentState,
        budget: u8,
    ) -> Result<(u8, SegmentMask), Cancelled> {
        if budget == 0 {
            #[cfg(feature = "defmt")]
            defmt::warn!("No refresh attempts left for {}", state);
            return Ok((0, self.segments.flagged(state)));
        }

        let (counter_mv, pulse_ms) = match state {
            SegmentState::Colored => (
                self.supply_mv
                    .saturating_sub(self.config.refresh_coloring_mv),
                self.config.refresh_color_pulse_ms,
            ),
            _ => (
                self.config.refresh_bleaching_mv,
                self.config.refresh_bleach_pulse_ms,
            ),
        };

        #[cfg(feature = "defmt")]
        defmt::info!("Refresh {}: counter @ {} mV, pulse {} ms", state, counter_mv, pulse_ms);

        self.set_counter_electrode(counter_mv);

        let mut attempts = 0u8;
        loop {
            self.checkpoint()?;
            let flagged = self.segments.flagged(state);
            if flagged.is_empty() {
                break;
            }
            if attempts >= budget {
                #[cfg(feature = "defmt")]
                defmt::warn!(
                    "Refresh {} gave up after {} attempts, segments {:#x} out of range",
                    state,
                    attempts,
                    flagged.bits()
                );
                break;
            }

            for index in flagged.iter() {
                self.checkpoint()?;
                self.drive_segment(index, state);
            }
            self.hold(pulse_ms)?;
            self.release_all_segments();
            attempts += 1;

            // Re-measure the pulsed segments against the corrected-level limit
            self.checkpoint()?;
            for index in flagged.iter() {
                self.checkpoint()?;
                let reading = self.actuator.read_segment(index);
                let short = match state {
                    SegmentState::Colored => self.limits.color_short(reading),
                    _ => self.limits.bleach_short(reading),
                };
                self.segments.set_needs_refresh(index, short);

                #[cfg(feature = "defmt")]
                defmt::trace!("Segment {} reads {} LSB, still short: {}", index, reading, short);
            }

            #[cfg(feature = "defmt")]
            defmt::debug!("{} retry {}", state, attempts);

            if attempts < budget && !self.segments.flagged(state).is_empty() {
                self.hold(self.policy.retry_pause_ms)?;
            }
        }

        Ok((attempts, self.segments.flagged(state)))
    }
}
