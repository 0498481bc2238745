//! Display engine
//!
//! [`EcDisplay`] owns the electrode actuator and a blocking delay, and runs
//! the execution and refresh sequences against them:
//!
//! ```text
//! set_segment_state() ... ─▶ execute_display()
//!                              ├─ bleach phase  (counter @ bleaching, targets low, hold)
//!                              ├─ color phase   (counter @ supply - coloring, targets high, hold)
//!                              └─ refresh_display()
//!                                   ├─ measure            (counter @ supply / 2)
//!                                   ├─ bleach correction  (bounded retries)
//!                                   └─ color correction   (bounded retries)
//! ```
//!
//! Every step boundary is a checkpoint against the shared [`StopFlag`].
//! Calibrated limits live here and only here; they are recomputed whenever
//! the supply voltage or configuration changes.

mod cancel;
mod execute;
mod refresh;

#[cfg(test)]
pub(crate) mod sim;

pub use cancel::StopFlag;

use embedded_hal::delay::DelayNs;

#[cfg(feature = "defmt")]
use crate::config::limit_to_mv;
use crate::config::{
    mv_to_level, AdcResolution, ConfigError, DisplayConfig, RefreshLimits, RefreshPolicy,
    StartupPolicy, COUNTER_SETTLE_MS,
};
pub use crate::state::SegmentMask;
use crate::state::{EnginePhase, PhaseEvent, Segment, SegmentState, SegmentStore};
use crate::traits::ElectrodeActuator;

/// Errors from driver setup and staging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriverError {
    /// Actuator reports zero segments
    NoSegments,
    /// Actuator reports more than `MAX_SEGMENTS` segments
    TooManySegments,
    /// Segment index outside `0..segment_count()`
    SegmentOutOfRange,
    /// `Undefined` is not a target a segment can be driven to
    UndefinedTarget,
    /// Configuration rejected
    Config(ConfigError),
}

impl From<ConfigError> for DriverError {
    fn from(e: ConfigError) -> Self {
        DriverError::Config(e)
    }
}

/// Corrective work done by a refresh pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CorrectionReport {
    /// Corrective bleach pulses applied
    pub bleach_attempts: u8,
    /// Corrective color pulses applied
    pub color_attempts: u8,
    /// Bleached segments still out of threshold when the budget ran out
    pub bleach_unconverged: SegmentMask,
    /// Colored segments still out of threshold when the budget ran out
    pub color_unconverged: SegmentMask,
}

impl CorrectionReport {
    /// Check if every flagged segment reached its threshold
    pub fn converged(&self) -> bool {
        self.bleach_unconverged.is_empty() && self.color_unconverged.is_empty()
    }
}

/// Result of a refresh pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RefreshOutcome {
    /// Every segment was within its limits; nothing was pulsed
    Clean,
    /// Corrective pulses were applied
    Corrected(CorrectionReport),
    /// Stop requested before the pass finished
    Cancelled,
}

/// Result of an execute call (or `begin()`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome {
    /// Both phases applied; carries the trailing refresh result
    Applied(RefreshOutcome),
    /// Stop requested during the bleach or color phase
    Cancelled,
}

/// Marker for a checkpoint that observed the stop flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Cancelled;

/// Electrochromic display driver
///
/// Generic over the electrode wiring (`A`) and a blocking delay (`D`). The
/// stop flag is borrowed so it can be raised from outside a running call.
pub struct EcDisplay<'s, A, D> {
    actuator: A,
    delay: D,
    stop: &'s StopFlag,
    config: DisplayConfig,
    policy: RefreshPolicy,
    startup: StartupPolicy,
    adc: AdcResolution,
    supply_mv: u16,
    limits: RefreshLimits,
    segments: SegmentStore,
    phase: EnginePhase,
    /// Hardware touched during the call in flight
    touched: bool,
}

impl<'s, A, D> EcDisplay<'s, A, D>
where
    A: ElectrodeActuator,
    D: DelayNs,
{
    /// Create a driver for every segment wired to `actuator`
    ///
    /// The configuration is validated against `supply_mv` and the refresh
    /// limits are calibrated before this returns. No pin is touched.
    pub fn new(
        actuator: A,
        delay: D,
        stop: &'s StopFlag,
        config: DisplayConfig,
        supply_mv: u16,
    ) -> Result<Self, DriverError> {
        Self::with_resolution(actuator, delay, stop, config, supply_mv, AdcResolution::default())
    }

    /// Create a driver for a converter resolution other than the default 12 bits
    pub fn with_resolution(
        actuator: A,
        delay: D,
        stop: &'s StopFlag,
        config: DisplayConfig,
        supply_mv: u16,
        adc: AdcResolution,
    ) -> Result<Self, DriverError> {
        let segments =
            SegmentStore::new(actuator.segment_count()).ok_or(DriverError::TooManySegments)?;
        if segments.is_empty() {
            return Err(DriverError::NoSegments);
        }
        config.validate(supply_mv)?;

        let mut display = Self {
            actuator,
            delay,
            stop,
            config,
            policy: RefreshPolicy::default(),
            startup: StartupPolicy::default(),
            adc,
            supply_mv,
            limits: RefreshLimits::default(),
            segments,
            phase: EnginePhase::Idle,
            touched: false,
        };
        display.recalibrate();
        Ok(display)
    }

    /// Condition the panel into a known baseline
    ///
    /// With the default [`StartupPolicy::ColorThenBleach`] every segment is
    /// colored and then bleached. Intended as the first call after
    /// construction.
    pub fn begin(&mut self) -> Outcome {
        #[cfg(feature = "defmt")]
        defmt::info!("ECD begin: {} segments, {}", self.segments.len(), self.startup);

        if self.startup == StartupPolicy::ColorThenBleach {
            self.segments.stage_all(SegmentState::Colored);
            if self.execute_display() == Outcome::Cancelled {
                return Outcome::Cancelled;
            }
        }

        self.segments.stage_all(SegmentState::Bleached);
        self.execute_display()
    }

    /// Stage one segment's target state
    ///
    /// No hardware effect until [`execute_display`](Self::execute_display).
    pub fn set_segment_state(
        &mut self,
        index: usize,
        target: SegmentState,
    ) -> Result<(), DriverError> {
        if target == SegmentState::Undefined {
            return Err(DriverError::UndefinedTarget);
        }
        if !self.segments.stage(index, target) {
            return Err(DriverError::SegmentOutOfRange);
        }
        Ok(())
    }

    /// Stage every segment to bleached
    pub fn set_all_segments_bleach(&mut self) {
        self.segments.stage_all(SegmentState::Bleached);
    }

    /// Update the supply voltage and recalibrate the refresh limits
    ///
    /// Must be called whenever the physical supply changes. A supply the
    /// configuration does not fit inside is rejected and the previous
    /// supply and limits stay in effect.
    pub fn update_supply_voltage(&mut self, supply_mv: u16) -> Result<(), ConfigError> {
        self.config.validate(supply_mv)?;
        self.supply_mv = supply_mv;
        self.recalibrate();
        Ok(())
    }

    /// Replace the drive configuration and recalibrate
    pub fn set_config(&mut self, config: DisplayConfig) -> Result<(), ConfigError> {
        config.validate(self.supply_mv)?;
        self.config = config;
        self.recalibrate();
        Ok(())
    }

    /// Replace the refresh retry policy
    pub fn set_refresh_policy(&mut self, policy: RefreshPolicy) {
        self.policy = policy;
    }

    /// Replace the startup conditioning policy
    pub fn set_startup_policy(&mut self, startup: StartupPolicy) {
        self.startup = startup;
    }

    /// Ask a running execute or refresh to stop at its next checkpoint
    pub fn request_stop(&self) {
        self.stop.request();
    }

    /// Clear a stop request so the display can be driven again
    pub fn clear_stop(&self) {
        self.stop.clear();
    }

    /// Check if a stop is pending
    pub fn is_stop_requested(&self) -> bool {
        self.stop.is_requested()
    }

    /// Number of segments
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// State last fully applied to a segment
    pub fn segment_state(&self, index: usize) -> Option<SegmentState> {
        self.segments.get(index).map(|seg| seg.current)
    }

    /// Staged target of a segment
    pub fn target_state(&self, index: usize) -> Option<SegmentState> {
        self.segments.get(index).map(|seg| seg.next)
    }

    /// Check if a segment failed its last threshold check
    pub fn needs_refresh(&self, index: usize) -> Option<bool> {
        self.segments.get(index).map(|seg| seg.needs_refresh)
    }

    /// Full bookkeeping for a segment
    pub fn segment(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    /// Current calibrated limits
    pub fn limits(&self) -> &RefreshLimits {
        &self.limits
    }

    /// Current supply voltage (mV)
    pub fn supply_mv(&self) -> u16 {
        self.supply_mv
    }

    /// Current drive configuration
    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    /// Current refresh policy
    pub fn refresh_policy(&self) -> &RefreshPolicy {
        &self.policy
    }

    /// Engine phase (where the last call ended, or `Idle`)
    pub fn phase(&self) -> EnginePhase {
        self.phase
    }

    /// Give back the actuator and delay
    pub fn release(self) -> (A, D) {
        (self.actuator, self.delay)
    }

    fn recalibrate(&mut self) {
        self.limits = RefreshLimits::recalibrate(&self.config, self.supply_mv, self.adc);

        #[cfg(feature = "defmt")]
        {
            let mv = |limit_x100| limit_to_mv(limit_x100, self.supply_mv, self.adc);
            defmt::debug!(
                "Refresh limits @ {} mV: color H {} L {}, bleach H {} L {} (mV)",
                self.supply_mv,
                mv(self.limits.color_high_x100),
                mv(self.limits.color_low_x100),
                mv(self.limits.bleach_high_x100),
                mv(self.limits.bleach_low_x100)
            );
        }
    }

    fn advance(&mut self, event: PhaseEvent) {
        self.phase = self.phase.transition(event);
    }

    /// Stop-flag checkpoint
    fn checkpoint(&mut self) -> Result<(), Cancelled> {
        if self.stop.is_requested() {
            #[cfg(feature = "defmt")]
            defmt::info!("Stop requested during {}", self.phase);
            return Err(Cancelled);
        }
        Ok(())
    }

    /// Leave the hardware at rest after a stopped call
    fn park(&mut self) {
        if self.touched {
            self.actuator.release_all();
            self.actuator.disable_counter();
        }
        self.advance(PhaseEvent::Stopped);
    }

    /// Drive the counter electrode to `mv` and wait for it to settle
    fn set_counter_electrode(&mut self, mv: u16) {
        let level = mv_to_level(mv, self.supply_mv, self.adc);
        #[cfg(feature = "defmt")]
        defmt::debug!("Counter electrode @ {} mV [{}]", mv, level);

        self.touched = true;
        self.actuator.set_counter_level(level);
        self.delay.delay_ms(COUNTER_SETTLE_MS);
    }

    fn disable_counter_electrode(&mut self) {
        self.actuator.disable_counter();
        #[cfg(feature = "defmt")]
        defmt::debug!("Counter electrode disabled");
    }

    fn drive_segment(&mut self, index: usize, state: SegmentState) {
        if let Some(high) = state.drive_level() {
            self.touched = true;
            self.actuator.drive_segment(index, high);
        }
    }

    fn release_all_segments(&mut self) {
        self.actuator.release_all();
    }

    /// Blocking hold with a checkpoint in front of it
    fn hold(&mut self, ms: u32) -> Result<(), Cancelled> {
        self.checkpoint()?;
        #[cfg(feature = "defmt")]
        defmt::trace!("Hold {} ms", ms);
        self.delay.delay_ms(ms);
        Ok(())
    }
}
