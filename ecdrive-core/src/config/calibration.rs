//! Refresh limit calibration
//!
//! Converts the configured limit offsets into ADC thresholds relative to the
//! current supply voltage. The ADC reads a work electrode against the supply
//! rail, so every threshold moves when the supply does.

use super::types::{AdcResolution, DisplayConfig};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Refresh thresholds in ADC units (value × 100)
///
/// Kept in hundredths of an LSB so readings compare against the exact
/// quotient instead of a truncated one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RefreshLimits {
    /// A corrected colored segment must read at least this
    pub color_high_x100: i32,
    /// A colored segment reading below this has faded
    pub color_low_x100: i32,
    /// A bleached segment reading above this has drifted
    pub bleach_high_x100: i32,
    /// A corrected bleached segment must read at most this
    pub bleach_low_x100: i32,
}

/// `mv * adc_max * 100 / denom_mv`, in 64-bit to keep the product exact
///
/// Saturates at the `i32` range for offsets [`DisplayConfig::validate`] would reject.
fn scale_x100(mv: i64, adc_max: u16, denom_mv: i64) -> i32 {
    let scaled = mv * adc_max as i64 * 100 / denom_mv;
    scaled.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

impl RefreshLimits {
    /// Compute all four thresholds for `supply_mv`
    ///
    /// ```text
    /// color_high  = ((supply - refresh_coloring) + color_limit_high) * ADC_MAX / supply
    /// color_low   = (supply/2 + color_limit_low)                     * ADC_MAX / supply
    /// bleach_high = (supply/2 - bleach_limit_high)                   * ADC_MAX / supply
    /// bleach_low  = (refresh_bleaching - bleach_limit_low)           * ADC_MAX / supply
    /// ```
    ///
    /// `supply_mv` must be non-zero; [`DisplayConfig::validate`] rejects a
    /// zero supply before it reaches here. A zero supply yields all-zero
    /// limits rather than a division fault.
    pub fn recalibrate(config: &DisplayConfig, supply_mv: u16, adc: AdcResolution) -> Self {
        if supply_mv == 0 {
            return Self::default();
        }

        let supply = supply_mv as i64;
        let max = adc.max();

        // Mid-supply terms are scaled by 2 so odd millivolt supplies stay exact
        Self {
            color_high_x100: scale_x100(
                supply - config.refresh_coloring_mv as i64 + config.color_limit_high_mv as i64,
                max,
                supply,
            ),
            color_low_x100: scale_x100(
                supply + 2 * config.color_limit_low_mv as i64,
                max,
                2 * supply,
            ),
            bleach_high_x100: scale_x100(
                supply - 2 * config.bleach_limit_high_mv as i64,
                max,
                2 * supply,
            ),
            bleach_low_x100: scale_x100(
                config.refresh_bleaching_mv as i64 - config.bleach_limit_low_mv as i64,
                max,
                supply,
            ),
        }
    }

    /// Colored segment has faded and needs a color pulse
    pub fn color_faded(&self, reading: u16) -> bool {
        (reading as i32) * 100 < self.color_low_x100
    }

    /// Bleached segment has drifted and needs a bleach pulse
    pub fn bleach_drifted(&self, reading: u16) -> bool {
        (reading as i32) * 100 > self.bleach_high_x100
    }

    /// Colored segment is still short of the corrected level
    pub fn color_short(&self, reading: u16) -> bool {
        (reading as i32) * 100 < self.color_high_x100
    }

    /// Bleached segment is still above the corrected level
    pub fn bleach_short(&self, reading: u16) -> bool {
        (reading as i32) * 100 > self.bleach_low_x100
    }
}

/// Map an electrode voltage onto the converter range
///
/// Levels outside `0..=supply` clamp to the rails.
pub fn mv_to_level(mv: u16, supply_mv: u16, adc: AdcResolution) -> u16 {
    if supply_mv == 0 {
        return 0;
    }
    let level = mv as u32 * adc.max() as u32 / supply_mv as u32;
    level.min(adc.max() as u32) as u16
}

/// Map a converter level back to millivolts (for diagnostics)
pub fn level_to_mv(level: u16, supply_mv: u16, adc: AdcResolution) -> u16 {
    let mv = level as u32 * supply_mv as u32 / adc.max() as u32;
    mv.min(u16::MAX as u32) as u16
}

/// Millivolt equivalent of a `_x100` limit (for diagnostics)
///
/// Limits outside the converter range clamp to the rails.
pub fn limit_to_mv(limit_x100: i32, supply_mv: u16, adc: AdcResolution) -> u16 {
    let level = (limit_x100 / 100).clamp(0, adc.max() as i32) as u16;
    level_to_mv(level, supply_mv, adc)
}
