//! Configuration type definitions
//!
//! Electrochemical parameters for one panel. Voltages are carried in
//! millivolts and times in milliseconds. With the `serde` feature the record
//! can be stored in flash as postcard binary data.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Settle time after moving the counter electrode to a new level (ms)
pub const COUNTER_SETTLE_MS: u32 = 50;

/// Default corrective attempts per refresh direction
pub const MAX_REFRESH_RETRIES: u8 = 5;

/// Default pause between corrective attempts (ms)
pub const RETRY_PAUSE_MS: u32 = 500;

/// Default converter resolution shared by the ADC and the counter electrode DAC
pub const DEFAULT_ADC_BITS: u8 = 12;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Supply voltage is zero
    ZeroSupply,
    /// An electrode voltage exceeds the supply rail
    VoltageAboveSupply,
    /// A refresh limit offset is larger than the supply rail
    LimitAboveSupply,
    /// Converter resolution outside 1..=16 bits
    InvalidResolution,
    /// Serialization failed (buffer too small)
    Encode,
    /// Stored bytes are not a valid configuration
    Decode,
}

/// Panel drive parameters
///
/// Every field is required; there is no default panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisplayConfig {
    /// Counter electrode voltage during the bleach phase (mV)
    pub bleaching_mv: u16,
    /// Work-to-counter voltage during the color phase (mV)
    ///
    /// The counter electrode sits at `supply - coloring_mv`.
    pub coloring_mv: u16,
    /// Bleach phase dwell time (ms)
    pub bleaching_time_ms: u32,
    /// Color phase dwell time (ms)
    pub coloring_time_ms: u32,
    /// Counter electrode voltage for corrective bleach pulses (mV)
    pub refresh_bleaching_mv: u16,
    /// Work-to-counter voltage for corrective color pulses (mV)
    pub refresh_coloring_mv: u16,
    /// Corrective bleach pulse length (ms)
    pub refresh_bleach_pulse_ms: u32,
    /// Corrective color pulse length (ms)
    pub refresh_color_pulse_ms: u32,
    /// Offset above the refresh coloring level a corrected segment must reach (mV)
    pub color_limit_high_mv: i16,
    /// Offset above mid-supply below which a colored segment has faded (mV)
    pub color_limit_low_mv: i16,
    /// Offset below mid-supply above which a bleached segment has drifted (mV)
    pub bleach_limit_high_mv: i16,
    /// Offset below the refresh bleaching level a corrected segment must reach (mV)
    pub bleach_limit_low_mv: i16,
}

impl DisplayConfig {
    /// Check the configuration against a supply voltage
    ///
    /// Every electrode level must fit inside the supply rail, otherwise the
    /// counter electrode mapping would leave the converter range.
    /// Limit offsets are bounded by the supply too, which keeps every
    /// calibrated threshold inside two full scales.
    pub fn validate(&self, supply_mv: u16) -> Result<(), ConfigError> {
        if supply_mv == 0 {
            return Err(ConfigError::ZeroSupply);
        }

        let levels = [
            self.bleaching_mv,
            self.coloring_mv,
            self.refresh_bleaching_mv,
            self.refresh_coloring_mv,
        ];
        if levels.iter().any(|&mv| mv > supply_mv) {
            return Err(ConfigError::VoltageAboveSupply);
        }

        let offsets = [
            self.color_limit_high_mv,
            self.color_limit_low_mv,
            self.bleach_limit_high_mv,
            self.bleach_limit_low_mv,
        ];
        if offsets.iter().any(|mv| mv.unsigned_abs() > supply_mv) {
            return Err(ConfigError::LimitAboveSupply);
        }

        Ok(())
    }

    /// Serialize into `buf` as postcard binary data
    ///
    /// Returns the used prefix of `buf`.
    #[cfg(feature = "serde")]
    pub fn to_slice<'b>(&self, buf: &'b mut [u8]) -> Result<&'b mut [u8], ConfigError> {
        postcard::to_slice(self, buf).map_err(|_| ConfigError::Encode)
    }

    /// Deserialize from postcard binary data
    #[cfg(feature = "serde")]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        postcard::from_bytes(bytes).map_err(|_| ConfigError::Decode)
    }
}

/// How corrective attempts are counted across the two refresh directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RetryBudget {
    /// Bleach and color correction each get `max_retries` attempts
    #[default]
    PerDirection,
    /// Color correction only gets what bleach correction left over
    Shared,
}

/// Refresh retry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RefreshPolicy {
    /// Corrective attempts allowed (see `budget`)
    pub max_retries: u8,
    /// Pause before repeating a corrective attempt (ms)
    pub retry_pause_ms: u32,
    /// Whether the attempt budget is per direction or shared
    pub budget: RetryBudget,
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self {
            max_retries: MAX_REFRESH_RETRIES,
            retry_pause_ms: RETRY_PAUSE_MS,
            budget: RetryBudget::PerDirection,
        }
    }
}

/// Conditioning sequence run by `begin()`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StartupPolicy {
    /// Color every segment, then bleach every segment
    #[default]
    ColorThenBleach,
    /// Bleach every segment once
    BleachOnly,
}

/// Converter resolution shared by the segment ADC and the counter electrode output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AdcResolution {
    bits: u8,
}

impl AdcResolution {
    /// Create a resolution of `bits` (1 to 16)
    pub const fn new(bits: u8) -> Result<Self, ConfigError> {
        if bits == 0 || bits > 16 {
            return Err(ConfigError::InvalidResolution);
        }
        Ok(Self { bits })
    }

    /// Converter bit depth
    pub const fn bits(&self) -> u8 {
        self.bits
    }

    /// Full-scale code (e.g. 4095 for 12 bits)
    pub const fn max(&self) -> u16 {
        ((1u32 << self.bits) - 1) as u16
    }
}

impl Default for AdcResolution {
    fn default() -> Self {
        Self {
            bits: DEFAULT_ADC_BITS,
        }
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> DisplayConfig {
    DisplayConfig {
        bleaching_mv: 1200,
        coloring_mv: 1500,
        bleaching_time_ms: 1000,
        coloring_time_ms: 1500,
        refresh_bleaching_mv: 1000,
        refresh_coloring_mv: 1000,
        refresh_bleach_pulse_ms: 200,
        refresh_color_pulse_ms: 300,
        color_limit_high_mv: 200,
        color_limit_low_mv: 100,
        bleach_limit_high_mv: 100,
        bleach_limit_low_mv: 200,
    }
}
