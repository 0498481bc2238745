//! Supply rail monitor
//!
//! Reads the display supply through a resistor divider into an ADC channel.
//! The refresh limits are relative to this rail, so callers feed the result
//! into `EcDisplay::update_supply_voltage` whenever it moves.
//!
//! Circuit: SUPPLY -- r_top -- ADC_PIN -- r_bottom -- GND

use ecdrive_hal::AdcChannel;

/// Errors that can occur reading the supply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SupplyError {
    /// ADC conversion failed
    ConversionError,
    /// Reading at zero: divider open or rail absent
    NoSupply,
    /// Reading at full scale: rail above the measurable range
    Saturated,
}

/// Readings within this many LSB of either end are treated as faults
const RAIL_MARGIN_LSB: u16 = 4;

/// Supply voltage monitor over a resistor divider
pub struct SupplyMonitor<ADC> {
    adc: ADC,
    /// ADC reference voltage in mV
    vref_mv: u16,
    /// ADC full-scale code (e.g. 4095)
    adc_max: u16,
    /// Divider resistor between supply and ADC pin (ohms)
    r_top: u32,
    /// Divider resistor between ADC pin and ground (ohms)
    r_bottom: u32,
}

impl<ADC> SupplyMonitor<ADC> {
    /// Create a monitor
    ///
    /// # Arguments
    /// - `adc`: ADC channel on the divider midpoint
    /// - `vref_mv`: ADC reference voltage in millivolts
    /// - `adc_max`: ADC full-scale code
    /// - `r_top`, `r_bottom`: divider resistors in ohms
    pub fn new(adc: ADC, vref_mv: u16, adc_max: u16, r_top: u32, r_bottom: u32) -> Self {
        Self {
            adc,
            vref_mv,
            adc_max: adc_max.max(1),
            r_top,
            r_bottom: r_bottom.max(1),
        }
    }

    /// Convert a raw reading to supply millivolts
    pub fn reading_to_mv(&self, reading: u16) -> Result<u16, SupplyError> {
        if reading <= RAIL_MARGIN_LSB {
            return Err(SupplyError::NoSupply);
        }
        if reading >= self.adc_max.saturating_sub(RAIL_MARGIN_LSB) {
            return Err(SupplyError::Saturated);
        }

        // V_pin = reading * vref / adc_max; V_supply = V_pin * (r_top + r_bottom) / r_bottom
        let pin_uv = reading as u64 * self.vref_mv as u64 * 1000 / self.adc_max as u64;
        let supply_uv = pin_uv * (self.r_top as u64 + self.r_bottom as u64) / self.r_bottom as u64;
        let supply_mv = supply_uv / 1000;

        if supply_mv > u16::MAX as u64 {
            return Err(SupplyError::Saturated);
        }
        Ok(supply_mv as u16)
    }
}

impl<ADC: AdcChannel> SupplyMonitor<ADC> {
    /// Sample the supply rail in millivolts
    pub fn read_mv(&mut self) -> Result<u16, SupplyError> {
        let reading = self
            .adc
            .read()
            .map_err(|_| SupplyError::ConversionError)?;
        let mv = self.reading_to_mv(reading)?;

        #[cfg(feature = "defmt")]
        defmt::trace!("Supply {} LSB -> {} mV", reading, mv);

        Ok(mv)
    }
}

/// Fixed-value ADC for testing
#[cfg(test)]
pub struct DummyAdc(pub Result<u16, ()>);

#[cfg(test)]
impl AdcChannel for DummyAdc {
    type Error = ();

    fn read(&mut self) -> Result<u16, ()> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_divider_scaling() {
        // 3.3 V reference, 12-bit, 1:1 divider
        let monitor = SupplyMonitor::new(DummyAdc(Ok(0)), 3300, 4095, 10_000, 10_000);

        // Half scale on the pin = 1.65 V, doubled by the divider
        let mv = monitor.reading_to_mv(2048).unwrap();
        assert!((3299..=3302).contains(&mv));
    }

    #[test]
    fn test_read_mv() {
        let mut monitor = SupplyMonitor::new(DummyAdc(Ok(2482)), 3300, 4095, 10_000, 10_000);
        // 2482 / 4095 * 3.3 V * 2 = 4.0 V
        let mv = monitor.read_mv().unwrap();
        assert!((3995..=4005).contains(&mv));
    }

    #[test]
    fn test_no_supply() {
        let monitor = SupplyMonitor::new(DummyAdc(Ok(0)), 3300, 4095, 10_000, 10_000);
        assert_eq!(monitor.reading_to_mv(0), Err(SupplyError::NoSupply));
    }

    #[test]
    fn test_saturated() {
        let monitor = SupplyMonitor::new(DummyAdc(Ok(0)), 3300, 4095, 10_000, 10_000);
        assert_eq!(monitor.reading_to_mv(4095), Err(SupplyError::Saturated));
    }

    #[test]
    fn test_conversion_error() {
        let mut monitor = SupplyMonitor::new(DummyAdc(Err(())), 3300, 4095, 10_000, 10_000);
        assert_eq!(monitor.read_mv(), Err(SupplyError::ConversionError));
    }
}
