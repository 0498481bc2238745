//! Analog output and input abstractions
//!
//! The counter electrode is driven from a DAC (or a filtered PWM channel),
//! and the supply rail is sampled through an ADC channel.

/// Analog output channel
///
/// Levels are in converter units with the same full scale as the ADC, so
/// `full_scale` corresponds to the supply rail.
pub trait AnalogOutput {
    /// Emit an analog level (`0..=full_scale`)
    fn write(&mut self, level: u16);

    /// Drive the output to zero
    fn disable(&mut self) {
        self.write(0);
    }
}

/// Single ADC channel
pub trait AdcChannel {
    /// Error type for conversions
    type Error;

    /// Take one sample in raw converter units
    fn read(&mut self) -> Result<u16, Self::Error>;
}
