//! GPIO pin abstractions
//!
//! An electrochromic work electrode is never a plain output: it is driven
//! during a pulse, sampled by the ADC during a measurement, and floated the
//! rest of the time. [`FlexPin`] captures those three modes.

/// Electrical mode a [`FlexPin`] is currently configured for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinMode {
    /// Input with no pull, not loading the electrode (resting state)
    HighImpedance,
    /// Push-pull output driven to the given level
    Output(bool),
    /// Routed to the ADC
    AnalogInput,
}

impl PinMode {
    /// Check if the pin is actively driving its electrode
    pub fn is_driven(&self) -> bool {
        matches!(self, PinMode::Output(_))
    }
}

/// Pin that can switch between driven output, analog input, and high-Z
///
/// Implementations should reconfigure the pad on every call; callers rely
/// on the mode change taking effect before the method returns.
pub trait FlexPin {
    /// Configure as push-pull output and drive `high`
    fn set_output(&mut self, high: bool);

    /// Configure as analog input and take one ADC sample
    ///
    /// The result is in raw converter units (`0..=adc_max`).
    fn read_analog(&mut self) -> u16;

    /// Configure as a floating input
    fn set_high_impedance(&mut self);
}
