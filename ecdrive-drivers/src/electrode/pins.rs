//! Pin-backed electrode actuator
//!
//! Drives the counter electrode through an analog output and each work
//! electrode through a [`FlexPin`]. Segment `i` is `pins[i]`.
//!
//! # Usage
//!
//! ```ignore
//! let electrodes = PinElectrodes::new(counter_dac, [seg_a, seg_b, seg_c, seg_d]);
//! let mut display = EcDisplay::new(electrodes, delay, &STOP, panel_config, 3300)?;
//! display.begin();
//! ```

use ecdrive_core::traits::ElectrodeActuator;
use ecdrive_hal::{AnalogOutput, FlexPin, PinMode};

/// Electrode actuator over one analog output and `N` segment pins
pub struct PinElectrodes<C, P, const N: usize> {
    counter: C,
    pins: [P; N],
    /// Last mode each pin was configured for
    modes: [PinMode; N],
    /// Last level written to the counter electrode (0 = disabled)
    counter_level: u16,
}

impl<C, P, const N: usize> PinElectrodes<C, P, N>
where
    C: AnalogOutput,
    P: FlexPin,
{
    /// Take ownership of the outputs and float every segment pin
    pub fn new(mut counter: C, mut pins: [P; N]) -> Self {
        counter.disable();
        for pin in pins.iter_mut() {
            pin.set_high_impedance();
        }
        Self {
            counter,
            pins,
            modes: [PinMode::HighImpedance; N],
            counter_level: 0,
        }
    }

    /// Mode a segment pin was last configured for
    pub fn mode(&self, index: usize) -> Option<PinMode> {
        self.modes.get(index).copied()
    }

    /// Level last written to the counter electrode
    pub fn counter_level(&self) -> u16 {
        self.counter_level
    }

    /// Check if any segment pin is being driven
    pub fn any_driven(&self) -> bool {
        self.modes.iter().any(PinMode::is_driven)
    }

    /// Give back the counter output and pins
    pub fn release(self) -> (C, [P; N]) {
        (self.counter, self.pins)
    }
}

impl<C, P, const N: usize> ElectrodeActuator for PinElectrodes<C, P, N>
where
    C: AnalogOutput,
    P: FlexPin,
{
    fn segment_count(&self) -> usize {
        N
    }

    fn set_counter_level(&mut self, level: u16) {
        self.counter.write(level);
        self.counter_level = level;
    }

    fn disable_counter(&mut self) {
        self.counter.disable();
        self.counter_level = 0;
    }

    fn drive_segment(&mut self, index: usize, high: bool) {
        if let Some(pin) = self.pins.get_mut(index) {
            pin.set_output(high);
            self.modes[index] = PinMode::Output(high);
        }
    }

    fn read_segment(&mut self, index: usize) -> u16 {
        match self.pins.get_mut(index) {
            Some(pin) => {
                self.modes[index] = PinMode::AnalogInput;
                pin.read_analog()
            }
            None => 0,
        }
    }

    fn release_segment(&mut self, index: usize) {
        if let Some(pin) = self.pins.get_mut(index) {
            pin.set_high_impedance();
            self.modes[index] = PinMode::HighImpedance;
        }
    }
}
