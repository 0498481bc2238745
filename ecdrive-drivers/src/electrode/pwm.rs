//! Counter electrode on a filtered PWM channel
//!
//! Boards without a DAC drive the counter electrode from a PWM output
//! through an RC low-pass filter. The converter level maps onto the duty
//! cycle as a fraction of full scale, so level `full_scale` is 100 % duty
//! (the supply rail).

use embedded_hal::pwm::SetDutyCycle;

use ecdrive_hal::AnalogOutput;

/// Counter electrode output over any `embedded-hal` PWM channel
pub struct PwmCounter<P> {
    pwm: P,
    /// Level corresponding to 100 % duty
    full_scale: u16,
    /// A duty update was rejected by the PWM peripheral
    fault: bool,
}

impl<P: SetDutyCycle> PwmCounter<P> {
    /// Wrap a PWM channel; `full_scale` is the converter maximum (e.g. 4095)
    pub fn new(pwm: P, full_scale: u16) -> Self {
        Self {
            pwm,
            full_scale: full_scale.max(1),
            fault: false,
        }
    }

    /// Check if any duty update failed since the last [`clear_fault`](Self::clear_fault)
    pub fn has_fault(&self) -> bool {
        self.fault
    }

    /// Clear the fault latch
    pub fn clear_fault(&mut self) {
        self.fault = false;
    }

    /// Give back the PWM channel
    pub fn release(self) -> P {
        self.pwm
    }
}

impl<P: SetDutyCycle> AnalogOutput for PwmCounter<P> {
    fn write(&mut self, level: u16) {
        let level = level.min(self.full_scale);
        if self
            .pwm
            .set_duty_cycle_fraction(level, self.full_scale)
            .is_err()
        {
            #[cfg(feature = "defmt")]
            defmt::warn!("Counter electrode duty update failed (level {})", level);
            self.fault = true;
        }
    }

    fn disable(&mut self) {
        if self.pwm.set_duty_cycle_fully_off().is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("Counter electrode disable failed");
            self.fault = true;
        }
    }
}
