//! GPIO output for the sync line

use embassy_rp::gpio::Output;
use syncmaster_hal::OutputPin;

/// Push-pull output driving the sync line
pub struct PulsePin<'d> {
    output: Output<'d>,
}

impl<'d> PulsePin<'d> {
    /// Wrap a configured output
    pub fn new(output: Output<'d>) -> Self {
        Self { output }
    }
}

impl OutputPin for PulsePin<'_> {
    fn set_high(&mut self) {
        self.output.set_high();
    }

    fn set_low(&mut self) {
        self.output.set_low();
    }

    fn is_set_high(&self) -> bool {
        self.output.is_set_high()
    }
}
