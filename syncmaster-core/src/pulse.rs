//! Sync pulse generator
//!
//! Drives the output line active for a fixed time, then releases it. The
//! wait is a blocking delay: nothing else runs while a pulse is active,
//! and serial bytes arriving meanwhile are left to the transport.
//!
//! ```ignore
//! let mut pulses = PulseGenerator::new(pin, Delay);
//! pulses.fire(50); // 50 ms active-high pulse
//! ```

use embedded_hal::delay::DelayNs;
use syncmaster_hal::OutputPin;

/// Timed active-high output
pub struct PulseGenerator<P, D> {
    pin: P,
    delay: D,
    /// Pulses fired since construction (wraps)
    fired: u32,
}

impl<P: OutputPin, D: DelayNs> PulseGenerator<P, D> {
    /// Create a new pulse generator
    ///
    /// The line is driven inactive immediately.
    pub fn new(mut pin: P, delay: D) -> Self {
        pin.set_low();
        Self {
            pin,
            delay,
            fired: 0,
        }
    }

    /// Fire a pulse of `width_ms` milliseconds
    ///
    /// Blocks for the whole pulse. The width is not checked here; the
    /// interpreter only requests widths it has already bounded.
    pub fn fire(&mut self, width_ms: u32) {
        self.pin.set_high();
        self.delay.delay_ms(width_ms);
        self.pin.set_low();
        self.fired = self.fired.wrapping_add(1);
    }

    /// Check if the line is currently active
    pub fn is_active(&self) -> bool {
        self.pin.is_set_high()
    }

    /// Number of pulses fired so far
    pub fn pulses_fired(&self) -> u32 {
        self.fired
    }
}

#[cfg(test)]
pub(crate) mod mock {
    //! Pin and delay doubles that record into a shared timeline

    use core::cell::RefCell;
    use std::rc::Rc;
    use std::vec::Vec;

    use embedded_hal::delay::DelayNs;
    use syncmaster_hal::OutputPin;

    /// Recorded hardware activity
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Trace {
        High,
        Low,
        /// Delay while the pin was high, in nanoseconds
        WaitHigh(u32),
        /// Delay while the pin was low, in nanoseconds
        WaitLow(u32),
    }

    pub type Timeline = Rc<RefCell<Vec<Trace>>>;

    pub struct MockPin {
        pub high: Rc<RefCell<bool>>,
        pub timeline: Timeline,
    }

    impl OutputPin for MockPin {
        fn set_high(&mut self) {
            *self.high.borrow_mut() = true;
            self.timeline.borrow_mut().push(Trace::High);
        }

        fn set_low(&mut self) {
            *self.high.borrow_mut() = false;
            self.timeline.borrow_mut().push(Trace::Low);
        }

        fn is_set_high(&self) -> bool {
            *self.high.borrow()
        }
    }

    pub struct MockDelay {
        pub high: Rc<RefCell<bool>>,
        pub timeline: Timeline,
    }

    impl DelayNs for MockDelay {
        fn delay_ns(&mut self, ns: u32) {
            let trace = if *self.high.borrow() {
                Trace::WaitHigh(ns)
            } else {
                Trace::WaitLow(ns)
            };
            self.timeline.borrow_mut().push(trace);
        }

        fn delay_ms(&mut self, ms: u32) {
            // Record milliseconds as one entry, scaled to ns
            self.delay_ns(ms.saturating_mul(1_000_000));
        }
    }

    /// Build a pin/delay pair sharing one timeline
    pub fn hardware() -> (MockPin, MockDelay, Timeline) {
        let high = Rc::new(RefCell::new(false));
        let timeline: Timeline = Rc::new(RefCell::new(Vec::new()));
        (
            MockPin {
                high: high.clone(),
                timeline: timeline.clone(),
            },
            MockDelay {
                high,
                timeline: timeline.clone(),
            },
            timeline,
        )
    }

    /// Pulse widths in ms reconstructed from a timeline
    pub fn pulse_widths(timeline: &Timeline) -> Vec<u32> {
        let mut widths = Vec::new();
        let mut current: Option<u64> = None;
        for trace in timeline.borrow().iter() {
            match *trace {
                Trace::High => current = Some(0),
                Trace::WaitHigh(ns) => {
                    if let Some(total) = current.as_mut() {
                        *total += u64::from(ns);
                    }
                }
                Trace::Low => {
                    if let Some(total) = current.take() {
                        widths.push((total / 1_000_000) as u32);
                    }
                }
                Trace::WaitLow(_) => {}
            }
        }
        widths
    }
}
