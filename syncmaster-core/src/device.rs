//! Device loop
//!
//! Ties the serial link, framer, interpreter and pulse generator together.
//! The loop runs one byte at a time:
//!
//! ```text
//!   WaitForByte ──byte──▶ Framing ──message──▶ Dispatch
//!        ▲                   │                    │
//!        └────partial────────┘◀───────done────────┘
//! ```
//!
//! Bad input never stops the loop: oversized messages are truncated by the
//! framer, unknown values and out-of-range widths are ignored. Transport
//! errors are reported to the caller, who keeps stepping.

use embedded_hal::delay::DelayNs;
use syncmaster_hal::{OutputPin, UartRx, UartTx};
use syncmaster_protocol::{FrameState, Framer};

use crate::config::DeviceConfig;
use crate::interpreter::{Action, Actions, Interpreter};
use crate::pulse::PulseGenerator;

/// Where the loop currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoopState {
    /// Waiting for the next byte between messages
    WaitForByte,
    /// A message is partially received
    Framing,
    /// Executing the actions of a completed message
    Dispatch,
}

/// Summary of one handled message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Dispatch {
    /// Integer value the message parsed to
    pub value: i32,
    /// Pulses fired
    pub pulses: u8,
    /// Total pulse time in milliseconds
    pub pulse_ms: u32,
    /// Reply lines sent
    pub replies: u8,
}

impl Dispatch {
    /// Check if the message was ignored
    pub fn is_ignored(&self) -> bool {
        self.pulses == 0 && self.replies == 0
    }
}

/// Device loop errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceError<R, W> {
    /// Reading from the host link failed
    Receive(R),
    /// Sending a reply failed
    Transmit(W),
}

/// Result of one loop iteration
pub type StepResult<S> =
    Result<Option<Dispatch>, DeviceError<<S as UartRx>::Error, <S as UartTx>::Error>>;

/// The trigger device
pub struct Device<S, P, D> {
    serial: S,
    framer: Framer,
    interpreter: Interpreter,
    pulses: PulseGenerator<P, D>,
    state: LoopState,
}

impl<S, P, D> Device<S, P, D>
where
    S: UartRx + UartTx,
    P: OutputPin,
    D: DelayNs,
{
    /// Create a device from its configuration and hardware
    pub fn new(config: DeviceConfig, serial: S, pulses: PulseGenerator<P, D>) -> Self {
        Self {
            serial,
            framer: Framer::new(config.framing),
            interpreter: Interpreter::new(config.interpreter),
            pulses,
            state: LoopState::WaitForByte,
        }
    }

    /// Current loop state
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Get the pulse generator
    pub fn pulses(&self) -> &PulseGenerator<P, D> {
        &self.pulses
    }

    /// Get the serial link
    pub fn serial(&self) -> &S {
        &self.serial
    }

    /// Get the serial link mutably
    pub fn serial_mut(&mut self) -> &mut S {
        &mut self.serial
    }

    /// Run one iteration: wait for a byte, frame it, dispatch if complete
    pub fn step(&mut self) -> StepResult<S> {
        self.serial.wait_for_byte().map_err(DeviceError::Receive)?;
        let byte = self.serial.read_byte().map_err(DeviceError::Receive)?;
        self.process_byte(byte).map_err(DeviceError::Transmit)
    }

    /// Run forever, handing every iteration's result to `observer`
    pub fn run<F>(&mut self, mut observer: F) -> !
    where
        F: FnMut(StepResult<S>),
    {
        loop {
            let result = self.step();
            observer(result);
        }
    }

    /// Frame one received byte and dispatch a completed message
    pub fn process_byte(&mut self, byte: u8) -> Result<Option<Dispatch>, <S as UartTx>::Error> {
        let message = match self.framer.feed(byte) {
            Some(message) => message,
            None => {
                self.state = match self.framer.state() {
                    FrameState::Receiving => LoopState::Framing,
                    FrameState::Idle => LoopState::WaitForByte,
                };
                return Ok(None);
            }
        };

        let actions = self.interpreter.interpret(message);

        self.state = LoopState::Dispatch;
        let result = Self::execute(&actions, &mut self.pulses, &mut self.serial);
        self.state = LoopState::WaitForByte;

        result.map(Some)
    }

    fn execute(
        actions: &Actions<'_>,
        pulses: &mut PulseGenerator<P, D>,
        serial: &mut S,
    ) -> Result<Dispatch, <S as UartTx>::Error> {
        let mut dispatch = Dispatch {
            value: actions.value(),
            pulses: 0,
            pulse_ms: 0,
            replies: 0,
        };

        for action in actions.iter() {
            match *action {
                Action::Pulse { width_ms } => {
                    pulses.fire(width_ms);
                    dispatch.pulses += 1;
                    dispatch.pulse_ms = dispatch.pulse_ms.saturating_add(width_ms);
                }
                Action::Reply(text) => {
                    serial.write_line(text)?;
                    dispatch.replies += 1;
                }
            }
        }

        Ok(dispatch)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::vec::Vec;

    use super::*;
    use crate::pulse::mock::{hardware, pulse_widths, MockDelay, MockPin, Timeline};

    /// In-memory host link
    #[derive(Default)]
    struct MockSerial {
        rx: VecDeque<u8>,
        tx: Vec<u8>,
        fail_writes: bool,
    }

    impl MockSerial {
        fn with_input(input: &[u8]) -> Self {
            Self {
                rx: input.iter().copied().collect(),
                ..Default::default()
            }
        }

        fn lines(&self) -> Vec<&str> {
            core::str::from_utf8(&self.tx)
                .unwrap()
                .split_terminator("\r\n")
                .collect()
        }
    }

    #[derive(Debug, PartialEq, Eq)]
    struct Empty;

    impl UartRx for MockSerial {
        type Error = Empty;

        fn byte_available(&mut self) -> Result<bool, Empty> {
            if self.rx.is_empty() {
                // Nothing more will ever arrive in a test
                Err(Empty)
            } else {
                Ok(true)
            }
        }

        fn read_byte(&mut self) -> Result<u8, Empty> {
            self.rx.pop_front().ok_or(Empty)
        }
    }

    impl UartTx for MockSerial {
        type Error = ();

        fn write_blocking(&mut self, data: &[u8]) -> Result<(), ()> {
            if self.fail_writes {
                return Err(());
            }
            self.tx.extend_from_slice(data);
            Ok(())
        }

        fn flush(&mut self) -> Result<(), ()> {
            Ok(())
        }
    }

    type TestDevice = Device<MockSerial, MockPin, MockDelay>;

    fn device(config: DeviceConfig, input: &[u8]) -> (TestDevice, Timeline) {
        let (pin, delay, timeline) = hardware();
        let device = Device::new(
            config,
            MockSerial::with_input(input),
            PulseGenerator::new(pin, delay),
        );
        (device, timeline)
    }

    /// Step until the input is exhausted, collecting dispatches
    fn drain(device: &mut TestDevice) -> Vec<Dispatch> {
        let mut dispatches = Vec::new();
        loop {
            match device.step() {
                Ok(Some(dispatch)) => dispatches.push(dispatch),
                Ok(None) => {}
                Err(DeviceError::Receive(Empty)) => return dispatches,
                Err(DeviceError::Transmit(())) => panic!("unexpected write failure"),
            }
        }
    }

    #[test]
    fn test_symbolic_start() {
        let (mut device, timeline) = device(DeviceConfig::symbolic(), b"1\n");
        let dispatches = drain(&mut device);

        assert_eq!(
            dispatches,
            [Dispatch {
                value: 1,
                pulses: 1,
                pulse_ms: 50,
                replies: 1
            }]
        );
        assert_eq!(pulse_widths(&timeline), [50]);
        assert_eq!(device.serial().lines(), ["start"]);
    }

    #[test]
    fn test_symbolic_ping() {
        let (mut device, timeline) = device(DeviceConfig::symbolic(), b"5\n");
        drain(&mut device);

        assert!(pulse_widths(&timeline).is_empty());
        assert_eq!(device.serial().lines(), ["42"]);
    }

    #[test]
    fn test_symbolic_all_events() {
        let (mut device, timeline) = device(DeviceConfig::symbolic(), b"1\n2\n3\n4\n9\n");
        let dispatches = drain(&mut device);

        assert_eq!(dispatches.len(), 5);
        assert!(dispatches[4].is_ignored());
        assert_eq!(pulse_widths(&timeline), [50, 100, 150, 200]);
        assert_eq!(device.serial().lines(), ["start", "end", "event1", "event2"]);
    }

    #[test]
    fn test_scaled_pulse_and_limit() {
        let (mut device, timeline) = device(DeviceConfig::scaled(), b"<50><200>");
        let dispatches = drain(&mut device);

        assert_eq!(dispatches.len(), 2);
        assert_eq!(dispatches[0].pulse_ms, 500);
        assert!(dispatches[1].is_ignored());
        assert_eq!(pulse_widths(&timeline), [500]);
        assert!(device.serial().tx.is_empty());
    }

    #[test]
    fn test_scaled_greeting() {
        let (mut device, timeline) = device(DeviceConfig::scaled(), b"<best wishes>");
        drain(&mut device);

        assert!(pulse_widths(&timeline).is_empty());
        assert_eq!(device.serial().tx, b"warmest regards\r\n");
    }

    #[test]
    fn test_repeated_messages_are_independent() {
        let (mut device, timeline) = device(DeviceConfig::scaled(), b"<20><20>");
        let dispatches = drain(&mut device);

        assert_eq!(dispatches.len(), 2);
        assert_eq!(dispatches[0], dispatches[1]);
        assert_eq!(pulse_widths(&timeline), [200, 200]);
    }

    #[test]
    fn test_loop_states() {
        let (mut device, _timeline) = device(DeviceConfig::scaled(), b"x<5");
        assert_eq!(device.state(), LoopState::WaitForByte);

        device.step().unwrap();
        assert_eq!(device.state(), LoopState::WaitForByte);
        device.step().unwrap();
        assert_eq!(device.state(), LoopState::Framing);
        device.step().unwrap();
        assert_eq!(device.state(), LoopState::Framing);

        let dispatch = device.process_byte(b'>').unwrap();
        assert_eq!(
            dispatch,
            Some(Dispatch {
                value: 5,
                pulses: 1,
                pulse_ms: 50,
                replies: 0
            })
        );
        assert_eq!(device.state(), LoopState::WaitForByte);
    }

    #[test]
    fn test_oversized_message_is_truncated_not_fatal() {
        let mut input = Vec::new();
        input.push(b'<');
        input.extend_from_slice(&[b'1'; 40]);
        input.extend_from_slice(b"><3>");

        let (mut device, timeline) = device(DeviceConfig::scaled(), &input);
        let dispatches = drain(&mut device);

        assert_eq!(dispatches.len(), 2);
        assert!(dispatches[0].is_ignored());
        assert_eq!(pulse_widths(&timeline), [30]);
    }

    #[test]
    fn test_transmit_error_reported_and_loop_continues() {
        let (mut device, timeline) = device(DeviceConfig::symbolic(), b"1\n1\n");
        device.serial_mut().fail_writes = true;

        assert_eq!(device.step(), Ok(None));
        assert_eq!(device.step(), Err(DeviceError::Transmit(())));
        assert_eq!(device.state(), LoopState::WaitForByte);

        device.serial_mut().fail_writes = false;
        let dispatches = drain(&mut device);
        assert_eq!(dispatches.len(), 1);
        assert_eq!(pulse_widths(&timeline), [50, 50]);
        assert_eq!(device.pulses().pulses_fired(), 2);
    }
}
