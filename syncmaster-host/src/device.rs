//! Serial driver for the trigger device
//!
//! Discovery opens every serial port in turn, sends the probe message and
//! keeps the first port whose reply identifies the device. Events are then
//! sent as single framed messages; the device answers each one with a
//! pulse.

use std::io::{self, BufRead, BufReader, Read, Write};
use std::thread;
use std::time::Duration;

use serialport::{SerialPort, SerialPortInfo, SerialPortType};
use syncmaster_protocol::{EventKind, BAUDRATE};
use tracing::{debug, info, warn};

use crate::error::HostError;
use crate::protocol::HostProtocol;

/// Read timeout while probing a port
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(1);

/// Read timeout on the connected device
pub const CONNECTED_TIMEOUT: Duration = Duration::from_secs(5);

/// Probe messages sent per port; the last reply decides
pub const PROBE_ATTEMPTS: usize = 3;

/// Information about an available serial port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInfo {
    /// Port name (e.g., "/dev/ttyACM0" or "COM3")
    pub name: String,

    /// USB vendor ID (if USB device)
    pub vid: Option<u16>,

    /// USB product ID (if USB device)
    pub pid: Option<u16>,

    /// Product name (if available)
    pub product: Option<String>,
}

impl From<SerialPortInfo> for PortInfo {
    fn from(info: SerialPortInfo) -> Self {
        let (vid, pid, product) = match info.port_type {
            SerialPortType::UsbPort(usb_info) => {
                (Some(usb_info.vid), Some(usb_info.pid), usb_info.product)
            }
            _ => (None, None, None),
        };

        Self {
            name: info.port_name,
            vid,
            pid,
            product,
        }
    }
}

/// List available serial ports, sorted by name
pub fn list_ports() -> Vec<PortInfo> {
    let mut ports: Vec<PortInfo> = serialport::available_ports()
        .unwrap_or_default()
        .into_iter()
        .map(PortInfo::from)
        .collect();
    ports.sort_by(|a, b| a.name.cmp(&b.name));
    ports
}

fn open_port(name: &str, timeout: Duration) -> Result<Box<dyn SerialPort>, HostError> {
    Ok(serialport::new(name, BAUDRATE).timeout(timeout).open()?)
}

/// Read one reply line, treating a timeout as an empty line
fn read_reply<R: BufRead>(reader: &mut R) -> Result<String, HostError> {
    let mut line = String::new();
    match reader.read_line(&mut line) {
        Ok(_) => Ok(line),
        Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(line),
        Err(e) => Err(e.into()),
    }
}

/// Send the probe and check whether the link answers like the device
///
/// The first replies may be swallowed while the board resets on open, so
/// only the reply to the last probe counts.
pub fn probe<T: Read + Write>(link: T, protocol: &HostProtocol) -> Result<bool, HostError> {
    let frame = protocol.probe_frame()?;
    let mut reader = BufReader::new(link);
    let mut reply = String::new();

    for _ in 0..PROBE_ATTEMPTS {
        reader.get_mut().write_all(&frame)?;
        reader.get_mut().flush()?;
        reply = read_reply(&mut reader)?;
    }

    debug!("Probe reply: {:?}", reply.trim());
    Ok(protocol.is_expected_reply(&reply))
}

/// Connected trigger device
pub struct SyncMaster<T> {
    link: BufReader<T>,
    protocol: HostProtocol,
    port_name: Option<String>,
}

impl SyncMaster<Box<dyn SerialPort>> {
    /// Find the device among the available serial ports
    ///
    /// Ports that fail to open or answer wrongly are skipped.
    pub fn discover(protocol: HostProtocol) -> Result<Self, HostError> {
        for port in list_ports() {
            let found = open_port(&port.name, PROBE_TIMEOUT)
                .and_then(|link| probe(link, &protocol));

            match found {
                Ok(true) => {
                    info!("SyncMaster found on {}", port.name);
                    return Self::connect(&port.name, protocol);
                }
                Ok(false) => debug!("{}: no SyncMaster reply", port.name),
                Err(e) => debug!("{}: skipped ({})", port.name, e),
            }
        }

        warn!("No SyncMaster found on any serial port");
        Err(HostError::DeviceNotFound)
    }

    /// Open a known port without probing it
    pub fn connect(port_name: &str, protocol: HostProtocol) -> Result<Self, HostError> {
        let link = open_port(port_name, CONNECTED_TIMEOUT)?;
        let mut device = Self::from_link(link, protocol);
        device.port_name = Some(port_name.to_string());
        Ok(device)
    }
}

impl<T: Read + Write> SyncMaster<T> {
    /// Wrap an already open link
    pub fn from_link(link: T, protocol: HostProtocol) -> Self {
        Self {
            link: BufReader::new(link),
            protocol,
            port_name: None,
        }
    }

    /// Protocol in use
    pub fn protocol(&self) -> &HostProtocol {
        &self.protocol
    }

    /// Port the device was opened on, if any
    pub fn port_name(&self) -> Option<&str> {
        self.port_name.as_deref()
    }

    /// Mark the start of a trial (50 ms pulse)
    pub fn start(&mut self) -> Result<(), HostError> {
        self.send_event(EventKind::Start)
    }

    /// Mark the end of a trial (100 ms pulse)
    pub fn end(&mut self) -> Result<(), HostError> {
        self.send_event(EventKind::End)
    }

    /// Mark user event 1 (150 ms pulse)
    pub fn event1(&mut self) -> Result<(), HostError> {
        self.send_event(EventKind::Event1)
    }

    /// Mark user event 2 (200 ms pulse)
    pub fn event2(&mut self) -> Result<(), HostError> {
        self.send_event(EventKind::Event2)
    }

    /// Send a predefined event
    pub fn send_event(&mut self, kind: EventKind) -> Result<(), HostError> {
        self.event(self.protocol.value_for(kind))
    }

    /// Send a raw value
    ///
    /// With the scaled protocol this is a pulse of `value * 10` ms.
    pub fn event(&mut self, value: i32) -> Result<(), HostError> {
        let frame = self.protocol.frame_value(value)?;
        debug!("Sending {:?}", String::from_utf8_lossy(&frame));
        let link = self.link.get_mut();
        link.write_all(&frame)?;
        link.flush()?;
        Ok(())
    }

    /// Read one reply line from the device
    pub fn read_line(&mut self) -> Result<String, HostError> {
        read_reply(&mut self.link)
    }

    /// Send the probe and require the expected reply
    pub fn verify(&mut self) -> Result<(), HostError> {
        let frame = self.protocol.probe_frame()?;
        let link = self.link.get_mut();
        link.write_all(&frame)?;
        link.flush()?;

        let reply = self.read_line()?;
        if self.protocol.is_expected_reply(&reply) {
            Ok(())
        } else {
            Err(HostError::UnexpectedReply {
                expected: self.protocol.expected_reply.clone(),
                actual: reply.trim().to_string(),
            })
        }
    }

    /// Send `count` start pulses, `interval` apart
    ///
    /// Useful for checking the wiring to the recording system.
    pub fn test_signal(&mut self, count: usize, interval: Duration) -> Result<(), HostError> {
        info!("Sending {} test pulses", count);
        for _ in 0..count {
            self.start()?;
            thread::sleep(interval);
        }
        Ok(())
    }

    /// Five start pulses, one second apart
    pub fn default_test_signal(&mut self) -> Result<(), HostError> {
        self.test_signal(5, Duration::from_secs(1))
    }

    /// Flush and close the link
    pub fn close(mut self) -> Result<T, HostError> {
        self.link.get_mut().flush()?;
        Ok(self.link.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::VecDeque;

    /// In-memory serial link; replies are queued ahead of time
    #[derive(Default)]
    struct MemoryLink {
        rx: VecDeque<u8>,
        tx: Vec<u8>,
    }

    impl MemoryLink {
        fn with_replies(replies: &[u8]) -> Self {
            Self {
                rx: replies.iter().copied().collect(),
                tx: Vec::new(),
            }
        }
    }

    impl Read for MemoryLink {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = buf.len().min(self.rx.len());
            for slot in buf.iter_mut().take(n) {
                *slot = self.rx.pop_front().unwrap_or(0);
            }
            Ok(n)
        }
    }

    impl Write for MemoryLink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.tx.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Link whose reads always time out
    struct SilentLink;

    impl Read for SilentLink {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::TimedOut, "timed out"))
        }
    }

    impl Write for SilentLink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_events_scaled() {
        let mut device = SyncMaster::from_link(MemoryLink::default(), HostProtocol::scaled());
        device.start().unwrap();
        device.end().unwrap();
        device.event1().unwrap();
        device.event2().unwrap();
        device.event(50).unwrap();

        let link = device.close().unwrap();
        assert_eq!(link.tx, b"<5><10><15><20><50>".to_vec());
    }

    #[test]
    fn test_events_symbolic() {
        let mut device = SyncMaster::from_link(MemoryLink::default(), HostProtocol::symbolic());
        device.start().unwrap();
        device.event2().unwrap();

        let link = device.close().unwrap();
        assert_eq!(link.tx, b"1\n4\n".to_vec());
    }

    #[test]
    fn test_probe_keeps_third_reply() {
        let link = MemoryLink::with_replies(b"\r\ngarbage\r\nwarmest regards\r\n");
        assert!(probe(link, &HostProtocol::scaled()).unwrap());

        let link = MemoryLink::with_replies(b"warmest regards\r\n\r\n\r\n");
        assert!(!probe(link, &HostProtocol::scaled()).unwrap());
    }

    #[test]
    fn test_probe_sends_greeting_each_attempt() {
        let mut link = MemoryLink::with_replies(b"42\r\n42\r\n42\r\n");
        assert!(probe(&mut link, &HostProtocol::symbolic()).unwrap());
        assert_eq!(link.tx, b"5\n5\n5\n".to_vec());
    }

    #[test]
    fn test_probe_timeout_is_not_a_match() {
        assert!(!probe(SilentLink, &HostProtocol::scaled()).unwrap());
    }

    #[test]
    fn test_verify() {
        let link = MemoryLink::with_replies(b"warmest regards\r\n");
        let mut device = SyncMaster::from_link(link, HostProtocol::scaled());
        device.verify().unwrap();

        let link = MemoryLink::with_replies(b"hello\r\n");
        let mut device = SyncMaster::from_link(link, HostProtocol::scaled());
        match device.verify() {
            Err(HostError::UnexpectedReply { expected, actual }) => {
                assert_eq!(expected, "warmest regards");
                assert_eq!(actual, "hello");
            }
            other => panic!("expected UnexpectedReply, got {:?}", other),
        }
    }

    #[test]
    fn test_test_signal_sends_start_pulses() {
        let mut device = SyncMaster::from_link(MemoryLink::default(), HostProtocol::scaled());
        device.test_signal(3, Duration::ZERO).unwrap();

        let link = device.close().unwrap();
        assert_eq!(link.tx, b"<5><5><5>".to_vec());
    }

    #[test]
    fn test_symbolic_replies_can_be_read() {
        let link = MemoryLink::with_replies(b"start\r\n");
        let mut device = SyncMaster::from_link(link, HostProtocol::symbolic());
        device.start().unwrap();
        assert_eq!(device.read_line().unwrap().trim(), "start");
        assert_eq!(device.port_name(), None);
    }
}
