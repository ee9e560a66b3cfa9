//! Message set spoken by the host
//!
//! The device's behaviour is fixed by its configuration, so the host must
//! use the matching preset: [`HostProtocol::scaled`] for the marker-pair
//! firmware, [`HostProtocol::symbolic`] for the newline-terminated one.

use syncmaster_protocol::messages::{ACKNOWLEDGE, CMD_HOST_PING, GREETING, RESPONSE};
use syncmaster_protocol::{encode, encode_value, EventKind, FramingMode, MAX_FRAME_SIZE};

use crate::error::HostError;

/// Host-side view of a device configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostProtocol {
    /// Framing the device expects
    pub framing: FramingMode,
    /// Payload sent to check that a port is the device
    pub probe: String,
    /// Reply that identifies the device
    pub expected_reply: String,
    /// Value sent for each event, in [`EventKind::ALL`] order
    pub event_values: [i32; 4],
}

impl HostProtocol {
    /// Marker-pair protocol: `<5>` .. `<20>`, probed with `<best wishes>`
    pub fn scaled() -> Self {
        Self {
            framing: FramingMode::delimited(),
            probe: GREETING.to_string(),
            expected_reply: RESPONSE.to_string(),
            event_values: EventKind::ALL.map(EventKind::scaled_value),
        }
    }

    /// Newline-terminated protocol: `1\n` .. `4\n`, probed with `5\n`
    pub fn symbolic() -> Self {
        Self {
            framing: FramingMode::terminated(),
            probe: CMD_HOST_PING.to_string(),
            expected_reply: ACKNOWLEDGE.to_string(),
            event_values: EventKind::ALL.map(EventKind::code),
        }
    }

    /// Value to send for an event
    pub fn value_for(&self, kind: EventKind) -> i32 {
        match kind {
            EventKind::Start => self.event_values[0],
            EventKind::End => self.event_values[1],
            EventKind::Event1 => self.event_values[2],
            EventKind::Event2 => self.event_values[3],
        }
    }

    /// Wire bytes for a numeric value
    pub fn frame_value(&self, value: i32) -> Result<Vec<u8>, HostError> {
        Ok(encode_value(self.framing, value)?.to_vec())
    }

    /// Wire bytes for the discovery probe
    pub fn probe_frame(&self) -> Result<Vec<u8>, HostError> {
        let mut buffer = [0u8; MAX_FRAME_SIZE];
        let len = encode(self.framing, self.probe.as_bytes(), &mut buffer)?;
        Ok(buffer[..len].to_vec())
    }

    /// Check a reply line against the expected response
    ///
    /// Surrounding whitespace, including the CR LF line ending, is ignored.
    pub fn is_expected_reply(&self, line: &str) -> bool {
        line.trim() == self.expected_reply
    }
}

impl Default for HostProtocol {
    fn default() -> Self {
        Self::scaled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_scaled_frames() {
        let protocol = HostProtocol::scaled();
        assert_eq!(protocol.probe_frame().unwrap(), b"<best wishes>".to_vec());
        assert_eq!(protocol.frame_value(5).unwrap(), b"<5>".to_vec());
        assert_eq!(protocol.event_values, [5, 10, 15, 20]);
        assert_eq!(protocol.value_for(EventKind::Event2), 20);
    }

    #[test]
    fn test_symbolic_frames() {
        let protocol = HostProtocol::symbolic();
        assert_eq!(protocol.probe_frame().unwrap(), b"5\n".to_vec());
        assert_eq!(protocol.frame_value(3).unwrap(), b"3\n".to_vec());
        assert_eq!(protocol.event_values, [1, 2, 3, 4]);
    }

    #[test]
    fn test_reply_check_ignores_line_ending() {
        let protocol = HostProtocol::scaled();
        assert!(protocol.is_expected_reply("warmest regards\r\n"));
        assert!(!protocol.is_expected_reply("warmest"));
        assert!(!protocol.is_expected_reply(""));
    }

    #[test]
    fn test_oversized_probe_rejected() {
        let mut protocol = HostProtocol::scaled();
        protocol.probe = "x".repeat(40);
        assert!(matches!(
            protocol.probe_frame(),
            Err(HostError::Frame(syncmaster_protocol::FrameError::PayloadTooLarge))
        ));
    }
}
