//! Trial events marked by the device
//!
//! Each event is encoded purely by the width of its pulse, so a recorded
//! copy of the output line can be decoded without the serial log.

use crate::messages::{CMD_END, CMD_EVENT1, CMD_EVENT2, CMD_START, PULSE_STEP_MS};

/// Half the spacing between consecutive nominal widths
const HALF_SPACING_MS: u32 = 25;

/// Events distinguished by pulse width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EventKind {
    /// Start of a trial (50 ms)
    Start,
    /// End of a trial (100 ms)
    End,
    /// User event 1 (150 ms)
    Event1,
    /// User event 2 (200 ms)
    Event2,
}

impl EventKind {
    /// All events in ascending pulse-width order
    pub const ALL: [EventKind; 4] = [
        EventKind::Start,
        EventKind::End,
        EventKind::Event1,
        EventKind::Event2,
    ];

    /// Nominal pulse width in milliseconds
    pub fn pulse_width_ms(self) -> u32 {
        match self {
            EventKind::Start => 50,
            EventKind::End => 100,
            EventKind::Event1 => 150,
            EventKind::Event2 => 200,
        }
    }

    /// Lowercase name, also the reply line in terminated framing
    pub fn name(self) -> &'static str {
        match self {
            EventKind::Start => "start",
            EventKind::End => "end",
            EventKind::Event1 => "event1",
            EventKind::Event2 => "event2",
        }
    }

    /// Symbolic command code (terminated framing)
    pub fn code(self) -> i32 {
        match self {
            EventKind::Start => CMD_START,
            EventKind::End => CMD_END,
            EventKind::Event1 => CMD_EVENT1,
            EventKind::Event2 => CMD_EVENT2,
        }
    }

    /// Value to send in scaled framing to get this event's pulse width
    pub fn scaled_value(self) -> i32 {
        (self.pulse_width_ms() / PULSE_STEP_MS) as i32
    }

    /// Classify a measured pulse width
    ///
    /// Boundaries sit halfway between the nominal widths. Widths at or
    /// below 25 ms are not an event.
    pub fn classify(width_ms: f32) -> Option<Self> {
        let mut found = None;
        for kind in Self::ALL {
            let cutoff = (kind.pulse_width_ms() - HALF_SPACING_MS) as f32;
            if width_ms > cutoff {
                found = Some(kind);
            }
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbolic_codes() {
        let codes = EventKind::ALL.map(EventKind::code);
        assert_eq!(codes, [1, 2, 3, 4]);
    }

    #[test]
    fn test_scaled_values() {
        assert_eq!(EventKind::Start.scaled_value(), 5);
        assert_eq!(EventKind::End.scaled_value(), 10);
        assert_eq!(EventKind::Event1.scaled_value(), 15);
        assert_eq!(EventKind::Event2.scaled_value(), 20);
    }

    #[test]
    fn test_classify_midpoints() {
        assert_eq!(EventKind::classify(10.0), None);
        assert_eq!(EventKind::classify(25.0), None);
        assert_eq!(EventKind::classify(26.0), Some(EventKind::Start));
        assert_eq!(EventKind::classify(75.0), Some(EventKind::Start));
        assert_eq!(EventKind::classify(99.0), Some(EventKind::End));
        assert_eq!(EventKind::classify(150.0), Some(EventKind::Event1));
        assert_eq!(EventKind::classify(176.0), Some(EventKind::Event2));
        assert_eq!(EventKind::classify(900.0), Some(EventKind::Event2));
    }
}
