//! Configuration type definitions

use heapless::{String, Vec};

use syncmaster_protocol::messages::{
    ACKNOWLEDGE, CMD_HOST_PING, GREETING, MAX_PULSE_MS, PULSE_STEP_MS, RESPONSE,
};
use syncmaster_hal::UartConfig;
use syncmaster_protocol::{EventKind, FramingMode, BAUDRATE, MAX_PAYLOAD_SIZE};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum label length
pub const MAX_LABEL_LEN: usize = 16;

/// Maximum length of match and reply texts
pub const MAX_TEXT_LEN: usize = MAX_PAYLOAD_SIZE;

/// Maximum command table entries
pub const MAX_COMMANDS: usize = 8;

/// Maximum text literal matches
pub const MAX_LITERALS: usize = 4;

/// Entry name
pub type Label = String<MAX_LABEL_LEN>;

/// Match or reply text
pub type Text = String<MAX_TEXT_LEN>;

/// Serial link settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SerialConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self { baudrate: BAUDRATE }
    }
}

impl From<SerialConfig> for UartConfig {
    fn from(config: SerialConfig) -> Self {
        UartConfig {
            baudrate: config.baudrate,
        }
    }
}

/// One row of the command table
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CommandEntry {
    /// Name used in logs and config sections
    pub name: Label,
    /// Value that selects this entry
    pub code: i32,
    /// Pulse to fire, if any
    pub pulse_ms: Option<u32>,
    /// Line to send after the pulse, if any
    pub reply: Option<Text>,
}

/// Numeric pulse-width mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NumericMode {
    /// Values only select command table entries
    #[default]
    Off,
    /// Value times `step_ms` is fired as a pulse when within `max_ms`
    Scaled { step_ms: u32, max_ms: u32 },
}

/// Reply sent when the raw message text matches exactly
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LiteralReply {
    /// Name used in logs and config sections
    pub name: Label,
    /// Text the message must equal
    pub text: Text,
    /// Line to send back
    pub reply: Text,
}

/// Message interpreter configuration
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InterpreterConfig {
    /// Command table, first matching code wins
    pub commands: Vec<CommandEntry, MAX_COMMANDS>,
    /// Numeric pulse-width mode
    pub numeric: NumericMode,
    /// Text literal replies, first match wins
    pub literals: Vec<LiteralReply, MAX_LITERALS>,
}

impl InterpreterConfig {
    /// Find the command table entry for a value
    pub fn find_command(&self, code: i32) -> Option<&CommandEntry> {
        self.commands.iter().find(|c| c.code == code)
    }
}

/// Complete device configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeviceConfig {
    /// Serial link settings
    pub serial: SerialConfig,
    /// Message framing
    pub framing: FramingMode,
    /// Message interpretation
    pub interpreter: InterpreterConfig,
}

impl DeviceConfig {
    /// Newline-terminated symbolic commands
    ///
    /// `1`..`4` fire the start/end/event1/event2 pulses (50/100/150/200 ms)
    /// and echo the event name, `5` answers with the acknowledge value.
    pub fn symbolic() -> Self {
        let mut commands = Vec::new();
        for kind in EventKind::ALL {
            let _ = commands.push(CommandEntry {
                name: label(kind.name()),
                code: kind.code(),
                pulse_ms: Some(kind.pulse_width_ms()),
                reply: Some(text(kind.name())),
            });
        }
        let _ = commands.push(CommandEntry {
            name: label("ping"),
            code: CMD_HOST_PING,
            pulse_ms: None,
            reply: Some(text(ACKNOWLEDGE)),
        });

        Self {
            serial: SerialConfig::default(),
            framing: FramingMode::terminated(),
            interpreter: InterpreterConfig {
                commands,
                numeric: NumericMode::Off,
                literals: Vec::new(),
            },
        }
    }

    /// `<N>` framing with pulses of `N * 10` ms up to 1 s
    ///
    /// `<best wishes>` answers `warmest regards`.
    pub fn scaled() -> Self {
        let mut literals = Vec::new();
        let _ = literals.push(LiteralReply {
            name: label("greeting"),
            text: text(GREETING),
            reply: text(RESPONSE),
        });

        Self {
            serial: SerialConfig::default(),
            framing: FramingMode::delimited(),
            interpreter: InterpreterConfig {
                commands: Vec::new(),
                numeric: NumericMode::Scaled {
                    step_ms: PULSE_STEP_MS,
                    max_ms: MAX_PULSE_MS,
                },
                literals,
            },
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self::scaled()
    }
}

fn label(s: &str) -> Label {
    let mut l = Label::new();
    let _ = l.push_str(s);
    l
}

fn text(s: &str) -> Text {
    let mut t = Text::new();
    let _ = t.push_str(s);
    t
}
