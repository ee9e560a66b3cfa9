//! Simple TOML parser for device configuration
//!
//! This is a minimal line-based TOML parser that handles only the subset
//! needed for SyncMaster configuration. It does NOT support the full TOML
//! language, and it does not allocate.
//!
//! Supported features:
//! - Key = value pairs (string, integer, boolean)
//! - [section] headers
//! - [section.name] headers for command and literal entries
//! - Basic strings (`"..."`) with the escapes `\n`, `\r`, `\t`, `\\`, `\"`
//! - Literal strings (`'...'`), taken as written
//! - Comments (# ...), whole-line or trailing, including after headers
//!
//! Example:
//! ```toml
//! [framing]
//! mode = "delimited"
//! start = "<"
//! end = ">"
//!
//! [numeric]
//! step_ms = 10
//! max_ms = 1000
//!
//! [literal.greeting]
//! text = "best wishes"
//! reply = "warmest regards"
//! ```

use syncmaster_protocol::messages::{END_MARKER, START_MARKER, TERMINATOR};
use syncmaster_protocol::FramingMode;

use super::types::{
    CommandEntry, DeviceConfig, InterpreterConfig, Label, LiteralReply, NumericMode,
    SerialConfig, Text,
};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Invalid section header
    InvalidSection,
    /// Invalid value type
    InvalidValue,
    /// Key not valid in the current section
    UnknownKey,
    /// Entry is missing a required key
    MissingField,
    /// Too many items (exceeded heapless capacity)
    TooManyItems,
}

/// Current parsing context
#[derive(Debug, Clone)]
enum Section {
    Root,
    Serial,
    Framing,
    Numeric,
    Command(Label),
    Literal(Label),
}

/// Framing keys collected before the mode is known
#[derive(Debug, Default)]
struct FramingDraft {
    mode: Option<Mode>,
    terminator: Option<u8>,
    start: Option<u8>,
    end: Option<u8>,
}

#[derive(Debug, Clone, Copy)]
enum Mode {
    Terminated,
    Delimited,
}

#[derive(Debug, Default)]
struct NumericDraft {
    enabled: Option<bool>,
    step_ms: Option<u32>,
    max_ms: Option<u32>,
}

#[derive(Debug, Default)]
struct CommandDraft {
    code: Option<i32>,
    pulse_ms: Option<u32>,
    reply: Option<Text>,
}

#[derive(Debug, Default)]
struct LiteralDraft {
    text: Option<Text>,
    reply: Option<Text>,
}

/// Parser state carried across lines
#[derive(Default)]
struct Builder {
    serial: SerialConfig,
    framing: FramingDraft,
    numeric: NumericDraft,
    interpreter: InterpreterConfig,
    command: CommandDraft,
    literal: LiteralDraft,
}

/// Parse TOML configuration into DeviceConfig
///
/// Sections that are absent keep their defaults: 115200 baud, delimited
/// framing, numeric mode off, empty tables.
pub fn parse_config(input: &str) -> Result<DeviceConfig, ParseError> {
    let mut builder = Builder::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = strip_comment(line.trim());

        // Skip empty lines and comments
        if line.is_empty() {
            continue;
        }

        // Check for section header
        if line.starts_with('[') && line.ends_with(']') {
            builder.save_section(&section)?;
            section = parse_section_header(&line[1..line.len() - 1])?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ParseError::InvalidValue)?;
        builder.apply_value(&section, key, value)?;
    }

    builder.save_section(&section)?;
    builder.finish()
}

impl Builder {
    fn apply_value(&mut self, section: &Section, key: &str, value: &str) -> Result<(), ParseError> {
        match section {
            Section::Root => Err(ParseError::UnknownKey),
            Section::Serial => match key {
                "baudrate" => {
                    self.serial.baudrate = parse_int(value)?;
                    Ok(())
                }
                _ => Err(ParseError::UnknownKey),
            },
            Section::Framing => {
                match key {
                    "mode" => {
                        self.framing.mode = Some(match parse_text(value)?.as_str() {
                            "terminated" => Mode::Terminated,
                            "delimited" => Mode::Delimited,
                            _ => return Err(ParseError::InvalidValue),
                        })
                    }
                    "terminator" => self.framing.terminator = Some(parse_byte(value)?),
                    "start" => self.framing.start = Some(parse_byte(value)?),
                    "end" => self.framing.end = Some(parse_byte(value)?),
                    _ => return Err(ParseError::UnknownKey),
                }
                Ok(())
            }
            Section::Numeric => {
                match key {
                    "enabled" => self.numeric.enabled = Some(parse_bool(value)?),
                    "step_ms" => self.numeric.step_ms = Some(parse_int(value)?),
                    "max_ms" => self.numeric.max_ms = Some(parse_int(value)?),
                    _ => return Err(ParseError::UnknownKey),
                }
                Ok(())
            }
            Section::Command(_) => {
                match key {
                    "code" => self.command.code = Some(parse_int(value)?),
                    "pulse_ms" => self.command.pulse_ms = Some(parse_int(value)?),
                    "reply" => self.command.reply = Some(parse_text(value)?),
                    _ => return Err(ParseError::UnknownKey),
                }
                Ok(())
            }
            Section::Literal(_) => {
                match key {
                    "text" => self.literal.text = Some(parse_text(value)?),
                    "reply" => self.literal.reply = Some(parse_text(value)?),
                    _ => return Err(ParseError::UnknownKey),
                }
                Ok(())
            }
        }
    }

    /// Move a finished named entry into the interpreter tables
    fn save_section(&mut self, section: &Section) -> Result<(), ParseError> {
        match section {
            Section::Command(name) => {
                let draft = core::mem::take(&mut self.command);
                let entry = CommandEntry {
                    name: name.clone(),
                    code: draft.code.ok_or(ParseError::MissingField)?,
                    pulse_ms: draft.pulse_ms,
                    reply: draft.reply,
                };
                self.interpreter
                    .commands
                    .push(entry)
                    .map_err(|_| ParseError::TooManyItems)
            }
            Section::Literal(name) => {
                let draft = core::mem::take(&mut self.literal);
                let entry = LiteralReply {
                    name: name.clone(),
                    text: draft.text.ok_or(ParseError::MissingField)?,
                    reply: draft.reply.ok_or(ParseError::MissingField)?,
                };
                self.interpreter
                    .literals
                    .push(entry)
                    .map_err(|_| ParseError::TooManyItems)
            }
            _ => Ok(()),
        }
    }

    fn finish(mut self) -> Result<DeviceConfig, ParseError> {
        let framing = match self.framing.mode.unwrap_or(Mode::Delimited) {
            Mode::Terminated => FramingMode::Terminated {
                terminator: self.framing.terminator.unwrap_or(TERMINATOR),
            },
            Mode::Delimited => FramingMode::Delimited {
                start: self.framing.start.unwrap_or(START_MARKER),
                end: self.framing.end.unwrap_or(END_MARKER),
            },
        };

        // A [numeric] section with both values enables scaling unless disabled
        let numeric = match (self.numeric.step_ms, self.numeric.max_ms) {
            (Some(step_ms), Some(max_ms)) if self.numeric.enabled != Some(false) => {
                NumericMode::Scaled { step_ms, max_ms }
            }
            (None, None) if self.numeric.enabled != Some(true) => NumericMode::Off,
            _ if self.numeric.enabled == Some(false) => NumericMode::Off,
            _ => return Err(ParseError::MissingField),
        };
        self.interpreter.numeric = numeric;

        Ok(DeviceConfig {
            serial: self.serial,
            framing,
            interpreter: self.interpreter,
        })
    }
}

/// Parse section header like "framing", "command.start" or "literal.greeting"
fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    let header = header.trim();

    if let Some((section_type, name)) = header.split_once('.') {
        let name = Label::try_from(name.trim()).map_err(|_| ParseError::InvalidSection)?;
        if name.is_empty() {
            return Err(ParseError::InvalidSection);
        }

        return match section_type.trim() {
            "command" => Ok(Section::Command(name)),
            "literal" => Ok(Section::Literal(name)),
            _ => Err(ParseError::InvalidSection),
        };
    }

    match header {
        "serial" => Ok(Section::Serial),
        "framing" => Ok(Section::Framing),
        "numeric" => Ok(Section::Numeric),
        _ => Err(ParseError::InvalidSection),
    }
}

/// Parse "key = value" line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Drop a trailing `# comment`, ignoring `#` inside quoted strings
fn strip_comment(line: &str) -> &str {
    let mut quote: Option<u8> = None;
    let mut escaped = false;

    for (i, b) in line.bytes().enumerate() {
        match quote {
            Some(b'"') if escaped => escaped = false,
            Some(b'"') if b == b'\\' => escaped = true,
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None if b == b'#' => return line[..i].trim_end(),
            None => {}
        }
    }
    line
}

/// Parse a quoted string into bounded text
///
/// Basic strings (`"..."`) understand `\n`, `\r`, `\t`, `\\` and `\"`.
/// Literal strings (`'...'`) are taken as written. Bare words are not
/// strings.
fn parse_text(value: &str) -> Result<Text, ParseError> {
    let bytes = value.as_bytes();
    if bytes.len() < 2 {
        return Err(ParseError::InvalidValue);
    }
    let inner = &value[1..value.len() - 1];

    match (bytes[0], bytes[bytes.len() - 1]) {
        (b'\'', b'\'') if !inner.contains('\'') => {
            Text::try_from(inner).map_err(|_| ParseError::TooManyItems)
        }
        (b'"', b'"') => unescape(inner),
        _ => Err(ParseError::InvalidValue),
    }
}

/// Resolve escapes in the body of a basic string
fn unescape(inner: &str) -> Result<Text, ParseError> {
    let mut text = Text::new();
    let mut chars = inner.chars();

    while let Some(c) = chars.next() {
        let c = match c {
            '\\' => match chars.next() {
                Some('n') => '\n',
                Some('r') => '\r',
                Some('t') => '\t',
                Some('\\') => '\\',
                Some('"') => '"',
                _ => return Err(ParseError::InvalidValue),
            },
            // Unescaped quote ends the string early
            '"' => return Err(ParseError::InvalidValue),
            c => c,
        };
        text.push(c).map_err(|_| ParseError::TooManyItems)?;
    }
    Ok(text)
}

/// Parse an integer value
fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidValue)
}

/// Parse a boolean value
fn parse_bool(value: &str) -> Result<bool, ParseError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseError::InvalidValue),
    }
}

/// Parse a framing byte: `"<"`, `"\n"` or a number like `10`
fn parse_byte(value: &str) -> Result<u8, ParseError> {
    if !value.starts_with('"') && !value.starts_with('\'') {
        return parse_int(value);
    }

    match parse_text(value)?.as_bytes() {
        [b] if b.is_ascii() => Ok(*b),
        _ => Err(ParseError::InvalidValue),
    }
}
