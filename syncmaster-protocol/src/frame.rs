//! Message framing for the host serial link
//!
//! Framing modes:
//! - Terminated: every byte is message content until the terminator byte.
//!   There is no start condition; a new message begins right after the
//!   previous terminator.
//! - Delimited: bytes are discarded until the start marker, then content
//!   is collected until the end marker.
//!
//! The receive buffer holds [`MESSAGE_CAPACITY`] bytes. The write cursor
//! never passes the last slot: once the buffer is full each further byte
//! overwrites that slot, and the closing sentinel overwrites it again, so
//! a completed message carries at most [`MAX_PAYLOAD_SIZE`] bytes.

use core::fmt::Write as _;

use heapless::{String, Vec};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::message::Message;
use crate::messages::{END_MARKER, START_MARKER, TERMINATOR};

/// Receive buffer size in bytes (content plus sentinel)
pub const MESSAGE_CAPACITY: usize = 32;

/// Longest content a completed message can carry
pub const MAX_PAYLOAD_SIZE: usize = MESSAGE_CAPACITY - 1;

/// Longest encoded message (markers plus payload)
pub const MAX_FRAME_SIZE: usize = MAX_PAYLOAD_SIZE + 2;

/// Sentinel written after the content of a completed message
const SENTINEL: u8 = 0;

/// Errors that can occur while encoding a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Payload would be truncated by the receiver
    PayloadTooLarge,
    /// Payload contains the byte that closes a message
    PayloadContainsMarker,
    /// Buffer too small for encoding
    BufferTooSmall,
}

impl core::fmt::Display for FrameError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FrameError::PayloadTooLarge => {
                write!(f, "payload longer than {} bytes", MAX_PAYLOAD_SIZE)
            }
            FrameError::PayloadContainsMarker => write!(f, "payload contains the closing marker"),
            FrameError::BufferTooSmall => write!(f, "buffer too small"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FrameError {}

/// How message boundaries are recognised
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FramingMode {
    /// Content then a single terminator byte
    Terminated { terminator: u8 },
    /// Start marker, content, end marker
    Delimited { start: u8, end: u8 },
}

impl FramingMode {
    /// Newline-terminated framing
    pub const fn terminated() -> Self {
        FramingMode::Terminated {
            terminator: TERMINATOR,
        }
    }

    /// `<...>` framing
    pub const fn delimited() -> Self {
        FramingMode::Delimited {
            start: START_MARKER,
            end: END_MARKER,
        }
    }

    /// Byte that completes a message
    pub fn closing_byte(&self) -> u8 {
        match *self {
            FramingMode::Terminated { terminator } => terminator,
            FramingMode::Delimited { end, .. } => end,
        }
    }
}

impl Default for FramingMode {
    fn default() -> Self {
        Self::delimited()
    }
}

/// Framer receive state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameState {
    /// Between messages
    Idle,
    /// Collecting message content
    Receiving,
}

/// Byte-at-a-time message framer
#[derive(Debug, Clone)]
pub struct Framer {
    mode: FramingMode,
    state: FrameState,
    buffer: [u8; MESSAGE_CAPACITY],
    /// Next write position, always below `MESSAGE_CAPACITY`
    cursor: usize,
    /// Content length of the most recently completed message
    completed_len: usize,
}

impl Framer {
    /// Create a new framer
    pub fn new(mode: FramingMode) -> Self {
        Self {
            mode,
            state: FrameState::Idle,
            buffer: [0; MESSAGE_CAPACITY],
            cursor: 0,
            completed_len: 0,
        }
    }

    /// Framing mode in use
    pub fn mode(&self) -> FramingMode {
        self.mode
    }

    /// Current receive state
    pub fn state(&self) -> FrameState {
        self.state
    }

    /// Current write cursor
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Raw receive buffer, including any partial content
    pub fn buffer(&self) -> &[u8; MESSAGE_CAPACITY] {
        &self.buffer
    }

    /// Drop any partial message and return to idle
    pub fn reset(&mut self) {
        self.state = FrameState::Idle;
        self.cursor = 0;
        self.completed_len = 0;
    }

    /// Feed a single byte to the framer
    ///
    /// Returns the completed message when `byte` closes one. The message
    /// borrows the framer's buffer and stays valid until the next byte.
    pub fn feed(&mut self, byte: u8) -> Option<Message<'_>> {
        if self.accept(byte) {
            Some(self.completed())
        } else {
            None
        }
    }

    /// Feed multiple bytes to the framer
    ///
    /// Returns the first completed message, if any.
    /// Remaining bytes after a complete message are not consumed.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Option<Message<'_>> {
        for &byte in bytes {
            if self.accept(byte) {
                return Some(self.completed());
            }
        }
        None
    }

    fn completed(&self) -> Message<'_> {
        Message::new(&self.buffer[..self.completed_len])
    }

    /// Advance the state machine, returns true when a message completed
    fn accept(&mut self, byte: u8) -> bool {
        match (self.mode, self.state) {
            (FramingMode::Delimited { start, .. }, FrameState::Idle) => {
                if byte == start {
                    self.cursor = 0;
                    self.state = FrameState::Receiving;
                }
                // Anything else between messages is noise
                false
            }
            (FramingMode::Terminated { .. }, FrameState::Idle) => {
                self.cursor = 0;
                self.state = FrameState::Receiving;
                self.receive(byte)
            }
            (_, FrameState::Receiving) => self.receive(byte),
        }
    }

    fn receive(&mut self, byte: u8) -> bool {
        if byte == self.mode.closing_byte() {
            self.buffer[self.cursor] = SENTINEL;
            self.completed_len = self.cursor;
            self.cursor = 0;
            self.state = FrameState::Idle;
            return true;
        }

        self.buffer[self.cursor] = byte;
        self.cursor += 1;
        if self.cursor >= MESSAGE_CAPACITY {
            self.cursor = MESSAGE_CAPACITY - 1;
        }
        false
    }
}

/// Encode a payload into its wire form
///
/// Returns the number of bytes written.
pub fn encode(mode: FramingMode, payload: &[u8], buffer: &mut [u8]) -> Result<usize, FrameError> {
    if payload.len() > MAX_PAYLOAD_SIZE {
        return Err(FrameError::PayloadTooLarge);
    }
    if payload.contains(&mode.closing_byte()) {
        return Err(FrameError::PayloadContainsMarker);
    }

    match mode {
        FramingMode::Terminated { terminator } => {
            let frame_len = payload.len() + 1;
            if buffer.len() < frame_len {
                return Err(FrameError::BufferTooSmall);
            }
            buffer[..payload.len()].copy_from_slice(payload);
            buffer[payload.len()] = terminator;
            Ok(frame_len)
        }
        FramingMode::Delimited { start, end } => {
            let frame_len = payload.len() + 2;
            if buffer.len() < frame_len {
                return Err(FrameError::BufferTooSmall);
            }
            buffer[0] = start;
            buffer[1..1 + payload.len()].copy_from_slice(payload);
            buffer[1 + payload.len()] = end;
            Ok(frame_len)
        }
    }
}

/// Encode a payload into a heapless Vec
pub fn encode_to_vec(
    mode: FramingMode,
    payload: &[u8],
) -> Result<Vec<u8, MAX_FRAME_SIZE>, FrameError> {
    let mut buffer = [0u8; MAX_FRAME_SIZE];
    let len = encode(mode, payload, &mut buffer)?;
    let mut vec = Vec::new();
    vec.extend_from_slice(&buffer[..len])
        .map_err(|_| FrameError::BufferTooSmall)?;
    Ok(vec)
}

/// Encode a decimal value, e.g. `50` as `<50>`
pub fn encode_value(mode: FramingMode, value: i32) -> Result<Vec<u8, MAX_FRAME_SIZE>, FrameError> {
    let mut text: String<12> = String::new();
    write!(text, "{}", value).map_err(|_| FrameError::BufferTooSmall)?;
    encode_to_vec(mode, text.as_bytes())
}
