//! SyncMaster Host Protocol
//!
//! This crate defines the ASCII serial protocol between a host computer
//! running an experiment and the SyncMaster trigger device. The host
//! sends short text messages; the device answers each recognised message
//! with a timed pulse on its output pin and, for some messages, a reply
//! line.
//!
//! # Protocol Overview
//!
//! Two framings are supported and selected by [`FramingMode`]:
//!
//! ```text
//! Terminated:  ┌────────────────┬────┐
//!              │ ASCII payload  │ \n │      e.g. "1\n"  -> start pulse
//!              └────────────────┴────┘
//!
//! Delimited:   ┌───┬────────────────┬───┐
//!              │ < │ ASCII payload  │ > │   e.g. "<50>" -> 500 ms pulse
//!              └───┴────────────────┴───┘
//! ```
//!
//! Payloads hold at most [`MAX_PAYLOAD_SIZE`] bytes; longer input is
//! truncated by the receiver, never overrun.

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]

pub mod events;
pub mod frame;
pub mod message;
pub mod messages;

pub use events::EventKind;
pub use frame::{
    encode, encode_to_vec, encode_value, FrameError, FrameState, Framer, FramingMode,
    MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE, MESSAGE_CAPACITY,
};
pub use message::Message;

/// Digital output carrying the sync pulse
pub const OUTPUT_PIN: u8 = 5;

/// Host link speed in bits per second
pub const BAUDRATE: u32 = 115_200;
