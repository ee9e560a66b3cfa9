//! Board-agnostic core logic for the SyncMaster trigger device
//!
//! This crate contains everything between the serial byte stream and the
//! output pin that does not depend on a specific chip:
//!
//! - Message interpreter (command table, scaled pulses, text replies)
//! - Pulse generator (timed active-high output)
//! - Device loop (framer → interpreter → pulse/reply)
//! - Configuration types and the embedded TOML parser

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod device;
pub mod interpreter;
pub mod pulse;

pub use config::DeviceConfig;
pub use device::{Device, DeviceError, Dispatch, LoopState, StepResult};
pub use interpreter::{Action, Actions, Interpreter};
pub use pulse::PulseGenerator;
