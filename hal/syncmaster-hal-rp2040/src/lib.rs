//! RP2040-specific HAL for the trigger device
//!
//! Implements the shared `syncmaster-hal` traits on top of `embassy-rp`:
//!
//! - Push-pull sync output pin
//! - Interrupt-buffered UART link to the host

#![no_std]

pub mod gpio;
pub mod uart;

pub use gpio::PulsePin;
pub use uart::{HostSerial, UartBusError};
