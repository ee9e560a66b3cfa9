//! SyncMaster Hardware Abstraction Layer
//!
//! This crate defines the hardware traits the device logic is written
//! against. Chip-specific HALs (currently RP2040) implement them, so the
//! framing and pulse logic can be exercised on the host with mock types.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  syncmaster-core (device loop, pulses)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  syncmaster-hal (this crate - traits)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │ syncmaster-   │
//!             │  hal-rp2040   │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`] - Digital output (the sync pulse line)
//! - [`uart::UartTx`], [`uart::UartRx`] - Serial link to the host

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod uart;

pub use gpio::OutputPin;
pub use uart::{UartConfig, UartRx, UartTx};
