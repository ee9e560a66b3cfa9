//! Configuration loading
//!
//! The device configuration is compiled into the firmware from
//! `device.toml` and parsed at boot by the no_std parser in
//! `syncmaster-core`.

pub mod loader;

pub use loader::load_config;
