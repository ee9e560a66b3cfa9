//! Device configuration
//!
//! Configuration is compiled into the firmware as TOML and parsed at boot.
//! Two presets cover the historical protocols: [`DeviceConfig::symbolic`]
//! and [`DeviceConfig::scaled`].

pub mod toml;
pub mod types;

pub use toml::{parse_config, ParseError};
pub use types::*;
