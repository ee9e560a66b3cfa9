//! Embedded configuration loader
//!
//! Parses the embedded `device.toml`. A file that fails to parse falls
//! back to the marker-pair preset so the device still answers the host.

use defmt::*;

use syncmaster_core::config::{parse_config, DeviceConfig, NumericMode};
use syncmaster_protocol::FramingMode;

/// Embedded default configuration (compiled into firmware)
/// Edit device.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../../device.toml");

/// Load the embedded configuration
pub fn load_config() -> DeviceConfig {
    let config = match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!("Loaded configuration from device.toml");
            config
        }
        Err(e) => {
            error!("device.toml rejected: {:?}, using scaled preset", e);
            DeviceConfig::scaled()
        }
    };

    log_summary(&config);
    config
}

fn log_summary(config: &DeviceConfig) {
    match config.framing {
        FramingMode::Terminated { terminator } => {
            info!("Framing: terminated by {=u8:#x}", terminator);
        }
        FramingMode::Delimited { start, end } => {
            info!("Framing: delimited {=u8:#x}..{=u8:#x}", start, end);
        }
    }

    match config.interpreter.numeric {
        NumericMode::Scaled { step_ms, max_ms } => {
            info!("Numeric: {} ms per unit, max {} ms", step_ms, max_ms);
        }
        NumericMode::Off => info!("Numeric: off"),
    }

    for entry in config.interpreter.commands.iter() {
        debug!(
            "Command {}: code={} pulse={:?} ms",
            entry.name.as_str(),
            entry.code,
            entry.pulse_ms
        );
    }
    for literal in config.interpreter.literals.iter() {
        debug!("Literal {}", literal.name.as_str());
    }
}
