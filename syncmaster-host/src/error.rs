//! Host error types

use syncmaster_protocol::FrameError;
use thiserror::Error;

/// Errors from talking to the device
#[derive(Error, Debug)]
pub enum HostError {
    #[error("SyncMaster device not found")]
    DeviceNotFound,

    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot frame message: {0}")]
    Frame(#[from] FrameError),

    #[error("Unexpected reply: expected '{expected}', got '{actual}'")]
    UnexpectedReply { expected: String, actual: String },
}
