//! Message values understood by the device
//!
//! The symbolic set is used with terminated framing, the scaled values and
//! the greeting with delimited framing.

// Symbolic command codes (terminated framing)
pub const CMD_START: i32 = 1;
pub const CMD_END: i32 = 2;
pub const CMD_EVENT1: i32 = 3;
pub const CMD_EVENT2: i32 = 4;
pub const CMD_HOST_PING: i32 = 5;

/// Reply to [`CMD_HOST_PING`], lets host drivers identify the device
pub const ACKNOWLEDGE: &str = "42";

/// Line terminator for terminated framing
pub const TERMINATOR: u8 = b'\n';

/// Opening marker for delimited framing
pub const START_MARKER: u8 = b'<';

/// Closing marker for delimited framing
pub const END_MARKER: u8 = b'>';

/// Scaled mode: pulse width per unit of the received value
pub const PULSE_STEP_MS: u32 = 10;

/// Scaled mode: longest pulse the device will produce
pub const MAX_PULSE_MS: u32 = 1000;

/// Identification text sent by the host in delimited framing
pub const GREETING: &str = "best wishes";

/// Device answer to [`GREETING`]
pub const RESPONSE: &str = "warmest regards";
