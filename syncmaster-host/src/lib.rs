//! Host-side support for the SyncMaster trigger device
//!
//! - [`SyncMaster`]: finds the device on a serial port and sends events
//! - [`HostProtocol`]: the message set the host speaks, matching the
//!   device's configuration
//! - [`analysis`]: recovers events from a recorded copy of the sync line

pub mod analysis;
pub mod device;
pub mod error;
pub mod protocol;

pub use analysis::{detect_events, DetectedEvent};
pub use device::{list_ports, PortInfo, SyncMaster};
pub use error::HostError;
pub use protocol::HostProtocol;
pub use syncmaster_protocol::EventKind;
