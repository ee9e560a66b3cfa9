//! Buffered UART link to the host
//!
//! Wraps the two halves of an `embassy-rp` buffered UART. The interrupt
//! handler fills the RX ring buffer, so bytes that arrive while a pulse is
//! being held are kept until the loop gets back to reading.

use embassy_rp::uart::{BufferedUartRx, BufferedUartTx, Error as UartError};
use embedded_io::{Read, ReadReady, Write};
use syncmaster_hal::{UartRx, UartTx};

/// Error from UART operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UartBusError {
    /// RX FIFO overrun, bytes were lost
    Overrun,
    /// Line held low for longer than a frame
    Break,
    /// Parity error
    Parity,
    /// Framing error (wrong baud rate?)
    Framing,
    /// Read returned no data
    Empty,
    /// Other error
    Other,
}

impl From<UartError> for UartBusError {
    fn from(e: UartError) -> Self {
        match e {
            UartError::Overrun => UartBusError::Overrun,
            UartError::Break => UartBusError::Break,
            UartError::Parity => UartBusError::Parity,
            UartError::Framing => UartBusError::Framing,
            _ => UartBusError::Other,
        }
    }
}

/// Host serial link
pub struct HostSerial {
    tx: BufferedUartTx,
    rx: BufferedUartRx,
}

impl HostSerial {
    /// Create from the halves returned by `BufferedUart::split`
    pub fn new(tx: BufferedUartTx, rx: BufferedUartRx) -> Self {
        Self { tx, rx }
    }
}

impl UartTx for HostSerial {
    type Error = UartBusError;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.tx.write_all(data).map_err(UartBusError::from)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Write::flush(&mut self.tx).map_err(UartBusError::from)
    }
}

impl UartRx for HostSerial {
    type Error = UartBusError;

    fn byte_available(&mut self) -> Result<bool, Self::Error> {
        self.rx.read_ready().map_err(UartBusError::from)
    }

    fn read_byte(&mut self) -> Result<u8, Self::Error> {
        let mut byte = [0u8; 1];
        match self.rx.read(&mut byte)? {
            0 => Err(UartBusError::Empty),
            _ => Ok(byte[0]),
        }
    }
}
