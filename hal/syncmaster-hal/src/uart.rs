//! UART serial communication abstractions
//!
//! Provides blocking traits for the serial link to the host. The device
//! loop only ever needs "wait for a byte", "read a byte" and "write a line",
//! so the traits are kept to that shape.

/// Line ending appended by [`UartTx::write_line`]
pub const LINE_ENDING: &[u8] = b"\r\n";

/// UART transmitter
pub trait UartTx {
    /// Error type for transmit operations
    type Error;

    /// Write data to the UART
    ///
    /// Blocks until all data has been written or an error occurs.
    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Flush any buffered data
    fn flush(&mut self) -> Result<(), Self::Error>;

    /// Write a line of text followed by CR LF
    fn write_line(&mut self, text: &str) -> Result<(), Self::Error> {
        self.write_blocking(text.as_bytes())?;
        self.write_blocking(LINE_ENDING)?;
        self.flush()
    }
}

/// UART receiver
pub trait UartRx {
    /// Error type for receive operations
    type Error;

    /// Check whether at least one byte can be read without blocking
    fn byte_available(&mut self) -> Result<bool, Self::Error>;

    /// Read a single byte from the UART
    ///
    /// Blocks until a byte arrives.
    fn read_byte(&mut self) -> Result<u8, Self::Error>;

    /// Block until a byte is available
    ///
    /// The default busy-polls [`UartRx::byte_available`] with no backoff.
    /// Interrupt-driven implementations may override this.
    fn wait_for_byte(&mut self) -> Result<(), Self::Error> {
        while !self.byte_available()? {}
        Ok(())
    }
}

/// UART configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
}

/// Default host link speed
pub const DEFAULT_BAUDRATE: u32 = 115_200;

impl Default for UartConfig {
    fn default() -> Self {
        Self {
            baudrate: DEFAULT_BAUDRATE,
        }
    }
}
