//! SyncMaster - Trigger Device Firmware
//!
//! Turns serial messages from the host into timed pulses on GPIO5, used to
//! timestamp events in an external recording system.
//!
//! Wiring (RP2040):
//! - UART0 TX = GPIO0, RX = GPIO1 (host link, 115200 8N1 by default)
//! - GPIO5 = sync output, active high

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, Config as RpUartConfig, Uart};
use embassy_time::Delay;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use syncmaster_core::{Device, DeviceError, PulseGenerator, StepResult};
use syncmaster_hal::UartConfig;
use syncmaster_hal_rp2040::{HostSerial, PulsePin};
use syncmaster_protocol::OUTPUT_PIN;

mod config;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("SyncMaster firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = config::load_config();

    // Host link
    let serial: UartConfig = config.serial.into();
    let mut uart_config = RpUartConfig::default();
    uart_config.baudrate = serial.baudrate;

    let tx_buf = TX_BUF.init([0u8; 64]);
    let rx_buf = RX_BUF.init([0u8; 256]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();
    let serial_link = HostSerial::new(tx, rx);

    info!("UART0 initialized at {} baud", serial.baudrate);

    // Sync output, held low until the first pulse
    let pin = PulsePin::new(Output::new(p.PIN_5, Level::Low));
    let pulses = PulseGenerator::new(pin, Delay);

    info!("Sync output on GPIO{}", OUTPUT_PIN);

    let mut device = Device::new(config, serial_link, pulses);

    info!("Waiting for host messages");
    device.run(log_step);
}

/// Log the outcome of one loop iteration
fn log_step(result: StepResult<HostSerial>) {
    match result {
        Ok(Some(dispatch)) if dispatch.is_ignored() => {
            debug!("Ignored message (value={})", dispatch.value);
        }
        Ok(Some(dispatch)) => {
            debug!(
                "Dispatched value={} pulses={} ({} ms) replies={}",
                dispatch.value, dispatch.pulses, dispatch.pulse_ms, dispatch.replies
            );
        }
        Ok(None) => {}
        Err(DeviceError::Receive(e)) => {
            warn!("UART receive error: {:?}", e);
        }
        Err(DeviceError::Transmit(e)) => {
            warn!("UART transmit error: {:?}", e);
        }
    }
}
