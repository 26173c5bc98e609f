use crate::core::transport::{Connector, Port};
use crate::domain::{
    config::{DataBits, FlowControlConfig, LinkSettings, ParityConfig, StopBits},
    error::{ChannelError, ChannelResult},
};
use serde::Serialize;
use serialport::{SerialPort, SerialPortType};
use std::io;
use std::time::Duration;
use tracing::debug;

/// Rate the device is opened at before the requested rate is applied
const OPEN_BAUD_RATE: u32 = 9600;

/// Opens OS serial devices through the `serialport` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemConnector;

impl Connector for SystemConnector {
    fn connect(&self, path: &str, settings: &LinkSettings) -> ChannelResult<Box<dyn Port>> {
        // The device is opened at a rate every driver accepts so that a
        // failure here means the device itself could not be acquired.
        let mut port = serialport::new(path, OPEN_BAUD_RATE)
            .data_bits(data_bits(settings.data_bits))
            .stop_bits(stop_bits(settings.stop_bits))
            .parity(parity(settings.parity))
            .flow_control(flow_control(settings.flow_control))
            .timeout(settings.timeout)
            .open()
            .map_err(|e| map_open_error(path, e))?;

        port.set_baud_rate(settings.baud_rate)
            .map_err(|e| map_baud_rate_error(path, settings.baud_rate, e))?;

        debug!("Opened {} with {:?}", path, settings);
        Ok(Box::new(port))
    }
}

impl Port for Box<dyn SerialPort> {
    fn set_read_timeout(&mut self, timeout: Duration) -> io::Result<()> {
        self.set_timeout(timeout).map_err(io::Error::from)
    }

    fn bytes_available(&self) -> io::Result<usize> {
        self.bytes_to_read()
            .map(|n| n as usize)
            .map_err(io::Error::from)
    }
}

/// Settings are validated before opening, so any open failure concerns the
/// device path itself.
fn map_open_error(path: &str, error: serialport::Error) -> ChannelError {
    ChannelError::unavailable(path, error)
}

fn map_baud_rate_error(path: &str, baud_rate: u32, error: serialport::Error) -> ChannelError {
    ChannelError::InvalidConfiguration(format!(
        "Baud rate {} rejected by driver for {}: {}",
        baud_rate, path, error
    ))
}

fn data_bits(bits: DataBits) -> serialport::DataBits {
    match bits {
        DataBits::Five => serialport::DataBits::Five,
        DataBits::Six => serialport::DataBits::Six,
        DataBits::Seven => serialport::DataBits::Seven,
        DataBits::Eight => serialport::DataBits::Eight,
    }
}

fn stop_bits(bits: StopBits) -> serialport::StopBits {
    match bits {
        StopBits::One => serialport::StopBits::One,
        StopBits::Two => serialport::StopBits::Two,
    }
}

fn parity(parity: ParityConfig) -> serialport::Parity {
    match parity {
        ParityConfig::None => serialport::Parity::None,
        ParityConfig::Even => serialport::Parity::Even,
        ParityConfig::Odd => serialport::Parity::Odd,
    }
}

fn flow_control(flow_control: FlowControlConfig) -> serialport::FlowControl {
    match flow_control {
        FlowControlConfig::None => serialport::FlowControl::None,
        FlowControlConfig::Software => serialport::FlowControl::Software,
        FlowControlConfig::Hardware => serialport::FlowControl::Hardware,
    }
}

/// A serial port reported by the operating system
#[derive(Debug, Clone, Serialize)]
pub struct PortSummary {
    pub name: String,
    pub kind: String,
    pub vid: Option<u16>,
    pub pid: Option<u16>,
    pub manufacturer: Option<String>,
    pub product: Option<String>,
    pub serial_number: Option<String>,
}

/// Enumerate the serial ports present on this machine
pub fn list_ports() -> ChannelResult<Vec<PortSummary>> {
    let ports = serialport::available_ports().map_err(|e| {
        ChannelError::Io(io::Error::new(
            io::ErrorKind::Other,
            format!("Failed to list serial ports: {}", e),
        ))
    })?;

    Ok(ports
        .into_iter()
        .map(|port| match port.port_type {
            SerialPortType::UsbPort(usb) => PortSummary {
                name: port.port_name,
                kind: "usb".to_string(),
                vid: Some(usb.vid),
                pid: Some(usb.pid),
                manufacturer: usb.manufacturer,
                product: usb.product,
                serial_number: usb.serial_number,
            },
            other => PortSummary {
                name: port.port_name,
                kind: match other {
                    SerialPortType::PciPort => "pci",
                    SerialPortType::BluetoothPort => "bluetooth",
                    _ => "unknown",
                }
                .to_string(),
                vid: None,
                pid: None,
                manufacturer: None,
                product: None,
                serial_number: None,
            },
        })
        .collect())
}
