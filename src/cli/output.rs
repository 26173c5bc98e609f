use crate::cli::args::OutputFormat;
use crate::domain::config::{AppConfig, DeviceProfile};
use crate::infrastructure::serial::PortSummary;
use std::io;
use tabled::{Table, Tabled};

/// Output writer trait for different formats
pub trait OutputWriter {
    fn write_ports(&self, ports: &[PortSummary]) -> Result<(), OutputError>;
    fn write_config(&self, config: &AppConfig) -> Result<(), OutputError>;
    fn write_received(&self, path: &str, data: &[u8]) -> Result<(), OutputError>;
    fn write_message(&self, message: &str) -> Result<(), OutputError>;
    fn write_error(&self, error: &str) -> Result<(), OutputError>;
}

/// Output formatting errors
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

impl From<OutputError> for crate::domain::error::ChannelError {
    fn from(err: OutputError) -> Self {
        Self::Output(err.to_string())
    }
}

/// Console output writer
pub struct ConsoleWriter {
    format: OutputFormat,
}

impl ConsoleWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }
}

impl OutputWriter for ConsoleWriter {
    fn write_ports(&self, ports: &[PortSummary]) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Text => {
                if ports.is_empty() {
                    println!("No serial ports found");
                }
                for port in ports {
                    match (port.vid, port.pid) {
                        (Some(vid), Some(pid)) => {
                            println!("{} ({}, {:04x}:{:04x})", port.name, port.kind, vid, pid)
                        }
                        _ => println!("{} ({})", port.name, port.kind),
                    }
                }
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(ports)?);
            }
            OutputFormat::Table => {
                if !ports.is_empty() {
                    let rows: Vec<PortTableRow> = ports.iter().map(PortTableRow::from).collect();
                    println!("{}", Table::new(rows));
                }
            }
        }
        Ok(())
    }

    fn write_config(&self, config: &AppConfig) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Text => {
                println!("Global Configuration:");
                println!("  Log level: {}", config.global.log_level);
                println!("  Timeout: {}ms", config.global.timeout_ms);

                if !config.devices.is_empty() {
                    println!("  Devices:");
                    for device in &config.devices {
                        let desc = if device.description.is_empty() {
                            "No description"
                        } else {
                            &device.description
                        };
                        println!(
                            "    {}: {} @ {} baud ({})",
                            device.name, device.path, device.config.baud_rate, desc
                        );
                    }
                }
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(config)?);
            }
            OutputFormat::Table => {
                if !config.devices.is_empty() {
                    let rows: Vec<DeviceTableRow> =
                        config.devices.iter().map(DeviceTableRow::from).collect();
                    println!("{}", Table::new(rows));
                }
            }
        }
        Ok(())
    }

    fn write_received(&self, path: &str, data: &[u8]) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "port": path,
                    "length": data.len(),
                    "hex": hex::encode(data),
                    "bytes": data,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Text | OutputFormat::Table => {
                println!("Received {} bytes from {}: {}", data.len(), path, format_hex(data));
            }
        }
        Ok(())
    }

    fn write_message(&self, message: &str) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "message": message,
                    "level": "info"
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            _ => {
                println!("{}", message);
            }
        }
        Ok(())
    }

    fn write_error(&self, error: &str) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "error": error,
                    "level": "error"
                });
                eprintln!("{}", serde_json::to_string_pretty(&output)?);
            }
            _ => {
                eprintln!("Error: {}", error);
            }
        }
        Ok(())
    }
}

/// Space separated hex pairs, e.g. `80 80 10`
pub fn format_hex(data: &[u8]) -> String {
    data.iter()
        .map(|byte| format!("{:02x}", byte))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Table row for a serial port
#[derive(Tabled)]
struct PortTableRow {
    port: String,
    kind: String,
    usb_id: String,
    product: String,
}

impl From<&PortSummary> for PortTableRow {
    fn from(port: &PortSummary) -> Self {
        Self {
            port: port.name.clone(),
            kind: port.kind.clone(),
            usb_id: match (port.vid, port.pid) {
                (Some(vid), Some(pid)) => format!("{:04x}:{:04x}", vid, pid),
                _ => "-".to_string(),
            },
            product: port.product.clone().unwrap_or_else(|| "-".to_string()),
        }
    }
}

/// Table row for a device profile
#[derive(Tabled)]
struct DeviceTableRow {
    name: String,
    path: String,
    baud: i64,
    timeout_ms: u64,
    description: String,
}

impl From<&DeviceProfile> for DeviceTableRow {
    fn from(device: &DeviceProfile) -> Self {
        Self {
            name: device.name.clone(),
            path: device.path.clone(),
            baud: device.config.baud_rate,
            timeout_ms: device.config.timeout_ms,
            description: device.description.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_hex() {
        assert_eq!(format_hex(&[0x80, 0x80, 0x10]), "80 80 10");
        assert_eq!(format_hex(&[]), "");
    }

    #[test]
    fn test_port_row_without_usb_info() {
        let port = PortSummary {
            name: "/dev/ttyS2".to_string(),
            kind: "unknown".to_string(),
            vid: None,
            pid: None,
            manufacturer: None,
            product: None,
            serial_number: None,
        };
        let row = PortTableRow::from(&port);
        assert_eq!(row.usb_id, "-");
        assert_eq!(row.product, "-");
    }
}
