use crate::domain::error::{ChannelError, ChannelResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// serlink configuration file contents
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global configuration
    #[serde(default)]
    pub global: GlobalConfig,
    /// Device profiles
    #[serde(default)]
    pub devices: Vec<DeviceProfile>,
}

/// Global configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Default log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Default read timeout in milliseconds
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,
}

/// A named serial device and the settings used to open it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceProfile {
    /// Profile name
    pub name: String,
    /// Profile description
    #[serde(default)]
    pub description: String,
    /// OS device path
    pub path: String,
    /// Line settings
    #[serde(flatten)]
    pub config: ChannelConfig,
}

/// Channel configuration as supplied by a caller.
///
/// Values are kept in their raw form and checked by [`ChannelConfig::validate`]
/// when a channel is opened, so a bad value is reported as
/// `InvalidConfiguration` rather than rejected at parse time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub baud_rate: i64,
    #[serde(default = "default_data_bits")]
    pub data_bits: u8,
    #[serde(default = "default_stop_bits")]
    pub stop_bits: u8,
    #[serde(default)]
    pub parity: ParityConfig,
    #[serde(default)]
    pub flow_control: FlowControlConfig,
    /// Read timeout in milliseconds
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,
}

/// Parity configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParityConfig {
    #[default]
    None,
    Odd,
    Even,
}

/// Flow control configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowControlConfig {
    #[default]
    None,
    Hardware,
    Software,
}

/// Number of data bits per character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataBits {
    Five,
    Six,
    Seven,
    Eight,
}

/// Number of stop bits per character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopBits {
    One,
    Two,
}

/// Line settings that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSettings {
    pub baud_rate: u32,
    pub data_bits: DataBits,
    pub stop_bits: StopBits,
    pub parity: ParityConfig,
    pub flow_control: FlowControlConfig,
    pub timeout: Duration,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_timeout() -> u64 {
    1000
}

fn default_data_bits() -> u8 {
    8
}

fn default_stop_bits() -> u8 {
    1
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            timeout_ms: default_timeout(),
        }
    }
}

impl ChannelConfig {
    /// 8N1, no flow control, default timeout
    pub fn new(baud_rate: i64) -> Self {
        Self {
            baud_rate,
            data_bits: default_data_bits(),
            stop_bits: default_stop_bits(),
            parity: ParityConfig::None,
            flow_control: FlowControlConfig::None,
            timeout_ms: default_timeout(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = timeout.as_millis().min(u64::MAX as u128) as u64;
        self
    }

    pub fn with_parity(mut self, parity: ParityConfig) -> Self {
        self.parity = parity;
        self
    }

    pub fn with_flow_control(mut self, flow_control: FlowControlConfig) -> Self {
        self.flow_control = flow_control;
        self
    }

    /// Check every option and produce the settings handed to a connector
    pub fn validate(&self) -> ChannelResult<LinkSettings> {
        let baud_rate = u32::try_from(self.baud_rate)
            .ok()
            .filter(|rate| *rate > 0)
            .ok_or_else(|| {
                ChannelError::InvalidConfiguration(format!(
                    "Unsupported baud rate: {}",
                    self.baud_rate
                ))
            })?;

        let data_bits = match self.data_bits {
            5 => DataBits::Five,
            6 => DataBits::Six,
            7 => DataBits::Seven,
            8 => DataBits::Eight,
            other => {
                return Err(ChannelError::InvalidConfiguration(format!(
                    "Invalid data bits: {}",
                    other
                )))
            }
        };

        let stop_bits = match self.stop_bits {
            1 => StopBits::One,
            2 => StopBits::Two,
            other => {
                return Err(ChannelError::InvalidConfiguration(format!(
                    "Invalid stop bits: {}",
                    other
                )))
            }
        };

        if self.timeout_ms == 0 {
            return Err(ChannelError::InvalidConfiguration(
                "Read timeout must be greater than zero".to_string(),
            ));
        }

        Ok(LinkSettings {
            baud_rate,
            data_bits,
            stop_bits,
            parity: self.parity,
            flow_control: self.flow_control,
            timeout: Duration::from_millis(self.timeout_ms),
        })
    }
}

impl AppConfig {
    /// Look up a device profile by name
    pub fn device(&self, name: &str) -> Option<&DeviceProfile> {
        self.devices.iter().find(|device| device.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(deserialized.global.log_level, "info");
        assert!(deserialized.devices.is_empty());
    }

    #[test]
    fn test_device_profile_defaults() {
        let toml_str = r#"
            [[devices]]
            name = "switch"
            path = "/dev/ttyS2"
            baud_rate = 57600
        "#;

        let config: AppConfig = toml::from_str(toml_str).unwrap();
        let device = config.device("switch").unwrap();
        assert_eq!(device.path, "/dev/ttyS2");
        assert_eq!(device.config, ChannelConfig::new(57600));
        assert_eq!(config.global.timeout_ms, 1000);
    }

    #[test]
    fn test_validate_defaults() {
        let settings = ChannelConfig::new(9600).validate().unwrap();
        assert_eq!(settings.baud_rate, 9600);
        assert_eq!(settings.data_bits, DataBits::Eight);
        assert_eq!(settings.stop_bits, StopBits::One);
        assert_eq!(settings.timeout, Duration::from_millis(1000));
    }

    #[test]
    fn test_validate_rejects_bad_baud_rates() {
        for rate in [-9600, -1, 0, i64::from(u32::MAX) + 1] {
            let result = ChannelConfig::new(rate).validate();
            assert!(
                matches!(result, Err(ChannelError::InvalidConfiguration(_))),
                "baud rate {} should be rejected",
                rate
            );
        }
    }

    #[test]
    fn test_validate_rejects_bad_framing() {
        let mut config = ChannelConfig::new(9600);
        config.data_bits = 9;
        assert!(matches!(config.validate(), Err(ChannelError::InvalidConfiguration(_))));

        let mut config = ChannelConfig::new(9600);
        config.stop_bits = 3;
        assert!(matches!(config.validate(), Err(ChannelError::InvalidConfiguration(_))));

        let mut config = ChannelConfig::new(9600);
        config.timeout_ms = 0;
        assert!(matches!(config.validate(), Err(ChannelError::InvalidConfiguration(_))));
    }
}
