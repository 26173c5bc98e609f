use crate::cli::args::{Args, Command, ConfigCommand, ReadArgs, SendArgs, TargetArgs};
use crate::cli::output::{ConsoleWriter, OutputWriter};
use crate::core::channel::SerialChannel;
use crate::core::payload::CommandBuffer;
use crate::domain::config::{AppConfig, ChannelConfig};
use crate::domain::error::{ChannelError, ChannelResult};
use crate::infrastructure::config::ConfigManager;
use crate::infrastructure::logging::init_logging;
use crate::infrastructure::serial::list_ports;
use std::time::Duration;
use tracing::debug;

const DEFAULT_BAUD_RATE: i64 = 9600;

/// Execute CLI command
pub fn execute_command(args: Args) -> ChannelResult<()> {
    let writer = ConsoleWriter::new(args.output);

    let config_manager = ConfigManager::new();
    let config = match &args.config {
        Some(path) => ConfigManager::load_config_from_path(path)?,
        None => config_manager.load_config()?,
    };

    if !args.quiet {
        init_logging(&config.global.log_level, args.verbose)?;
    }

    match args.command {
        Command::Ports => {
            let ports = list_ports()?;
            writer.write_ports(&ports)?;
            Ok(())
        }
        Command::Send(send_args) => execute_send(send_args, &writer, &config),
        Command::Read(read_args) => execute_read(read_args, &writer, &config),
        Command::Config(config_args) => match config_args.command {
            ConfigCommand::Show => {
                writer.write_config(&config)?;
                Ok(())
            }
            ConfigCommand::Init { path } => {
                let created = ConfigManager::init_project_config(&path)?;
                writer.write_message(&format!(
                    "Project configuration created: {}",
                    created.display()
                ))?;
                Ok(())
            }
            ConfigCommand::Path => {
                let describe = |path: Option<&std::path::Path>| {
                    path.map(|p| p.display().to_string())
                        .unwrap_or_else(|| "(none)".to_string())
                };
                let global = args
                    .config
                    .as_deref()
                    .or_else(|| config_manager.global_config_path());
                writer.write_message(&format!("Global: {}", describe(global)))?;
                writer.write_message(&format!(
                    "Project: {}",
                    describe(config_manager.project_config_path())
                ))?;
                Ok(())
            }
        },
        Command::Version => {
            writer.write_message(&format!("serlink {}", env!("CARGO_PKG_VERSION")))?;
            Ok(())
        }
    }
}

fn execute_send(args: SendArgs, writer: &ConsoleWriter, config: &AppConfig) -> ChannelResult<()> {
    let command = CommandBuffer::parse(&args.data, args.format.into())?;
    let (path, channel_config) = resolve_target(&args.target, config)?;
    let wait = args.wait || args.expect.is_some();

    debug!("Sending {} to {}", command, path);

    SerialChannel::scoped(&path, &channel_config, |channel| {
        if wait {
            let response = channel.transact(&command, args.expect)?;
            writer.write_received(&path, &response)?;
        } else {
            channel.write(&command)?;
            writer.write_message(&format!("Sent {} bytes to {}", command.len(), path))?;
        }
        Ok(())
    })
}

fn execute_read(args: ReadArgs, writer: &ConsoleWriter, config: &AppConfig) -> ChannelResult<()> {
    let (path, channel_config) = resolve_target(&args.target, config)?;

    SerialChannel::scoped(&path, &channel_config, |channel| {
        let data = channel.read()?;
        writer.write_received(&path, &data)?;
        Ok(())
    })
}

/// Turn `--port`/`--device` plus overrides into a device path and config
pub fn resolve_target(
    target: &TargetArgs,
    config: &AppConfig,
) -> ChannelResult<(String, ChannelConfig)> {
    let (path, mut channel_config) = match (&target.port, &target.device) {
        (_, Some(name)) => {
            let profile = config.device(name).ok_or_else(|| {
                ChannelError::InvalidInput(format!("Unknown device profile '{}'", name))
            })?;
            (profile.path.clone(), profile.config.clone())
        }
        (Some(port), None) => {
            let channel_config = ChannelConfig::new(DEFAULT_BAUD_RATE)
                .with_timeout(Duration::from_millis(config.global.timeout_ms));
            (port.clone(), channel_config)
        }
        (None, None) => {
            return Err(ChannelError::InvalidInput(
                "Either --port or --device is required".to_string(),
            ))
        }
    };

    if let Some(baud) = target.baud {
        channel_config.baud_rate = baud;
    }
    if let Some(data_bits) = target.data_bits {
        channel_config.data_bits = data_bits;
    }
    if let Some(stop_bits) = target.stop_bits {
        channel_config.stop_bits = stop_bits;
    }
    if let Some(parity) = target.parity {
        channel_config = channel_config.with_parity(parity.into());
    }
    if let Some(flow_control) = target.flow_control {
        channel_config = channel_config.with_flow_control(flow_control.into());
    }
    if let Some(timeout) = target.timeout {
        channel_config.timeout_ms = timeout;
    }

    Ok((path, channel_config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::ParityArg;
    use crate::domain::config::{DeviceProfile, ParityConfig};

    fn config_with_profile() -> AppConfig {
        AppConfig {
            devices: vec![DeviceProfile {
                name: "switch".to_string(),
                description: String::new(),
                path: "/dev/ttyS2".to_string(),
                config: ChannelConfig::new(57600),
            }],
            ..AppConfig::default()
        }
    }

    #[test]
    fn test_resolve_port_uses_defaults() {
        let target = TargetArgs {
            port: Some("/dev/ttyUSB0".to_string()),
            ..TargetArgs::default()
        };
        let (path, config) = resolve_target(&target, &AppConfig::default()).unwrap();
        assert_eq!(path, "/dev/ttyUSB0");
        assert_eq!(config.baud_rate, 9600);
        assert_eq!(config.timeout_ms, 1000);
    }

    #[test]
    fn test_resolve_profile_with_overrides() {
        let target = TargetArgs {
            device: Some("switch".to_string()),
            timeout: Some(100),
            parity: Some(ParityArg::Even),
            ..TargetArgs::default()
        };
        let (path, config) = resolve_target(&target, &config_with_profile()).unwrap();
        assert_eq!(path, "/dev/ttyS2");
        assert_eq!(config.baud_rate, 57600);
        assert_eq!(config.timeout_ms, 100);
        assert_eq!(config.parity, ParityConfig::Even);
    }

    #[test]
    fn test_resolve_requires_a_target() {
        let result = resolve_target(&TargetArgs::default(), &AppConfig::default());
        assert!(matches!(result, Err(ChannelError::InvalidInput(_))));

        let target = TargetArgs {
            device: Some("missing".to_string()),
            ..TargetArgs::default()
        };
        let result = resolve_target(&target, &config_with_profile());
        assert!(matches!(result, Err(ChannelError::InvalidInput(_))));
    }
}
