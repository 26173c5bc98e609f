use thiserror::Error;

/// serlink unified error type
#[derive(Error, Debug)]
pub enum ChannelError {
    #[error("Device unavailable: {path}: {reason}")]
    DeviceUnavailable { path: String, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Channel is not open")]
    ChannelClosed,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Timed out after {timeout_ms} ms waiting for data")]
    Timeout { timeout_ms: u64 },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Output error: {0}")]
    Output(String),
}

impl ChannelError {
    pub(crate) fn unavailable(path: &str, reason: impl std::fmt::Display) -> Self {
        Self::DeviceUnavailable {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Short machine-readable name of the error kind
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::DeviceUnavailable { .. } => "device_unavailable",
            Self::InvalidConfiguration(_) => "invalid_configuration",
            Self::ChannelClosed => "channel_closed",
            Self::Io(_) => "io",
            Self::Timeout { .. } => "timeout",
            Self::Config { .. } => "config",
            Self::InvalidInput(_) => "invalid_input",
            Self::Output(_) => "output",
        }
    }
}

pub type ChannelResult<T> = Result<T, ChannelError>;
