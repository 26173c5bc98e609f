use serlink::{ChannelError, ChannelResult};
use std::error::Error;

/// Error handling tests
#[cfg(test)]
mod error_handling_tests {
    use super::*;

    #[test]
    fn test_error_types() {
        let errors = vec![
            ChannelError::DeviceUnavailable {
                path: "/dev/ttyS2".to_string(),
                reason: "No such file or directory".to_string(),
            },
            ChannelError::InvalidConfiguration("Unsupported baud rate: -1".to_string()),
            ChannelError::ChannelClosed,
            ChannelError::Timeout { timeout_ms: 100 },
            ChannelError::Config { message: "Config error".to_string() },
            ChannelError::InvalidInput("Invalid input".to_string()),
            ChannelError::Output("Output error".to_string()),
        ];

        for error in errors {
            let display = error.to_string();
            assert!(!display.is_empty(), "Error display should not be empty");
            assert!(!error.kind_name().is_empty());
        }

        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ChannelError>();
    }

    #[test]
    fn test_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "cable pulled");
        let error: ChannelError = io_error.into();
        assert!(matches!(error, ChannelError::Io(_)));
        assert_eq!(error.kind_name(), "io");
    }

    #[test]
    fn test_error_chain() {
        let root_cause = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "Access denied");
        let error: ChannelError = root_cause.into();

        let source = error.source().expect("io errors keep their source");
        assert!(source.to_string().contains("Access denied"));
    }

    #[test]
    fn test_error_formatting() {
        let error = ChannelError::DeviceUnavailable {
            path: "/dev/ttyS2".to_string(),
            reason: "already in use".to_string(),
        };

        let display = format!("{}", error);
        assert!(display.contains("Device unavailable"));
        assert!(display.contains("/dev/ttyS2"));
        assert!(display.contains("already in use"));

        let timeout = ChannelError::Timeout { timeout_ms: 250 };
        assert!(timeout.to_string().contains("250 ms"));
    }

    #[test]
    fn test_result_propagation() {
        fn failing() -> ChannelResult<()> {
            Err(ChannelError::ChannelClosed)
        }

        fn calling() -> ChannelResult<u8> {
            failing()?;
            Ok(1)
        }

        let error = calling().unwrap_err();
        assert_eq!(error.kind_name(), "channel_closed");
        assert_eq!(error.to_string(), "Channel is not open");
    }

    #[test]
    fn test_error_size() {
        let error_size = std::mem::size_of::<ChannelError>();
        assert!(error_size <= 128, "ChannelError too large: {} bytes", error_size);
    }
}
