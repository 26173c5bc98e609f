// Logging module - Logging infrastructure
use crate::domain::error::{ChannelError, ChannelResult};
use std::io;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the filter: `RUST_LOG` wins, then `--verbose`, then the configured level
pub fn build_filter(log_level: &str, verbose: bool) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    let level = if verbose {
        "debug"
    } else {
        match log_level {
            "error" | "warn" | "info" | "debug" | "trace" => log_level,
            _ => "info",
        }
    };
    EnvFilter::new(format!("serlink={},warn", level))
}

/// Initialize logging system
pub fn init_logging(log_level: &str, verbose: bool) -> ChannelResult<()> {
    tracing_subscriber::registry()
        .with(build_filter(log_level, verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .with_level(true),
        )
        .try_init()
        .map_err(|e| ChannelError::Config {
            message: format!("Failed to initialize logging: {}", e),
        })?;

    tracing::debug!("serlink logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_init_twice_reports_error() {
        // The first call may fail too if another test installed a subscriber.
        let _ = init_logging("info", false);
        assert!(init_logging("info", false).is_err());
    }

    #[test]
    fn test_build_filter_falls_back_to_info() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        let filter = build_filter("loud", false);
        assert!(filter.to_string().contains("serlink=info"));
    }
}
