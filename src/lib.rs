//! serlink Library
//!
//! Point-to-point serial command/response transport: open a serial device,
//! write raw bytes, read what comes back within a timeout, close.

pub mod cli;
pub mod core;
pub mod domain;
pub mod infrastructure;

pub use self::core::{CommandBuffer, Connector, PayloadFormat, Port, SerialChannel};
pub use domain::config::{AppConfig, ChannelConfig, FlowControlConfig, ParityConfig};
pub use domain::error::{ChannelError, ChannelResult};
pub use infrastructure::serial::{list_ports, LoopbackConnector, SystemConnector};
