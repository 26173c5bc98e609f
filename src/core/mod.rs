// Core module - Channel lifecycle and payloads
pub mod channel;
pub mod payload;
pub mod transport;

pub use channel::SerialChannel;
pub use payload::{CommandBuffer, PayloadFormat};
pub use transport::{Connector, Port};
