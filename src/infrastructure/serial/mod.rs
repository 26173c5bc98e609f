// Serial module - OS and in-memory serial endpoints
pub mod connector;
pub mod loopback;

pub use connector::{list_ports, PortSummary, SystemConnector};
pub use loopback::LoopbackConnector;
