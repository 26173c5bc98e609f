use crate::domain::{config::LinkSettings, error::ChannelResult};
use std::io::{self, Read, Write};
use std::time::Duration;

/// An open byte-oriented link to one device.
///
/// Reads block for at most the timeout last set with
/// [`Port::set_read_timeout`] and report `io::ErrorKind::TimedOut` when no
/// byte arrived in that window.
pub trait Port: Read + Write + Send {
    /// Set how long a read may block waiting for the first byte
    fn set_read_timeout(&mut self, timeout: Duration) -> io::Result<()>;

    /// Number of bytes that can be read without blocking
    fn bytes_available(&self) -> io::Result<usize>;
}

/// Opens ports by device path
pub trait Connector {
    /// Open the device at `path` with already validated settings
    fn connect(&self, path: &str, settings: &LinkSettings) -> ChannelResult<Box<dyn Port>>;
}

impl<T: Connector + ?Sized> Connector for &T {
    fn connect(&self, path: &str, settings: &LinkSettings) -> ChannelResult<Box<dyn Port>> {
        (**self).connect(path, settings)
    }
}
