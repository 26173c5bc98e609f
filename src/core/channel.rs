use crate::core::payload::CommandBuffer;
use crate::core::transport::{Connector, Port};
use crate::domain::{
    config::{ChannelConfig, LinkSettings},
    error::{ChannelError, ChannelResult},
};
use crate::infrastructure::serial::SystemConnector;
use std::io::{self, ErrorKind, Read, Write};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const READ_CHUNK: usize = 1024;

struct OpenLink {
    path: String,
    config: ChannelConfig,
    settings: LinkSettings,
    port: Box<dyn Port>,
}

/// A single-owner connection to one serial device.
///
/// A channel starts closed. [`SerialChannel::open`] acquires the device,
/// [`SerialChannel::close`] (or dropping the channel) releases it. Every
/// other operation fails with [`ChannelError::ChannelClosed`] while the
/// channel is closed.
pub struct SerialChannel<C = SystemConnector> {
    connector: C,
    link: Option<OpenLink>,
}

impl SerialChannel<SystemConnector> {
    /// A closed channel that opens OS serial devices
    pub fn new() -> Self {
        Self::with_connector(SystemConnector)
    }

    /// Open `path`, run `f` on the open channel, and close it again on
    /// every exit path.
    pub fn scoped<T, F>(path: &str, config: &ChannelConfig, f: F) -> ChannelResult<T>
    where
        F: FnOnce(&mut Self) -> ChannelResult<T>,
    {
        Self::new().open_scoped(path, config, f)
    }
}

impl Default for SerialChannel<SystemConnector> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> SerialChannel<C> {
    pub fn is_open(&self) -> bool {
        self.link.is_some()
    }

    /// Device path of the open channel
    pub fn path(&self) -> Option<&str> {
        self.link.as_ref().map(|link| link.path.as_str())
    }

    /// Configuration the channel was opened with
    pub fn config(&self) -> Option<&ChannelConfig> {
        self.link.as_ref().map(|link| &link.config)
    }

    pub fn settings(&self) -> Option<&LinkSettings> {
        self.link.as_ref().map(|link| &link.settings)
    }

    /// Release the device. Closing a closed channel does nothing.
    pub fn close(&mut self) {
        if let Some(link) = self.link.take() {
            drop(link.port);
            info!("Serial channel on {} closed", link.path);
        }
    }

    fn link_mut(&mut self) -> ChannelResult<&mut OpenLink> {
        self.link.as_mut().ok_or(ChannelError::ChannelClosed)
    }
}

impl<C: Connector> SerialChannel<C> {
    pub fn with_connector(connector: C) -> Self {
        Self {
            connector,
            link: None,
        }
    }

    /// Open the device at `path`.
    ///
    /// The configuration is validated before the device is touched. An
    /// already open channel is closed first.
    pub fn open(&mut self, path: &str, config: &ChannelConfig) -> ChannelResult<()> {
        let settings = config.validate()?;

        if self.is_open() {
            warn!("Reopening serial channel, closing {:?} first", self.path());
            self.close();
        }

        let port = self.connector.connect(path, &settings)?;
        info!(
            "Serial channel opened on {} at {} baud",
            path, settings.baud_rate
        );

        self.link = Some(OpenLink {
            path: path.to_string(),
            config: config.clone(),
            settings,
            port,
        });
        Ok(())
    }

    /// Open, run `f`, then close regardless of how `f` finished
    pub fn open_scoped<T, F>(&mut self, path: &str, config: &ChannelConfig, f: F) -> ChannelResult<T>
    where
        F: FnOnce(&mut Self) -> ChannelResult<T>,
    {
        self.open(path, config)?;
        let result = f(self);
        self.close();
        result
    }

    /// Transmit `bytes` verbatim, in order, with no framing
    pub fn write(&mut self, bytes: impl AsRef<[u8]>) -> ChannelResult<()> {
        let bytes = bytes.as_ref();
        let link = self.link_mut()?;
        let timeout = link.settings.timeout;

        link.port
            .write_all(bytes)
            .and_then(|_| link.port.flush())
            .map_err(|e| map_io_error(e, timeout))?;

        debug!("Wrote {} bytes to {}", bytes.len(), link.path);
        Ok(())
    }

    /// Block until at least one byte arrives or the configured timeout
    /// elapses, then return every byte available at that point.
    pub fn read(&mut self) -> ChannelResult<Vec<u8>> {
        let timeout = self.link_mut()?.settings.timeout;
        self.read_timeout(timeout)
    }

    /// [`SerialChannel::read`] with an explicit timeout for this call only.
    ///
    /// The port is put back on the configured timeout afterwards, since
    /// writes share it.
    pub fn read_timeout(&mut self, timeout: Duration) -> ChannelResult<Vec<u8>> {
        let link = self.link_mut()?;
        let configured = link.settings.timeout;
        link.port
            .set_read_timeout(timeout)
            .map_err(|e| map_io_error(e, timeout))?;

        let result = read_available(link, timeout);

        if timeout != configured {
            let restored = link.port
                .set_read_timeout(configured)
                .map_err(|e| map_io_error(e, configured));
            let data = result?;
            restored?;
            return Ok(data);
        }
        result
    }

    /// Write a command and collect the response.
    ///
    /// With `expected_len` set, bytes are gathered until at least that many
    /// arrived or the configured timeout elapsed since the write; whatever
    /// was collected is returned. `Timeout` is reported only when nothing
    /// came back. Without `expected_len` this is a write followed by a read.
    pub fn transact(
        &mut self,
        command: &CommandBuffer,
        expected_len: Option<usize>,
    ) -> ChannelResult<Vec<u8>> {
        self.write(command)?;

        let expected = match expected_len {
            Some(0) => return Ok(Vec::new()),
            Some(expected) => expected,
            None => return self.read(),
        };

        let timeout = self.link_mut()?.settings.timeout;
        let deadline = Instant::now() + timeout;
        let mut response = Vec::with_capacity(expected);

        while response.len() < expected {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match self.read_timeout(remaining) {
                Ok(chunk) => response.extend_from_slice(&chunk),
                Err(ChannelError::Timeout { .. }) => break,
                Err(e) => return Err(e),
            }
        }

        if response.is_empty() {
            return Err(timeout_error(timeout));
        }
        if response.len() < expected {
            warn!(
                "Expected {} response bytes, received {} before timeout",
                expected,
                response.len()
            );
        }
        Ok(response)
    }
}

impl<C> Drop for SerialChannel<C> {
    fn drop(&mut self) {
        self.close();
    }
}

fn read_available(link: &mut OpenLink, timeout: Duration) -> ChannelResult<Vec<u8>> {
    let mut buffer = vec![0u8; READ_CHUNK];
    let received = match link.port.read(&mut buffer) {
        Ok(0) => return Err(timeout_error(timeout)),
        Ok(n) => n,
        Err(e) => return Err(map_io_error(e, timeout)),
    };
    buffer.truncate(received);

    // Drain whatever is already buffered without blocking again.
    loop {
        let available = link.port.bytes_available()?;
        if available == 0 {
            break;
        }
        let start = buffer.len();
        buffer.resize(start + available, 0);
        let n = link.port
            .read(&mut buffer[start..])
            .map_err(|e| map_io_error(e, timeout))?;
        buffer.truncate(start + n);
        if n == 0 {
            break;
        }
    }

    debug!("Read {} bytes from {}", buffer.len(), link.path);
    Ok(buffer)
}

fn timeout_error(timeout: Duration) -> ChannelError {
    ChannelError::Timeout {
        timeout_ms: timeout.as_millis().min(u64::MAX as u128) as u64,
    }
}

fn map_io_error(error: io::Error, timeout: Duration) -> ChannelError {
    match error.kind() {
        ErrorKind::TimedOut | ErrorKind::WouldBlock => timeout_error(timeout),
        _ => ChannelError::Io(error),
    }
}
