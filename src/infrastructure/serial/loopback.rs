//! In-memory loopback endpoints.
//!
//! Every byte written to an endpoint becomes readable from it again, in
//! order. Endpoints are exclusive like OS serial devices: while one port is
//! open on a name, opening it again fails with `DeviceUnavailable`.

use crate::core::transport::{Connector, Port};
use crate::domain::{
    config::LinkSettings,
    error::{ChannelError, ChannelResult},
};
use std::collections::{HashMap, VecDeque};
use std::io::{self, Read, Write};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Default)]
struct Endpoint {
    held: bool,
    connected: bool,
    buffer: VecDeque<u8>,
}

#[derive(Debug, Default)]
struct Shared {
    endpoints: Mutex<HashMap<String, Endpoint>>,
    data_ready: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Endpoint>> {
        self.endpoints.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Connector for named in-memory loopback endpoints
#[derive(Debug, Clone, Default)]
pub struct LoopbackConnector {
    shared: Arc<Shared>,
}

impl LoopbackConnector {
    /// Create a connector exposing the given endpoint names
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let connector = Self::default();
        {
            let mut endpoints = connector.shared.lock();
            for name in names {
                endpoints.insert(
                    name.into(),
                    Endpoint {
                        connected: true,
                        ..Endpoint::default()
                    },
                );
            }
        }
        connector
    }

    /// Whether a port is currently open on `name`
    pub fn is_held(&self, name: &str) -> bool {
        self.shared
            .lock()
            .get(name)
            .map(|endpoint| endpoint.held)
            .unwrap_or(false)
    }

    /// Queue bytes as if the far end had sent them
    pub fn inject(&self, name: &str, bytes: &[u8]) -> bool {
        let mut endpoints = self.shared.lock();
        match endpoints.get_mut(name) {
            Some(endpoint) => {
                endpoint.buffer.extend(bytes);
                self.shared.data_ready.notify_all();
                true
            }
            None => false,
        }
    }

    /// Simulate the device going away; open ports start failing with
    /// `BrokenPipe`
    pub fn disconnect(&self, name: &str) {
        if let Some(endpoint) = self.shared.lock().get_mut(name) {
            endpoint.connected = false;
            endpoint.buffer.clear();
        }
        self.shared.data_ready.notify_all();
    }
}

impl Connector for LoopbackConnector {
    fn connect(&self, path: &str, settings: &LinkSettings) -> ChannelResult<Box<dyn Port>> {
        let mut endpoints = self.shared.lock();
        let endpoint = endpoints
            .get_mut(path)
            .ok_or_else(|| ChannelError::unavailable(path, "no such loopback endpoint"))?;

        if !endpoint.connected {
            return Err(ChannelError::unavailable(path, "endpoint disconnected"));
        }
        if endpoint.held {
            return Err(ChannelError::unavailable(path, "endpoint already in use"));
        }

        endpoint.held = true;
        debug!("Loopback endpoint {} acquired", path);

        Ok(Box::new(LoopbackPort {
            shared: Arc::clone(&self.shared),
            name: path.to_string(),
            timeout: settings.timeout,
        }))
    }
}

struct LoopbackPort {
    shared: Arc<Shared>,
    name: String,
    timeout: Duration,
}

fn broken_pipe(name: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::BrokenPipe,
        format!("loopback endpoint {} disconnected", name),
    )
}

impl Read for LoopbackPort {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        let endpoints = self.shared.lock();
        let name = self.name.as_str();
        let (mut endpoints, _) = self
            .shared
            .data_ready
            .wait_timeout_while(endpoints, self.timeout, |endpoints| {
                endpoints
                    .get(name)
                    .map(|endpoint| endpoint.connected && endpoint.buffer.is_empty())
                    .unwrap_or(false)
            })
            .unwrap_or_else(PoisonError::into_inner);

        let endpoint = endpoints
            .get_mut(name)
            .filter(|endpoint| endpoint.connected)
            .ok_or_else(|| broken_pipe(name))?;

        if endpoint.buffer.is_empty() {
            return Err(io::Error::new(io::ErrorKind::TimedOut, "loopback read timed out"));
        }

        let count = buf.len().min(endpoint.buffer.len());
        for (slot, byte) in buf.iter_mut().zip(endpoint.buffer.drain(..count)) {
            *slot = byte;
        }
        Ok(count)
    }
}

impl Write for LoopbackPort {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut endpoints = self.shared.lock();
        let endpoint = endpoints
            .get_mut(&self.name)
            .filter(|endpoint| endpoint.connected)
            .ok_or_else(|| broken_pipe(&self.name))?;

        endpoint.buffer.extend(buf);
        self.shared.data_ready.notify_all();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Port for LoopbackPort {
    fn set_read_timeout(&mut self, timeout: Duration) -> io::Result<()> {
        self.timeout = timeout;
        Ok(())
    }

    fn bytes_available(&self) -> io::Result<usize> {
        self.shared
            .lock()
            .get(&self.name)
            .filter(|endpoint| endpoint.connected)
            .map(|endpoint| endpoint.buffer.len())
            .ok_or_else(|| broken_pipe(&self.name))
    }
}

impl Drop for LoopbackPort {
    fn drop(&mut self) {
        if let Some(endpoint) = self.shared.lock().get_mut(&self.name) {
            endpoint.held = false;
        }
        debug!("Loopback endpoint {} released", self.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::ChannelConfig;

    fn settings(timeout_ms: u64) -> LinkSettings {
        ChannelConfig::new(9600)
            .with_timeout(Duration::from_millis(timeout_ms))
            .validate()
            .unwrap()
    }

    #[test]
    fn test_unknown_endpoint_is_unavailable() {
        let connector = LoopbackConnector::new(["loop0"]);
        let result = connector.connect("loop9", &settings(10));
        assert!(matches!(result, Err(ChannelError::DeviceUnavailable { .. })));
    }

    #[test]
    fn test_endpoint_is_exclusive_until_dropped() {
        let connector = LoopbackConnector::new(["loop0"]);
        let port = connector.connect("loop0", &settings(10)).unwrap();
        assert!(connector.is_held("loop0"));
        assert!(connector.connect("loop0", &settings(10)).is_err());

        drop(port);
        assert!(!connector.is_held("loop0"));
        assert!(connector.connect("loop0", &settings(10)).is_ok());
    }

    #[test]
    fn test_read_respects_buffer_size() {
        let connector = LoopbackConnector::new(["loop0"]);
        let mut port = connector.connect("loop0", &settings(10)).unwrap();
        port.write_all(&[1, 2, 3]).unwrap();

        let mut buf = [0u8; 2];
        assert_eq!(port.read(&mut buf).unwrap(), 2);
        assert_eq!(buf, [1, 2]);
        assert_eq!(port.bytes_available().unwrap(), 1);
    }

    #[test]
    fn test_empty_read_times_out() {
        let connector = LoopbackConnector::new(["loop0"]);
        let mut port = connector.connect("loop0", &settings(20)).unwrap();
        let mut buf = [0u8; 4];
        let error = port.read(&mut buf).unwrap_err();
        assert_eq!(error.kind(), io::ErrorKind::TimedOut);
    }

    #[test]
    fn test_disconnect_breaks_open_port() {
        let connector = LoopbackConnector::new(["loop0"]);
        let mut port = connector.connect("loop0", &settings(10)).unwrap();
        connector.disconnect("loop0");

        assert_eq!(port.write(&[1]).unwrap_err().kind(), io::ErrorKind::BrokenPipe);
        let mut buf = [0u8; 1];
        assert_eq!(port.read(&mut buf).unwrap_err().kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_inject_unknown_endpoint() {
        let connector = LoopbackConnector::new(["loop0"]);
        assert!(connector.inject("loop0", &[0xAA]));
        assert!(!connector.inject("nope", &[0xAA]));
    }
}
