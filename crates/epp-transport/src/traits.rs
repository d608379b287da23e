use std::io::{Read, Write};
use std::net::{Shutdown, TcpStream};
use std::sync::Mutex;
use std::time::Duration;

use crate::error::{Result, TransportError};

/// Default EPP port assigned by IANA (RFC 5734).
pub const DEFAULT_PORT: u16 = 700;

/// Default dial timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Where and how long to dial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Server host name, also used as the TLS server name.
    pub host: String,
    /// Server port (typically 700).
    pub port: u16,
    /// Bound on TCP connect plus TLS handshake. Zero disables the bound.
    pub timeout: Duration,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// A connected byte stream an EPP session can run over.
///
/// Implemented by [`crate::TlsStream`] for real registries, and by plain
/// sockets so sessions can be exercised without TLS.
pub trait Connection: Read + Write + Send {
    /// Orderly shutdown of the stream. Errors are informational only.
    fn shutdown(&mut self) -> std::io::Result<()>;
}

impl Connection for TcpStream {
    fn shutdown(&mut self) -> std::io::Result<()> {
        TcpStream::shutdown(self, Shutdown::Both)
    }
}

#[cfg(unix)]
impl Connection for std::os::unix::net::UnixStream {
    fn shutdown(&mut self) -> std::io::Result<()> {
        std::os::unix::net::UnixStream::shutdown(self, Shutdown::Both)
    }
}

/// Opens connections to an [`Endpoint`].
pub trait Dialer: Send {
    type Stream: Connection;

    /// Open a connection, bounded by `endpoint.timeout`.
    fn dial(&self, endpoint: &Endpoint) -> Result<Self::Stream>;
}

/// Hands out one already-connected stream.
///
/// For callers that own socket setup themselves (proxies, custom TLS
/// stacks) and for driving sessions over socket pairs. A second dial
/// fails with `NotConnected`.
pub struct Preconnected<S> {
    stream: Mutex<Option<S>>,
}

impl<S: Connection> Preconnected<S> {
    pub fn new(stream: S) -> Self {
        Self {
            stream: Mutex::new(Some(stream)),
        }
    }
}

impl<S: Connection> Dialer for Preconnected<S> {
    type Stream = S;

    fn dial(&self, _endpoint: &Endpoint) -> Result<S> {
        let taken = match self.stream.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        taken.ok_or_else(|| {
            TransportError::Io(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "preconnected stream already used",
            ))
        })
    }
}
