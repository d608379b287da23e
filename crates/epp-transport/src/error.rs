use std::path::PathBuf;

/// Errors that can occur in EPP transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The host cannot be used as a TLS server name.
    #[error("invalid TLS server name: {0}")]
    InvalidServerName(String),

    /// Failed to resolve the server host name.
    #[error("failed to resolve {host}: {source}")]
    Resolve {
        host: String,
        source: std::io::Error,
    },

    /// Failed to open a TCP connection to the server.
    #[error("failed to connect to {host}:{port}: {source}")]
    Connect {
        host: String,
        port: u16,
        source: std::io::Error,
    },

    /// The TLS handshake did not complete.
    #[error("TLS handshake with {host} failed: {source}")]
    Handshake {
        host: String,
        source: std::io::Error,
    },

    /// TLS configuration was rejected.
    #[error("TLS error: {0}")]
    Tls(#[from] rustls::Error),

    /// A PEM file could not be read.
    #[error("failed to read PEM file {path}: {source}")]
    Pem {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A PEM file held no certificates.
    #[error("no certificates found in {path}")]
    NoCertificates { path: PathBuf },

    /// A PEM file held no private key.
    #[error("no private key found in {path}")]
    NoPrivateKey { path: PathBuf },

    /// An I/O error occurred on the transport stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TransportError>;
