//! TLS-over-TCP transport for EPP (RFC 5734).
//!
//! This is the lowest layer of the client. It dials the registry, completes
//! the TLS handshake against the configured trust anchors, and hands back a
//! blocking byte stream. Everything else builds on the [`Connection`] and
//! [`Dialer`] traits provided here.

pub mod error;
pub mod tls;
pub mod traits;

pub use error::{Result, TransportError};
pub use tls::{
    load_certificates, load_private_key, ClientIdentity, RootStore, TlsConfig, TlsDialer,
    TlsStream,
};
pub use traits::{Connection, Dialer, Endpoint, Preconnected, DEFAULT_PORT, DEFAULT_TIMEOUT};

pub use rustls::pki_types::{CertificateDer, PrivateKeyDer};
