use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use rustls::pki_types::{CertificateDer, PrivateKeyDer, ServerName};
use rustls::{ClientConfig, ClientConnection, RootCertStore, StreamOwned};
use tracing::{debug, trace};

use crate::error::{Result, TransportError};
use crate::traits::{Connection, Dialer, Endpoint};

/// Which trust anchors verify the registry certificate.
#[derive(Debug, Clone, Default)]
pub enum RootStore {
    /// The Mozilla root program (bundled via `webpki-roots`).
    #[default]
    WebPki,
    /// The Mozilla roots plus additional anchors.
    WebPkiAnd(Vec<CertificateDer<'static>>),
    /// Only the given anchors (private registry CAs, test environments).
    Custom(Vec<CertificateDer<'static>>),
}

/// A client certificate chain and key, for registries that require TLS
/// client authentication.
pub struct ClientIdentity {
    pub certificates: Vec<CertificateDer<'static>>,
    pub key: PrivateKeyDer<'static>,
}

impl ClientIdentity {
    /// Load a certificate chain and private key from PEM files.
    pub fn from_pem_files(cert_path: impl AsRef<Path>, key_path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            certificates: load_certificates(cert_path)?,
            key: load_private_key(key_path)?,
        })
    }
}

impl Clone for ClientIdentity {
    fn clone(&self) -> Self {
        Self {
            certificates: self.certificates.clone(),
            key: self.key.clone_key(),
        }
    }
}

impl fmt::Debug for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientIdentity")
            .field("certificates", &self.certificates.len())
            .field("key", &"<redacted>")
            .finish()
    }
}

/// TLS settings for dialing a registry.
#[derive(Debug, Clone, Default)]
pub struct TlsConfig {
    pub roots: RootStore,
    pub client_identity: Option<ClientIdentity>,
}

impl TlsConfig {
    /// Build the rustls client configuration (TLS 1.2 and 1.3, ring provider).
    pub fn build(&self) -> Result<ClientConfig> {
        let mut roots = RootCertStore::empty();
        let extra = match &self.roots {
            RootStore::WebPki => &[][..],
            RootStore::WebPkiAnd(extra) => extra.as_slice(),
            RootStore::Custom(anchors) => anchors.as_slice(),
        };
        if !matches!(self.roots, RootStore::Custom(_)) {
            roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        }
        for cert in extra {
            roots.add(cert.clone())?;
        }

        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let builder = ClientConfig::builder_with_provider(provider)
            .with_protocol_versions(&[&rustls::version::TLS13, &rustls::version::TLS12])?
            .with_root_certificates(roots);

        let config = match &self.client_identity {
            Some(identity) => builder
                .with_client_auth_cert(identity.certificates.clone(), identity.key.clone_key())?,
            None => builder.with_no_client_auth(),
        };
        Ok(config)
    }
}

/// Dials registries over TCP and wraps the socket in TLS.
#[derive(Clone)]
pub struct TlsDialer {
    config: Arc<ClientConfig>,
}

impl TlsDialer {
    pub fn new(tls: &TlsConfig) -> Result<Self> {
        Ok(Self {
            config: Arc::new(tls.build()?),
        })
    }

    /// Use a prepared rustls configuration as-is.
    pub fn from_client_config(config: Arc<ClientConfig>) -> Self {
        Self { config }
    }
}

impl fmt::Debug for TlsDialer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TlsDialer").finish_non_exhaustive()
    }
}

impl Dialer for TlsDialer {
    type Stream = TlsStream;

    fn dial(&self, endpoint: &Endpoint) -> Result<TlsStream> {
        let server_name = ServerName::try_from(endpoint.host.clone())
            .map_err(|_| TransportError::InvalidServerName(endpoint.host.clone()))?;

        let mut tcp = connect_tcp(endpoint)?;
        let bound = bounded(endpoint.timeout);
        tcp.set_read_timeout(bound)?;
        tcp.set_write_timeout(bound)?;

        let mut conn = ClientConnection::new(Arc::clone(&self.config), server_name)?;
        while conn.is_handshaking() {
            conn.complete_io(&mut tcp)
                .map_err(|source| TransportError::Handshake {
                    host: endpoint.host.clone(),
                    source,
                })?;
        }

        // The bound covers the dial only; the session itself has no deadline.
        tcp.set_read_timeout(None)?;
        tcp.set_write_timeout(None)?;

        debug!(
            host = %endpoint.host,
            port = endpoint.port,
            version = ?conn.protocol_version(),
            "TLS session established"
        );
        Ok(TlsStream {
            inner: StreamOwned::new(conn, tcp),
        })
    }
}

fn bounded(timeout: Duration) -> Option<Duration> {
    if timeout.is_zero() {
        None
    } else {
        Some(timeout)
    }
}

fn connect_tcp(endpoint: &Endpoint) -> Result<TcpStream> {
    let addrs = (endpoint.host.as_str(), endpoint.port)
        .to_socket_addrs()
        .map_err(|source| TransportError::Resolve {
            host: endpoint.host.clone(),
            source,
        })?;

    let mut last_err = None;
    for addr in addrs {
        let attempt = match bounded(endpoint.timeout) {
            Some(timeout) => TcpStream::connect_timeout(&addr, timeout),
            None => TcpStream::connect(addr),
        };
        match attempt {
            Ok(stream) => {
                stream.set_nodelay(true)?;
                trace!(%addr, "tcp connected");
                return Ok(stream);
            }
            Err(err) => {
                trace!(%addr, error = %err, "tcp connect attempt failed");
                last_err = Some(err);
            }
        }
    }

    Err(TransportError::Connect {
        host: endpoint.host.clone(),
        port: endpoint.port,
        source: last_err.unwrap_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "host resolved to no addresses")
        }),
    })
}

/// A TLS-secured TCP stream to a registry.
pub struct TlsStream {
    inner: StreamOwned<ClientConnection, TcpStream>,
}

impl TlsStream {
    /// Peer address of the underlying socket.
    pub fn peer_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.inner.sock.peer_addr()
    }
}

impl Read for TlsStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Write for TlsStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

impl Connection for TlsStream {
    fn shutdown(&mut self) -> std::io::Result<()> {
        self.inner.conn.send_close_notify();
        // Best effort: the peer may already be gone.
        let _ = self.inner.flush();
        self.inner.sock.shutdown(std::net::Shutdown::Both)
    }
}

impl fmt::Debug for TlsStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TlsStream")
            .field("peer", &self.inner.sock.peer_addr().ok())
            .finish()
    }
}

/// Read every certificate from a PEM file.
pub fn load_certificates(path: impl AsRef<Path>) -> Result<Vec<CertificateDer<'static>>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| TransportError::Pem {
        path: path.to_path_buf(),
        source,
    })?;
    let certs = rustls_pemfile::certs(&mut BufReader::new(file))
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(|source| TransportError::Pem {
            path: path.to_path_buf(),
            source,
        })?;
    if certs.is_empty() {
        return Err(TransportError::NoCertificates {
            path: path.to_path_buf(),
        });
    }
    Ok(certs)
}

/// Read the first private key (PKCS#8, PKCS#1 or SEC1) from a PEM file.
pub fn load_private_key(path: impl AsRef<Path>) -> Result<PrivateKeyDer<'static>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| TransportError::Pem {
        path: path.to_path_buf(),
        source,
    })?;
    rustls_pemfile::private_key(&mut BufReader::new(file))
        .map_err(|source| TransportError::Pem {
            path: path.to_path_buf(),
            source,
        })?
        .ok_or_else(|| TransportError::NoPrivateKey {
            path: path.to_path_buf(),
        })
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;
    use std::thread;

    use rcgen::{BasicConstraints, CertificateParams, IsCa, KeyPair};
    use rustls::pki_types::PrivatePkcs8KeyDer;
    use rustls::{ServerConfig, ServerConnection};

    use super::*;

    struct TestPki {
        ca_pem: String,
        ca_der: CertificateDer<'static>,
        leaf_der: CertificateDer<'static>,
        leaf_key: Vec<u8>,
        leaf_key_pem: String,
    }

    fn test_pki() -> TestPki {
        let ca_key = KeyPair::generate().unwrap();
        let mut ca_params = CertificateParams::new(Vec::<String>::new()).unwrap();
        ca_params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        let ca = ca_params.self_signed(&ca_key).unwrap();

        let leaf_key = KeyPair::generate().unwrap();
        let leaf = CertificateParams::new(vec!["localhost".to_string()])
            .unwrap()
            .signed_by(&leaf_key, &ca, &ca_key)
            .unwrap();

        TestPki {
            ca_pem: ca.pem(),
            ca_der: ca.der().clone(),
            leaf_der: leaf.der().clone(),
            leaf_key: leaf_key.serialize_der(),
            leaf_key_pem: leaf_key.serialize_pem(),
        }
    }

    fn server_config(pki: &TestPki) -> Arc<ServerConfig> {
        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(pki.leaf_key.clone()));
        let config = ServerConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .unwrap()
            .with_no_client_auth()
            .with_single_cert(vec![pki.leaf_der.clone()], key)
            .unwrap();
        Arc::new(config)
    }

    fn temp_path(tag: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "epp-transport-{tag}-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("time should be after epoch")
                .as_nanos()
        ));
        std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
        dir
    }

    #[test]
    fn dial_verifies_server_against_custom_root() {
        let pki = test_pki();
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let server_cfg = server_config(&pki);

        let server = thread::spawn(move || {
            let (tcp, _) = listener.accept().unwrap();
            let conn = ServerConnection::new(server_cfg).unwrap();
            let mut stream = StreamOwned::new(conn, tcp);
            stream.write_all(b"greeting").unwrap();
            stream.flush().unwrap();
            let mut buf = [0u8; 4];
            stream.read_exact(&mut buf).unwrap();
            buf
        });

        let tls = TlsConfig {
            roots: RootStore::Custom(vec![pki.ca_der.clone()]),
            client_identity: None,
        };
        let dialer = TlsDialer::new(&tls).unwrap();
        let endpoint = Endpoint::new("localhost", port).with_timeout(Duration::from_secs(5));
        let mut stream = dialer.dial(&endpoint).unwrap();

        let mut buf = [0u8; 8];
        stream.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"greeting");
        stream.write_all(b"ping").unwrap();
        stream.flush().unwrap();

        assert_eq!(&server.join().unwrap(), b"ping");
        let _ = stream.shutdown();
    }

    #[test]
    fn dial_rejects_untrusted_server() {
        let pki = test_pki();
        let other = test_pki();
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let server_cfg = server_config(&pki);

        let server = thread::spawn(move || {
            let (tcp, _) = listener.accept().unwrap();
            let conn = ServerConnection::new(server_cfg).unwrap();
            let mut stream = StreamOwned::new(conn, tcp);
            let mut buf = [0u8; 1];
            let _ = stream.read(&mut buf);
        });

        let tls = TlsConfig {
            roots: RootStore::Custom(vec![other.ca_der]),
            client_identity: None,
        };
        let dialer = TlsDialer::new(&tls).unwrap();
        let endpoint = Endpoint::new("localhost", port).with_timeout(Duration::from_secs(5));
        let err = dialer.dial(&endpoint).unwrap_err();

        assert!(matches!(err, TransportError::Handshake { .. }));
        server.join().unwrap();
    }

    #[test]
    fn dial_refused_reports_connect_error() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let dialer = TlsDialer::new(&TlsConfig::default()).unwrap();
        let endpoint = Endpoint::new("127.0.0.1", port).with_timeout(Duration::from_secs(2));

        let err = dialer.dial(&endpoint).unwrap_err();
        assert!(matches!(err, TransportError::Connect { port: p, .. } if p == port));
    }

    #[test]
    fn invalid_server_name_rejected_before_dialing() {
        let dialer = TlsDialer::new(&TlsConfig::default()).unwrap();
        let err = dialer
            .dial(&Endpoint::new("not a host name", 700))
            .unwrap_err();
        assert!(matches!(err, TransportError::InvalidServerName(_)));
    }

    #[test]
    fn load_pem_files() {
        let pki = test_pki();
        let dir = temp_path("pem");
        let cert_path = dir.join("ca.pem");
        let key_path = dir.join("key.pem");
        std::fs::write(&cert_path, &pki.ca_pem).unwrap();
        std::fs::write(&key_path, &pki.leaf_key_pem).unwrap();

        let certs = load_certificates(&cert_path).unwrap();
        assert_eq!(certs.len(), 1);
        assert_eq!(certs[0], pki.ca_der);

        let identity = ClientIdentity::from_pem_files(&cert_path, &key_path).unwrap();
        assert!(matches!(identity.key, PrivateKeyDer::Pkcs8(_)));
        assert!(format!("{identity:?}").contains("<redacted>"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn load_pem_errors() {
        let dir = temp_path("pem-errors");
        let empty = dir.join("empty.pem");
        std::fs::write(&empty, b"").unwrap();

        assert!(matches!(
            load_certificates(&empty),
            Err(TransportError::NoCertificates { .. })
        ));
        assert!(matches!(
            load_private_key(&empty),
            Err(TransportError::NoPrivateKey { .. })
        ));
        assert!(matches!(
            load_certificates(dir.join("missing.pem")),
            Err(TransportError::Pem { .. })
        ));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn default_config_builds_with_webpki_roots() {
        let config = TlsConfig::default().build();
        assert!(config.is_ok());
    }
}
