use std::fmt;
use std::time::Duration;

use epp_frame::DEFAULT_MAX_FRAME;
use epp_transport::{Endpoint, TlsConfig, DEFAULT_PORT, DEFAULT_TIMEOUT};

use crate::envelope::{AT_EXT_CONTACT_NS, AT_EXT_DOMAIN_NS, AT_EXT_EPP_NS, CONTACT_NS, DOMAIN_NS};

/// Connection and login settings for one registry account.
#[derive(Clone)]
pub struct SessionConfig {
    /// Registry host name, also the TLS server name.
    pub host: String,
    /// Registry port.
    pub port: u16,
    /// Registrar account (`<clID>`).
    pub client_id: String,
    /// Account password (`<pw>`). Never logged.
    pub password: String,
    /// Bound on dial and TLS handshake. Commands have no deadline.
    pub timeout: Duration,
    /// Protocol version sent at login.
    pub version: String,
    /// Response language sent at login.
    pub language: String,
    /// Object namespaces announced in `<svcs>`.
    pub object_uris: Vec<String>,
    /// Extension namespaces announced in `<svcExtension>`. Empty omits the element.
    pub extension_uris: Vec<String>,
    /// Trust anchors and optional client certificate.
    pub tls: TlsConfig,
    /// Largest frame accepted from or sent to the server.
    pub max_frame_size: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: DEFAULT_PORT,
            client_id: String::new(),
            password: String::new(),
            timeout: DEFAULT_TIMEOUT,
            version: "1.0".to_string(),
            language: "en".to_string(),
            object_uris: vec![DOMAIN_NS.to_string(), CONTACT_NS.to_string()],
            extension_uris: vec![
                AT_EXT_EPP_NS.to_string(),
                AT_EXT_CONTACT_NS.to_string(),
                AT_EXT_DOMAIN_NS.to_string(),
            ],
            tls: TlsConfig::default(),
            max_frame_size: DEFAULT_MAX_FRAME,
        }
    }
}

impl SessionConfig {
    pub fn new(
        host: impl Into<String>,
        client_id: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            client_id: client_id.into(),
            password: password.into(),
            ..Self::default()
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_object_uris<I, S>(mut self, uris: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.object_uris = uris.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_extension_uris<I, S>(mut self, uris: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extension_uris = uris.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_tls(mut self, tls: TlsConfig) -> Self {
        self.tls = tls;
        self
    }

    pub fn with_max_frame_size(mut self, max_frame_size: usize) -> Self {
        self.max_frame_size = max_frame_size;
        self
    }

    /// Where the transport should dial.
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.host.clone(), self.port).with_timeout(self.timeout)
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("client_id", &self.client_id)
            .field(
                "password",
                &format_args!("<redacted:{} bytes>", self.password.len()),
            )
            .field("timeout", &self.timeout)
            .field("version", &self.version)
            .field("language", &self.language)
            .field("object_uris", &self.object_uris)
            .field("extension_uris", &self.extension_uris)
            .field("tls", &self.tls)
            .field("max_frame_size", &self.max_frame_size)
            .finish()
    }
}
