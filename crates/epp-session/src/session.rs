use std::fmt;

use bytes::Bytes;
use epp_frame::{FrameConfig, FramedStream};
use epp_transport::{Connection, Dialer, TlsDialer};
use serde::de::IgnoredAny;
use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::config::SessionConfig;
use crate::envelope::{parse_status, Command, ConditionsExtension, Response};
use crate::error::{Result, SessionError};
use crate::result::ResultCode;
use crate::trid::{ClockRandomIds, TransactionIdSource};

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    Disconnected,
    /// Greeting received, not logged in.
    Connected,
    /// Logged in.
    Authenticated,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Disconnected => "disconnected",
            SessionState::Connected => "connected",
            SessionState::Authenticated => "authenticated",
        };
        f.write_str(name)
    }
}

#[derive(Serialize)]
struct LoginBody<'a> {
    #[serde(rename = "clID")]
    client_id: &'a str,
    pw: &'a str,
    #[serde(rename = "newPW", skip_serializing_if = "Option::is_none")]
    new_password: Option<&'a str>,
    options: LoginOptions<'a>,
    svcs: Services<'a>,
}

#[derive(Serialize)]
struct LoginOptions<'a> {
    version: &'a str,
    lang: &'a str,
}

#[derive(Serialize)]
struct Services<'a> {
    #[serde(rename = "objURI")]
    object_uris: &'a [String],
    #[serde(rename = "svcExtension", skip_serializing_if = "Option::is_none")]
    extension: Option<ServiceExtension<'a>>,
}

#[derive(Serialize)]
struct ServiceExtension<'a> {
    #[serde(rename = "extURI")]
    uris: &'a [String],
}

/// One EPP session over one connection.
///
/// Strictly request/response: every method that talks to the server
/// takes `&mut self`, so at most one command is ever in flight. Transport
/// failures close the connection and return the session to
/// [`SessionState::Disconnected`]; registry-side failures leave it open.
pub struct Session<D: Dialer = TlsDialer> {
    config: SessionConfig,
    dialer: D,
    ids: Box<dyn TransactionIdSource + Send>,
    stream: Option<FramedStream<D::Stream>>,
    state: SessionState,
    greeting: Option<Bytes>,
}

impl Session<TlsDialer> {
    /// A session that dials the configured registry over TLS.
    pub fn new(config: SessionConfig) -> Result<Self> {
        let dialer = TlsDialer::new(&config.tls)?;
        Ok(Self::with_dialer(config, dialer))
    }
}

impl<D: Dialer> Session<D> {
    /// A session over a caller-supplied dialer.
    pub fn with_dialer(config: SessionConfig, dialer: D) -> Self {
        Self {
            config,
            dialer,
            ids: Box::new(ClockRandomIds::new()),
            stream: None,
            state: SessionState::Disconnected,
            greeting: None,
        }
    }

    /// Replace the transaction ID source.
    pub fn with_transaction_ids(mut self, ids: impl TransactionIdSource + Send + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Raw bytes of the greeting received on the last successful connect.
    pub fn greeting(&self) -> Option<&[u8]> {
        self.greeting.as_deref()
    }

    /// Draw the next client transaction ID.
    pub fn next_transaction_id(&mut self) -> String {
        self.ids.next_id()
    }

    /// Dial the server and read its greeting.
    ///
    /// Connecting an open session is a no-op. On failure the partial
    /// connection is closed and the session stays disconnected.
    pub fn connect(&mut self) -> Result<()> {
        if self.state != SessionState::Disconnected {
            debug!(state = %self.state, "connect on open session ignored");
            return Ok(());
        }

        let endpoint = self.config.endpoint();
        debug!(host = %endpoint.host, port = endpoint.port, "connecting");
        let stream = self.dialer.dial(&endpoint)?;
        let mut framed = FramedStream::with_config(
            stream,
            FrameConfig {
                max_frame_size: self.config.max_frame_size,
            },
        );

        let greeting = match framed.read_frame() {
            Ok(greeting) => greeting,
            Err(err) => {
                let _ = framed.get_mut().shutdown();
                warn!(host = %endpoint.host, error = %err, "no greeting from server");
                return Err(SessionError::Greeting(err));
            }
        };

        debug!(host = %endpoint.host, bytes = greeting.len(), "greeting received");
        self.stream = Some(framed);
        self.greeting = Some(greeting);
        self.state = SessionState::Connected;
        Ok(())
    }

    /// Log in with the configured credentials. Only result code 1000 counts
    /// as success.
    pub fn login(&mut self) -> Result<()> {
        self.ensure_connected()?;
        let status = self.send_login(None)?;
        if status.code() != ResultCode::SUCCESS {
            warn!(code = %status.code(), "login refused");
            return Err(SessionError::Authentication {
                code: status.code(),
                message: status.message().to_string(),
            });
        }

        self.state = SessionState::Authenticated;
        debug!(client_id = %self.config.client_id, "logged in");
        Ok(())
    }

    /// Log in while replacing the account password.
    ///
    /// The stored password changes only when the server answers 1000; the
    /// session is then authenticated.
    pub fn change_password(&mut self, new_password: &str) -> Result<()> {
        self.ensure_connected()?;
        let status = self.send_login(Some(new_password))?;
        if status.code() != ResultCode::SUCCESS {
            warn!(code = %status.code(), "password change refused");
            return Err(SessionError::Authentication {
                code: status.code(),
                message: status.message().to_string(),
            });
        }

        self.config.password = new_password.to_string();
        self.state = SessionState::Authenticated;
        debug!(client_id = %self.config.client_id, "password changed");
        Ok(())
    }

    /// Send `<logout/>` and close. The result code is not inspected.
    pub fn logout(&mut self) -> Result<()> {
        self.ensure_connected()?;
        let cl_trid = self.next_transaction_id();
        let xml = Command::new("logout", &(), &cl_trid).to_xml()?;
        let sent = self.exchange(xml.as_bytes(), &cl_trid);
        self.close();
        sent.map(|_| ())
    }

    /// Close the connection. Safe to call repeatedly.
    pub fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            if let Err(err) = stream.get_mut().shutdown() {
                trace!(error = %err, "shutdown after close");
            }
            debug!(host = %self.config.host, "session closed");
        }
        self.state = SessionState::Disconnected;
    }

    /// Send one complete `<epp>` document and return the raw response body.
    ///
    /// Allowed before login so `<hello/>` and `<login>` can use it.
    pub fn send_command(&mut self, payload: &[u8]) -> Result<Bytes> {
        self.ensure_connected()?;
        self.exchange(payload, "")
    }

    /// Fail unless the session is logged in.
    pub fn ensure_authenticated(&self) -> Result<()> {
        match self.state {
            SessionState::Authenticated => Ok(()),
            SessionState::Connected => Err(SessionError::NotAuthenticated),
            SessionState::Disconnected => Err(SessionError::NotConnected),
        }
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.state == SessionState::Disconnected {
            return Err(SessionError::NotConnected);
        }
        Ok(())
    }

    fn send_login(
        &mut self,
        new_password: Option<&str>,
    ) -> Result<Response<IgnoredAny, ConditionsExtension>> {
        let cl_trid = self.next_transaction_id();
        let xml = {
            let config = &self.config;
            let body = LoginBody {
                client_id: &config.client_id,
                pw: &config.password,
                new_password,
                options: LoginOptions {
                    version: &config.version,
                    lang: &config.language,
                },
                svcs: Services {
                    object_uris: &config.object_uris,
                    extension: (!config.extension_uris.is_empty()).then(|| ServiceExtension {
                        uris: &config.extension_uris,
                    }),
                },
            };
            Command::new("login", &body, &cl_trid).to_xml()?
        };
        let raw = self.exchange(xml.as_bytes(), &cl_trid)?;
        parse_status(&raw)
    }

    fn exchange(&mut self, payload: &[u8], cl_trid: &str) -> Result<Bytes> {
        let stream = self.stream.as_mut().ok_or(SessionError::NotConnected)?;
        let result = stream.send(payload).and_then(|()| stream.read_frame());
        match result {
            Ok(response) => {
                trace!(
                    cl_trid,
                    sent = payload.len(),
                    received = response.len(),
                    "exchange complete"
                );
                Ok(response)
            }
            Err(err) => {
                warn!(error = %err, "transport failure, closing session");
                self.close();
                Err(err.into())
            }
        }
    }
}

impl<D: Dialer> Drop for Session<D> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<D: Dialer> fmt::Debug for Session<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("greeting_bytes", &self.greeting.as_ref().map(Bytes::len))
            .finish_non_exhaustive()
    }
}
