use crate::result::{EppError, ResultCode};

/// Errors that can occur in session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Dial or TLS failure.
    #[error("transport error: {0}")]
    Transport(#[from] epp_transport::TransportError),

    /// Frame-level read or write failure.
    #[error("frame error: {0}")]
    Frame(#[from] epp_frame::FrameError),

    /// The server greeting could not be read after connecting.
    #[error("failed to read server greeting: {0}")]
    Greeting(#[source] epp_frame::FrameError),

    /// The operation needs an open connection.
    #[error("session is not connected")]
    NotConnected,

    /// The operation needs a logged-in session.
    #[error("session is not authenticated")]
    NotAuthenticated,

    /// Login or password change was refused.
    #[error("authentication failed: {code} {message}")]
    Authentication { code: ResultCode, message: String },

    /// The server rejected a command.
    #[error(transparent)]
    Protocol(#[from] EppError),

    /// A request could not be rendered as XML.
    #[error("xml encode error: {0}")]
    XmlEncode(#[from] quick_xml::errors::serialize::SeError),

    /// A response could not be parsed.
    #[error("xml decode error: {0}")]
    XmlDecode(#[from] quick_xml::errors::serialize::DeError),

    /// A response was not valid UTF-8.
    #[error("response is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

impl SessionError {
    /// Whether the error ended the connection.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            SessionError::Transport(_) | SessionError::Frame(_) | SessionError::Greeting(_)
        )
    }

    /// The registry result code, for protocol and authentication failures.
    pub fn result_code(&self) -> Option<ResultCode> {
        match self {
            SessionError::Authentication { code, .. } => Some(*code),
            SessionError::Protocol(err) => Some(err.code),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;
