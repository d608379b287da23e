use epp_session::{EppError, ResultCode, SessionError};

use crate::validate::ValidationError;

/// Errors that can occur in command operations.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Input was rejected before anything was sent.
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// Session, transport or registry failure.
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl CommandError {
    /// The registry's rejection, if that is what this is.
    pub fn epp_error(&self) -> Option<&EppError> {
        match self {
            CommandError::Session(SessionError::Protocol(err)) => Some(err),
            _ => None,
        }
    }

    pub fn result_code(&self) -> Option<ResultCode> {
        match self {
            CommandError::Session(err) => err.result_code(),
            CommandError::Validation(_) => None,
        }
    }
}

impl From<EppError> for CommandError {
    fn from(err: EppError) -> Self {
        CommandError::Session(SessionError::Protocol(err))
    }
}

pub type Result<T> = std::result::Result<T, CommandError>;
