//! EPP session engine.
//!
//! Drives one registry connection through connect, greeting, login,
//! commands and logout, and classifies result codes. Object-level command
//! builders sit on top of [`Session::send_command`].

pub mod address;
pub mod config;
pub mod envelope;
pub mod error;
pub mod result;
pub mod session;
pub mod trid;

pub use address::{normalize_lines, normalize_street, MAX_LINES, MAX_LINE_CHARS};
pub use config::SessionConfig;
pub use envelope::{
    expect_success, hello_xml, parse_response, parse_status, Command, Conditions,
    ConditionsExtension, Element, MessageQueue, Response, ResultElement, TransactionIds, EPP_NS,
};
pub use error::{Result, SessionError};
pub use result::{is_success_code, Condition, EppError, ResultCode};
pub use session::{Session, SessionState};
pub use trid::{Clock, ClockRandomIds, SystemClock, TransactionIdSource};
