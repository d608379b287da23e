//! EPP command builders.
//!
//! Each function takes a logged-in [`epp_session::Session`], validates its
//! input, renders the command, and hands back the parsed answer. Registry
//! rejections surface as [`CommandError::Session`] wrapping the
//! [`epp_session::EppError`] with its result code and conditions.
//!
//! - [`hello`]: `<hello/>` and greeting parsing
//! - [`domain`]: check, create, info, update, delete, transfer, hold
//! - [`contact`]: check, create, info, update, delete
//! - [`poll`]: message queue request and acknowledge
//! - [`dnssec`]: DS record updates
//! - [`withdraw`]: nic.at domain withdraw

pub mod contact;
pub mod dnssec;
pub mod domain;
pub mod error;
pub mod execute;
pub mod hello;
pub mod poll;
pub mod types;
pub mod validate;
pub mod withdraw;

#[cfg(all(test, unix))]
mod testing;

pub use dnssec::{update_domain_dnssec, DnssecChanges, DsData, DsRemoval};
pub use error::{CommandError, Result};
pub use execute::{execute, execute_raw, inner_xml, Outcome};
pub use hello::{hello, Greeting};
pub use poll::PollMessage;
pub use types::{Availability, Status};
pub use validate::ValidationError;
pub use withdraw::withdraw;
