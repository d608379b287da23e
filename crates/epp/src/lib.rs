//! Blocking client for the Extensible Provisioning Protocol (RFC 5730-5734).
//!
//! # Crate Structure
//!
//! - [`transport`]: TLS dialing and trust configuration
//! - [`frame`]: RFC 5734 length-prefixed framing
//! - [`session`]: connect, greeting, login, logout and result codes
//! - [`commands`]: domain, contact, poll, DNSSEC and withdraw commands
//!
//! ```no_run
//! use epp::{Session, SessionConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SessionConfig::new("epp.example.net", "REG-1", "password");
//! let mut session = Session::new(config)?;
//! session.connect()?;
//! session.login()?;
//! let availability = epp::commands::domain::check(&mut session, &["example.at"])?;
//! println!("{availability:?}");
//! session.logout()?;
//! # Ok(())
//! # }
//! ```

/// Re-export transport types.
pub mod transport {
    pub use epp_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use epp_frame::*;
}

/// Re-export session types.
pub mod session {
    pub use epp_session::*;
}

/// Re-export command builders.
pub mod commands {
    pub use epp_commands::*;
}

pub use epp_commands::{CommandError, Greeting, Outcome};
pub use epp_session::{
    normalize_lines, EppError, ResultCode, Session, SessionConfig, SessionError, SessionState,
};
pub use epp_transport::{ClientIdentity, RootStore, TlsConfig};
