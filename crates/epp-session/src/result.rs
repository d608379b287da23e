use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A four-digit EPP result code (RFC 5730 section 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultCode(u16);

impl ResultCode {
    pub const SUCCESS: Self = Self(1000);
    pub const SUCCESS_ACTION_PENDING: Self = Self(1001);
    pub const SUCCESS_NO_MESSAGES: Self = Self(1300);
    pub const SUCCESS_ACK_TO_DEQUEUE: Self = Self(1301);
    pub const SUCCESS_ENDING_SESSION: Self = Self(1500);

    pub const UNKNOWN_COMMAND: Self = Self(2000);
    pub const COMMAND_SYNTAX_ERROR: Self = Self(2001);
    pub const COMMAND_USE_ERROR: Self = Self(2002);
    pub const REQUIRED_PARAMETER_MISSING: Self = Self(2003);
    pub const PARAMETER_VALUE_RANGE_ERROR: Self = Self(2004);
    pub const PARAMETER_VALUE_SYNTAX_ERROR: Self = Self(2005);

    pub const UNIMPLEMENTED_PROTOCOL_VERSION: Self = Self(2100);
    pub const UNIMPLEMENTED_COMMAND: Self = Self(2101);
    pub const UNIMPLEMENTED_OPTION: Self = Self(2102);
    pub const UNIMPLEMENTED_EXTENSION: Self = Self(2103);
    pub const BILLING_FAILURE: Self = Self(2104);
    pub const NOT_ELIGIBLE_FOR_RENEWAL: Self = Self(2105);
    pub const NOT_ELIGIBLE_FOR_TRANSFER: Self = Self(2106);

    pub const AUTHENTICATION_ERROR: Self = Self(2200);
    pub const AUTHORIZATION_ERROR: Self = Self(2201);
    pub const INVALID_AUTHORIZATION_INFO: Self = Self(2202);

    pub const OBJECT_PENDING_TRANSFER: Self = Self(2300);
    pub const OBJECT_NOT_PENDING_TRANSFER: Self = Self(2301);
    pub const OBJECT_EXISTS: Self = Self(2302);
    pub const OBJECT_DOES_NOT_EXIST: Self = Self(2303);
    pub const OBJECT_STATUS_PROHIBITS_OPERATION: Self = Self(2304);
    pub const OBJECT_ASSOCIATION_PROHIBITS_OPERATION: Self = Self(2305);
    pub const PARAMETER_VALUE_POLICY_ERROR: Self = Self(2306);
    pub const UNIMPLEMENTED_OBJECT_SERVICE: Self = Self(2307);
    pub const DATA_MANAGEMENT_POLICY_VIOLATION: Self = Self(2308);

    pub const COMMAND_FAILED: Self = Self(2400);
    pub const COMMAND_FAILED_SERVER_CLOSING: Self = Self(2500);
    pub const AUTHENTICATION_ERROR_SERVER_CLOSING: Self = Self(2501);
    pub const SESSION_LIMIT_EXCEEDED: Self = Self(2502);

    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    pub const fn as_u16(self) -> u16 {
        self.0
    }

    /// Whether the command completed successfully (1000, 1001, 1300, 1301, 1500).
    pub const fn is_success(self) -> bool {
        matches!(self.0, 1000 | 1001 | 1300 | 1301 | 1500)
    }

    /// Whether the server announced it is closing the connection.
    pub const fn is_closing(self) -> bool {
        matches!(self.0, 1500 | 2500 | 2501 | 2502)
    }

    /// The RFC 5730 text for registered codes.
    pub fn description(self) -> Option<&'static str> {
        let text = match self.0 {
            1000 => "Command completed successfully",
            1001 => "Command completed successfully; action pending",
            1300 => "Command completed successfully; no messages",
            1301 => "Command completed successfully; ack to dequeue",
            1500 => "Command completed successfully; ending session",
            2000 => "Unknown command",
            2001 => "Command syntax error",
            2002 => "Command use error",
            2003 => "Required parameter missing",
            2004 => "Parameter value range error",
            2005 => "Parameter value syntax error",
            2100 => "Unimplemented protocol version",
            2101 => "Unimplemented command",
            2102 => "Unimplemented option",
            2103 => "Unimplemented extension",
            2104 => "Billing failure",
            2105 => "Object is not eligible for renewal",
            2106 => "Object is not eligible for transfer",
            2200 => "Authentication error",
            2201 => "Authorization error",
            2202 => "Invalid authorization information",
            2300 => "Object pending transfer",
            2301 => "Object not pending transfer",
            2302 => "Object exists",
            2303 => "Object does not exist",
            2304 => "Object status prohibits operation",
            2305 => "Object association prohibits operation",
            2306 => "Parameter value policy error",
            2307 => "Unimplemented object service",
            2308 => "Data management policy violation",
            2400 => "Command failed",
            2500 => "Command failed; server closing connection",
            2501 => "Authentication error; server closing connection",
            2502 => "Session limit exceeded; server closing connection",
            _ => return None,
        };
        Some(text)
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Returned when a result code is not four decimal digits.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid EPP result code: {0:?}")]
pub struct InvalidResultCode(pub String);

impl FromStr for ResultCode {
    type Err = InvalidResultCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.len() != 4 || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidResultCode(s.to_string()));
        }
        trimmed
            .parse::<u16>()
            .map(Self)
            .map_err(|_| InvalidResultCode(s.to_string()))
    }
}

/// Classify a textual result code. Anything unparseable is a failure.
pub fn is_success_code(code: &str) -> bool {
    code.parse::<ResultCode>()
        .map(ResultCode::is_success)
        .unwrap_or(false)
}

/// One registry condition from the `conditions` response extension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(rename = "@code", default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(rename = "@severity", default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(default)]
    pub msg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(code) = &self.code {
            write!(f, "[{code}] ")?;
        }
        f.write_str(&self.msg)?;
        if let Some(details) = &self.details {
            write!(f, " - {details}")?;
        }
        Ok(())
    }
}

/// A command the server rejected: its result code, message and any
/// structured conditions. The session stays usable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("EPP error {code}: {message}{}", render_conditions(.conditions))]
pub struct EppError {
    pub code: ResultCode,
    pub message: String,
    pub conditions: Vec<Condition>,
}

impl EppError {
    pub fn new(code: ResultCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            conditions: Vec::new(),
        }
    }

    pub fn with_conditions(mut self, conditions: Vec<Condition>) -> Self {
        self.conditions = conditions;
        self
    }
}

fn render_conditions(conditions: &[Condition]) -> String {
    conditions
        .iter()
        .map(|condition| format!("; condition: {condition}"))
        .collect()
}
