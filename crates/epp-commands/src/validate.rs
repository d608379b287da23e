//! Client-side checks run before a command touches the wire.

use std::sync::LazyLock;

use regex::Regex;

static DOMAIN_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(\.[a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("static pattern is valid")
});

static CONTACT_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("static pattern is valid"));

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9]([A-Za-z0-9-]*[A-Za-z0-9])?(\.[A-Za-z0-9]([A-Za-z0-9-]*[A-Za-z0-9])?)*$",
    )
    .expect("static pattern is valid")
});

static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+[1-9][0-9]{1,14}$").expect("static pattern is valid"));

static COUNTRY_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{2}$").expect("static pattern is valid"));

static POSTAL_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9\s-]+$").expect("static pattern is valid"));

const MAX_DOMAIN_LEN: usize = 253;
const CONTACT_ID_LEN: (usize, usize) = (3, 16);
const MAX_POSTAL_CODE_LEN: usize = 16;
const AUTH_INFO_LEN: (usize, usize) = (6, 64);

/// Why a value was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    #[error("{field} too long: maximum {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("{field} too short: minimum {min} characters")]
    TooShort { field: &'static str, min: usize },

    #[error("invalid {field}: {value:?}")]
    Format { field: &'static str, value: String },

    #[error("{0}")]
    Other(&'static str),
}

pub type Result<T> = std::result::Result<T, ValidationError>;

/// LDH labels of at most 63 characters, at most 253 in total.
pub fn domain_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ValidationError::Empty {
            field: "domain name",
        });
    }
    if name.len() > MAX_DOMAIN_LEN {
        return Err(ValidationError::TooLong {
            field: "domain name",
            max: MAX_DOMAIN_LEN,
        });
    }
    if !DOMAIN_NAME.is_match(name) {
        return Err(format_error("domain name", name));
    }
    Ok(())
}

/// `AUTO` (server-assigned) or 3 to 16 of `[A-Za-z0-9_-]`.
pub fn contact_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(ValidationError::Empty {
            field: "contact ID",
        });
    }
    if id == "AUTO" {
        return Ok(());
    }
    let (min, max) = CONTACT_ID_LEN;
    if id.len() < min {
        return Err(ValidationError::TooShort {
            field: "contact ID",
            min,
        });
    }
    if id.len() > max {
        return Err(ValidationError::TooLong {
            field: "contact ID",
            max,
        });
    }
    if !CONTACT_ID.is_match(id) {
        return Err(format_error("contact ID", id));
    }
    Ok(())
}

pub fn email(address: &str) -> Result<()> {
    if address.is_empty() {
        return Err(ValidationError::Empty { field: "email" });
    }
    if !EMAIL.is_match(address) {
        return Err(format_error("email", address));
    }
    Ok(())
}

/// International `+CC.NUMBER` form. Spaces, hyphens, dots and parentheses
/// are ignored; an empty number is accepted since phones are optional.
pub fn phone(number: &str) -> Result<()> {
    if number.is_empty() {
        return Ok(());
    }
    let cleaned: String = number
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')' | '.'))
        .collect();
    if !PHONE.is_match(&cleaned) {
        return Err(format_error("phone number", number));
    }
    Ok(())
}

/// Two uppercase ASCII letters (ISO 3166-1 alpha-2).
pub fn country_code(cc: &str) -> Result<()> {
    if cc.is_empty() {
        return Err(ValidationError::Empty {
            field: "country code",
        });
    }
    if !COUNTRY_CODE.is_match(cc) {
        return Err(format_error("country code", cc));
    }
    Ok(())
}

pub fn postal_code(pc: &str) -> Result<()> {
    if pc.is_empty() {
        return Err(ValidationError::Empty {
            field: "postal code",
        });
    }
    if pc.len() > MAX_POSTAL_CODE_LEN {
        return Err(ValidationError::TooLong {
            field: "postal code",
            max: MAX_POSTAL_CODE_LEN,
        });
    }
    if !POSTAL_CODE.is_match(pc) {
        return Err(format_error("postal code", pc));
    }
    Ok(())
}

pub fn auth_info(pw: &str) -> Result<()> {
    if pw.is_empty() {
        return Err(ValidationError::Empty { field: "auth info" });
    }
    let (min, max) = AUTH_INFO_LEN;
    if pw.len() < min {
        return Err(ValidationError::TooShort {
            field: "auth info",
            min,
        });
    }
    if pw.len() > max {
        return Err(ValidationError::TooLong {
            field: "auth info",
            max,
        });
    }
    Ok(())
}

fn format_error(field: &'static str, value: &str) -> ValidationError {
    ValidationError::Format {
        field,
        value: value.to_string(),
    }
}
