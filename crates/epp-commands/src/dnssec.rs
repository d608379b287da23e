//! DNSSEC delegation signer updates (RFC 5910, secDNS-1.1).
//!
//! The `secDNS:update` extension rides on a plain `domain:update` for the
//! same name. Creating a domain with DS records is not supported.

use epp_session::envelope::SECDNS_NS;
use epp_session::{Command, Element, Session};
use epp_transport::Dialer;
use serde::de::IgnoredAny;
use serde::Serialize;

use crate::domain::{self, DomainUpdate};
use crate::error::Result;
use crate::execute::{execute, Outcome};
use crate::validate::ValidationError;

/// One DS record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DsData {
    #[serde(rename = "secDNS:keyTag")]
    pub key_tag: u16,
    #[serde(rename = "secDNS:alg")]
    pub algorithm: u8,
    #[serde(rename = "secDNS:digestType")]
    pub digest_type: u8,
    /// Hex encoded digest.
    #[serde(rename = "secDNS:digest")]
    pub digest: String,
}

impl DsData {
    pub fn new(key_tag: u16, algorithm: u8, digest_type: u8, digest: impl Into<String>) -> Self {
        Self {
            key_tag,
            algorithm,
            digest_type,
            digest: digest.into(),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.digest.is_empty() {
            return Err(ValidationError::Empty { field: "DS digest" }.into());
        }
        if !self.digest.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ValidationError::Format {
                field: "DS digest",
                value: self.digest.clone(),
            }
            .into());
        }
        Ok(())
    }
}

/// Which DS records to remove.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DsRemoval {
    #[default]
    Nothing,
    /// `<secDNS:all>true</secDNS:all>`
    All,
    Records(Vec<DsData>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DnssecChanges {
    pub add: Vec<DsData>,
    pub remove: DsRemoval,
    /// Requested maximum signature lifetime in seconds.
    pub max_sig_life: Option<u32>,
}

impl DnssecChanges {
    fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove == DsRemoval::Nothing && self.max_sig_life.is_none()
    }
}

#[derive(Serialize)]
struct UpdateXml<'a> {
    #[serde(rename = "@xmlns:secDNS")]
    xmlns: &'static str,
    #[serde(rename = "secDNS:rem", skip_serializing_if = "Option::is_none")]
    rem: Option<RemXml<'a>>,
    #[serde(rename = "secDNS:add", skip_serializing_if = "Option::is_none")]
    add: Option<DsList<'a>>,
    #[serde(rename = "secDNS:chg", skip_serializing_if = "Option::is_none")]
    chg: Option<ChgXml>,
}

#[derive(Serialize)]
struct DsList<'a> {
    #[serde(rename = "secDNS:dsData")]
    records: &'a [DsData],
}

#[derive(Serialize)]
struct RemXml<'a> {
    #[serde(rename = "secDNS:all", skip_serializing_if = "Option::is_none")]
    all: Option<bool>,
    #[serde(rename = "secDNS:dsData", skip_serializing_if = "Option::is_none")]
    records: Option<&'a [DsData]>,
}

#[derive(Serialize)]
struct ChgXml {
    #[serde(rename = "secDNS:maxSigLife")]
    max_sig_life: u32,
}

impl<'a> From<&'a DnssecChanges> for UpdateXml<'a> {
    fn from(changes: &'a DnssecChanges) -> Self {
        let rem = match &changes.remove {
            DsRemoval::Nothing => None,
            DsRemoval::All => Some(RemXml {
                all: Some(true),
                records: None,
            }),
            DsRemoval::Records(records) => Some(RemXml {
                all: None,
                records: Some(records.as_slice()),
            }),
        };
        Self {
            xmlns: SECDNS_NS,
            rem,
            add: (!changes.add.is_empty()).then_some(DsList {
                records: &changes.add,
            }),
            chg: changes.max_sig_life.map(|max_sig_life| ChgXml { max_sig_life }),
        }
    }
}

/// Add or remove DS records for `name`.
pub fn update_domain_dnssec<D: Dialer>(
    session: &mut Session<D>,
    name: &str,
    changes: &DnssecChanges,
) -> Result<Outcome> {
    if changes.is_empty() {
        return Err(ValidationError::Other("no DNSSEC changes given").into());
    }
    let removed = match &changes.remove {
        DsRemoval::Records(records) => records.as_slice(),
        DsRemoval::Nothing | DsRemoval::All => &[],
    };
    for record in changes.add.iter().chain(removed) {
        record.validate()?;
    }

    let update = DomainUpdate::new(name);
    domain::validate_update(&update)?;
    let body = domain::update_xml(&update);
    let extension = UpdateXml::from(changes);

    let response = execute::<_, IgnoredAny, IgnoredAny, _>(session, |id| {
        Command::new("update", &Element::new("domain:update", &body), id)
            .with_extension(&Element::new("secDNS:update", &extension))
            .to_xml()
    })?;
    Ok(Outcome::from(&response))
}
