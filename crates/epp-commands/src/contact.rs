//! Contact object commands (RFC 5733) with the nic.at contact type
//! extension.

use epp_session::envelope::{AT_EXT_CONTACT_NS, CONTACT_NS};
use epp_session::{normalize_street, Command, Element, Session};
use epp_transport::Dialer;
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::execute::{execute, missing_res_data, Outcome};
use crate::types::{Availability, CheckData, Status};
use crate::validate::{self, ValidationError};

/// Internationalized (ASCII only) or localized postal information.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostalType {
    #[default]
    Int,
    Loc,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// `None` when no street lines are given; `Some(vec![])` is kept as is.
    #[serde(
        rename(serialize = "contact:street", deserialize = "street"),
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub street: Option<Vec<String>>,
    #[serde(rename(serialize = "contact:city", deserialize = "city"))]
    pub city: String,
    #[serde(
        rename(serialize = "contact:sp", deserialize = "sp"),
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub province: Option<String>,
    #[serde(rename(serialize = "contact:pc", deserialize = "pc"), default)]
    pub postal_code: String,
    #[serde(rename(serialize = "contact:cc", deserialize = "cc"))]
    pub country_code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostalInfo {
    #[serde(rename = "@type")]
    pub kind: PostalType,
    #[serde(rename(serialize = "contact:name", deserialize = "name"))]
    pub name: String,
    #[serde(
        rename(serialize = "contact:org", deserialize = "org"),
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub org: Option<String>,
    #[serde(rename(serialize = "contact:addr", deserialize = "addr"))]
    pub addr: Address,
}

impl PostalInfo {
    /// A copy with street lines fitted to the registry's line limits.
    fn normalized(&self) -> Self {
        let mut info = self.clone();
        info.addr.street = normalize_street(self.addr.street.as_deref());
        info
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::Empty {
                field: "contact name",
            }
            .into());
        }
        if self.addr.city.trim().is_empty() {
            return Err(ValidationError::Empty { field: "city" }.into());
        }
        validate::postal_code(&self.addr.postal_code)?;
        validate::country_code(&self.addr.country_code)?;
        Ok(())
    }
}

/// Disclosure preference for the listed fields. `flag = false` asks the
/// registry to hide them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Disclose {
    pub flag: bool,
    pub voice: bool,
    pub fax: bool,
    pub email: bool,
}

/// nic.at contact classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactKind {
    PrivatePerson,
    Organisation,
    Role,
}

impl ContactKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ContactKind::PrivatePerson => "privateperson",
            ContactKind::Organisation => "organisation",
            ContactKind::Role => "role",
        }
    }
}

/// Input to [`create`]. Use `AUTO` as the ID to let the registry assign one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactCreate {
    pub id: String,
    pub postal_info: PostalInfo,
    pub voice: Option<String>,
    pub fax: Option<String>,
    pub email: String,
    pub auth_info: Option<String>,
    pub disclose: Option<Disclose>,
    pub kind: Option<ContactKind>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactCreated {
    pub id: String,
    #[serde(rename = "crDate")]
    pub created: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContactInfo {
    pub id: String,
    pub roid: String,
    pub statuses: Vec<Status>,
    pub postal_info: Vec<PostalInfo>,
    pub voice: Option<String>,
    pub fax: Option<String>,
    pub email: String,
    pub client_id: String,
    pub creator_id: Option<String>,
    pub created: Option<String>,
    pub updater_id: Option<String>,
    pub updated: Option<String>,
    pub auth_info: Option<String>,
    pub disclose: Option<Disclose>,
    /// `at-ext-contact:type`, when the registry returned it.
    pub kind: Option<String>,
}

/// Replacement values for a contact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactChg {
    pub postal_info: Option<PostalInfo>,
    pub voice: Option<String>,
    pub fax: Option<String>,
    pub email: Option<String>,
    pub auth_info: Option<String>,
    pub disclose: Option<Disclose>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactUpdate {
    pub id: String,
    pub add: Vec<Status>,
    pub rem: Vec<Status>,
    pub chg: Option<ContactChg>,
}

impl ContactUpdate {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

// Wire shapes.

#[derive(Serialize)]
struct IdList<'a> {
    #[serde(rename = "@xmlns:contact")]
    xmlns: &'static str,
    #[serde(rename = "contact:id")]
    ids: &'a [&'a str],
}

#[derive(Serialize)]
struct IdOnly<'a> {
    #[serde(rename = "@xmlns:contact")]
    xmlns: &'static str,
    #[serde(rename = "contact:id")]
    id: &'a str,
}

#[derive(Serialize)]
struct AuthInfoXml<'a> {
    #[serde(rename = "contact:pw")]
    pw: &'a str,
}

#[derive(Serialize)]
struct DiscloseXml {
    #[serde(rename = "@flag")]
    flag: u8,
    #[serde(rename = "contact:voice", skip_serializing_if = "Option::is_none")]
    voice: Option<()>,
    #[serde(rename = "contact:fax", skip_serializing_if = "Option::is_none")]
    fax: Option<()>,
    #[serde(rename = "contact:email", skip_serializing_if = "Option::is_none")]
    email: Option<()>,
}

impl From<Disclose> for DiscloseXml {
    fn from(disclose: Disclose) -> Self {
        Self {
            flag: u8::from(disclose.flag),
            voice: disclose.voice.then_some(()),
            fax: disclose.fax.then_some(()),
            email: disclose.email.then_some(()),
        }
    }
}

#[derive(Serialize)]
struct CreateXml<'a> {
    #[serde(rename = "@xmlns:contact")]
    xmlns: &'static str,
    #[serde(rename = "contact:id")]
    id: &'a str,
    #[serde(rename = "contact:postalInfo")]
    postal_info: PostalInfo,
    #[serde(rename = "contact:voice", skip_serializing_if = "Option::is_none")]
    voice: Option<&'a str>,
    #[serde(rename = "contact:fax", skip_serializing_if = "Option::is_none")]
    fax: Option<&'a str>,
    #[serde(rename = "contact:email")]
    email: &'a str,
    #[serde(rename = "contact:authInfo")]
    auth_info: AuthInfoXml<'a>,
    #[serde(rename = "contact:disclose", skip_serializing_if = "Option::is_none")]
    disclose: Option<DiscloseXml>,
}

#[derive(Serialize)]
struct TypeExtension {
    #[serde(rename = "@xmlns:at-ext-contact")]
    xmlns: &'static str,
    #[serde(rename = "at-ext-contact:type")]
    kind: &'static str,
}

#[derive(Serialize)]
struct StatusList<'a> {
    #[serde(rename = "contact:status")]
    statuses: &'a [Status],
}

#[derive(Serialize)]
struct ChgXml<'a> {
    #[serde(rename = "contact:postalInfo", skip_serializing_if = "Option::is_none")]
    postal_info: Option<PostalInfo>,
    #[serde(rename = "contact:voice", skip_serializing_if = "Option::is_none")]
    voice: Option<&'a str>,
    #[serde(rename = "contact:fax", skip_serializing_if = "Option::is_none")]
    fax: Option<&'a str>,
    #[serde(rename = "contact:email", skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    #[serde(rename = "contact:authInfo", skip_serializing_if = "Option::is_none")]
    auth_info: Option<AuthInfoXml<'a>>,
    #[serde(rename = "contact:disclose", skip_serializing_if = "Option::is_none")]
    disclose: Option<DiscloseXml>,
}

#[derive(Serialize)]
struct UpdateXml<'a> {
    #[serde(rename = "@xmlns:contact")]
    xmlns: &'static str,
    #[serde(rename = "contact:id")]
    id: &'a str,
    #[serde(rename = "contact:add", skip_serializing_if = "Option::is_none")]
    add: Option<StatusList<'a>>,
    #[serde(rename = "contact:rem", skip_serializing_if = "Option::is_none")]
    rem: Option<StatusList<'a>>,
    #[serde(rename = "contact:chg", skip_serializing_if = "Option::is_none")]
    chg: Option<ChgXml<'a>>,
}

fn status_list(statuses: &[Status]) -> Option<StatusList<'_>> {
    (!statuses.is_empty()).then_some(StatusList { statuses })
}

#[derive(Deserialize)]
struct CreData {
    #[serde(rename = "creData")]
    cre: ContactCreated,
}

#[derive(Deserialize)]
struct InfData {
    #[serde(rename = "infData")]
    inf: RawInfo,
}

#[derive(Deserialize)]
struct RawInfo {
    id: String,
    #[serde(default)]
    roid: String,
    #[serde(rename = "status", default)]
    statuses: Vec<Status>,
    #[serde(rename = "postalInfo", default)]
    postal_info: Vec<PostalInfo>,
    #[serde(default)]
    voice: Option<String>,
    #[serde(default)]
    fax: Option<String>,
    #[serde(default)]
    email: String,
    #[serde(rename = "clID", default)]
    client_id: String,
    #[serde(rename = "crID", default)]
    creator_id: Option<String>,
    #[serde(rename = "crDate", default)]
    created: Option<String>,
    #[serde(rename = "upID", default)]
    updater_id: Option<String>,
    #[serde(rename = "upDate", default)]
    updated: Option<String>,
    #[serde(rename = "authInfo", default)]
    auth_info: Option<RawAuthInfo>,
    #[serde(default)]
    disclose: Option<RawDisclose>,
}

#[derive(Deserialize)]
struct RawAuthInfo {
    #[serde(default)]
    pw: Option<String>,
}

#[derive(Deserialize)]
struct RawDisclose {
    #[serde(rename = "@flag")]
    flag: String,
    #[serde(default)]
    voice: Option<IgnoredAny>,
    #[serde(default)]
    fax: Option<IgnoredAny>,
    #[serde(default)]
    email: Option<IgnoredAny>,
}

#[derive(Deserialize)]
struct InfoExtension {
    #[serde(rename = "infData", default)]
    at: Option<AtInfData>,
}

#[derive(Deserialize)]
struct AtInfData {
    #[serde(rename = "type")]
    kind: String,
}

impl From<RawInfo> for ContactInfo {
    fn from(raw: RawInfo) -> Self {
        Self {
            id: raw.id,
            roid: raw.roid,
            statuses: raw.statuses,
            postal_info: raw.postal_info,
            voice: raw.voice.filter(|v| !v.is_empty()),
            fax: raw.fax.filter(|v| !v.is_empty()),
            email: raw.email,
            client_id: raw.client_id,
            creator_id: raw.creator_id,
            created: raw.created,
            updater_id: raw.updater_id,
            updated: raw.updated,
            auth_info: raw.auth_info.and_then(|a| a.pw).filter(|pw| !pw.is_empty()),
            disclose: raw.disclose.map(|d| Disclose {
                flag: matches!(d.flag.trim(), "1" | "true"),
                voice: d.voice.is_some(),
                fax: d.fax.is_some(),
                email: d.email.is_some(),
            }),
            kind: None,
        }
    }
}

fn validate_phones(voice: Option<&str>, fax: Option<&str>) -> Result<()> {
    for number in [voice, fax].into_iter().flatten() {
        validate::phone(number)?;
    }
    Ok(())
}

// Commands.

pub fn check<D: Dialer>(session: &mut Session<D>, ids: &[&str]) -> Result<Vec<Availability>> {
    if ids.is_empty() {
        return Err(ValidationError::Empty {
            field: "contact IDs",
        }
        .into());
    }
    for id in ids {
        validate::contact_id(id)?;
    }

    let body = IdList {
        xmlns: CONTACT_NS,
        ids,
    };
    let response = execute::<_, CheckData, IgnoredAny, _>(session, |id| {
        Command::new("check", &Element::new("contact:check", &body), id).to_xml()
    })?;
    Ok(response
        .res_data
        .map(CheckData::into_availability)
        .unwrap_or_default())
}

/// Create a contact. Street lines are reflowed to the registry's limits and
/// the auth info defaults to empty, which nic.at expects.
pub fn create<D: Dialer>(session: &mut Session<D>, contact: &ContactCreate) -> Result<ContactCreated> {
    validate::contact_id(&contact.id)?;
    contact.postal_info.validate()?;
    validate::email(&contact.email)?;
    validate_phones(contact.voice.as_deref(), contact.fax.as_deref())?;

    let body = CreateXml {
        xmlns: CONTACT_NS,
        id: &contact.id,
        postal_info: contact.postal_info.normalized(),
        voice: contact.voice.as_deref(),
        fax: contact.fax.as_deref(),
        email: &contact.email,
        auth_info: AuthInfoXml {
            pw: contact.auth_info.as_deref().unwrap_or_default(),
        },
        disclose: contact.disclose.map(DiscloseXml::from),
    };
    let extension = contact.kind.map(|kind| TypeExtension {
        xmlns: AT_EXT_CONTACT_NS,
        kind: kind.as_str(),
    });

    let response = execute::<_, CreData, IgnoredAny, _>(session, |id| {
        let create = Element::new("contact:create", &body);
        let command = Command::new("create", &create, id);
        match &extension {
            Some(ext) => command
                .with_extension(&Element::new("at-ext-contact:create", ext))
                .to_xml(),
            None => command.to_xml(),
        }
    })?;
    missing_res_data(response.res_data.map(|d| d.cre))
}

pub fn info<D: Dialer>(session: &mut Session<D>, contact_id: &str) -> Result<ContactInfo> {
    validate::contact_id(contact_id)?;
    let body = IdOnly {
        xmlns: CONTACT_NS,
        id: contact_id,
    };
    let response = execute::<_, InfData, InfoExtension, _>(session, |id| {
        Command::new("info", &Element::new("contact:info", &body), id).to_xml()
    })?;
    let kind = response.extension.and_then(|ext| ext.at).map(|at| at.kind);
    let mut info = missing_res_data(response.res_data.map(|d| ContactInfo::from(d.inf)))?;
    info.kind = kind;
    Ok(info)
}

pub fn update<D: Dialer>(session: &mut Session<D>, update: &ContactUpdate) -> Result<Outcome> {
    validate::contact_id(&update.id)?;
    if let Some(chg) = &update.chg {
        if let Some(postal_info) = &chg.postal_info {
            postal_info.validate()?;
        }
        if let Some(email) = &chg.email {
            validate::email(email)?;
        }
        validate_phones(chg.voice.as_deref(), chg.fax.as_deref())?;
    }

    let body = UpdateXml {
        xmlns: CONTACT_NS,
        id: &update.id,
        add: status_list(&update.add),
        rem: status_list(&update.rem),
        chg: update.chg.as_ref().map(|chg| ChgXml {
            postal_info: chg.postal_info.as_ref().map(PostalInfo::normalized),
            voice: chg.voice.as_deref(),
            fax: chg.fax.as_deref(),
            email: chg.email.as_deref(),
            auth_info: chg.auth_info.as_deref().map(|pw| AuthInfoXml { pw }),
            disclose: chg.disclose.map(DiscloseXml::from),
        }),
    };
    let response = execute::<_, IgnoredAny, IgnoredAny, _>(session, |id| {
        Command::new("update", &Element::new("contact:update", &body), id).to_xml()
    })?;
    Ok(Outcome::from(&response))
}

pub fn delete<D: Dialer>(session: &mut Session<D>, contact_id: &str) -> Result<Outcome> {
    validate::contact_id(contact_id)?;
    let body = IdOnly {
        xmlns: CONTACT_NS,
        id: contact_id,
    };
    let response = execute::<_, IgnoredAny, IgnoredAny, _>(session, |id| {
        Command::new("delete", &Element::new("contact:delete", &body), id).to_xml()
    })?;
    Ok(Outcome::from(&response))
}
